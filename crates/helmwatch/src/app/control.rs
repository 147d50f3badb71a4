use clap::{Arg, Command};

pub fn toggle_command() -> Command {
    Command::new("toggle").about("Turn detection on or off on the service")
}

pub fn test_notification_command() -> Command {
    Command::new("test-notification").about("Ask the service to send a test notification")
}

pub fn set_chat_id_command() -> Command {
    Command::new("set-chat-id")
        .about("Change the chat id the service sends violation notifications to")
        .arg(
            Arg::new("chat-id")
                .help("New chat id")
                .value_name("ID")
                .index(1)
                .required(true)
                .allow_hyphen_values(true),
        )
}
