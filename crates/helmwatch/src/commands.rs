use clap::ArgMatches;
use tracing::error;

mod control;
mod helpers;
mod logs;
mod status;
mod watch;

use helpers::load_config;

pub fn run_command(matches: &ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(matches.get_one::<String>("server").map(String::as_str))?;

    match matches.subcommand() {
        Some(("watch", sub_matches)) => watch::handle_watch_command(sub_matches, &config),
        Some(("status", sub_matches)) => status::handle_status_command(sub_matches, &config),
        Some(("logs", sub_matches)) => logs::handle_logs_command(sub_matches, &config),
        Some(("toggle", _)) => control::handle_toggle_command(&config),
        Some(("test-notification", _)) => control::handle_test_notification_command(&config),
        Some(("set-chat-id", sub_matches)) => {
            control::handle_set_chat_id_command(sub_matches, &config)
        }
        _ => {
            error!(event = "cli.command_unknown");
            Err("Unknown command".into())
        }
    }
}
