use clap::{Arg, Command};

pub fn watch_command() -> Command {
    Command::new("watch")
        .about("Poll the service continuously and print status changes")
        .long_about("Poll the service continuously and print status changes.\n\nWhile running, type a command and press Enter:\n  t        toggle detection\n  n        send a test notification\n  c <ID>   update the notification chat id\n  h / s    hide (pause polling) / show (resume)\n  p        print current status\n  q        quit\n\nOn Unix, SIGUSR1 pauses polling, SIGUSR2 resumes it, and SIGINT/SIGTERM quit.")
        .arg(
            Arg::new("save-frame")
                .long("save-frame")
                .help("Write every received frame to a JPEG file (default: ~/.helmwatch/frames/latest.jpg)")
                .value_name("PATH")
                .num_args(0..=1)
                .default_missing_value(""),
        )
}
