use clap::{Arg, ArgAction, Command};

pub fn status_command() -> Command {
    Command::new("status")
        .about("Poll the service once and show connection, detection and counters")
        .arg(
            Arg::new("json")
                .long("json")
                .help("Output in JSON format")
                .action(ArgAction::SetTrue),
        )
}

pub fn logs_command() -> Command {
    Command::new("logs")
        .about("Show the service activity log")
        .arg(
            Arg::new("json")
                .long("json")
                .help("Output in JSON format")
                .action(ArgAction::SetTrue),
        )
}
