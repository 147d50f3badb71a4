use clap::{Arg, ArgAction, Command};

pub fn root_command() -> Command {
    Command::new("helmwatch")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Watch a remote helmet detection service from the terminal")
        .long_about("helmwatch polls a helmet detection service for frames, detection status and activity logs, backing off while the service is unreachable. It can also toggle detection and manage the service's notification target.")
        .arg(
            Arg::new("server")
                .long("server")
                .help("Base URL of the detection service (overrides config and HELMWATCH_SERVER_URL)")
                .value_name("URL")
                .global(true),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose logging output")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("no-color")
                .long("no-color")
                .help("Disable colored output")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .subcommand_required(true)
        .arg_required_else_help(true)
}
