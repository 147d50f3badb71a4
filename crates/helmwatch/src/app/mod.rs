mod control;
mod global;
mod query;
mod watch;


use clap::Command;

pub fn build_cli() -> Command {
    global::root_command()
        .subcommand(watch::watch_command())
        .subcommand(query::status_command())
        .subcommand(query::logs_command())
        .subcommand(control::toggle_command())
        .subcommand(control::test_notification_command())
        .subcommand(control::set_chat_id_command())
}
