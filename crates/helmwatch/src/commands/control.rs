use std::sync::Arc;

use clap::ArgMatches;
use helmwatch_config::HelmwatchConfig;
use helmwatch_core::{CommandOutcome, NullRenderer};
use tracing::{error, info};

use super::helpers;
use crate::terminal::TerminalNotifier;

pub(crate) fn handle_toggle_command(
    config: &HelmwatchConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    info!(event = "cli.toggle_started");
    let runtime = helpers::runtime()?;
    let monitor = helpers::monitor(config, Arc::new(NullRenderer), Arc::new(TerminalNotifier))?;
    let outcome = runtime.block_on(monitor.toggle_detection());
    finish("toggle", outcome)
}

pub(crate) fn handle_test_notification_command(
    config: &HelmwatchConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    info!(event = "cli.test_notification_started");
    let runtime = helpers::runtime()?;
    let monitor = helpers::monitor(config, Arc::new(NullRenderer), Arc::new(TerminalNotifier))?;
    let outcome = runtime.block_on(monitor.test_notification());
    finish("test_notification", outcome)
}

pub(crate) fn handle_set_chat_id_command(
    matches: &ArgMatches,
    config: &HelmwatchConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let chat_id = matches
        .get_one::<String>("chat-id")
        .ok_or("Chat id argument is required")?;
    info!(event = "cli.set_chat_id_started");

    let runtime = helpers::runtime()?;
    let monitor = helpers::monitor(config, Arc::new(NullRenderer), Arc::new(TerminalNotifier))?;
    let outcome = runtime.block_on(monitor.update_chat_id(chat_id));
    finish("set_chat_id", outcome)
}

/// The notifier has already shown the message; only the exit status is left.
fn finish(command: &'static str, outcome: CommandOutcome) -> Result<(), Box<dyn std::error::Error>> {
    match outcome {
        CommandOutcome::Succeeded => {
            info!(event = "cli.command_completed", command = command);
            Ok(())
        }
        CommandOutcome::Failed(message) | CommandOutcome::Rejected(message) => {
            error!(event = "cli.command_failed", command = command, error = %message);
            Err(message.into())
        }
        CommandOutcome::Ignored => {
            error!(event = "cli.command_failed", command = command, error = "busy");
            Err("command already in progress".into())
        }
    }
}
