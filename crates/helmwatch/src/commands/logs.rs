use clap::ArgMatches;
use helmwatch_config::HelmwatchConfig;
use helmwatch_core::DetectionService;
use tracing::{error, info};

use super::helpers;
use crate::terminal::format_log_entry;

pub(crate) fn handle_logs_command(
    matches: &ArgMatches,
    config: &HelmwatchConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let json_output = matches.get_flag("json");
    info!(event = "cli.logs_started", json_output = json_output);

    let service = helpers::service(config)?;
    let runtime = helpers::runtime()?;
    let logs = match runtime.block_on(service.fetch_logs()) {
        Ok(logs) => logs,
        Err(e) => {
            eprintln!("Could not fetch logs from {}: {}", service.base_url(), e);
            error!(event = "cli.logs_failed", error = %e);
            return Err(e.into());
        }
    };

    if json_output {
        println!("{}", serde_json::to_string_pretty(&logs)?);
    } else if logs.is_empty() {
        println!("No activity logged yet.");
    } else {
        for entry in &logs {
            println!("{}", format_log_entry(entry));
        }
    }

    info!(event = "cli.logs_completed", count = logs.len());
    Ok(())
}
