use std::sync::Arc;

use clap::ArgMatches;
use helmwatch_config::HelmwatchConfig;
use helmwatch_core::{
    ConnectionIndicator, DetectionIndicator, DetectionService, LogNotifier, Monitor,
    MonitorStatus, NullRenderer, StatsPayload, StatsView,
};
use serde::Serialize;
use tracing::{error, info, warn};

use super::helpers;
use crate::color;

#[derive(Serialize)]
struct StatusOutput<'a> {
    server: &'a str,
    #[serde(flatten)]
    status: MonitorStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    service_stats: Option<StatsPayload>,
}

pub(crate) fn handle_status_command(
    matches: &ArgMatches,
    config: &HelmwatchConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let json_output = matches.get_flag("json");
    info!(event = "cli.status_started", json_output = json_output);

    let runtime = helpers::runtime()?;
    runtime.block_on(run_status(config, json_output))
}

async fn run_status(
    config: &HelmwatchConfig,
    json_output: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let service = helpers::service(config)?;
    let monitor = Monitor::new(
        config.scheduler_config(),
        service.clone(),
        Arc::new(NullRenderer),
        Arc::new(LogNotifier),
    );
    monitor.force_poll().await;
    let status = monitor.status();

    let service_stats = if status.connected {
        match service.fetch_stats().await {
            Ok(stats) => Some(stats),
            Err(e) => {
                warn!(event = "cli.status.stats_failed", error = %e);
                None
            }
        }
    } else {
        None
    };

    let connected = status.connected;
    let server = config.server.base_url();
    if json_output {
        let output = StatusOutput {
            server,
            status,
            service_stats,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print_status(server, &status, service_stats.as_ref());
    }

    if !connected {
        eprintln!("Service at {} is unreachable.", server);
        error!(event = "cli.status_failed", server = server, error = "unreachable");
        return Err("service unreachable".into());
    }

    info!(event = "cli.status_completed", connected = connected);
    Ok(())
}

fn print_status(server: &str, status: &MonitorStatus, service_stats: Option<&StatsPayload>) {
    let connection = ConnectionIndicator::from(status.connection);
    let detection = DetectionIndicator::from(status.detection);

    println!("{:<11} {}", "Service", color::muted(server));
    let connection_label = if status.connected {
        color::ok(connection.label)
    } else {
        color::danger(connection.label)
    };
    println!("{:<11} {}", "Connection", connection_label);

    if !status.connected {
        return;
    }
    println!("{:<11} {}", "Detection", color::bold(detection.label));
    if let Some(stats) = status.stats.as_ref() {
        let view = StatsView::from(stats);
        println!(
            "{:<11} detections {}  violations {}  notifications {}  uptime {}",
            "Stats", view.total_detections, view.violations, view.notifications_sent, view.uptime
        );
    }
    if let Some(stats) = service_stats {
        if let Some(camera_active) = stats.camera_active {
            let camera = if camera_active {
                color::ok("active")
            } else {
                color::danger("inactive")
            };
            println!("{:<11} {}", "Camera", camera);
        }
        if let Some(chat_id) = stats.current_chat_id.as_deref() {
            println!("{:<11} {}", "Chat ID", chat_id);
        }
    }
}
