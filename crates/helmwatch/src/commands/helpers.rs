use std::sync::Arc;

use helmwatch_config::{ConfigError, HelmwatchConfig};
use helmwatch_core::{HttpDetectionService, Monitor, NotificationSink, Renderer};
use tracing::{error, info, warn};

/// Load configuration, then apply the `--server` override.
///
/// A broken config file falls back to defaults with a warning; an invalid
/// `--server` value is an error.
pub fn load_config(server: Option<&str>) -> Result<HelmwatchConfig, Box<dyn std::error::Error>> {
    let mut config = match HelmwatchConfig::load_hierarchy() {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Could not load config: {}. Using defaults.\n\
                 Tip: Check ~/.helmwatch/config.toml and ./.helmwatch/config.toml for syntax errors.",
                e
            );
            warn!(
                event = "cli.config.load_failed",
                error = %e,
                error_code = e.error_code(),
                "Config load failed, using defaults"
            );
            HelmwatchConfig::default()
        }
    };

    if let Some(server) = server {
        config.server.base_url = Some(server.trim().to_string());
        if let Err(e) = config.validate() {
            report_error("Invalid --server value", &e);
            return Err(e.into());
        }
    }

    info!(event = "cli.config.resolved", base_url = config.server.base_url());
    Ok(config)
}

fn report_error(context: &str, e: &ConfigError) {
    eprintln!("{}: {}", context, e);
    error!(event = "cli.config.invalid", error = %e, error_code = e.error_code());
}

/// Current-thread runtime: every poll and command interleaves on one thread.
pub fn runtime() -> std::io::Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
}

pub fn service(
    config: &HelmwatchConfig,
) -> Result<Arc<HttpDetectionService>, Box<dyn std::error::Error>> {
    match HttpDetectionService::new(config.server.base_url(), config.server.command_timeout()) {
        Ok(service) => Ok(Arc::new(service)),
        Err(e) => {
            eprintln!("Could not create service client: {}", e);
            error!(event = "cli.service.create_failed", error = %e);
            Err(e.into())
        }
    }
}

pub fn monitor(
    config: &HelmwatchConfig,
    renderer: Arc<dyn Renderer>,
    notifier: Arc<dyn NotificationSink>,
) -> Result<Monitor, Box<dyn std::error::Error>> {
    let service = service(config)?;
    Ok(Monitor::new(
        config.scheduler_config(),
        service,
        renderer,
        notifier,
    ))
}
