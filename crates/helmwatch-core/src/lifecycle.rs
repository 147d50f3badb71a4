//! Visibility-driven pause and resume.
//!
//! Hidden is a hard pause: no poll runs at all until the surface is visible
//! again. Resuming keeps whatever backoff was in effect.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::monitor::Monitor;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Visible,
    Hidden,
}

impl std::fmt::Display for Visibility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Visibility::Visible => write!(f, "visible"),
            Visibility::Hidden => write!(f, "hidden"),
        }
    }
}

/// Signals from the host surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    Visibility(Visibility),
    /// The surface is going away for good.
    Unload,
}

/// Apply lifecycle events to the monitor until `Unload` arrives or every
/// sender is dropped, then shut the monitor down.
pub async fn run_lifecycle(monitor: &Monitor, mut events: mpsc::Receiver<LifecycleEvent>) {
    info!(event = "core.lifecycle.listen_started");
    while let Some(event) = events.recv().await {
        debug!(event = "core.lifecycle.event_received", lifecycle = ?event);
        match event {
            LifecycleEvent::Visibility(visibility) => {
                monitor.apply_visibility(visibility);
            }
            LifecycleEvent::Unload => break,
        }
    }
    monitor.shutdown();
    info!(event = "core.lifecycle.listen_completed");
}
