//! User-triggered commands and their busy guards.
//!
//! A control stays busy from the moment its command is sent until a cooldown
//! after the response arrives. Requests made while busy are ignored, so a
//! double press never sends the command twice.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Control {
    ToggleDetection,
    TestNotification,
    UpdateChatId,
}

impl std::fmt::Display for Control {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Control::ToggleDetection => write!(f, "toggle_detection"),
            Control::TestNotification => write!(f, "test_notification"),
            Control::UpdateChatId => write!(f, "update_chat_id"),
        }
    }
}

/// How a command request ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "message", rename_all = "snake_case")]
pub enum CommandOutcome {
    /// The service accepted the command.
    Succeeded,
    /// Transport failure or a logical failure reported by the service.
    Failed(String),
    /// The control was still busy; nothing was sent.
    Ignored,
    /// Invalid input; nothing was sent.
    Rejected(String),
}

impl CommandOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, CommandOutcome::Succeeded)
    }
}

/// Tracks which controls are busy. Cloning shares the same set.
#[derive(Debug, Clone, Default)]
pub struct CommandGuard {
    busy: Arc<Mutex<HashSet<Control>>>,
}

impl CommandGuard {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashSet<Control>> {
        match self.busy.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                warn!(event = "core.commands.lock_poisoned");
                poisoned.into_inner()
            }
        }
    }

    /// Mark the control busy. Returns `false` if it already was.
    pub fn try_begin(&self, control: Control) -> bool {
        let acquired = self.lock().insert(control);
        if !acquired {
            debug!(event = "core.commands.control_busy", control = %control);
        }
        acquired
    }

    pub fn is_busy(&self, control: Control) -> bool {
        self.lock().contains(&control)
    }

    /// Release the control now.
    pub fn release(&self, control: Control) {
        self.lock().remove(&control);
    }

    /// Release the control once `cooldown` has elapsed. Must run inside a
    /// Tokio runtime.
    pub fn release_after(&self, control: Control, cooldown: Duration) {
        let guard = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(cooldown).await;
            guard.release(control);
            debug!(event = "core.commands.control_released", control = %control);
        });
    }
}
