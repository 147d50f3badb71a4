//! Terminal implementations of the monitor's display surfaces.
//!
//! The monitor renders after every poll; these only print when something
//! actually changed, so a healthy 10 polls/second stays quiet.

use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

use helmwatch_core::{
    ConnectionIndicator, DetectionIndicator, FramePayload, LogEntry, Notification,
    NotificationLevel, NotificationSink, Renderer, StatsView,
};
use tracing::warn;

use crate::color;

#[derive(Default)]
struct Printed {
    detection: Option<&'static str>,
    stats: Option<StatsView>,
    last_log: Option<LogEntry>,
}

pub struct TerminalRenderer {
    save_frame: Option<PathBuf>,
    printed: Mutex<Printed>,
}

impl TerminalRenderer {
    pub fn new(save_frame: Option<PathBuf>) -> Self {
        Self {
            save_frame,
            printed: Mutex::new(Printed::default()),
        }
    }

    fn printed(&self) -> MutexGuard<'_, Printed> {
        match self.printed.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl Renderer for TerminalRenderer {
    fn render_connection(&self, indicator: &ConnectionIndicator) {
        let label = if indicator.label == "Connected" {
            color::ok(indicator.label)
        } else {
            color::danger(indicator.label)
        };
        println!("{} {}", color::muted("connection"), label);
    }

    fn render_detection(&self, indicator: &DetectionIndicator) {
        let mut printed = self.printed();
        if printed.detection == Some(indicator.label) {
            return;
        }
        printed.detection = Some(indicator.label);
        let label = match indicator.css_class {
            "status-badge status-danger" => color::danger(indicator.label),
            "status-badge status-active" => color::ok(indicator.label),
            _ => color::warn(indicator.label),
        };
        println!(
            "{} {} {}",
            color::muted("detection"),
            color::bold(&label),
            color::muted(&format!("(toggle: {})", indicator.button_label))
        );
    }

    fn render_frame(&self, payload: &FramePayload) {
        let Some(path) = self.save_frame.as_ref() else {
            return;
        };
        match payload.decode_frame() {
            Ok(Some(bytes)) => {
                if let Err(e) = write_frame(path, &bytes) {
                    warn!(
                        event = "cli.frame.save_failed",
                        path = %path.display(),
                        error = %e,
                    );
                }
            }
            Ok(None) => {}
            Err(e) => warn!(event = "cli.frame.decode_failed", error = %e),
        }
    }

    fn render_stats(&self, stats: &StatsView) {
        let mut printed = self.printed();
        if printed.stats.as_ref() == Some(stats) {
            return;
        }
        printed.stats = Some(stats.clone());
        println!("{}", format_stats(stats));
    }

    fn render_logs(&self, logs: &[LogEntry]) {
        let mut printed = self.printed();
        let fresh = unseen_entries(printed.last_log.as_ref(), logs);
        for entry in fresh {
            println!("{}", format_log_entry(entry));
        }
        if let Some(last) = logs.last() {
            printed.last_log = Some(last.clone());
        }
    }

    fn missing_surfaces(&self) -> Vec<&'static str> {
        if self.save_frame.is_none() {
            vec!["video frame (use --save-frame to write it to a file)"]
        } else {
            Vec::new()
        }
    }
}

/// Replace the file in one step so viewers never read half a frame.
fn write_frame(path: &std::path::Path, bytes: &[u8]) -> std::io::Result<()> {
    let tmp = path.with_extension("partial");
    std::fs::write(&tmp, bytes)?;
    std::fs::rename(&tmp, path)
}

/// Entries after the last one already printed. If it has rotated out of the
/// service's window, everything is new.
pub fn unseen_entries<'a>(last: Option<&LogEntry>, logs: &'a [LogEntry]) -> &'a [LogEntry] {
    match last.and_then(|last| logs.iter().rposition(|entry| entry == last)) {
        Some(pos) => &logs[pos + 1..],
        None => logs,
    }
}

pub fn format_log_entry(entry: &LogEntry) -> String {
    format!(
        "{} {} {}",
        color::muted(&entry.timestamp),
        color::log_level(&entry.level),
        entry.message
    )
}

pub fn format_stats(stats: &StatsView) -> String {
    format!(
        "{} detections {}  violations {}  notifications {}  uptime {}",
        color::muted("stats"),
        stats.total_detections,
        stats.violations,
        stats.notifications_sent,
        stats.uptime
    )
}

/// Prints notifications; errors go to stderr.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalNotifier;

impl NotificationSink for TerminalNotifier {
    fn notify(&self, notification: Notification) {
        match notification.level {
            NotificationLevel::Success => println!("{}", color::ok(&notification.message)),
            NotificationLevel::Info => println!("{}", color::info(&notification.message)),
            NotificationLevel::Warning => println!("{}", color::warn(&notification.message)),
            NotificationLevel::Error => eprintln!("{}", color::danger(&notification.message)),
        }
    }
}
