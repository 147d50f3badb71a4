//! The monitor: one owned object wiring the scheduler, the rate controller,
//! the state machines and the service together.
//!
//! Connection and detection state are written by the frame poll only. Command
//! actions never touch them; a successful toggle forces a frame poll instead
//! so the displayed state follows the poll path.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::Duration;

use helmwatch_config::SchedulerConfig;
use helmwatch_protocol::FramePayload;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::commands::{CommandGuard, CommandOutcome, Control};
use crate::errors::{CommandError, HelmwatchError, ServiceError};
use crate::lifecycle::Visibility;
use crate::notify::{Notification, NotificationLevel, NotificationSink};
use crate::rate::{AdaptiveRateController, millis};
use crate::render::{ConnectionIndicator, DetectionIndicator, Renderer, StatsView};
use crate::scheduler::{FRAME_TASK, LOGS_TASK, PollTask, UpdateScheduler};
use crate::service::DetectionService;
use crate::state::{
    ConnectionState, ConnectionStatus, DetectionState, DetectionStatus, StatsSnapshot,
};

/// Configuration values as currently in effect.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfigSnapshot {
    /// Live frame interval, including any backoff.
    pub frame_interval_ms: f64,
    pub baseline_frame_interval_ms: f64,
    pub logs_interval_ms: f64,
    pub backoff_ceiling_ms: f64,
    pub button_cooldown_ms: f64,
    pub notification_duration_ms: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonitorStatus {
    pub connected: bool,
    pub connection: ConnectionStatus,
    pub detection_active: bool,
    pub detection: DetectionStatus,
    pub running: bool,
    pub visibility: Visibility,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<StatsSnapshot>,
    pub config: ConfigSnapshot,
}

struct PollState {
    connection: ConnectionState,
    detection: DetectionState,
    rate: AdaptiveRateController,
    stats: Option<StatsSnapshot>,
    visibility: Visibility,
}

struct MonitorCore {
    config: SchedulerConfig,
    service: Arc<dyn DetectionService>,
    renderer: Arc<dyn Renderer>,
    notifier: Arc<dyn NotificationSink>,
    scheduler: UpdateScheduler,
    guard: CommandGuard,
    state: Mutex<PollState>,
    surfaces_reported: AtomicBool,
    shut_down: AtomicBool,
}

/// Owned handle to a running (or startable) monitor.
///
/// Dropping the handle stops every timer.
pub struct Monitor {
    core: Arc<MonitorCore>,
}

impl Monitor {
    /// Build a monitor. No timer runs until [`Monitor::start`].
    pub fn new(
        config: SchedulerConfig,
        service: Arc<dyn DetectionService>,
        renderer: Arc<dyn Renderer>,
        notifier: Arc<dyn NotificationSink>,
    ) -> Self {
        let state = PollState {
            connection: ConnectionState::new(),
            detection: DetectionState::new(),
            rate: AdaptiveRateController::new(&config),
            stats: None,
            visibility: Visibility::Visible,
        };
        Self {
            core: Arc::new(MonitorCore {
                config,
                service,
                renderer,
                notifier,
                scheduler: UpdateScheduler::new(),
                guard: CommandGuard::new(),
                state: Mutex::new(state),
                surfaces_reported: AtomicBool::new(false),
                shut_down: AtomicBool::new(false),
            }),
        }
    }

    /// Start both poll tasks; each runs once immediately.
    pub fn start(&self) {
        info!(event = "core.monitor.start_started");
        self.core.report_missing_surfaces();
        let connection = self.core.lock_state().connection.status();
        self.core.render_connection(connection);
        self.core.shut_down.store(false, Ordering::SeqCst);
        self.core.arm_tasks();
        info!(event = "core.monitor.start_completed");
    }

    pub fn status(&self) -> MonitorStatus {
        self.core.status()
    }

    /// Run one frame poll now, outside any timer.
    pub async fn force_poll(&self) {
        self.core.poll_frame().await;
    }

    /// Record a connection observation. See [`ConnectionState::set_connected`].
    ///
    /// A transition to disconnected takes one backoff step, a transition to
    /// connected resets the frame interval. Repeats do nothing.
    pub fn set_connected(&self, connected: bool) {
        self.core.record_connection(connected, false);
    }

    /// Frame interval the scheduler will use, which always matches
    /// `status().config.frame_interval_ms` once the tasks are registered.
    pub fn scheduled_frame_interval(&self) -> Option<Duration> {
        self.core.scheduler.interval_of(FRAME_TASK)
    }

    /// Stop every timer. In-flight polls complete but cannot re-arm anything.
    pub fn pause(&self) {
        self.core.lock_state().visibility = Visibility::Hidden;
        self.core.scheduler.stop();
        info!(event = "core.monitor.pause_completed");
    }

    /// Re-arm both tasks at the current, possibly backed-off, frame interval.
    pub fn resume(&self) {
        let resumed = {
            let mut state = self.core.lock_state();
            state.visibility = Visibility::Visible;
            self.core.scheduler.resume()
        };
        if !resumed {
            self.core.arm_tasks();
        }
        info!(
            event = "core.monitor.resume_completed",
            frame_interval_ms = millis(self.core.current_interval()),
        );
    }

    /// Pause on `Hidden`, resume on `Visible`. Repeating the current
    /// visibility does nothing. Returns whether anything changed.
    pub fn apply_visibility(&self, visibility: Visibility) -> bool {
        if self.core.shut_down.load(Ordering::SeqCst) {
            debug!(
                event = "core.monitor.visibility_ignored",
                reason = "shut down",
                visibility = %visibility,
            );
            return false;
        }
        if self.core.lock_state().visibility == visibility {
            debug!(
                event = "core.monitor.visibility_unchanged",
                visibility = %visibility,
            );
            return false;
        }
        info!(event = "core.monitor.visibility_changed", visibility = %visibility);
        match visibility {
            Visibility::Hidden => self.pause(),
            Visibility::Visible => self.resume(),
        }
        true
    }

    /// Tear down for good: stop every timer and ignore later visibility changes.
    pub fn shutdown(&self) {
        self.core.shut_down.store(true, Ordering::SeqCst);
        self.core.scheduler.stop();
        info!(event = "core.monitor.shutdown_completed");
    }

    /// Show an arbitrary notification through the configured sink.
    pub fn notify(&self, level: NotificationLevel, message: impl Into<String>) {
        self.core.notify(level, message);
    }

    pub async fn toggle_detection(&self) -> CommandOutcome {
        let core = &self.core;
        let control = Control::ToggleDetection;
        if !core.guard.try_begin(control) {
            return CommandOutcome::Ignored;
        }
        info!(event = "core.command.toggle_started");

        let outcome = match core.service.toggle_detection().await {
            Ok(response) => {
                info!(
                    event = "core.command.toggle_completed",
                    detection_active = response.detection_active,
                );
                MonitorCore::spawn_frame_poll(core);
                let word = if response.detection_active {
                    "activated"
                } else {
                    "deactivated"
                };
                core.notify(
                    NotificationLevel::Success,
                    format!("Detection {} successfully", word),
                );
                CommandOutcome::Succeeded
            }
            Err(e) => {
                warn!(
                    event = "core.command.toggle_failed",
                    error = %e,
                    error_code = e.error_code(),
                );
                core.notify(NotificationLevel::Error, "Failed to change detection state");
                CommandOutcome::Failed(e.to_string())
            }
        };

        core.guard.release_after(control, core.config.button_cooldown);
        outcome
    }

    pub async fn test_notification(&self) -> CommandOutcome {
        let core = &self.core;
        let control = Control::TestNotification;
        if !core.guard.try_begin(control) {
            return CommandOutcome::Ignored;
        }
        info!(event = "core.command.test_notification_started");

        let result = core
            .service
            .test_notification()
            .await
            .map_err(CommandError::from);
        let outcome = core.finish_command(
            control,
            result,
            "Test notification sent successfully",
            "Failed to send test notification",
        );

        core.guard.release_after(control, core.config.command_cooldown);
        outcome
    }

    /// Send a new notification chat id. Blank input is rejected before any
    /// request and without marking the control busy.
    pub async fn update_chat_id(&self, chat_id: &str) -> CommandOutcome {
        let core = &self.core;
        let control = Control::UpdateChatId;

        let chat_id = match validate_chat_id(chat_id) {
            Ok(chat_id) => chat_id,
            Err(e) => {
                debug!(event = "core.command.update_chat_id_rejected", error = %e);
                core.notify(NotificationLevel::Error, "Please enter a valid Chat ID");
                return CommandOutcome::Rejected(e.to_string());
            }
        };

        if !core.guard.try_begin(control) {
            return CommandOutcome::Ignored;
        }
        info!(event = "core.command.update_chat_id_started");

        let result = core
            .service
            .update_chat_id(chat_id)
            .await
            .map_err(CommandError::from);
        let outcome = core.finish_command(
            control,
            result,
            "Chat ID updated successfully",
            "Failed to update Chat ID",
        );

        core.guard.release_after(control, core.config.command_cooldown);
        outcome
    }
}

impl Drop for Monitor {
    fn drop(&mut self) {
        self.core.scheduler.stop();
    }
}

fn validate_chat_id(raw: &str) -> Result<&str, CommandError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(CommandError::EmptyChatId);
    }
    Ok(trimmed)
}

impl MonitorCore {
    fn lock_state(&self) -> MutexGuard<'_, PollState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                warn!(event = "core.monitor.lock_poisoned");
                poisoned.into_inner()
            }
        }
    }

    fn current_interval(&self) -> Duration {
        self.lock_state().rate.current()
    }

    /// Register and start both tasks at the live frame interval.
    fn arm_tasks(self: &Arc<Self>) {
        let state = self.lock_state();
        let tasks = Self::tasks(self, state.rate.current());
        self.scheduler.start(tasks);
    }

    /// Poll tasks hold a weak handle so timers never keep the monitor alive.
    fn tasks(core: &Arc<Self>, frame_interval: Duration) -> Vec<PollTask> {
        let frame = Arc::downgrade(core);
        let logs = Arc::downgrade(core);
        vec![
            PollTask::new(FRAME_TASK, frame_interval, move || {
                let core: Weak<Self> = frame.clone();
                async move {
                    if let Some(core) = core.upgrade() {
                        core.poll_frame().await;
                    }
                }
            }),
            PollTask::new(LOGS_TASK, core.config.logs_interval, move || {
                let core: Weak<Self> = logs.clone();
                async move {
                    if let Some(core) = core.upgrade() {
                        core.poll_logs().await;
                    }
                }
            }),
        ]
    }

    fn spawn_frame_poll(core: &Arc<Self>) {
        let core = Arc::clone(core);
        tokio::spawn(async move {
            core.poll_frame().await;
        });
    }

    fn report_missing_surfaces(&self) {
        if self.surfaces_reported.swap(true, Ordering::SeqCst) {
            return;
        }
        let missing = self.renderer.missing_surfaces();
        if !missing.is_empty() {
            warn!(
                event = "core.monitor.surfaces_missing",
                surfaces = ?missing,
            );
        }
    }

    async fn poll_frame(&self) {
        let timeout = self.config.request_timeout(self.current_interval());
        let result = match tokio::time::timeout(timeout, self.service.fetch_frame()).await {
            Ok(result) => result,
            Err(_) => Err(ServiceError::Timeout {
                after_ms: timeout.as_millis() as u64,
            }),
        };

        match result {
            Ok(payload) if !payload.has_frame() => {
                debug!(event = "core.poll.frame_missing");
            }
            Ok(payload) => self.apply_frame(&payload),
            Err(e) => self.apply_failure(&e),
        }
    }

    fn apply_frame(&self, payload: &FramePayload) {
        let (detection, stats) = {
            let mut state = self.lock_state();
            state
                .detection
                .apply(payload.detection_active, payload.violation);
            if let Some(stats) = payload.stats.as_ref() {
                state.stats = Some(StatsSnapshot::from(stats));
            }
            (state.detection.current(), state.stats)
        };

        self.renderer.render_frame(payload);
        self.renderer
            .render_detection(&DetectionIndicator::from(detection));
        if payload.stats.is_some()
            && let Some(stats) = stats
        {
            self.renderer.render_stats(&StatsView::from(&stats));
        }

        self.record_connection(true, false);
    }

    fn apply_failure(&self, error: &ServiceError) {
        warn!(
            event = "core.poll.frame_failed",
            error = %error,
            error_code = error.error_code(),
        );
        self.record_connection(false, true);
    }

    /// Apply a connection observation and its rate step.
    ///
    /// A failed poll backs off even when already disconnected. The retime
    /// happens under the state lock; the scheduler never takes it.
    fn record_connection(&self, connected: bool, failed_poll: bool) {
        let transition = {
            let mut state = self.lock_state();
            let transition = state.connection.set_connected(connected);
            let next = match transition {
                Some(ConnectionStatus::Connected) => state.rate.reset(),
                Some(ConnectionStatus::Disconnected) => state.rate.on_failure(),
                None if failed_poll => state.rate.on_failure(),
                None => None,
            };
            if let Some(interval) = next {
                self.scheduler.retime(FRAME_TASK, interval);
            }
            transition
        };

        let Some(transition) = transition else {
            return;
        };
        match transition {
            ConnectionStatus::Connected => info!(event = "core.connection.established"),
            ConnectionStatus::Disconnected => warn!(event = "core.connection.lost"),
        }
        self.render_connection(transition);
    }

    fn render_connection(&self, status: ConnectionStatus) {
        self.renderer
            .render_connection(&ConnectionIndicator::from(status));
    }

    async fn poll_logs(&self) {
        let timeout = self.config.request_timeout(self.config.logs_interval);
        let result = match tokio::time::timeout(timeout, self.service.fetch_logs()).await {
            Ok(result) => result,
            Err(_) => Err(ServiceError::Timeout {
                after_ms: timeout.as_millis() as u64,
            }),
        };
        match result {
            Ok(logs) => {
                debug!(event = "core.poll.logs_completed", count = logs.len());
                self.renderer.render_logs(&logs);
            }
            Err(e) => warn!(
                event = "core.poll.logs_failed",
                error = %e,
                error_code = e.error_code(),
            ),
        }
    }

    fn finish_command(
        &self,
        control: Control,
        result: Result<(), CommandError>,
        success_message: &str,
        failure_message: &str,
    ) -> CommandOutcome {
        match result {
            Ok(()) => {
                info!(event = "core.command.completed", control = %control);
                self.notify(NotificationLevel::Success, success_message);
                CommandOutcome::Succeeded
            }
            Err(CommandError::Service(ServiceError::Remote(message))) => {
                warn!(
                    event = "core.command.rejected_by_service",
                    control = %control,
                    error = %message,
                );
                self.notify(NotificationLevel::Error, format!("Error: {}", message));
                CommandOutcome::Failed(message)
            }
            Err(e) => {
                warn!(
                    event = "core.command.failed",
                    control = %control,
                    error = %e,
                    error_code = e.error_code(),
                );
                self.notify(NotificationLevel::Error, failure_message);
                CommandOutcome::Failed(e.to_string())
            }
        }
    }

    fn notify(&self, level: NotificationLevel, message: impl Into<String>) {
        self.notifier.notify(Notification::new(
            level,
            message,
            self.config.notification_duration,
        ));
    }

    fn status(&self) -> MonitorStatus {
        let state = self.lock_state();
        let detection = state.detection.current();
        MonitorStatus {
            connected: state.connection.is_connected(),
            connection: state.connection.status(),
            detection_active: detection.is_active(),
            detection,
            running: self.scheduler.is_running(),
            visibility: state.visibility,
            stats: state.stats,
            config: ConfigSnapshot {
                frame_interval_ms: millis(state.rate.current()),
                baseline_frame_interval_ms: millis(state.rate.baseline()),
                logs_interval_ms: millis(self.config.logs_interval),
                backoff_ceiling_ms: millis(self.config.backoff_ceiling),
                button_cooldown_ms: millis(self.config.button_cooldown),
                notification_duration_ms: millis(self.config.notification_duration),
            },
        }
    }
}
