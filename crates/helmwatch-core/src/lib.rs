//! helmwatch-core: adaptive polling client for a remote helmet detection service
//!
//! The core decides when to poll the service, how fast, how to back off on
//! failure and how to pause/resume on visibility changes, and projects the
//! responses into connection/detection state.
//!
//! # Main Entry Points
//!
//! - [`monitor`] - The application object wiring everything together
//! - [`scheduler`] - Periodic poll tasks and their timers
//! - [`rate`] - Frame interval backoff
//! - [`state`] - Connection and detection state machines
//! - [`lifecycle`] - Visibility-driven pause/resume

pub mod commands;
pub mod errors;
pub mod lifecycle;
pub mod logging;
pub mod monitor;
pub mod notify;
pub mod rate;
pub mod render;
pub mod scheduler;
pub mod service;
pub mod state;

pub use helmwatch_config::{HelmwatchConfig, SchedulerConfig};
pub use helmwatch_protocol::{FramePayload, LogEntry, StatsPayload};

pub use commands::{CommandGuard, CommandOutcome, Control};
pub use errors::{CommandError, HelmwatchError, ServiceError};
pub use lifecycle::{LifecycleEvent, Visibility, run_lifecycle};
pub use monitor::{ConfigSnapshot, Monitor, MonitorStatus};
pub use notify::{LogNotifier, Notification, NotificationLevel, NotificationSink};
pub use rate::AdaptiveRateController;
pub use render::{ConnectionIndicator, DetectionIndicator, NullRenderer, Renderer, StatsView};
pub use scheduler::{FRAME_TASK, LOGS_TASK, PollTask, UpdateScheduler};
pub use service::{DetectionService, HttpDetectionService};
pub use state::{
    ConnectionState, ConnectionStatus, DetectionState, DetectionStatus, StatsSnapshot,
};

pub use logging::init_logging;
