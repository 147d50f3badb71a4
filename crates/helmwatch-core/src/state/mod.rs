//! State machines derived from poll responses.
//!
//! None of these types know about rendering; the monitor projects them
//! into [`crate::render`] values after every update.

mod connection;
mod detection;
mod stats;

pub use connection::{ConnectionState, ConnectionStatus};
pub use detection::{DetectionState, DetectionStatus};
pub use stats::{StatsSnapshot, format_uptime};
