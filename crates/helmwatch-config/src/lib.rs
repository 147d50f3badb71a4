//! # helmwatch-config
//!
//! TOML configuration types, loading, and validation for helmwatch.
//!
//! Single source of truth for `HelmwatchConfig` and the resolved
//! `SchedulerConfig` consumed by the update scheduler.

mod defaults;
mod loading;
mod validation;

pub mod errors;
pub mod types;

pub use errors::ConfigError;
pub use loading::{SERVER_URL_ENV, load_hierarchy, load_hierarchy_from, merge_configs};
pub use types::{CommandConfig, HelmwatchConfig, PollingConfig, SchedulerConfig, ServerConfig};
pub use validation::validate_config;

impl HelmwatchConfig {
    /// Load configuration from the hierarchy of config files.
    ///
    /// See [`loading::load_hierarchy`] for details.
    pub fn load_hierarchy() -> Result<Self, ConfigError> {
        loading::load_hierarchy()
    }

    /// Validate the configuration.
    ///
    /// See [`validation::validate_config`] for details.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validation::validate_config(self)
    }
}
