//! Configuration loading and merging logic.
//!
//! # Configuration Hierarchy
//!
//! Configuration is loaded in the following order (later sources override earlier ones):
//! 1. **Hardcoded defaults** - Built-in fallback values
//! 2. **User config** - `~/.helmwatch/config.toml`
//! 3. **Project config** - `./.helmwatch/config.toml`
//! 4. **Environment** - `HELMWATCH_SERVER_URL`
//! 5. **CLI arguments** - Command-line flags (applied by the binary)

use std::fs;
use std::path::{Path, PathBuf};

use helmwatch_paths::HelmwatchPaths;
use tracing::{debug, warn};

use crate::errors::ConfigError;
use crate::types::{CommandConfig, HelmwatchConfig, PollingConfig, ServerConfig};
use crate::validation::validate_config;

/// Overrides `[server] base_url` when set and non-empty.
pub const SERVER_URL_ENV: &str = "HELMWATCH_SERVER_URL";

/// Load configuration from the user and project config files.
///
/// Missing config files are not errors; parse and validation failures are.
pub fn load_hierarchy() -> Result<HelmwatchConfig, ConfigError> {
    let user_config = match HelmwatchPaths::resolve() {
        Ok(paths) => Some(paths.user_config()),
        Err(e) => {
            warn!(event = "config.load.home_dir_missing", error = %e);
            None
        }
    };
    let project_root = std::env::current_dir()?;
    load_hierarchy_from(user_config.as_deref(), &project_root)
}

/// Load configuration with explicit locations. Use in tests.
pub fn load_hierarchy_from(
    user_config: Option<&Path>,
    project_root: &Path,
) -> Result<HelmwatchConfig, ConfigError> {
    let mut config = HelmwatchConfig::default();

    if let Some(path) = user_config
        && let Some(user) = load_config_file(path)?
    {
        config = merge_configs(&config, &user);
    }

    let project_path: PathBuf = HelmwatchPaths::project_config(project_root);
    if let Some(project) = load_config_file(&project_path)? {
        config = merge_configs(&config, &project);
    }

    apply_env_overrides(&mut config);

    validate_config(&config)?;

    Ok(config)
}

/// Load a configuration file. `Ok(None)` when the file does not exist.
fn load_config_file(path: &Path) -> Result<Option<HelmwatchConfig>, ConfigError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(event = "config.load.file_missing", path = %path.display());
            return Ok(None);
        }
        Err(e) => return Err(e.into()),
    };
    let config = toml::from_str(&content).map_err(|e| ConfigError::ConfigParseError {
        message: format!("'{}': {}", path.display(), e),
    })?;
    debug!(event = "config.load.file_loaded", path = %path.display());
    Ok(Some(config))
}

fn apply_env_overrides(config: &mut HelmwatchConfig) {
    if let Ok(url) = std::env::var(SERVER_URL_ENV)
        && !url.trim().is_empty()
    {
        debug!(event = "config.load.env_override", var = SERVER_URL_ENV);
        config.server.base_url = Some(url.trim().to_string());
    }
}

/// Merge two configurations, with `override_config` taking precedence.
pub fn merge_configs(base: &HelmwatchConfig, override_config: &HelmwatchConfig) -> HelmwatchConfig {
    HelmwatchConfig {
        server: ServerConfig::merge(&base.server, &override_config.server),
        polling: PollingConfig::merge(&base.polling, &override_config.polling),
        commands: CommandConfig::merge(&base.commands, &override_config.commands),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn write_project_config(root: &Path, contents: &str) {
        let dir = root.join(".helmwatch");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("config.toml"), contents).unwrap();
    }

    #[test]
    fn test_missing_files_yield_defaults() {
        let dir = tempfile::tempdir().unwrap();
        temp_env::with_var_unset(SERVER_URL_ENV, || {
            let config =
                load_hierarchy_from(Some(&dir.path().join("absent.toml")), dir.path()).unwrap();
            assert_eq!(config, HelmwatchConfig::default());
        });
    }

    #[test]
    fn test_project_overrides_user() {
        let dir = tempfile::tempdir().unwrap();
        let user_path = dir.path().join("user.toml");
        fs::write(
            &user_path,
            "[server]\nbase_url = \"http://user:5000\"\n[polling]\nlogs_interval_ms = 2500\n",
        )
        .unwrap();
        write_project_config(dir.path(), "[server]\nbase_url = \"http://project:5000\"\n");

        temp_env::with_var_unset(SERVER_URL_ENV, || {
            let config = load_hierarchy_from(Some(&user_path), dir.path()).unwrap();
            assert_eq!(config.server.base_url(), "http://project:5000");
            assert_eq!(config.polling.logs_interval(), Duration::from_millis(2500));
        });
    }

    #[test]
    fn test_env_overrides_files() {
        let dir = tempfile::tempdir().unwrap();
        write_project_config(dir.path(), "[server]\nbase_url = \"http://project:5000\"\n");

        temp_env::with_var(SERVER_URL_ENV, Some("http://env:8080"), || {
            let config = load_hierarchy_from(None, dir.path()).unwrap();
            assert_eq!(config.server.base_url(), "http://env:8080");
        });
    }

    #[test]
    fn test_blank_env_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        temp_env::with_var(SERVER_URL_ENV, Some("   "), || {
            let config = load_hierarchy_from(None, dir.path()).unwrap();
            assert_eq!(config.server.base_url(), "http://127.0.0.1:5000");
        });
    }

    #[test]
    fn test_parse_error_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        write_project_config(dir.path(), "[polling\nframe_interval_ms = ");

        temp_env::with_var_unset(SERVER_URL_ENV, || {
            let result = load_hierarchy_from(None, dir.path());
            assert!(matches!(
                result,
                Err(ConfigError::ConfigParseError { .. })
            ));
        });
    }

    #[test]
    fn test_invalid_values_fail_validation() {
        let dir = tempfile::tempdir().unwrap();
        write_project_config(dir.path(), "[polling]\nframe_interval_ms = 0\n");

        temp_env::with_var_unset(SERVER_URL_ENV, || {
            let result = load_hierarchy_from(None, dir.path());
            assert!(matches!(
                result,
                Err(ConfigError::InvalidConfiguration { .. })
            ));
        });
    }

    #[test]
    fn test_merge_configs_keeps_base_when_override_unset() {
        let base = HelmwatchConfig {
            commands: CommandConfig {
                button_cooldown_ms: Some(500),
                ..Default::default()
            },
            ..Default::default()
        };
        let merged = merge_configs(&base, &HelmwatchConfig::default());
        assert_eq!(merged.commands.button_cooldown(), Duration::from_millis(500));
    }
}
