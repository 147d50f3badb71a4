use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum PathError {
    #[error("home directory not found, set the $HOME environment variable")]
    HomeNotFound,
}

/// Path construction for the `~/.helmwatch/` directory layout.
///
/// Use `resolve()` in production code and `from_dir()` in tests.
#[derive(Debug, Clone)]
pub struct HelmwatchPaths {
    base_dir: PathBuf,
}

impl HelmwatchPaths {
    /// Resolve paths from the user's home directory (`~/.helmwatch`).
    pub fn resolve() -> Result<Self, PathError> {
        let home = dirs::home_dir().ok_or(PathError::HomeNotFound)?;
        Ok(Self {
            base_dir: home.join(".helmwatch"),
        })
    }

    /// Create paths from an explicit base directory. Use in tests.
    pub fn from_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// The base `~/.helmwatch` directory.
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn user_config(&self) -> PathBuf {
        self.base_dir.join("config.toml")
    }

    pub fn frames_dir(&self) -> PathBuf {
        self.base_dir.join("frames")
    }

    /// Default destination for `watch --save-frame` when no file name is given.
    pub fn latest_frame(&self) -> PathBuf {
        self.frames_dir().join("latest.jpg")
    }

    /// Project-level config: `<project_root>/.helmwatch/config.toml`.
    pub fn project_config(project_root: &Path) -> PathBuf {
        project_root.join(".helmwatch").join("config.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_paths() -> HelmwatchPaths {
        HelmwatchPaths::from_dir(PathBuf::from("/home/user/.helmwatch"))
    }

    #[test]
    fn test_resolve_returns_ok_when_home_set() {
        // HOME is set in CI and dev environments
        let result = HelmwatchPaths::resolve();
        assert!(result.is_ok());
        let paths = result.unwrap();
        assert!(paths.base_dir().to_string_lossy().contains(".helmwatch"));
    }

    #[test]
    fn test_from_dir() {
        let paths = HelmwatchPaths::from_dir(PathBuf::from("/tmp/test-helmwatch"));
        assert_eq!(paths.base_dir(), Path::new("/tmp/test-helmwatch"));
    }

    #[test]
    fn test_user_config() {
        assert_eq!(
            test_paths().user_config(),
            PathBuf::from("/home/user/.helmwatch/config.toml")
        );
    }

    #[test]
    fn test_latest_frame_lives_under_frames_dir() {
        let paths = test_paths();
        assert!(paths.latest_frame().starts_with(paths.frames_dir()));
        assert_eq!(
            paths.latest_frame().file_name().unwrap().to_string_lossy(),
            "latest.jpg"
        );
    }

    #[test]
    fn test_project_config() {
        assert_eq!(
            HelmwatchPaths::project_config(Path::new("/work/site")),
            PathBuf::from("/work/site/.helmwatch/config.toml")
        );
    }
}
