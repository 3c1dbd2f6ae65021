//! Platform-specific state directory management

use crate::error::{CoreError, CoreResult};
use directories::ProjectDirs;
use std::path::PathBuf;
use tracing::{debug, warn};

/// Manages platform-specific application directories
#[derive(Debug, Clone)]
pub struct StateDir {
    /// Project directories from the directories crate
    project_dirs: Option<ProjectDirs>,
    /// Override directory for testing or custom installations
    override_dir: Option<PathBuf>,
}

impl StateDir {
    #[must_use]
    pub fn new() -> Self {
        let project_dirs = ProjectDirs::from("com", "Collab", "collab");
        if project_dirs.is_none() {
            warn!("Failed to determine platform-specific directories, will use fallback");
        }
        Self {
            project_dirs,
            override_dir: None,
        }
    }

    /// Create a new StateDir rooted at an explicit directory
    #[must_use]
    pub fn with_override(path: impl Into<PathBuf>) -> Self {
        Self {
            project_dirs: None,
            override_dir: Some(path.into()),
        }
    }

    #[must_use]
    pub fn config_dir(&self) -> PathBuf {
        if let Some(override_dir) = &self.override_dir {
            return override_dir.join("config");
        }

        match &self.project_dirs {
            Some(project_dirs) => project_dirs.config_dir().to_path_buf(),
            None => PathBuf::from("./config"),
        }
    }

    #[must_use]
    pub fn data_dir(&self) -> PathBuf {
        if let Some(override_dir) = &self.override_dir {
            return override_dir.join("data");
        }

        match &self.project_dirs {
            Some(project_dirs) => project_dirs.data_dir().to_path_buf(),
            None => PathBuf::from("./data"),
        }
    }

    /// Default configuration file
    #[must_use]
    pub fn config_path(&self) -> PathBuf {
        self.config_dir().join("client.json")
    }

    /// Persisted access/refresh tokens
    #[must_use]
    pub fn tokens_path(&self) -> PathBuf {
        self.data_dir().join("tokens.json")
    }

    #[must_use]
    pub fn log_path(&self, component: &str) -> PathBuf {
        self.data_dir().join(format!("{component}.log"))
    }

    /// Create all required directories
    ///
    /// # Errors
    ///
    /// Returns an error if a directory cannot be created
    pub fn create_directories(&self) -> CoreResult<()> {
        for dir in [self.config_dir(), self.data_dir()] {
            std::fs::create_dir_all(&dir).map_err(|e| {
                CoreError::io_error(format!("Failed to create directory {}: {e}", dir.display()))
            })?;
            debug!("Ensured directory exists: {}", dir.display());
        }
        Ok(())
    }
}

impl Default for StateDir {
    fn default() -> Self {
        Self::new()
    }
}
