use std::fs;
use std::path::{Path, PathBuf};

use crate::constants::{CONFIG_DIR_NAME, DIRECTORIES_FILE, EXCLUSIONS_FILE, WATCHED_FILE};
use crate::error::{AppError, Result};

/// All persisted-state locations, resolved once at startup and handed to the
/// registry and engine constructors. Tests point this at a temp directory.
#[derive(Debug, Clone)]
pub struct AppConfig {
    config_dir: PathBuf,
}

impl AppConfig {
    /// Config root under the user's home directory (`~/.course_organizer`).
    pub fn locate() -> Result<Self> {
        let home = dirs::home_dir().ok_or(AppError::NoHomeDirectory)?;
        Ok(Self::at(home.join(CONFIG_DIR_NAME)))
    }

    pub fn at(config_dir: impl Into<PathBuf>) -> Self {
        Self {
            config_dir: config_dir.into(),
        }
    }

    /// Creates the config directory if it is missing.
    pub fn ensure_exists(&self) -> Result<()> {
        fs::create_dir_all(&self.config_dir).map_err(|e| {
            AppError::config_io(e, self.config_dir.clone(), "Failed to create config directory")
        })
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn directories_file(&self) -> PathBuf {
        self.config_dir.join(DIRECTORIES_FILE)
    }

    pub fn watched_file(&self) -> PathBuf {
        self.config_dir.join(WATCHED_FILE)
    }

    pub fn exclusions_file(&self) -> PathBuf {
        self.config_dir.join(EXCLUSIONS_FILE)
    }
}
