use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Config IO error: {details} (Path: {path:?})")]
    ConfigIo {
        source: std::io::Error,
        path: PathBuf,
        details: String, // Contextual information about the operation
    },
    #[error("Failed to read directory {path:?}: {details}")]
    DirectoryRead { path: PathBuf, details: String },
    #[error("Persisted data at {path:?} has an unexpected shape: {details}")]
    MalformedData { path: PathBuf, details: String },
    #[error("Failed to create or persist temporary file for atomic write at {path:?}: {details}")]
    AtomicWrite { path: PathBuf, details: String },
    #[error("JSON serialization error for {path:?}: {source}")]
    Serialize {
        source: serde_json::Error,
        path: PathBuf,
    },
    #[error("Could not determine the user's home directory")]
    NoHomeDirectory,
}

// Helper constructors for detailed IO errors
impl AppError {
    pub fn config_io(source: std::io::Error, path: PathBuf, details: impl Into<String>) -> Self {
        AppError::ConfigIo {
            source,
            path,
            details: details.into(),
        }
    }

    pub fn directory_read(path: PathBuf, source: &std::io::Error) -> Self {
        AppError::DirectoryRead {
            path,
            details: source.to_string(),
        }
    }
}

pub type Result<T, E = AppError> = std::result::Result<T, E>;
