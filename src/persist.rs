use std::fs;
use std::io::Write;
use std::path::Path;

use log::debug;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tempfile::NamedTempFile;

use crate::error::{AppError, Result};

/// Reads a pretty-printed JSON file. `Ok(None)` when the file does not
/// exist yet; a parse failure is reported as `MalformedData` so callers can
/// fall back to empty state.
pub fn load_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    if !path.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(path)
        .map_err(|e| AppError::config_io(e, path.to_path_buf(), "Failed to read state file"))?;

    let value = serde_json::from_str(&content).map_err(|e| AppError::MalformedData {
        path: path.to_path_buf(),
        details: e.to_string(),
    })?;

    Ok(Some(value))
}

/// Full-file rewrite through a temp file in the same directory, so a crash
/// mid-write never leaves a truncated state file behind.
pub fn save_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let content = serde_json::to_string_pretty(value).map_err(|e| AppError::Serialize {
        source: e,
        path: path.to_path_buf(),
    })?;

    let parent_dir = path.parent().ok_or_else(|| AppError::AtomicWrite {
        path: path.to_path_buf(),
        details: "Could not get parent directory for temp file.".to_string(),
    })?;

    fs::create_dir_all(parent_dir).map_err(|e| {
        AppError::config_io(e, parent_dir.to_path_buf(), "Failed to create state directory")
    })?;

    let mut temp_file = NamedTempFile::new_in(parent_dir).map_err(|e| {
        AppError::config_io(
            e,
            parent_dir.to_path_buf(),
            "Failed to create temp file for atomic write.",
        )
    })?;

    temp_file.write_all(content.as_bytes()).map_err(|e| {
        AppError::config_io(
            e,
            temp_file.path().to_path_buf(),
            "Failed to write to temp file.",
        )
    })?;

    temp_file.persist(path).map_err(|e| AppError::AtomicWrite {
        path: path.to_path_buf(),
        details: format!("Failed to persist temp file to target path: {}", e.error),
    })?;

    debug!("Wrote state file {:?}", path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn load_json_returns_none_for_missing_file() {
        let dir = TempDir::new().unwrap();
        let loaded: Option<Vec<String>> = load_json(&dir.path().join("missing.json")).unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.json");

        save_json(&path, &vec!["a".to_string(), "b".to_string()]).unwrap();
        let loaded: Option<Vec<String>> = load_json(&path).unwrap();

        assert_eq!(loaded, Some(vec!["a".to_string(), "b".to_string()]));
    }

    #[test]
    fn load_json_reports_malformed_content() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{not json").unwrap();

        let result: Result<Option<Vec<String>>> = load_json(&path);
        assert!(matches!(result, Err(AppError::MalformedData { .. })));
    }
}
