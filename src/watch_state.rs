use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use log::warn;
use serde_json::Value;

use crate::config::AppConfig;
use crate::error::Result;
use crate::persist;

/// Watched flags, keyed by containing directory and file name and mirrored
/// to `watched.json`. Entries appear the first time a file is toggled and
/// are never removed; flags for files that no longer exist are harmless.
///
/// The canonical on-disk shape is the nested map
/// `{ directory: { filename: bool } }`. An older flat `{ path: bool }`
/// shape is accepted on load and rewritten nested on the next save.
#[derive(Debug, Clone, Default)]
pub struct WatchState {
    file: PathBuf,
    entries: BTreeMap<String, BTreeMap<String, bool>>,
}

impl WatchState {
    /// Loads the persisted flags; any failure degrades to an empty store.
    pub fn load(config: &AppConfig) -> Self {
        let file = config.watched_file();
        let entries = match persist::load_json::<Value>(&file) {
            Ok(Some(value)) => match parse_entries(&value) {
                Some(entries) => entries,
                None => {
                    warn!("Watched-state file {:?} has an unexpected shape, starting empty", file);
                    BTreeMap::new()
                }
            },
            Ok(None) => BTreeMap::new(),
            Err(e) => {
                warn!("Could not load watched state, starting empty: {}", e);
                BTreeMap::new()
            }
        };

        Self { file, entries }
    }

    /// Watched flag for a file, `false` if never recorded.
    pub fn is_watched(&self, file_path: &Path) -> bool {
        let Some((directory, name)) = split_path(file_path) else {
            return false;
        };
        self.entries
            .get(&directory)
            .and_then(|files| files.get(&name))
            .copied()
            .unwrap_or(false)
    }

    /// Records a flag in memory; call [`WatchState::save`] to persist.
    pub fn set_watched(&mut self, file_path: &Path, watched: bool) {
        let Some((directory, name)) = split_path(file_path) else {
            warn!("Ignoring watch toggle for path without a parent: {:?}", file_path);
            return;
        };
        self.entries.entry(directory).or_default().insert(name, watched);
    }

    /// Full-file rewrite of `watched.json` in the canonical nested shape.
    pub fn save(&self) -> Result<()> {
        persist::save_json(&self.file, &self.entries)
    }
}

fn split_path(file_path: &Path) -> Option<(String, String)> {
    let directory = file_path.parent()?;
    let name = file_path.file_name()?;
    Some((
        directory.to_string_lossy().into_owned(),
        name.to_string_lossy().into_owned(),
    ))
}

/// Accepts both persisted shapes. `None` when the JSON is structurally
/// something else entirely (array, string, mixed object).
fn parse_entries(value: &Value) -> Option<BTreeMap<String, BTreeMap<String, bool>>> {
    let object = value.as_object()?;
    let mut entries: BTreeMap<String, BTreeMap<String, bool>> = BTreeMap::new();

    for (key, value) in object {
        match value {
            // Legacy flat shape: full path -> bool.
            Value::Bool(watched) => {
                let (directory, name) = split_path(Path::new(key))?;
                entries.entry(directory).or_default().insert(name, *watched);
            }
            // Canonical nested shape: directory -> { filename -> bool }.
            Value::Object(files) => {
                let directory = entries.entry(key.clone()).or_default();
                for (name, flag) in files {
                    directory.insert(name.clone(), flag.as_bool()?);
                }
            }
            _ => return None,
        }
    }

    Some(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn state_in(dir: &TempDir) -> WatchState {
        WatchState::load(&AppConfig::at(dir.path()))
    }

    #[test]
    fn unknown_files_default_to_unwatched() {
        let dir = TempDir::new().unwrap();
        let state = state_in(&dir);
        assert!(!state.is_watched(Path::new("/course/Week 1/a.mp4")));
    }

    #[test]
    fn set_watched_round_trips_through_disk() {
        let dir = TempDir::new().unwrap();
        let file = Path::new("/course/Week 1/a.mp4");

        let mut state = state_in(&dir);
        state.set_watched(file, true);
        state.save().unwrap();
        drop(state);

        let reloaded = state_in(&dir);
        assert!(reloaded.is_watched(file));
        assert!(!reloaded.is_watched(Path::new("/course/Week 1/b.mp4")));
    }

    #[test]
    fn unwatching_is_recorded_explicitly() {
        let dir = TempDir::new().unwrap();
        let file = Path::new("/course/a.mp4");

        let mut state = state_in(&dir);
        state.set_watched(file, true);
        state.set_watched(file, false);
        assert!(!state.is_watched(file));
    }

    #[test]
    fn legacy_flat_shape_is_imported() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("watched.json"),
            r#"{ "/course/Week 1/a.mp4": true, "/course/Week 1/b.mp4": false }"#,
        )
        .unwrap();

        let state = state_in(&dir);
        assert!(state.is_watched(Path::new("/course/Week 1/a.mp4")));
        assert!(!state.is_watched(Path::new("/course/Week 1/b.mp4")));
    }

    #[test]
    fn unexpected_shape_degrades_to_empty() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("watched.json"), r#"["not", "a", "map"]"#).unwrap();

        let state = state_in(&dir);
        assert!(!state.is_watched(Path::new("/course/a.mp4")));
    }
}
