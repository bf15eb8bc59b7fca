use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::config::AppConfig;
use crate::error::Result;
use crate::natsort::natural_cmp;
use crate::persist;

/// The set of root directories the user is tracking, kept in natural-sort
/// order and mirrored to `directories.json` on every mutation.
pub struct DirectoryRegistry {
    file: PathBuf,
    directories: Vec<PathBuf>,
}

impl DirectoryRegistry {
    /// Loads the persisted registry. A missing, unreadable, or malformed
    /// file degrades to an empty registry; startup never fails on it.
    pub fn load(config: &AppConfig) -> Self {
        let file = config.directories_file();
        let directories = match persist::load_json::<Vec<String>>(&file) {
            Ok(Some(paths)) => {
                let mut directories: Vec<PathBuf> = paths.into_iter().map(PathBuf::from).collect();
                sort_naturally(&mut directories);
                directories
            }
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!("Could not load tracked directories, starting empty: {}", e);
                Vec::new()
            }
        };

        info!("Loaded {} tracked directories", directories.len());
        Self { file, directories }
    }

    /// Adds a directory. `Ok(false)` when it is already tracked; otherwise
    /// the list is re-sorted and persisted before returning `Ok(true)`.
    pub fn add(&mut self, path: &Path) -> Result<bool> {
        if self.contains(path) {
            return Ok(false);
        }

        self.directories.push(path.to_path_buf());
        sort_naturally(&mut self.directories);
        self.save()?;
        info!("Tracking directory {:?}", path);
        Ok(true)
    }

    /// Removes a directory. `Ok(false)` when it was not tracked. Watched
    /// state for files under it is left alone.
    pub fn remove(&mut self, path: &Path) -> Result<bool> {
        let before = self.directories.len();
        self.directories.retain(|d| d != path);
        if self.directories.len() == before {
            return Ok(false);
        }

        self.save()?;
        info!("Stopped tracking directory {:?}", path);
        Ok(true)
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.directories.iter().any(|d| d == path)
    }

    /// Tracked directories in natural-sort order.
    pub fn list(&self) -> &[PathBuf] {
        &self.directories
    }

    fn save(&self) -> Result<()> {
        let paths: Vec<String> = self
            .directories
            .iter()
            .map(|d| d.to_string_lossy().into_owned())
            .collect();
        persist::save_json(&self.file, &paths)
    }
}

fn sort_naturally(directories: &mut [PathBuf]) {
    directories.sort_by(|a, b| natural_cmp(&a.to_string_lossy(), &b.to_string_lossy()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn registry_in(dir: &TempDir) -> DirectoryRegistry {
        DirectoryRegistry::load(&AppConfig::at(dir.path()))
    }

    #[test]
    fn add_then_list_then_remove_round_trips() {
        let dir = TempDir::new().unwrap();
        let mut registry = registry_in(&dir);
        let tracked = dir.path().join("Course");

        assert!(registry.add(&tracked).unwrap());
        assert!(registry.list().contains(&tracked));

        assert!(registry.remove(&tracked).unwrap());
        assert!(!registry.list().contains(&tracked));
    }

    #[test]
    fn duplicate_add_is_a_no_op() {
        let dir = TempDir::new().unwrap();
        let mut registry = registry_in(&dir);
        let tracked = dir.path().join("Course");

        assert!(registry.add(&tracked).unwrap());
        assert!(!registry.add(&tracked).unwrap());
        assert_eq!(registry.list().len(), 1);
    }

    #[test]
    fn removing_an_untracked_directory_returns_false() {
        let dir = TempDir::new().unwrap();
        let mut registry = registry_in(&dir);

        assert!(!registry.remove(Path::new("/nowhere")).unwrap());
    }

    #[test]
    fn list_is_naturally_sorted() {
        let dir = TempDir::new().unwrap();
        let mut registry = registry_in(&dir);

        for name in ["Week 10", "Week 1", "Week 2"] {
            registry.add(&dir.path().join(name)).unwrap();
        }

        let names: Vec<_> = registry
            .list()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["Week 1", "Week 2", "Week 10"]);
    }

    #[test]
    fn mutations_survive_a_reload() {
        let dir = TempDir::new().unwrap();
        let tracked = dir.path().join("Course");

        let mut registry = registry_in(&dir);
        registry.add(&tracked).unwrap();
        drop(registry);

        let reloaded = registry_in(&dir);
        assert_eq!(reloaded.list(), &[tracked]);
    }

    #[test]
    fn corrupt_state_file_degrades_to_empty() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("directories.json"), "{oops").unwrap();

        let registry = registry_in(&dir);
        assert!(registry.list().is_empty());
    }
}
