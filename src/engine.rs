use std::path::{Path, PathBuf};
use std::fs;
use std::sync::mpsc;

use log::{debug, error, warn};
use walkdir::WalkDir;

use crate::config::AppConfig;
use crate::error::{AppError, Result};
use crate::events::AppEvent;
use crate::exclusions::ExcludedExtensions;
use crate::natsort::natural_cmp;
use crate::watch_state::WatchState;

/// An immediate subdirectory with its recursively computed rollup.
#[derive(Debug, Clone, PartialEq)]
pub struct DirectoryEntry {
    pub path: PathBuf,
    pub progress: f64,
}

/// An eligible file with its watched flag.
#[derive(Debug, Clone, PartialEq)]
pub struct FileEntry {
    pub path: PathBuf,
    pub watched: bool,
}

/// One level of a tracked tree, both sequences in natural order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DirectoryContents {
    pub subdirs: Vec<DirectoryEntry>,
    pub files: Vec<FileEntry>,
}

/// Enumerates directory contents and computes watched-percentage rollups.
///
/// The engine is single-owner and synchronous; the UI runs walks on
/// background threads through [`ProgressEngine::snapshot`] and stays the
/// only mutator.
pub struct ProgressEngine {
    watch: WatchState,
    excluded: ExcludedExtensions,
    events: Option<mpsc::Sender<AppEvent>>,
}

impl ProgressEngine {
    pub fn load(config: &AppConfig) -> Self {
        Self {
            watch: WatchState::load(config),
            excluded: ExcludedExtensions::load(config),
            events: None,
        }
    }

    /// Registers the channel that receives [`AppEvent::ProgressChanged`]
    /// notifications.
    pub fn subscribe(&mut self, sender: mpsc::Sender<AppEvent>) {
        self.events = Some(sender);
    }

    /// Immediate children of `directory`: subdirectories with their rollups
    /// and non-excluded files with their watched flags, both in natural
    /// order. Errors only when the directory itself cannot be read.
    pub fn get_directory_contents(&self, directory: &Path) -> Result<DirectoryContents> {
        contents_of(directory, &self.watch, &self.excluded)
    }

    /// Watched percentage over the full subtree, in `[0, 100]`. A directory
    /// with no eligible files, including one that no longer exists, reports
    /// `0.0` so stale registry entries stay harmless.
    pub fn calculate_directory_progress(&self, directory: &Path) -> f64 {
        progress_of(directory, &self.watch, &self.excluded)
    }

    /// Persists a watched flag and returns the containing directory's new
    /// rollup, notifying subscribers. Walking further up the ancestor chain
    /// is the caller's job.
    pub fn set_watched(&mut self, file_path: &Path, watched: bool) -> Result<f64> {
        self.watch.set_watched(file_path, watched);
        self.watch.save()?;

        let Some(directory) = file_path.parent() else {
            return Ok(0.0);
        };
        let percent = self.calculate_directory_progress(directory);
        self.notify_progress_changed(directory, percent);
        Ok(percent)
    }

    pub fn set_excluded_extensions<I, S>(&mut self, extensions: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.excluded.replace(extensions)
    }

    pub fn add_excluded_extension(&mut self, extension: &str) -> Result<()> {
        self.excluded.add(extension)
    }

    pub fn remove_excluded_extension(&mut self, extension: &str) -> Result<()> {
        self.excluded.remove(extension)
    }

    pub fn excluded_extensions(&self) -> impl Iterator<Item = &str> {
        self.excluded.iter()
    }

    /// Cheap copy of the current watch state and exclusion set, for walks
    /// that must run off the UI thread.
    pub fn snapshot(&self) -> ScanView {
        ScanView {
            watch: self.watch.clone(),
            excluded: self.excluded.clone(),
        }
    }

    fn notify_progress_changed(&self, directory: &Path, percent: f64) {
        if let Some(sender) = &self.events {
            let event = AppEvent::ProgressChanged {
                directory: directory.to_path_buf(),
                percent,
            };
            if let Err(e) = sender.send(event) {
                error!("Failed to send progress event: {}", e);
            }
        }
    }
}

/// A point-in-time view of the engine's state, safe to move to a background
/// thread. Walks over a stale view are fine: the UI drops results whose
/// scan generation is no longer current.
#[derive(Debug, Clone)]
pub struct ScanView {
    watch: WatchState,
    excluded: ExcludedExtensions,
}

impl ScanView {
    pub fn directory_contents(&self, directory: &Path) -> Result<DirectoryContents> {
        contents_of(directory, &self.watch, &self.excluded)
    }

    pub fn directory_progress(&self, directory: &Path) -> f64 {
        progress_of(directory, &self.watch, &self.excluded)
    }
}

fn contents_of(
    directory: &Path,
    watch: &WatchState,
    excluded: &ExcludedExtensions,
) -> Result<DirectoryContents> {
    let entries = fs::read_dir(directory)
        .map_err(|e| AppError::directory_read(directory.to_path_buf(), &e))?;

    let mut children: Vec<PathBuf> = Vec::new();
    for entry in entries {
        match entry {
            Ok(entry) => children.push(entry.path()),
            Err(e) => warn!("Skipping unreadable entry under {:?}: {}", directory, e),
        }
    }
    children.sort_by(|a, b| natural_cmp(&a.to_string_lossy(), &b.to_string_lossy()));

    let mut contents = DirectoryContents::default();
    for child in children {
        if child.is_dir() {
            let progress = progress_of(&child, watch, excluded);
            contents.subdirs.push(DirectoryEntry {
                path: child,
                progress,
            });
        } else if !excluded.is_excluded(&child) {
            let watched = watch.is_watched(&child);
            contents.files.push(FileEntry {
                path: child,
                watched,
            });
        }
    }

    debug!(
        "Enumerated {:?}: {} subdirs, {} files",
        directory,
        contents.subdirs.len(),
        contents.files.len()
    );
    Ok(contents)
}

fn progress_of(directory: &Path, watch: &WatchState, excluded: &ExcludedExtensions) -> f64 {
    if !directory.is_dir() {
        return 0.0;
    }

    let mut total: u64 = 0;
    let mut watched: u64 = 0;

    for entry in WalkDir::new(directory).follow_links(false) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Error walking {:?}: {}", directory, e);
                continue;
            }
        };
        if !entry.file_type().is_file() || excluded.is_excluded(entry.path()) {
            continue;
        }

        total += 1;
        if watch.is_watched(entry.path()) {
            watched += 1;
        }
    }

    if total == 0 {
        0.0
    } else {
        watched as f64 / total as f64 * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn engine_in(state_dir: &TempDir) -> ProgressEngine {
        ProgressEngine::load(&AppConfig::at(state_dir.path()))
    }

    #[test]
    fn set_watched_notifies_subscribers() {
        let state_dir = TempDir::new().unwrap();
        let course = TempDir::new().unwrap();
        fs::write(course.path().join("a.mp4"), b"").unwrap();

        let mut engine = engine_in(&state_dir);
        let (sender, receiver) = mpsc::channel();
        engine.subscribe(sender);

        let percent = engine.set_watched(&course.path().join("a.mp4"), true).unwrap();
        assert!((percent - 100.0).abs() < f64::EPSILON);

        match receiver.try_recv().unwrap() {
            AppEvent::ProgressChanged { directory, percent } => {
                assert_eq!(directory, course.path());
                assert!((percent - 100.0).abs() < f64::EPSILON);
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn exclusion_mutators_affect_progress_math() {
        let state_dir = TempDir::new().unwrap();
        let course = TempDir::new().unwrap();
        fs::write(course.path().join("video.mp4"), b"").unwrap();
        fs::write(course.path().join("notes.pdf"), b"").unwrap();

        let mut engine = engine_in(&state_dir);
        engine.set_watched(&course.path().join("video.mp4"), true).unwrap();
        assert!((engine.calculate_directory_progress(course.path()) - 50.0).abs() < 1e-9);

        engine.add_excluded_extension("pdf").unwrap();
        assert!((engine.calculate_directory_progress(course.path()) - 100.0).abs() < 1e-9);

        engine.remove_excluded_extension(".PDF").unwrap();
        assert!((engine.calculate_directory_progress(course.path()) - 50.0).abs() < 1e-9);
    }

    #[test]
    fn missing_directory_reads_error_but_progress_is_zero() {
        let state_dir = TempDir::new().unwrap();
        let engine = engine_in(&state_dir);
        let gone = Path::new("/no/such/course");

        assert!(matches!(
            engine.get_directory_contents(gone),
            Err(AppError::DirectoryRead { .. })
        ));
        assert_eq!(engine.calculate_directory_progress(gone), 0.0);
    }
}
