use std::path::PathBuf;

use crate::engine::DirectoryContents;
use crate::error::AppError;

/// Events sent from background scans and the engine to the UI thread.
///
/// Scan results carry the generation they were requested under; the UI
/// drops anything tagged with a stale generation, so a slow walk can never
/// overwrite the view of the directory opened last.
#[derive(Debug)]
pub enum AppEvent {
    /// Contents of the directory the user navigated into.
    ContentsLoaded {
        generation: u64,
        directory: PathBuf,
        result: Result<DirectoryContents, AppError>,
    },
    /// Fresh progress rollups for every tracked root.
    RootsLoaded {
        generation: u64,
        roots: Vec<(PathBuf, f64)>,
    },
    /// A watched flag changed and this directory's rollup moved. The UI is
    /// responsible for re-querying any displayed ancestors.
    ProgressChanged { directory: PathBuf, percent: f64 },
}
