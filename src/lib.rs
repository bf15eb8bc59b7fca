pub mod app;
pub mod config;
pub mod constants;
pub mod engine;
pub mod error;
pub mod events;
pub mod exclusions;
pub mod natsort;
pub mod persist;
pub mod registry;
pub mod watch_state;

pub use config::AppConfig;
pub use engine::{DirectoryContents, DirectoryEntry, FileEntry, ProgressEngine, ScanView};
pub use error::{AppError, Result};
pub use events::AppEvent;
pub use exclusions::ExcludedExtensions;
pub use registry::DirectoryRegistry;
pub use watch_state::WatchState;
