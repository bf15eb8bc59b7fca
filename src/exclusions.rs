use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use log::warn;

use crate::config::AppConfig;
use crate::constants::DEFAULT_EXCLUDED_EXTENSIONS;
use crate::error::Result;
use crate::persist;

/// File extensions excluded from enumeration and from the progress
/// denominator. Stored lowercase with a leading dot and mirrored to
/// `exclusions.json`; a missing file means the subtitle defaults.
#[derive(Debug, Clone)]
pub struct ExcludedExtensions {
    file: PathBuf,
    extensions: BTreeSet<String>,
}

impl ExcludedExtensions {
    pub fn load(config: &AppConfig) -> Self {
        let file = config.exclusions_file();
        let extensions = match persist::load_json::<Vec<String>>(&file) {
            Ok(Some(extensions)) => extensions.iter().map(|e| normalize(e)).collect(),
            Ok(None) => defaults(),
            Err(e) => {
                warn!("Could not load excluded extensions, using defaults: {}", e);
                defaults()
            }
        };

        Self { file, extensions }
    }

    /// Case-insensitive check against the filename suffix including the dot.
    /// Files without an extension are never excluded.
    pub fn is_excluded(&self, path: &Path) -> bool {
        match path.extension() {
            Some(ext) => {
                let suffix = format!(".{}", ext.to_string_lossy().to_lowercase());
                self.extensions.contains(&suffix)
            }
            None => false,
        }
    }

    /// Replaces the whole set and persists it.
    pub fn replace<I, S>(&mut self, extensions: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.extensions = extensions.into_iter().map(|e| normalize(e.as_ref())).collect();
        self.save()
    }

    pub fn add(&mut self, extension: &str) -> Result<()> {
        if extension.is_empty() {
            return Ok(());
        }
        self.extensions.insert(normalize(extension));
        self.save()
    }

    pub fn remove(&mut self, extension: &str) -> Result<()> {
        if extension.is_empty() {
            return Ok(());
        }
        self.extensions.remove(&normalize(extension));
        self.save()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.extensions.iter().map(String::as_str)
    }

    fn save(&self) -> Result<()> {
        persist::save_json(&self.file, &self.extensions)
    }
}

fn defaults() -> BTreeSet<String> {
    DEFAULT_EXCLUDED_EXTENSIONS
        .iter()
        .map(|e| e.to_string())
        .collect()
}

fn normalize(extension: &str) -> String {
    let lower = extension.to_lowercase();
    if lower.starts_with('.') {
        lower
    } else {
        format!(".{}", lower)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn exclusions_in(dir: &TempDir) -> ExcludedExtensions {
        ExcludedExtensions::load(&AppConfig::at(dir.path()))
    }

    #[test]
    fn subtitle_defaults_apply_without_a_state_file() {
        let dir = TempDir::new().unwrap();
        let exclusions = exclusions_in(&dir);

        assert!(exclusions.is_excluded(Path::new("/c/a.srt")));
        assert!(exclusions.is_excluded(Path::new("/c/a.SRT")));
        assert!(!exclusions.is_excluded(Path::new("/c/a.mp4")));
        assert!(!exclusions.is_excluded(Path::new("/c/README")));
    }

    #[test]
    fn added_extensions_are_normalized() {
        let dir = TempDir::new().unwrap();
        let mut exclusions = exclusions_in(&dir);

        exclusions.add("PDF").unwrap();
        assert!(exclusions.is_excluded(Path::new("/c/notes.pdf")));

        exclusions.add(".TxT").unwrap();
        assert!(exclusions.is_excluded(Path::new("/c/notes.txt")));
    }

    #[test]
    fn removed_extensions_become_eligible_again() {
        let dir = TempDir::new().unwrap();
        let mut exclusions = exclusions_in(&dir);

        exclusions.remove("srt").unwrap();
        assert!(!exclusions.is_excluded(Path::new("/c/a.srt")));
    }

    #[test]
    fn edits_survive_a_reload() {
        let dir = TempDir::new().unwrap();

        let mut exclusions = exclusions_in(&dir);
        exclusions.replace(["pdf", ".TXT"]).unwrap();
        drop(exclusions);

        let reloaded = exclusions_in(&dir);
        let extensions: Vec<_> = reloaded.iter().collect();
        assert_eq!(extensions, vec![".pdf", ".txt"]);
        assert!(!reloaded.is_excluded(Path::new("/c/a.srt")));
    }
}
