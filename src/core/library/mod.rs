//! # Library Module
//!
//! Finds Steam library roots (`steamapps` directories) under drive roots.
//!
//! Every (drive, suffix) pair is probed in drive-then-suffix order. One drive
//! can yield several libraries, one per matching suffix; they are never
//! deduplicated because each suffix is a separate install root.
//!
//! ## Example
//! ```rust,ignore
//! let locator = LibraryLocator::new(LocatorConfig::default());
//! let libraries = locator.find_libraries(&drives);
//! ```

mod cache;

pub use cache::LibraryCache;

use super::drives::Drive;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Install-root layouts probed under every drive
pub const DEFAULT_SUFFIXES: &[&str] = &[
    "Program Files (x86)/Steam/steamapps",
    "Program Files/Steam/steamapps",
    "SteamLibrary/steamapps",
    "Games/Steam/steamapps",
];

/// A directory holding `appmanifest_*.acf` files and a `common/` folder
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Library {
    /// The `steamapps` directory
    pub path: PathBuf,
    /// Drive root it was found under
    pub drive: PathBuf,
}

impl Library {
    pub fn new(path: impl Into<PathBuf>, drive: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            drive: drive.into(),
        }
    }

    pub fn exists(&self) -> bool {
        self.path.is_dir()
    }
}

/// Configuration for library probing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatorConfig {
    /// Relative suffixes, probed in order
    pub suffixes: Vec<PathBuf>,
}

impl Default for LocatorConfig {
    fn default() -> Self {
        Self {
            suffixes: DEFAULT_SUFFIXES.iter().map(PathBuf::from).collect(),
        }
    }
}

impl LocatorConfig {
    /// Append extra suffixes after the defaults
    pub fn with_extra_suffixes(mut self, extra: impl IntoIterator<Item = PathBuf>) -> Self {
        for suffix in extra {
            if !self.suffixes.contains(&suffix) {
                self.suffixes.push(suffix);
            }
        }
        self
    }
}

/// Probes drives for known library layouts
#[derive(Debug, Clone, Default)]
pub struct LibraryLocator {
    config: LocatorConfig,
}

impl LibraryLocator {
    pub fn new(config: LocatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LocatorConfig {
        &self.config
    }

    /// Return every existing `drive/suffix` directory.
    ///
    /// Zero matches is a valid, empty result.
    pub fn find_libraries(&self, drives: &[Drive]) -> Vec<Library> {
        let mut libraries = Vec::new();

        for drive in drives {
            for suffix in &self.config.suffixes {
                let candidate = join_suffix(drive.root(), suffix);
                if candidate.is_dir() {
                    tracing::debug!(path = %candidate.display(), "found library");
                    libraries.push(Library::new(candidate, drive.root()));
                }
            }
        }

        tracing::info!(count = libraries.len(), "located Steam libraries");
        libraries
    }
}

/// Join a suffix onto a drive root, treating a leading separator as relative
fn join_suffix(root: &Path, suffix: &Path) -> PathBuf {
    let relative: PathBuf = suffix
        .components()
        .filter(|c| matches!(c, std::path::Component::Normal(_)))
        .collect();
    root.join(relative)
}

/// Probe `drives` with the default suffix list
pub fn find_libraries(drives: &[Drive]) -> Vec<Library> {
    LibraryLocator::default().find_libraries(drives)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn finds_nothing_on_bare_drive() {
        let drive = TempDir::new().unwrap();
        let libraries = find_libraries(&[Drive::new(drive.path())]);
        assert!(libraries.is_empty());
    }

    #[test]
    fn returns_libraries_in_drive_then_suffix_order() {
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();
        fs::create_dir_all(first.path().join("Games/Steam/steamapps")).unwrap();
        fs::create_dir_all(first.path().join("SteamLibrary/steamapps")).unwrap();
        fs::create_dir_all(second.path().join("Program Files/Steam/steamapps")).unwrap();

        let libraries = find_libraries(&[Drive::new(first.path()), Drive::new(second.path())]);

        assert_eq!(libraries.len(), 3);
        assert!(libraries[0].path.ends_with("SteamLibrary/steamapps"));
        assert!(libraries[1].path.ends_with("Games/Steam/steamapps"));
        assert_eq!(libraries[2].drive, second.path());
        assert!(libraries.iter().all(Library::exists));
    }

    #[test]
    fn file_named_like_a_library_is_ignored() {
        let drive = TempDir::new().unwrap();
        fs::create_dir_all(drive.path().join("SteamLibrary")).unwrap();
        fs::write(drive.path().join("SteamLibrary/steamapps"), b"not a dir").unwrap();

        assert!(find_libraries(&[Drive::new(drive.path())]).is_empty());
    }

    #[test]
    fn extra_suffixes_are_probed_after_defaults() {
        let drive = TempDir::new().unwrap();
        fs::create_dir_all(drive.path().join("Steam/steamapps")).unwrap();

        let config = LocatorConfig::default().with_extra_suffixes([PathBuf::from("/Steam/steamapps")]);
        let libraries = LibraryLocator::new(config).find_libraries(&[Drive::new(drive.path())]);

        assert_eq!(libraries.len(), 1);
        assert_eq!(libraries[0].path, drive.path().join("Steam/steamapps"));
    }

    #[test]
    fn leading_separator_stays_under_root() {
        let joined = join_suffix(Path::new("/mnt/d"), Path::new("/SteamLibrary/steamapps"));
        assert_eq!(joined, PathBuf::from("/mnt/d/SteamLibrary/steamapps"));
    }
}
