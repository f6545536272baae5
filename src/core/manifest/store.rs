//! Enumerates and reads manifest files across libraries.

use super::{is_manifest_file_name, Manifest};
use crate::core::library::Library;
use crate::error::{LibraryError, ManifestError};
use crate::events::{null_sender, Event, EventSender, ManifestEvent};
use std::fs;
use std::path::{Path, PathBuf};

/// Result of loading manifests
#[derive(Debug, Default)]
pub struct ManifestLoad {
    /// Successfully parsed manifests, library by library, sorted by file name within each
    pub manifests: Vec<Manifest>,
    /// Files or libraries that could not be read (non-fatal)
    pub errors: Vec<ManifestError>,
}

/// Reads `appmanifest_*.acf` files from libraries
#[derive(Debug, Default, Clone, Copy)]
pub struct ManifestStore;

impl ManifestStore {
    pub fn new() -> Self {
        Self
    }

    pub fn load_manifests(&self, libraries: &[Library]) -> ManifestLoad {
        self.load_manifests_with_events(libraries, &null_sender())
    }

    pub fn load_manifests_with_events(
        &self,
        libraries: &[Library],
        events: &EventSender,
    ) -> ManifestLoad {
        let mut load = ManifestLoad::default();

        for library in libraries {
            let paths = match manifest_paths(&library.path) {
                Ok(paths) => paths,
                Err(error) => {
                    skip(&mut load, events, library.path.clone(), error.into());
                    continue;
                }
            };

            for path in paths {
                match read_manifest(&path) {
                    Ok(manifest) => {
                        events.send(Event::Manifest(ManifestEvent::Loaded {
                            path: manifest.path.clone(),
                        }));
                        load.manifests.push(manifest);
                    }
                    Err(error) => skip(&mut load, events, path, error),
                }
            }
        }

        tracing::info!(
            manifests = load.manifests.len(),
            skipped = load.errors.len(),
            "loaded app manifests"
        );
        events.send(Event::Manifest(ManifestEvent::Completed {
            total_manifests: load.manifests.len(),
            skipped: load.errors.len(),
        }));

        load
    }
}

fn skip(load: &mut ManifestLoad, events: &EventSender, path: PathBuf, error: ManifestError) {
    tracing::warn!(path = %path.display(), %error, "skipping unreadable manifest source");
    events.send(Event::Manifest(ManifestEvent::Skipped {
        path,
        message: error.to_string(),
    }));
    load.errors.push(error);
}

/// Matching manifest files in one library, sorted by file name
fn manifest_paths(library: &Path) -> Result<Vec<PathBuf>, LibraryError> {
    let unavailable = |source: std::io::Error| LibraryError::Unavailable {
        path: library.to_path_buf(),
        source,
    };

    let mut paths = Vec::new();
    for entry in fs::read_dir(library).map_err(unavailable)? {
        let entry = entry.map_err(unavailable)?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        if is_manifest_file_name(name) && entry.path().is_file() {
            paths.push(entry.path());
        }
    }

    paths.sort();
    Ok(paths)
}

fn read_manifest(path: &Path) -> Result<Manifest, ManifestError> {
    let bytes = fs::read(path).map_err(|source| ManifestError::Unreadable {
        path: path.to_path_buf(),
        source,
    })?;
    let contents = String::from_utf8_lossy(&bytes);
    Ok(Manifest::from_contents(path, &contents))
}

/// Load manifests from `libraries` without progress events
pub fn load_manifests(libraries: &[Library]) -> ManifestLoad {
    ManifestStore::new().load_manifests(libraries)
}
