//! Persisted library list, so repeated runs can skip probing.

use super::Library;
use crate::error::CacheError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

#[derive(Debug, Serialize, Deserialize)]
struct CacheFile {
    saved_at: DateTime<Utc>,
    libraries: Vec<Library>,
}

/// JSON file holding the last discovered library list
#[derive(Debug, Clone)]
pub struct LibraryCache {
    path: PathBuf,
}

impl LibraryCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<user cache dir>/steam-muncher/libraries.json`
    pub fn default_path() -> PathBuf {
        dirs::cache_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("steam-muncher")
            .join("libraries.json")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the saved list. `None` when nothing has been saved yet.
    ///
    /// Libraries that no longer exist are dropped.
    pub fn load(&self) -> Result<Option<Vec<Library>>, CacheError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(CacheError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        let file: CacheFile = serde_json::from_str(&raw).map_err(|source| CacheError::Corrupted {
            path: self.path.clone(),
            source,
        })?;

        let total = file.libraries.len();
        let libraries: Vec<Library> = file.libraries.into_iter().filter(Library::exists).collect();
        if libraries.len() < total {
            tracing::warn!(
                dropped = total - libraries.len(),
                "cached libraries no longer exist"
            );
        }
        tracing::debug!(saved_at = %file.saved_at, count = libraries.len(), "loaded library cache");

        Ok(Some(libraries))
    }

    pub fn save(&self, libraries: &[Library]) -> Result<(), CacheError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| CacheError::Write {
                path: self.path.clone(),
                source,
            })?;
        }

        let file = CacheFile {
            saved_at: Utc::now(),
            libraries: libraries.to_vec(),
        };
        let json = serde_json::to_string_pretty(&file).map_err(CacheError::SerializationFailed)?;

        fs::write(&self.path, json).map_err(|source| CacheError::Write {
            path: self.path.clone(),
            source,
        })
    }
}
