//! # Classifier Module
//!
//! Decides what a manifest's install directory says about the installation.
//!
//! - **Unlinked** - `common/<installdir>` does not exist
//! - **Ghost** - it exists but holds almost nothing (see [`GhostPolicy`])
//! - **Linked** - anything else
//!
//! Classification is a pure function of the manifest and the filesystem at
//! call time. It returns the scrap pair for a ghost instead of recording it
//! anywhere, so callers fold results however they like.

mod ghost;

pub use ghost::{GhostPolicy, DEFAULT_GHOST_THRESHOLD_BYTES};

use crate::core::manifest::Manifest;
use crate::error::ClassifyError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Component, Path, PathBuf};

/// Outcome for one manifest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Classification {
    Linked,
    Unlinked,
    Ghost,
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Classification::Linked => write!(f, "linked"),
            Classification::Unlinked => write!(f, "unlinked"),
            Classification::Ghost => write!(f, "ghost"),
        }
    }
}

/// A ghost install directory and the manifest that points at it.
///
/// Always produced and deleted together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrapPair {
    pub install_dir: PathBuf,
    pub manifest: PathBuf,
}

/// Classifies manifests against the filesystem
#[derive(Debug, Clone, Default)]
pub struct OrphanClassifier {
    policy: GhostPolicy,
}

impl OrphanClassifier {
    pub fn new(policy: GhostPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> GhostPolicy {
        self.policy
    }

    /// Classify one manifest.
    ///
    /// A missing or unusable `installdir` is an error rather than a guess, as
    /// is a directory that cannot be fully read. A missing directory is a
    /// normal `Unlinked` outcome.
    pub fn classify(
        &self,
        manifest: &Manifest,
    ) -> Result<(Classification, Option<ScrapPair>), ClassifyError> {
        let resolved = resolve_install_path(manifest)?;

        if !resolved.exists() {
            tracing::debug!(manifest = %manifest.path.display(), "install directory missing");
            return Ok((Classification::Unlinked, None));
        }

        if !resolved.is_dir() {
            tracing::debug!(path = %resolved.display(), "install path is not a directory");
            return Ok((Classification::Linked, None));
        }

        let is_ghost = self.policy.is_ghost(&resolved).map_err(|error| {
            tracing::warn!(path = %resolved.display(), %error, "cannot measure install directory");
            ClassifyError::Unmeasurable {
                manifest: manifest.path.clone(),
                path: resolved.clone(),
                reason: error.to_string(),
            }
        })?;

        if is_ghost {
            tracing::debug!(path = %resolved.display(), "install directory is a ghost");
            let pair = ScrapPair {
                install_dir: resolved,
                manifest: manifest.path.clone(),
            };
            return Ok((Classification::Ghost, Some(pair)));
        }

        Ok((Classification::Linked, None))
    }
}

/// `<manifest dir>/common/<installdir>`, rejecting values that would point
/// anywhere other than a child of `common`.
pub fn resolve_install_path(manifest: &Manifest) -> Result<PathBuf, ClassifyError> {
    let value = manifest
        .install_dir
        .as_deref()
        .ok_or_else(|| ClassifyError::MissingInstallDir {
            manifest: manifest.path.clone(),
        })?;

    let relative = Path::new(value);
    let is_plain = relative.components().next().is_some()
        && relative
            .components()
            .all(|component| matches!(component, Component::Normal(_)));

    if value.trim().is_empty() || !is_plain {
        return Err(ClassifyError::MalformedInstallDir {
            manifest: manifest.path.clone(),
            value: value.to_string(),
        });
    }

    Ok(manifest.common_dir().join(relative))
}
