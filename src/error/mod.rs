//! # Error Module
//!
//! User-friendly error types for Steam Muncher.
//!
//! ## Design Principles
//! - **Never panic** on user data - return errors instead
//! - **Include context** - paths, file names, what went wrong
//! - **Fatal vs. per-item** - only drive enumeration aborts a run; everything
//!   else is collected into result structs and counted in the final report

use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error
#[derive(Error, Debug)]
pub enum MuncherError {
    #[error("Drive enumeration error: {0}")]
    Enumeration(#[from] EnumerationError),

    #[error("Library error: {0}")]
    Library(#[from] LibraryError),

    #[error("Manifest error: {0}")]
    Manifest(#[from] ManifestError),

    #[error("Classification error: {0}")]
    Classify(#[from] ClassifyError),

    #[error("Removal error: {0}")]
    Remove(#[from] RemoveError),

    #[error("Library cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("Workflow error: {0}")]
    Workflow(#[from] WorkflowError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to render output: {0}")]
    Output(#[from] serde_json::Error),

    #[error("Terminal I/O failed: {0}")]
    Terminal(#[source] std::io::Error),
}

/// Errors listing mounted filesystem roots. Always fatal.
#[derive(Error, Debug)]
pub enum EnumerationError {
    #[error("No mounted filesystem roots were reported by the operating system")]
    Unavailable,

    #[error("Drive {path} does not exist or is not mounted")]
    UnknownDrive { path: PathBuf },
}

/// Errors touching a library directory after discovery
#[derive(Error, Debug)]
pub enum LibraryError {
    #[error("Library disappeared or cannot be listed: {path}: {source}")]
    Unavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors reading individual manifest files
#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("Failed to read manifest {path}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Library(#[from] LibraryError),
}

/// Reasons a manifest cannot be classified
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClassifyError {
    #[error("Manifest has no \"installdir\" field: {manifest}")]
    MissingInstallDir { manifest: PathBuf },

    #[error("Manifest {manifest} declares an unusable install directory {value:?}")]
    MalformedInstallDir { manifest: PathBuf, value: String },

    #[error("Cannot measure install directory {path} of {manifest}: {reason}")]
    Unmeasurable {
        manifest: PathBuf,
        path: PathBuf,
        reason: String,
    },
}

impl ClassifyError {
    /// The manifest this error is about
    pub fn manifest(&self) -> &PathBuf {
        match self {
            ClassifyError::MissingInstallDir { manifest }
            | ClassifyError::MalformedInstallDir { manifest, .. }
            | ClassifyError::Unmeasurable { manifest, .. } => manifest,
        }
    }
}

/// Per-path deletion failures
#[derive(Error, Debug)]
pub enum RemoveError {
    #[error("Failed to delete {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Install directory {path} still exists, kept its manifest {manifest}")]
    DirectorySurvived { path: PathBuf, manifest: PathBuf },
}

/// Errors with the persisted library list
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Failed to read library cache at {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write library cache at {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Library cache at {path} is corrupted. Delete this file or run without --cached-libraries.")]
    Corrupted {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to serialize library list: {0}")]
    SerializationFailed(#[source] serde_json::Error),
}

/// Out-of-order steps in the review/confirm workflow
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WorkflowError {
    #[error("Cannot {action} while {state}")]
    InvalidTransition { state: String, action: &'static str },
}

/// Convenience Result type alias
pub type Result<T> = std::result::Result<T, MuncherError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unreadable_manifest_includes_path() {
        let error = ManifestError::Unreadable {
            path: PathBuf::from("/games/steamapps/appmanifest_10.acf"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        let message = error.to_string();
        assert!(message.contains("appmanifest_10.acf"));
        assert!(message.contains("denied"));
    }

    #[test]
    fn classify_error_exposes_manifest() {
        let error = ClassifyError::MalformedInstallDir {
            manifest: PathBuf::from("/lib/appmanifest_1.acf"),
            value: "../..".to_string(),
        };
        assert_eq!(error.manifest(), &PathBuf::from("/lib/appmanifest_1.acf"));
        assert!(error.to_string().contains("\"../..\""));
    }

    #[test]
    fn unmeasurable_directory_names_both_paths() {
        let error = ClassifyError::Unmeasurable {
            manifest: PathBuf::from("/lib/appmanifest_7.acf"),
            path: PathBuf::from("/lib/common/Locked"),
            reason: "permission denied".to_string(),
        };
        assert_eq!(error.manifest(), &PathBuf::from("/lib/appmanifest_7.acf"));
        assert!(error.to_string().contains("/lib/common/Locked"));
    }

    #[test]
    fn json_failure_is_an_output_error() {
        let source = serde_json::from_str::<u32>("nope").unwrap_err();
        let error: MuncherError = source.into();
        assert!(matches!(error, MuncherError::Output(_)));
    }

    #[test]
    fn cache_error_suggests_recovery() {
        let source = serde_json::from_str::<u32>("nope").unwrap_err();
        let error = CacheError::Corrupted {
            path: PathBuf::from("/cache/libraries.json"),
            source,
        };
        assert!(error.to_string().contains("Delete this file"));
    }

    #[test]
    fn enumeration_converts_into_top_level() {
        let error: MuncherError = EnumerationError::Unavailable.into();
        assert!(matches!(error, MuncherError::Enumeration(_)));
    }
}
