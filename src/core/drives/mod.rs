//! # Drives Module
//!
//! Lists the mounted filesystem roots a scan starts from.
//!
//! The OS gives no ordering guarantee, so callers that need a stable order
//! sort the result themselves.

use crate::error::EnumerationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use sysinfo::Disks;

/// A filesystem root such as `C:\` or `/mnt/games`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Drive {
    root: PathBuf,
}

impl Drive {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl fmt::Display for Drive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.root.display())
    }
}

/// Source of drive roots
///
/// Implement this trait to substitute the platform listing (e.g., for testing).
pub trait DriveEnumerator: Send + Sync {
    fn list_drives(&self) -> Result<Vec<Drive>, EnumerationError>;
}

/// Mounted volumes as reported by the operating system
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemDrives;

impl DriveEnumerator for SystemDrives {
    fn list_drives(&self) -> Result<Vec<Drive>, EnumerationError> {
        let disks = Disks::new_with_refreshed_list();
        let mut drives: Vec<Drive> = Vec::new();

        for disk in disks.list() {
            let drive = Drive::new(disk.mount_point());
            if !drives.contains(&drive) {
                drives.push(drive);
            }
        }

        if drives.is_empty() {
            return Err(EnumerationError::Unavailable);
        }

        tracing::debug!(count = drives.len(), "listed mounted drives");
        Ok(drives)
    }
}

/// A caller-chosen set of roots
#[derive(Debug, Clone, Default)]
pub struct FixedDrives {
    roots: Vec<PathBuf>,
}

impl FixedDrives {
    pub fn new(roots: Vec<PathBuf>) -> Self {
        Self { roots }
    }
}

impl DriveEnumerator for FixedDrives {
    fn list_drives(&self) -> Result<Vec<Drive>, EnumerationError> {
        self.roots
            .iter()
            .map(|root| {
                if root.is_dir() {
                    Ok(Drive::new(root.clone()))
                } else {
                    Err(EnumerationError::UnknownDrive { path: root.clone() })
                }
            })
            .collect()
    }
}

/// Query the platform for every mounted local root
pub fn list_drives() -> Result<Vec<Drive>, EnumerationError> {
    SystemDrives.list_drives()
}
