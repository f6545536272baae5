//! Confirmed deletion of unlinked manifests and scrap pairs.
//!
//! Batches are not atomic: every path is attempted, and the report lists
//! exactly what was removed. Paths that vanished since the scan are skipped.

use crate::core::classifier::{GhostPolicy, ScrapPair};
use crate::error::RemoveError;
use crate::events::{null_sender, Event, EventSender, RemoveEvent};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Outcome of a deletion batch
#[derive(Debug, Default)]
pub struct RemovalReport {
    /// Paths confirmed deleted, in input order
    pub removed: Vec<PathBuf>,
    /// Paths that were already gone or were not the expected kind of entry
    pub skipped: Vec<PathBuf>,
    /// Paths that could not be deleted
    pub failed: Vec<RemovalFailure>,
}

/// A path that survived a deletion attempt
pub type RemovalFailure = RemoveError;

impl RemovalReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Delete each path that is a regular file.
///
/// Anything else (missing, directory) is skipped. Calling this again with the
/// same paths removes nothing and raises nothing.
pub fn remove(paths: &[PathBuf]) -> RemovalReport {
    remove_with_events(paths, &null_sender())
}

/// Delete each ghost directory tree, then its manifest.
///
/// Each directory is measured again with the default [`GhostPolicy`] right
/// before deletion; one that has filled up since the scan is kept. The
/// manifest is only deleted once its directory is gone, so a directory that
/// survives keeps the manifest that explains it.
pub fn remove_scraps(pairs: &[ScrapPair]) -> RemovalReport {
    remove_scraps_with_events(pairs, GhostPolicy::default(), &null_sender())
}

pub(crate) fn remove_with_events(paths: &[PathBuf], events: &EventSender) -> RemovalReport {
    let mut report = RemovalReport::default();
    for path in paths {
        remove_regular_file(path, &mut report, events);
    }
    finish(report, events)
}

pub(crate) fn remove_scraps_with_events(
    pairs: &[ScrapPair],
    policy: GhostPolicy,
    events: &EventSender,
) -> RemovalReport {
    let mut report = RemovalReport::default();

    for pair in pairs {
        if remove_tree(&pair.install_dir, policy, &mut report, events) {
            remove_regular_file(&pair.manifest, &mut report, events);
        } else {
            let error = RemoveError::DirectorySurvived {
                path: pair.install_dir.clone(),
                manifest: pair.manifest.clone(),
            };
            record_failure(pair.manifest.clone(), error, &mut report, events);
        }
    }

    finish(report, events)
}

fn remove_regular_file(path: &Path, report: &mut RemovalReport, events: &EventSender) {
    let is_file = fs::metadata(path).map(|m| m.is_file()).unwrap_or(false);
    if !is_file {
        tracing::debug!(path = %path.display(), "not a regular file, skipping");
        report.skipped.push(path.to_path_buf());
        return;
    }

    match fs::remove_file(path) {
        Ok(()) => record_removed(path, report, events),
        Err(e) if e.kind() == ErrorKind::NotFound => report.skipped.push(path.to_path_buf()),
        Err(source) => {
            let error = RemoveError::Io {
                path: path.to_path_buf(),
                source,
            };
            record_failure(path.to_path_buf(), error, report, events);
        }
    }
}

/// Returns true when nothing is left at `path` afterwards.
fn remove_tree(path: &Path, policy: GhostPolicy, report: &mut RemovalReport, events: &EventSender) -> bool {
    let metadata = match fs::symlink_metadata(path) {
        Ok(metadata) => metadata,
        Err(_) => {
            report.skipped.push(path.to_path_buf());
            return true;
        }
    };

    let result = if metadata.is_dir() {
        match policy.is_ghost(path) {
            Ok(true) => {}
            Ok(false) => {
                tracing::info!(path = %path.display(), "install directory filled up since the scan, keeping");
                report.skipped.push(path.to_path_buf());
                return false;
            }
            Err(error) => {
                tracing::warn!(path = %path.display(), %error, "cannot re-measure install directory, keeping");
                report.skipped.push(path.to_path_buf());
                return false;
            }
        }
        fs::remove_dir_all(path)
    } else if metadata.file_type().is_symlink() {
        // Only the link goes; its target is outside the library.
        remove_symlink(path)
    } else {
        tracing::debug!(path = %path.display(), "install path is no longer a directory, keeping");
        report.skipped.push(path.to_path_buf());
        return false;
    };

    match result {
        Ok(()) => {
            record_removed(path, report, events);
            true
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            report.skipped.push(path.to_path_buf());
            true
        }
        Err(source) => {
            let error = RemoveError::Io {
                path: path.to_path_buf(),
                source,
            };
            record_failure(path.to_path_buf(), error, report, events);
            false
        }
    }
}

#[cfg(windows)]
fn remove_symlink(path: &Path) -> std::io::Result<()> {
    // Directory symlinks and junctions are removed as directories on Windows.
    fs::remove_dir(path).or_else(|_| fs::remove_file(path))
}

#[cfg(not(windows))]
fn remove_symlink(path: &Path) -> std::io::Result<()> {
    fs::remove_file(path)
}

fn record_removed(path: &Path, report: &mut RemovalReport, events: &EventSender) {
    tracing::info!(path = %path.display(), "removed");
    events.send(Event::Remove(RemoveEvent::Removed {
        path: path.to_path_buf(),
    }));
    report.removed.push(path.to_path_buf());
}

fn record_failure(path: PathBuf, error: RemoveError, report: &mut RemovalReport, events: &EventSender) {
    tracing::warn!(%error, "deletion failed");
    events.send(Event::Remove(RemoveEvent::Failed {
        path,
        message: error.to_string(),
    }));
    report.failed.push(error);
}

fn finish(report: RemovalReport, events: &EventSender) -> RemovalReport {
    events.send(Event::Remove(RemoveEvent::Completed {
        removed: report.removed.len(),
        skipped: report.skipped.len(),
        failed: report.failed.len(),
    }));
    report
}
