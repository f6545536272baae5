//! Event type definitions for progress reporting.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// All events emitted by the reconciliation pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    /// Drive and library discovery
    Discovery(DiscoveryEvent),
    /// Manifest enumeration and parsing
    Manifest(ManifestEvent),
    /// Per-manifest classification
    Classify(ClassifyEvent),
    /// Deletion of unlinked manifests and scrap pairs
    Remove(RemoveEvent),
    /// Pipeline-level events
    Pipeline(PipelineEvent),
}

/// Events while locating drives and libraries
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum DiscoveryEvent {
    /// Drives were enumerated
    DrivesListed { drives: Vec<PathBuf> },
    /// A library directory was found under a drive
    LibraryFound { path: PathBuf },
    /// Libraries were taken from the persisted cache instead of probing
    LibrariesFromCache { count: usize },
    /// Discovery finished
    Completed { total_libraries: usize },
}

/// Events while reading manifests
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ManifestEvent {
    /// A manifest was parsed
    Loaded { path: PathBuf },
    /// A manifest or library could not be read; the scan continues
    Skipped { path: PathBuf, message: String },
    /// Manifest loading finished
    Completed { total_manifests: usize, skipped: usize },
}

/// Events during classification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ClassifyEvent {
    /// Classification has started
    Started { total_manifests: usize },
    /// Progress update
    Progress(ClassifyProgress),
    /// A manifest could not be resolved to an install directory
    Unresolved { manifest: PathBuf, message: String },
    /// Classification finished
    Completed { unlinked: usize, scraps: usize, unresolved: usize },
}

/// Progress information during classification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifyProgress {
    /// Manifests classified so far
    pub completed: usize,
    /// Total manifests to classify
    pub total: usize,
    /// Manifest being classified
    pub current_path: PathBuf,
}

/// Events during deletion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum RemoveEvent {
    /// A path was deleted
    Removed { path: PathBuf },
    /// A path could not be deleted
    Failed { path: PathBuf, message: String },
    /// Deletion batch finished
    Completed { removed: usize, skipped: usize, failed: usize },
}

/// Pipeline-level events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PipelineEvent {
    /// Pipeline has started
    Started,
    /// Moving to a new phase
    PhaseChanged { phase: PipelinePhase },
    /// Pipeline completed successfully
    Completed { summary: PipelineSummary },
    /// Pipeline encountered a fatal error
    Error { message: String },
}

/// Phases of the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PipelinePhase {
    Drives,
    Libraries,
    Manifests,
    Classifying,
}

/// Summary of pipeline results
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSummary {
    pub drives: usize,
    pub libraries: usize,
    pub manifests: usize,
    pub unlinked: usize,
    pub scraps: usize,
    /// Manifests whose install directory could not be determined
    pub unresolved: usize,
    /// Manifests or libraries that could not be read
    pub skipped: usize,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl std::fmt::Display for PipelinePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelinePhase::Drives => write!(f, "Listing drives"),
            PipelinePhase::Libraries => write!(f, "Locating libraries"),
            PipelinePhase::Manifests => write!(f, "Reading manifests"),
            PipelinePhase::Classifying => write!(f, "Checking install directories"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_are_serializable() {
        let event = Event::Classify(ClassifyEvent::Progress(ClassifyProgress {
            completed: 3,
            total: 10,
            current_path: PathBuf::from("/steamapps/appmanifest_70.acf"),
        }));

        let json = serde_json::to_string(&event).unwrap();
        let deserialized: Event = serde_json::from_str(&json).unwrap();

        match deserialized {
            Event::Classify(ClassifyEvent::Progress(p)) => {
                assert_eq!(p.completed, 3);
                assert_eq!(p.total, 10);
            }
            _ => panic!("Wrong event type"),
        }
    }

    #[test]
    fn phase_display_is_human_readable() {
        assert_eq!(PipelinePhase::Manifests.to_string(), "Reading manifests");
    }
}
