//! # Reconcile Module
//!
//! Folds per-manifest classifications into a [`ScanResult`] and performs the
//! confirmed deletions.
//!
//! Nothing here prompts or prints. Presentation code reads the scan result,
//! asks the user through the [`Workflow`] states, and calls [`remove`] or
//! [`remove_scraps`] with what was confirmed.

mod remover;
mod workflow;

pub use remover::{remove, remove_scraps, RemovalFailure, RemovalReport};
pub use workflow::{next_offer, Offer, Workflow, WorkflowState};

use crate::core::classifier::{Classification, OrphanClassifier, ScrapPair};
use crate::core::manifest::Manifest;
use crate::error::ClassifyError;
use crate::events::{null_sender, ClassifyEvent, ClassifyProgress, Event, EventSender};
use std::path::PathBuf;

/// Aggregate of one scan. Built once per run, never merged across runs.
#[derive(Debug, Default)]
pub struct ScanResult {
    /// Manifests whose install directory is missing, in input order
    pub unlinked: Vec<PathBuf>,
    /// Ghost directories with their manifests, in input order
    pub scraps: Vec<ScrapPair>,
    /// Manifests pointing at a live installation
    pub linked: usize,
    /// Manifests with no usable `installdir` or an install directory that
    /// could not be measured; never offered for deletion
    pub unresolved: Vec<ClassifyError>,
}

impl ScanResult {
    pub fn has_unlinked(&self) -> bool {
        !self.unlinked.is_empty()
    }

    pub fn has_scraps(&self) -> bool {
        !self.scraps.is_empty()
    }

    pub fn is_clean(&self) -> bool {
        !self.has_unlinked() && !self.has_scraps()
    }

    /// Number of manifests this result was built from
    pub fn total(&self) -> usize {
        self.unlinked.len() + self.scraps.len() + self.linked + self.unresolved.len()
    }
}

/// Classifies manifests and deletes confirmed orphans
#[derive(Debug, Clone, Default)]
pub struct ReconciliationEngine {
    classifier: OrphanClassifier,
}

impl ReconciliationEngine {
    pub fn new(classifier: OrphanClassifier) -> Self {
        Self { classifier }
    }

    pub fn scan(&self, manifests: &[Manifest]) -> ScanResult {
        self.scan_with_events(manifests, &null_sender())
    }

    pub fn scan_with_events(&self, manifests: &[Manifest], events: &EventSender) -> ScanResult {
        let total = manifests.len();
        events.send(Event::Classify(ClassifyEvent::Started {
            total_manifests: total,
        }));

        let mut result = ScanResult::default();

        for (index, manifest) in manifests.iter().enumerate() {
            events.send(Event::Classify(ClassifyEvent::Progress(ClassifyProgress {
                completed: index,
                total,
                current_path: manifest.path.clone(),
            })));

            match self.classifier.classify(manifest) {
                Ok((Classification::Unlinked, _)) => result.unlinked.push(manifest.path.clone()),
                Ok((_, Some(pair))) => result.scraps.push(pair),
                Ok((_, None)) => result.linked += 1,
                Err(error) => {
                    tracing::warn!(%error, "cannot classify manifest");
                    events.send(Event::Classify(ClassifyEvent::Unresolved {
                        manifest: error.manifest().clone(),
                        message: error.to_string(),
                    }));
                    result.unresolved.push(error);
                }
            }
        }

        tracing::info!(
            unlinked = result.unlinked.len(),
            scraps = result.scraps.len(),
            linked = result.linked,
            unresolved = result.unresolved.len(),
            "classified manifests"
        );
        events.send(Event::Classify(ClassifyEvent::Completed {
            unlinked: result.unlinked.len(),
            scraps: result.scraps.len(),
            unresolved: result.unresolved.len(),
        }));

        result
    }

    /// Delete unlinked manifest files. See [`remove`].
    pub fn remove(&self, paths: &[PathBuf], events: &EventSender) -> RemovalReport {
        remover::remove_with_events(paths, events)
    }

    /// Delete ghost directories and their manifests. See [`remove_scraps`].
    pub fn remove_scraps(&self, pairs: &[ScrapPair], events: &EventSender) -> RemovalReport {
        remover::remove_scraps_with_events(pairs, self.classifier.policy(), events)
    }
}

/// Classify `manifests` with the default ghost threshold
pub fn scan(manifests: &[Manifest]) -> ScanResult {
    ReconciliationEngine::default().scan(manifests)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn manifest(steamapps: &Path, id: u32, install_dir: Option<&str>) -> Manifest {
        Manifest {
            path: steamapps.join(format!("appmanifest_{id}.acf")),
            install_dir: install_dir.map(str::to_string),
            app_id: Some(id),
        }
    }

    #[test]
    fn partitions_preserving_input_order() {
        let temp = TempDir::new().unwrap();
        let common = temp.path().join("common");
        fs::create_dir_all(common.join("GhostB")).unwrap();
        fs::create_dir_all(common.join("GhostA")).unwrap();
        fs::create_dir_all(common.join("Alive")).unwrap();
        fs::write(common.join("Alive/game.bin"), vec![0u8; 4096]).unwrap();

        let manifests = vec![
            manifest(temp.path(), 5, Some("GoneB")),
            manifest(temp.path(), 1, Some("GhostB")),
            manifest(temp.path(), 2, Some("Alive")),
            manifest(temp.path(), 3, None),
            manifest(temp.path(), 4, Some("GoneA")),
            manifest(temp.path(), 6, Some("GhostA")),
        ];

        let result = scan(&manifests);

        assert_eq!(result.unlinked, vec![manifests[0].path.clone(), manifests[4].path.clone()]);
        assert_eq!(result.scraps.len(), 2);
        assert_eq!(result.scraps[0].install_dir, common.join("GhostB"));
        assert_eq!(result.scraps[1].manifest, manifests[5].path);
        assert_eq!(result.linked, 1);
        assert_eq!(result.unresolved.len(), 1);
        assert_eq!(result.total(), manifests.len());
    }

    #[test]
    fn empty_input_is_clean() {
        let result = scan(&[]);
        assert!(result.is_clean());
        assert_eq!(result.total(), 0);
    }

    #[test]
    fn custom_threshold_changes_outcome() {
        let temp = TempDir::new().unwrap();
        let game = temp.path().join("common/Saves");
        fs::create_dir_all(&game).unwrap();
        fs::write(game.join("slot1.sav"), vec![0u8; 3 * 1024]).unwrap();
        let manifests = vec![manifest(temp.path(), 9, Some("Saves"))];

        assert_eq!(scan(&manifests).linked, 1);

        let lenient = ReconciliationEngine::new(OrphanClassifier::new(
            crate::core::classifier::GhostPolicy::from_kib(8),
        ));
        assert_eq!(lenient.scan(&manifests).scraps.len(), 1);
    }
}
