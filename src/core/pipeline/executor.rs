//! Pipeline execution implementation.

use crate::core::classifier::{GhostPolicy, OrphanClassifier};
use crate::core::drives::{Drive, DriveEnumerator, FixedDrives, SystemDrives};
use crate::core::library::{Library, LibraryCache, LibraryLocator, LocatorConfig};
use crate::core::manifest::ManifestStore;
use crate::core::reconcile::{ReconciliationEngine, ScanResult};
use crate::error::{CacheError, ManifestError, MuncherError};
use crate::events::{
    null_sender, DiscoveryEvent, Event, EventSender, PipelineEvent, PipelinePhase,
    PipelineSummary,
};
use std::path::PathBuf;
use std::time::Instant;

/// Where the library list comes from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LibrarySource {
    /// Always probe drives
    #[default]
    Probe,
    /// Use the saved list when there is one, otherwise probe
    CachedOrProbe,
}

/// Result of pipeline execution
#[derive(Debug)]
pub struct PipelineResult {
    /// Drives that were searched
    pub drives: Vec<Drive>,
    /// Libraries found (or loaded from cache)
    pub libraries: Vec<Library>,
    /// Manifests that were read successfully
    pub manifests: usize,
    /// Classification outcome
    pub scan: ScanResult,
    /// Manifests or libraries that could not be read (non-fatal)
    pub skipped: Vec<ManifestError>,
    /// Library cache problems (non-fatal)
    pub cache_errors: Vec<CacheError>,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl PipelineResult {
    pub fn summary(&self) -> PipelineSummary {
        PipelineSummary {
            drives: self.drives.len(),
            libraries: self.libraries.len(),
            manifests: self.manifests,
            unlinked: self.scan.unlinked.len(),
            scraps: self.scan.scraps.len(),
            unresolved: self.scan.unresolved.len(),
            skipped: self.skipped.len(),
            duration_ms: self.duration_ms,
        }
    }
}

/// Configuration for the pipeline
#[derive(Debug, Clone, Default)]
pub struct PipelineConfig {
    /// Library suffixes to probe
    pub locator: LocatorConfig,
    /// Ghost directory threshold
    pub ghost: GhostPolicy,
    pub library_source: LibrarySource,
}

/// Builder for pipeline configuration
pub struct PipelineBuilder {
    config: PipelineConfig,
    drives: Option<Box<dyn DriveEnumerator>>,
    cache: Option<LibraryCache>,
}

impl PipelineBuilder {
    pub fn new() -> Self {
        Self {
            config: PipelineConfig::default(),
            drives: None,
            cache: None,
        }
    }

    /// Replace the drive source (defaults to every mounted volume)
    pub fn drives(mut self, drives: Box<dyn DriveEnumerator>) -> Self {
        self.drives = Some(drives);
        self
    }

    /// Restrict the scan to these roots
    pub fn only_drives(self, roots: Vec<PathBuf>) -> Self {
        self.drives(Box::new(FixedDrives::new(roots)))
    }

    pub fn locator(mut self, locator: LocatorConfig) -> Self {
        self.config.locator = locator;
        self
    }

    pub fn ghost_policy(mut self, policy: GhostPolicy) -> Self {
        self.config.ghost = policy;
        self
    }

    /// Persist probed libraries here and allow reading them back
    pub fn library_cache(mut self, cache: LibraryCache) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn library_source(mut self, source: LibrarySource) -> Self {
        self.config.library_source = source;
        self
    }

    pub fn build(self) -> Pipeline {
        Pipeline {
            config: self.config,
            drives: self.drives.unwrap_or_else(|| Box::new(SystemDrives)),
            cache: self.cache,
        }
    }
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Drives -> libraries -> manifests -> scan result
pub struct Pipeline {
    config: PipelineConfig,
    drives: Box<dyn DriveEnumerator>,
    cache: Option<LibraryCache>,
}

impl Pipeline {
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Cache the library list is read from and saved to, if any
    pub fn library_cache(&self) -> Option<&LibraryCache> {
        self.cache.as_ref()
    }

    /// Engine configured with this pipeline's ghost policy, for the removal step
    pub fn engine(&self) -> ReconciliationEngine {
        ReconciliationEngine::new(OrphanClassifier::new(self.config.ghost))
    }

    /// Run the pipeline without events
    pub fn run(&self) -> Result<PipelineResult, MuncherError> {
        self.run_with_events(&null_sender())
    }

    /// Run the pipeline with event reporting.
    ///
    /// Only drive enumeration is fatal; everything else is collected into the
    /// result.
    pub fn run_with_events(&self, events: &EventSender) -> Result<PipelineResult, MuncherError> {
        let start_time = Instant::now();
        let mut cache_errors = Vec::new();

        events.send(Event::Pipeline(PipelineEvent::Started));

        // Phase 1: Drives
        events.send(Event::Pipeline(PipelineEvent::PhaseChanged {
            phase: PipelinePhase::Drives,
        }));

        let drives = match self.drives.list_drives() {
            Ok(drives) => drives,
            Err(error) => {
                events.send(Event::Pipeline(PipelineEvent::Error {
                    message: error.to_string(),
                }));
                return Err(error.into());
            }
        };
        events.send(Event::Discovery(DiscoveryEvent::DrivesListed {
            drives: drives.iter().map(|d| d.root().to_path_buf()).collect(),
        }));

        // Phase 2: Libraries
        events.send(Event::Pipeline(PipelineEvent::PhaseChanged {
            phase: PipelinePhase::Libraries,
        }));

        let libraries = self.libraries(&drives, events, &mut cache_errors);
        events.send(Event::Discovery(DiscoveryEvent::Completed {
            total_libraries: libraries.len(),
        }));

        // Phase 3: Manifests
        events.send(Event::Pipeline(PipelineEvent::PhaseChanged {
            phase: PipelinePhase::Manifests,
        }));

        let load = ManifestStore::new().load_manifests_with_events(&libraries, events);

        // Phase 4: Classification
        events.send(Event::Pipeline(PipelineEvent::PhaseChanged {
            phase: PipelinePhase::Classifying,
        }));

        let scan = self.engine().scan_with_events(&load.manifests, events);

        let result = PipelineResult {
            drives,
            libraries,
            manifests: load.manifests.len(),
            scan,
            skipped: load.errors,
            cache_errors,
            duration_ms: start_time.elapsed().as_millis() as u64,
        };

        events.send(Event::Pipeline(PipelineEvent::Completed {
            summary: result.summary(),
        }));

        Ok(result)
    }

    /// Libraries for `drives`, drive by drive.
    ///
    /// With [`LibrarySource::CachedOrProbe`] a drive that has cached entries
    /// uses them; every other drive is probed. An empty cache covers nothing.
    fn libraries(
        &self,
        drives: &[Drive],
        events: &EventSender,
        cache_errors: &mut Vec<CacheError>,
    ) -> Vec<Library> {
        let mut cached = Vec::new();
        if let (LibrarySource::CachedOrProbe, Some(cache)) = (self.config.library_source, &self.cache) {
            match cache.load() {
                Ok(Some(libraries)) => cached = libraries,
                Ok(None) => {}
                Err(error) => {
                    tracing::warn!(%error, "ignoring library cache");
                    cache_errors.push(error);
                }
            }
        }

        let locator = LibraryLocator::new(self.config.locator.clone());
        let mut libraries = Vec::new();
        let mut from_cache = 0;
        let mut probed = 0;

        for drive in drives {
            let hits: Vec<Library> = cached
                .iter()
                .filter(|library| library.drive.as_path() == drive.root())
                .cloned()
                .collect();

            if hits.is_empty() {
                for library in locator.find_libraries(std::slice::from_ref(drive)) {
                    events.send(Event::Discovery(DiscoveryEvent::LibraryFound {
                        path: library.path.clone(),
                    }));
                    libraries.push(library);
                }
                probed += 1;
            } else {
                from_cache += hits.len();
                libraries.extend(hits);
            }
        }

        if from_cache > 0 {
            tracing::debug!(count = from_cache, "libraries taken from cache");
            events.send(Event::Discovery(DiscoveryEvent::LibrariesFromCache {
                count: from_cache,
            }));
        }

        if probed > 0 {
            if let Some(cache) = &self.cache {
                // Keep what the cache knows about drives outside this run.
                let mut saved: Vec<Library> = cached
                    .into_iter()
                    .filter(|library| !drives.iter().any(|d| library.drive.as_path() == d.root()))
                    .collect();
                saved.extend(libraries.iter().cloned());

                if let Err(error) = cache.save(&saved) {
                    tracing::warn!(%error, "could not save library cache");
                    cache_errors.push(error);
                }
            }
        }

        libraries
    }
}
