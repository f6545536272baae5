//! # Core Module
//!
//! The GUI-agnostic reconciliation engine.
//!
//! ## Modules
//! - `drives` - Lists mounted filesystem roots
//! - `library` - Finds Steam libraries under those roots
//! - `manifest` - Reads `appmanifest_*.acf` files
//! - `classifier` - Decides linked / unlinked / ghost per manifest
//! - `reconcile` - Aggregates scan results and deletes confirmed orphans
//! - `pipeline` - Runs discovery and classification end to end

pub mod classifier;
pub mod drives;
pub mod library;
pub mod manifest;
pub mod pipeline;
pub mod reconcile;

// Re-export the engine's public contract
pub use classifier::{Classification, GhostPolicy, OrphanClassifier, ScrapPair};
pub use drives::{list_drives, Drive, DriveEnumerator};
pub use library::{find_libraries, Library, LibraryLocator, LocatorConfig};
pub use manifest::{load_manifests, Manifest, ManifestLoad};
pub use reconcile::{remove, remove_scraps, scan, RemovalReport, ReconciliationEngine, ScanResult};
