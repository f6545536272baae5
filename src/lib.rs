//! # Steam Muncher
//!
//! Finds Steam app manifests that no longer point at an installed game and
//! offers to clean them up.
//!
//! ## Core Philosophy
//! - **Never delete without asking** - the engine only returns data, callers confirm
//! - **Report exactly what happened** - removal reports list only confirmed deletions
//! - **Tolerate a changing disk** - files vanishing mid-run are no-ops, not errors
//!
//! ## Architecture
//! The library is split into a core engine (GUI-agnostic) and presentation layers:
//! - `core` - Drive, library and manifest discovery plus orphan reconciliation
//! - `events` - Event-driven progress reporting (GUI-ready)
//! - `error` - User-friendly error types
//! - `cli` - Command-line interface (binary only)

pub mod core;
pub mod error;
pub mod events;

// Re-export commonly used types at the crate root
pub use error::{MuncherError, Result};

/// Initialize tracing for the library
///
/// This should be called by the application entry point (CLI or GUI).
/// `default_directive` applies when `RUST_LOG` is unset.
pub fn init_tracing(default_directive: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_directive));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    // A second call (e.g. from tests) keeps the first subscriber.
    let _ = tracing::subscriber::set_global_default(subscriber);
}
