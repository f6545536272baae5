//! # Pipeline Module
//!
//! Orchestrates a full scan.
//!
//! ## Pipeline Stages
//! 1. **Drives** - List mounted roots (the only fatal stage)
//! 2. **Libraries** - Probe known suffixes, or read the saved list
//! 3. **Manifests** - Read `appmanifest_*.acf` files
//! 4. **Classify** - Sort manifests into unlinked, ghost and linked
//!
//! Deletion is not part of the pipeline; callers confirm first and then use
//! [`Pipeline::engine`].

mod executor;

pub use executor::{LibrarySource, Pipeline, PipelineBuilder, PipelineConfig, PipelineResult};
