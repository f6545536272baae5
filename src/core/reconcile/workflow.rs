//! Review-then-confirm policy for acting on a scan.
//!
//! ```text
//! Idle -> Scanned -> ReviewedUnlinked | SkippedReview -> ConfirmedDelete | Declined -> Reported
//! ```
//!
//! Unlinked manifests take precedence: scrap pairs are only offered when a
//! scan found no unlinked manifests. A clean scan goes straight to `Reported`.

use super::ScanResult;
use crate::core::classifier::ScrapPair;
use crate::error::WorkflowError;
use std::fmt;
use std::path::PathBuf;

/// What the user is asked to act on after a scan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Offer<'a> {
    Unlinked(&'a [PathBuf]),
    Scraps(&'a [ScrapPair]),
    Clean,
}

/// Pick the single offer for a scan result
pub fn next_offer(result: &ScanResult) -> Offer<'_> {
    if result.has_unlinked() {
        Offer::Unlinked(&result.unlinked)
    } else if result.has_scraps() {
        Offer::Scraps(&result.scraps)
    } else {
        Offer::Clean
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowState {
    Idle,
    Scanned { has_unlinked: bool, has_scraps: bool },
    /// The offered list was shown to the user
    ReviewedUnlinked,
    SkippedReview,
    ConfirmedDelete,
    Declined,
    Reported,
}

impl fmt::Display for WorkflowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkflowState::Idle => write!(f, "idle"),
            WorkflowState::Scanned { .. } => write!(f, "scanned"),
            WorkflowState::ReviewedUnlinked => write!(f, "reviewed"),
            WorkflowState::SkippedReview => write!(f, "review skipped"),
            WorkflowState::ConfirmedDelete => write!(f, "deletion confirmed"),
            WorkflowState::Declined => write!(f, "declined"),
            WorkflowState::Reported => write!(f, "reported"),
        }
    }
}

/// Tracks one run through the interactive flow
#[derive(Debug, Clone)]
pub struct Workflow {
    state: WorkflowState,
}

impl Default for Workflow {
    fn default() -> Self {
        Self::new()
    }
}

impl Workflow {
    pub fn new() -> Self {
        Self {
            state: WorkflowState::Idle,
        }
    }

    pub fn state(&self) -> WorkflowState {
        self.state
    }

    /// Record the scan and return what should be offered
    pub fn scanned<'a>(&mut self, result: &'a ScanResult) -> Result<Offer<'a>, WorkflowError> {
        self.expect(matches!(self.state, WorkflowState::Idle), "record a scan")?;

        let offer = next_offer(result);
        self.state = match offer {
            Offer::Clean => WorkflowState::Reported,
            _ => WorkflowState::Scanned {
                has_unlinked: result.has_unlinked(),
                has_scraps: result.has_scraps(),
            },
        };
        Ok(offer)
    }

    /// Record whether the user looked at the offered list
    pub fn review(&mut self, shown: bool) -> Result<(), WorkflowError> {
        self.expect(
            matches!(self.state, WorkflowState::Scanned { .. }),
            "review the offer",
        )?;
        self.state = if shown {
            WorkflowState::ReviewedUnlinked
        } else {
            WorkflowState::SkippedReview
        };
        Ok(())
    }

    /// Record the delete decision. Returns true when deletion may proceed.
    pub fn confirm(&mut self, accepted: bool) -> Result<bool, WorkflowError> {
        self.expect(
            matches!(
                self.state,
                WorkflowState::ReviewedUnlinked | WorkflowState::SkippedReview
            ),
            "confirm deletion",
        )?;
        self.state = if accepted {
            WorkflowState::ConfirmedDelete
        } else {
            WorkflowState::Declined
        };
        Ok(accepted)
    }

    pub fn report(&mut self) -> Result<(), WorkflowError> {
        self.expect(
            matches!(
                self.state,
                WorkflowState::ConfirmedDelete | WorkflowState::Declined
            ),
            "report",
        )?;
        self.state = WorkflowState::Reported;
        Ok(())
    }

    fn expect(&self, allowed: bool, action: &'static str) -> Result<(), WorkflowError> {
        if allowed {
            Ok(())
        } else {
            Err(WorkflowError::InvalidTransition {
                state: self.state.to_string(),
                action,
            })
        }
    }
}
