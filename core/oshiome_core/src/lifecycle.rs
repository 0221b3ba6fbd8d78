//! Campaign lifecycle — a strict forward-only state machine.
//!
//! ```text
//! Draft ──► Active ──► Ended
//!   │          └─────► Cancelled
//!   └───────────────► Cancelled
//! ```
//!
//! Backward transitions and transitions out of terminal states (`Ended`,
//! `Cancelled`) are rejected. The aggregator is state-agnostic: ended and
//! cancelled campaigns retain their historical contributions and compute
//! the same way.

use crate::errors::{DomainError, Result};
use crate::types::CampaignStatus;

/// Whether `from -> to` is an allowed lifecycle transition.
pub fn can_transition(from: CampaignStatus, to: CampaignStatus) -> bool {
    use CampaignStatus::*;
    matches!(
        (from, to),
        (Draft, Active) | (Draft, Cancelled) | (Active, Ended) | (Active, Cancelled)
    )
}

/// Validate a lifecycle transition, returning the new status.
///
/// # Errors
///
/// [`DomainError::InvalidTransition`] for any pair not in the diagram
/// above, including self-transitions and anything involving `Unknown`.
pub fn transition(from: CampaignStatus, to: CampaignStatus) -> Result<CampaignStatus> {
    if can_transition(from, to) {
        Ok(to)
    } else {
        Err(DomainError::InvalidTransition { from, to })
    }
}

impl CampaignStatus {
    /// Terminal states have no outgoing transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, CampaignStatus::Ended | CampaignStatus::Cancelled)
    }
}
