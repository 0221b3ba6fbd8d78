//! Domain-level error types.

use thiserror::Error;

use crate::types::CampaignStatus;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    /// A campaign goal must be a positive amount in the smallest currency
    /// unit; zero or negative goals make progress undefined.
    #[error("Invalid goal amount: {0}")]
    InvalidGoal(i64),

    /// The campaign lifecycle is forward-only; this pair is not allowed.
    #[error("Invalid status transition: {from} -> {to}")]
    InvalidTransition {
        from: CampaignStatus,
        to: CampaignStatus,
    },

    /// A remote record could not be normalized into the internal shape.
    /// Rejected at ingestion rather than coerced into the data set.
    #[error("Malformed record: {0}")]
    MalformedRecord(String),
}

pub type Result<T> = std::result::Result<T, DomainError>;
