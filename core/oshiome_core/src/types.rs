//! Shared data structures for campaigns and contributions.
//!
//! ## Design decisions
//!
//! ### Derived metrics are never stored
//!
//! `current_amount`, `supporters_count`, and `progress_percent` are a pure
//! function of a campaign's contribution set at query time (see
//! [`crate::aggregate`]). They do not appear on [`Campaign`] and must not
//! be persisted as authoritative state — the contribution ledger is the
//! source of truth and a stored copy would drift from it.
//!
//! ### Unknown variants
//!
//! Status strings read back from storage or remote payloads may be values
//! this build does not recognise. Both status enums carry an `Unknown`
//! variant so such rows stay visible instead of being coerced; the
//! aggregator excludes them (uncounted rather than miscounted).

use std::fmt;

use serde::{Deserialize, Serialize};

/// Lifecycle status of a campaign.
///
/// Transitions are forward-only; see [`crate::lifecycle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CampaignStatus {
    /// Registered but not yet approved for display.
    Draft,
    /// Approved and accepting contributions.
    Active,
    /// Deadline passed or goal closed; contributions retained.
    Ended,
    /// Withdrawn by the organizer; contributions retained.
    Cancelled,
    /// A stored value this build does not recognise.
    Unknown,
}

impl CampaignStatus {
    pub fn from_str_loose(s: &str) -> Self {
        match s {
            "draft" => Self::Draft,
            "active" => Self::Active,
            "ended" => Self::Ended,
            "cancelled" => Self::Cancelled,
            _ => Self::Unknown,
        }
    }

    /// Short identifier string suitable for storage in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Active => "active",
            Self::Ended => "ended",
            Self::Cancelled => "cancelled",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for CampaignStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payment state of a single contribution.
///
/// `Pending` is the only non-terminal state; the gateway flow moves a
/// contribution to `Succeeded` or `Failed` exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Succeeded,
    Failed,
    /// A stored value this build does not recognise; never counted.
    Unknown,
}

impl PaymentStatus {
    pub fn from_str_loose(s: &str) -> Self {
        match s {
            "pending" => Self::Pending,
            "succeeded" => Self::Succeeded,
            "failed" => Self::Failed,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
            Self::Unknown => "unknown",
        }
    }

    /// Whether this state can still change.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fan-funded advertising campaign seeking pledges toward a goal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Campaign {
    pub id: i64,
    pub title: String,
    pub description: String,
    /// Target amount in the smallest currency unit. Positive, immutable
    /// once published.
    pub goal_amount: i64,
    /// Unix timestamp by which the campaign ends.
    pub deadline: i64,
    pub creator_id: i64,
    pub status: CampaignStatus,
    pub image_url: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// A single supporter's pledge toward a campaign.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contribution {
    pub id: i64,
    pub campaign_id: i64,
    pub supporter_id: i64,
    /// Pledged amount in the smallest currency unit. Positive.
    pub amount: i64,
    pub message: Option<String>,
    pub payment_status: PaymentStatus,
    /// Hosted-checkout session id, once a session has been created.
    pub checkout_session_id: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// The projection of a contribution consumed by the aggregator.
///
/// Richer record shapes are projected down to this before aggregation;
/// the supporter id stays opaque (distinctness is all that matters).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pledge {
    pub amount: i64,
    pub payment_status: PaymentStatus,
    pub supporter_id: String,
}

impl Pledge {
    pub fn new(amount: i64, payment_status: PaymentStatus, supporter_id: impl Into<String>) -> Self {
        Self {
            amount,
            payment_status,
            supporter_id: supporter_id.into(),
        }
    }
}
