//! Funding aggregation — campaign progress metrics from the pledge set.
//!
//! A campaign's raised amount, supporter count, and progress percentage
//! are recomputed here on every fetch from the current contribution
//! snapshot. The computation is pure and order-independent; callers own
//! the freshness of the snapshot they pass in.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::errors::{DomainError, Result};
use crate::types::{PaymentStatus, Pledge};

/// Derived funding metrics for one campaign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FundingProgress {
    /// Sum of succeeded pledge amounts.
    pub current_amount: i64,
    /// Number of distinct supporters among succeeded pledges. A supporter
    /// who pledges multiple times counts once.
    pub supporters_count: u64,
    /// floor(current_amount * 100 / goal_amount), uncapped — an overfunded
    /// campaign reports more than 100.
    pub progress_percent: i64,
}

impl FundingProgress {
    /// Progress capped at 100 for bounded visuals (progress bars).
    ///
    /// Clamping is a presentation concern; [`aggregate`] itself never
    /// caps. Callers that want the true percentage read
    /// `progress_percent` directly.
    pub fn clamped_percent(&self) -> i64 {
        self.progress_percent.min(100)
    }
}

/// Compute a campaign's funding progress from its pledge set.
///
/// Only pledges with [`PaymentStatus::Succeeded`] count toward the raised
/// amount and the supporter count; pending, failed, and unrecognised
/// statuses are excluded entirely. The pledge sequence may be empty and
/// its order does not affect the result.
///
/// # Errors
///
/// [`DomainError::InvalidGoal`] when `goal_amount` is zero or negative,
/// regardless of the pledge contents.
pub fn aggregate(goal_amount: i64, pledges: &[Pledge]) -> Result<FundingProgress> {
    if goal_amount <= 0 {
        return Err(DomainError::InvalidGoal(goal_amount));
    }

    let mut current_amount: i64 = 0;
    let mut supporters: HashSet<&str> = HashSet::new();

    for pledge in pledges {
        if pledge.payment_status != PaymentStatus::Succeeded {
            continue;
        }
        // Amounts are positive, so saturating keeps the computation total
        // even for a pathological ledger instead of panicking under
        // overflow checks.
        current_amount = current_amount.saturating_add(pledge.amount);
        supporters.insert(pledge.supporter_id.as_str());
    }

    // i128 intermediate so the *100 cannot overflow for any i64 amount;
    // the quotient itself can still exceed i64 for tiny goals, so the
    // narrowing saturates too.
    let progress_percent = ((current_amount as i128) * 100 / (goal_amount as i128))
        .min(i64::MAX as i128) as i64;

    Ok(FundingProgress {
        current_amount,
        supporters_count: supporters.len() as u64,
        progress_percent,
    })
}
