//! Test-support invariant assertions over the domain model.

#![allow(dead_code)]

use std::collections::HashSet;

use crate::aggregate::FundingProgress;
use crate::types::{CampaignStatus, PaymentStatus, Pledge};

/// INV-1: A campaign goal must always be positive.
pub fn assert_goal_positive(goal_amount: i64) {
    assert!(
        goal_amount > 0,
        "INV-1 violated: non-positive goal ({goal_amount})"
    );
}

/// INV-2: Only succeeded pledges count — the aggregated amount equals the
/// manual sum over the succeeded subset.
pub fn assert_succeeded_only(pledges: &[Pledge], progress: &FundingProgress) {
    let expected: i64 = pledges
        .iter()
        .filter(|p| p.payment_status == PaymentStatus::Succeeded)
        .map(|p| p.amount)
        .sum();
    assert_eq!(
        progress.current_amount, expected,
        "INV-2 violated: aggregated {} != succeeded sum {}",
        progress.current_amount, expected
    );
}

/// INV-3: Supporters are counted distinct — the count equals the number
/// of unique supporter ids among succeeded pledges.
pub fn assert_supporters_distinct(pledges: &[Pledge], progress: &FundingProgress) {
    let distinct: HashSet<&str> = pledges
        .iter()
        .filter(|p| p.payment_status == PaymentStatus::Succeeded)
        .map(|p| p.supporter_id.as_str())
        .collect();
    assert_eq!(
        progress.supporters_count,
        distinct.len() as u64,
        "INV-3 violated: supporters_count {} != distinct {}",
        progress.supporters_count,
        distinct.len()
    );
}

/// INV-4: Progress is floor(current * 100 / goal), uncapped.
pub fn assert_progress_floor(goal_amount: i64, progress: &FundingProgress) {
    let expected = (progress.current_amount as i128) * 100 / (goal_amount as i128);
    assert_eq!(
        progress.progress_percent as i128, expected,
        "INV-4 violated: percent {} != floor({} * 100 / {})",
        progress.progress_percent, progress.current_amount, goal_amount
    );
}

/// INV-5: Lifecycle transition validity. Only forward transitions:
///   Draft  -> Active | Cancelled
///   Active -> Ended  | Cancelled
///   Ended, Cancelled -> (none)
pub fn assert_valid_status_transition(from: CampaignStatus, to: CampaignStatus) {
    assert!(
        crate::lifecycle::can_transition(from, to),
        "INV-5 violated: invalid status transition from {from} to {to}"
    );
}
