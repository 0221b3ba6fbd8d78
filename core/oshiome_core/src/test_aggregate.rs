use crate::aggregate::aggregate;
use crate::errors::DomainError;
use crate::invariants;
use crate::types::{PaymentStatus, Pledge};

fn succeeded(amount: i64, supporter: &str) -> Pledge {
    Pledge::new(amount, PaymentStatus::Succeeded, supporter)
}

fn pending(amount: i64, supporter: &str) -> Pledge {
    Pledge::new(amount, PaymentStatus::Pending, supporter)
}

fn failed(amount: i64, supporter: &str) -> Pledge {
    Pledge::new(amount, PaymentStatus::Failed, supporter)
}

#[test]
fn empty_pledge_set_is_all_zero() {
    let progress = aggregate(10_000, &[]).unwrap();
    assert_eq!(progress.current_amount, 0);
    assert_eq!(progress.supporters_count, 0);
    assert_eq!(progress.progress_percent, 0);
}

#[test]
fn only_succeeded_pledges_count() {
    let base = vec![succeeded(1_000, "A"), succeeded(2_000, "B")];
    let with_noise = {
        let mut v = base.clone();
        v.push(pending(9_999, "C"));
        v.push(failed(9_999, "D"));
        v.push(pending(1, "A"));
        v
    };

    let clean = aggregate(10_000, &base).unwrap();
    let noisy = aggregate(10_000, &with_noise).unwrap();
    assert_eq!(clean, noisy);
    invariants::assert_succeeded_only(&with_noise, &noisy);
}

#[test]
fn unknown_status_is_excluded_not_miscounted() {
    let pledges = vec![
        succeeded(1_000, "A"),
        Pledge::new(500, PaymentStatus::from_str_loose("refunded"), "B"),
    ];
    let progress = aggregate(10_000, &pledges).unwrap();
    assert_eq!(progress.current_amount, 1_000);
    assert_eq!(progress.supporters_count, 1);
}

#[test]
fn repeat_supporter_counts_once() {
    let one = vec![succeeded(1_000, "A")];
    let two = vec![succeeded(1_000, "A"), succeeded(500, "A")];

    let p1 = aggregate(10_000, &one).unwrap();
    let p2 = aggregate(10_000, &two).unwrap();

    assert_eq!(p2.current_amount, p1.current_amount + 500);
    assert_eq!(p2.supporters_count, p1.supporters_count);
    invariants::assert_supporters_distinct(&two, &p2);
}

#[test]
fn result_is_order_independent() {
    let mut pledges = vec![
        succeeded(300, "A"),
        pending(100, "B"),
        succeeded(200, "C"),
        failed(50, "D"),
        succeeded(150, "A"),
    ];
    let forward = aggregate(1_000, &pledges).unwrap();
    pledges.reverse();
    let backward = aggregate(1_000, &pledges).unwrap();
    assert_eq!(forward, backward);
}

#[test]
fn progress_is_floored_and_uncapped() {
    // goal=1000, current=1500 -> 150%, no clamp at this layer.
    let pledges = vec![succeeded(1_500, "A")];
    let progress = aggregate(1_000, &pledges).unwrap();
    assert_eq!(progress.progress_percent, 150);
    invariants::assert_progress_floor(1_000, &progress);

    // Flooring: 999/1000 -> 99, not 100.
    let pledges = vec![succeeded(999, "A")];
    let progress = aggregate(1_000, &pledges).unwrap();
    assert_eq!(progress.progress_percent, 99);
}

#[test]
fn clamped_percent_caps_at_100_for_display() {
    let pledges = vec![succeeded(1_500, "A")];
    let progress = aggregate(1_000, &pledges).unwrap();
    assert_eq!(progress.progress_percent, 150);
    assert_eq!(progress.clamped_percent(), 100);

    let pledges = vec![succeeded(400, "A")];
    let progress = aggregate(1_000, &pledges).unwrap();
    assert_eq!(progress.clamped_percent(), 40);
}

#[test]
fn non_positive_goal_is_rejected() {
    let pledges = vec![succeeded(1_000, "A")];
    assert_eq!(aggregate(0, &pledges), Err(DomainError::InvalidGoal(0)));
    assert_eq!(aggregate(-5, &[]), Err(DomainError::InvalidGoal(-5)));
}

#[test]
fn huge_amounts_do_not_overflow_the_percent() {
    let pledges = vec![succeeded(i64::MAX / 2, "A")];
    let progress = aggregate(i64::MAX / 2, &pledges).unwrap();
    assert_eq!(progress.progress_percent, 100);
}

#[test]
fn pathological_ledger_saturates_instead_of_panicking() {
    let pledges = vec![succeeded(i64::MAX, "A"), succeeded(i64::MAX, "B")];
    let progress = aggregate(i64::MAX, &pledges).unwrap();
    assert_eq!(progress.current_amount, i64::MAX);
    assert_eq!(progress.supporters_count, 2);
    assert_eq!(progress.progress_percent, 100);

    // A tiny goal against a saturated total still yields a result.
    let progress = aggregate(1, &[succeeded(i64::MAX, "A")]).unwrap();
    assert_eq!(progress.progress_percent, i64::MAX);
}

#[test]
fn scenario_exact_goal_with_repeat_and_pending() {
    let pledges = vec![
        succeeded(300_000, "A"),
        succeeded(50_000, "A"),
        pending(100_000, "B"),
        succeeded(150_000, "C"),
    ];
    let progress = aggregate(500_000, &pledges).unwrap();
    assert_eq!(progress.current_amount, 500_000);
    assert_eq!(progress.supporters_count, 2);
    assert_eq!(progress.progress_percent, 100);
}

#[test]
fn scenario_failed_payment_does_not_count() {
    let pledges = vec![succeeded(200_000, "X"), failed(200_000, "Y")];
    let progress = aggregate(400_000, &pledges).unwrap();
    assert_eq!(progress.current_amount, 200_000);
    assert_eq!(progress.supporters_count, 1);
    assert_eq!(progress.progress_percent, 50);
}
