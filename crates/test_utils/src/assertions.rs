//! Custom Test Assertions
//!
//! Provides specialized assertion helpers for domain types that give
//! more meaningful error messages than standard assertions.

use core_kernel::Money;
use domain_pledge::InstallmentEntry;
use rust_decimal::Decimal;

/// Asserts that two Money values are approximately equal within a tolerance
///
/// # Panics
///
/// Panics if the currencies don't match or the amounts differ by more
/// than tolerance
pub fn assert_money_approx_eq(actual: &Money, expected: &Money, tolerance: Decimal) {
    assert_eq!(
        actual.currency(),
        expected.currency(),
        "Currency mismatch: actual={}, expected={}",
        actual.currency(),
        expected.currency()
    );

    let diff = (actual.amount() - expected.amount()).abs();
    assert!(
        diff <= tolerance,
        "Money amounts differ by more than tolerance: actual={}, expected={}, diff={}, tolerance={}",
        actual.amount(),
        expected.amount(),
        diff,
        tolerance
    );
}

/// Asserts that a schedule's minor-unit sum equals the expected total
///
/// # Panics
///
/// Panics if any amount fails minor-unit conversion or the sum differs
pub fn assert_schedule_conserves(entries: &[InstallmentEntry], expected_minor: i64) {
    let sum: i64 = entries
        .iter()
        .map(|e| {
            e.amount
                .to_minor_units()
                .unwrap_or_else(|err| panic!("unconvertible amount {}: {}", e.amount, err))
        })
        .sum();
    assert_eq!(
        sum, expected_minor,
        "Schedule sums to {} minor units, expected {}",
        sum, expected_minor
    );
}

/// Asserts that a schedule's due dates are strictly increasing
///
/// # Panics
///
/// Panics on any out-of-order or duplicate pair of dates
pub fn assert_schedule_strictly_ordered(entries: &[InstallmentEntry]) {
    for pair in entries.windows(2) {
        assert!(
            pair[0].due_date < pair[1].due_date,
            "Schedule dates not strictly increasing: {} then {}",
            pair[0].due_date,
            pair[1].due_date
        );
    }
}
