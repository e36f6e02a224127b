//! Schedule reconciliation
//!
//! Final gate before persistence: checks that a resolved schedule still
//! agrees with the plan's declared total, that no two entries share a date,
//! and that user-supplied entries are not back-dated. The first violated
//! rule short-circuits; a rejected schedule is never partially applied.

use chrono::NaiveDate;
use std::collections::HashSet;

use crate::distribution::ScheduledInstallment;
use crate::error::PlanError;

/// Where a schedule came from
///
/// Only schedules supplied directly by a caller are subject to the past-date
/// rule; system-generated schedules may legitimately start in the past
/// (e.g. a backfilled plan).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleOrigin {
    Generated,
    UserSupplied,
}

/// Validates a resolved schedule against the plan's declared total
///
/// Checks, in order: non-empty schedule, exact minor-unit sum match (the
/// resolver has already absorbed any in-tolerance rounding), pairwise date
/// uniqueness, and for user-supplied schedules no date strictly before
/// `today`.
pub fn validate_schedule(
    schedule: &[ScheduledInstallment],
    expected_units: i64,
    origin: ScheduleOrigin,
    today: NaiveDate,
) -> Result<(), PlanError> {
    if schedule.is_empty() {
        return Err(PlanError::input(
            "custom_installments",
            "schedule must contain at least one installment",
        ));
    }

    let mut sum = 0i64;
    for entry in schedule {
        sum += entry.amount.to_minor_units()?;
    }
    if sum != expected_units {
        return Err(PlanError::TotalMismatch {
            expected: expected_units,
            actual: sum,
        });
    }

    let mut seen = HashSet::with_capacity(schedule.len());
    for entry in schedule {
        if !seen.insert(entry.due_date) {
            return Err(PlanError::DuplicateDate(entry.due_date));
        }
    }

    if origin == ScheduleOrigin::UserSupplied {
        if let Some(entry) = schedule.iter().find(|e| e.due_date < today) {
            return Err(PlanError::PastDate(entry.due_date));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::{Currency, Money};
    use rust_decimal_macros::dec;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn entry(date: NaiveDate, amount: rust_decimal::Decimal) -> ScheduledInstallment {
        ScheduledInstallment {
            due_date: date,
            amount: Money::new(amount, Currency::ILS),
            note: None,
        }
    }

    #[test]
    fn test_valid_schedule_passes() {
        let schedule = vec![
            entry(ymd(2025, 1, 1), dec!(25.00)),
            entry(ymd(2025, 2, 1), dec!(25.00)),
        ];
        assert!(validate_schedule(
            &schedule,
            5000,
            ScheduleOrigin::Generated,
            ymd(2025, 1, 1)
        )
        .is_ok());
    }

    #[test]
    fn test_empty_schedule_rejected_first() {
        let err =
            validate_schedule(&[], 5000, ScheduleOrigin::Generated, ymd(2025, 1, 1)).unwrap_err();
        assert!(matches!(err, PlanError::InputShape { .. }));
    }

    #[test]
    fn test_sum_mismatch_reports_both_totals() {
        let schedule = vec![entry(ymd(2025, 1, 1), dec!(49.99))];
        let err = validate_schedule(&schedule, 5000, ScheduleOrigin::Generated, ymd(2025, 1, 1))
            .unwrap_err();
        assert!(
            matches!(err, PlanError::TotalMismatch { expected: 5000, actual: 4999 }),
            "got {err:?}"
        );
    }

    #[test]
    fn test_duplicate_date_detected_even_when_sum_matches() {
        let schedule = vec![
            entry(ymd(2025, 3, 1), dec!(25.00)),
            entry(ymd(2025, 3, 1), dec!(25.00)),
        ];
        let err = validate_schedule(&schedule, 5000, ScheduleOrigin::Generated, ymd(2025, 1, 1))
            .unwrap_err();
        assert!(matches!(err, PlanError::DuplicateDate(d) if d == ymd(2025, 3, 1)));
    }

    #[test]
    fn test_past_date_rejected_for_user_supplied_only() {
        let schedule = vec![
            entry(ymd(2024, 12, 1), dec!(25.00)),
            entry(ymd(2025, 2, 1), dec!(25.00)),
        ];
        let today = ymd(2025, 1, 15);

        let err =
            validate_schedule(&schedule, 5000, ScheduleOrigin::UserSupplied, today).unwrap_err();
        assert!(matches!(err, PlanError::PastDate(d) if d == ymd(2024, 12, 1)));

        assert!(validate_schedule(&schedule, 5000, ScheduleOrigin::Generated, today).is_ok());
    }

    #[test]
    fn test_today_is_not_a_past_date() {
        let today = ymd(2025, 1, 15);
        let schedule = vec![entry(today, dec!(50.00))];
        assert!(validate_schedule(&schedule, 5000, ScheduleOrigin::UserSupplied, today).is_ok());
    }
}
