//! Integration tests for installment calendar generation

use chrono::NaiveDate;
use core_kernel::{schedule_dates, schedule_end_date, Cadence};

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn monthly_from_january_31_clamps_short_months() {
    let dates = schedule_dates(ymd(2024, 1, 31), Cadence::Monthly, 6);
    assert_eq!(
        dates,
        vec![
            ymd(2024, 1, 31),
            ymd(2024, 2, 29),
            ymd(2024, 3, 31),
            ymd(2024, 4, 30),
            ymd(2024, 5, 31),
            ymd(2024, 6, 30),
        ]
    );
}

#[test]
fn monthly_clamp_does_not_drift_subsequent_months() {
    // Each date is computed from the original start, not the clamped
    // predecessor, so March returns to the 31st.
    let dates = schedule_dates(ymd(2023, 1, 31), Cadence::Monthly, 3);
    assert_eq!(
        dates,
        vec![ymd(2023, 1, 31), ymd(2023, 2, 28), ymd(2023, 3, 31)]
    );
}

#[test]
fn weekly_spans_month_boundaries() {
    let dates = schedule_dates(ymd(2024, 12, 23), Cadence::Weekly, 3);
    assert_eq!(dates, vec![ymd(2024, 12, 23), ymd(2024, 12, 30), ymd(2025, 1, 6)]);
}

#[test]
fn annual_across_leap_years() {
    let dates = schedule_dates(ymd(2024, 2, 29), Cadence::Annual, 5);
    assert_eq!(
        dates,
        vec![
            ymd(2024, 2, 29),
            ymd(2025, 2, 28),
            ymd(2026, 2, 28),
            ymd(2027, 2, 28),
            ymd(2028, 2, 29),
        ]
    );
}

#[test]
fn quarterly_twelve_installments_cover_three_years() {
    let dates = schedule_dates(ymd(2024, 1, 15), Cadence::Quarterly, 12);
    assert_eq!(dates.len(), 12);
    assert_eq!(dates[11], ymd(2026, 10, 15));
}

#[test]
fn dates_are_strictly_increasing_for_recurring_cadences() {
    for cadence in [
        Cadence::Weekly,
        Cadence::Monthly,
        Cadence::Quarterly,
        Cadence::Biannual,
        Cadence::Annual,
    ] {
        let dates = schedule_dates(ymd(2024, 5, 17), cadence, 24);
        for pair in dates.windows(2) {
            assert!(pair[0] < pair[1], "{cadence}: {:?} !< {:?}", pair[0], pair[1]);
        }
    }
}

#[test]
fn end_date_matches_last_generated_date() {
    let dates = schedule_dates(ymd(2024, 3, 10), Cadence::Biannual, 4);
    assert_eq!(
        schedule_end_date(ymd(2024, 3, 10), Cadence::Biannual, 4),
        dates.last().copied()
    );
}

#[test]
fn custom_cadence_never_generates() {
    assert!(schedule_dates(ymd(2024, 1, 1), Cadence::Custom, 10).is_empty());
    assert_eq!(schedule_end_date(ymd(2024, 1, 1), Cadence::Custom, 10), None);
}
