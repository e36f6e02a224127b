//! Pre-built Test Fixtures
//!
//! Provides ready-to-use test data for common entities across the pledge
//! plan system. These fixtures are designed to be consistent and
//! predictable for unit tests.

use chrono::NaiveDate;
use core_kernel::{Currency, Money, PlanId, PledgeId};
use rust_decimal_macros::dec;
use uuid::Uuid;

/// Fixture for Money test data
pub struct MoneyFixtures;

impl MoneyFixtures {
    /// Creates a standard USD amount for testing
    pub fn usd_100() -> Money {
        Money::new(dec!(100.00), Currency::USD)
    }

    /// A total that divides evenly into 4 monthly installments
    pub fn usd_120() -> Money {
        Money::new(dec!(120.00), Currency::USD)
    }

    /// A typical annual pledge total
    pub fn ils_1200() -> Money {
        Money::new(dec!(1200.00), Currency::ILS)
    }

    /// Creates a zero amount
    pub fn usd_zero() -> Money {
        Money::zero(Currency::USD)
    }

    /// Creates a EUR amount for currency mismatch tests
    pub fn eur_100() -> Money {
        Money::new(dec!(100.00), Currency::EUR)
    }

    /// Creates a JPY amount (zero decimal places)
    pub fn jpy_10000() -> Money {
        Money::new(dec!(10000), Currency::JPY)
    }
}

/// Fixture for calendar test data
pub struct DateFixtures;

impl DateFixtures {
    /// Standard plan start date (Jan 15, 2025)
    pub fn plan_start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 15).unwrap()
    }

    /// A month-end start date that exercises clamping (Jan 31, 2024)
    pub fn month_end_start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 31).unwrap()
    }

    /// Leap day
    pub fn leap_day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
    }

    /// A date safely in the past for past-date rejection tests
    pub fn long_past() -> NaiveDate {
        NaiveDate::from_ymd_opt(2020, 6, 1).unwrap()
    }
}

/// Fixture for string test data
pub struct StringFixtures;

impl StringFixtures {
    /// Standard plan label
    pub fn plan_label() -> &'static str {
        "Building fund - 2025"
    }

    /// Standard installment note
    pub fn installment_note() -> &'static str {
        "matching gift"
    }
}

/// Fixture for identifier test data
pub struct IdFixtures;

impl IdFixtures {
    /// A deterministic plan ID for snapshot-style assertions
    pub fn plan_id() -> PlanId {
        PlanId::from_uuid(Uuid::from_u128(0x1111_2222_3333_4444_5555_6666_7777_8888))
    }

    /// A deterministic pledge ID
    pub fn pledge_id() -> PledgeId {
        PledgeId::from_uuid(Uuid::from_u128(0x9999_aaaa_bbbb_cccc_dddd_eeee_ffff_0000))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixtures_are_stable() {
        assert_eq!(IdFixtures::plan_id(), IdFixtures::plan_id());
        assert_eq!(MoneyFixtures::usd_120().to_minor_units().unwrap(), 12000);
        assert_eq!(DateFixtures::leap_day().to_string(), "2024-02-29");
    }
}
