//! Property-Based Test Generators
//!
//! Provides proptest strategies for generating random test data
//! that maintains domain invariants.

use chrono::{Days, NaiveDate};
use core_kernel::{Cadence, Currency, Money};
use proptest::prelude::*;
use rust_decimal::Decimal;

/// Strategy for generating valid Currency values
pub fn currency_strategy() -> impl Strategy<Value = Currency> {
    prop_oneof![
        Just(Currency::ILS),
        Just(Currency::USD),
        Just(Currency::EUR),
        Just(Currency::GBP),
        Just(Currency::CAD),
        Just(Currency::AUD),
        Just(Currency::CHF),
        Just(Currency::ZAR),
        Just(Currency::JPY),
    ]
}

/// Strategy for generating repeating (non-custom, non-one-time) cadences
pub fn repeating_cadence_strategy() -> impl Strategy<Value = Cadence> {
    prop_oneof![
        Just(Cadence::Weekly),
        Just(Cadence::Monthly),
        Just(Cadence::Quarterly),
        Just(Cadence::Biannual),
        Just(Cadence::Annual),
    ]
}

/// Strategy for generating valid positive amounts in minor units
pub fn positive_amount_minor_strategy() -> impl Strategy<Value = i64> {
    1i64..1_000_000_000i64
}

/// Strategy for generating valid Money values with positive amounts
pub fn positive_money_strategy() -> impl Strategy<Value = Money> {
    (positive_amount_minor_strategy(), currency_strategy())
        .prop_map(|(amount, currency)| Money::from_minor(amount, currency))
}

/// Strategy for generating valid USD Money values
pub fn usd_money_strategy() -> impl Strategy<Value = Money> {
    positive_amount_minor_strategy().prop_map(|amount| Money::from_minor(amount, Currency::USD))
}

/// Strategy for generating installment counts (1 to 60)
pub fn installment_count_strategy() -> impl Strategy<Value = u32> {
    1u32..=60u32
}

/// Strategy for generating plan start dates across several years
pub fn start_date_strategy() -> impl Strategy<Value = NaiveDate> {
    (0u64..1500u64).prop_map(|offset| {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + Days::new(offset)
    })
}

/// Strategy for generating a strictly-ordered custom schedule as
/// (date, minor-unit amount) pairs summing to an arbitrary total
pub fn custom_schedule_strategy() -> impl Strategy<Value = Vec<(NaiveDate, i64)>> {
    (1usize..12usize, start_date_strategy()).prop_flat_map(|(len, start)| {
        proptest::collection::vec(1i64..100_000i64, len).prop_map(move |amounts| {
            amounts
                .into_iter()
                .enumerate()
                .map(|(i, amount)| (start + Days::new(30 * i as u64), amount))
                .collect()
        })
    })
}

/// Strategy for generating positive Decimal amounts with two places
pub fn positive_decimal_strategy() -> impl Strategy<Value = Decimal> {
    (1i64..100_000_000i64).prop_map(|n| Decimal::new(n, 2))
}
