//! Test Data Builders
//!
//! Provides builder patterns for constructing test data with sensible
//! defaults. These builders allow tests to specify only the relevant
//! fields while using defaults for everything else.

use chrono::NaiveDate;
use core_kernel::{Cadence, Currency, PledgeId};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use domain_pledge::{CustomInstallmentInput, DistributionPolicy, NewPlanRequest};

use crate::fixtures::{DateFixtures, StringFixtures};

/// Builder for `NewPlanRequest` test instances
///
/// Defaults to a fixed monthly plan of 120.00 USD over 4 installments.
pub struct PlanRequestBuilder {
    pledge_id: PledgeId,
    label: String,
    currency: Currency,
    cadence: Cadence,
    start_date: NaiveDate,
    distribution: DistributionPolicy,
    total_planned_amount: Option<Decimal>,
    installment_amount: Option<Decimal>,
    number_of_installments: Option<u32>,
    custom_installments: Vec<CustomInstallmentInput>,
    auto_renew: bool,
}

impl Default for PlanRequestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PlanRequestBuilder {
    /// Creates a new builder with default values
    pub fn new() -> Self {
        Self {
            pledge_id: PledgeId::new(),
            label: StringFixtures::plan_label().to_string(),
            currency: Currency::USD,
            cadence: Cadence::Monthly,
            start_date: DateFixtures::plan_start(),
            distribution: DistributionPolicy::Fixed,
            total_planned_amount: Some(dec!(120.00)),
            installment_amount: Some(dec!(30.00)),
            number_of_installments: Some(4),
            custom_installments: Vec::new(),
            auto_renew: false,
        }
    }

    /// Sets the pledge ID
    pub fn with_pledge_id(mut self, id: PledgeId) -> Self {
        self.pledge_id = id;
        self
    }

    /// Sets a randomized label, useful for bulk test data
    pub fn with_random_label(mut self) -> Self {
        use fake::faker::company::en::CompanyName;
        use fake::Fake;
        self.label = format!("{} fund", CompanyName().fake::<String>());
        self
    }

    /// Sets the currency
    pub fn with_currency(mut self, currency: Currency) -> Self {
        self.currency = currency;
        self
    }

    /// Sets the cadence
    pub fn with_cadence(mut self, cadence: Cadence) -> Self {
        self.cadence = cadence;
        self
    }

    /// Sets the start date
    pub fn with_start_date(mut self, date: NaiveDate) -> Self {
        self.start_date = date;
        self
    }

    /// Sets the fixed distribution parameters
    pub fn with_fixed(mut self, amount: Decimal, count: u32) -> Self {
        self.distribution = DistributionPolicy::Fixed;
        self.installment_amount = Some(amount);
        self.number_of_installments = Some(count);
        self.custom_installments.clear();
        self
    }

    /// Sets the total planned amount
    pub fn with_total(mut self, total: Decimal) -> Self {
        self.total_planned_amount = Some(total);
        self
    }

    /// Clears the total so the pledge lookup supplies it
    pub fn without_total(mut self) -> Self {
        self.total_planned_amount = None;
        self
    }

    /// Switches to a custom distribution with the given dated amounts
    pub fn with_custom(mut self, entries: Vec<(NaiveDate, Decimal)>) -> Self {
        self.distribution = DistributionPolicy::Custom;
        self.cadence = Cadence::Custom;
        self.installment_amount = None;
        self.number_of_installments = None;
        self.custom_installments = entries
            .into_iter()
            .map(|(date, amount)| CustomInstallmentInput {
                date,
                amount,
                notes: None,
            })
            .collect();
        self
    }

    /// Enables auto-renew
    pub fn with_auto_renew(mut self) -> Self {
        self.auto_renew = true;
        self
    }

    /// Builds the request
    pub fn build(self) -> NewPlanRequest {
        NewPlanRequest {
            pledge_id: self.pledge_id,
            label: self.label,
            currency: self.currency,
            cadence: self.cadence,
            start_date: self.start_date,
            distribution: self.distribution,
            total_planned_amount: self.total_planned_amount,
            installment_amount: self.installment_amount,
            number_of_installments: self.number_of_installments,
            custom_installments: self.custom_installments,
            auto_renew: self.auto_renew,
        }
    }
}
