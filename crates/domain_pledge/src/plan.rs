//! Payment plan aggregate
//!
//! A `PaymentPlan` is a commitment to pay a pledge's total amount over a
//! schedule of installments. The schedule entries belong wholly to the plan:
//! they are deleted and regenerated whenever its distribution policy or
//! amount parameters change.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{Cadence, InstallmentId, Money, PlanId, PledgeId};

use crate::error::PlanError;

/// How the plan's total is distributed over installments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistributionPolicy {
    /// Uniform installment amount times count
    Fixed,
    /// Explicit per-date amounts
    Custom,
}

impl DistributionPolicy {
    pub fn code(&self) -> &'static str {
        match self {
            DistributionPolicy::Fixed => "fixed",
            DistributionPolicy::Custom => "custom",
        }
    }
}

impl std::fmt::Display for DistributionPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Plan lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanStatus {
    Active,
    Completed,
    Cancelled,
    Paused,
    Overdue,
}

/// Fulfillment state of an individual installment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FulfillmentState {
    Scheduled,
    Paid,
}

/// One scheduled payment within a plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstallmentEntry {
    pub id: InstallmentId,
    pub plan_id: PlanId,
    pub due_date: NaiveDate,
    pub amount: Money,
    pub note: Option<String>,
    pub state: FulfillmentState,
    pub paid_date: Option<NaiveDate>,
}

impl InstallmentEntry {
    /// Creates a new scheduled (unpaid) entry
    pub fn scheduled(plan_id: PlanId, due_date: NaiveDate, amount: Money) -> Self {
        Self {
            id: InstallmentId::new_v7(),
            plan_id,
            due_date,
            amount,
            note: None,
            state: FulfillmentState::Scheduled,
            paid_date: None,
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    /// Marks the entry paid on the given date
    pub fn mark_paid(&mut self, paid_on: NaiveDate) {
        self.state = FulfillmentState::Paid;
        self.paid_date = Some(paid_on);
    }

    pub fn is_paid(&self) -> bool {
        matches!(self.state, FulfillmentState::Paid)
    }
}

/// A commitment to pay a pledge's total over time
///
/// Invariant: whenever the plan is persisted, the sum of its installment
/// amounts in minor units equals `total_planned` in minor units, exactly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentPlan {
    pub id: PlanId,
    pub pledge_id: PledgeId,
    /// Human label, e.g. "Building fund - 2025"
    pub label: String,
    pub cadence: Cadence,
    pub distribution: DistributionPolicy,
    /// Total amount committed across all installments
    pub total_planned: Money,
    /// Per-installment amount; for custom schedules this is the base amount
    /// kept for display, always consistent with the generated schedule
    pub installment_amount: Money,
    pub installment_count: u32,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub next_payment_date: Option<NaiveDate>,
    pub installments_paid: u32,
    pub total_paid: Money,
    pub status: PlanStatus,
    pub auto_renew: bool,
    pub is_active: bool,
    /// Optimistic concurrency token, bumped on every committed update
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PaymentPlan {
    /// Creates a new active plan shell; the schedule and summary fields are
    /// filled in by applying a resolved distribution
    pub fn new(
        pledge_id: PledgeId,
        label: impl Into<String>,
        total_planned: Money,
        cadence: Cadence,
        start_date: NaiveDate,
    ) -> Self {
        let now = Utc::now();
        let currency = total_planned.currency();

        Self {
            id: PlanId::new_v7(),
            pledge_id,
            label: label.into(),
            cadence,
            distribution: DistributionPolicy::Fixed,
            total_planned,
            installment_amount: Money::zero(currency),
            installment_count: 0,
            start_date,
            end_date: None,
            next_payment_date: None,
            installments_paid: 0,
            total_paid: Money::zero(currency),
            status: PlanStatus::Active,
            auto_renew: false,
            is_active: true,
            version: 1,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_auto_renew(mut self, auto_renew: bool) -> Self {
        self.auto_renew = auto_renew;
        self
    }

    /// Applies the summary fields of a committed schedule replacement
    pub fn apply_summary(&mut self, summary: &PlanSummaryUpdate, new_version: i64) {
        self.distribution = summary.distribution;
        self.installment_amount = summary.installment_amount;
        self.installment_count = summary.installment_count;
        self.total_planned = summary.total_planned;
        self.cadence = summary.cadence;
        self.start_date = summary.start_date;
        self.end_date = summary.end_date;
        self.next_payment_date = summary.next_payment_date;
        self.version = new_version;
        self.updated_at = Utc::now();
    }

    /// Records a payment against the plan's running totals
    ///
    /// Payments arrive as already-validated facts from the payment ledger;
    /// this only updates the counters and lifecycle status.
    pub fn record_payment(
        &mut self,
        amount: Money,
        next_due: Option<NaiveDate>,
    ) -> Result<(), PlanError> {
        self.total_paid = self.total_paid.checked_add(&amount)?;
        self.installments_paid += 1;
        self.next_payment_date = next_due;
        self.updated_at = Utc::now();

        if self.installments_paid >= self.installment_count {
            self.status = PlanStatus::Completed;
            self.is_active = false;
            self.next_payment_date = None;
        }
        Ok(())
    }

    /// Marks the earliest scheduled entry of `entries` as paid on `paid_on`
    /// and advances the plan's counters and next payment date
    ///
    /// `entries` must be this plan's schedule in due-date order.
    pub fn record_installment_payment(
        &mut self,
        entries: &mut [InstallmentEntry],
        paid_on: NaiveDate,
    ) -> Result<(), PlanError> {
        let position = entries
            .iter()
            .position(|e| e.state == FulfillmentState::Scheduled)
            .ok_or_else(|| {
                PlanError::InvalidTransition("all installments are already paid".to_string())
            })?;

        let amount = entries[position].amount;
        entries[position].mark_paid(paid_on);
        let next_due = entries[position + 1..]
            .iter()
            .find(|e| e.state == FulfillmentState::Scheduled)
            .map(|e| e.due_date);
        self.record_payment(amount, next_due)
    }

    /// Returns the outstanding balance, minor-unit exact
    pub fn remaining_balance(&self) -> Result<Money, PlanError> {
        let total = self.total_planned.to_minor_units()?;
        let paid = self.total_paid.to_minor_units()?;
        Ok(Money::from_minor(total - paid, self.total_planned.currency()))
    }

    /// Returns true if the next scheduled payment date has passed
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        matches!(self.status, PlanStatus::Active | PlanStatus::Overdue)
            && self.next_payment_date.is_some_and(|due| due < today)
    }

    pub fn mark_overdue(&mut self) {
        if self.status == PlanStatus::Active {
            self.status = PlanStatus::Overdue;
            self.updated_at = Utc::now();
        }
    }

    /// Pauses an active plan
    pub fn pause(&mut self) -> Result<(), PlanError> {
        match self.status {
            PlanStatus::Active | PlanStatus::Overdue => {
                self.status = PlanStatus::Paused;
                self.updated_at = Utc::now();
                Ok(())
            }
            other => Err(PlanError::InvalidTransition(format!(
                "cannot pause a {other:?} plan"
            ))),
        }
    }

    /// Resumes a paused plan
    pub fn resume(&mut self) -> Result<(), PlanError> {
        match self.status {
            PlanStatus::Paused => {
                self.status = PlanStatus::Active;
                self.updated_at = Utc::now();
                Ok(())
            }
            other => Err(PlanError::InvalidTransition(format!(
                "cannot resume a {other:?} plan"
            ))),
        }
    }

    /// Cancels the plan; completed plans cannot be cancelled
    pub fn cancel(&mut self) -> Result<(), PlanError> {
        match self.status {
            PlanStatus::Completed => Err(PlanError::InvalidTransition(
                "cannot cancel a completed plan".to_string(),
            )),
            _ => {
                self.status = PlanStatus::Cancelled;
                self.is_active = false;
                self.updated_at = Utc::now();
                Ok(())
            }
        }
    }
}

/// Summary fields written alongside a schedule replacement
///
/// The persistence adapter applies these and the entry rows as one atomic
/// unit; a plan is never observable with a schedule that disagrees with its
/// summary.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanSummaryUpdate {
    pub distribution: DistributionPolicy,
    pub installment_amount: Money,
    pub installment_count: u32,
    pub total_planned: Money,
    pub cadence: Cadence,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub next_payment_date: Option<NaiveDate>,
}
