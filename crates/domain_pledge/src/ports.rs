//! Pledge domain ports
//!
//! Port traits for the persistence collaborators, defined here and
//! implemented by adapters in `infra_db`.

use async_trait::async_trait;

use core_kernel::{DomainPort, Money, PlanId, PledgeId, PortError};

use crate::plan::{InstallmentEntry, PaymentPlan, PlanSummaryUpdate};

/// Persistence port for payment plans and their schedules
#[async_trait]
pub trait SchedulePort: DomainPort {
    /// Loads a plan by id
    async fn find_plan(&self, id: PlanId) -> Result<PaymentPlan, PortError>;

    /// Loads a plan's installment entries, ordered by due date
    async fn find_schedule(&self, id: PlanId) -> Result<Vec<InstallmentEntry>, PortError>;

    /// Inserts a new plan together with its initial schedule, atomically
    async fn insert_plan(
        &self,
        plan: &PaymentPlan,
        entries: &[InstallmentEntry],
    ) -> Result<(), PortError>;

    /// Replaces a plan's schedule and updates its summary fields as one
    /// atomic unit
    ///
    /// Either all prior entries are removed, all new entries inserted, and
    /// the summary applied, or nothing changes. `expected_version` is the
    /// optimistic concurrency token: a stale value must produce
    /// [`PortError::Conflict`] and leave the stored schedule untouched.
    ///
    /// Returns the plan's new version.
    async fn commit_schedule(
        &self,
        plan_id: PlanId,
        expected_version: i64,
        entries: &[InstallmentEntry],
        summary: &PlanSummaryUpdate,
    ) -> Result<i64, PortError>;
}

/// Read-only lookup into the pledge aggregate
///
/// Supplies the pledge's committed total when a plan request omits its own.
/// The engine never mutates the pledge.
#[async_trait]
pub trait PledgePort: DomainPort {
    async fn pledge_total(&self, id: PledgeId) -> Result<Money, PortError>;
}
