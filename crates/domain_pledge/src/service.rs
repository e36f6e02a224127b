//! Plan application service
//!
//! Orchestrates the create/update flow: build a distribution request from
//! the caller's fields, resolve it to an exact schedule, reconcile it
//! against the declared total, and hand the result to the persistence port
//! as one atomic commit. Every validation failure is raised before the port
//! is touched, so a rejected request leaves the stored plan unchanged.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use tracing::{info, instrument};

use core_kernel::{Cadence, Currency, Money, PlanId, PledgeId};

use crate::distribution::{
    resolve, CustomEntry, DistributionRequest, Resolved, Tolerances,
};
use crate::error::PlanError;
use crate::plan::{
    DistributionPolicy, InstallmentEntry, PaymentPlan, PlanSummaryUpdate,
};
use crate::ports::{PledgePort, SchedulePort};
use crate::reconcile::{validate_schedule, ScheduleOrigin};

/// One caller-supplied custom installment line
#[derive(Debug, Clone, PartialEq)]
pub struct CustomInstallmentInput {
    pub date: NaiveDate,
    pub amount: Decimal,
    pub notes: Option<String>,
}

/// Request to create a plan for a pledge
#[derive(Debug, Clone)]
pub struct NewPlanRequest {
    pub pledge_id: PledgeId,
    pub label: String,
    pub currency: Currency,
    pub cadence: Cadence,
    pub start_date: NaiveDate,
    pub distribution: DistributionPolicy,
    /// Falls back to the pledge's committed total when omitted
    pub total_planned_amount: Option<Decimal>,
    pub installment_amount: Option<Decimal>,
    pub number_of_installments: Option<u32>,
    pub custom_installments: Vec<CustomInstallmentInput>,
    pub auto_renew: bool,
}

/// Request to re-distribute an existing plan
#[derive(Debug, Clone)]
pub struct UpdatePlanRequest {
    pub expected_version: i64,
    pub currency: Currency,
    pub cadence: Cadence,
    pub start_date: NaiveDate,
    pub distribution: DistributionPolicy,
    pub total_planned_amount: Option<Decimal>,
    pub installment_amount: Option<Decimal>,
    pub number_of_installments: Option<u32>,
    pub custom_installments: Vec<CustomInstallmentInput>,
}

/// Application service for the installment plan engine
pub struct PlanService<S, P> {
    schedules: S,
    pledges: P,
    tolerances: Tolerances,
}

impl<S: SchedulePort, P: PledgePort> PlanService<S, P> {
    pub fn new(schedules: S, pledges: P) -> Self {
        Self {
            schedules,
            pledges,
            tolerances: Tolerances::default(),
        }
    }

    pub fn with_tolerances(mut self, tolerances: Tolerances) -> Self {
        self.tolerances = tolerances;
        self
    }

    /// Creates a plan and its initial schedule
    #[instrument(skip(self, request), fields(pledge_id = %request.pledge_id))]
    pub async fn create_plan(
        &self,
        request: NewPlanRequest,
    ) -> Result<(PaymentPlan, Vec<InstallmentEntry>), PlanError> {
        let total = self
            .effective_total(
                request.pledge_id,
                request.currency,
                request.total_planned_amount,
            )
            .await?;

        let (resolved, summary) = self.distribute(
            total,
            request.cadence,
            request.start_date,
            request.distribution,
            request.installment_amount,
            request.number_of_installments,
            &request.custom_installments,
        )?;

        let mut plan = PaymentPlan::new(
            request.pledge_id,
            request.label,
            total,
            request.cadence,
            request.start_date,
        )
        .with_auto_renew(request.auto_renew);
        let version = plan.version;
        plan.apply_summary(&summary, version);

        let entries = materialize(plan.id, resolved);
        self.schedules.insert_plan(&plan, &entries).await?;

        info!(
            plan_id = %plan.id,
            policy = %plan.distribution,
            installments = plan.installment_count,
            total = %plan.total_planned,
            "created payment plan"
        );
        Ok((plan, entries))
    }

    /// Re-resolves a plan's distribution and atomically replaces its schedule
    ///
    /// The prior schedule and summary survive untouched if anything fails,
    /// from input validation through the persistence commit.
    #[instrument(skip(self, request), fields(plan_id = %plan_id))]
    pub async fn update_plan(
        &self,
        plan_id: PlanId,
        request: UpdatePlanRequest,
    ) -> Result<(PaymentPlan, Vec<InstallmentEntry>), PlanError> {
        let mut plan = self.schedules.find_plan(plan_id).await.map_err(|e| {
            if e.is_not_found() {
                PlanError::NotFound(plan_id)
            } else {
                PlanError::from(e)
            }
        })?;

        if plan.version != request.expected_version {
            return Err(PlanError::VersionConflict {
                expected: request.expected_version,
                actual: plan.version,
            });
        }

        let total = self
            .effective_total(plan.pledge_id, request.currency, request.total_planned_amount)
            .await?;

        let (resolved, summary) = self.distribute(
            total,
            request.cadence,
            request.start_date,
            request.distribution,
            request.installment_amount,
            request.number_of_installments,
            &request.custom_installments,
        )?;

        let entries = materialize(plan_id, resolved);
        let new_version = self
            .schedules
            .commit_schedule(plan_id, request.expected_version, &entries, &summary)
            .await
            .map_err(|e| {
                if e.is_conflict() {
                    PlanError::VersionConflict {
                        expected: request.expected_version,
                        actual: plan.version,
                    }
                } else {
                    PlanError::from(e)
                }
            })?;

        plan.apply_summary(&summary, new_version);
        info!(
            policy = %plan.distribution,
            installments = plan.installment_count,
            version = new_version,
            "replaced installment schedule"
        );
        Ok((plan, entries))
    }

    /// Loads a plan and its schedule
    pub async fn get_plan(
        &self,
        plan_id: PlanId,
    ) -> Result<(PaymentPlan, Vec<InstallmentEntry>), PlanError> {
        let plan = self.schedules.find_plan(plan_id).await.map_err(|e| {
            if e.is_not_found() {
                PlanError::NotFound(plan_id)
            } else {
                PlanError::from(e)
            }
        })?;
        let entries = self.schedules.find_schedule(plan_id).await?;
        Ok((plan, entries))
    }

    /// Resolve + reconcile, shared by the create and update paths
    #[allow(clippy::too_many_arguments)]
    fn distribute(
        &self,
        total: Money,
        cadence: Cadence,
        start_date: NaiveDate,
        policy: DistributionPolicy,
        installment_amount: Option<Decimal>,
        number_of_installments: Option<u32>,
        custom_installments: &[CustomInstallmentInput],
    ) -> Result<(Resolved, PlanSummaryUpdate), PlanError> {
        let currency = total.currency();
        let (request, origin) = match policy {
            DistributionPolicy::Fixed => {
                let count = number_of_installments.ok_or_else(|| {
                    PlanError::input("number_of_installments", "required for fixed distribution")
                })?;
                // An omitted amount asks for a plain division of the total.
                let amount = match installment_amount {
                    Some(amount) => Money::new(amount, currency),
                    None if count > 0 => {
                        Money::from_minor(total.to_minor_units()? / count as i64, currency)
                    }
                    None => Money::zero(currency),
                };
                (
                    DistributionRequest::Fixed {
                        installment_amount: amount,
                        installment_count: count,
                    },
                    ScheduleOrigin::Generated,
                )
            }
            DistributionPolicy::Custom => {
                if custom_installments.is_empty() {
                    return Err(PlanError::input(
                        "custom_installments",
                        "required for custom distribution",
                    ));
                }
                let entries = custom_installments
                    .iter()
                    .map(|input| CustomEntry {
                        due_date: input.date,
                        amount: Money::new(input.amount, currency),
                        note: input.notes.clone(),
                    })
                    .collect();
                (DistributionRequest::Custom(entries), ScheduleOrigin::UserSupplied)
            }
        };

        let resolved = resolve(total, start_date, cadence, request, &self.tolerances)?;
        validate_schedule(
            resolved.schedule(),
            total.to_minor_units()?,
            origin,
            Utc::now().date_naive(),
        )?;

        let schedule = resolved.schedule();
        let summary = PlanSummaryUpdate {
            distribution: resolved.policy(),
            installment_amount: resolved.display_amount(),
            installment_count: schedule.len() as u32,
            total_planned: total,
            cadence,
            start_date,
            end_date: schedule.last().map(|e| e.due_date),
            next_payment_date: schedule.first().map(|e| e.due_date),
        };
        Ok((resolved, summary))
    }

    async fn effective_total(
        &self,
        pledge_id: PledgeId,
        currency: Currency,
        requested: Option<Decimal>,
    ) -> Result<Money, PlanError> {
        match requested {
            Some(amount) => Ok(Money::new(amount, currency)),
            None => {
                let total = self.pledges.pledge_total(pledge_id).await?;
                if total.currency() != currency {
                    return Err(PlanError::input(
                        "currency",
                        format!(
                            "pledge is denominated in {}, request in {}",
                            total.currency(),
                            currency
                        ),
                    ));
                }
                Ok(total)
            }
        }
    }
}

fn materialize(plan_id: PlanId, resolved: Resolved) -> Vec<InstallmentEntry> {
    resolved
        .into_schedule()
        .into_iter()
        .map(|scheduled| {
            let entry = InstallmentEntry::scheduled(plan_id, scheduled.due_date, scheduled.amount);
            match scheduled.note {
                Some(note) => entry.with_note(note),
                None => entry,
            }
        })
        .collect()
}
