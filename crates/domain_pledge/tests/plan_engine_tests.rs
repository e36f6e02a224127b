//! End-to-end tests for the plan engine through `PlanService` with
//! in-memory port implementations

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{Days, Months, NaiveDate, Utc};
use rust_decimal_macros::dec;

use core_kernel::{Cadence, Currency, DomainPort, Money, PlanId, PledgeId, PortError};
use domain_pledge::{
    CustomInstallmentInput, DistributionPolicy, InstallmentEntry, NewPlanRequest, PaymentPlan,
    PlanError, PlanService, PlanSummaryUpdate, PledgePort, SchedulePort, UpdatePlanRequest,
};
use test_utils::{
    assert_schedule_conserves, assert_schedule_strictly_ordered, DateFixtures, PlanRequestBuilder,
};

// ============================================================================
// In-memory ports
// ============================================================================

#[derive(Default)]
struct StoreState {
    plans: HashMap<PlanId, PaymentPlan>,
    schedules: HashMap<PlanId, Vec<InstallmentEntry>>,
    fail_commits: bool,
}

#[derive(Default)]
struct MemoryScheduleStore {
    state: Mutex<StoreState>,
}

impl MemoryScheduleStore {
    fn schedule(&self, id: PlanId) -> Vec<InstallmentEntry> {
        self.state.lock().unwrap().schedules.get(&id).cloned().unwrap_or_default()
    }

    fn fail_next_commits(&self) {
        self.state.lock().unwrap().fail_commits = true;
    }
}

impl DomainPort for MemoryScheduleStore {}

#[async_trait]
impl SchedulePort for MemoryScheduleStore {
    async fn find_plan(&self, id: PlanId) -> Result<PaymentPlan, PortError> {
        self.state
            .lock()
            .unwrap()
            .plans
            .get(&id)
            .cloned()
            .ok_or_else(|| PortError::not_found("PaymentPlan", id))
    }

    async fn find_schedule(&self, id: PlanId) -> Result<Vec<InstallmentEntry>, PortError> {
        Ok(self.schedule(id))
    }

    async fn insert_plan(
        &self,
        plan: &PaymentPlan,
        entries: &[InstallmentEntry],
    ) -> Result<(), PortError> {
        let mut state = self.state.lock().unwrap();
        state.plans.insert(plan.id, plan.clone());
        state.schedules.insert(plan.id, entries.to_vec());
        Ok(())
    }

    async fn commit_schedule(
        &self,
        plan_id: PlanId,
        expected_version: i64,
        entries: &[InstallmentEntry],
        summary: &PlanSummaryUpdate,
    ) -> Result<i64, PortError> {
        let mut state = self.state.lock().unwrap();
        if state.fail_commits {
            // Simulates a transaction rollback: nothing is mutated.
            return Err(PortError::connection("database unavailable"));
        }
        let plan = state
            .plans
            .get_mut(&plan_id)
            .ok_or_else(|| PortError::not_found("PaymentPlan", plan_id))?;
        if plan.version != expected_version {
            return Err(PortError::conflict(format!(
                "expected version {expected_version}, found {}",
                plan.version
            )));
        }
        let new_version = plan.version + 1;
        plan.apply_summary(summary, new_version);
        state.schedules.insert(plan_id, entries.to_vec());
        Ok(new_version)
    }
}

struct StaticPledges {
    total: Money,
}

impl DomainPort for StaticPledges {}

#[async_trait]
impl PledgePort for StaticPledges {
    async fn pledge_total(&self, _id: PledgeId) -> Result<Money, PortError> {
        Ok(self.total)
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn service() -> PlanService<MemoryScheduleStore, StaticPledges> {
    PlanService::new(
        MemoryScheduleStore::default(),
        StaticPledges {
            total: Money::new(dec!(1000.00), Currency::ILS),
        },
    )
}

fn fixed_request(total: rust_decimal::Decimal, amount: rust_decimal::Decimal, count: u32) -> NewPlanRequest {
    PlanRequestBuilder::new()
        .with_total(total)
        .with_fixed(amount, count)
        .build()
}

fn future_date(months_ahead: u32) -> NaiveDate {
    Utc::now().date_naive() + Months::new(months_ahead)
}

fn custom_request(
    total: rust_decimal::Decimal,
    amounts: &[rust_decimal::Decimal],
) -> NewPlanRequest {
    PlanRequestBuilder::new()
        .with_total(total)
        .with_start_date(Utc::now().date_naive())
        .with_custom(
            amounts
                .iter()
                .enumerate()
                .map(|(i, amount)| (future_date(i as u32 + 1), *amount))
                .collect(),
        )
        .build()
}

// ============================================================================
// Create path
// ============================================================================

mod create_tests {
    use super::*;

    #[tokio::test]
    async fn fixed_perfect_division_persists_uniform_schedule() {
        let svc = service();
        let (plan, entries) = svc
            .create_plan(fixed_request(dec!(120.00), dec!(30.00), 4))
            .await
            .unwrap();

        assert_eq!(plan.distribution, DistributionPolicy::Fixed);
        assert_eq!(plan.installment_amount.amount(), dec!(30.00));
        assert_eq!(plan.installment_count, 4);
        assert_eq!(entries.len(), 4);
        assert!(entries.iter().all(|e| e.amount.amount() == dec!(30.00)));
        assert_schedule_conserves(&entries, 12000);
        assert_schedule_strictly_ordered(&entries);
        assert_eq!(plan.start_date, DateFixtures::plan_start());
        assert_eq!(plan.end_date, Some(ymd(2025, 4, 15)));
        assert_eq!(plan.next_payment_date, Some(DateFixtures::plan_start()));
    }

    #[tokio::test]
    async fn fixed_remainder_converts_plan_to_custom() {
        let svc = service();
        let (plan, entries) = svc
            .create_plan(fixed_request(dec!(100.00), dec!(33.33), 3))
            .await
            .unwrap();

        assert_eq!(plan.distribution, DistributionPolicy::Custom);
        assert_eq!(plan.installment_amount.amount(), dec!(33.33));
        let amounts: Vec<_> = entries.iter().map(|e| e.amount.amount()).collect();
        assert_eq!(amounts, vec![dec!(33.34), dec!(33.33), dec!(33.33)]);
        assert_schedule_conserves(&entries, 10000);
    }

    #[tokio::test]
    async fn fixed_count_past_the_limit_is_rejected_not_processed() {
        let svc = service();
        let request = fixed_request(dec!(120.00), dec!(0.01), 3_200_000);

        let err = svc.create_plan(request).await.unwrap_err();
        assert!(
            matches!(err, PlanError::InputShape { ref field, .. } if field == "number_of_installments")
        );
    }

    #[tokio::test]
    async fn custom_one_cent_short_is_absorbed() {
        let svc = service();
        let (plan, entries) = svc
            .create_plan(custom_request(dec!(50.00), &[dec!(16.67), dec!(16.66), dec!(16.66)]))
            .await
            .unwrap();

        assert_eq!(plan.distribution, DistributionPolicy::Custom);
        assert_schedule_conserves(&entries, 5000);
        assert_eq!(entries.last().unwrap().amount.amount(), dec!(16.67));
    }

    #[tokio::test]
    async fn custom_five_cents_short_is_rejected_and_nothing_stored() {
        let svc = service();
        let request = custom_request(dec!(50.00), &[dec!(16.65), dec!(16.65), dec!(16.65)]);

        let err = svc.create_plan(request).await.unwrap_err();
        match err {
            PlanError::TotalMismatch { expected, actual } => {
                assert_eq!(expected, 5000);
                assert_eq!(actual, 4995);
            }
            other => panic!("expected TotalMismatch, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn custom_duplicate_dates_rejected() {
        let svc = service();
        let mut request = custom_request(dec!(50.00), &[dec!(25.00), dec!(25.00)]);
        let date = future_date(1);
        for entry in &mut request.custom_installments {
            entry.date = date;
        }

        let err = svc.create_plan(request).await.unwrap_err();
        assert!(matches!(err, PlanError::DuplicateDate(d) if d == date));
    }

    #[tokio::test]
    async fn custom_past_date_rejected() {
        let svc = service();
        let mut request = custom_request(dec!(50.00), &[dec!(25.00), dec!(25.00)]);
        request.custom_installments[0].date = Utc::now().date_naive() - Days::new(1);

        let err = svc.create_plan(request).await.unwrap_err();
        assert!(matches!(err, PlanError::PastDate(_)));
    }

    #[tokio::test]
    async fn omitted_total_falls_back_to_pledge_total() {
        let svc = PlanService::new(
            MemoryScheduleStore::default(),
            StaticPledges {
                total: Money::new(dec!(600.00), Currency::USD),
            },
        );
        let request = PlanRequestBuilder::new()
            .without_total()
            .with_fixed(dec!(100.00), 6)
            .build();

        let (plan, entries) = svc.create_plan(request).await.unwrap();
        assert_eq!(plan.total_planned.amount(), dec!(600.00));
        assert_schedule_conserves(&entries, 60000);
    }

    #[tokio::test]
    async fn fixed_without_count_is_input_shape_error() {
        let svc = service();
        let mut request = fixed_request(dec!(100.00), dec!(25.00), 4);
        request.number_of_installments = None;

        let err = svc.create_plan(request).await.unwrap_err();
        assert!(
            matches!(err, PlanError::InputShape { ref field, .. } if field == "number_of_installments")
        );
    }

    #[tokio::test]
    async fn custom_without_entries_is_input_shape_error() {
        let svc = service();
        let mut request = custom_request(dec!(50.00), &[dec!(50.00)]);
        request.custom_installments.clear();

        let err = svc.create_plan(request).await.unwrap_err();
        assert!(
            matches!(err, PlanError::InputShape { ref field, .. } if field == "custom_installments")
        );
    }
}

// ============================================================================
// Update path
// ============================================================================

mod update_tests {
    use super::*;

    fn update_request(expected_version: i64) -> UpdatePlanRequest {
        UpdatePlanRequest {
            expected_version,
            currency: Currency::USD,
            cadence: Cadence::Monthly,
            start_date: ymd(2025, 6, 1),
            distribution: DistributionPolicy::Fixed,
            total_planned_amount: Some(dec!(90.00)),
            installment_amount: Some(dec!(30.00)),
            number_of_installments: Some(3),
            custom_installments: vec![],
        }
    }

    #[tokio::test]
    async fn update_replaces_schedule_and_bumps_version() {
        let svc = service();
        let (plan, _) = svc
            .create_plan(fixed_request(dec!(120.00), dec!(30.00), 4))
            .await
            .unwrap();

        let (updated, entries) = svc
            .update_plan(plan.id, update_request(plan.version))
            .await
            .unwrap();

        assert_eq!(updated.version, plan.version + 1);
        assert_eq!(updated.total_planned.amount(), dec!(90.00));
        assert_eq!(entries.len(), 3);
        assert_schedule_conserves(&entries, 9000);
        assert_schedule_strictly_ordered(&entries);
    }

    #[tokio::test]
    async fn stale_version_is_rejected() {
        let svc = service();
        let (plan, _) = svc
            .create_plan(fixed_request(dec!(120.00), dec!(30.00), 4))
            .await
            .unwrap();

        let err = svc
            .update_plan(plan.id, update_request(plan.version + 7))
            .await
            .unwrap_err();
        assert!(matches!(err, PlanError::VersionConflict { .. }));
    }

    #[tokio::test]
    async fn unknown_plan_is_not_found() {
        let svc = service();
        let err = svc
            .update_plan(PlanId::new(), update_request(1))
            .await
            .unwrap_err();
        assert!(matches!(err, PlanError::NotFound(_)));
    }

    #[tokio::test]
    async fn failed_commit_leaves_prior_schedule_intact() {
        let store = MemoryScheduleStore::default();
        let pledges = StaticPledges {
            total: Money::new(dec!(1000.00), Currency::USD),
        };
        let svc = PlanService::new(store, pledges);

        let (plan, original_entries) = svc
            .create_plan(fixed_request(dec!(120.00), dec!(30.00), 4))
            .await
            .unwrap();

        // The service owns its store, so seed a second store with the same
        // state and arm it to fail the next commit.
        let store = MemoryScheduleStore::default();
        store.insert_plan(&plan, &original_entries).await.unwrap();
        store.fail_next_commits();
        let svc = PlanService::new(
            store,
            StaticPledges {
                total: Money::new(dec!(1000.00), Currency::USD),
            },
        );

        let err = svc
            .update_plan(plan.id, update_request(plan.version))
            .await
            .unwrap_err();
        assert!(matches!(err, PlanError::Persistence(_)));

        // The stored plan and schedule are exactly as before the attempt.
        let (stored_plan, stored_entries) = svc.get_plan(plan.id).await.unwrap();
        assert_eq!(stored_plan.version, plan.version);
        assert_eq!(stored_plan.total_planned, plan.total_planned);
        assert_eq!(stored_entries, original_entries);
    }

    #[tokio::test]
    async fn update_can_switch_policy_to_custom_and_back() {
        let svc = service();
        let (plan, _) = svc
            .create_plan(fixed_request(dec!(120.00), dec!(30.00), 4))
            .await
            .unwrap();

        let custom = UpdatePlanRequest {
            expected_version: plan.version,
            currency: Currency::USD,
            cadence: Cadence::Custom,
            start_date: Utc::now().date_naive(),
            distribution: DistributionPolicy::Custom,
            total_planned_amount: Some(dec!(120.00)),
            installment_amount: None,
            number_of_installments: None,
            custom_installments: vec![
                CustomInstallmentInput {
                    date: future_date(1),
                    amount: dec!(80.00),
                    notes: Some("matching gift".to_string()),
                },
                CustomInstallmentInput {
                    date: future_date(2),
                    amount: dec!(40.00),
                    notes: None,
                },
            ],
        };
        let (updated, entries) = svc.update_plan(plan.id, custom).await.unwrap();
        assert_eq!(updated.distribution, DistributionPolicy::Custom);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].note.as_deref(), Some("matching gift"));
        assert_schedule_conserves(&entries, 12000);

        let (reverted, entries) = svc
            .update_plan(updated.id, update_request(updated.version))
            .await
            .unwrap();
        assert_eq!(reverted.distribution, DistributionPolicy::Fixed);
        assert_eq!(entries.len(), 3);
    }
}
