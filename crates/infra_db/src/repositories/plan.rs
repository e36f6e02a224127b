//! Payment plan repository
//!
//! Database access for payment plans and their installment schedules,
//! implementing the pledge domain's `SchedulePort`. Schedule replacement
//! runs in a single transaction so a failed update never leaves a plan
//! with a partial schedule.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};
use std::str::FromStr;
use tracing::{debug, instrument};
use uuid::Uuid;

use core_kernel::{Cadence, Currency, DomainPort, InstallmentId, Money, PlanId, PledgeId, PortError};
use domain_pledge::{
    DistributionPolicy, FulfillmentState, InstallmentEntry, PaymentPlan, PlanStatus,
    PlanSummaryUpdate, SchedulePort,
};

use crate::error::DatabaseError;

/// Repository for payment plans and installment schedules
#[derive(Debug, Clone)]
pub struct PlanRepository {
    pool: PgPool,
}

impl PlanRepository {
    /// Creates a new PlanRepository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_plan_row(&self, plan_id: PlanId) -> Result<Option<PlanRow>, DatabaseError> {
        let row = sqlx::query_as::<_, PlanRow>(
            r#"
            SELECT
                plan_id, pledge_id, label, currency, cadence, distribution,
                status, total_planned, installment_amount, installment_count,
                start_date, end_date, next_payment_date, installments_paid,
                total_paid, auto_renew, is_active, version, created_at, updated_at
            FROM payment_plans
            WHERE plan_id = $1
            "#,
        )
        .bind(plan_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn fetch_installment_rows(
        &self,
        plan_id: PlanId,
    ) -> Result<Vec<InstallmentRow>, DatabaseError> {
        let rows = sqlx::query_as::<_, InstallmentRow>(
            r#"
            SELECT
                installment_id, plan_id, due_date, amount, currency,
                note, state, paid_date
            FROM installments
            WHERE plan_id = $1
            ORDER BY due_date, installment_id
            "#,
        )
        .bind(plan_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn insert_installments(
        tx: &mut Transaction<'_, Postgres>,
        entries: &[InstallmentEntry],
    ) -> Result<(), DatabaseError> {
        for entry in entries {
            sqlx::query(
                r#"
                INSERT INTO installments (
                    installment_id, plan_id, due_date, amount, currency,
                    note, state, paid_date
                ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                "#,
            )
            .bind(entry.id.as_uuid())
            .bind(entry.plan_id.as_uuid())
            .bind(entry.due_date)
            .bind(entry.amount.amount())
            .bind(entry.amount.currency().code())
            .bind(entry.note.as_deref())
            .bind(state_code(entry.state))
            .bind(entry.paid_date)
            .execute(&mut **tx)
            .await?;
        }
        Ok(())
    }
}

impl DomainPort for PlanRepository {}

#[async_trait]
impl SchedulePort for PlanRepository {
    #[instrument(skip(self), fields(plan_id = %plan_id))]
    async fn find_plan(&self, plan_id: PlanId) -> Result<PaymentPlan, PortError> {
        let row = self
            .fetch_plan_row(plan_id)
            .await
            .map_err(PortError::from)?
            .ok_or_else(|| PortError::not_found("PaymentPlan", plan_id))?;

        row.into_domain().map_err(PortError::from)
    }

    #[instrument(skip(self), fields(plan_id = %plan_id))]
    async fn find_schedule(&self, plan_id: PlanId) -> Result<Vec<InstallmentEntry>, PortError> {
        let rows = self
            .fetch_installment_rows(plan_id)
            .await
            .map_err(PortError::from)?;

        rows.into_iter()
            .map(|row| row.into_domain().map_err(PortError::from))
            .collect()
    }

    #[instrument(skip(self, plan, entries), fields(plan_id = %plan.id))]
    async fn insert_plan(
        &self,
        plan: &PaymentPlan,
        entries: &[InstallmentEntry],
    ) -> Result<(), PortError> {
        let run = async {
            let mut tx = self.pool.begin().await?;

            sqlx::query(
                r#"
                INSERT INTO payment_plans (
                    plan_id, pledge_id, label, currency, cadence, distribution,
                    status, total_planned, installment_amount, installment_count,
                    start_date, end_date, next_payment_date, installments_paid,
                    total_paid, auto_renew, is_active, version, created_at, updated_at
                ) VALUES (
                    $1, $2, $3, $4, $5, $6, $7, $8, $9, $10,
                    $11, $12, $13, $14, $15, $16, $17, $18, $19, $20
                )
                "#,
            )
            .bind(plan.id.as_uuid())
            .bind(plan.pledge_id.as_uuid())
            .bind(&plan.label)
            .bind(plan.total_planned.currency().code())
            .bind(plan.cadence.code())
            .bind(plan.distribution.code())
            .bind(status_code(plan.status))
            .bind(plan.total_planned.amount())
            .bind(plan.installment_amount.amount())
            .bind(plan.installment_count as i32)
            .bind(plan.start_date)
            .bind(plan.end_date)
            .bind(plan.next_payment_date)
            .bind(plan.installments_paid as i32)
            .bind(plan.total_paid.amount())
            .bind(plan.auto_renew)
            .bind(plan.is_active)
            .bind(plan.version)
            .bind(plan.created_at)
            .bind(plan.updated_at)
            .execute(&mut *tx)
            .await?;

            Self::insert_installments(&mut tx, entries).await?;
            tx.commit().await?;
            Ok::<_, DatabaseError>(())
        };

        run.await.map_err(PortError::from)?;
        debug!(installments = entries.len(), "inserted payment plan");
        Ok(())
    }

    #[instrument(skip(self, entries, summary), fields(plan_id = %plan_id))]
    async fn commit_schedule(
        &self,
        plan_id: PlanId,
        expected_version: i64,
        entries: &[InstallmentEntry],
        summary: &PlanSummaryUpdate,
    ) -> Result<i64, PortError> {
        let new_version = expected_version + 1;
        let run = async {
            let mut tx = self.pool.begin().await?;

            let updated = sqlx::query(
                r#"
                UPDATE payment_plans SET
                    currency = $3,
                    cadence = $4,
                    distribution = $5,
                    total_planned = $6,
                    installment_amount = $7,
                    installment_count = $8,
                    start_date = $9,
                    end_date = $10,
                    next_payment_date = $11,
                    version = $12,
                    updated_at = NOW()
                WHERE plan_id = $1 AND version = $2
                "#,
            )
            .bind(plan_id.as_uuid())
            .bind(expected_version)
            .bind(summary.total_planned.currency().code())
            .bind(summary.cadence.code())
            .bind(summary.distribution.code())
            .bind(summary.total_planned.amount())
            .bind(summary.installment_amount.amount())
            .bind(summary.installment_count as i32)
            .bind(summary.start_date)
            .bind(summary.end_date)
            .bind(summary.next_payment_date)
            .bind(new_version)
            .execute(&mut *tx)
            .await?;

            if updated.rows_affected() == 0 {
                // Stale token or missing row; report which without committing.
                let current: Option<i64> =
                    sqlx::query_scalar("SELECT version FROM payment_plans WHERE plan_id = $1")
                        .bind(plan_id.as_uuid())
                        .fetch_optional(&mut *tx)
                        .await?;
                return match current {
                    Some(actual) => Err(DatabaseError::VersionConflict(format!(
                        "expected version {}, found {}",
                        expected_version, actual
                    ))),
                    None => Err(DatabaseError::not_found("PaymentPlan", plan_id)),
                };
            }

            sqlx::query("DELETE FROM installments WHERE plan_id = $1")
                .bind(plan_id.as_uuid())
                .execute(&mut *tx)
                .await?;

            Self::insert_installments(&mut tx, entries).await?;
            tx.commit().await?;
            Ok::<_, DatabaseError>(())
        };

        run.await.map_err(PortError::from)?;
        debug!(
            installments = entries.len(),
            version = new_version,
            "replaced installment schedule"
        );
        Ok(new_version)
    }
}

fn status_code(status: PlanStatus) -> &'static str {
    match status {
        PlanStatus::Active => "active",
        PlanStatus::Completed => "completed",
        PlanStatus::Cancelled => "cancelled",
        PlanStatus::Paused => "paused",
        PlanStatus::Overdue => "overdue",
    }
}

fn status_from_code(code: &str) -> Result<PlanStatus, DatabaseError> {
    match code {
        "active" => Ok(PlanStatus::Active),
        "completed" => Ok(PlanStatus::Completed),
        "cancelled" => Ok(PlanStatus::Cancelled),
        "paused" => Ok(PlanStatus::Paused),
        "overdue" => Ok(PlanStatus::Overdue),
        other => Err(DatabaseError::bad_column("status", other)),
    }
}

fn state_code(state: FulfillmentState) -> &'static str {
    match state {
        FulfillmentState::Scheduled => "scheduled",
        FulfillmentState::Paid => "paid",
    }
}

fn state_from_code(code: &str) -> Result<FulfillmentState, DatabaseError> {
    match code {
        "scheduled" => Ok(FulfillmentState::Scheduled),
        "paid" => Ok(FulfillmentState::Paid),
        other => Err(DatabaseError::bad_column("state", other)),
    }
}

fn distribution_from_code(code: &str) -> Result<DistributionPolicy, DatabaseError> {
    match code {
        "fixed" => Ok(DistributionPolicy::Fixed),
        "custom" => Ok(DistributionPolicy::Custom),
        other => Err(DatabaseError::bad_column("distribution", other)),
    }
}

/// Database row for a payment plan
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PlanRow {
    pub plan_id: Uuid,
    pub pledge_id: Uuid,
    pub label: String,
    pub currency: String,
    pub cadence: String,
    pub distribution: String,
    pub status: String,
    pub total_planned: Decimal,
    pub installment_amount: Decimal,
    pub installment_count: i32,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub next_payment_date: Option<NaiveDate>,
    pub installments_paid: i32,
    pub total_paid: Decimal,
    pub auto_renew: bool,
    pub is_active: bool,
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PlanRow {
    fn into_domain(self) -> Result<PaymentPlan, DatabaseError> {
        let currency = Currency::from_str(&self.currency)
            .map_err(|_| DatabaseError::bad_column("currency", &self.currency))?;
        let cadence = Cadence::from_str(&self.cadence)
            .map_err(|_| DatabaseError::bad_column("cadence", &self.cadence))?;

        Ok(PaymentPlan {
            id: PlanId::from_uuid(self.plan_id),
            pledge_id: PledgeId::from_uuid(self.pledge_id),
            label: self.label,
            cadence,
            distribution: distribution_from_code(&self.distribution)?,
            total_planned: Money::new(self.total_planned, currency),
            installment_amount: Money::new(self.installment_amount, currency),
            installment_count: self.installment_count as u32,
            start_date: self.start_date,
            end_date: self.end_date,
            next_payment_date: self.next_payment_date,
            installments_paid: self.installments_paid as u32,
            total_paid: Money::new(self.total_paid, currency),
            status: status_from_code(&self.status)?,
            auto_renew: self.auto_renew,
            is_active: self.is_active,
            version: self.version,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Database row for an installment
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct InstallmentRow {
    pub installment_id: Uuid,
    pub plan_id: Uuid,
    pub due_date: NaiveDate,
    pub amount: Decimal,
    pub currency: String,
    pub note: Option<String>,
    pub state: String,
    pub paid_date: Option<NaiveDate>,
}

impl InstallmentRow {
    fn into_domain(self) -> Result<InstallmentEntry, DatabaseError> {
        let currency = Currency::from_str(&self.currency)
            .map_err(|_| DatabaseError::bad_column("currency", &self.currency))?;

        Ok(InstallmentEntry {
            id: InstallmentId::from_uuid(self.installment_id),
            plan_id: PlanId::from_uuid(self.plan_id),
            due_date: self.due_date,
            amount: Money::new(self.amount, currency),
            note: self.note,
            state: state_from_code(&self.state)?,
            paid_date: self.paid_date,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_round_trip() {
        for status in [
            PlanStatus::Active,
            PlanStatus::Completed,
            PlanStatus::Cancelled,
            PlanStatus::Paused,
            PlanStatus::Overdue,
        ] {
            assert_eq!(status_from_code(status_code(status)).unwrap(), status);
        }
    }

    #[test]
    fn unknown_status_is_a_mapping_error() {
        let err = status_from_code("archived").unwrap_err();
        assert!(matches!(err, DatabaseError::RowMapping(_)));
    }

    #[test]
    fn plan_row_maps_to_domain() {
        let row = PlanRow {
            plan_id: Uuid::new_v4(),
            pledge_id: Uuid::new_v4(),
            label: "Building fund".to_string(),
            currency: "ILS".to_string(),
            cadence: "monthly".to_string(),
            distribution: "fixed".to_string(),
            status: "active".to_string(),
            total_planned: Decimal::new(120000, 2),
            installment_amount: Decimal::new(10000, 2),
            installment_count: 12,
            start_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2025, 12, 1),
            next_payment_date: NaiveDate::from_ymd_opt(2025, 1, 1),
            installments_paid: 0,
            total_paid: Decimal::ZERO,
            auto_renew: false,
            is_active: true,
            version: 1,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let plan = row.into_domain().unwrap();
        assert_eq!(plan.cadence, Cadence::Monthly);
        assert_eq!(plan.total_planned.currency(), Currency::ILS);
        assert_eq!(plan.installment_count, 12);
    }

    #[test]
    fn bad_currency_is_a_mapping_error() {
        let row = InstallmentRow {
            installment_id: Uuid::new_v4(),
            plan_id: Uuid::new_v4(),
            due_date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            amount: Decimal::new(5000, 2),
            currency: "XXX".to_string(),
            note: None,
            state: "scheduled".to_string(),
            paid_date: None,
        };

        assert!(row.into_domain().is_err());
    }
}
