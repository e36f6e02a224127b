//! Payment plan DTOs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use core_kernel::{Cadence, Currency, PledgeId};
use domain_pledge::{
    CustomInstallmentInput, DistributionPolicy, FulfillmentState, InstallmentEntry,
    NewPlanRequest, PaymentPlan, PlanStatus, UpdatePlanRequest,
};

#[derive(Debug, Deserialize)]
pub struct CustomInstallmentDto {
    pub date: NaiveDate,
    pub amount: Decimal,
    #[serde(default)]
    pub notes: Option<String>,
}

impl From<CustomInstallmentDto> for CustomInstallmentInput {
    fn from(dto: CustomInstallmentDto) -> Self {
        CustomInstallmentInput {
            date: dto.date,
            amount: dto.amount,
            notes: dto.notes,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreatePlanRequest {
    pub pledge_id: Uuid,
    pub label: String,
    pub currency: Currency,
    pub cadence: Cadence,
    pub start_date: NaiveDate,
    pub distribution: DistributionPolicy,
    #[serde(default)]
    pub total_planned_amount: Option<Decimal>,
    #[serde(default)]
    pub installment_amount: Option<Decimal>,
    #[serde(default)]
    pub number_of_installments: Option<u32>,
    #[serde(default)]
    pub custom_installments: Vec<CustomInstallmentDto>,
    #[serde(default)]
    pub auto_renew: bool,
}

impl From<CreatePlanRequest> for NewPlanRequest {
    fn from(dto: CreatePlanRequest) -> Self {
        NewPlanRequest {
            pledge_id: PledgeId::from_uuid(dto.pledge_id),
            label: dto.label,
            currency: dto.currency,
            cadence: dto.cadence,
            start_date: dto.start_date,
            distribution: dto.distribution,
            total_planned_amount: dto.total_planned_amount,
            installment_amount: dto.installment_amount,
            number_of_installments: dto.number_of_installments,
            custom_installments: dto
                .custom_installments
                .into_iter()
                .map(Into::into)
                .collect(),
            auto_renew: dto.auto_renew,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ReplacePlanRequest {
    /// Version token from the last read; stale tokens are rejected
    pub expected_version: i64,
    pub currency: Currency,
    pub cadence: Cadence,
    pub start_date: NaiveDate,
    pub distribution: DistributionPolicy,
    #[serde(default)]
    pub total_planned_amount: Option<Decimal>,
    #[serde(default)]
    pub installment_amount: Option<Decimal>,
    #[serde(default)]
    pub number_of_installments: Option<u32>,
    #[serde(default)]
    pub custom_installments: Vec<CustomInstallmentDto>,
}

impl From<ReplacePlanRequest> for UpdatePlanRequest {
    fn from(dto: ReplacePlanRequest) -> Self {
        UpdatePlanRequest {
            expected_version: dto.expected_version,
            currency: dto.currency,
            cadence: dto.cadence,
            start_date: dto.start_date,
            distribution: dto.distribution,
            total_planned_amount: dto.total_planned_amount,
            installment_amount: dto.installment_amount,
            number_of_installments: dto.number_of_installments,
            custom_installments: dto
                .custom_installments
                .into_iter()
                .map(Into::into)
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PlanResponse {
    pub id: String,
    pub pledge_id: String,
    pub label: String,
    pub currency: Currency,
    pub cadence: Cadence,
    pub distribution: DistributionPolicy,
    pub status: PlanStatus,
    pub total_planned_amount: Decimal,
    pub installment_amount: Decimal,
    pub number_of_installments: u32,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub next_payment_date: Option<NaiveDate>,
    pub installments_paid: u32,
    pub total_paid: Decimal,
    pub auto_renew: bool,
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&PaymentPlan> for PlanResponse {
    fn from(plan: &PaymentPlan) -> Self {
        PlanResponse {
            id: plan.id.to_string(),
            pledge_id: plan.pledge_id.to_string(),
            label: plan.label.clone(),
            currency: plan.total_planned.currency(),
            cadence: plan.cadence,
            distribution: plan.distribution,
            status: plan.status,
            total_planned_amount: plan.total_planned.amount(),
            installment_amount: plan.installment_amount.amount(),
            number_of_installments: plan.installment_count,
            start_date: plan.start_date,
            end_date: plan.end_date,
            next_payment_date: plan.next_payment_date,
            installments_paid: plan.installments_paid,
            total_paid: plan.total_paid.amount(),
            auto_renew: plan.auto_renew,
            version: plan.version,
            created_at: plan.created_at,
            updated_at: plan.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct InstallmentResponse {
    pub id: String,
    pub due_date: NaiveDate,
    pub amount: Decimal,
    pub currency: Currency,
    pub state: FulfillmentState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paid_date: Option<NaiveDate>,
}

impl From<&InstallmentEntry> for InstallmentResponse {
    fn from(entry: &InstallmentEntry) -> Self {
        InstallmentResponse {
            id: entry.id.to_string(),
            due_date: entry.due_date,
            amount: entry.amount.amount(),
            currency: entry.amount.currency(),
            state: entry.state,
            note: entry.note.clone(),
            paid_date: entry.paid_date,
        }
    }
}

/// Plan plus its full installment schedule, returned by create/update/get
#[derive(Debug, Serialize)]
pub struct PlanWithScheduleResponse {
    #[serde(flatten)]
    pub plan: PlanResponse,
    pub installments: Vec<InstallmentResponse>,
}

impl PlanWithScheduleResponse {
    pub fn new(plan: &PaymentPlan, entries: &[InstallmentEntry]) -> Self {
        PlanWithScheduleResponse {
            plan: PlanResponse::from(plan),
            installments: entries.iter().map(InstallmentResponse::from).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_request_deserializes_with_defaults() {
        let json = r#"{
            "pledge_id": "7b4f9a6e-32f1-4f0e-9d7c-1a2b3c4d5e6f",
            "label": "Building fund",
            "currency": "USD",
            "cadence": "monthly",
            "start_date": "2025-01-15",
            "distribution": "fixed",
            "total_planned_amount": "120.00",
            "installment_amount": "30.00",
            "number_of_installments": 4
        }"#;

        let dto: CreatePlanRequest = serde_json::from_str(json).unwrap();
        assert!(dto.custom_installments.is_empty());
        assert!(!dto.auto_renew);
        assert_eq!(dto.cadence, Cadence::Monthly);
        assert_eq!(dto.distribution, DistributionPolicy::Fixed);
    }

    #[test]
    fn custom_installments_deserialize() {
        let json = r#"{
            "pledge_id": "7b4f9a6e-32f1-4f0e-9d7c-1a2b3c4d5e6f",
            "label": "Gala pledges",
            "currency": "ILS",
            "cadence": "custom",
            "start_date": "2025-02-01",
            "distribution": "custom",
            "total_planned_amount": "500.00",
            "custom_installments": [
                {"date": "2025-02-01", "amount": "300.00", "notes": "gala night"},
                {"date": "2025-03-01", "amount": "200.00"}
            ]
        }"#;

        let dto: CreatePlanRequest = serde_json::from_str(json).unwrap();
        assert_eq!(dto.custom_installments.len(), 2);
        assert_eq!(dto.custom_installments[0].notes.as_deref(), Some("gala night"));
    }
}
