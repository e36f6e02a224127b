//! Payment plan handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::str::FromStr;

use core_kernel::PlanId;
use domain_pledge::PlanService;
use infra_db::{PlanRepository, PledgeRepository};

use crate::dto::plans::{
    CreatePlanRequest, InstallmentResponse, PlanWithScheduleResponse, ReplacePlanRequest,
};
use crate::{error::ApiError, AppState};

fn plan_service(state: &AppState) -> PlanService<PlanRepository, PledgeRepository> {
    PlanService::new(
        PlanRepository::new(state.pool.clone()),
        PledgeRepository::new(state.pool.clone()),
    )
}

fn parse_plan_id(id: &str) -> Result<PlanId, ApiError> {
    PlanId::from_str(id)
        .map_err(|_| ApiError::validation_field(format!("'{}' is not a plan id", id), "id"))
}

/// Creates a payment plan and its installment schedule
pub async fn create_plan(
    State(state): State<AppState>,
    Json(request): Json<CreatePlanRequest>,
) -> Result<(StatusCode, Json<PlanWithScheduleResponse>), ApiError> {
    let (plan, entries) = plan_service(&state).create_plan(request.into()).await?;
    Ok((
        StatusCode::CREATED,
        Json(PlanWithScheduleResponse::new(&plan, &entries)),
    ))
}

/// Replaces a plan's distribution and schedule
///
/// The body must carry the version token from the caller's last read;
/// a stale token yields 409 and leaves the stored schedule untouched.
pub async fn update_plan(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<ReplacePlanRequest>,
) -> Result<Json<PlanWithScheduleResponse>, ApiError> {
    let plan_id = parse_plan_id(&id)?;
    let (plan, entries) = plan_service(&state)
        .update_plan(plan_id, request.into())
        .await?;
    Ok(Json(PlanWithScheduleResponse::new(&plan, &entries)))
}

/// Gets a plan with its schedule
pub async fn get_plan(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PlanWithScheduleResponse>, ApiError> {
    let plan_id = parse_plan_id(&id)?;
    let (plan, entries) = plan_service(&state).get_plan(plan_id).await?;
    Ok(Json(PlanWithScheduleResponse::new(&plan, &entries)))
}

/// Lists a plan's installments only
pub async fn list_installments(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<InstallmentResponse>>, ApiError> {
    let plan_id = parse_plan_id(&id)?;
    let (_, entries) = plan_service(&state).get_plan(plan_id).await?;
    Ok(Json(entries.iter().map(InstallmentResponse::from).collect()))
}
