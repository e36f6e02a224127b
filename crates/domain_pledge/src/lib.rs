//! Pledge Domain - Installment Plan Distribution & Reconciliation Engine
//!
//! This crate turns a pledge's committed total into a monetarily-exact
//! sequence of scheduled installments under two distribution policies, and
//! keeps the schedule, the plan summary, and the pledge's running totals
//! consistent as the policy or its parameters change.
//!
//! # Distribution policies
//!
//! - **Fixed**: a uniform installment amount times a count; when the total
//!   does not divide evenly in minor units, the resolver falls back to an
//!   equivalent custom schedule so no minor unit is lost to rounding.
//! - **Custom**: explicit per-date amounts supplied by the caller; small
//!   rounding noise is absorbed into the last entry, material mismatches
//!   are rejected.
//!
//! # Invariant
//!
//! For every persisted plan, the sum of its installment amounts in minor
//! units equals the plan's total in minor units, exactly.
//!
//! # Example
//!
//! ```rust,ignore
//! use domain_pledge::{PlanService, NewPlanRequest};
//!
//! let service = PlanService::new(plan_repository, pledge_repository);
//! let (plan, schedule) = service.create_plan(request).await?;
//! assert_eq!(schedule.len() as u32, plan.installment_count);
//! ```

pub mod distribution;
pub mod error;
pub mod plan;
pub mod ports;
pub mod reconcile;
pub mod service;

pub use distribution::{
    resolve, CustomEntry, DistributionRequest, Resolved, ScheduledInstallment, Tolerances,
    MAX_INSTALLMENTS,
};
pub use error::PlanError;
pub use plan::{
    DistributionPolicy, FulfillmentState, InstallmentEntry, PaymentPlan, PlanStatus,
    PlanSummaryUpdate,
};
pub use ports::{PledgePort, SchedulePort};
pub use reconcile::{validate_schedule, ScheduleOrigin};
pub use service::{CustomInstallmentInput, NewPlanRequest, PlanService, UpdatePlanRequest};
