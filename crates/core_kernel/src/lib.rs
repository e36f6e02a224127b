//! Core Kernel - Foundational types and utilities for the pledge system
//!
//! This crate provides the fundamental building blocks used across all domain modules:
//! - Money types with precise minor-unit arithmetic
//! - Installment calendar generation
//! - Common identifiers and value objects
//! - Port infrastructure for the persistence boundary

pub mod calendar;
pub mod error;
pub mod identifiers;
pub mod money;
pub mod ports;

pub use calendar::{schedule_dates, schedule_end_date, Cadence, CalendarError};
pub use error::CoreError;
pub use identifiers::{ContactId, InstallmentId, PaymentId, PlanId, PledgeId};
pub use money::{Currency, Money, MoneyError};
pub use ports::{DomainPort, PortError};
