//! Repository implementations for domain entities
//!
//! This module provides concrete repository implementations that handle
//! database access for each domain aggregate. Repositories encapsulate
//! SQL queries, map between database rows and domain types, and implement
//! the domain port traits directly.
//!
//! # Architecture
//!
//! Each repository follows these principles:
//! - Runtime-checked SQLx queries with explicit row types
//! - Transaction support for schedule replacement
//! - Optimistic concurrency control on plan updates

pub mod plan;
pub mod pledge;

pub use plan::PlanRepository;
pub use pledge::PledgeRepository;
