//! Infrastructure Database Layer
//!
//! This crate provides the database infrastructure for the pledge plan
//! system on PostgreSQL using SQLx.
//!
//! # Architecture
//!
//! The crate follows the repository pattern, providing data access
//! abstractions that hide the database implementation details from the
//! domain layer. Repositories implement the domain port traits so the
//! service layer never sees SQL.
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_db::{DatabaseConfig, create_pool, PlanRepository};
//!
//! let pool = create_pool(DatabaseConfig::new("postgres://localhost/pledges")).await?;
//! let repo = PlanRepository::new(pool);
//! ```

pub mod pool;
pub mod error;
pub mod repositories;

pub use pool::{DatabasePool, create_pool, create_pool_from_url, DatabaseConfig};
pub use error::DatabaseError;
pub use repositories::{PlanRepository, PledgeRepository};
