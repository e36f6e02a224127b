//! Pledge repository
//!
//! Read-side access to pledge records, implementing the pledge domain's
//! `PledgePort`. Plans only need the pledged total when a request omits
//! its own planned amount.

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::PgPool;
use std::str::FromStr;
use tracing::instrument;

use core_kernel::{Currency, DomainPort, Money, PledgeId, PortError};
use domain_pledge::PledgePort;

use crate::error::DatabaseError;

/// Repository for pledge lookups
#[derive(Debug, Clone)]
pub struct PledgeRepository {
    pool: PgPool,
}

impl PledgeRepository {
    /// Creates a new PledgeRepository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl DomainPort for PledgeRepository {}

#[async_trait]
impl PledgePort for PledgeRepository {
    #[instrument(skip(self), fields(pledge_id = %pledge_id))]
    async fn pledge_total(&self, pledge_id: PledgeId) -> Result<Money, PortError> {
        let row: Option<(Decimal, String)> = sqlx::query_as(
            "SELECT total_amount, currency FROM pledges WHERE pledge_id = $1",
        )
        .bind(pledge_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| PortError::from(DatabaseError::from(&e)))?;

        let (amount, currency) =
            row.ok_or_else(|| PortError::not_found("Pledge", pledge_id))?;
        let currency = Currency::from_str(&currency)
            .map_err(|_| PortError::from(DatabaseError::bad_column("currency", currency)))?;

        Ok(Money::new(amount, currency))
    }
}
