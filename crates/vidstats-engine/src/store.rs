//! The analytical store as the answer engine sees it.

use async_trait::async_trait;
use sqlx::PgPool;
use vidstats_core::QueryDescriptor;
use vidstats_db::{dispatch_query, run_adhoc_count, DbError};

/// Read access to the statistics store.
///
/// The engine only ever needs two operations, so tests substitute a stub
/// here instead of standing up Postgres.
#[async_trait]
pub trait AnalyticsStore: Send + Sync {
    /// Runs the fixed query behind a descriptor.
    async fn run_descriptor(&self, descriptor: &QueryDescriptor) -> Result<i64, DbError>;

    /// Validates and runs one synthesized statement.
    async fn run_adhoc(&self, sql: &str) -> Result<i64, DbError>;
}

/// Production store backed by a Postgres pool.
pub struct PgAnalyticsStore {
    pool: PgPool,
}

impl PgAnalyticsStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AnalyticsStore for PgAnalyticsStore {
    async fn run_descriptor(&self, descriptor: &QueryDescriptor) -> Result<i64, DbError> {
        dispatch_query(&self.pool, descriptor).await
    }

    async fn run_adhoc(&self, sql: &str) -> Result<i64, DbError> {
        run_adhoc_count(&self.pool, sql).await
    }
}
