use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;
use uuid::Uuid;

use crate::models::job::Job;

pub mod queries;

pub use queries::PgJobStore;

/// Initialize PostgreSQL connection pool
pub async fn init_pool(database_url: &str) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(20)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .idle_timeout(Duration::from_secs(600))
        .max_lifetime(Duration::from_secs(1800))
        .connect(database_url)
        .await
}

/// Run database migrations
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|e| sqlx::Error::Migrate(Box::new(e)))
}

/// Outcome of a guarded status transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusUpdate {
    /// The job was `processing` and now holds the new terminal status.
    Applied,
    /// The job was already terminal (or does not exist); nothing was written.
    Unchanged,
}

/// Durable storage for generation jobs.
///
/// Implementations must apply each transition atomically per row and must
/// never move a job out of a terminal status.
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Insert a `processing` job. The store assigns `id` and `created_at`.
    async fn create_job(&self, user_id: &str, reference_image_url: &str)
        -> Result<Job, StoreError>;

    /// `processing -> completed`, recording where the result lives.
    async fn mark_completed(&self, job_id: Uuid, result_url: &str)
        -> Result<StatusUpdate, StoreError>;

    /// `processing -> failed`.
    async fn mark_failed(&self, job_id: Uuid) -> Result<StatusUpdate, StoreError>;

    async fn get_job(&self, job_id: Uuid) -> Result<Option<Job>, StoreError>;

    /// Check connectivity (for health checks).
    async fn health_check(&self) -> Result<(), StoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Unknown job status in storage: {0}")]
    InvalidStatus(String),
}
