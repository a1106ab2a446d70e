use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use std::str::FromStr;
use uuid::Uuid;

use crate::db::{JobStore, StatusUpdate, StoreError};
use crate::models::job::{Job, JobStatus};

/// Insert a new generation job in the `processing` state
pub async fn create_job(
    pool: &PgPool,
    user_id: &str,
    reference_image_url: &str,
) -> Result<Job, StoreError> {
    let row = sqlx::query(
        r#"
        INSERT INTO generations (user_id, status, reference_image_url, created_at)
        VALUES ($1, $2, $3, NOW())
        RETURNING id, user_id, status, reference_image_url, result_image_url, created_at
        "#,
    )
    .bind(user_id)
    .bind(JobStatus::Processing.as_ref())
    .bind(reference_image_url)
    .fetch_one(pool)
    .await?;

    job_from_row(&row)
}

/// Get a job by ID
pub async fn get_job(pool: &PgPool, job_id: Uuid) -> Result<Option<Job>, StoreError> {
    let row = sqlx::query(
        r#"
        SELECT id, user_id, status, reference_image_url, result_image_url, created_at
        FROM generations
        WHERE id = $1
        "#,
    )
    .bind(job_id)
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(job_from_row).transpose()
}

/// Move a processing job to `completed` with its result URL.
///
/// The `status = 'processing'` guard makes a second call a no-op.
pub async fn mark_completed(
    pool: &PgPool,
    job_id: Uuid,
    result_url: &str,
) -> Result<StatusUpdate, StoreError> {
    let result = sqlx::query(
        r#"
        UPDATE generations
        SET status = $1,
            result_image_url = $2
        WHERE id = $3 AND status = $4
        "#,
    )
    .bind(JobStatus::Completed.as_ref())
    .bind(result_url)
    .bind(job_id)
    .bind(JobStatus::Processing.as_ref())
    .execute(pool)
    .await?;

    Ok(update_outcome(result.rows_affected()))
}

/// Move a processing job to `failed`.
pub async fn mark_failed(pool: &PgPool, job_id: Uuid) -> Result<StatusUpdate, StoreError> {
    let result = sqlx::query(
        r#"
        UPDATE generations
        SET status = $1
        WHERE id = $2 AND status = $3
        "#,
    )
    .bind(JobStatus::Failed.as_ref())
    .bind(job_id)
    .bind(JobStatus::Processing.as_ref())
    .execute(pool)
    .await?;

    Ok(update_outcome(result.rows_affected()))
}

fn update_outcome(rows_affected: u64) -> StatusUpdate {
    if rows_affected == 0 {
        StatusUpdate::Unchanged
    } else {
        StatusUpdate::Applied
    }
}

fn job_from_row(row: &PgRow) -> Result<Job, StoreError> {
    let status_str: String = row.try_get("status")?;
    let status =
        JobStatus::from_str(&status_str).map_err(|_| StoreError::InvalidStatus(status_str))?;

    Ok(Job {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        status,
        reference_image_url: row.try_get("reference_image_url")?,
        result_image_url: row.try_get("result_image_url")?,
        created_at: row.try_get("created_at")?,
    })
}

/// PostgreSQL-backed [`JobStore`].
#[derive(Clone)]
pub struct PgJobStore {
    pool: PgPool,
}

impl PgJobStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl JobStore for PgJobStore {
    async fn create_job(
        &self,
        user_id: &str,
        reference_image_url: &str,
    ) -> Result<Job, StoreError> {
        create_job(&self.pool, user_id, reference_image_url).await
    }

    async fn mark_completed(
        &self,
        job_id: Uuid,
        result_url: &str,
    ) -> Result<StatusUpdate, StoreError> {
        mark_completed(&self.pool, job_id, result_url).await
    }

    async fn mark_failed(&self, job_id: Uuid) -> Result<StatusUpdate, StoreError> {
        mark_failed(&self.pool, job_id).await
    }

    async fn get_job(&self, job_id: Uuid) -> Result<Option<Job>, StoreError> {
        get_job(&self.pool, job_id).await
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
