use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::job::{Job, JobStatus};

/// Body of `POST /generate`.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateRequest {
    pub user_id: String,
    pub user_image_url: String,
}

/// Response returned as soon as the job record exists.
#[derive(Debug, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub status: JobStatus,
    pub id: Uuid,
    pub message: String,
}

/// Response for `GET /generate/{id}`.
#[derive(Debug, Serialize, Deserialize)]
pub struct JobStatusResponse {
    pub id: Uuid,
    pub user_id: String,
    pub status: JobStatus,
    pub reference_image_url: String,
    pub result_image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Job> for JobStatusResponse {
    fn from(job: Job) -> Self {
        Self {
            id: job.id,
            user_id: job.user_id,
            status: job.status,
            reference_image_url: job.reference_image_url,
            result_image_url: job.result_image_url,
            created_at: job.created_at,
        }
    }
}
