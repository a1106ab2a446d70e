use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use uuid::Uuid;

/// Status of a generation job.
///
/// Stored as lowercase text in the `generations.status` column. The only legal
/// transitions are `Processing -> Completed` and `Processing -> Failed`.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum JobStatus {
    Processing,
    Completed,
    Failed,
}

impl JobStatus {
    /// Completed and failed jobs never change again.
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

/// One avatar generation request and its outcome.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Job {
    pub id: Uuid,
    pub user_id: String,
    pub status: JobStatus,
    pub reference_image_url: String,
    /// Present only once the job is `completed`.
    pub result_image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}
