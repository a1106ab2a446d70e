//! Job lifecycle orchestration.
//!
//! [`JobDispatcher::submit`] records the job and returns straight away; the
//! provider call and the terminal status write happen in a spawned Tokio task.

use std::sync::Arc;
use std::time::Instant;

use tokio::task::JoinHandle;
use tracing::Instrument;
use uuid::Uuid;

use crate::db::{JobStore, StatusUpdate, StoreError};
use crate::models::job::JobStatus;
use crate::services::generator::ImageGenerator;
use crate::services::reference::ReferenceSelector;

/// Handle to an accepted generation request.
#[derive(Debug)]
pub struct Submission {
    pub job_id: Uuid,
    /// Always `Processing` at submission time.
    pub status: JobStatus,
    /// The detached unit of work. Dropping it does not cancel the job.
    pub task: JoinHandle<()>,
}

/// Creates jobs and drives each one to a terminal status.
pub struct JobDispatcher {
    store: Arc<dyn JobStore>,
    generator: Arc<dyn ImageGenerator>,
    selector: Arc<dyn ReferenceSelector>,
}

impl JobDispatcher {
    pub fn new(
        store: Arc<dyn JobStore>,
        generator: Arc<dyn ImageGenerator>,
        selector: Arc<dyn ReferenceSelector>,
    ) -> Self {
        Self {
            store,
            generator,
            selector,
        }
    }

    /// Accept a generation request for `user_id`.
    ///
    /// Returns once the job row exists. If the insert fails nothing is
    /// spawned and the error goes back to the caller.
    pub async fn submit(
        &self,
        user_id: &str,
        user_image_url: &str,
    ) -> Result<Submission, StoreError> {
        let reference = self.selector.select_reference();

        tracing::info!(user_id = %user_id, reference = %reference, "Generation job requested");

        let job = match self.store.create_job(user_id, &reference).await {
            Ok(job) => job,
            Err(e) => {
                tracing::error!(user_id = %user_id, error = %e, "Failed to create generation job");
                return Err(e);
            }
        };

        metrics::counter!("generation_jobs_submitted_total").increment(1);

        let span = tracing::info_span!("generation_job", job_id = %job.id);
        let task = tokio::spawn(
            run_job(
                Arc::clone(&self.store),
                Arc::clone(&self.generator),
                job.id,
                user_image_url.to_string(),
                reference,
            )
            .instrument(span),
        );

        Ok(Submission {
            job_id: job.id,
            status: job.status,
            task,
        })
    }
}

/// Call the provider once and record the terminal status.
async fn run_job(
    store: Arc<dyn JobStore>,
    generator: Arc<dyn ImageGenerator>,
    job_id: Uuid,
    user_image_url: String,
    reference_image_url: String,
) {
    let start = Instant::now();
    let outcome = generator.generate(&user_image_url, &reference_image_url).await;
    metrics::histogram!("generation_provider_seconds").record(start.elapsed().as_secs_f64());

    let (target, update) = match outcome {
        Ok(result) => {
            if result.is_placeholder() {
                metrics::counter!("generation_jobs_placeholder_total").increment(1);
                tracing::warn!(
                    job_id = %job_id,
                    result_url = %result.result_url(),
                    "Provider response had no result URL, completing with placeholder"
                );
            } else {
                tracing::info!(job_id = %job_id, result_url = %result.result_url(), "Generation succeeded");
            }
            (
                JobStatus::Completed,
                store.mark_completed(job_id, result.result_url()).await,
            )
        }
        Err(e) => {
            tracing::warn!(
                job_id = %job_id,
                kind = e.kind(),
                error = %e,
                elapsed_ms = start.elapsed().as_millis() as u64,
                "Generation failed"
            );
            (JobStatus::Failed, store.mark_failed(job_id).await)
        }
    };

    match update {
        Ok(StatusUpdate::Applied) => {
            if let Some(counter) = outcome_counter(target) {
                metrics::counter!(counter).increment(1);
            }
            tracing::info!(job_id = %job_id, status = %target, "Job status recorded");
        }
        Ok(StatusUpdate::Unchanged) => {
            tracing::warn!(
                job_id = %job_id,
                status = %target,
                "Job was not processing, status left unchanged"
            );
        }
        Err(e) => {
            tracing::error!(
                job_id = %job_id,
                status = %target,
                error = %e,
                "Failed to record job status"
            );
        }
    }
}

/// Counter bumped when a job reaches `status`.
fn outcome_counter(status: JobStatus) -> Option<&'static str> {
    match status {
        JobStatus::Completed => Some("generation_jobs_completed_total"),
        JobStatus::Failed => Some("generation_jobs_failed_total"),
        JobStatus::Processing => None,
    }
}
