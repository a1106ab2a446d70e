use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use uuid::Uuid;

use crate::app_state::AppState;
use crate::error::{AppError, AppResult};
use crate::models::generation::{GenerateRequest, GenerateResponse, JobStatusResponse};

const ACCEPTED_MESSAGE: &str = "AI is working in the background!";

/// POST /generate — record a generation job and start it in the background.
///
/// Responds as soon as the job row exists; the provider call runs in a
/// detached task.
pub async fn submit_generation(
    State(state): State<AppState>,
    payload: Result<Json<GenerateRequest>, JsonRejection>,
) -> AppResult<Json<GenerateResponse>> {
    let Json(request) = payload.map_err(body_error)?;

    let submission = state
        .dispatcher
        .submit(&request.user_id, &request.user_image_url)
        .await?;

    Ok(Json(GenerateResponse {
        status: submission.status,
        id: submission.job_id,
        message: ACCEPTED_MESSAGE.to_string(),
    }))
}

/// GET /generate/{id} — current state of a generation job.
pub async fn get_generation(
    State(state): State<AppState>,
    job_id: Result<Path<Uuid>, PathRejection>,
) -> AppResult<Json<JobStatusResponse>> {
    let Path(job_id) = job_id.map_err(|e| AppError::MalformedRequest(e.body_text()))?;

    let job = state
        .store
        .get_job(job_id)
        .await?
        .ok_or(AppError::NotFound(job_id))?;

    Ok(Json(job.into()))
}

/// Oversized bodies are rejected as such; anything else failed to decode.
fn body_error(rejection: JsonRejection) -> AppError {
    if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(rejection.body_text())
    } else {
        AppError::MalformedRequest(format!("Invalid JSON: {}", rejection.body_text()))
    }
}
