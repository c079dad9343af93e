//! Axum route handlers for the Recommendation API.

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use crate::errors::AppError;
use crate::models::recommendation::RecommendationResult;
use crate::models::soil::{field_hints, FieldHint, SoilReading};
use crate::recommendation::orchestrator::{SessionSnapshot, Submission};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct DefaultsResponse {
    pub reading: SoilReading,
    pub fields: Vec<FieldHint>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionStatus {
    Applied,
    Superseded,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponse {
    pub request_token: u64,
    pub status: SubmissionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<RecommendationResult>,
}

impl From<Submission> for SubmitResponse {
    fn from(submission: Submission) -> Self {
        let request_token = submission.token();
        let (status, result) = match submission {
            Submission::Applied { result, .. } => (SubmissionStatus::Applied, Some(result)),
            Submission::Superseded { .. } => (SubmissionStatus::Superseded, None),
        };
        SubmitResponse {
            request_token,
            status,
            result,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/soil/defaults
///
/// Initial form values plus display hints for each control.
pub async fn handle_get_defaults() -> Json<DefaultsResponse> {
    Json(DefaultsResponse {
        reading: SoilReading::default(),
        fields: field_hints(),
    })
}

/// GET /api/v1/recommendations
pub async fn handle_get_session(State(state): State<AppState>) -> Json<SessionSnapshot> {
    Json(state.orchestrator.snapshot().await)
}

/// POST /api/v1/recommendations
///
/// Submits a reading. A superseded submission returns 200 with no result; the
/// client should keep showing whatever the newer submission produces.
pub async fn handle_submit(
    State(state): State<AppState>,
    Json(reading): Json<SoilReading>,
) -> Result<Json<SubmitResponse>, AppError> {
    let non_finite = reading.non_finite_fields();
    if !non_finite.is_empty() {
        return Err(AppError::Validation(format!(
            "fields must be finite numbers: {}",
            non_finite.join(", ")
        )));
    }

    let submission = state.orchestrator.submit(reading).await?;
    Ok(Json(submission.into()))
}

/// DELETE /api/v1/recommendations
pub async fn handle_reset(State(state): State<AppState>) -> StatusCode {
    state.orchestrator.reset().await;
    StatusCode::NO_CONTENT
}
