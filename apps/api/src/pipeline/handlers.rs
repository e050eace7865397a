//! Axum route handlers for the Analysis API.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::analysis::{
    AnalysisRecord, ProjectSubmission, MAX_DESCRIPTION_LEN, MIN_DESCRIPTION_LEN,
};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub analysis_id: Uuid,
    pub status: &'static str,
    pub message: &'static str,
}

/// POST /api/v1/analyses
///
/// Accepts a project description, fires the analysis pipeline on a
/// background task, and returns the id immediately. Poll the id for results.
pub async fn handle_submit(
    State(state): State<AppState>,
    Json(submission): Json<ProjectSubmission>,
) -> Result<Json<SubmitResponse>, AppError> {
    let len = submission.description.chars().count();
    if len < MIN_DESCRIPTION_LEN || len > MAX_DESCRIPTION_LEN {
        return Err(AppError::Validation(format!(
            "description must be between {MIN_DESCRIPTION_LEN} and {MAX_DESCRIPTION_LEN} characters"
        )));
    }

    let analysis_id = state.coordinator.submit(submission).await;

    Ok(Json(SubmitResponse {
        analysis_id,
        status: "processing",
        message: "Analysis started. Use the analysis_id to check status.",
    }))
}

/// GET /api/v1/analyses/:id
///
/// Returns the full analysis record: "processing" while the pipeline runs,
/// then "completed" with results or "failed" with a human-readable message.
pub async fn handle_get_analysis(
    State(state): State<AppState>,
    Path(analysis_id): Path<Uuid>,
) -> Result<Json<AnalysisRecord>, AppError> {
    state
        .store
        .get(analysis_id)
        .await
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Analysis {analysis_id} not found")))
}
