use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use garde::Validate;
use uuid::Uuid;

use super::error::ApiError;
use crate::app_state::ReportState;
use crate::models::report::{CreateReportRequest, Report};

/// POST /reports — request a report for a location.
pub async fn request_report(
    State(state): State<ReportState>,
    body: Result<Json<CreateReportRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Report>), ApiError> {
    let Json(request) =
        body.map_err(|e| ApiError::BadRequest(format!("Invalid request body: {e}")))?;

    request
        .validate()
        .map_err(|_| ApiError::BadRequest("Location must not be empty".to_string()))?;

    let report = state
        .reports
        .request_report_generation(&request.location)
        .await?;

    Ok((StatusCode::CREATED, Json(report)))
}

/// GET /reports
pub async fn list_reports(State(state): State<ReportState>) -> Result<Json<Vec<Report>>, ApiError> {
    Ok(Json(state.reports.list_reports().await?))
}

/// GET /reports/{id}
pub async fn get_report(
    State(state): State<ReportState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<Report>, ApiError> {
    let Path(id) = id.map_err(|_| ApiError::BadRequest("Invalid report ID format".to_string()))?;

    state
        .reports
        .get_report(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Report not found".to_string()))
}
