use axum::{extract::{Path, State}, response::IntoResponse, Json};
use std::sync::Arc;
use tracing::info;

use crate::api::dtos::{
    requests::{AssignCodesRequest, UploadCsvRequest},
    responses::{AssignResponse, AssignmentPreviewRow, DeletedResponse, UploadResponse},
};
use crate::domain::models::attendee::AttendeeUploadRow;
use crate::domain::services::assignment::plan_assignments;
use crate::error::AppError;
use crate::state::AppState;

/// Full store replace from pre-parsed CSV rows. Rows that never checked in
/// (empty `checked_in_at`) are dropped before insert.
pub async fn upload_csv(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<UploadCsvRequest>,
) -> Result<impl IntoResponse, AppError> {
    let rows: Vec<AttendeeUploadRow> = payload
        .csv_data
        .into_iter()
        .filter(|row| !row.checked_in_at.is_empty())
        .collect();

    let count = state.attendee_repo.replace_all(&rows).await?;
    info!(count, "replaced attendee store from upload");
    Ok(Json(UploadResponse { count }))
}

/// Same replace semantics, but takes the raw CSV export as the request body
/// and parses it server side. Malformed CSV rejects the whole upload.
pub async fn upload_csv_raw(
    State(state): State<Arc<AppState>>,
    body: String,
) -> Result<impl IntoResponse, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(body.as_bytes());

    let mut rows = Vec::new();
    for record in reader.deserialize::<AttendeeUploadRow>() {
        let row = record.map_err(|e| AppError::Validation(format!("Malformed CSV: {}", e)))?;
        if !row.checked_in_at.is_empty() {
            rows.push(row);
        }
    }

    let count = state.attendee_repo.replace_all(&rows).await?;
    info!(count, "replaced attendee store from raw CSV upload");
    Ok(Json(UploadResponse { count }))
}

pub async fn list_checked_in(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    let attendees = state.attendee_repo.list_checked_in().await?;
    Ok(Json(attendees))
}

/// Positional assignment of codes to checked-in attendees in store order.
/// Surplus on either side is ignored; the operator only sees the count.
pub async fn assign_codes(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<AssignCodesRequest>,
) -> Result<impl IntoResponse, AppError> {
    if payload.codes.is_empty() {
        return Err(AppError::Validation("codes list must not be empty".into()));
    }

    let checked_in = state.attendee_repo.list_checked_in().await?;
    let plan = plan_assignments(&checked_in, &payload.codes);

    for (id, code) in &plan {
        state.attendee_repo.assign_code(*id, code).await?;
    }

    info!(assigned = plan.len(), "assigned redemption codes");
    Ok(Json(AssignResponse { assigned: plan.len() }))
}

pub async fn assignment_preview(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    let checked_in = state.attendee_repo.list_checked_in().await?;

    let rows: Vec<AssignmentPreviewRow> = checked_in
        .into_iter()
        .map(|a| AssignmentPreviewRow {
            id: a.id,
            first_name: a.first_name,
            email: a.email,
            assigned_code: a
                .assigned_code
                .unwrap_or_else(|| "No code assigned".to_string()),
        })
        .collect();

    Ok(Json(rows))
}

pub async fn delete_attendee(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    state.attendee_repo.delete(id).await?;
    info!(attendee_id = id, "deleted attendee");
    Ok(Json(serde_json::json!({"status": "deleted"})))
}

pub async fn delete_all_attendees(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    let deleted_count = state.attendee_repo.delete_all().await?;
    info!(deleted_count, "cleared attendee store");
    Ok(Json(DeletedResponse { deleted_count }))
}
