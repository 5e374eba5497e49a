use axum::{extract::State, response::IntoResponse, Json};
use std::sync::Arc;

use crate::domain::services::reporting::compute_stats;
use crate::error::AppError;
use crate::state::AppState;

/// Aggregate counts from one consistent snapshot, sharing the eligibility
/// predicate with dispatch selection.
pub async fn get_stats(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, AppError> {
    let attendees = state.attendee_repo.list_all().await?;
    Ok(Json(compute_stats(&attendees)))
}
