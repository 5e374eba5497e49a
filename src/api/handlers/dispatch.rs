use axum::{extract::State, response::IntoResponse, Json};
use std::sync::Arc;
use tracing::info;

use crate::api::dtos::requests::SendEmailsRequest;
use crate::error::AppError;
use crate::state::AppState;

/// Triggers one dispatch run and blocks until the run summary is ready.
/// Precondition failures (empty event name, unset sender identity) fail the
/// whole call before any send; an already-running dispatch is a 409.
pub async fn send_emails(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<SendEmailsRequest>,
) -> Result<impl IntoResponse, AppError> {
    let summary = state.dispatch.send_emails(payload.event_name.as_deref()).await?;
    Ok(Json(summary))
}

/// Cooperative cancellation: the engine finishes the recipient in flight and
/// stops before the next one.
pub async fn cancel_dispatch(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    state.dispatch.request_cancel();
    info!("dispatch cancellation requested");
    Ok(Json(serde_json::json!({"status": "cancel_requested"})))
}
