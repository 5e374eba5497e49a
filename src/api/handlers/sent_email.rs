use axum::{extract::State, response::IntoResponse, Json};
use std::sync::Arc;
use tracing::info;

use crate::api::dtos::responses::DeletedResponse;
use crate::error::AppError;
use crate::state::AppState;

pub async fn list_sent_emails(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    let records = state.sent_email_repo.list_newest_first().await?;
    Ok(Json(records))
}

/// The only way ledger rows ever disappear.
pub async fn clear_sent_emails(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    let deleted_count = state.sent_email_repo.delete_all().await?;
    info!(deleted_count, "cleared sent-email ledger");
    Ok(Json(DeletedResponse { deleted_count }))
}
