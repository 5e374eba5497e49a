use axum::{
    body::Body,
    extract::Request,
    http::HeaderValue,
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    classify::ServerErrorsFailureClass,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{error, info, info_span, Span};
use uuid::Uuid;

use crate::api::handlers::{attendee, dispatch, health, sent_email, stats};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = match state.config.cors_origin.as_deref() {
        Some(origin) if origin != "*" => CorsLayer::new()
            .allow_origin(origin.parse::<HeaderValue>().expect("Invalid CORS_ORIGIN"))
            .allow_methods(Any)
            .allow_headers(Any),
        _ => CorsLayer::permissive(),
    };

    Router::new()
        .route("/health", get(health::health_check))

        // Attendee store
        .route("/api/v1/attendees/upload", post(attendee::upload_csv))
        .route("/api/v1/attendees/upload-csv", post(attendee::upload_csv_raw))
        .route("/api/v1/attendees/checked-in", get(attendee::list_checked_in))
        .route("/api/v1/attendees/assign-codes", post(attendee::assign_codes))
        .route("/api/v1/attendees/assignment-preview", get(attendee::assignment_preview))
        .route("/api/v1/attendees/delete-all", post(attendee::delete_all_attendees))
        .route("/api/v1/attendees/{id}", delete(attendee::delete_attendee))

        // Dispatch
        .route("/api/v1/emails/send", post(dispatch::send_emails))
        .route("/api/v1/emails/cancel", post(dispatch::cancel_dispatch))

        // Reporting & ledger
        .route("/api/v1/stats", get(stats::get_stats))
        .route("/api/v1/sent-emails", get(sent_email::list_sent_emails).delete(sent_email::clear_sent_emails))

        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<Body>| {
                    let request_id = Uuid::new_v4().to_string();
                    info_span!(
                        "http_request",
                        request_id = %request_id,
                        method = ?request.method(),
                        uri = ?request.uri(),
                        version = ?request.version(),
                    )
                })
                .on_request(|request: &Request<Body>, _span: &Span| {
                    info!("started processing request: {} {}", request.method(), request.uri().path());
                })
                .on_response(|response: &axum::http::Response<Body>, latency: Duration, _span: &Span| {
                    info!(
                        status = response.status().as_u16(),
                        latency_ms = latency.as_millis(),
                        "finished processing request"
                    );
                })
                .on_failure(|error: ServerErrorsFailureClass, _latency: Duration, _span: &Span| {
                    error!("request failed: {:?}", error);
                })
        )
        .layer(cors)
        .with_state(state)
}
