use checkin_mailer::{
    api::router::create_router,
    config::Config,
    domain::ports::{MailTransport, OutboundEmail, SendFailureKind, SendOutcome},
    domain::services::dispatch::{DispatchEngine, DispatchTuning, SenderIdentity},
    domain::services::renderer::{load_templates, MessageRenderer},
    infra::repositories::{
        sqlite_attendee_repo::SqliteAttendeeRepo, sqlite_sent_email_repo::SqliteSentEmailRepo,
    },
    state::AppState,
};

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::Value;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tower::ServiceExt;
use uuid::Uuid;

/// Per-recipient send behavior for the mock transport. `AlwaysFail` never
/// produces a message id; `FailTimes(n)` fails the first n attempts with a
/// retryable provider error, then delivers.
#[derive(Clone, Copy)]
#[allow(dead_code)]
pub enum SendBehavior {
    Succeed,
    AlwaysFail,
    FailTimes(u32),
}

pub struct MockTransport {
    pub sent: Mutex<Vec<OutboundEmail>>,
    behaviors: Mutex<HashMap<String, SendBehavior>>,
    delays: Mutex<HashMap<String, Duration>>,
    attempts: Mutex<HashMap<String, u32>>,
    next_id: AtomicU64,
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            behaviors: Mutex::new(HashMap::new()),
            delays: Mutex::new(HashMap::new()),
            attempts: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    #[allow(dead_code)]
    pub fn set_behavior(&self, recipient: &str, behavior: SendBehavior) {
        self.behaviors
            .lock()
            .unwrap()
            .insert(recipient.to_string(), behavior);
    }

    /// Holds the send to this recipient open for the given duration, so a
    /// test can act while the run is in flight.
    #[allow(dead_code)]
    pub fn set_delay(&self, recipient: &str, delay: Duration) {
        self.delays
            .lock()
            .unwrap()
            .insert(recipient.to_string(), delay);
    }

    #[allow(dead_code)]
    pub fn attempts_for(&self, recipient: &str) -> u32 {
        self.attempts
            .lock()
            .unwrap()
            .get(recipient)
            .copied()
            .unwrap_or(0)
    }

    #[allow(dead_code)]
    pub fn delivered_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl MailTransport for MockTransport {
    async fn send(&self, email: &OutboundEmail) -> SendOutcome {
        let delay = self.delays.lock().unwrap().get(&email.to).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let attempt = {
            let mut attempts = self.attempts.lock().unwrap();
            let counter = attempts.entry(email.to.clone()).or_insert(0);
            *counter += 1;
            *counter
        };

        let behavior = self
            .behaviors
            .lock()
            .unwrap()
            .get(&email.to)
            .copied()
            .unwrap_or(SendBehavior::Succeed);

        match behavior {
            SendBehavior::AlwaysFail => SendOutcome::failed(SendFailureKind::MissingMessageId),
            SendBehavior::FailTimes(n) if attempt <= n => {
                SendOutcome::failed(SendFailureKind::Provider)
            }
            _ => {
                self.sent.lock().unwrap().push(email.clone());
                let id = self.next_id.fetch_add(1, Ordering::SeqCst);
                SendOutcome::Delivered {
                    message_id: format!("mock-{}", id),
                }
            }
        }
    }
}

pub struct TestAppOptions {
    pub sender: Option<SenderIdentity>,
    pub default_event_name: Option<String>,
}

impl Default for TestAppOptions {
    fn default() -> Self {
        Self {
            sender: Some(SenderIdentity {
                from_address: "codes@example.com".to_string(),
                from_display_name: Some("Event Ops".to_string()),
            }),
            default_event_name: None,
        }
    }
}

#[allow(dead_code)]
pub struct TestApp {
    pub router: Router,
    pub pool: Pool<Sqlite>,
    pub db_filename: String,
    pub state: Arc<AppState>,
    pub transport: Arc<MockTransport>,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_options(TestAppOptions::default()).await
    }

    pub async fn with_options(options: TestAppOptions) -> Self {
        let db_filename = format!("test_{}.db", Uuid::new_v4());
        let db_url = format!("sqlite://{}?mode=rwc", db_filename);

        let connection_options = SqliteConnectOptions::from_str(&db_url)
            .unwrap()
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .connect_with(connection_options)
            .await
            .expect("Failed to connect to test db");

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .expect("Failed to migrate test db");

        let config = Config {
            database_url: db_url.clone(),
            port: 0,
            mail_api_url: "http://localhost".to_string(),
            mail_api_key: "test-key".to_string(),
            mail_from: options.sender.as_ref().map(|s| s.from_address.clone()),
            mail_from_name: options
                .sender
                .as_ref()
                .and_then(|s| s.from_display_name.clone()),
            default_event_name: options.default_event_name.clone(),
            cors_origin: None,
        };

        let templates = Arc::new(load_templates());
        let attendee_repo = Arc::new(SqliteAttendeeRepo::new(pool.clone()));
        let sent_email_repo = Arc::new(SqliteSentEmailRepo::new(pool.clone()));
        let transport = Arc::new(MockTransport::new());

        // Zero delays so the full retry/rate-limit path runs instantly.
        let tuning = DispatchTuning {
            max_attempts: 3,
            retry_base: Duration::ZERO,
            send_gap: Duration::ZERO,
        };

        let dispatch = Arc::new(DispatchEngine::new(
            attendee_repo.clone(),
            sent_email_repo.clone(),
            transport.clone(),
            MessageRenderer::new(templates.clone()),
            options.sender,
            options.default_event_name,
            tuning,
        ));

        let state = Arc::new(AppState {
            config,
            attendee_repo,
            sent_email_repo,
            dispatch,
            templates,
        });

        let router = create_router(state.clone());

        Self {
            router,
            pool,
            db_filename,
            state,
            transport,
        }
    }

    pub async fn request(
        &self,
        method: &str,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                builder.body(Body::from(json.to_string())).unwrap()
            }
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    #[allow(dead_code)]
    pub async fn post_json(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.request("POST", uri, Some(body)).await
    }

    #[allow(dead_code)]
    pub async fn get_json(&self, uri: &str) -> (StatusCode, Value) {
        self.request("GET", uri, None).await
    }

    /// Uploads `n` checked-in attendees named a1..an and assigns the given
    /// codes positionally.
    #[allow(dead_code)]
    pub async fn seed_attendees(&self, n: usize, codes: &[&str]) {
        let rows: Vec<Value> = (1..=n)
            .map(|i| {
                serde_json::json!({
                    "email": format!("a{}@example.com", i),
                    "first_name": format!("First{}", i),
                    "last_name": format!("Last{}", i),
                    "checked_in_at": "2024-06-01 10:00",
                })
            })
            .collect();

        let (status, _) = self
            .post_json("/api/v1/attendees/upload", serde_json::json!({"csv_data": rows}))
            .await;
        assert_eq!(status, StatusCode::OK);

        if !codes.is_empty() {
            let (status, _) = self
                .post_json(
                    "/api/v1/attendees/assign-codes",
                    serde_json::json!({"codes": codes}),
                )
                .await;
            assert_eq!(status, StatusCode::OK);
        }
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.db_filename);
    }
}
