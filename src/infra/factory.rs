use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use tracing::info;

use crate::config::Config;
use crate::domain::services::dispatch::{DispatchEngine, DispatchTuning, SenderIdentity};
use crate::domain::services::renderer::{load_templates, MessageRenderer};
use crate::infra::email::http_mail_transport::HttpMailTransport;
use crate::infra::repositories::{
    sqlite_attendee_repo::SqliteAttendeeRepo, sqlite_sent_email_repo::SqliteSentEmailRepo,
};
use crate::state::AppState;

pub async fn bootstrap_state(config: &Config) -> AppState {
    info!("Initializing SQLite connection with WAL mode...");

    let opts = SqliteConnectOptions::from_str(&config.database_url)
        .expect("Invalid SQLite connection string")
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(5));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(opts)
        .await
        .expect("Failed to connect to SQLite");

    run_migrations(&pool).await;

    let templates = Arc::new(load_templates());

    let attendee_repo = Arc::new(SqliteAttendeeRepo::new(pool.clone()));
    let sent_email_repo = Arc::new(SqliteSentEmailRepo::new(pool.clone()));

    let transport = Arc::new(HttpMailTransport::new(
        config.mail_api_url.clone(),
        config.mail_api_key.clone(),
    ));

    let sender = config.mail_from.clone().map(|from_address| SenderIdentity {
        from_address,
        from_display_name: config.mail_from_name.clone(),
    });

    let dispatch = Arc::new(DispatchEngine::new(
        attendee_repo.clone(),
        sent_email_repo.clone(),
        transport,
        MessageRenderer::new(templates.clone()),
        sender,
        config.default_event_name.clone(),
        DispatchTuning::default(),
    ));

    AppState {
        config: config.clone(),
        attendee_repo,
        sent_email_repo,
        dispatch,
        templates,
    }
}

async fn run_migrations(pool: &SqlitePool) {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .expect("Failed to run migrations");
}
