use std::sync::Arc;

use tera::Tera;

use crate::config::Config;
use crate::domain::ports::{AttendeeRepository, SentEmailRepository};
use crate::domain::services::dispatch::DispatchEngine;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub attendee_repo: Arc<dyn AttendeeRepository>,
    pub sent_email_repo: Arc<dyn SentEmailRepository>,
    pub dispatch: Arc<DispatchEngine>,
    pub templates: Arc<Tera>,
}
