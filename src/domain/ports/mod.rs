use crate::domain::models::{
    attendee::{Attendee, AttendeeUploadRow},
    sent_email::{NewSentEmail, SentEmail},
};
use crate::error::AppError;
use async_trait::async_trait;

#[async_trait]
pub trait AttendeeRepository: Send + Sync {
    /// Transactional full replace: delete every row, then insert the given
    /// ones. Either all rows land or none do.
    async fn replace_all(&self, rows: &[AttendeeUploadRow]) -> Result<u64, AppError>;
    /// Every row, id ascending. Single query so stats are computed from one
    /// consistent snapshot.
    async fn list_all(&self) -> Result<Vec<Attendee>, AppError>;
    async fn list_checked_in(&self) -> Result<Vec<Attendee>, AppError>;
    /// Rows satisfying the dispatch-eligibility predicate, id ascending.
    /// Must stay equivalent to `Attendee::is_eligible`.
    async fn select_eligible(&self) -> Result<Vec<Attendee>, AppError>;
    async fn assign_code(&self, id: i64, code: &str) -> Result<(), AppError>;
    async fn mark_sent(&self, id: i64) -> Result<(), AppError>;
    async fn delete(&self, id: i64) -> Result<(), AppError>;
    async fn delete_all(&self) -> Result<u64, AppError>;
}

#[async_trait]
pub trait SentEmailRepository: Send + Sync {
    async fn append(&self, record: &NewSentEmail) -> Result<SentEmail, AppError>;
    async fn list_newest_first(&self) -> Result<Vec<SentEmail>, AppError>;
    async fn delete_all(&self) -> Result<u64, AppError>;
}

#[derive(Debug, Clone)]
pub struct OutboundEmail {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub html_body: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendFailureKind {
    /// Provider signalled a rate limit (HTTP 429).
    RateLimited,
    /// Could not reach the provider at all.
    Network,
    /// Provider-side error (5xx).
    Provider,
    /// Provider rejected the message outright (other non-2xx).
    Rejected,
    /// HTTP-level success but no message id in the response body. Still a
    /// failed attempt: delivery counts only when the provider hands back an id.
    MissingMessageId,
}

/// Tagged transport outcome. Retry logic branches on the explicit
/// `retryable` flag instead of inspecting provider status codes.
#[derive(Debug, Clone)]
pub enum SendOutcome {
    Delivered { message_id: String },
    Failed { kind: SendFailureKind, retryable: bool },
}

impl SendOutcome {
    pub fn failed(kind: SendFailureKind) -> Self {
        let retryable = matches!(
            kind,
            SendFailureKind::RateLimited
                | SendFailureKind::Network
                | SendFailureKind::Provider
                | SendFailureKind::MissingMessageId
        );
        SendOutcome::Failed { kind, retryable }
    }

    pub fn is_delivered(&self) -> bool {
        matches!(self, SendOutcome::Delivered { .. })
    }
}

/// External transactional-email provider. Transport errors are folded into
/// `SendOutcome::Failed`; an `Err` is never returned for a refused message.
#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn send(&self, email: &OutboundEmail) -> SendOutcome;
}
