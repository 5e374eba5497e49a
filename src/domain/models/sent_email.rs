use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::attendee::Attendee;

/// Append-only ledger row written once per successfully delivered email.
/// Snapshots the attendee's identity so the audit trail survives attendee
/// deletion and later CSV re-uploads.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct SentEmail {
    pub id: i64,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub redemption_link: String,
    pub event_name: String,
    pub checked_in_at: String,
    pub sent_at: DateTime<Utc>,
}

/// Ledger entry prior to insert; `sent_at` is server-assigned here, not
/// taken from the caller.
#[derive(Debug, Clone)]
pub struct NewSentEmail {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub redemption_link: String,
    pub event_name: String,
    pub checked_in_at: String,
    pub sent_at: DateTime<Utc>,
}

impl NewSentEmail {
    pub fn from_delivery(attendee: &Attendee, redemption_link: &str, event_name: &str) -> Self {
        Self {
            email: attendee.email.clone(),
            first_name: attendee.first_name.clone(),
            last_name: attendee.last_name.clone(),
            redemption_link: redemption_link.to_string(),
            event_name: event_name.to_string(),
            checked_in_at: attendee.checked_in_at.clone(),
            sent_at: Utc::now(),
        }
    }
}
