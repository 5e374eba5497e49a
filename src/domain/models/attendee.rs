use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One row per uploaded CSV record. `checked_in_at` is a free-text timestamp
/// string coming straight from the check-in export; the empty string is the
/// "not checked in" sentinel, not NULL.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Attendee {
    pub id: i64,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub checked_in_at: String,
    pub assigned_code: Option<String>,
    pub email_sent: bool,
    pub created_at: DateTime<Utc>,
}

impl Attendee {
    pub fn is_checked_in(&self) -> bool {
        !self.checked_in_at.is_empty()
    }

    pub fn has_code(&self) -> bool {
        self.assigned_code.is_some()
    }

    /// The single dispatch-eligibility predicate. Selection, stats and the
    /// assignment preview must all derive from this one definition; the SQL
    /// WHERE clause in the repository mirrors it and is held equivalent by
    /// the stats parity integration test.
    pub fn is_eligible(&self) -> bool {
        self.is_checked_in() && self.has_code() && !self.email_sent
    }
}

/// Parsed upload row, before the store assigns an id.
#[derive(Debug, Deserialize, Clone)]
pub struct AttendeeUploadRow {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub checked_in_at: String,
}
