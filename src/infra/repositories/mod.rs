pub mod sqlite_attendee_repo;
pub mod sqlite_sent_email_repo;
