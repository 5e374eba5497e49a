pub mod attendee;
pub mod dispatch;
pub mod health;
pub mod sent_email;
pub mod stats;
