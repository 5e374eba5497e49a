pub mod attendee;
pub mod sent_email;
