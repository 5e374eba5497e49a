use serde::Deserialize;

use crate::domain::models::attendee::AttendeeUploadRow;

#[derive(Deserialize)]
pub struct UploadCsvRequest {
    pub csv_data: Vec<AttendeeUploadRow>,
}

#[derive(Deserialize)]
pub struct AssignCodesRequest {
    pub codes: Vec<String>,
}

#[derive(Deserialize, Default)]
pub struct SendEmailsRequest {
    pub event_name: Option<String>,
}
