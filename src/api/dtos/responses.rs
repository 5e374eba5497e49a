use serde::Serialize;

#[derive(Serialize)]
pub struct UploadResponse {
    pub count: u64,
}

#[derive(Serialize)]
pub struct AssignResponse {
    pub assigned: usize,
}

#[derive(Serialize)]
pub struct DeletedResponse {
    pub deleted_count: u64,
}

/// Checked-in attendee as shown in the operator's assignment preview.
#[derive(Serialize)]
pub struct AssignmentPreviewRow {
    pub id: i64,
    pub first_name: String,
    pub email: String,
    pub assigned_code: String,
}
