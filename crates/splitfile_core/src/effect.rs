use crate::state::{Area, Generation, PaymentMode};

/// Fixed delay between successive processing-status polls.
pub const POLL_INTERVAL_MS: u64 = 1_000;

/// Quiet window before an edited search query takes effect.
pub const SEARCH_DEBOUNCE_MS: u64 = 300;

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Issue the multipart upload request for a fresh session.
    StartUpload {
        generation: Generation,
        request: UploadRequest,
    },
    /// Issue one processing-status request after `delay_ms`.
    RequestStatus {
        generation: Generation,
        processing_id: String,
        delay_ms: u64,
    },
    /// Arm a debounce timer for the search box.
    ScheduleDebounce { seq: u64, delay_ms: u64 },
    /// Issue the report-generation request and persist the artifact.
    StartReport {
        generation: Generation,
        request: ReportRequest,
    },
}

/// Payload for the upload request: file content plus the classification
/// selection snapshotted for the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRequest {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub payment_mode: PaymentMode,
    pub area: Area,
}

/// Payload re-submitted to the export endpoint. Built entirely from the
/// completed session; export never re-uploads the source file.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportRequest {
    pub processed_data: serde_json::Value,
    pub raw_lines: Vec<String>,
    pub separator: String,
    /// Original file name without its extension.
    pub original_filename: String,
    pub area: Area,
}
