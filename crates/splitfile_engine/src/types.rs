use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Session counter assigned by the workflow; every command and event is
/// tagged with the generation that issued it.
pub type Generation = u64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceError {
    pub kind: FailureKind,
    pub message: String,
}

impl ServiceError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    HttpStatus(u16),
    Timeout,
    Network,
    InvalidResponse,
    Io,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::Network => write!(f, "network error"),
            FailureKind::InvalidResponse => write!(f, "invalid response"),
            FailureKind::Io => write!(f, "io error"),
        }
    }
}

/// Upload payload: file content plus the two classification fields, sent as
/// one multipart request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRequest {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub payment_mode: String,
    pub area: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UploadReceipt {
    pub processing_id: String,
}

/// One processing-status response. Fields beyond `status` only appear on
/// terminal statuses, and even then the service may omit some.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StatusSnapshot {
    pub status: String,
    #[serde(default)]
    pub processed_data: Option<serde_json::Value>,
    #[serde(default)]
    pub summary: Option<SummarySnapshot>,
    #[serde(default)]
    pub raw_contents: Option<Vec<String>>,
    #[serde(default)]
    pub separator: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SummarySnapshot {
    pub total_amount: rust_decimal::Decimal,
    pub total_transactions: u64,
}

/// Export payload, re-submitting already-processed data; the source file is
/// never uploaded again.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRequest {
    pub processed_data: serde_json::Value,
    pub raw_contents: Vec<String>,
    pub separator: String,
    pub original_filename: String,
    pub area: String,
}

/// Binary report artifact with the optional filename carried in the
/// response's disposition metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportArtifact {
    pub bytes: Vec<u8>,
    pub filename_hint: Option<String>,
}

/// Artifact written to the download directory under its resolved name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedReport {
    pub filename: String,
    pub path: PathBuf,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    UploadFinished {
        generation: Generation,
        result: Result<UploadReceipt, ServiceError>,
    },
    StatusReturned {
        generation: Generation,
        result: Result<StatusSnapshot, ServiceError>,
    },
    /// Cosmetic artifact-download progress; the workflow resets it to zero
    /// on completion either way.
    ReportProgress {
        generation: Generation,
        percent: u8,
    },
    ReportFinished {
        generation: Generation,
        result: Result<SavedReport, ServiceError>,
    },
    DebounceFired {
        seq: u64,
    },
}
