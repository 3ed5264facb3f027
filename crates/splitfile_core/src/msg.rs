use crate::state::{Area, Generation, PaymentMode, ProcessedResult};

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// User picked a payment mode from the selector.
    PaymentModeSelected(PaymentMode),
    /// User picked a collection area from the selector.
    AreaSelected(Area),
    /// User dropped or browsed a transaction file.
    FileSelected { name: String, bytes: Vec<u8> },
    /// Engine finished the upload request for a session.
    UploadFinished {
        generation: Generation,
        outcome: UploadOutcome,
    },
    /// Engine resolved one processing-status poll for a session.
    StatusReturned {
        generation: Generation,
        outcome: PollOutcome,
    },
    /// User edited the search box (raw, undebounced text).
    SearchEdited(String),
    /// A search debounce timer elapsed.
    SearchDebounceFired { seq: u64 },
    /// User cleared the search box.
    SearchCleared,
    /// User clicked Generate Report.
    GenerateReportClicked,
    /// Engine progress while receiving the report artifact.
    ReportProgress {
        generation: Generation,
        percent: u8,
    },
    /// Engine finished the report request for a session.
    ReportFinished {
        generation: Generation,
        outcome: ReportOutcome,
    },
    /// Fallback for host events with no workflow meaning.
    NoOp,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    /// The service accepted the file and assigned a processing id.
    Accepted { processing_id: String },
    /// Transport failure or non-success status.
    Failed { message: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    /// The service is still working; schedule exactly one more poll.
    Pending,
    /// Terminal success with the full processed payload.
    Completed(ProcessedResult),
    /// The service reported a processing error, possibly with a message.
    ServiceError { message: Option<String> },
    /// The poll request itself failed; the loop terminates.
    TransportFailed { message: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportOutcome {
    /// Artifact received and written under the resolved filename.
    Saved { filename: String },
    /// Transport failure or non-success status; processed data is kept.
    Failed { message: String },
}
