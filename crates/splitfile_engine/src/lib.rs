//! Splitfile engine: service client, effect execution and artifact persistence.
mod client;
mod download;
mod engine;
mod filename;
mod types;

pub use client::{
    ChannelProgressSink, ClientSettings, ProgressSink, ReqwestServiceClient, ServiceClient,
};
pub use download::{ensure_download_dir, ArtifactWriter, PersistError};
pub use engine::{EngineConfig, EngineHandle};
pub use filename::{fallback_report_filename, from_content_disposition, resolve_report_filename};
pub use types::{
    EngineEvent, FailureKind, Generation, ReportArtifact, ReportRequest, SavedReport,
    ServiceError, StatusSnapshot, SummarySnapshot, UploadReceipt, UploadRequest,
};
