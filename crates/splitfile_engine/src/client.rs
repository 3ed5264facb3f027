use std::sync::mpsc;
use std::time::Duration;

use futures_util::StreamExt;
use reqwest::header::CONTENT_DISPOSITION;

use crate::filename;
use crate::types::{
    EngineEvent, FailureKind, Generation, ReportArtifact, ReportRequest, ServiceError,
    StatusSnapshot, UploadReceipt, UploadRequest,
};

#[derive(Debug, Clone)]
pub struct ClientSettings {
    /// Root of the classification service, without a trailing slash.
    pub base_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
        }
    }
}

pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

pub struct ChannelProgressSink {
    tx: mpsc::Sender<EngineEvent>,
}

impl ChannelProgressSink {
    pub fn new(tx: mpsc::Sender<EngineEvent>) -> Self {
        Self { tx }
    }
}

impl ProgressSink for ChannelProgressSink {
    fn emit(&self, event: EngineEvent) {
        let _ = self.tx.send(event);
    }
}

/// The remote contract the workflow consumes: upload, poll, export.
#[async_trait::async_trait]
pub trait ServiceClient: Send + Sync {
    async fn upload_file(&self, request: &UploadRequest) -> Result<UploadReceipt, ServiceError>;

    async fn processing_status(&self, processing_id: &str)
        -> Result<StatusSnapshot, ServiceError>;

    async fn generate_report(
        &self,
        generation: Generation,
        request: &ReportRequest,
        sink: &dyn ProgressSink,
    ) -> Result<ReportArtifact, ServiceError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestServiceClient {
    settings: ClientSettings,
}

impl ReqwestServiceClient {
    pub fn new(settings: ClientSettings) -> Self {
        Self { settings }
    }

    fn build_client(&self) -> Result<reqwest::Client, ServiceError> {
        reqwest::Client::builder()
            .connect_timeout(self.settings.connect_timeout)
            .timeout(self.settings.request_timeout)
            .build()
            .map_err(|err| ServiceError::new(FailureKind::Network, err.to_string()))
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.settings.base_url.trim_end_matches('/'), path)
    }
}

#[async_trait::async_trait]
impl ServiceClient for ReqwestServiceClient {
    async fn upload_file(&self, request: &UploadRequest) -> Result<UploadReceipt, ServiceError> {
        let client = self.build_client()?;
        let part = reqwest::multipart::Part::bytes(request.bytes.clone())
            .file_name(request.file_name.clone());
        let form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("payment_mode", request.payment_mode.clone())
            .text("area", request.area.clone());

        let response = client
            .post(self.endpoint("api/upload-file"))
            .multipart(form)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ServiceError::new(
                FailureKind::HttpStatus(status.as_u16()),
                "Failed to upload file",
            ));
        }

        response
            .json::<UploadReceipt>()
            .await
            .map_err(|err| ServiceError::new(FailureKind::InvalidResponse, err.to_string()))
    }

    async fn processing_status(
        &self,
        processing_id: &str,
    ) -> Result<StatusSnapshot, ServiceError> {
        let client = self.build_client()?;
        let response = client
            .get(self.endpoint(&format!("api/processing-status/{processing_id}")))
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ServiceError::new(
                FailureKind::HttpStatus(status.as_u16()),
                "Failed to get processing status",
            ));
        }

        response
            .json::<StatusSnapshot>()
            .await
            .map_err(|err| ServiceError::new(FailureKind::InvalidResponse, err.to_string()))
    }

    async fn generate_report(
        &self,
        generation: Generation,
        request: &ReportRequest,
        sink: &dyn ProgressSink,
    ) -> Result<ReportArtifact, ServiceError> {
        let client = self.build_client()?;
        let response = client
            .post(self.endpoint("api/generate-report"))
            .json(request)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ServiceError::new(
                FailureKind::HttpStatus(status.as_u16()),
                "Failed to generate report",
            ));
        }

        let filename_hint = response
            .headers()
            .get(CONTENT_DISPOSITION)
            .and_then(|value| value.to_str().ok())
            .and_then(filename::from_content_disposition);
        let content_length = response.content_length();

        sink.emit(EngineEvent::ReportProgress {
            generation,
            percent: 0,
        });

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            bytes.extend_from_slice(&chunk);
            // The transport has no real per-chunk progress source; without a
            // content length the bar stays at zero until completion.
            let percent = match content_length {
                Some(0) | None => 0,
                Some(total) => ((bytes.len() as u64 * 100) / total).min(100) as u8,
            };
            sink.emit(EngineEvent::ReportProgress {
                generation,
                percent,
            });
        }

        Ok(ReportArtifact {
            bytes,
            filename_hint,
        })
    }
}

fn map_reqwest_error(err: reqwest::Error) -> ServiceError {
    if err.is_timeout() {
        return ServiceError::new(FailureKind::Timeout, err.to_string());
    }
    ServiceError::new(FailureKind::Network, err.to_string())
}
