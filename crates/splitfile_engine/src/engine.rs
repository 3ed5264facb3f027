use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use engine_logging::{engine_debug, engine_info, engine_warn};

use crate::client::{ChannelProgressSink, ClientSettings, ProgressSink, ReqwestServiceClient, ServiceClient};
use crate::download::ArtifactWriter;
use crate::filename;
use crate::types::{
    EngineEvent, FailureKind, Generation, ReportRequest, SavedReport, ServiceError, UploadRequest,
};

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub client: ClientSettings,
    /// Where saved report artifacts land.
    pub download_dir: PathBuf,
}

impl EngineConfig {
    pub fn default_with_download(download_dir: PathBuf) -> Self {
        Self {
            client: ClientSettings::default(),
            download_dir,
        }
    }
}

enum EngineCommand {
    Upload {
        generation: Generation,
        request: UploadRequest,
    },
    PollStatus {
        generation: Generation,
        processing_id: String,
        delay: Duration,
    },
    GenerateReport {
        generation: Generation,
        request: ReportRequest,
    },
    Debounce {
        seq: u64,
        delay: Duration,
    },
}

/// Command side of the engine. Events stream out of the receiver returned
/// by [`EngineHandle::new`].
#[derive(Clone)]
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    current_generation: Arc<AtomicU64>,
}

impl EngineHandle {
    /// Spawn the engine thread with its own tokio runtime.
    pub fn new(config: EngineConfig) -> (Self, mpsc::Receiver<EngineEvent>) {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let current_generation = Arc::new(AtomicU64::new(0));
        let client = Arc::new(ReqwestServiceClient::new(config.client.clone()));
        let writer = Arc::new(ArtifactWriter::new(config.download_dir.clone()));
        let generation_watch = current_generation.clone();

        thread::spawn(move || {
            let runtime = tokio::runtime::Runtime::new().expect("tokio runtime");
            while let Ok(command) = cmd_rx.recv() {
                let client = client.clone();
                let writer = writer.clone();
                let event_tx = event_tx.clone();
                let generation_watch = generation_watch.clone();
                runtime.spawn(async move {
                    handle_command(
                        client.as_ref(),
                        writer.as_ref(),
                        &generation_watch,
                        command,
                        event_tx,
                    )
                    .await;
                });
            }
        });

        (
            Self {
                cmd_tx,
                current_generation,
            },
            event_rx,
        )
    }

    /// Begin a fresh session upload. Advancing the shared generation first
    /// makes every outstanding poll loop of older sessions drop dead before
    /// its next request.
    pub fn upload(&self, generation: Generation, request: UploadRequest) {
        self.current_generation.store(generation, Ordering::SeqCst);
        let _ = self.cmd_tx.send(EngineCommand::Upload {
            generation,
            request,
        });
    }

    /// Issue one processing-status request after `delay`.
    pub fn poll_status(
        &self,
        generation: Generation,
        processing_id: impl Into<String>,
        delay: Duration,
    ) {
        let _ = self.cmd_tx.send(EngineCommand::PollStatus {
            generation,
            processing_id: processing_id.into(),
            delay,
        });
    }

    pub fn generate_report(&self, generation: Generation, request: ReportRequest) {
        let _ = self.cmd_tx.send(EngineCommand::GenerateReport {
            generation,
            request,
        });
    }

    /// Arm a debounce timer; the workflow discards fired timers whose
    /// sequence number has been superseded.
    pub fn schedule_debounce(&self, seq: u64, delay: Duration) {
        let _ = self.cmd_tx.send(EngineCommand::Debounce { seq, delay });
    }
}

async fn handle_command(
    client: &dyn ServiceClient,
    writer: &ArtifactWriter,
    current_generation: &AtomicU64,
    command: EngineCommand,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    match command {
        EngineCommand::Upload {
            generation,
            request,
        } => {
            engine_info!(
                "upload generation={} file={} bytes={}",
                generation,
                request.file_name,
                request.bytes.len()
            );
            let result = client.upload_file(&request).await;
            let _ = event_tx.send(EngineEvent::UploadFinished { generation, result });
        }
        EngineCommand::PollStatus {
            generation,
            processing_id,
            delay,
        } => {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            // A superseded session's loop ends here without touching the
            // network; the workflow would discard its response anyway.
            if current_generation.load(Ordering::SeqCst) != generation {
                engine_debug!("dropping superseded poll generation={}", generation);
                return;
            }
            let result = client.processing_status(&processing_id).await;
            let _ = event_tx.send(EngineEvent::StatusReturned { generation, result });
        }
        EngineCommand::GenerateReport {
            generation,
            request,
        } => {
            let sink = ChannelProgressSink::new(event_tx.clone());
            let result =
                fetch_and_persist_report(client, writer, generation, &request, &sink).await;
            if let Err(error) = &result {
                engine_warn!("report generation={} failed: {}", generation, error.kind);
            }
            let _ = event_tx.send(EngineEvent::ReportFinished { generation, result });
        }
        EngineCommand::Debounce { seq, delay } => {
            tokio::time::sleep(delay).await;
            let _ = event_tx.send(EngineEvent::DebounceFired { seq });
        }
    }
}

async fn fetch_and_persist_report(
    client: &dyn ServiceClient,
    writer: &ArtifactWriter,
    generation: Generation,
    request: &ReportRequest,
    sink: &dyn ProgressSink,
) -> Result<SavedReport, ServiceError> {
    let artifact = client.generate_report(generation, request, sink).await?;
    let filename = filename::resolve_report_filename(
        artifact.filename_hint.as_deref(),
        &request.original_filename,
        &request.area,
    );
    let path = writer
        .write(&filename, &artifact.bytes)
        .map_err(|err| ServiceError::new(FailureKind::Io, err.to_string()))?;
    engine_info!("report saved generation={} path={:?}", generation, path);
    Ok(SavedReport { filename, path })
}
