use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use engine_logging::{engine_info, engine_warn};
use splitfile_core::{
    update, AppState, AppViewModel, Effect, Msg, PollOutcome, ProcessedResult, ReportOutcome,
    Summary, UploadOutcome,
};
use splitfile_engine::{EngineConfig, EngineEvent, EngineHandle, StatusSnapshot, SummarySnapshot};

/// Executes core effects against the engine and pumps engine events back to
/// the workflow as messages.
pub struct EffectRunner {
    engine: EngineHandle,
}

impl EffectRunner {
    pub fn new(config: EngineConfig, msg_tx: mpsc::Sender<Msg>) -> Self {
        let (engine, event_rx) = EngineHandle::new(config);
        spawn_event_loop(event_rx, msg_tx);
        Self { engine }
    }

    pub fn run(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::StartUpload {
                    generation,
                    request,
                } => {
                    engine_info!(
                        "StartUpload generation={} file={}",
                        generation,
                        request.file_name
                    );
                    self.engine.upload(
                        generation,
                        splitfile_engine::UploadRequest {
                            file_name: request.file_name,
                            bytes: request.bytes,
                            payment_mode: request.payment_mode.as_str().to_string(),
                            area: request.area.as_str().to_string(),
                        },
                    );
                }
                Effect::RequestStatus {
                    generation,
                    processing_id,
                    delay_ms,
                } => {
                    self.engine.poll_status(
                        generation,
                        processing_id,
                        Duration::from_millis(delay_ms),
                    );
                }
                Effect::ScheduleDebounce { seq, delay_ms } => {
                    self.engine
                        .schedule_debounce(seq, Duration::from_millis(delay_ms));
                }
                Effect::StartReport {
                    generation,
                    request,
                } => {
                    engine_info!("StartReport generation={}", generation);
                    self.engine.generate_report(
                        generation,
                        splitfile_engine::ReportRequest {
                            processed_data: request.processed_data,
                            raw_contents: request.raw_lines,
                            separator: request.separator,
                            original_filename: request.original_filename,
                            area: request.area.as_str().to_string(),
                        },
                    );
                }
            }
        }
    }
}

fn spawn_event_loop(event_rx: mpsc::Receiver<EngineEvent>, msg_tx: mpsc::Sender<Msg>) {
    thread::spawn(move || {
        while let Ok(event) = event_rx.recv() {
            if msg_tx.send(map_event(event)).is_err() {
                break;
            }
        }
    });
}

/// Translate engine events into workflow messages.
fn map_event(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::UploadFinished { generation, result } => Msg::UploadFinished {
            generation,
            outcome: match result {
                Ok(receipt) => UploadOutcome::Accepted {
                    processing_id: receipt.processing_id,
                },
                Err(error) => UploadOutcome::Failed {
                    message: error.message,
                },
            },
        },
        EngineEvent::StatusReturned { generation, result } => Msg::StatusReturned {
            generation,
            outcome: match result {
                Ok(snapshot) => map_snapshot(snapshot),
                Err(error) => PollOutcome::TransportFailed {
                    message: error.message,
                },
            },
        },
        EngineEvent::ReportProgress {
            generation,
            percent,
        } => Msg::ReportProgress {
            generation,
            percent,
        },
        EngineEvent::ReportFinished { generation, result } => Msg::ReportFinished {
            generation,
            outcome: match result {
                Ok(saved) => ReportOutcome::Saved {
                    filename: saved.filename,
                },
                Err(error) => ReportOutcome::Failed {
                    message: error.message,
                },
            },
        },
        EngineEvent::DebounceFired { seq } => Msg::SearchDebounceFired { seq },
    }
}

fn map_snapshot(snapshot: StatusSnapshot) -> PollOutcome {
    match snapshot.status.as_str() {
        "completed" => match build_result(snapshot) {
            Some(result) => PollOutcome::Completed(result),
            None => {
                engine_warn!("completed status with incomplete payload");
                PollOutcome::TransportFailed {
                    message: "Malformed processing-status response".to_string(),
                }
            }
        },
        "error" => PollOutcome::ServiceError {
            message: snapshot.error,
        },
        // Anything else counts as still processing.
        _ => PollOutcome::Pending,
    }
}

fn build_result(snapshot: StatusSnapshot) -> Option<ProcessedResult> {
    let SummarySnapshot {
        total_amount,
        total_transactions,
    } = snapshot.summary?;
    Some(ProcessedResult {
        structured_data: snapshot.processed_data.unwrap_or(serde_json::Value::Null),
        summary: Summary {
            total_amount,
            total_transactions,
        },
        raw_lines: snapshot.raw_contents?,
        separator: snapshot.separator.unwrap_or_default(),
    })
}

/// Couples the pure state machine with the effect runner: dispatch user
/// messages, pump engine replies, read the view.
pub struct WorkflowSession {
    state: AppState,
    runner: EffectRunner,
    msg_rx: mpsc::Receiver<Msg>,
}

impl WorkflowSession {
    pub fn new(config: EngineConfig) -> Self {
        Self::with_state(AppState::new(), config)
    }

    pub fn with_state(state: AppState, config: EngineConfig) -> Self {
        let (msg_tx, msg_rx) = mpsc::channel();
        let runner = EffectRunner::new(config, msg_tx);
        Self {
            state,
            runner,
            msg_rx,
        }
    }

    /// Apply one message and execute the effects it produced.
    pub fn dispatch(&mut self, msg: Msg) {
        let state = std::mem::take(&mut self.state);
        let (state, effects) = update(state, msg);
        self.state = state;
        self.runner.run(effects);
    }

    /// Drain engine messages until `done` holds or `timeout` passes.
    /// Returns whether the predicate was satisfied.
    pub fn pump_until(
        &mut self,
        timeout: Duration,
        mut done: impl FnMut(&AppState) -> bool,
    ) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            if done(&self.state) {
                return true;
            }
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            match self.msg_rx.recv_timeout(deadline - now) {
                Ok(msg) => self.dispatch(msg),
                Err(_) => return done(&self.state),
            }
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn view(&self) -> AppViewModel {
        self.state.view()
    }
}
