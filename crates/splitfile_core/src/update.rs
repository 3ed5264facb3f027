use crate::effect::{Effect, UploadRequest, POLL_INTERVAL_MS, SEARCH_DEBOUNCE_MS};
use crate::msg::{Msg, PollOutcome, ReportOutcome, UploadOutcome};
use crate::state::{
    AppState, MSG_NO_REPORT_DATA, MSG_PROCESSING_FALLBACK, MSG_SELECT_AREA,
    MSG_SELECT_PAYMENT_MODE,
};

/// Pure update function: applies a message to state and returns any effects.
///
/// Every engine-originated message carries the generation of the session
/// that issued the request; messages from superseded sessions are dropped
/// here, so a stale poll or export can never leak into the live session.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::PaymentModeSelected(mode) => {
            state.set_payment_mode(mode);
            Vec::new()
        }
        Msg::AreaSelected(area) => {
            state.set_area(area);
            Vec::new()
        }
        Msg::FileSelected { name, bytes } => {
            // Guard, not a state: a missing selection blocks the upload
            // without ever leaving Idle (or the prior terminal phase).
            let Some((payment_mode, area)) = state.selection() else {
                let message = if state.has_payment_mode() {
                    MSG_SELECT_AREA
                } else {
                    MSG_SELECT_PAYMENT_MODE
                };
                state.set_notice(message);
                return (state, Vec::new());
            };
            let generation = state.begin_session(name.clone(), payment_mode, area);
            vec![Effect::StartUpload {
                generation,
                request: UploadRequest {
                    file_name: name,
                    bytes,
                    payment_mode,
                    area,
                },
            }]
        }
        Msg::UploadFinished {
            generation,
            outcome,
        } => {
            if !state.is_current(generation) {
                return (state, Vec::new());
            }
            match outcome {
                UploadOutcome::Accepted { processing_id } => {
                    state.enter_processing(processing_id.clone());
                    // The original polls once immediately after the upload
                    // is accepted.
                    vec![Effect::RequestStatus {
                        generation,
                        processing_id,
                        delay_ms: 0,
                    }]
                }
                UploadOutcome::Failed { message } => {
                    state.fail_session(message);
                    Vec::new()
                }
            }
        }
        Msg::StatusReturned {
            generation,
            outcome,
        } => {
            if !state.is_current(generation) {
                return (state, Vec::new());
            }
            match outcome {
                PollOutcome::Pending => match state.next_poll() {
                    // Strictly sequential: exactly one follow-up poll, and
                    // only now that the previous one has resolved.
                    Some((generation, processing_id)) => vec![Effect::RequestStatus {
                        generation,
                        processing_id,
                        delay_ms: POLL_INTERVAL_MS,
                    }],
                    None => Vec::new(),
                },
                PollOutcome::Completed(result) => {
                    state.complete_session(result);
                    Vec::new()
                }
                PollOutcome::ServiceError { message } => {
                    state.fail_session(
                        message.unwrap_or_else(|| MSG_PROCESSING_FALLBACK.to_string()),
                    );
                    Vec::new()
                }
                PollOutcome::TransportFailed { message } => {
                    state.fail_session(message);
                    Vec::new()
                }
            }
        }
        Msg::SearchEdited(text) => {
            let seq = state.begin_search_edit(text);
            vec![Effect::ScheduleDebounce {
                seq,
                delay_ms: SEARCH_DEBOUNCE_MS,
            }]
        }
        Msg::SearchDebounceFired { seq } => {
            state.apply_debounce(seq);
            Vec::new()
        }
        Msg::SearchCleared => {
            state.clear_search();
            Vec::new()
        }
        Msg::GenerateReportClicked => {
            if state.report_in_progress() {
                Vec::new()
            } else {
                match state.start_report() {
                    Some((generation, request)) => vec![Effect::StartReport {
                        generation,
                        request,
                    }],
                    None => {
                        state.set_notice(MSG_NO_REPORT_DATA);
                        Vec::new()
                    }
                }
            }
        }
        Msg::ReportProgress {
            generation,
            percent,
        } => {
            if state.is_current(generation) {
                state.set_report_progress(percent);
            }
            Vec::new()
        }
        Msg::ReportFinished {
            generation,
            outcome,
        } => {
            if !state.is_current(generation) {
                return (state, Vec::new());
            }
            match outcome {
                ReportOutcome::Saved { .. } => state.finish_report(None),
                ReportOutcome::Failed { message } => state.finish_report(Some(message)),
            }
            Vec::new()
        }
        Msg::NoOp => Vec::new(),
    };

    (state, effects)
}
