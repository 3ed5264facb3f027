//! Splitfile core: pure upload-workflow state machine and content pipeline.
mod effect;
mod msg;
mod normalize;
mod search;
mod state;
mod update;
mod view_model;

pub use effect::{Effect, ReportRequest, UploadRequest, POLL_INTERVAL_MS, SEARCH_DEBOUNCE_MS};
pub use msg::{Msg, PollOutcome, ReportOutcome, UploadOutcome};
pub use normalize::{aggregate_amounts, clean_line, extract_amounts};
pub use state::{
    AppState, Area, CoreConfig, Generation, PaymentMode, ProcessedResult, SessionPhase, Summary,
};
pub use update::update;
pub use view_model::{format_peso, AppViewModel, LineRowView};
