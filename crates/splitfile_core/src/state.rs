use std::fmt;

use rust_decimal::Decimal;

use crate::effect::ReportRequest;
use crate::normalize;
use crate::search::{FilterCache, SearchState};
use crate::view_model::{format_peso, AppViewModel, LineRowView};

/// Monotonic session counter. Every engine-originated message carries the
/// generation that issued it; anything stale is discarded.
pub type Generation = u64;

pub(crate) const MSG_SELECT_PAYMENT_MODE: &str = "Please select a payment mode first";
pub(crate) const MSG_SELECT_AREA: &str = "Please select an area first";
pub(crate) const MSG_PROCESSING_FALLBACK: &str = "Error processing file";
pub(crate) const MSG_NO_REPORT_DATA: &str = "No data available for report generation";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentMode {
    Bdo,
    Cebuana,
    Chinabank,
    Ecpay,
    Metrobank,
    Unionbank,
    Sm,
    Pnb,
    Cis,
}

impl PaymentMode {
    pub const ALL: [PaymentMode; 9] = [
        PaymentMode::Bdo,
        PaymentMode::Cebuana,
        PaymentMode::Chinabank,
        PaymentMode::Ecpay,
        PaymentMode::Metrobank,
        PaymentMode::Unionbank,
        PaymentMode::Sm,
        PaymentMode::Pnb,
        PaymentMode::Cis,
    ];

    /// Wire value expected by the classification service.
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMode::Bdo => "BDO",
            PaymentMode::Cebuana => "CEBUANA",
            PaymentMode::Chinabank => "CHINABANK",
            PaymentMode::Ecpay => "ECPAY",
            PaymentMode::Metrobank => "METROBANK",
            PaymentMode::Unionbank => "UNIONBANK",
            PaymentMode::Sm => "SM",
            PaymentMode::Pnb => "PNB",
            PaymentMode::Cis => "CIS",
        }
    }
}

impl fmt::Display for PaymentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Area {
    Epr,
    Pic,
    Pwic,
    Primewater,
}

impl Area {
    pub const ALL: [Area; 4] = [Area::Epr, Area::Pic, Area::Pwic, Area::Primewater];

    /// Wire value expected by the classification service.
    pub fn as_str(&self) -> &'static str {
        match self {
            Area::Epr => "EPR",
            Area::Pic => "PIC",
            Area::Pwic => "PWIC",
            Area::Primewater => "PRIMEWATER",
        }
    }
}

impl fmt::Display for Area {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Observable workflow phase. `Error` and `Completed` are terminal for a
/// session; only a new file selection leaves them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionPhase {
    #[default]
    Idle,
    Uploading,
    Processing,
    Completed,
    Error,
}

/// Authoritative totals reported by the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub total_amount: Decimal,
    pub total_transactions: u64,
}

/// Everything a completed session holds. Assembled atomically on the
/// terminal "completed" poll and immutable until the next session begins.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedResult {
    /// Service-defined structured payload, kept opaque.
    pub structured_data: serde_json::Value,
    pub summary: Summary,
    pub raw_lines: Vec<String>,
    pub separator: String,
}

/// Tunables for the pure workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CoreConfig {
    /// Upper bound on status polls per session. `None` polls until the
    /// service reports a terminal status, matching the original behaviour.
    pub max_poll_attempts: Option<u32>,
}

/// Stage of the one live session. Payload-carrying variants keep the
/// processing id and result representable only in the stages that own them.
#[derive(Debug, Clone, PartialEq)]
enum SessionStage {
    Uploading,
    Processing {
        processing_id: String,
    },
    Completed {
        result: ProcessedResult,
        /// Client-side re-aggregation of the raw lines, for display
        /// cross-checking only.
        crosscheck_total: Decimal,
    },
    Failed {
        message: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
struct UploadSession {
    generation: Generation,
    file_name: String,
    payment_mode: PaymentMode,
    area: Area,
    stage: SessionStage,
    /// Status requests issued so far, checked against the configured bound.
    polls: u32,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppState {
    config: CoreConfig,
    payment_mode: Option<PaymentMode>,
    area: Option<Area>,
    generations: Generation,
    session: Option<UploadSession>,
    /// Validation/export message shown outside a session failure.
    notice: Option<String>,
    search: SearchState,
    filter: FilterCache,
    report: ReportState,
    dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
enum ReportState {
    #[default]
    Idle,
    Generating {
        progress: u8,
    },
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: CoreConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    // ── Selection ────────────────────────────────────────────────────────

    pub(crate) fn set_payment_mode(&mut self, mode: PaymentMode) {
        self.payment_mode = Some(mode);
        self.mark_dirty();
    }

    pub(crate) fn set_area(&mut self, area: Area) {
        self.area = Some(area);
        self.mark_dirty();
    }

    pub(crate) fn selection(&self) -> Option<(PaymentMode, Area)> {
        Some((self.payment_mode?, self.area?))
    }

    pub(crate) fn has_payment_mode(&self) -> bool {
        self.payment_mode.is_some()
    }

    // ── Session lifecycle ────────────────────────────────────────────────

    /// Discard any prior session and open a fresh one in `Uploading`.
    /// Returns the new generation; the caller tags the upload effect with it.
    pub(crate) fn begin_session(
        &mut self,
        file_name: String,
        payment_mode: PaymentMode,
        area: Area,
    ) -> Generation {
        self.generations += 1;
        self.session = Some(UploadSession {
            generation: self.generations,
            file_name,
            payment_mode,
            area,
            stage: SessionStage::Uploading,
            polls: 0,
        });
        self.notice = None;
        self.search = SearchState::default();
        self.filter.clear();
        self.report = ReportState::Idle;
        self.mark_dirty();
        self.generations
    }

    pub(crate) fn is_current(&self, generation: Generation) -> bool {
        self.session
            .as_ref()
            .is_some_and(|session| session.generation == generation)
    }

    pub(crate) fn enter_processing(&mut self, processing_id: String) {
        if let Some(session) = &mut self.session {
            if session.stage == SessionStage::Uploading {
                session.stage = SessionStage::Processing { processing_id };
                session.polls = 1;
                self.mark_dirty();
            }
        }
    }

    /// Account for one more status poll. Returns the target of the next
    /// request, or `None` when the configured bound is exhausted (in which
    /// case the session has been failed with a timeout message).
    pub(crate) fn next_poll(&mut self) -> Option<(Generation, String)> {
        let max_poll_attempts = self.config.max_poll_attempts;
        let session = self.session.as_mut()?;
        let SessionStage::Processing { processing_id } = &session.stage else {
            return None;
        };
        let processing_id = processing_id.clone();
        if let Some(max) = max_poll_attempts {
            if session.polls >= max {
                let message = format!("Processing status polling exceeded {max} attempts");
                session.stage = SessionStage::Failed { message };
                self.mark_dirty();
                return None;
            }
        }
        session.polls += 1;
        let generation = session.generation;
        self.mark_dirty();
        Some((generation, processing_id))
    }

    pub(crate) fn complete_session(&mut self, result: ProcessedResult) {
        if let Some(session) = &mut self.session {
            if matches!(session.stage, SessionStage::Processing { .. }) {
                let crosscheck_total = normalize::aggregate_amounts(&result.raw_lines);
                session.stage = SessionStage::Completed {
                    result,
                    crosscheck_total,
                };
                self.refresh_filter();
                self.mark_dirty();
            }
        }
    }

    pub(crate) fn fail_session(&mut self, message: String) {
        if let Some(session) = &mut self.session {
            session.stage = SessionStage::Failed { message };
            self.notice = None;
            self.mark_dirty();
        }
    }

    pub fn phase(&self) -> SessionPhase {
        match self.session.as_ref().map(|session| &session.stage) {
            None => SessionPhase::Idle,
            Some(SessionStage::Uploading) => SessionPhase::Uploading,
            Some(SessionStage::Processing { .. }) => SessionPhase::Processing,
            Some(SessionStage::Completed { .. }) => SessionPhase::Completed,
            Some(SessionStage::Failed { .. }) => SessionPhase::Error,
        }
    }

    /// Processed data, visible only once the session completed.
    pub fn result(&self) -> Option<&ProcessedResult> {
        match self.session.as_ref().map(|session| &session.stage) {
            Some(SessionStage::Completed { result, .. }) => Some(result),
            _ => None,
        }
    }

    // ── Notices ──────────────────────────────────────────────────────────

    pub(crate) fn set_notice(&mut self, message: &str) {
        self.notice = Some(message.to_string());
        self.mark_dirty();
    }

    // ── Search ───────────────────────────────────────────────────────────

    /// Record a keystroke and arm a fresh debounce timer, superseding any
    /// pending one.
    pub(crate) fn begin_search_edit(&mut self, text: String) -> u64 {
        self.search.query_raw = text;
        self.search.is_searching = true;
        self.search.timer_seq += 1;
        self.mark_dirty();
        self.search.timer_seq
    }

    /// Apply a fired debounce timer; stale sequence numbers are discarded.
    pub(crate) fn apply_debounce(&mut self, seq: u64) {
        if seq != self.search.timer_seq || !self.search.is_searching {
            return;
        }
        self.search.query_debounced = self.search.query_raw.clone();
        self.search.is_searching = false;
        self.refresh_filter();
        self.mark_dirty();
    }

    /// Reset the search box synchronously; no debounce wait on clear.
    pub(crate) fn clear_search(&mut self) {
        self.search.query_raw.clear();
        self.search.query_debounced.clear();
        self.search.is_searching = false;
        self.search.timer_seq += 1;
        self.refresh_filter();
        self.mark_dirty();
    }

    fn refresh_filter(&mut self) {
        match self.session.as_ref().map(|session| (&session.stage, session.generation)) {
            Some((SessionStage::Completed { result, .. }, generation)) => {
                self.filter
                    .refresh(generation, &self.search.query_debounced, &result.raw_lines);
            }
            _ => self.filter.clear(),
        }
    }

    /// How many times the filtered view was actually recomputed. Unrelated
    /// messages must not move this counter.
    pub fn filter_recomputes(&self) -> u64 {
        self.filter.recomputes()
    }

    // ── Report generation ────────────────────────────────────────────────

    pub(crate) fn report_in_progress(&self) -> bool {
        matches!(self.report, ReportState::Generating { .. })
    }

    /// Build the export payload from the completed session and enter the
    /// generating state. `None` when there is no completed data.
    pub(crate) fn start_report(&mut self) -> Option<(Generation, ReportRequest)> {
        let session = self.session.as_ref()?;
        let SessionStage::Completed { result, .. } = &session.stage else {
            return None;
        };
        let request = ReportRequest {
            processed_data: result.structured_data.clone(),
            raw_lines: result.raw_lines.clone(),
            separator: result.separator.clone(),
            original_filename: filename_stem(&session.file_name).to_string(),
            area: session.area,
        };
        let generation = session.generation;
        self.report = ReportState::Generating { progress: 0 };
        self.notice = None;
        self.mark_dirty();
        Some((generation, request))
    }

    pub(crate) fn set_report_progress(&mut self, percent: u8) {
        if let ReportState::Generating { progress } = &mut self.report {
            *progress = percent.min(100);
            self.mark_dirty();
        }
    }

    /// Leave the generating state; progress resets on success and failure
    /// alike, and the completed result is never touched.
    pub(crate) fn finish_report(&mut self, error: Option<String>) {
        self.report = ReportState::Idle;
        if let Some(message) = error {
            self.notice = Some(message);
        }
        self.mark_dirty();
    }

    // ── View ─────────────────────────────────────────────────────────────

    pub fn view(&self) -> AppViewModel {
        let session = self.session.as_ref();
        let completed = match session.map(|s| &s.stage) {
            Some(SessionStage::Completed {
                result,
                crosscheck_total,
            }) => Some((result, *crosscheck_total)),
            _ => None,
        };

        let rows: Vec<LineRowView> = completed
            .map(|(result, _)| {
                self.filter
                    .matches()
                    .iter()
                    .filter_map(|&index| result.raw_lines.get(index))
                    .map(|line| LineRowView {
                        original: line.clone(),
                        cleaned: normalize::clean_line(line),
                    })
                    .collect()
            })
            .unwrap_or_default();

        let error = self
            .notice
            .clone()
            .or_else(|| match session.map(|s| &s.stage) {
                Some(SessionStage::Failed { message }) => Some(message.clone()),
                _ => None,
            });

        AppViewModel {
            phase: self.phase(),
            payment_mode: self.payment_mode,
            area: self.area,
            file_name: session.map(|s| s.file_name.clone()),
            error,
            query: self.search.query_raw.clone(),
            is_searching: self.search.is_searching,
            match_count: rows.len(),
            rows,
            total_transactions: completed
                .map(|(result, _)| result.summary.total_transactions)
                .unwrap_or(0),
            total_amount: completed.map(|(result, _)| format_peso(result.summary.total_amount)),
            crosscheck_total: completed.map(|(_, crosscheck)| format_peso(crosscheck)),
            can_generate_report: completed.is_some() && !self.report_in_progress(),
            generating_report: self.report_in_progress(),
            report_progress: match self.report {
                ReportState::Generating { progress } => progress,
                ReportState::Idle => 0,
            },
            dirty: self.dirty,
        }
    }

    fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// True when the state changed since the last call; hosts use this to
    /// coalesce redraws.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }
}

/// File name up to the last `.`; names without an extension pass through.
fn filename_stem(name: &str) -> &str {
    match name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => name,
    }
}
