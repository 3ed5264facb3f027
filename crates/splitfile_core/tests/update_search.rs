use std::str::FromStr;
use std::sync::Once;

use rust_decimal::Decimal;
use splitfile_core::{
    update, AppState, Area, Effect, Msg, PaymentMode, PollOutcome, ProcessedResult, Summary,
    UploadOutcome, SEARCH_DEBOUNCE_MS,
};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(engine_logging::initialize_for_tests);
}

fn completed_state(raw_lines: &[&str]) -> AppState {
    let (state, _) = update(AppState::new(), Msg::PaymentModeSelected(PaymentMode::Bdo));
    let (state, _) = update(state, Msg::AreaSelected(Area::Epr));
    let (state, _) = update(
        state,
        Msg::FileSelected {
            name: "collections.txt".to_string(),
            bytes: b"data".to_vec(),
        },
    );
    let (state, _) = update(
        state,
        Msg::UploadFinished {
            generation: 1,
            outcome: UploadOutcome::Accepted {
                processing_id: "p1".to_string(),
            },
        },
    );
    let (state, _) = update(
        state,
        Msg::StatusReturned {
            generation: 1,
            outcome: PollOutcome::Completed(ProcessedResult {
                structured_data: serde_json::Value::Null,
                summary: Summary {
                    total_amount: Decimal::from_str("0.00").unwrap(),
                    total_transactions: raw_lines.len() as u64,
                },
                raw_lines: raw_lines.iter().map(|s| s.to_string()).collect(),
                separator: "|".to_string(),
            }),
        },
    );
    state
}

fn originals(state: &AppState) -> Vec<String> {
    state
        .view()
        .rows
        .iter()
        .map(|row| row.original.clone())
        .collect()
}

#[test]
fn empty_query_shows_every_line() {
    init_logging();
    let state = completed_state(&["Payment ABC123", "Refund XYZ999"]);
    assert_eq!(originals(&state), vec!["Payment ABC123", "Refund XYZ999"]);
    assert_eq!(state.view().match_count, 2);
}

#[test]
fn edit_arms_debounce_and_flags_searching() {
    init_logging();
    let state = completed_state(&["Payment ABC123", "Refund XYZ999"]);
    let (state, effects) = update(state, Msg::SearchEdited("abc".to_string()));

    assert!(state.view().is_searching);
    assert_eq!(state.view().query, "abc");
    assert_eq!(
        effects,
        vec![Effect::ScheduleDebounce {
            seq: 1,
            delay_ms: SEARCH_DEBOUNCE_MS,
        }]
    );
    // The filter has not moved yet; the debounced query still lags.
    assert_eq!(state.view().match_count, 2);
}

#[test]
fn fired_timer_applies_case_insensitive_filter() {
    init_logging();
    let state = completed_state(&["Payment ABC123", "Refund XYZ999"]);
    let (state, _) = update(state, Msg::SearchEdited("abc".to_string()));
    let (state, effects) = update(state, Msg::SearchDebounceFired { seq: 1 });

    assert!(effects.is_empty());
    assert!(!state.view().is_searching);
    assert_eq!(originals(&state), vec!["Payment ABC123"]);
}

#[test]
fn rapid_edits_cost_one_recomputation() {
    init_logging();
    let state = completed_state(&["Payment ABC123", "Refund XYZ999"]);
    let baseline = state.filter_recomputes();

    let (state, _) = update(state, Msg::SearchEdited("a".to_string()));
    let (state, _) = update(state, Msg::SearchEdited("ab".to_string()));
    let (state, _) = update(state, Msg::SearchEdited("abc".to_string()));

    // Only the newest timer survives; earlier ones are stale on arrival.
    let (state, _) = update(state, Msg::SearchDebounceFired { seq: 1 });
    assert!(state.view().is_searching);
    let (state, _) = update(state, Msg::SearchDebounceFired { seq: 3 });

    assert!(!state.view().is_searching);
    assert_eq!(state.filter_recomputes() - baseline, 1);
    assert_eq!(originals(&state), vec!["Payment ABC123"]);
}

#[test]
fn filtered_lines_are_an_ordered_subsequence() {
    init_logging();
    let state = completed_state(&["b ref", "a ref", "c ref", "unrelated"]);
    let (state, _) = update(state, Msg::SearchEdited("ref".to_string()));
    let (state, _) = update(state, Msg::SearchDebounceFired { seq: 1 });

    assert_eq!(originals(&state), vec!["b ref", "a ref", "c ref"]);
}

#[test]
fn clear_resets_synchronously_and_kills_pending_timer() {
    init_logging();
    let state = completed_state(&["Payment ABC123", "Refund XYZ999"]);
    let (state, _) = update(state, Msg::SearchEdited("abc".to_string()));
    let (state, _) = update(state, Msg::SearchDebounceFired { seq: 1 });
    let (state, _) = update(state, Msg::SearchEdited("xyz".to_string()));

    // Clear while the "xyz" timer is still pending.
    let (state, effects) = update(state, Msg::SearchCleared);
    assert!(effects.is_empty());
    assert!(!state.view().is_searching);
    assert_eq!(state.view().query, "");
    assert_eq!(state.view().match_count, 2);

    // The superseded timer fires anyway and must change nothing.
    let (state, _) = update(state, Msg::SearchDebounceFired { seq: 2 });
    assert_eq!(state.view().match_count, 2);
    assert_eq!(state.view().query, "");
}
