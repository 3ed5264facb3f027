use crate::state::Generation;

/// Live search-box state. `query_debounced` lags `query_raw` by the debounce
/// window; `timer_seq` identifies the newest armed timer so stale ones are
/// discarded on arrival.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub(crate) struct SearchState {
    pub query_raw: String,
    pub query_debounced: String,
    pub is_searching: bool,
    pub timer_seq: u64,
}

/// Memo of the filtered view, keyed on the session generation and the
/// debounced query. Raw lines are immutable within a session, so the pair
/// fully identifies the result.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub(crate) struct FilterCache {
    key: Option<(Generation, String)>,
    matches: Vec<usize>,
    recomputes: u64,
}

impl FilterCache {
    pub fn clear(&mut self) {
        self.key = None;
        self.matches.clear();
    }

    /// Recompute the match set unless the cache key already covers the
    /// current inputs. Matching is a case-insensitive substring test; an
    /// empty query keeps every line. Indices stay in original order.
    pub fn refresh(&mut self, generation: Generation, query: &str, lines: &[String]) {
        if self
            .key
            .as_ref()
            .is_some_and(|(cached_generation, cached_query)| {
                *cached_generation == generation && cached_query == query
            })
        {
            return;
        }

        self.matches = if query.is_empty() {
            (0..lines.len()).collect()
        } else {
            let needle = query.to_lowercase();
            lines
                .iter()
                .enumerate()
                .filter(|(_, line)| line.to_lowercase().contains(&needle))
                .map(|(index, _)| index)
                .collect()
        };
        self.key = Some((generation, query.to_string()));
        self.recomputes += 1;
    }

    pub fn matches(&self) -> &[usize] {
        &self.matches
    }

    pub fn recomputes(&self) -> u64 {
        self.recomputes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn empty_query_is_identity() {
        let mut cache = FilterCache::default();
        let lines = lines(&["Payment ABC123", "Refund XYZ999"]);
        cache.refresh(1, "", &lines);
        assert_eq!(cache.matches(), &[0, 1]);
    }

    #[test]
    fn substring_match_is_case_insensitive() {
        let mut cache = FilterCache::default();
        let lines = lines(&["Payment ABC123", "Refund XYZ999"]);
        cache.refresh(1, "abc", &lines);
        assert_eq!(cache.matches(), &[0]);
    }

    #[test]
    fn matched_indices_preserve_order() {
        let mut cache = FilterCache::default();
        let lines = lines(&["b ref", "a ref", "c ref", "no match"]);
        cache.refresh(1, "ref", &lines);
        assert_eq!(cache.matches(), &[0, 1, 2]);
    }

    #[test]
    fn unchanged_inputs_do_not_recompute() {
        let mut cache = FilterCache::default();
        let lines = lines(&["Payment ABC123"]);
        cache.refresh(1, "abc", &lines);
        cache.refresh(1, "abc", &lines);
        assert_eq!(cache.recomputes(), 1);

        cache.refresh(2, "abc", &lines);
        assert_eq!(cache.recomputes(), 2);
    }
}
