//! Search-as-you-type
//!
//! Every keystroke restarts the task: a blank value clears `query` at once,
//! anything else is held until the input has been quiet for the debounce
//! interval and only then written to the query state. A superseded attempt
//! never touches `query` or `page`.

use super::query::QueryState;
use std::time::{Duration, Instant};

/// Default quiescence interval before a search value is committed
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(250);

/// What an input event did to the query state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchStep {
    /// Blank input, `query` cleared immediately
    Cleared,
    /// Non-blank input waiting for the quiescence interval
    Scheduled { generation: u64, deadline: Instant },
}

#[derive(Debug, Clone)]
struct PendingSearch {
    generation: u64,
    value: String,
    deadline: Instant,
}

/// Restartable debounced search task; at most one attempt is pending
#[derive(Debug, Clone)]
pub struct SearchTask {
    interval: Duration,
    generation: u64,
    pending: Option<PendingSearch>,
}

impl Default for SearchTask {
    fn default() -> Self {
        Self::new(SEARCH_DEBOUNCE)
    }
}

impl SearchTask {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            generation: 0,
            pending: None,
        }
    }

    /// Handle one input event carrying the field's current text
    pub fn perform(&mut self, value: &str, now: Instant, query: &mut QueryState) -> SearchStep {
        self.generation += 1;
        self.pending = None;

        if value.trim().is_empty() {
            let had_query = query.query().is_some();
            // A cleared search is a new result set too
            if had_query && query.page() > 1 {
                query.set_page(1);
            }
            query.set_query(None);
            tracing::debug!(generation = self.generation, "search cleared");
            return SearchStep::Cleared;
        }

        let deadline = now + self.interval;
        self.pending = Some(PendingSearch {
            generation: self.generation,
            value: value.to_string(),
            deadline,
        });
        SearchStep::Scheduled {
            generation: self.generation,
            deadline,
        }
    }

    /// Commit the pending value once its deadline has passed
    ///
    /// Returns the committed value. The page is reset to 1 before `query`
    /// changes so a new search always starts on the first page.
    pub fn poll(&mut self, now: Instant, query: &mut QueryState) -> Option<String> {
        let due = self
            .pending
            .as_ref()
            .is_some_and(|p| p.generation == self.generation && now >= p.deadline);
        if !due {
            return None;
        }

        let pending = self.pending.take()?;
        if query.page() > 1 {
            query.set_page(1);
        }
        query.set_query(Some(pending.value.clone()));
        tracing::info!(generation = pending.generation, query = %pending.value, "search committed");
        Some(pending.value)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listing::query::QueryParamSpec;
    use proptest::prelude::*;

    fn state() -> QueryState {
        QueryState::new(QueryParamSpec::listing())
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_restart_commits_only_last_value() {
        let mut task = SearchTask::default();
        let mut query = state();
        let t0 = Instant::now();

        task.perform("al", t0, &mut query);
        task.perform("ale", t0 + ms(100), &mut query);

        // 250ms after the first keystroke but only 150ms after the second
        assert_eq!(task.poll(t0 + ms(250), &mut query), None);
        assert_eq!(query.query(), None);

        assert_eq!(task.poll(t0 + ms(350), &mut query), Some("ale".to_string()));
        assert_eq!(query.query(), Some("ale"));

        // Nothing left to commit
        assert_eq!(task.poll(t0 + ms(1000), &mut query), None);
    }

    #[test]
    fn test_blank_clears_without_delay() {
        let mut task = SearchTask::default();
        let mut query = state();
        query.set_query(Some("diesel".to_string()));
        let t0 = Instant::now();

        assert_eq!(task.perform("   ", t0, &mut query), SearchStep::Cleared);
        assert_eq!(query.query(), None);
        assert!(!task.is_pending());
    }

    #[test]
    fn test_blank_abandons_pending_search() {
        let mut task = SearchTask::default();
        let mut query = state();
        let t0 = Instant::now();

        task.perform("shell", t0, &mut query);
        task.perform("", t0 + ms(50), &mut query);

        assert_eq!(task.poll(t0 + ms(500), &mut query), None);
        assert_eq!(query.query(), None);
    }

    #[test]
    fn test_commit_resets_page() {
        let mut task = SearchTask::default();
        let mut query = state();
        query.set_page(4);
        let t0 = Instant::now();

        task.perform("bp", t0, &mut query);
        // Abandoned or pending attempts leave the page alone
        assert_eq!(query.page(), 4);

        task.poll(t0 + SEARCH_DEBOUNCE, &mut query);
        assert_eq!(query.page(), 1);
        assert_eq!(query.query(), Some("bp"));
    }

    #[test]
    fn test_clear_page_reset_rules() {
        let t0 = Instant::now();

        // No previous query: page stays
        let mut task = SearchTask::default();
        let mut query = state();
        query.set_page(3);
        task.perform("", t0, &mut query);
        assert_eq!(query.page(), 3);

        // Previous query on a later page: back to the first page
        let mut query = state();
        query.set_query(Some("caltex".to_string()));
        query.set_page(3);
        task.perform(" ", t0, &mut query);
        assert_eq!(query.page(), 1);
        assert_eq!(query.query(), None);
    }

    proptest! {
        #[test]
        fn test_burst_commits_last_input(
            inputs in proptest::collection::vec(("[a-z]{1,6}", 0u64..250), 1..12)
        ) {
            let mut task = SearchTask::default();
            let mut query = state();
            query.set_page(7);
            let mut now = Instant::now();
            let mut commits = Vec::new();

            for (value, gap) in &inputs {
                now += ms(*gap);
                // Polling between keystrokes that arrive inside the interval never commits
                if let Some(v) = task.poll(now, &mut query) {
                    commits.push(v);
                }
                task.perform(value, now, &mut query);
            }
            if let Some(v) = task.poll(now + SEARCH_DEBOUNCE, &mut query) {
                commits.push(v);
            }

            let last = inputs.last().map(|(v, _)| v.clone());
            prop_assert_eq!(commits.len(), 1);
            prop_assert_eq!(commits.pop(), last.clone());
            prop_assert_eq!(query.query().map(str::to_string), last);
            prop_assert_eq!(query.page(), 1);
        }
    }
}
