//! State for the aggregate stats panel.
//!
//! No machinery beyond loading/error/loaded plus the same stale-response
//! token discipline as the job list: the panel refetches on mount, after
//! every push event, and after any mutating action, so responses can race.

use crate::api::error::ApiError;
use crate::api::job::models::JobStats;

/// What the stats panel currently shows
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatsView {
    Loading,
    Loaded(JobStats),
    Error(String),
}

pub struct StatsState {
    view: StatsView,
    token: u64,
}

impl StatsState {
    pub fn new() -> Self {
        Self {
            view: StatsView::Loading,
            token: 0,
        }
    }

    pub fn view(&self) -> &StatsView {
        &self.view
    }

    /// Begin a (re)fetch; returns the token the response must carry
    pub fn begin(&mut self) -> u64 {
        self.token += 1;
        if matches!(self.view, StatsView::Error(_)) {
            self.view = StatsView::Loading;
        }
        self.token
    }

    /// Apply a completed stats fetch; stale responses are discarded
    pub fn apply(&mut self, token: u64, result: Result<JobStats, ApiError>) -> bool {
        if token != self.token {
            return false;
        }
        self.view = match result {
            Ok(stats) => StatsView::Loaded(stats),
            Err(e) => StatsView::Error(e.to_string()),
        };
        true
    }
}

impl Default for StatsState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(total: u64) -> JobStats {
        JobStats {
            pending: 1,
            running: 1,
            completed: 1,
            failed: 1,
            total,
        }
    }

    #[test]
    fn starts_loading_and_resolves() {
        let mut state = StatsState::new();
        assert_eq!(*state.view(), StatsView::Loading);

        let token = state.begin();
        assert!(state.apply(token, Ok(stats(4))));
        assert_eq!(*state.view(), StatsView::Loaded(stats(4)));
    }

    #[test]
    fn stale_stats_response_is_dropped() {
        let mut state = StatsState::new();
        let first = state.begin();
        let second = state.begin();

        assert!(state.apply(second, Ok(stats(10))));
        assert!(!state.apply(first, Ok(stats(4))));
        assert_eq!(*state.view(), StatsView::Loaded(stats(10)));
    }

    #[test]
    fn errors_show_and_a_refetch_clears_them() {
        let mut state = StatsState::new();
        let token = state.begin();
        state.apply(token, Err(ApiError::Validation("Failed to load stats".to_string())));
        assert!(matches!(state.view(), StatsView::Error(_)));

        state.begin();
        assert_eq!(*state.view(), StatsView::Loading);
    }
}
