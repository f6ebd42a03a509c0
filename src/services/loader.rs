//! Scoped loading indicator
//!
//! Routes register their intent to show a loader; only an initial transition
//! into a route actually shows it. Parameter-only refreshes stay silent.

use std::time::Instant;

/// Kind of route transition being performed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// First entry into the route
    Initial,
    /// Re-fetch after a query parameter change or an explicit refresh
    Refresh,
}

impl Transition {
    pub fn is_initial(&self) -> bool {
        matches!(self, Transition::Initial)
    }
}

/// Region holding a listing's table
pub const MAIN_CONTENT: &str = "#mainContent";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadingState {
    /// Content region the indicator covers, e.g. `#mainContent`
    pub region: String,
    pub message: String,
    pub since: Instant,
}

#[derive(Debug, Default)]
pub struct LoadingIndicator {
    active: Option<LoadingState>,
}

impl LoadingIndicator {
    pub fn new() -> Self {
        Self { active: None }
    }

    /// Show the indicator if `transition` is an initial one
    pub fn show_on_initial_transition(&mut self, transition: Transition, region: &str, message: &str) {
        if !transition.is_initial() {
            return;
        }
        tracing::debug!(region, message, "loading indicator shown");
        self.active = Some(LoadingState {
            region: region.to_string(),
            message: message.to_string(),
            since: Instant::now(),
        });
    }

    pub fn hide(&mut self) {
        self.active = None;
    }

    pub fn state(&self) -> Option<&LoadingState> {
        self.active.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shows_only_on_initial_transition() {
        let mut loader = LoadingIndicator::new();
        loader.show_on_initial_transition(Transition::Refresh, "#mainContent", "Loading vendors...");
        assert!(!loader.state().is_some());

        loader.show_on_initial_transition(Transition::Initial, "#mainContent", "Loading vendors...");
        let state = loader.state().unwrap();
        assert_eq!(state.region, "#mainContent");
        assert_eq!(state.message, "Loading vendors...");

        loader.hide();
        assert!(!loader.state().is_some());
    }
}
