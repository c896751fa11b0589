//! Monitor trait and the command it hands back to the search loop

use crate::types::{ClosurePlan, SearchProgress, SearchSpace, SearchStatistics};

/// What a monitor wants the search loop to do next.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub enum SearchCommand {
    #[default]
    Continue,
    Terminate(String),
}

impl std::fmt::Display for SearchCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SearchCommand::Continue => write!(f, "Continue"),
            SearchCommand::Terminate(reason) => write!(f, "Terminate: {reason}"),
        }
    }
}

/// Observer of a running closure search.
///
/// All hooks default to no-ops so monitors only implement what they need.
/// `on_step` runs once per evaluated subset and must stay cheap.
pub trait SearchMonitor {
    fn name(&self) -> &str;

    fn on_enter_search(&mut self, _space: &SearchSpace) {}

    fn on_step(&mut self, _progress: &SearchProgress) {}

    fn on_improvement(&mut self, _plan: &ClosurePlan) {}

    fn on_exit_search(&mut self, _statistics: &SearchStatistics) {}

    fn search_command(&self) -> SearchCommand {
        SearchCommand::Continue
    }
}

impl std::fmt::Debug for dyn SearchMonitor + '_ {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SearchMonitor({})", self.name())
    }
}
