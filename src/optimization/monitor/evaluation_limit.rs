use super::search_monitor::{SearchCommand, SearchMonitor};
use crate::types::{SearchProgress, SearchSpace};

/// Stops the search after a fixed number of subset evaluations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvaluationLimitMonitor {
    limit: u64,
    evaluated: u64,
}

impl EvaluationLimitMonitor {
    pub fn new(limit: u64) -> Self {
        Self {
            limit,
            evaluated: 0,
        }
    }
}

impl SearchMonitor for EvaluationLimitMonitor {
    fn name(&self) -> &str {
        "EvaluationLimitMonitor"
    }

    fn on_enter_search(&mut self, _space: &SearchSpace) {
        self.evaluated = 0;
    }

    fn on_step(&mut self, progress: &SearchProgress) {
        self.evaluated = progress.evaluated;
    }

    fn search_command(&self) -> SearchCommand {
        if self.evaluated >= self.limit {
            SearchCommand::Terminate(format!("evaluation limit of {} reached", self.limit))
        } else {
            SearchCommand::Continue
        }
    }
}
