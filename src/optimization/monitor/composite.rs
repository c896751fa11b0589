//! Fan-out of search events to several monitors

use super::search_monitor::{SearchCommand, SearchMonitor};
use crate::types::{ClosurePlan, SearchProgress, SearchSpace, SearchStatistics};

/// Forwards every event to all contained monitors. The first monitor that
/// asks for termination wins.
#[derive(Default)]
pub struct CompositeMonitor<'a> {
    monitors: Vec<Box<dyn SearchMonitor + 'a>>,
}

impl std::fmt::Debug for CompositeMonitor<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names = self
            .monitors
            .iter()
            .map(|m| m.name())
            .collect::<Vec<&str>>()
            .join(", ");
        f.debug_struct("CompositeMonitor")
            .field("monitors", &names)
            .finish()
    }
}

impl<'a> CompositeMonitor<'a> {
    pub fn new() -> Self {
        Self {
            monitors: Vec::new(),
        }
    }

    pub fn add_monitor<M>(&mut self, monitor: M)
    where
        M: SearchMonitor + 'a,
    {
        self.monitors.push(Box::new(monitor));
    }

    /// Builder-style [`add_monitor`](Self::add_monitor).
    pub fn with<M>(mut self, monitor: M) -> Self
    where
        M: SearchMonitor + 'a,
    {
        self.add_monitor(monitor);
        self
    }

    pub fn len(&self) -> usize {
        self.monitors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.monitors.is_empty()
    }
}

impl SearchMonitor for CompositeMonitor<'_> {
    fn name(&self) -> &str {
        "CompositeMonitor"
    }

    fn on_enter_search(&mut self, space: &SearchSpace) {
        for monitor in &mut self.monitors {
            monitor.on_enter_search(space);
        }
    }

    fn on_step(&mut self, progress: &SearchProgress) {
        for monitor in &mut self.monitors {
            monitor.on_step(progress);
        }
    }

    fn on_improvement(&mut self, plan: &ClosurePlan) {
        for monitor in &mut self.monitors {
            monitor.on_improvement(plan);
        }
    }

    fn on_exit_search(&mut self, statistics: &SearchStatistics) {
        for monitor in &mut self.monitors {
            monitor.on_exit_search(statistics);
        }
    }

    fn search_command(&self) -> SearchCommand {
        self.monitors
            .iter()
            .map(|m| m.search_command())
            .find(|cmd| matches!(cmd, SearchCommand::Terminate(_)))
            .unwrap_or(SearchCommand::Continue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimization::monitor::{EvaluationLimitMonitor, InterruptMonitor, NoOpMonitor};
    use std::sync::atomic::{AtomicBool, Ordering};

    #[test]
    fn empty_composite_continues() {
        let composite = CompositeMonitor::new();
        assert!(composite.is_empty());
        assert_eq!(composite.search_command(), SearchCommand::Continue);
    }

    #[test]
    fn first_terminate_wins() {
        let flag = AtomicBool::new(true);
        let composite = CompositeMonitor::new()
            .with(NoOpMonitor)
            .with(InterruptMonitor::new(&flag))
            .with(EvaluationLimitMonitor::new(0));
        assert_eq!(composite.len(), 3);
        match composite.search_command() {
            SearchCommand::Terminate(reason) => assert!(reason.contains("interrupt")),
            other => panic!("expected Terminate, got {other:?}"),
        }
        flag.store(false, Ordering::Relaxed);
        match composite.search_command() {
            SearchCommand::Terminate(reason) => assert!(reason.contains("evaluation limit")),
            other => panic!("expected Terminate, got {other:?}"),
        }
    }

    #[test]
    fn forwards_steps_to_children() {
        let mut composite = CompositeMonitor::new().with(EvaluationLimitMonitor::new(2));
        composite.on_step(&SearchProgress { evaluated: 2, total: 5 });
        assert!(matches!(composite.search_command(), SearchCommand::Terminate(_)));
    }
}
