//! Periodic tracing output for long searches

use super::search_monitor::SearchMonitor;
use crate::types::{ClosurePlan, SearchProgress, SearchSpace, SearchStatistics};
use std::time::{Duration, Instant};
use tracing::info;

/// Emits an `info!` progress line at most once per `log_interval`.
#[derive(Debug, Clone)]
pub struct LogMonitor {
    start_time: Instant,
    last_log_time: Instant,
    log_interval: Duration,
    clock_check_mask: u64,
    best_impact: Option<f64>,
}

impl LogMonitor {
    pub fn new(log_interval: Duration, clock_check_mask: u64) -> Self {
        Self {
            start_time: Instant::now(),
            last_log_time: Instant::now(),
            log_interval,
            clock_check_mask,
            best_impact: None,
        }
    }
}

impl Default for LogMonitor {
    fn default() -> Self {
        Self::new(Duration::from_secs(1), 4095)
    }
}

impl SearchMonitor for LogMonitor {
    fn name(&self) -> &str {
        "LogMonitor"
    }

    fn on_enter_search(&mut self, space: &SearchSpace) {
        self.start_time = Instant::now();
        self.last_log_time = self.start_time;
        self.best_impact = None;
        info!(
            candidates = space.candidates,
            max_wells = space.max_subset_size,
            subsets = space.total_subsets,
            "Closure search started"
        );
    }

    fn on_step(&mut self, progress: &SearchProgress) {
        if (progress.evaluated & self.clock_check_mask) == 0
            && self.last_log_time.elapsed() >= self.log_interval
        {
            info!(
                elapsed_s = %format!("{:.1}", self.start_time.elapsed().as_secs_f32()),
                evaluated = progress.evaluated,
                total = progress.total,
                percent = %format!("{:.1}", progress.fraction() * 100.0),
                best_impact_usd = ?self.best_impact,
                "Closure search progress"
            );
            self.last_log_time = Instant::now();
        }
    }

    fn on_improvement(&mut self, plan: &ClosurePlan) {
        self.best_impact = Some(plan.profit_impact_usd);
    }

    fn on_exit_search(&mut self, statistics: &SearchStatistics) {
        info!(
            evaluated = statistics.subsets_evaluated,
            total = statistics.subsets_total,
            improvements = statistics.improvements,
            elapsed_ms = statistics.elapsed_ms,
            "Closure search finished"
        );
    }
}
