//! Wall-clock budget for a search
//!
//! Reading the clock on every subset would dominate the cost of evaluating
//! it, so the elapsed time is only checked when `(steps & mask) == 0`. The
//! default mask (`0x3FFF`) checks roughly every 16k subsets.

use super::search_monitor::{SearchCommand, SearchMonitor};
use crate::types::{SearchProgress, SearchSpace};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeLimitMonitor {
    clock_check_mask: u64,
    steps: u64,
    time_limit: Duration,
    start_time: Instant,
}

impl TimeLimitMonitor {
    /// Check every 16,384 steps (2^14).
    const DEFAULT_STEP_CLOCK_CHECK_MASK: u64 = 0x3FFF;

    pub fn new(time_limit: Duration) -> Self {
        Self::with_clock_check_mask(time_limit, Self::DEFAULT_STEP_CLOCK_CHECK_MASK)
    }

    pub fn with_clock_check_mask(time_limit: Duration, clock_check_mask: u64) -> Self {
        Self {
            clock_check_mask,
            steps: 0,
            time_limit,
            start_time: Instant::now(),
        }
    }

    pub fn time_limit(&self) -> Duration {
        self.time_limit
    }
}

impl SearchMonitor for TimeLimitMonitor {
    fn name(&self) -> &str {
        "TimeLimitMonitor"
    }

    fn on_enter_search(&mut self, _space: &SearchSpace) {
        self.start_time = Instant::now();
        self.steps = 0;
    }

    #[inline]
    fn on_step(&mut self, _progress: &SearchProgress) {
        self.steps = self.steps.wrapping_add(1);
    }

    #[inline]
    fn search_command(&self) -> SearchCommand {
        if (self.steps & self.clock_check_mask) == 0 && self.start_time.elapsed() >= self.time_limit
        {
            return SearchCommand::Terminate("time limit reached".to_string());
        }
        SearchCommand::Continue
    }
}
