//! Progress callback for presentation layers
//!
//! Wraps a caller closure and invokes it with a [`SearchProgress`] at the
//! start of the search, whenever completion advanced by at least `step`, and
//! once more when the search exits (completed or aborted). The reported
//! fraction never decreases.

use super::search_monitor::SearchMonitor;
use crate::types::{SearchProgress, SearchSpace, SearchStatistics};

pub struct ProgressMonitor<F>
where
    F: FnMut(SearchProgress),
{
    callback: F,
    step: f64,
    stride: u64,
    next_report_at: u64,
    total: u64,
}

impl<F> ProgressMonitor<F>
where
    F: FnMut(SearchProgress),
{
    /// `step` is the completion fraction between two callbacks, clamped to
    /// `(0, 1]`; a non-positive or NaN step reports every subset.
    pub fn new(step: f64, callback: F) -> Self {
        let step = if step.is_nan() { 0.0 } else { step.clamp(0.0, 1.0) };
        Self {
            callback,
            step,
            stride: 1,
            next_report_at: 1,
            total: 0,
        }
    }
}

impl<F> std::fmt::Debug for ProgressMonitor<F>
where
    F: FnMut(SearchProgress),
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressMonitor")
            .field("step", &self.step)
            .field("stride", &self.stride)
            .field("total", &self.total)
            .finish()
    }
}

impl<F> SearchMonitor for ProgressMonitor<F>
where
    F: FnMut(SearchProgress),
{
    fn name(&self) -> &str {
        "ProgressMonitor"
    }

    fn on_enter_search(&mut self, space: &SearchSpace) {
        self.total = space.total_subsets;
        // Truncation is fine: stride only needs to be >= 1
        self.stride = ((space.total_subsets as f64 * self.step) as u64).max(1);
        self.next_report_at = self.stride;
        (self.callback)(SearchProgress {
            evaluated: 0,
            total: self.total,
        });
    }

    fn on_step(&mut self, progress: &SearchProgress) {
        if progress.evaluated >= self.next_report_at && !progress.is_finished() {
            (self.callback)(*progress);
            self.next_report_at = progress.evaluated.saturating_add(self.stride);
        }
    }

    fn on_exit_search(&mut self, statistics: &SearchStatistics) {
        (self.callback)(statistics.progress());
    }
}
