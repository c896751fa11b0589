//! Closure search request / result types

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::Well;

/// Bounded-runtime approximation: keep only the highest-flow wells and cap
/// the combination size. Results are NOT guaranteed minimal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApproximationPolicy {
    /// Number of highest-flow candidate wells kept
    pub top_n: usize,
    /// Largest combination size searched after truncation
    pub max_subset_size: usize,
}

impl Default for ApproximationPolicy {
    fn default() -> Self {
        Self {
            top_n: 30,
            max_subset_size: 6,
        }
    }
}

/// Everything the optimizer needs for one search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClosureRequest {
    /// Candidate wells (identifiers must be unique)
    pub wells: Vec<Well>,
    /// Minimum water flow to shut in (m³/d)
    pub target_flow_m3_d: f64,
    /// Shutdown duration (days)
    pub horizon_days: u32,
    /// Largest number of wells closed together
    pub max_subset_size: usize,
    /// Protected wells that must never be closed
    #[serde(default)]
    pub excluded: BTreeSet<String>,
    /// Opt-in approximation mode
    #[serde(default)]
    pub approximation: Option<ApproximationPolicy>,
}

impl ClosureRequest {
    pub fn new(
        wells: Vec<Well>,
        target_flow_m3_d: f64,
        horizon_days: u32,
        max_subset_size: usize,
    ) -> Self {
        Self {
            wells,
            target_flow_m3_d,
            horizon_days,
            max_subset_size,
            excluded: BTreeSet::new(),
            approximation: None,
        }
    }

    /// Protect the given wells from closure.
    pub fn exclude<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded.extend(ids.into_iter().map(Into::into));
        self
    }

    /// Request the approximation mode.
    pub fn with_approximation(mut self, policy: ApproximationPolicy) -> Self {
        self.approximation = Some(policy);
        self
    }
}

/// The chosen set of wells to close.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClosurePlan {
    /// Wells to close, in input order
    pub wells: Vec<String>,
    /// Summed water flow of the closed wells (m³/d)
    pub closed_flow_m3_d: f64,
    /// Summed daily profit impact (USD/d)
    pub daily_profit_usd: f64,
    /// Profit impact over the whole horizon (USD)
    pub profit_impact_usd: f64,
    /// Shutdown duration the impact was computed for (days)
    pub horizon_days: u32,
}

impl ClosurePlan {
    pub fn len(&self) -> usize {
        self.wells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wells.is_empty()
    }

    pub fn contains(&self, well_id: &str) -> bool {
        self.wells.iter().any(|w| w == well_id)
    }
}

/// How a search ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "reason", rename_all = "snake_case")]
pub enum SearchStatus {
    /// Every subset in the search space was evaluated
    Completed,
    /// A monitor stopped the search early
    Aborted(String),
}

impl std::fmt::Display for SearchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Completed => write!(f, "Completed"),
            Self::Aborted(reason) => write!(f, "Aborted: {reason}"),
        }
    }
}

/// Shape of the search space, reported to monitors before enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchSpace {
    /// Wells left after exclusion, flow filtering and truncation
    pub candidates: usize,
    /// Effective combination size cap
    pub max_subset_size: usize,
    /// Σ C(candidates, k) for k = 1..=max_subset_size
    pub total_subsets: u64,
}

/// Incremental progress of a running search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchProgress {
    pub evaluated: u64,
    pub total: u64,
}

impl SearchProgress {
    /// Completion fraction in `[0, 1]`. An empty search space is complete.
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            return 1.0;
        }
        (self.evaluated as f64 / self.total as f64).min(1.0)
    }

    pub fn is_finished(&self) -> bool {
        self.evaluated >= self.total
    }
}

/// Counters collected while searching.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchStatistics {
    /// Wells in the request
    pub input_wells: usize,
    /// Wells removed because they are protected
    pub excluded_wells: usize,
    /// Wells removed for non-positive flow
    pub non_producing_wells: usize,
    /// Wells dropped by the approximation policy
    pub truncated_wells: usize,
    /// The approximation policy dropped wells or tightened the cap
    pub approximation_applied: bool,
    /// Wells actually enumerated
    pub candidates: usize,
    /// Effective combination size cap
    pub max_subset_size: usize,
    pub subsets_total: u64,
    pub subsets_evaluated: u64,
    /// Qualifying subsets that improved on the incumbent
    pub improvements: u64,
    pub elapsed_ms: u64,
}

impl SearchStatistics {
    pub fn progress(&self) -> SearchProgress {
        SearchProgress {
            evaluated: self.subsets_evaluated,
            total: self.subsets_total,
        }
    }
}

impl std::fmt::Display for SearchStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}/{} subsets over {} candidates (cap {}), {} improvements in {} ms",
            self.subsets_evaluated,
            self.subsets_total,
            self.candidates,
            self.max_subset_size,
            self.improvements,
            self.elapsed_ms
        )
    }
}

/// Full result of a monitored search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchOutcome {
    /// Best plan found; `None` when no subset reaches the target
    pub plan: Option<ClosurePlan>,
    pub status: SearchStatus,
    /// Whether an approximation policy was requested
    pub approximation: Option<ApproximationPolicy>,
    pub statistics: SearchStatistics,
}

impl SearchOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self.status, SearchStatus::Completed)
    }

    /// The plan is minimal over the full request: the search completed and
    /// no approximation narrowed the search space.
    pub fn is_exact(&self) -> bool {
        self.is_completed() && !self.statistics.approximation_applied
    }

    pub fn into_plan(self) -> Option<ClosurePlan> {
        self.plan
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_fraction_of_empty_space_is_complete() {
        let p = SearchProgress { evaluated: 0, total: 0 };
        assert_eq!(p.fraction(), 1.0);
        assert!(p.is_finished());
    }

    #[test]
    fn progress_fraction_is_ratio() {
        let p = SearchProgress { evaluated: 25, total: 100 };
        assert!((p.fraction() - 0.25).abs() < 1e-12);
        assert!(!p.is_finished());
    }

    #[test]
    fn request_builder_collects_exclusions() {
        let req = ClosureRequest::new(vec![Well::new("A", 1.0, 1.0)], 1.0, 2, 1)
            .exclude(["A", "B"])
            .exclude(vec!["A".to_string()]);
        assert_eq!(req.excluded.len(), 2);
        assert!(req.approximation.is_none());
    }

    #[test]
    fn status_serializes_with_reason() {
        let json = serde_json::to_value(SearchStatus::Aborted("time limit reached".into())).unwrap();
        assert_eq!(json["state"], "aborted");
        assert_eq!(json["reason"], "time limit reached");
        let json = serde_json::to_value(SearchStatus::Completed).unwrap();
        assert_eq!(json["state"], "completed");
    }
}
