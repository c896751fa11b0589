//! Approximation strategy for large candidate lists
//!
//! Exhaustive search over n wells with cap k costs Σ C(n, i) evaluations.
//! When an operator opts in, the candidate list is truncated to the `top_n`
//! highest-flow wells and the cap tightened to the policy's
//! `max_subset_size`. This bounds runtime (30 wells / 6 per combination is
//! roughly 800k subsets) at the price of completeness: a cheaper combination
//! built from low-flow wells can be missed.

use crate::types::{ApproximationPolicy, Well};

/// Candidate list after the policy has been applied.
#[derive(Debug, Clone)]
pub struct Truncated<'a> {
    /// Kept wells, in their original order
    pub wells: Vec<&'a Well>,
    /// Combination cap to search with
    pub max_subset_size: usize,
    /// Number of wells removed
    pub dropped: usize,
    /// The search space is strictly smaller than the exact one
    pub applied: bool,
}

/// Apply `policy` to an already filtered candidate list.
///
/// Only truncates when the list is longer than `top_n`; the highest-flow
/// wells are kept, flow ties resolved by input order.
pub fn truncate<'a>(
    candidates: Vec<&'a Well>,
    max_subset_size: usize,
    policy: &ApproximationPolicy,
) -> Truncated<'a> {
    let exact_cap = max_subset_size.min(candidates.len());

    let (wells, dropped) = if candidates.len() > policy.top_n {
        let mut order: Vec<usize> = (0..candidates.len()).collect();
        // Stable sort: equal flows keep input order
        order.sort_by(|&a, &b| {
            candidates[b]
                .flow_m3_d
                .partial_cmp(&candidates[a].flow_m3_d)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        let mut keep: Vec<usize> = order.into_iter().take(policy.top_n).collect();
        keep.sort_unstable();
        let dropped = candidates.len() - keep.len();
        (keep.into_iter().map(|i| candidates[i]).collect(), dropped)
    } else {
        (candidates, 0)
    };

    let cap = max_subset_size.min(policy.max_subset_size);
    let applied = dropped > 0 || cap.min(wells.len()) < exact_cap;

    Truncated {
        wells,
        max_subset_size: cap,
        dropped,
        applied,
    }
}
