//! Core ClosureOptimizer: exhaustive minimum-loss well closure search

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::types::{
    ClosurePlan, ClosureRequest, SearchOutcome, SearchProgress, SearchSpace, SearchStatistics,
    SearchStatus, Well,
};

use super::approximation;
use super::combinations::{subset_count, Combinations};
use super::error::ClosureError;
use super::monitor::{NoOpMonitor, SearchCommand, SearchMonitor};
use super::validation::validate_request;

/// Best qualifying subset seen so far, as indices into the candidate list.
#[derive(Debug, Clone)]
struct Incumbent {
    indices: Vec<usize>,
    flow: f64,
    daily_profit: f64,
    impact: f64,
}

/// Exhaustive search for the cheapest set of wells whose combined water flow
/// reaches a target.
///
/// Subsets are enumerated by increasing size (1..=cap) and, within a size, in
/// lexicographic order of candidate position. A subset qualifies when its
/// summed flow is >= the target; the empty subset never qualifies. Among
/// qualifying subsets the lowest profit impact over the horizon wins, with
/// ties broken by fewer wells, then by the lexicographically smallest sorted
/// identifier list. Sums are accumulated in input order, so identical input
/// always yields an identical plan.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClosureOptimizer;

impl ClosureOptimizer {
    /// Run a search without observers and return the plan, if any.
    pub fn optimize(request: &ClosureRequest) -> Result<Option<ClosurePlan>, ClosureError> {
        Self::search(request, &mut NoOpMonitor).map(SearchOutcome::into_plan)
    }

    /// Run a search, reporting to `monitor` and honouring its termination
    /// requests. An aborted search returns the best qualifying plan found so
    /// far; it is not guaranteed minimal.
    pub fn search<M>(request: &ClosureRequest, monitor: &mut M) -> Result<SearchOutcome, ClosureError>
    where
        M: SearchMonitor + ?Sized,
    {
        let started = Instant::now();
        validate_request(request)?;

        let mut statistics = SearchStatistics {
            input_wells: request.wells.len(),
            ..Default::default()
        };

        // 1. Drop protected and non-producing wells
        let mut candidates: Vec<&Well> = Vec::with_capacity(request.wells.len());
        for well in &request.wells {
            if request.excluded.contains(&well.id) {
                statistics.excluded_wells += 1;
            } else if !well.is_producing() {
                statistics.non_producing_wells += 1;
            } else {
                candidates.push(well);
            }
        }

        // 2. Optional approximation
        let mut cap = request.max_subset_size;
        if let Some(policy) = &request.approximation {
            let truncated = approximation::truncate(candidates, cap, policy);
            statistics.truncated_wells = truncated.dropped;
            statistics.approximation_applied = truncated.applied;
            candidates = truncated.wells;
            cap = truncated.max_subset_size;
        }
        let cap = cap.min(candidates.len());

        // 3. Size the search space up front
        let total = subset_count(candidates.len(), cap).ok_or(ClosureError::SearchSpaceTooLarge {
            candidates: candidates.len(),
            max_subset_size: cap,
        })?;
        statistics.candidates = candidates.len();
        statistics.max_subset_size = cap;
        statistics.subsets_total = total;

        let space = SearchSpace {
            candidates: candidates.len(),
            max_subset_size: cap,
            total_subsets: total,
        };
        debug!(
            candidates = space.candidates,
            excluded = statistics.excluded_wells,
            non_producing = statistics.non_producing_wells,
            truncated = statistics.truncated_wells,
            max_wells = cap,
            subsets = total,
            target_m3_d = request.target_flow_m3_d,
            horizon_days = request.horizon_days,
            "Starting closure search"
        );
        monitor.on_enter_search(&space);

        // 4. Enumerate
        let horizon = f64::from(request.horizon_days);
        let target = request.target_flow_m3_d;
        let flows: Vec<f64> = candidates.iter().map(|w| w.flow_m3_d).collect();
        let profits: Vec<f64> = candidates.iter().map(|w| w.profit_usd_d).collect();

        let mut best: Option<Incumbent> = None;
        let mut status = SearchStatus::Completed;

        'sizes: for size in 1..=cap {
            let mut combinations = Combinations::new(candidates.len(), size);
            while let Some(subset) = combinations.next_combination() {
                if let SearchCommand::Terminate(reason) = monitor.search_command() {
                    status = SearchStatus::Aborted(reason);
                    break 'sizes;
                }

                statistics.subsets_evaluated += 1;
                let flow: f64 = subset.iter().map(|&i| flows[i]).sum();
                if flow >= target {
                    let daily_profit: f64 = subset.iter().map(|&i| profits[i]).sum();
                    let impact = daily_profit * horizon;
                    let improves = best
                        .as_ref()
                        .map_or(true, |b| compare(impact, subset, b, &candidates) == Ordering::Less);
                    if improves {
                        let incumbent = Incumbent {
                            indices: subset.to_vec(),
                            flow,
                            daily_profit,
                            impact,
                        };
                        let plan = to_plan(&incumbent, &candidates, request.horizon_days);
                        debug!(
                            wells = ?plan.wells,
                            flow_m3_d = plan.closed_flow_m3_d,
                            impact_usd = plan.profit_impact_usd,
                            "New best closure plan"
                        );
                        statistics.improvements += 1;
                        monitor.on_improvement(&plan);
                        best = Some(incumbent);
                    }
                }

                monitor.on_step(&SearchProgress {
                    evaluated: statistics.subsets_evaluated,
                    total,
                });
            }
        }

        statistics.elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        monitor.on_exit_search(&statistics);

        let plan = best.map(|b| to_plan(&b, &candidates, request.horizon_days));
        match (&status, &plan) {
            (SearchStatus::Aborted(reason), _) => warn!(
                reason = %reason,
                evaluated = statistics.subsets_evaluated,
                total,
                has_plan = plan.is_some(),
                "Closure search aborted; plan is best found so far"
            ),
            (SearchStatus::Completed, Some(p)) => info!(
                wells = ?p.wells,
                flow_m3_d = p.closed_flow_m3_d,
                impact_usd = p.profit_impact_usd,
                evaluated = statistics.subsets_evaluated,
                elapsed_ms = statistics.elapsed_ms,
                "Closure search completed"
            ),
            (SearchStatus::Completed, None) => info!(
                evaluated = statistics.subsets_evaluated,
                elapsed_ms = statistics.elapsed_ms,
                "No combination reaches the target flow"
            ),
        }

        Ok(SearchOutcome {
            plan,
            status,
            approximation: request.approximation,
            statistics,
        })
    }
}

/// Convenience entry point mirroring the operator workflow: wells, target,
/// horizon, cap and protected wells in, plan (or none) out.
pub fn optimize(
    wells: &[Well],
    target_flow_m3_d: f64,
    horizon_days: u32,
    max_subset_size: usize,
    excluded: &BTreeSet<String>,
) -> Result<Option<ClosurePlan>, ClosureError> {
    let mut request = ClosureRequest::new(
        wells.to_vec(),
        target_flow_m3_d,
        horizon_days,
        max_subset_size,
    );
    request.excluded = excluded.clone();
    ClosureOptimizer::optimize(&request)
}

/// Order a candidate subset against the incumbent: impact, then size, then
/// sorted identifiers.
fn compare(impact: f64, subset: &[usize], best: &Incumbent, candidates: &[&Well]) -> Ordering {
    impact
        .partial_cmp(&best.impact)
        .unwrap_or(Ordering::Equal)
        .then_with(|| subset.len().cmp(&best.indices.len()))
        .then_with(|| sorted_ids(subset, candidates).cmp(&sorted_ids(&best.indices, candidates)))
}

fn sorted_ids<'a>(subset: &[usize], candidates: &[&'a Well]) -> Vec<&'a str> {
    let mut ids: Vec<&str> = subset.iter().map(|&i| candidates[i].id.as_str()).collect();
    ids.sort_unstable();
    ids
}

fn to_plan(incumbent: &Incumbent, candidates: &[&Well], horizon_days: u32) -> ClosurePlan {
    ClosurePlan {
        wells: incumbent
            .indices
            .iter()
            .map(|&i| candidates[i].id.clone())
            .collect(),
        closed_flow_m3_d: incumbent.flow,
        daily_profit_usd: incumbent.daily_profit,
        profit_impact_usd: incumbent.impact,
        horizon_days,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimization::monitor::{
        EvaluationLimitMonitor, InterruptMonitor, ProgressMonitor, TimeLimitMonitor,
    };
    use crate::types::ApproximationPolicy;
    use std::sync::atomic::AtomicBool;
    use std::time::Duration;

    fn abc() -> Vec<Well> {
        vec![
            Well::new("A", 50.0, 100.0),
            Well::new("B", 60.0, 80.0),
            Well::new("C", 20.0, 10.0),
        ]
    }

    fn none() -> BTreeSet<String> {
        BTreeSet::new()
    }

    #[test]
    fn picks_cheapest_qualifying_pair() {
        let plan = optimize(&abc(), 70.0, 2, 2, &none()).unwrap().unwrap();
        assert_eq!(plan.wells, vec!["B", "C"]);
        assert_eq!(plan.closed_flow_m3_d, 80.0);
        assert_eq!(plan.daily_profit_usd, 90.0);
        assert_eq!(plan.profit_impact_usd, 180.0);
        assert_eq!(plan.horizon_days, 2);
    }

    #[test]
    fn unreachable_target_returns_none() {
        assert_eq!(optimize(&abc(), 131.0, 2, 3, &none()).unwrap(), None);
    }

    #[test]
    fn cap_of_one_ignores_cheaper_pairs() {
        // {C, D} would cost 2/day but needs two wells
        let wells = vec![
            Well::new("A", 100.0, 500.0),
            Well::new("C", 30.0, 1.0),
            Well::new("D", 30.0, 1.0),
        ];
        let plan = optimize(&wells, 50.0, 1, 1, &none()).unwrap().unwrap();
        assert_eq!(plan.wells, vec!["A"]);

        let plan = optimize(&wells, 50.0, 1, 2, &none()).unwrap().unwrap();
        assert_eq!(plan.wells, vec!["C", "D"]);
    }

    #[test]
    fn excluded_wells_are_never_selected() {
        let excluded: BTreeSet<String> = ["C".to_string()].into();
        let plan = optimize(&abc(), 70.0, 2, 2, &excluded).unwrap().unwrap();
        assert!(!plan.contains("C"));
        assert_eq!(plan.wells, vec!["A", "B"]);
    }

    #[test]
    fn non_producing_wells_are_never_selected() {
        // Z costs nothing but has no flow
        let wells = vec![Well::new("Z", 0.0, -1000.0), Well::new("A", 10.0, 5.0)];
        let plan = optimize(&wells, 0.0, 1, 2, &none()).unwrap().unwrap();
        assert_eq!(plan.wells, vec!["A"]);
    }

    #[test]
    fn zero_target_selects_cheapest_non_empty_subset() {
        let plan = optimize(&abc(), 0.0, 1, 1, &none()).unwrap().unwrap();
        assert_eq!(plan.wells, vec!["C"]);
        assert_eq!(plan.profit_impact_usd, 10.0);
    }

    #[test]
    fn negative_profit_wells_are_combined_when_they_save_money() {
        let wells = vec![
            Well::new("L1", 5.0, -20.0),
            Well::new("L2", 5.0, -30.0),
            Well::new("P", 50.0, 40.0),
        ];
        let plan = optimize(&wells, 5.0, 3, 3, &none()).unwrap().unwrap();
        assert_eq!(plan.wells, vec!["L1", "L2"]);
        assert_eq!(plan.profit_impact_usd, -150.0);
    }

    #[test]
    fn ties_prefer_fewer_wells() {
        let wells = vec![
            Well::new("X", 10.0, 5.0),
            Well::new("Y", 10.0, 5.0),
            Well::new("Z", 20.0, 10.0),
        ];
        let plan = optimize(&wells, 20.0, 1, 2, &none()).unwrap().unwrap();
        assert_eq!(plan.wells, vec!["Z"]);
    }

    #[test]
    fn equal_cost_same_size_ties_prefer_smallest_identifiers() {
        // "b" enumerated first but "a" sorts first
        let wells = vec![Well::new("b", 10.0, 5.0), Well::new("a", 10.0, 5.0)];
        let plan = optimize(&wells, 10.0, 1, 1, &none()).unwrap().unwrap();
        assert_eq!(plan.wells, vec!["a"]);
    }

    #[test]
    fn repeated_calls_are_identical() {
        let first = optimize(&abc(), 70.0, 4, 3, &none()).unwrap();
        let second = optimize(&abc(), 70.0, 4, 3, &none()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn invalid_input_fails_before_search() {
        let err = optimize(&[], 10.0, 1, 1, &none()).unwrap_err();
        assert!(err.is_validation());

        let wells = vec![Well::new("A", -5.0, 1.0)];
        assert!(optimize(&wells, 1.0, 1, 1, &none()).unwrap_err().is_validation());
    }

    #[test]
    fn all_wells_excluded_is_not_an_error() {
        let excluded: BTreeSet<String> = ["A", "B", "C"].iter().map(|s| s.to_string()).collect();
        assert_eq!(optimize(&abc(), 10.0, 1, 3, &excluded).unwrap(), None);
    }

    #[test]
    fn statistics_account_for_every_subset() {
        let req = ClosureRequest::new(abc(), 70.0, 2, 3);
        let outcome = ClosureOptimizer::search(&req, &mut NoOpMonitor).unwrap();
        assert!(outcome.is_exact());
        assert_eq!(outcome.statistics.subsets_total, 7);
        assert_eq!(outcome.statistics.subsets_evaluated, 7);
        assert_eq!(outcome.statistics.candidates, 3);
        assert!(outcome.statistics.improvements >= 1);
    }

    #[test]
    fn progress_reaches_one_and_never_decreases() {
        let req = ClosureRequest::new(abc(), 70.0, 2, 3);
        let mut seen = Vec::new();
        {
            let mut monitor = ProgressMonitor::new(0.0, |p| seen.push(p.fraction()));
            ClosureOptimizer::search(&req, &mut monitor).unwrap();
        }
        assert!(seen.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(seen.first().copied(), Some(0.0));
        assert_eq!(seen.last().copied(), Some(1.0));
    }

    #[test]
    fn interrupt_before_start_aborts_without_plan() {
        let flag = AtomicBool::new(true);
        let req = ClosureRequest::new(abc(), 70.0, 2, 3);
        let outcome = ClosureOptimizer::search(&req, &mut InterruptMonitor::new(&flag)).unwrap();
        assert!(!outcome.is_completed());
        assert_eq!(outcome.statistics.subsets_evaluated, 0);
        assert!(outcome.plan.is_none());
    }

    #[test]
    fn evaluation_limit_keeps_best_so_far() {
        // Stops after the three singles; only B reaches 55
        let req = ClosureRequest::new(abc(), 55.0, 2, 3);
        let outcome =
            ClosureOptimizer::search(&req, &mut EvaluationLimitMonitor::new(3)).unwrap();
        assert!(matches!(outcome.status, SearchStatus::Aborted(_)));
        assert_eq!(outcome.statistics.subsets_evaluated, 3);
        let plan = outcome.plan.unwrap();
        assert_eq!(plan.wells, vec!["B"]);
        assert!(plan.closed_flow_m3_d >= 55.0);
    }

    #[test]
    fn generous_time_limit_completes() {
        let req = ClosureRequest::new(abc(), 70.0, 2, 3);
        let mut monitor = TimeLimitMonitor::new(Duration::from_secs(60));
        let outcome = ClosureOptimizer::search(&req, &mut monitor).unwrap();
        assert!(outcome.is_completed());
    }

    #[test]
    fn approximation_truncates_and_flags_outcome() {
        let mut wells: Vec<Well> = (0..40)
            .map(|i| Well::new(format!("W-{i:02}"), f64::from(i) + 1.0, 10.0))
            .collect();
        // Cheap low-flow pair only reachable without truncation
        wells.push(Well::new("cheap-1", 0.5, 0.0));
        let req = ClosureRequest::new(wells, 30.0, 1, 8).with_approximation(ApproximationPolicy {
            top_n: 5,
            max_subset_size: 2,
        });
        let outcome = ClosureOptimizer::search(&req, &mut NoOpMonitor).unwrap();
        assert!(outcome.statistics.approximation_applied);
        assert!(!outcome.is_exact());
        assert_eq!(outcome.statistics.candidates, 5);
        assert_eq!(outcome.statistics.truncated_wells, 36);
        assert_eq!(outcome.statistics.max_subset_size, 2);
        let plan = outcome.plan.unwrap();
        assert!(plan.len() <= 2);
        assert!(plan.closed_flow_m3_d >= 30.0);
    }

    #[test]
    fn oversized_search_space_is_rejected() {
        let wells: Vec<Well> = (0..300).map(|i| Well::new(format!("W{i}"), 1.0, 1.0)).collect();
        let req = ClosureRequest::new(wells, 1.0, 1, 300);
        assert!(matches!(
            ClosureOptimizer::optimize(&req),
            Err(ClosureError::SearchSpaceTooLarge { .. })
        ));
    }
}
