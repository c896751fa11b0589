//! Closure Optimizer Regression Tests
//!
//! End-to-end checks of the public optimizer API: documented scenarios,
//! structural properties, and a comparison against an independent
//! brute-force reference on seeded random instances.

use std::collections::BTreeSet;
use std::sync::atomic::AtomicBool;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use well_closure::optimization::monitor::{
    CompositeMonitor, EvaluationLimitMonitor, InterruptMonitor, NoOpMonitor, ProgressMonitor,
};
use well_closure::optimization::ClosureOptimizer;
use well_closure::types::{ApproximationPolicy, ClosureRequest, SearchStatus, Well};
use well_closure::{optimize, ClosureError};

fn abc() -> Vec<Well> {
    vec![
        Well::new("A", 50.0, 100.0),
        Well::new("B", 60.0, 80.0),
        Well::new("C", 20.0, 10.0),
    ]
}

fn no_exclusions() -> BTreeSet<String> {
    BTreeSet::new()
}

/// Reference: enumerate every bitmask, keep the cheapest qualifying subset
/// (fewer wells, then smallest sorted ids on ties).
fn brute_force(
    wells: &[Well],
    target: f64,
    horizon: u32,
    cap: usize,
    excluded: &BTreeSet<String>,
) -> Option<(f64, Vec<String>)> {
    let candidates: Vec<&Well> = wells
        .iter()
        .filter(|w| !excluded.contains(&w.id) && w.flow_m3_d > 0.0)
        .collect();
    let mut best: Option<(f64, Vec<String>)> = None;

    for mask in 1u32..(1 << candidates.len()) {
        let chosen: Vec<&Well> = (0..candidates.len())
            .filter(|i| mask & (1 << i) != 0)
            .map(|i| candidates[i])
            .collect();
        if chosen.len() > cap {
            continue;
        }
        let flow: f64 = chosen.iter().map(|w| w.flow_m3_d).sum();
        if flow < target {
            continue;
        }
        let impact = chosen.iter().map(|w| w.profit_usd_d).sum::<f64>() * f64::from(horizon);
        let mut ids: Vec<String> = chosen.iter().map(|w| w.id.clone()).collect();
        ids.sort();

        let better = match &best {
            None => true,
            Some((best_impact, best_ids)) => {
                impact < *best_impact
                    || (impact == *best_impact
                        && (ids.len(), &ids) < (best_ids.len(), best_ids))
            }
        };
        if better {
            best = Some((impact, ids));
        }
    }
    best
}

fn random_wells(rng: &mut StdRng, n: usize) -> Vec<Well> {
    (0..n)
        .map(|i| {
            // Integer-valued numbers keep summation exact
            let flow = if rng.gen_bool(0.15) {
                0.0
            } else {
                f64::from(rng.gen_range(1..=100u32))
            };
            let profit = f64::from(rng.gen_range(-50..=500i32));
            Well::new(format!("W{i:02}"), flow, profit)
        })
        .collect()
}

// ============================================================================
// Documented scenarios
// ============================================================================

#[test]
fn pair_b_c_is_cheapest_for_target_70() {
    let plan = optimize(&abc(), 70.0, 2, 2, &no_exclusions())
        .unwrap()
        .expect("a plan exists");
    assert_eq!(plan.wells, vec!["B", "C"]);
    assert_eq!(plan.closed_flow_m3_d, 80.0);
    assert_eq!(plan.profit_impact_usd, 180.0);
}

#[test]
fn target_above_total_flow_has_no_plan() {
    assert!(optimize(&abc(), 1000.0, 2, 3, &no_exclusions())
        .unwrap()
        .is_none());
}

#[test]
fn cap_of_one_only_considers_single_wells() {
    let plan = optimize(&abc(), 55.0, 2, 1, &no_exclusions())
        .unwrap()
        .unwrap();
    assert_eq!(plan.len(), 1);
    assert_eq!(plan.wells, vec!["B"]);
}

// ============================================================================
// Properties
// ============================================================================

#[test]
fn matches_brute_force_on_random_instances() {
    let mut rng = StdRng::seed_from_u64(0x5EED_C105);

    for round in 0..200 {
        let n = rng.gen_range(1..=10);
        let wells = random_wells(&mut rng, n);
        let total: f64 = wells.iter().map(|w| w.flow_m3_d).sum();
        let target = f64::from(rng.gen_range(0..=(total as u32 + 20)));
        let horizon = rng.gen_range(1..=10);
        let cap = rng.gen_range(1..=n);
        let excluded: BTreeSet<String> = wells
            .iter()
            .filter(|_| rng.gen_bool(0.1))
            .map(|w| w.id.clone())
            .collect();

        let got = optimize(&wells, target, horizon, cap, &excluded).unwrap();
        let expected = brute_force(&wells, target, horizon, cap, &excluded);

        match (got, expected) {
            (None, None) => {}
            (Some(plan), Some((impact, ids))) => {
                let mut got_ids = plan.wells.clone();
                got_ids.sort();
                assert_eq!(plan.profit_impact_usd, impact, "round {round}");
                assert_eq!(got_ids, ids, "round {round}");
                assert!(plan.closed_flow_m3_d >= target, "round {round}");
            }
            (got, expected) => panic!("round {round}: got {got:?}, expected {expected:?}"),
        }
    }
}

#[test]
fn raising_the_cap_never_raises_the_impact() {
    let mut rng = StdRng::seed_from_u64(42);
    for _ in 0..50 {
        let wells = random_wells(&mut rng, 8);
        let target = f64::from(rng.gen_range(0..=200u32));
        let mut previous: Option<f64> = None;
        for cap in 1..=8 {
            let plan = optimize(&wells, target, 3, cap, &no_exclusions()).unwrap();
            if let Some(prev) = previous {
                let plan = plan.as_ref().expect("a larger cap keeps a plan");
                assert!(plan.profit_impact_usd <= prev);
            }
            previous = plan.map(|p| p.profit_impact_usd).or(previous);
        }
    }
}

#[test]
fn plan_wells_are_in_input_order_and_never_excluded() {
    let wells = vec![
        Well::new("Z", 30.0, 1.0),
        Well::new("M", 30.0, 1.0),
        Well::new("A", 30.0, 50.0),
    ];
    let excluded: BTreeSet<String> = ["A".to_string()].into();
    let plan = optimize(&wells, 60.0, 1, 3, &excluded).unwrap().unwrap();
    assert_eq!(plan.wells, vec!["Z", "M"]);
}

#[test]
fn invalid_requests_are_rejected() {
    let dupes = vec![Well::new("A", 1.0, 1.0), Well::new("A", 2.0, 1.0)];
    assert!(matches!(
        optimize(&dupes, 1.0, 1, 1, &no_exclusions()),
        Err(ClosureError::Validation(_))
    ));
    assert!(optimize(&abc(), -1.0, 1, 1, &no_exclusions()).is_err());
    assert!(optimize(&abc(), 10.0, 0, 1, &no_exclusions()).is_err());
    assert!(optimize(&abc(), 10.0, 1, 0, &no_exclusions()).is_err());
}

// ============================================================================
// Monitored searches
// ============================================================================

#[test]
fn completed_search_reports_progress_to_one() {
    let request = ClosureRequest::new(abc(), 70.0, 2, 3);
    let mut fractions = Vec::new();
    let outcome = {
        let mut monitor = ProgressMonitor::new(0.25, |p| fractions.push(p.fraction()));
        ClosureOptimizer::search(&request, &mut monitor).unwrap()
    };
    assert_eq!(outcome.status, SearchStatus::Completed);
    assert!(outcome.is_exact());
    assert_eq!(fractions.last().copied(), Some(1.0));
    assert!(fractions.windows(2).all(|w| w[0] <= w[1]));
}

#[test]
fn aborted_search_keeps_a_qualifying_incumbent() {
    let wells: Vec<Well> = (0..12)
        .map(|i| Well::new(format!("W{i:02}"), 10.0 + f64::from(i), 100.0 - f64::from(i)))
        .collect();
    let request = ClosureRequest::new(wells, 15.0, 2, 4);
    let flag = AtomicBool::new(false);
    let mut monitor = CompositeMonitor::new()
        .with(InterruptMonitor::new(&flag))
        .with(EvaluationLimitMonitor::new(20));

    let outcome = ClosureOptimizer::search(&request, &mut monitor).unwrap();
    assert!(matches!(outcome.status, SearchStatus::Aborted(_)));
    assert!(!outcome.is_exact());
    assert_eq!(outcome.statistics.subsets_evaluated, 20);
    let plan = outcome.plan.expect("singles W05.. already qualify");
    assert!(plan.closed_flow_m3_d >= 15.0);
}

#[test]
fn approximation_is_recorded_in_the_outcome() {
    let wells: Vec<Well> = (0..40)
        .map(|i| Well::new(format!("W{i:02}"), f64::from(i % 7) + 1.0, 5.0))
        .collect();
    let request = ClosureRequest::new(wells, 20.0, 5, 10).with_approximation(ApproximationPolicy {
        top_n: 10,
        max_subset_size: 4,
    });
    let outcome = ClosureOptimizer::search(&request, &mut NoOpMonitor).unwrap();
    assert!(outcome.is_completed());
    assert!(!outcome.is_exact());
    assert_eq!(outcome.statistics.candidates, 10);
    assert_eq!(outcome.statistics.max_subset_size, 4);
    assert!(outcome.plan.unwrap().len() <= 4);
}
