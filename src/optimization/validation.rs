//! Fail-fast request validation
//!
//! Every check runs before the optimizer filters or enumerates anything, so an
//! invalid request never produces partial work. The first failure is returned.

use std::collections::HashSet;

use crate::types::{ClosureRequest, Well};

use super::error::ValidationError;

/// Validate a closure request.
///
/// Rules:
/// - at least one well, identifiers non-blank and unique
/// - flow and profit finite, flow non-negative (zero is allowed and filtered later)
/// - target finite and non-negative, horizon >= 1 day, subset cap >= 1
/// - approximation policy (if any) with positive limits
/// - worst-case sums of |flow| and |profit| × horizon stay finite
pub fn validate_request(request: &ClosureRequest) -> Result<(), ValidationError> {
    if request.wells.is_empty() {
        return Err(ValidationError::EmptyWellList);
    }
    if request.horizon_days == 0 {
        return Err(ValidationError::NonPositiveHorizon);
    }
    if request.max_subset_size == 0 {
        return Err(ValidationError::InvalidSubsetCap);
    }
    if !request.target_flow_m3_d.is_finite() || request.target_flow_m3_d < 0.0 {
        return Err(ValidationError::InvalidTarget(request.target_flow_m3_d));
    }
    if let Some(policy) = &request.approximation {
        if policy.top_n == 0 || policy.max_subset_size == 0 {
            return Err(ValidationError::InvalidApproximation {
                top_n: policy.top_n,
                max_subset_size: policy.max_subset_size,
            });
        }
    }

    validate_wells(&request.wells)?;
    check_overflow(&request.wells, request.horizon_days)
}

/// Per-well checks: identifiers, finiteness, sign of flow.
pub fn validate_wells(wells: &[Well]) -> Result<(), ValidationError> {
    let mut seen: HashSet<&str> = HashSet::with_capacity(wells.len());

    for (position, well) in wells.iter().enumerate() {
        if well.id.trim().is_empty() {
            return Err(ValidationError::BlankWellId(position));
        }
        if !seen.insert(well.id.as_str()) {
            return Err(ValidationError::DuplicateWell(well.id.clone()));
        }
        if !well.flow_m3_d.is_finite() {
            return Err(ValidationError::NonFiniteValue {
                well: well.id.clone(),
                field: "flow",
            });
        }
        if !well.profit_usd_d.is_finite() {
            return Err(ValidationError::NonFiniteValue {
                well: well.id.clone(),
                field: "daily profit",
            });
        }
        if well.flow_m3_d < 0.0 {
            return Err(ValidationError::NegativeFlow {
                well: well.id.clone(),
                flow: well.flow_m3_d,
            });
        }
    }

    Ok(())
}

/// Any subset sum is bounded by the sum of absolute values, so if that bound
/// is finite no subset aggregation can overflow to infinity.
fn check_overflow(wells: &[Well], horizon_days: u32) -> Result<(), ValidationError> {
    let flow_bound: f64 = wells.iter().map(|w| w.flow_m3_d.abs()).sum();
    if !flow_bound.is_finite() {
        return Err(ValidationError::NumericOverflow {
            quantity: "summed flow",
        });
    }

    let profit_bound: f64 = wells.iter().map(|w| w.profit_usd_d.abs()).sum();
    if !(profit_bound * f64::from(horizon_days)).is_finite() {
        return Err(ValidationError::NumericOverflow {
            quantity: "profit impact over the horizon",
        });
    }

    Ok(())
}
