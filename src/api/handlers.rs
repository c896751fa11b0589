//! API handlers: health, well listing and closure optimization.
//!
//! Successes go through [`envelope::ok`]; failures are [`ApiError`] values
//! carrying an [`ErrorCode`].

use std::collections::BTreeSet;
use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::envelope::{self, ApiError, ErrorCode};
use crate::config::ClosureConfig;
use crate::loader::WellTable;
use crate::optimization::monitor::{CompositeMonitor, LogMonitor, TimeLimitMonitor};
use crate::optimization::ClosureOptimizer;
use crate::types::{
    ApproximationPolicy, ClosurePlan, ClosureRequest, FieldFilter, SearchStatistics, SearchStatus,
    Well,
};

// ============================================================================
// State
// ============================================================================

/// Shared state for all handlers. Cheap to clone.
#[derive(Clone)]
pub struct ApiState {
    /// Well table loaded at startup, if any
    pub table: Option<Arc<WellTable>>,
    pub config: Arc<ClosureConfig>,
}

impl ApiState {
    pub fn new(config: ClosureConfig) -> Self {
        Self {
            table: None,
            config: Arc::new(config),
        }
    }

    pub fn with_table(mut self, table: WellTable) -> Self {
        self.table = Some(Arc::new(table));
        self
    }
}

// ============================================================================
// Request / response types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    /// Wells in the loaded table (`None` when serving inline requests only)
    pub wells_loaded: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
pub struct FieldQuery {
    pub field: Option<String>,
    pub except_field: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct WellsResponse {
    pub filter: FieldFilter,
    /// Every field label in the loaded table
    pub fields: BTreeSet<String>,
    /// Producing wells matching the filter, in file order
    pub wells: Vec<Well>,
}

/// Body of `POST /optimize`.
#[derive(Debug, Deserialize)]
pub struct OptimizeRequest {
    /// Inline wells; the loaded table is used when absent
    #[serde(default)]
    pub wells: Option<Vec<Well>>,
    #[serde(default)]
    pub field: Option<String>,
    #[serde(default)]
    pub except_field: Option<String>,
    pub target_flow: f64,
    #[serde(default)]
    pub horizon_days: Option<u32>,
    #[serde(default)]
    pub max_subset_size: Option<usize>,
    /// Protected wells
    #[serde(default)]
    pub excluded: Vec<String>,
    #[serde(default)]
    pub approximate: bool,
}

#[derive(Debug, Serialize)]
pub struct OptimizeResponse {
    /// `null` when no combination reaches the target
    pub plan: Option<ClosurePlan>,
    pub status: SearchStatus,
    /// Completed without approximation: the plan is provably minimal
    pub exact: bool,
    pub field: FieldFilter,
    pub target_flow_m3_d: f64,
    pub horizon_days: u32,
    pub max_subset_size: usize,
    pub approximation: Option<ApproximationPolicy>,
    pub statistics: SearchStatistics,
}

// ============================================================================
// Handlers
// ============================================================================

/// `GET /health`
pub async fn health(State(state): State<ApiState>) -> Response {
    envelope::ok(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        wells_loaded: state.table.as_ref().map(|t| t.len()),
    })
}

/// `GET /wells?field=&except_field=`
pub async fn list_wells(
    State(state): State<ApiState>,
    Query(query): Query<FieldQuery>,
) -> Result<Response, ApiError> {
    let table = state
        .table
        .as_ref()
        .ok_or_else(|| ApiError::new(ErrorCode::NoWellTable, "no well table loaded"))?;

    let filter = FieldFilter::from_options(query.field.as_deref(), query.except_field.as_deref());
    let wells = table.select(&filter).producing().into_wells();
    Ok(envelope::ok(WellsResponse {
        filter,
        fields: table.fields(),
        wells,
    }))
}

/// `POST /optimize`
pub async fn optimize(
    State(state): State<ApiState>,
    body: Result<Json<OptimizeRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(body) = body?;

    let filter = FieldFilter::from_options(body.field.as_deref(), body.except_field.as_deref());
    let wells = match (body.wells, state.table.as_ref()) {
        // Inline wells go to the optimizer untouched so bad values are reported
        (Some(inline), _) => WellTable::from_wells(inline).select(&filter).into_wells(),
        (None, Some(table)) => table.select(&filter).producing().into_wells(),
        (None, None) => {
            return Err(ApiError::new(
                ErrorCode::NoWellTable,
                "no well table loaded; send wells inline",
            ));
        }
    };

    let search = &state.config.search;
    let horizon_days = body.horizon_days.unwrap_or(search.default_horizon_days);
    let max_subset_size = body.max_subset_size.unwrap_or(search.default_max_subset_size);

    {
        let unknown: Vec<&String> = body
            .excluded
            .iter()
            .filter(|id| !wells.iter().any(|w| &w.id == *id))
            .collect();
        if !unknown.is_empty() {
            warn!(wells = ?unknown, "Ignoring protected wells not in the candidate list");
        }
    }

    let mut request = ClosureRequest::new(wells, body.target_flow, horizon_days, max_subset_size)
        .exclude(body.excluded);
    if body.approximate {
        request = request.with_approximation(state.config.approximation.policy());
    }

    let time_limit = search.time_limit();
    let result = tokio::task::spawn_blocking(move || {
        let mut monitor = CompositeMonitor::new().with(LogMonitor::default());
        if let Some(limit) = time_limit {
            monitor.add_monitor(TimeLimitMonitor::new(limit));
        }
        ClosureOptimizer::search(&request, &mut monitor).map(|outcome| (request, outcome))
    })
    .await;

    let (request, outcome) = match result {
        Ok(Ok(done)) => done,
        Ok(Err(e)) => return Err(ApiError::from(&e)),
        Err(e) => {
            warn!(error = %e, "Closure search worker failed");
            return Err(ApiError::new(ErrorCode::SearchFailed, "closure search failed"));
        }
    };

    info!(
        field = %filter,
        status = %outcome.status,
        has_plan = outcome.plan.is_some(),
        "Optimize request served"
    );
    Ok(envelope::ok(OptimizeResponse {
        exact: outcome.is_exact(),
        plan: outcome.plan,
        status: outcome.status,
        field: filter,
        target_flow_m3_d: request.target_flow_m3_d,
        horizon_days: request.horizon_days,
        max_subset_size: request.max_subset_size,
        approximation: outcome.approximation,
        statistics: outcome.statistics,
    }))
}

/// Fallback for unknown paths.
pub async fn not_found() -> Response {
    ApiError::new(ErrorCode::NotFound, "no such endpoint").into_response()
}
