//! Well Closure Optimizer
//!
//! Decides which producing wells to shut in temporarily so that total water
//! output drops by at least a target volume, while losing as little profit as
//! possible over the shutdown period.
//!
//! ## Architecture
//!
//! - **Optimization**: exhaustive, monitored subset search with an opt-in
//!   bounded approximation
//! - **Loader**: caller-owned well tables read from spreadsheet CSV exports
//! - **Report**: operator-facing rendering of plans
//! - **API**: Axum HTTP surface over the optimizer

pub mod api;
pub mod config;
pub mod loader;
pub mod optimization;
pub mod report;
pub mod types;

// Re-export configuration
pub use config::ClosureConfig;

// Re-export commonly used types
pub use types::{
    ApproximationPolicy, ClosurePlan, ClosureRequest, FieldFilter, SearchOutcome, SearchStatus,
    Well,
};

// Re-export the optimizer
pub use optimization::{optimize, ClosureError, ClosureOptimizer, ValidationError};

// Re-export the data source
pub use loader::{LoadError, WellTable};
