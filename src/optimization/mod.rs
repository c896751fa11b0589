//! Well Closure Optimization Engine
//!
//! Chooses the set of wells to shut in so that the closed water flow reaches a
//! target at the lowest profit impact over the shutdown horizon. Exhaustive by
//! default, with an opt-in bounded approximation for large well lists.

mod approximation;
mod combinations;
mod error;
pub mod monitor;
mod optimizer;
mod validation;

pub use approximation::{truncate, Truncated};
pub use combinations::{binomial, subset_count, Combinations};
pub use error::{ClosureError, ValidationError};
pub use optimizer::{optimize, ClosureOptimizer};
pub use validation::{validate_request, validate_wells};
