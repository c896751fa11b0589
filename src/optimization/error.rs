//! Error types for closure requests and searches

use thiserror::Error;

/// Input rejected before any search work is done.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("well list is empty")]
    EmptyWellList,

    #[error("well at position {0} has a blank identifier")]
    BlankWellId(usize),

    #[error("duplicate well identifier '{0}'")]
    DuplicateWell(String),

    #[error("well '{well}' has negative flow {flow} m³/d")]
    NegativeFlow { well: String, flow: f64 },

    #[error("well '{well}' has a non-finite {field}")]
    NonFiniteValue { well: String, field: &'static str },

    #[error("target flow must be a finite, non-negative number (got {0})")]
    InvalidTarget(f64),

    #[error("horizon must be at least one day")]
    NonPositiveHorizon,

    #[error("maximum number of wells to combine must be at least 1")]
    InvalidSubsetCap,

    #[error(
        "approximation needs top_n >= 1 and max_subset_size >= 1 \
         (got top_n={top_n}, max_subset_size={max_subset_size})"
    )]
    InvalidApproximation { top_n: usize, max_subset_size: usize },

    #[error("{quantity} could overflow: the worst-case sum is not a finite number")]
    NumericOverflow { quantity: &'static str },
}

/// Failure of an optimizer invocation.
///
/// "No combination reaches the target" is not an error; it is `Ok(None)`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClosureError {
    #[error("invalid closure request: {0}")]
    Validation(#[from] ValidationError),

    #[error(
        "search space too large: combinations of up to {max_subset_size} wells \
         out of {candidates} exceed the countable range"
    )]
    SearchSpaceTooLarge {
        candidates: usize,
        max_subset_size: usize,
    },
}

impl ClosureError {
    /// Whether the caller supplied bad input (as opposed to an unsearchable request).
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}
