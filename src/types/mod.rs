//! Shared data structures for well closure planning
//!
//! - `Well` / `FieldFilter`: the record shape produced by the data loader
//! - `ClosureRequest`: one optimizer invocation
//! - `ClosurePlan` / `SearchOutcome`: what the optimizer hands back

mod closure;
mod well;

pub use closure::*;
pub use well::*;
