//! Search monitors: progress reporting and early-abort hooks
//!
//! The optimizer notifies a [`SearchMonitor`] on entry, after every evaluated
//! subset, on every incumbent improvement and on exit, and polls
//! [`SearchMonitor::search_command`] before each evaluation. Monitors are
//! combined with [`CompositeMonitor`].

mod composite;
mod evaluation_limit;
mod interrupt;
mod log;
mod no_op;
mod progress;
mod search_monitor;
mod time_limit;

pub use composite::CompositeMonitor;
pub use evaluation_limit::EvaluationLimitMonitor;
pub use interrupt::InterruptMonitor;
pub use log::LogMonitor;
pub use no_op::NoOpMonitor;
pub use progress::ProgressMonitor;
pub use search_monitor::{SearchCommand, SearchMonitor};
pub use time_limit::TimeLimitMonitor;
