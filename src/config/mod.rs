//! Closure Configuration Module
//!
//! Search defaults, approximation policy, data source and server settings
//! loaded from TOML, so operators can tune the tool without code changes.
//!
//! ## Loading Order
//!
//! 1. `WELL_CLOSURE_CONFIG` environment variable (path to TOML file)
//! 2. `closure_config.toml` in the current working directory
//! 3. Built-in defaults
//!
//! ## Usage
//!
//! Load once at startup and pass the value (or an `Arc` of it) to whoever
//! needs it:
//!
//! ```ignore
//! let config = ClosureConfig::load();
//! let horizon = config.search.default_horizon_days;
//! ```

mod closure_config;
pub mod validation;

pub use closure_config::*;
