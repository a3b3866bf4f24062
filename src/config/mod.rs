//! Cleanup Configuration Module
//!
//! Run-time knobs for the correction pass, loaded from TOML.
//!
//! ## Loading Order
//!
//! 1. `VESSEL_CLEANUP_CONFIG` environment variable (path to TOML file)
//! 2. `cleanup_config.toml` in the current working directory
//! 3. Built-in defaults (all rules, wall-clock evaluation, built-in catalog)
//!
//! ## Example
//!
//! ```toml
//! [engine]
//! run_conditional = false             # only unconditional corrections
//! evaluation_cutoff = "2024-01-01"    # open-ended rules stop here
//!
//! [catalog]
//! include_builtin = true
//! extra_paths = ["site_rules.toml"]
//! ```

mod cleanup_config;
pub mod defaults;

pub use cleanup_config::*;
