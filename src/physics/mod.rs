//! Physics Module
//!
//! Deterministic vessel-performance calculations used by corrections.
//! All math here is closed-form; nothing is fitted at runtime.
//!
//! - `scalar_projection()` - Resolve a wind/current vector onto the heading axis
//! - `modeled_stw()` - Fixed-coefficient speed-through-water estimate

pub mod stw_model;

pub use stw_model::{modeled_stw, StwInputs, STW_BIAS, STW_COEFFICIENTS};

/// Project a vector of `speed` blowing/flowing towards `direction` onto a
/// vessel `heading`.
///
/// Direction and heading are compass bearings in degrees.
/// `projection = speed * cos(direction - heading)`
pub fn scalar_projection(speed: f64, direction: f64, heading: f64) -> f64 {
    speed * (direction - heading).to_radians().cos()
}
