//! Shared data structures for vessel telemetry correction
//!
//! This module defines the primitives every other subsystem speaks:
//! - Vessel identity and geographic position
//! - Processing stages (before / after the vessel-anatomy computation)
//! - Open time windows with optionally unbounded ends
//! - Property label constants used by the correction catalog

mod vessel;
mod window;
pub mod labels;

pub use vessel::*;
pub use window::*;
