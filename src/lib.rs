//! Vessel Cleanup: targeted corrections for historical vessel telemetry
//!
//! Patches individual computed samples as they flow through the feature
//! pipeline, for known sensor faults, unit mismatches, tag renames and
//! outages on specific vessels over specific date ranges.
//!
//! ## Architecture
//!
//! - **Catalog**: Declarative correction records (ship, window, stage, steps)
//! - **Cleanup Engine**: Compiles records into ordered per-sample guards per stage
//! - **Physics**: Modeled speed-through-water from weather/current projections
//! - **Pipeline**: Sweeps a feature series through the pre and post stages

pub mod catalog;
pub mod cleanup;
pub mod config;
pub mod physics;
pub mod pipeline;
pub mod sample;
pub mod types;

// Re-export configuration
pub use config::{CleanupConfig, ConfigError};

// Re-export commonly used types
pub use types::{Bound, Position, ShipId, Stage, TimeWindow};

// Re-export engine
pub use cleanup::{
    compile, compile_with_clock, CleanupError, CleanupRule, Clock, Guard, GuardOutcome,
};

// Re-export sample capabilities
pub use sample::{FeatureRecord, FeatureSeries, PropertyCalc, PropertyClean, SampleRef};

pub use catalog::{CatalogError, RuleSpec};
pub use physics::modeled_stw;
pub use pipeline::{AnatomyStep, CleanupPass, PassStats};
