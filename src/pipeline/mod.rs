//! Correction Pass Module
//!
//! The boundary between the feature pipeline and the correction engine.
//!
//! ```text
//! STAGE 1: pre-vessel-anatomy guards   (every sample, catalog order)
//! STAGE 2: vessel-anatomy computation  (external, via AnatomyStep)
//! STAGE 3: post-vessel-anatomy guards  (every sample, catalog order)
//! ```
//!
//! Guards are compiled once per pass; each sample is run through every guard
//! of the current stage before the next sample is considered.

pub mod processing_loop;

pub use processing_loop::{AnatomyStep, CleanupPass, PassStats};
