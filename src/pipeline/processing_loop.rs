//! Per-stage sweep over a feature series.

use serde::Serialize;
use tracing::info;

use crate::cleanup::{compile_with_clock, Clock, CleanupError, CleanupRule, Guard, GuardOutcome};
use crate::sample::{FeatureSeries, SampleRef};
use crate::types::Stage;

// ============================================================================
// Anatomy Step
// ============================================================================

/// The vessel-specific feature computation that runs between the two stages.
///
/// Pass `()` when the series has already been through it, or when only the
/// corrections are wanted.
pub trait AnatomyStep {
    fn compute(&mut self, series: &mut FeatureSeries);
}

/// No-op implementation.
impl AnatomyStep for () {
    fn compute(&mut self, _series: &mut FeatureSeries) {}
}

// ============================================================================
// Pass Statistics
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PassStats {
    /// Samples swept (counted once per stage)
    pub samples: u64,
    /// Guards that matched a sample
    pub corrections: u64,
    /// Matches whose clean step could not run
    pub clean_skipped: u64,
}

impl PassStats {
    fn record(&mut self, outcome: GuardOutcome) {
        match outcome {
            GuardOutcome::Applied => self.corrections += 1,
            GuardOutcome::CleanSkipped => {
                self.corrections += 1;
                self.clean_skipped += 1;
            }
            GuardOutcome::OtherShip | GuardOutcome::OutsideWindow => {}
        }
    }
}

impl std::ops::AddAssign for PassStats {
    fn add_assign(&mut self, other: Self) {
        self.samples += other.samples;
        self.corrections += other.corrections;
        self.clean_skipped += other.clean_skipped;
    }
}

// ============================================================================
// Cleanup Pass
// ============================================================================

/// Guards for both stages, compiled once.
#[derive(Debug, Clone)]
pub struct CleanupPass {
    pre: Vec<Guard>,
    post: Vec<Guard>,
}

impl CleanupPass {
    pub fn new(
        catalog: &[CleanupRule],
        only_unconditional: bool,
        clock: Clock,
    ) -> Result<Self, CleanupError> {
        Ok(Self {
            pre: compile_with_clock(catalog, Stage::PreVesselAnatomy, only_unconditional, clock)?,
            post: compile_with_clock(catalog, Stage::PostVesselAnatomy, only_unconditional, clock)?,
        })
    }

    pub fn guards(&self, stage: Stage) -> &[Guard] {
        match stage {
            Stage::PreVesselAnatomy => &self.pre,
            Stage::PostVesselAnatomy => &self.post,
        }
    }

    /// Run every guard of `stage` on one sample, in order.
    pub fn apply_to_sample(&self, stage: Stage, sample: &mut SampleRef<'_>) -> PassStats {
        let mut stats = PassStats {
            samples: 1,
            ..PassStats::default()
        };
        for guard in self.guards(stage) {
            stats.record(guard.apply(sample));
        }
        stats
    }

    /// Sweep one stage over the series, sample by sample.
    pub fn run_stage(&self, stage: Stage, series: &mut FeatureSeries) -> PassStats {
        let mut stats = PassStats::default();
        if self.guards(stage).is_empty() {
            stats.samples = series.len() as u64;
            return stats;
        }

        for index in 0..series.len() {
            let Some(mut cursor) = series.cursor(index) else {
                break;
            };
            stats += self.apply_to_sample(stage, &mut SampleRef::Clearable(&mut cursor));
        }

        info!(
            stage = %stage,
            ship_id = series.ship_id,
            samples = stats.samples,
            corrections = stats.corrections,
            "Cleanup stage complete"
        );
        stats
    }

    /// Pre stage, the anatomy step, then the post stage.
    pub fn run<A: AnatomyStep>(&self, series: &mut FeatureSeries, anatomy: &mut A) -> PassStats {
        let mut stats = self.run_stage(Stage::PreVesselAnatomy, series);
        anatomy.compute(series);
        stats += self.run_stage(Stage::PostVesselAnatomy, series);
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample::FeatureRecord;
    use chrono::{Duration, TimeZone, Utc};

    struct DoubleSpeed;

    impl AnatomyStep for DoubleSpeed {
        fn compute(&mut self, series: &mut FeatureSeries) {
            for record in &mut series.samples {
                if let Some(v) = record.get("Speed") {
                    record.properties.insert("Speed".into(), Some(v * 2.0));
                }
            }
        }
    }

    fn series() -> FeatureSeries {
        let t0 = Utc.with_ymd_and_hms(2022, 1, 1, 0, 0, 0).unwrap();
        let mut s = FeatureSeries::new(4);
        for i in 0..4 {
            s.push(FeatureRecord::new(t0 + Duration::hours(i)).with_property("Speed", 10.0));
        }
        s
    }

    #[test]
    fn test_stages_bracket_anatomy() {
        let catalog = vec![
            CleanupRule::new("PRE-1", 4, Stage::PreVesselAnatomy).calc(|pc| {
                pc.set_property("Speed", Some(1.0));
            }),
            CleanupRule::new("POST-1", 4, Stage::PostVesselAnatomy).calc(|pc| {
                let v = pc.property("Speed");
                pc.set_property("Anatomy Speed", v);
            }),
        ];
        let pass = CleanupPass::new(&catalog, false, Clock::System).unwrap();
        let mut s = series();
        let stats = pass.run(&mut s, &mut DoubleSpeed);

        assert_eq!(stats.samples, 8);
        assert_eq!(stats.corrections, 8);
        assert!(s.samples.iter().all(|r| r.get("Anatomy Speed") == Some(2.0)));
    }

    #[test]
    fn test_empty_stage_still_counts_samples() {
        let pass = CleanupPass::new(&[], false, Clock::System).unwrap();
        let mut s = series();
        let stats = pass.run(&mut s, &mut ());
        assert_eq!(stats, PassStats { samples: 8, corrections: 0, clean_skipped: 0 });
    }
}
