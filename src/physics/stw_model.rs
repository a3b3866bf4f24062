//! Modeled speed-through-water
//!
//! Linear model over propulsion, loading, sea state and the wind/current
//! components along the vessel heading. Used where the log speed sensor is
//! known to be unreliable.

use super::scalar_projection;
use crate::sample::PropertyCalc;
use crate::types::labels::{self, weather};

/// Coefficients in term order: shaft speed, aft draft, trim, significant wave
/// height, current², current, wind, wind².
pub const STW_COEFFICIENTS: [f64; 8] = [
    0.191_637_416,
    -0.153_619_789,
    -0.123_217_962,
    -0.324_622_524,
    0.057_272_980,
    0.044_914_439,
    -0.035_553_420,
    -0.000_633_009,
];

/// Constant term (knots).
pub const STW_BIAS: f64 = 1.4246;

/// Physical inputs to the model, all required.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StwInputs {
    pub shaft_speed: f64,
    pub draft_aft: f64,
    pub trim: f64,
    pub sig_wave_height: f64,
    pub heading: f64,
    pub wind_speed: f64,
    pub wind_direction: f64,
    pub current_speed: f64,
    pub current_direction: f64,
}

impl StwInputs {
    /// Read every input from the sample; `None` if any one is absent.
    pub fn from_sample(sample: &dyn PropertyCalc) -> Option<Self> {
        Some(Self {
            shaft_speed: sample.property(labels::SHAFT_SPEED)?,
            draft_aft: sample.property(labels::DRAFT_AFT)?,
            trim: sample.property(labels::TRIM)?,
            sig_wave_height: sample.property(weather::SIG_WAVE_HEIGHT)?,
            heading: sample.property(labels::HEADING)?,
            wind_speed: sample.property(weather::TRUE_WIND_SPEED)?,
            wind_direction: sample.property(weather::TRUE_WIND_DIR)?,
            current_speed: sample.property(weather::SEA_CURRENT_SPEED)?,
            current_direction: sample.property(weather::SEA_CURRENT_DIR)?,
        })
    }

    /// Wind component along the heading.
    pub fn wind_projection(&self) -> f64 {
        scalar_projection(self.wind_speed, self.wind_direction, self.heading)
    }

    /// Sea current component along the heading.
    pub fn current_projection(&self) -> f64 {
        scalar_projection(self.current_speed, self.current_direction, self.heading)
    }

    pub fn evaluate(&self) -> f64 {
        let [c_shaft, c_draft, c_trim, c_wave, c_cur2, c_cur, c_wind, c_wind2] = STW_COEFFICIENTS;
        let wind = self.wind_projection();
        let current = self.current_projection();

        c_shaft * self.shaft_speed
            + c_draft * self.draft_aft
            + c_trim * self.trim
            + c_wave * self.sig_wave_height
            + c_cur2 * current * current
            + c_cur * current
            + c_wind * wind
            + c_wind2 * wind * wind
            + STW_BIAS
    }
}

/// Estimated speed through water for the sample, or `None` when any physical
/// input is missing. No defaults are substituted.
pub fn modeled_stw(sample: &dyn PropertyCalc) -> Option<f64> {
    StwInputs::from_sample(sample).map(|inputs| inputs.evaluate())
}
