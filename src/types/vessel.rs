//! Vessel identity, position and processing stage

use serde::{Deserialize, Serialize};

/// Integer identity of a vessel, as assigned by the fleet registry.
pub type ShipId = i64;

/// Geographic position in decimal degrees.
///
/// Always read and written as a pair; a correction that touches one axis
/// re-writes the other with the value it just read.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Position {
    pub latitude: f64,
    pub longitude: f64,
}

impl Position {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// True when both axes sit exactly on the origin (a common "no fix" marker).
    pub fn is_origin(&self) -> bool {
        self.latitude == 0.0 && self.longitude == 0.0
    }
}

/// Point in the feature pipeline at which a correction runs.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Before vessel-specific derived features are computed
    #[serde(rename = "pre-vessel-anatomy", alias = "pre")]
    PreVesselAnatomy,
    /// After vessel-specific derived features are computed
    #[serde(rename = "post-vessel-anatomy", alias = "post")]
    PostVesselAnatomy,
}

impl Stage {
    pub const ALL: [Stage; 2] = [Stage::PreVesselAnatomy, Stage::PostVesselAnatomy];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PreVesselAnatomy => "pre-vessel-anatomy",
            Self::PostVesselAnatomy => "post-vessel-anatomy",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
