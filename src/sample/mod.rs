//! Sample capabilities consumed by the correction engine
//!
//! The feature pipeline owns its samples; corrections only see them through
//! these traits:
//!
//! - [`PropertyCalc`]: the base capability every sample offers (identity,
//!   time, nullable named values, unit tags, position, neighbour lookups)
//! - [`PropertyClean`]: the destructive superset needed by bulk-clear
//!   corrections
//!
//! Which one a sample supports is decided once, where the pipeline hands the
//! sample over, by wrapping it in a [`SampleRef`].

mod series;

pub use series::{FeatureRecord, FeatureSeries, SeriesCursor};

use chrono::{DateTime, Utc};

use crate::types::{Position, ShipId};

/// Read/write access to one timestamped sample of one vessel.
///
/// Absent values are `None`; reads never fail.
pub trait PropertyCalc {
    fn ship_id(&self) -> ShipId;

    fn time(&self) -> DateTime<Utc>;

    fn property(&self, label: &str) -> Option<f64>;

    /// Write a value, or null it with `None`. The unit tag is left as is.
    fn set_property(&mut self, label: &str, value: Option<f64>);

    fn unit_for_property(&self, label: &str) -> Option<String>;

    fn set_property_with_unit(&mut self, label: &str, value: f64, unit: &str);

    /// Current position; `None` unless both axes are present.
    fn position(&self) -> Option<Position>;

    /// Write both axes at once. Passing `None` nulls that axis.
    fn set_position(&mut self, latitude: Option<f64>, longitude: Option<f64>);

    /// Position of the preceding sample in the sequence.
    fn previous_position(&self) -> Option<Position>;

    /// Value of `label` on the sample `offset` steps away in the sequence.
    fn property_at_offset(&self, label: &str, offset: isize) -> Option<f64>;

    /// Value of `label` on the preceding sample.
    fn previous_property(&self, label: &str) -> Option<f64> {
        self.property_at_offset(label, -1)
    }
}

/// Bulk-clear capability required by clean transforms.
pub trait PropertyClean: PropertyCalc {
    /// View of the same sample through the base capability.
    fn as_calc_mut(&mut self) -> &mut dyn PropertyCalc;

    fn null_property(&mut self, label: &str);

    fn null_prefixed_properties(&mut self, prefix: &str);

    fn null_all_properties(&mut self);
}

/// A sample handed to the engine, tagged with the capability it supports.
pub enum SampleRef<'a> {
    Basic(&'a mut dyn PropertyCalc),
    Clearable(&'a mut dyn PropertyClean),
}

impl SampleRef<'_> {
    pub fn ship_id(&self) -> ShipId {
        match self {
            Self::Basic(s) => s.ship_id(),
            Self::Clearable(s) => s.ship_id(),
        }
    }

    pub fn time(&self) -> DateTime<Utc> {
        match self {
            Self::Basic(s) => s.time(),
            Self::Clearable(s) => s.time(),
        }
    }

    pub fn calc(&mut self) -> &mut dyn PropertyCalc {
        match self {
            Self::Basic(s) => {
                let calc: &mut dyn PropertyCalc = &mut **s;
                calc
            }
            Self::Clearable(s) => s.as_calc_mut(),
        }
    }

    /// The bulk-clear view, if this sample supports it.
    pub fn clean(&mut self) -> Option<&mut dyn PropertyClean> {
        match self {
            Self::Basic(_) => None,
            Self::Clearable(s) => {
                let clean: &mut dyn PropertyClean = &mut **s;
                Some(clean)
            }
        }
    }

    pub fn is_clearable(&self) -> bool {
        matches!(self, Self::Clearable(_))
    }
}
