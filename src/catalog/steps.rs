//! Transform steps as catalog data

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::cleanup::transforms::{self, Condition, Limit};
use crate::cleanup::{CalcFn, CleanFn};
use crate::sample::{PropertyCalc, PropertyClean};

/// A correction through the base sample capability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CalcStep {
    SetNull {
        labels: Vec<String>,
    },
    SetConstant {
        labels: Vec<String>,
        value: f64,
    },
    Alias {
        from: String,
        to: String,
    },
    AliasWithUnit {
        from: String,
        to: String,
    },
    /// `label = source * factor`; scales in place when `source` is omitted
    Scale {
        label: String,
        #[serde(default)]
        source: Option<String>,
        factor: f64,
    },
    ZeroWithinEpsilon {
        labels: Vec<String>,
        epsilon: f64,
    },
    ReplaceNear {
        label: String,
        target: f64,
        epsilon: f64,
        replacement: f64,
    },
    NullOutsideRange {
        labels: Vec<String>,
        #[serde(default)]
        min: Option<f64>,
        #[serde(default)]
        max: Option<f64>,
    },
    /// Null every limited label as soon as any one breaches its limit
    NullGroupIfAnyOutside {
        limits: Vec<Limit>,
    },
    /// Null labels reading above `above` while the `when` condition holds
    NullWhen {
        labels: Vec<String>,
        above: f64,
        when: Condition,
    },
    Interpolate {
        label: String,
    },
    /// `from`/`to` patterns carry `{n}`, substituted with `1..=count`
    RetagNumbered {
        from: String,
        to: String,
        count: u32,
        unit: String,
    },
    NegateLatitude,
    NegateLongitude,
    RemovePosition,
    OverridePositionSign,
    CopyPreviousPosition,
    PositionFrom {
        latitude: String,
        longitude: String,
        #[serde(default)]
        only_when_missing: bool,
    },
    CaptureModeledStw,
    UseModeledStw,
}

impl CalcStep {
    pub fn into_fn(self) -> CalcFn {
        match self {
            Self::SetNull { labels } => Arc::new(transforms::set_null(labels)),
            Self::SetConstant { labels, value } => {
                Arc::new(transforms::set_constant(labels, value))
            }
            Self::Alias { from, to } => Arc::new(transforms::alias(from, to)),
            Self::AliasWithUnit { from, to } => Arc::new(transforms::alias_with_unit(from, to)),
            Self::Scale {
                label,
                source,
                factor,
            } => Arc::new(transforms::scale(label, source, factor)),
            Self::ZeroWithinEpsilon { labels, epsilon } => {
                let clips: Vec<_> = labels
                    .into_iter()
                    .map(|label| transforms::set_zero_if_within_epsilon(label, epsilon))
                    .collect();
                Arc::new(move |pc: &mut dyn PropertyCalc| {
                    for clip in &clips {
                        clip(&mut *pc);
                    }
                })
            }
            Self::ReplaceNear {
                label,
                target,
                epsilon,
                replacement,
            } => Arc::new(transforms::replace_near(label, target, epsilon, replacement)),
            Self::NullOutsideRange { labels, min, max } => {
                let checks: Vec<_> = labels
                    .into_iter()
                    .map(|label| transforms::null_outside_range(label, min, max))
                    .collect();
                Arc::new(move |pc: &mut dyn PropertyCalc| {
                    for check in &checks {
                        check(&mut *pc);
                    }
                })
            }
            Self::NullGroupIfAnyOutside { limits } => {
                Arc::new(transforms::null_group_if_any_outside(limits))
            }
            Self::NullWhen {
                labels,
                above,
                when,
            } => Arc::new(transforms::null_when(labels, above, when)),
            Self::Interpolate { label } => Arc::new(transforms::interpolate_from_neighbours(label)),
            Self::RetagNumbered {
                from,
                to,
                count,
                unit,
            } => Arc::new(transforms::retag_numbered(from, to, count, unit)),
            Self::NegateLatitude => Arc::new(transforms::negate_latitude),
            Self::NegateLongitude => Arc::new(transforms::negate_longitude),
            Self::RemovePosition => Arc::new(transforms::remove_position),
            Self::OverridePositionSign => Arc::new(transforms::override_position_sign),
            Self::CopyPreviousPosition => Arc::new(transforms::copy_previous_position),
            Self::PositionFrom {
                latitude,
                longitude,
                only_when_missing,
            } => Arc::new(transforms::position_from(
                latitude,
                longitude,
                only_when_missing,
            )),
            Self::CaptureModeledStw => Arc::new(transforms::capture_modeled_stw),
            Self::UseModeledStw => Arc::new(transforms::use_modeled_stw),
        }
    }
}

/// A correction that needs the bulk-clear capability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CleanStep {
    NullAll,
    NullNoon,
    NullPrefixed { prefix: String },
    RemovePosition,
}

impl CleanStep {
    pub fn into_fn(self) -> CleanFn {
        match self {
            Self::NullAll => Arc::new(transforms::null_all_features),
            Self::NullNoon => Arc::new(transforms::null_noon_features),
            Self::NullPrefixed { prefix } => Arc::new(transforms::null_prefixed(prefix)),
            Self::RemovePosition => Arc::new(|pc: &mut dyn PropertyClean| {
                transforms::remove_position(pc.as_calc_mut());
            }),
        }
    }
}
