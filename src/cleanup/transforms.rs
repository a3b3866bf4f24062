//! Reusable correction primitives.
//!
//! Builders return closures ready to hang off a [`CleanupRule`](super::CleanupRule);
//! plain functions can be passed directly. Position transforms always write
//! latitude and longitude together, re-using the axis they don't change.

use serde::{Deserialize, Serialize};

use crate::physics::modeled_stw;
use crate::sample::{PropertyCalc, PropertyClean};
use crate::types::labels;

fn owned<I, S>(labels: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    labels.into_iter().map(Into::into).collect()
}

// ============================================================================
// Property values
// ============================================================================

/// Null every listed property.
pub fn set_null<I, S>(labels: I) -> impl Fn(&mut dyn PropertyCalc) + Send + Sync + 'static
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let labels = owned(labels);
    move |pc| {
        for label in &labels {
            pc.set_property(label, None);
        }
    }
}

/// Overwrite every listed property with a constant.
pub fn set_constant<I, S>(
    labels: I,
    value: f64,
) -> impl Fn(&mut dyn PropertyCalc) + Send + Sync + 'static
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let labels = owned(labels);
    move |pc| {
        for label in &labels {
            pc.set_property(label, Some(value));
        }
    }
}

/// Copy `from` into `to`, nulls included.
pub fn alias(
    from: impl Into<String>,
    to: impl Into<String>,
) -> impl Fn(&mut dyn PropertyCalc) + Send + Sync + 'static {
    let (from, to) = (from.into(), to.into());
    move |pc| {
        let value = pc.property(&from);
        pc.set_property(&to, value);
    }
}

/// Copy `from` into `to` with `from`'s unit tag, only when `from` is present.
pub fn alias_with_unit(
    from: impl Into<String>,
    to: impl Into<String>,
) -> impl Fn(&mut dyn PropertyCalc) + Send + Sync + 'static {
    let (from, to) = (from.into(), to.into());
    move |pc| {
        let Some(value) = pc.property(&from) else {
            return;
        };
        match pc.unit_for_property(&from) {
            Some(unit) => pc.set_property_with_unit(&to, value, &unit),
            None => pc.set_property(&to, Some(value)),
        }
    }
}

/// `target = source * factor` when the source is present.
///
/// With no separate source the target is scaled in place.
pub fn scale(
    target: impl Into<String>,
    source: Option<String>,
    factor: f64,
) -> impl Fn(&mut dyn PropertyCalc) + Send + Sync + 'static {
    let target = target.into();
    let source = source.unwrap_or_else(|| target.clone());
    move |pc| {
        if let Some(value) = pc.property(&source) {
            pc.set_property(&target, Some(value * factor));
        }
    }
}

/// Clip instrument noise: a present value with `|v| < epsilon` becomes exactly zero.
pub fn set_zero_if_within_epsilon(
    label: impl Into<String>,
    epsilon: f64,
) -> impl Fn(&mut dyn PropertyCalc) + Send + Sync + 'static {
    let label = label.into();
    move |pc| {
        if let Some(value) = pc.property(&label) {
            if value.abs() < epsilon {
                pc.set_property(&label, Some(0.0));
            }
        }
    }
}

/// Replace a known bad reading: a value within `epsilon` of `target` becomes `replacement`.
pub fn replace_near(
    label: impl Into<String>,
    target: f64,
    epsilon: f64,
    replacement: f64,
) -> impl Fn(&mut dyn PropertyCalc) + Send + Sync + 'static {
    let label = label.into();
    move |pc| {
        if let Some(value) = pc.property(&label) {
            if (value - target).abs() < epsilon {
                pc.set_property(&label, Some(replacement));
            }
        }
    }
}

fn outside(value: f64, min: Option<f64>, max: Option<f64>) -> bool {
    min.is_some_and(|m| value < m) || max.is_some_and(|m| value > m)
}

/// Null a present value that falls outside `[min, max]`.
pub fn null_outside_range(
    label: impl Into<String>,
    min: Option<f64>,
    max: Option<f64>,
) -> impl Fn(&mut dyn PropertyCalc) + Send + Sync + 'static {
    let label = label.into();
    move |pc| {
        if pc.property(&label).is_some_and(|v| outside(v, min, max)) {
            pc.set_property(&label, None);
        }
    }
}

/// Bounds on one property, breached strictly below `min` or above `max`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Limit {
    pub label: String,
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
}

impl Limit {
    pub fn breached_by(&self, pc: &dyn PropertyCalc) -> bool {
        pc.property(&self.label)
            .is_some_and(|v| outside(v, self.min, self.max))
    }
}

/// Null every limited property together once any one of them breaches its limit.
///
/// Readings that only make sense as a set (shaft power and shaft speed) are
/// dropped as a set.
pub fn null_group_if_any_outside(
    limits: Vec<Limit>,
) -> impl Fn(&mut dyn PropertyCalc) + Send + Sync + 'static {
    move |pc| {
        if limits.iter().any(|limit| limit.breached_by(&*pc)) {
            for limit in &limits {
                pc.set_property(&limit.label, None);
            }
        }
    }
}

/// Test on one property: strictly above `above` and strictly below `below`,
/// whichever are given. An absent value never satisfies it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Condition {
    pub label: String,
    #[serde(default)]
    pub above: Option<f64>,
    #[serde(default)]
    pub below: Option<f64>,
}

impl Condition {
    pub fn holds(&self, pc: &dyn PropertyCalc) -> bool {
        pc.property(&self.label)
            .is_some_and(|v| within(v, self.above, self.below))
    }
}

fn within(value: f64, above: Option<f64>, below: Option<f64>) -> bool {
    above.map_or(true, |a| value > a) && below.map_or(true, |b| value < b)
}

/// Null each listed property whose own value is strictly above `above`
/// while `when` holds on the sample.
///
/// `when` is read once, before any listed property is touched.
pub fn null_when<I, S>(
    labels: I,
    above: f64,
    when: Condition,
) -> impl Fn(&mut dyn PropertyCalc) + Send + Sync + 'static
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let labels = owned(labels);
    move |pc| {
        if !when.holds(&*pc) {
            return;
        }
        for label in &labels {
            if pc.property(label).is_some_and(|v| v > above) {
                pc.set_property(label, None);
            }
        }
    }
}

/// Replace the value with the mean of the previous and next samples, when both exist.
pub fn interpolate_from_neighbours(
    label: impl Into<String>,
) -> impl Fn(&mut dyn PropertyCalc) + Send + Sync + 'static {
    let label = label.into();
    move |pc| {
        let prev = pc.previous_property(&label);
        let next = pc.property_at_offset(&label, 1);
        if let (Some(prev), Some(next)) = (prev, next) {
            pc.set_property(&label, Some((prev + next) / 2.0));
        }
    }
}

/// Move numbered tags to a new name with a fixed unit, e.g.
/// `"M/G {n} Power"` → `"Generator {n} Power"` in kW for `n` in `1..=count`.
pub fn retag_numbered(
    from_pattern: impl Into<String>,
    to_pattern: impl Into<String>,
    count: u32,
    unit: impl Into<String>,
) -> impl Fn(&mut dyn PropertyCalc) + Send + Sync + 'static {
    let (from_pattern, to_pattern, unit) = (from_pattern.into(), to_pattern.into(), unit.into());
    move |pc| {
        for n in 1..=count {
            let n = n.to_string();
            let from = from_pattern.replace("{n}", &n);
            if let Some(value) = pc.property(&from) {
                pc.set_property_with_unit(&to_pattern.replace("{n}", &n), value, &unit);
            }
        }
    }
}

// ============================================================================
// Position
// ============================================================================

/// Flip the sign of the latitude, keeping the longitude as read.
pub fn negate_latitude(pc: &mut dyn PropertyCalc) {
    if let Some(pos) = pc.position() {
        pc.set_position(Some(-pos.latitude), Some(pos.longitude));
    }
}

/// Flip the sign of the longitude, keeping the latitude as read.
pub fn negate_longitude(pc: &mut dyn PropertyCalc) {
    if let Some(pos) = pc.position() {
        pc.set_position(Some(pos.latitude), Some(-pos.longitude));
    }
}

/// Drop the position entirely.
pub fn remove_position(pc: &mut dyn PropertyCalc) {
    pc.set_position(None, None);
}

/// Restore hemisphere signs from the noon report when the sensor only
/// delivers magnitudes.
pub fn override_position_sign(pc: &mut dyn PropertyCalc) {
    let (Some(noon_lat), Some(noon_lon), Some(mut pos)) = (
        pc.property(labels::NOON_LATITUDE),
        pc.property(labels::NOON_LONGITUDE),
        pc.position(),
    ) else {
        return;
    };

    if noon_lat < 0.0 && pos.latitude > 0.0 {
        pos.latitude = -pos.latitude;
    }
    if noon_lon < 0.0 && pos.longitude > 0.0 {
        pos.longitude = -pos.longitude;
    }
    pc.set_position(Some(pos.latitude), Some(pos.longitude));
}

/// Carry the previous sample's position forward.
pub fn copy_previous_position(pc: &mut dyn PropertyCalc) {
    if let Some(prev) = pc.previous_position() {
        pc.set_position(Some(prev.latitude), Some(prev.longitude));
    }
}

/// Take the position from alternate latitude/longitude tags.
///
/// With `only_when_missing`, the primary position is kept unless it is absent
/// or sits on the origin.
pub fn position_from(
    latitude: impl Into<String>,
    longitude: impl Into<String>,
    only_when_missing: bool,
) -> impl Fn(&mut dyn PropertyCalc) + Send + Sync + 'static {
    let (latitude, longitude) = (latitude.into(), longitude.into());
    move |pc| {
        if only_when_missing && pc.position().is_some_and(|p| !p.is_origin()) {
            return;
        }
        if let (Some(lat), Some(lon)) = (pc.property(&latitude), pc.property(&longitude)) {
            pc.set_position(Some(lat), Some(lon));
        }
    }
}

// ============================================================================
// Modeled speed through water
// ============================================================================

/// Keep the sensor STW aside and store the modeled estimate when it can be computed.
pub fn capture_modeled_stw(pc: &mut dyn PropertyCalc) {
    let sensor = pc.property(labels::SPEED_THROUGH_WATER);
    pc.set_property(labels::SENSOR_STW, sensor);
    if let Some(modeled) = modeled_stw(pc) {
        pc.set_property(labels::MODELED_STW, Some(modeled));
    }
}

/// Replace STW with the modeled estimate captured earlier in the stage.
pub fn use_modeled_stw(pc: &mut dyn PropertyCalc) {
    let modeled = pc.property(labels::MODELED_STW);
    pc.set_property(labels::SPEED_THROUGH_WATER, modeled);
}

// ============================================================================
// Bulk clear
// ============================================================================

pub fn null_all_features(pc: &mut dyn PropertyClean) {
    pc.null_all_properties();
}

pub fn null_noon_features(pc: &mut dyn PropertyClean) {
    pc.null_prefixed_properties(labels::NOON_PREFIX);
}

pub fn null_prefixed(
    prefix: impl Into<String>,
) -> impl Fn(&mut dyn PropertyClean) + Send + Sync + 'static {
    let prefix = prefix.into();
    move |pc| pc.null_prefixed_properties(&prefix)
}
