//! In-memory feature series
//!
//! An ordered run of samples for one vessel, with a cursor that exposes a
//! single sample through [`PropertyCalc`] / [`PropertyClean`] while still
//! reaching its neighbours. Serialized as JSON by the command-line tool.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{PropertyCalc, PropertyClean};
use crate::types::{Position, ShipId};

/// One timestamped sample.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FeatureRecord {
    pub time: DateTime<Utc>,
    /// Named values; a `null` entry is a property that exists but is unset.
    #[serde(default)]
    pub properties: BTreeMap<String, Option<f64>>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub units: BTreeMap<String, String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

impl FeatureRecord {
    pub fn new(time: DateTime<Utc>) -> Self {
        Self {
            time,
            properties: BTreeMap::new(),
            units: BTreeMap::new(),
            latitude: None,
            longitude: None,
        }
    }

    pub fn with_property(mut self, label: &str, value: f64) -> Self {
        self.properties.insert(label.to_string(), Some(value));
        self
    }

    pub fn with_unit(mut self, label: &str, unit: &str) -> Self {
        self.units.insert(label.to_string(), unit.to_string());
        self
    }

    pub fn with_position(mut self, latitude: f64, longitude: f64) -> Self {
        self.latitude = Some(latitude);
        self.longitude = Some(longitude);
        self
    }

    pub fn get(&self, label: &str) -> Option<f64> {
        self.properties.get(label).copied().flatten()
    }

    pub fn position(&self) -> Option<Position> {
        Some(Position::new(self.latitude?, self.longitude?))
    }
}

/// Ordered samples for a single vessel.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FeatureSeries {
    pub ship_id: ShipId,
    #[serde(default)]
    pub samples: Vec<FeatureRecord>,
}

impl FeatureSeries {
    pub fn new(ship_id: ShipId) -> Self {
        Self {
            ship_id,
            samples: Vec::new(),
        }
    }

    pub fn push(&mut self, record: FeatureRecord) {
        self.samples.push(record);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Sort samples by time so neighbour lookups follow the timeline.
    pub fn sort_by_time(&mut self) {
        self.samples.sort_by_key(|r| r.time);
    }

    /// Cursor on the sample at `index`, if it exists.
    pub fn cursor(&mut self, index: usize) -> Option<SeriesCursor<'_>> {
        (index < self.samples.len()).then_some(SeriesCursor {
            series: self,
            index,
        })
    }
}

/// One sample of a [`FeatureSeries`], with access to its neighbours.
pub struct SeriesCursor<'a> {
    series: &'a mut FeatureSeries,
    index: usize,
}

impl SeriesCursor<'_> {
    pub fn index(&self) -> usize {
        self.index
    }

    fn current(&self) -> &FeatureRecord {
        &self.series.samples[self.index]
    }

    fn current_mut(&mut self) -> &mut FeatureRecord {
        &mut self.series.samples[self.index]
    }

    fn neighbour(&self, offset: isize) -> Option<&FeatureRecord> {
        self.index
            .checked_add_signed(offset)
            .and_then(|i| self.series.samples.get(i))
    }
}

impl PropertyCalc for SeriesCursor<'_> {
    fn ship_id(&self) -> ShipId {
        self.series.ship_id
    }

    fn time(&self) -> DateTime<Utc> {
        self.current().time
    }

    fn property(&self, label: &str) -> Option<f64> {
        self.current().get(label)
    }

    fn set_property(&mut self, label: &str, value: Option<f64>) {
        self.current_mut()
            .properties
            .insert(label.to_string(), value);
    }

    fn unit_for_property(&self, label: &str) -> Option<String> {
        self.current().units.get(label).cloned()
    }

    fn set_property_with_unit(&mut self, label: &str, value: f64, unit: &str) {
        let record = self.current_mut();
        record.properties.insert(label.to_string(), Some(value));
        record.units.insert(label.to_string(), unit.to_string());
    }

    fn position(&self) -> Option<Position> {
        self.current().position()
    }

    fn set_position(&mut self, latitude: Option<f64>, longitude: Option<f64>) {
        let record = self.current_mut();
        record.latitude = latitude;
        record.longitude = longitude;
    }

    fn previous_position(&self) -> Option<Position> {
        self.neighbour(-1).and_then(FeatureRecord::position)
    }

    fn property_at_offset(&self, label: &str, offset: isize) -> Option<f64> {
        self.neighbour(offset).and_then(|r| r.get(label))
    }
}

impl PropertyClean for SeriesCursor<'_> {
    fn as_calc_mut(&mut self) -> &mut dyn PropertyCalc {
        self
    }

    fn null_property(&mut self, label: &str) {
        if let Some(value) = self.current_mut().properties.get_mut(label) {
            *value = None;
        }
    }

    fn null_prefixed_properties(&mut self, prefix: &str) {
        self.current_mut()
            .properties
            .iter_mut()
            .filter(|(label, _)| label.starts_with(prefix))
            .for_each(|(_, value)| *value = None);
    }

    fn null_all_properties(&mut self) {
        self.current_mut()
            .properties
            .values_mut()
            .for_each(|value| *value = None);
    }
}
