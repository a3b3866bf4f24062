//! Property labels referenced by corrections.
//!
//! Tag names vary per vessel integration; only the labels shared across the
//! fleet live here. Vessel-specific raw tags are spelled out in the catalog.

pub const SHAFT_SPEED: &str = "Shaft Speed";
pub const SHAFT_POWER: &str = "Shaft Power";
pub const SHAFT_TORQUE: &str = "Shaft Torque";

pub const SPEED_THROUGH_WATER: &str = "Speed Through Water";
pub const SENSOR_STW: &str = "Sensor Speed Through Water";
pub const MODELED_STW: &str = "Modeled Speed Through Water";
pub const SPEED_OVER_GROUND: &str = "Speed Over Ground";
pub const OBSERVED_SPEED: &str = "Observed Speed";

pub const HEADING: &str = "Heading";
pub const DRAFT_AFT: &str = "Draft Aft";
pub const DRAFT_FWD: &str = "Draft Fwd";
pub const DRAFT_MID_1: &str = "Draft Mid 1";
pub const DRAFT_MID_2: &str = "Draft Mid 2";
pub const TRIM: &str = "Trim";

pub const MAIN_ENGINE_FUEL_CONSUMPTION: &str = "Main Engine Fuel Consumption";
pub const GENERATOR_FUEL_CONSUMPTION: &str = "Generator Fuel Consumption";
pub const TOTAL_FUEL_CONSUMPTION: &str = "Total Fuel Consumption";

pub const AIS_LATITUDE: &str = "AIS Latitude";
pub const AIS_LONGITUDE: &str = "AIS Longitude";

/// Weather-service (hindcast) inputs
pub mod weather {
    pub const TRUE_WIND_SPEED: &str = "WS True Wind Speed";
    pub const TRUE_WIND_DIR: &str = "WS True Wind Direction";
    pub const SEA_CURRENT_SPEED: &str = "WS Sea Current Speed";
    pub const SEA_CURRENT_DIR: &str = "WS Sea Current Direction";
    pub const SIG_WAVE_HEIGHT: &str = "WS Significant Wave Height";
}

/// Prefix carried by every value sourced from a noon report.
pub const NOON_PREFIX: &str = "(Noon) ";

/// Label of the noon-report counterpart of `label`.
pub fn noon(label: &str) -> String {
    format!("{NOON_PREFIX}{label}")
}

pub const NOON_LATITUDE: &str = "(Noon) Latitude";
pub const NOON_LONGITUDE: &str = "(Noon) Longitude";

/// Unit tags understood by the downstream unit table.
pub mod units {
    pub const KILOWATTS: &str = "kW";
    pub const MEGAWATTS: &str = "MW";
    pub const KNOTS: &str = "kn";
}
