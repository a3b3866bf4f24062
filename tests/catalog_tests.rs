//! Catalog Integration Tests
//!
//! Runs the built-in correction records and file-based catalogs through a
//! full cleanup pass.

use chrono::{DateTime, TimeZone, Utc};
use vessel_cleanup::catalog::{self, CatalogError};
use vessel_cleanup::config::CatalogConfig;
use vessel_cleanup::physics::StwInputs;
use vessel_cleanup::types::labels::{self, weather};
use vessel_cleanup::{CleanupPass, Clock, FeatureRecord, FeatureSeries, Position, Stage};

fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
}

fn builtin_pass() -> CleanupPass {
    let rules = catalog::builtin().unwrap();
    CleanupPass::new(&rules, false, Clock::System).unwrap()
}

fn stw_inputs() -> StwInputs {
    StwInputs {
        shaft_speed: 70.0,
        draft_aft: 11.2,
        trim: 0.6,
        sig_wave_height: 1.8,
        heading: 90.0,
        wind_speed: 12.0,
        wind_direction: 45.0,
        current_speed: 0.8,
        current_direction: 270.0,
    }
}

fn voyage_record(time: DateTime<Utc>, sensor_stw: f64) -> FeatureRecord {
    let i = stw_inputs();
    FeatureRecord::new(time)
        .with_property(labels::SPEED_THROUGH_WATER, sensor_stw)
        .with_property(labels::SHAFT_SPEED, i.shaft_speed)
        .with_property(labels::DRAFT_AFT, i.draft_aft)
        .with_property(labels::TRIM, i.trim)
        .with_property(labels::HEADING, i.heading)
        .with_property(weather::SIG_WAVE_HEIGHT, i.sig_wave_height)
        .with_property(weather::TRUE_WIND_SPEED, i.wind_speed)
        .with_property(weather::TRUE_WIND_DIR, i.wind_direction)
        .with_property(weather::SEA_CURRENT_SPEED, i.current_speed)
        .with_property(weather::SEA_CURRENT_DIR, i.current_direction)
}

// ============================================================================
// Built-in catalog
// ============================================================================

#[test]
fn builtin_catalog_has_no_unattributed_records() {
    let rules = catalog::builtin().unwrap();
    assert!(rules.iter().all(|r| !r.issue.trim().is_empty()));
    assert!(rules.iter().any(|r| r.stage == Stage::PreVesselAnatomy));
    assert!(rules.iter().any(|r| r.stage == Stage::PostVesselAnatomy));
}

#[test]
fn modeled_stw_replaces_log_speed_after_cutover() {
    let pass = builtin_pass();
    let mut series = FeatureSeries::new(1);
    series.push(voyage_record(at(2017, 6, 1, 12), 13.1));
    series.push(voyage_record(at(2019, 6, 1, 12), 13.1));

    pass.run_stage(Stage::PostVesselAnatomy, &mut series);

    let expected = stw_inputs().evaluate();
    for record in &series.samples {
        assert_eq!(record.get(labels::SENSOR_STW), Some(13.1));
        let modeled = record.get(labels::MODELED_STW).unwrap();
        assert!((modeled - expected).abs() < 1e-12);
    }
    assert_eq!(series.samples[0].get(labels::SPEED_THROUGH_WATER), Some(13.1));
    assert_eq!(
        series.samples[1].get(labels::SPEED_THROUGH_WATER),
        series.samples[1].get(labels::MODELED_STW)
    );
}

#[test]
fn modeled_stw_absent_when_inputs_missing() {
    let pass = builtin_pass();
    let mut series = FeatureSeries::new(1);
    series.push(
        FeatureRecord::new(at(2019, 6, 1, 12))
            .with_property(labels::SPEED_THROUGH_WATER, 13.1)
            .with_property(labels::SHAFT_SPEED, 70.0),
    );

    pass.run_stage(Stage::PostVesselAnatomy, &mut series);

    let record = &series.samples[0];
    assert_eq!(record.get(labels::SENSOR_STW), Some(13.1));
    assert_eq!(record.get(labels::MODELED_STW), None);
    assert_eq!(record.get(labels::SPEED_THROUGH_WATER), None);
}

#[test]
fn builtin_bulk_clear_wipes_early_samples_only() {
    let pass = builtin_pass();
    let mut series = FeatureSeries::new(133);
    for time in [at(2021, 3, 1, 0), at(2021, 3, 19, 0)] {
        series.push(
            FeatureRecord::new(time)
                .with_property(labels::SHAFT_POWER, 8000.0)
                .with_property(labels::noon("Latitude").as_str(), 10.0)
                .with_position(10.0, 20.0),
        );
    }

    pass.run_stage(Stage::PreVesselAnatomy, &mut series);
    assert_eq!(series.samples[0].get(labels::SHAFT_POWER), Some(8000.0));

    pass.run_stage(Stage::PostVesselAnatomy, &mut series);

    let early = &series.samples[0];
    assert!(early.properties.values().all(Option::is_none));
    assert_eq!(early.position(), None);

    let late = &series.samples[1];
    assert_eq!(late.get(labels::SHAFT_POWER), Some(8000.0));
    assert_eq!(late.position(), Some(Position::new(10.0, 20.0)));
}

#[test]
fn builtin_interpolation_uses_neighbours() {
    let pass = builtin_pass();
    let mut series = FeatureSeries::new(389);
    for (hour, value) in [(3, 1.0), (5, 99.0), (7, 2.0)] {
        series.push(FeatureRecord::new(at(2021, 1, 3, hour)).with_property("AE_LSFO_t_h", value));
    }

    pass.run_stage(Stage::PreVesselAnatomy, &mut series);

    let values: Vec<_> = series.samples.iter().map(|r| r.get("AE_LSFO_t_h")).collect();
    assert_eq!(values, [Some(1.0), Some(1.5), Some(2.0)]);
}

const LOW_LEVEL_FLOWS: [&str; 12] = [
    "ME_HSFO_t_h",
    "ME_LSFO_t_h",
    "ME_MDO_t_h",
    "ME_MGO_t_h",
    "AE_HSFO_t_h",
    "AE_LSFO_t_h",
    "AE_MDO_t_h",
    "AE_MGO_t_h",
    "BLR_HSFO_t_h",
    "BLR_LSFO_t_h",
    "BLR_MDO_t_h",
    "BLR_MGO_t_h",
];

fn run_ship_72(record: FeatureRecord) -> FeatureRecord {
    let pass = builtin_pass();
    let mut series = FeatureSeries::new(72);
    series.push(record);
    pass.run_stage(Stage::PreVesselAnatomy, &mut series);
    series.samples.remove(0)
}

#[test]
fn implausible_shaft_reading_drops_power_and_speed_together() {
    let out = run_ship_72(
        FeatureRecord::new(at(2019, 6, 1, 0))
            .with_property(labels::SHAFT_POWER, 40000.0)
            .with_property(labels::SHAFT_SPEED, 100.0),
    );
    assert_eq!(out.get(labels::SHAFT_POWER), None);
    assert_eq!(out.get(labels::SHAFT_SPEED), None);

    let out = run_ship_72(
        FeatureRecord::new(at(2019, 6, 1, 0))
            .with_property(labels::SHAFT_POWER, 12000.0)
            .with_property(labels::SHAFT_SPEED, 150.0),
    );
    assert_eq!(out.get(labels::SHAFT_POWER), None);
    assert_eq!(out.get(labels::SHAFT_SPEED), None);

    let out = run_ship_72(
        FeatureRecord::new(at(2019, 6, 1, 0))
            .with_property(labels::SHAFT_POWER, 12000.0)
            .with_property(labels::SHAFT_SPEED, 100.0),
    );
    assert_eq!(out.get(labels::SHAFT_POWER), Some(12000.0));
    assert_eq!(out.get(labels::SHAFT_SPEED), Some(100.0));
}

#[test]
fn low_level_flow_dropped_at_low_shaft_power() {
    for flow in LOW_LEVEL_FLOWS {
        let idle = run_ship_72(
            FeatureRecord::new(at(2019, 6, 1, 0))
                .with_property(labels::SHAFT_POWER, 1000.0)
                .with_property(flow, 2.5),
        );
        assert_eq!(idle.get(flow), None, "{flow} at low power");

        let loaded = run_ship_72(
            FeatureRecord::new(at(2019, 6, 1, 0))
                .with_property(labels::SHAFT_POWER, 9000.0)
                .with_property(flow, 2.5),
        );
        assert_eq!(loaded.get(flow), Some(2.5), "{flow} under load");

        let over_range = run_ship_72(
            FeatureRecord::new(at(2019, 6, 1, 0))
                .with_property(labels::SHAFT_POWER, 9000.0)
                .with_property(flow, 3.5),
        );
        assert_eq!(over_range.get(flow), None, "{flow} above meter range");
    }
}

#[test]
fn builtin_windows_and_stages() {
    use Stage::{PostVesselAnatomy as Post, PreVesselAnatomy as Pre};

    let specs = catalog::builtin_specs().unwrap();
    let cases: [(&str, i64, Option<&str>, Option<&str>, Stage, &str); 21] = [
        ("NAUT-1439", 3, Some("2017-09-26 21:00"), Some("2017-10-05 01:00"), Pre, "set_null"),
        ("NAUT-2259", 45, Some("2019-07-27 21:00"), None, Pre, "scale"),
        ("NAUT-2022", 72, None, None, Pre, "null_group_if_any_outside"),
        ("NAUT-1860", 1, None, None, Post, "capture_modeled_stw"),
        ("NAUT-1860", 1, Some("2018-03-01 00:00"), None, Post, "use_modeled_stw"),
        ("DPI-807", 7, Some("2020-07-22 14:00"), Some("2020-09-22 00:00"), Post, "alias_with_unit"),
        ("DPI-920", 971, Some("2020-01-01 00:00"), Some("2021-01-01 00:00"), Post, "override_position_sign"),
        ("DPI-922", 207, Some("2020-01-01 00:00"), Some("2020-09-30 06:00"), Post, "retag_numbered"),
        ("DPI-925", 896, Some("2020-10-02 04:00"), Some("2020-10-02 20:00"), Post, "negate_latitude"),
        ("ENG-476", 431, None, Some("2020-11-25 00:00"), Pre, "alias"),
        ("ENG-477", 303, None, Some("2020-10-27 11:00"), Pre, "position_from"),
        ("ENG-461", 122, Some("2020-10-29 00:00"), Some("2020-11-02 00:00"), Post, "replace_near"),
        ("ENG-756", 132, Some("2021-01-25 20:00:00"), Some("2021-01-25 22:00:00"), Pre, "copy_previous_position"),
        ("ENG-576", 389, Some("2021-01-03 04:00"), Some("2021-01-03 06:00"), Pre, "interpolate"),
        ("ENG-756", 133, None, Some("2021-03-18"), Post, "null_all"),
        ("ENG-756", 134, None, Some("2021-03-20"), Post, "null_noon"),
        ("ENG-850", 128, None, None, Pre, "zero_within_epsilon"),
        ("VOTR-10", 520, Some("2022-04-20 04:00:00"), None, Post, "set_constant"),
        ("DPI-1680", 351, Some("2021-06-21 23:00:00"), Some("2021-06-24 11:00:00"), Post, "remove_position"),
        ("DMT-743", 110, Some("2021-04-04 00:00"), Some("2021-04-28 00:00"), Post, "null_all"),
        ("ENG-1340", 119, Some("2022-04-28 00:00"), Some("2022-04-28 17:00"), Post, "scale"),
    ];

    for (issue, ship, start, end, stage, kind) in cases {
        let found: Vec<_> = specs
            .iter()
            .filter(|s| s.issue == issue && s.ship_id == ship && s.start.as_deref() == start)
            .collect();
        assert_eq!(found.len(), 1, "{issue} ship {ship} from {start:?}");

        let spec = found[0];
        assert_eq!(spec.end.as_deref(), end, "{issue} ship {ship}");
        assert_eq!(spec.stage, stage, "{issue} ship {ship}");

        let first = match (spec.calc.first(), spec.clean.first()) {
            (Some(step), _) => serde_json::to_value(step).unwrap(),
            (None, Some(step)) => serde_json::to_value(step).unwrap(),
            (None, None) => panic!("{issue} ship {ship} has no steps"),
        };
        assert_eq!(first["kind"], kind, "{issue} ship {ship}");
    }
}

#[test]
fn builtin_conditional_rule_skipped_when_unconditional_only() {
    let rules = catalog::builtin().unwrap();
    let record = || {
        FeatureRecord::new(at(2017, 10, 1, 0))
            .with_property(labels::SHAFT_SPEED, 80.0)
            .with_property(labels::SHAFT_POWER, 9000.0)
    };

    let mut all = FeatureSeries::new(3);
    all.push(record());
    CleanupPass::new(&rules, false, Clock::System)
        .unwrap()
        .run_stage(Stage::PreVesselAnatomy, &mut all);
    assert_eq!(all.samples[0].get(labels::SHAFT_POWER), None);

    let mut unconditional = FeatureSeries::new(3);
    unconditional.push(record());
    CleanupPass::new(&rules, true, Clock::System)
        .unwrap()
        .run_stage(Stage::PreVesselAnatomy, &mut unconditional);
    assert_eq!(unconditional.samples[0].get(labels::SHAFT_POWER), Some(9000.0));
}

// ============================================================================
// Extra catalogs
// ============================================================================

const EXTRA: &str = r#"
[[rule]]
issue = "OPS-12"
comment = "Speed log reported in m/s"
ship_id = 900
start = "2022-01-01"
end = "2022-02-01"
stage = "pre-vessel-anatomy"
calc = [
    { kind = "scale", label = "Speed Through Water", factor = 1.943844 },
    { kind = "alias", from = "Speed Through Water", to = "Observed Speed" },
]
"#;

#[test]
fn extra_catalog_is_appended_after_builtin() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ops.toml");
    std::fs::write(&path, EXTRA).unwrap();

    let builtin_len = catalog::builtin().unwrap().len();
    let rules = catalog::load(&CatalogConfig {
        include_builtin: true,
        extra_paths: vec![path],
    })
    .unwrap();
    assert_eq!(rules.len(), builtin_len + 1);
    assert_eq!(rules[builtin_len].issue, "OPS-12");

    let pass = CleanupPass::new(&rules, false, Clock::System).unwrap();
    let mut series = FeatureSeries::new(900);
    series.push(FeatureRecord::new(at(2022, 1, 15, 0)).with_property(labels::SPEED_THROUGH_WATER, 5.0));
    pass.run_stage(Stage::PreVesselAnatomy, &mut series);

    let stw = series.samples[0].get(labels::SPEED_THROUGH_WATER).unwrap();
    assert!((stw - 9.71922).abs() < 1e-9);
    assert_eq!(series.samples[0].get(labels::OBSERVED_SPEED), Some(stw));
}

#[test]
fn extra_catalog_without_builtin() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ops.toml");
    std::fs::write(&path, EXTRA).unwrap();

    let rules = catalog::load(&CatalogConfig {
        include_builtin: false,
        extra_paths: vec![path],
    })
    .unwrap();
    assert_eq!(rules.len(), 1);
}

#[test]
fn missing_catalog_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = catalog::load(&CatalogConfig {
        include_builtin: false,
        extra_paths: vec![dir.path().join("absent.toml")],
    })
    .unwrap_err();
    assert!(matches!(err, CatalogError::Io { .. }));
}

#[test]
fn unattributed_record_fails_catalog_build() {
    let specs = catalog::parse_catalog(
        r#"
[[rule]]
issue = "OK-1"
ship_id = 1
stage = "pre"

[[rule]]
issue = "  "
ship_id = 2
stage = "post"
"#,
        "inline",
    )
    .unwrap();

    let err = catalog::build_rules(specs).unwrap_err();
    assert!(matches!(err, CatalogError::Rule(_)));
}

#[test]
fn bad_window_time_names_the_issue() {
    let specs = catalog::parse_catalog(
        r#"
[[rule]]
issue = "OPS-13"
ship_id = 1
start = "last tuesday"
stage = "pre-vessel-anatomy"
"#,
        "inline",
    )
    .unwrap();

    match catalog::build_rules(specs) {
        Err(CatalogError::InvalidTime { index, issue, .. }) => {
            assert_eq!(index, 0);
            assert_eq!(issue, "OPS-13");
        }
        other => panic!("expected InvalidTime, got {other:?}"),
    }
}

#[test]
fn unknown_step_kind_is_parse_error() {
    let err = catalog::parse_catalog(
        r#"
[[rule]]
issue = "OPS-14"
ship_id = 1
stage = "pre-vessel-anatomy"
calc = [{ kind = "teleport" }]
"#,
        "inline",
    )
    .unwrap_err();
    assert!(matches!(err, CatalogError::Parse { .. }));
}
