// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 MuVeraAI Corporation

use std::collections::HashMap;

use trustsignal_core::{
    config::Config,
    config_loader::{load_config, load_config_from_lookup, load_config_from_str, validate_config, ConfigError},
    types::{AgentPersona, Easing, GradePolicy, OperationalStatus, PulseSpeed},
};

fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> =
        pairs.iter().map(|(key, value)| (key.to_string(), value.to_string())).collect();
    move |key| vars.get(key).cloned()
}

// ── TOML ─────────────────────────────────────────────────────────────────

#[test]
fn empty_toml_yields_defaults() {
    let config = load_config_from_str("").unwrap();
    assert_eq!(config, Config::default());
}

#[test]
fn partial_toml_overrides_only_named_keys() {
    let config = load_config_from_str(
        r#"
        grade_policy = "decayed"

        [decay]
        floor = 0.3

        [personas.markets]
        speed_multiplier = 1.5
        easing = "glass"
        "#,
    )
    .unwrap();

    assert_eq!(config.grade_policy, GradePolicy::Decayed);
    assert_eq!(config.decay.floor, 0.3);
    assert_eq!(config.decay.rate_per_minute, 0.8);
    assert_eq!(config.personas.get(AgentPersona::Markets).speed_multiplier, 1.5);
    assert_eq!(config.personas.get(AgentPersona::Markets).easing, Easing::Glass);
    assert_eq!(config.personas.get(AgentPersona::Sentinel).speed_multiplier, 0.9);
    assert_eq!(config.freshness.stale_secs, 300.0);
}

#[test]
fn full_toml_is_accepted() {
    let config = load_config_from_str(
        r#"
        base_duration_secs        = 0.4
        reduced_motion_multiplier = 0.0
        alert_repetitions         = 5
        emergency_opacity         = 0.6
        grade_policy              = "raw"
        reevaluation_interval_ms  = 5000

        [freshness]
        critical_secs = 5.0
        warning_secs  = 30.0
        stale_secs    = 120.0

        [decay]
        rate_per_minute = 0.9
        floor           = 0.6

        [grade_cutoffs]
        excellent = 95.0
        good      = 80.0
        fair      = 60.0
        poor      = 40.0

        [statuses.degraded]
        speed_multiplier = 0.8
        opacity_modifier = 0.85
        should_pulse     = true
        pulse_speed      = "medium"
        "#,
    )
    .unwrap();

    assert_eq!(config.alert_repetitions, 5);
    assert_eq!(config.reevaluation_interval_ms, 5000);
    assert_eq!(config.grade_cutoffs.excellent, 95.0);
    let degraded = config.statuses.get(OperationalStatus::Degraded);
    assert_eq!(degraded.pulse_speed, PulseSpeed::Medium);
    assert_eq!(degraded.opacity_modifier, 0.85);
}

#[test]
fn unordered_freshness_thresholds_are_rejected() {
    let err = load_config_from_str(
        r#"
        [freshness]
        critical_secs = 60.0
        warning_secs  = 10.0
        "#,
    )
    .unwrap_err();
    assert!(matches!(err, ConfigError::InvalidRange { ref field, .. } if field == "freshness"));
}

#[test]
fn decay_rate_above_one_is_rejected() {
    let err = load_config_from_str("[decay]\nrate_per_minute = 1.5\n").unwrap_err();
    assert!(matches!(err, ConfigError::InvalidRange { ref field, .. } if field == "decay.rate_per_minute"));
}

#[test]
fn status_speed_above_one_is_rejected() {
    let err = load_config_from_str(
        "[statuses.fault]\nspeed_multiplier = 1.5\nopacity_modifier = 1.0\nshould_pulse = true\npulse_speed = \"fast\"\n",
    )
    .unwrap_err();
    assert!(matches!(err, ConfigError::InvalidRange { ref field, .. } if field == "statuses.fault"));
}

#[test]
fn emergency_opacity_below_the_visible_floor_is_rejected() {
    let err = load_config_from_str("emergency_opacity = 0.2\n").unwrap_err();
    assert!(matches!(err, ConfigError::InvalidRange { ref field, .. } if field == "emergency_opacity"));

    let config = load_config_from_str("emergency_opacity = 0.5\n").unwrap();
    assert_eq!(config.emergency_opacity, 0.5);
}

#[test]
fn malformed_toml_is_a_parse_error() {
    let err = load_config_from_str("base_duration_secs = \"slow\"").unwrap_err();
    assert!(matches!(err, ConfigError::TomlParse { .. }));
}

#[test]
fn missing_file_is_a_read_error() {
    let err = load_config("/nonexistent/trustsignal/engine.toml").unwrap_err();
    match err {
        ConfigError::FileRead { path, .. } => assert!(path.ends_with("engine.toml")),
        other => panic!("expected FileRead, got {other:?}"),
    }
}

#[test]
fn defaults_pass_validation() {
    validate_config(&Config::default()).unwrap();
}

// ── Environment ──────────────────────────────────────────────────────────

#[test]
fn unset_environment_yields_defaults() {
    let config = load_config_from_lookup(|_| None).unwrap();
    assert_eq!(config, Config::default());
}

#[test]
fn environment_overrides_scalars() {
    let config = load_config_from_lookup(lookup_from(&[
        ("TRUSTSIGNAL_DECAY_RATE_PER_MINUTE", "0.9"),
        ("TRUSTSIGNAL_FRESHNESS_CRITICAL_SECS", " 5 "),
        ("TRUSTSIGNAL_BASE_DURATION_SECS", "1.0"),
        ("TRUSTSIGNAL_GRADE_POLICY", "DECAYED"),
        ("TRUSTSIGNAL_REEVALUATION_INTERVAL_MS", "1000"),
    ]))
    .unwrap();

    assert_eq!(config.decay.rate_per_minute, 0.9);
    assert_eq!(config.freshness.critical_secs, 5.0);
    assert_eq!(config.base_duration_secs, 1.0);
    assert_eq!(config.grade_policy, GradePolicy::Decayed);
    assert_eq!(config.reevaluation_interval_ms, 1000);
}

#[test]
fn unparsable_environment_value_names_the_variable() {
    let err = load_config_from_lookup(lookup_from(&[("TRUSTSIGNAL_DECAY_FLOOR", "half")])).unwrap_err();
    match err {
        ConfigError::ParseField { field, value, .. } => {
            assert_eq!(field, "TRUSTSIGNAL_DECAY_FLOOR");
            assert_eq!(value, "half");
        }
        other => panic!("expected ParseField, got {other:?}"),
    }
}

#[test]
fn non_finite_environment_value_is_rejected() {
    let err = load_config_from_lookup(lookup_from(&[("TRUSTSIGNAL_DECAY_FLOOR", "NaN")])).unwrap_err();
    assert!(matches!(err, ConfigError::ParseField { .. }));
}

#[test]
fn unknown_grade_policy_is_rejected() {
    let err = load_config_from_lookup(lookup_from(&[("TRUSTSIGNAL_GRADE_POLICY", "median")])).unwrap_err();
    assert!(matches!(err, ConfigError::ParseField { ref field, .. } if field == "TRUSTSIGNAL_GRADE_POLICY"));
}

#[test]
fn zero_interval_fails_validation() {
    let err = load_config_from_lookup(lookup_from(&[("TRUSTSIGNAL_REEVALUATION_INTERVAL_MS", "0")])).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidRange { .. }));
}

#[test]
fn errors_render_readable_messages() {
    let err = load_config_from_lookup(lookup_from(&[("TRUSTSIGNAL_DECAY_FLOOR", "1.5")])).unwrap_err();
    assert_eq!(err.to_string(), "field \"decay.floor\": value \"1.5\" out of range: must be in [0, 1]");
}
