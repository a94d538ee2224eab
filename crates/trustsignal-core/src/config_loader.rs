// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 MuVeraAI Corporation

//! Configuration loader for [`CompositionPipeline`](crate::pipeline::CompositionPipeline).
//!
//! Supports two load strategies:
//!
//! 1. **TOML file** — [`load_config`] reads and deserialises a TOML file into
//!    a [`Config`].  Omitted keys keep their defaults.
//! 2. **Environment variables** — [`load_config_from_env`] reads
//!    `TRUSTSIGNAL_`-prefixed scalars on top of the defaults.  Lookup tables
//!    (personas, statuses, grade cutoffs) are TOML-only.
//!
//! Both loaders validate the result with [`validate_config`].
//!
//! # File format
//!
//! ```toml
//! base_duration_secs       = 0.6
//! grade_policy             = "raw"     # "raw" | "decayed"
//! reevaluation_interval_ms = 30000
//!
//! [freshness]
//! critical_secs = 10.0
//! warning_secs  = 60.0
//! stale_secs    = 300.0
//!
//! [decay]
//! rate_per_minute = 0.8
//! floor           = 0.5
//!
//! [personas.markets]
//! speed_multiplier = 1.2
//! easing           = "bounceSoft"
//! ```
//!
//! # Environment variables
//!
//! | Variable                               | Type   | Default |
//! |----------------------------------------|--------|---------|
//! | `TRUSTSIGNAL_DECAY_RATE_PER_MINUTE`    | float  | 0.8     |
//! | `TRUSTSIGNAL_DECAY_FLOOR`              | float  | 0.5     |
//! | `TRUSTSIGNAL_FRESHNESS_CRITICAL_SECS`  | float  | 10      |
//! | `TRUSTSIGNAL_FRESHNESS_WARNING_SECS`   | float  | 60      |
//! | `TRUSTSIGNAL_FRESHNESS_STALE_SECS`     | float  | 300     |
//! | `TRUSTSIGNAL_BASE_DURATION_SECS`       | float  | 0.6     |
//! | `TRUSTSIGNAL_GRADE_POLICY`             | string | "raw"   |
//! | `TRUSTSIGNAL_REEVALUATION_INTERVAL_MS` | integer| 30000   |

#![cfg(feature = "config-loader")]

use std::fs;
use std::path::Path;

use thiserror::Error;
use tracing::info;

use crate::config::Config;
use crate::trust::{MAX_OPACITY, MIN_OPACITY};
use crate::types::{GradePolicy, OperationalStatus};

/// Errors that can occur while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required file could not be opened.
    #[error("failed to read config file \"{path}\": {source}")]
    FileRead { path: String, source: std::io::Error },
    /// The TOML content could not be deserialised.
    #[error("failed to parse TOML config: {source}")]
    TomlParse {
        #[from]
        source: toml::de::Error,
    },
    /// A field could not be parsed to its expected type.
    #[error("field \"{field}\": cannot parse \"{value}\": {reason}")]
    ParseField { field: String, value: String, reason: String },
    /// A field value is outside the permitted range.
    #[error("field \"{field}\": value \"{value}\" out of range: {reason}")]
    InvalidRange { field: String, value: String, reason: String },
}

// ---------------------------------------------------------------------------
// TOML loader
// ---------------------------------------------------------------------------

/// Load and validate a [`Config`] from a TOML file.
///
/// # Errors
///
/// Returns a [`ConfigError`] if the file cannot be read, the TOML does not
/// match the schema, or a value fails validation.
///
/// # Example
///
/// ```rust,no_run
/// use trustsignal_core::config_loader::load_config;
///
/// let config = load_config("/etc/trustsignal/engine.toml").unwrap();
/// println!("Decay floor: {}", config.decay.floor);
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| ConfigError::FileRead {
        path: path.display().to_string(),
        source,
    })?;
    let config = load_config_from_str(&content)?;
    info!(path = %path.display(), "loaded trustsignal config");
    Ok(config)
}

/// Parse and validate a [`Config`] from TOML text.
pub fn load_config_from_str(content: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(content)?;
    validate_config(&config)?;
    Ok(config)
}

// ---------------------------------------------------------------------------
// Environment variable loader
// ---------------------------------------------------------------------------

/// Load a [`Config`] from `TRUSTSIGNAL_`-prefixed environment variables.
///
/// Unset variables keep their defaults.
///
/// # Errors
///
/// Returns a [`ConfigError::ParseField`] if a variable cannot be parsed, or
/// a [`ConfigError::InvalidRange`] if the resulting config fails validation.
pub fn load_config_from_env() -> Result<Config, ConfigError> {
    let config = load_config_from_lookup(|key| std::env::var(key).ok())?;
    info!("loaded trustsignal config from environment");
    Ok(config)
}

/// Same as [`load_config_from_env`], reading variables through `lookup`.
///
/// ```rust
/// use trustsignal_core::{config_loader::load_config_from_lookup, types::GradePolicy};
///
/// let config = load_config_from_lookup(|key| match key {
///     "TRUSTSIGNAL_DECAY_FLOOR"  => Some("0.4".to_string()),
///     "TRUSTSIGNAL_GRADE_POLICY" => Some("Decayed".to_string()),
///     _ => None,
/// }).unwrap();
///
/// assert_eq!(config.decay.floor, 0.4);
/// assert_eq!(config.grade_policy, GradePolicy::Decayed);
/// ```
pub fn load_config_from_lookup<F>(lookup: F) -> Result<Config, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = Config::default();

    if let Some(value) = read_f64(&lookup, "TRUSTSIGNAL_DECAY_RATE_PER_MINUTE")? {
        config.decay.rate_per_minute = value;
    }
    if let Some(value) = read_f64(&lookup, "TRUSTSIGNAL_DECAY_FLOOR")? {
        config.decay.floor = value;
    }
    if let Some(value) = read_f64(&lookup, "TRUSTSIGNAL_FRESHNESS_CRITICAL_SECS")? {
        config.freshness.critical_secs = value;
    }
    if let Some(value) = read_f64(&lookup, "TRUSTSIGNAL_FRESHNESS_WARNING_SECS")? {
        config.freshness.warning_secs = value;
    }
    if let Some(value) = read_f64(&lookup, "TRUSTSIGNAL_FRESHNESS_STALE_SECS")? {
        config.freshness.stale_secs = value;
    }
    if let Some(value) = read_f64(&lookup, "TRUSTSIGNAL_BASE_DURATION_SECS")? {
        config.base_duration_secs = value;
    }
    if let Some(value) = lookup("TRUSTSIGNAL_GRADE_POLICY") {
        config.grade_policy = parse_grade_policy(&value)?;
    }
    if let Some(value) = lookup("TRUSTSIGNAL_REEVALUATION_INTERVAL_MS") {
        config.reevaluation_interval_ms =
            value.trim().parse::<u64>().map_err(|source| ConfigError::ParseField {
                field: "TRUSTSIGNAL_REEVALUATION_INTERVAL_MS".into(),
                value: value.clone(),
                reason: source.to_string(),
            })?;
    }

    validate_config(&config)?;
    Ok(config)
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Check every range constraint.  The pipeline stays total on a config that
/// fails here; validation exists to catch operator mistakes at load time.
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let freshness = config.freshness;
    ensure(
        freshness.critical_secs >= 0.0
            && freshness.critical_secs < freshness.warning_secs
            && freshness.warning_secs < freshness.stale_secs,
        "freshness",
        format!("{}/{}/{}", freshness.critical_secs, freshness.warning_secs, freshness.stale_secs),
        "thresholds must be non-negative and strictly ascending",
    )?;

    let rate = config.decay.rate_per_minute;
    ensure(rate > 0.0 && rate <= 1.0, "decay.rate_per_minute", rate.to_string(), "must be in (0, 1]")?;
    let floor = config.decay.floor;
    ensure((0.0..=1.0).contains(&floor), "decay.floor", floor.to_string(), "must be in [0, 1]")?;

    let cutoffs = config.grade_cutoffs;
    ensure(
        cutoffs.excellent <= 100.0
            && cutoffs.excellent > cutoffs.good
            && cutoffs.good > cutoffs.fair
            && cutoffs.fair > cutoffs.poor
            && cutoffs.poor >= 0.0,
        "grade_cutoffs",
        format!("{}/{}/{}/{}", cutoffs.excellent, cutoffs.good, cutoffs.fair, cutoffs.poor),
        "cutoffs must be strictly descending within [0, 100]",
    )?;

    let personas = [
        ("personas.operations", config.personas.operations),
        ("personas.markets", config.personas.markets),
        ("personas.sentinel", config.personas.sentinel),
        ("personas.governor", config.personas.governor),
    ];
    for (field, profile) in personas {
        ensure(
            profile.speed_multiplier > 0.0 && profile.speed_multiplier.is_finite(),
            field,
            profile.speed_multiplier.to_string(),
            "speed_multiplier must be a positive number",
        )?;
    }

    for status in OperationalStatus::ALL {
        let profile = config.statuses.get(status);
        let field = format!("statuses.{}", status.as_str());
        ensure(
            profile.speed_multiplier > 0.0 && profile.speed_multiplier <= 1.0,
            &field,
            profile.speed_multiplier.to_string(),
            "speed_multiplier must be in (0, 1]",
        )?;
        ensure(
            profile.opacity_modifier > 0.0 && profile.opacity_modifier <= 1.0,
            &field,
            profile.opacity_modifier.to_string(),
            "opacity_modifier must be in (0, 1]",
        )?;
    }

    ensure(
        config.base_duration_secs.is_finite() && config.base_duration_secs >= 0.0,
        "base_duration_secs",
        config.base_duration_secs.to_string(),
        "must be a non-negative number",
    )?;
    ensure(
        config.reduced_motion_multiplier >= 0.0 && config.reduced_motion_multiplier < 1.0,
        "reduced_motion_multiplier",
        config.reduced_motion_multiplier.to_string(),
        "must be in [0, 1)",
    )?;
    ensure(
        (MIN_OPACITY..=MAX_OPACITY).contains(&config.emergency_opacity),
        "emergency_opacity",
        config.emergency_opacity.to_string(),
        "must be in [0.5, 1]",
    )?;
    ensure(
        config.reevaluation_interval_ms > 0,
        "reevaluation_interval_ms",
        config.reevaluation_interval_ms.to_string(),
        "must be greater than zero",
    )
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

fn ensure(ok: bool, field: &str, value: String, reason: &str) -> Result<(), ConfigError> {
    if ok {
        Ok(())
    } else {
        Err(ConfigError::InvalidRange { field: field.into(), value, reason: reason.into() })
    }
}

fn read_f64<F>(lookup: &F, key: &str) -> Result<Option<f64>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(value) => match value.trim().parse::<f64>() {
            Ok(parsed) if parsed.is_finite() => Ok(Some(parsed)),
            Ok(_) => Err(ConfigError::ParseField {
                field: key.into(),
                value,
                reason: "expected a finite number".into(),
            }),
            Err(source) => Err(ConfigError::ParseField {
                field: key.into(),
                value,
                reason: source.to_string(),
            }),
        },
        None => Ok(None),
    }
}

fn parse_grade_policy(value: &str) -> Result<GradePolicy, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "raw" => Ok(GradePolicy::Raw),
        "decayed" => Ok(GradePolicy::Decayed),
        other => Err(ConfigError::ParseField {
            field: "TRUSTSIGNAL_GRADE_POLICY".into(),
            value: other.into(),
            reason: "expected one of: raw, decayed".into(),
        }),
    }
}
