// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 MuVeraAI Corporation

//! Engine-level configuration.
//!
//! [`Config`] holds every tunable constant and lookup table used by the
//! computation stages.  All fields have defaults, and the struct is marked
//! `#[serde(default)]`, so a partial TOML or JSON document overrides only
//! what it names and `Config::default()` is always a valid starting point.

use serde::{Deserialize, Serialize};

use crate::types::{AgentPersona, Easing, GradePolicy, OperationalStatus, PulseSpeed};

/// Top-level configuration for [`CompositionPipeline`](crate::pipeline::CompositionPipeline).
///
/// # Examples
///
/// ```rust
/// use trustsignal_core::config::{Config, DecayConfig};
///
/// let config = Config {
///     decay: DecayConfig { rate_per_minute: 0.9, floor: 0.6 },
///     ..Config::default()
/// };
/// assert_eq!(config.freshness.warning_secs, 60.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub freshness: FreshnessThresholds,
    pub decay: DecayConfig,
    pub grade_cutoffs: GradeCutoffs,
    pub personas: PersonaTable,
    pub statuses: StatusTable,
    /// Unscaled animation duration in seconds.
    pub base_duration_secs: f64,
    /// Factor every duration collapses to under reduced motion.
    pub reduced_motion_multiplier: f64,
    /// Pulses played for an alert before the steady state resumes.
    pub alert_repetitions: u8,
    /// Opacity forced by an active emergency override.
    pub emergency_opacity: f64,
    /// Grade derivation policy used when an evaluation does not pick one.
    pub grade_policy: GradePolicy,
    /// Period of the age-driven re-evaluation tick.
    pub reevaluation_interval_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            freshness: FreshnessThresholds::default(),
            decay: DecayConfig::default(),
            grade_cutoffs: GradeCutoffs::default(),
            personas: PersonaTable::default(),
            statuses: StatusTable::default(),
            base_duration_secs: 0.6,
            reduced_motion_multiplier: 0.01,
            alert_repetitions: 3,
            emergency_opacity: 0.7,
            grade_policy: GradePolicy::Raw,
            reevaluation_interval_ms: 30_000,
        }
    }
}

/// Ascending age thresholds, in seconds, separating the freshness tiers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FreshnessThresholds {
    pub critical_secs: f64,
    pub warning_secs: f64,
    pub stale_secs: f64,
}

impl Default for FreshnessThresholds {
    fn default() -> Self {
        Self { critical_secs: 10.0, warning_secs: 60.0, stale_secs: 300.0 }
    }
}

/// Exponential decay parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecayConfig {
    /// Fraction of confidence retained per minute of age.
    pub rate_per_minute: f64,
    /// Lowest fraction decay may reach.
    pub floor: f64,
}

impl Default for DecayConfig {
    fn default() -> Self {
        Self { rate_per_minute: 0.8, floor: 0.5 }
    }
}

/// Minimum scores (inclusive) for each grade above `suspect`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GradeCutoffs {
    pub excellent: f64,
    pub good: f64,
    pub fair: f64,
    pub poor: f64,
}

impl Default for GradeCutoffs {
    fn default() -> Self {
        Self { excellent: 90.0, good: 70.0, fair: 50.0, poor: 30.0 }
    }
}

// ---------------------------------------------------------------------------
// Persona table
// ---------------------------------------------------------------------------

/// Motion identity of one agent persona.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PersonaProfile {
    /// Values above 1.0 shorten durations.
    pub speed_multiplier: f64,
    pub easing: Easing,
}

impl PersonaProfile {
    /// Profile used for records with a missing or unknown persona.
    pub const FALLBACK: PersonaProfile = PersonaProfile {
        speed_multiplier: 1.0,
        easing: Easing::Organic,
    };
}

/// One [`PersonaProfile`] per [`AgentPersona`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonaTable {
    pub operations: PersonaProfile,
    pub markets: PersonaProfile,
    pub sentinel: PersonaProfile,
    pub governor: PersonaProfile,
}

impl PersonaTable {
    pub fn get(&self, persona: AgentPersona) -> PersonaProfile {
        match persona {
            AgentPersona::Operations => self.operations,
            AgentPersona::Markets    => self.markets,
            AgentPersona::Sentinel   => self.sentinel,
            AgentPersona::Governor   => self.governor,
        }
    }
}

impl Default for PersonaTable {
    fn default() -> Self {
        Self {
            operations: PersonaProfile { speed_multiplier: 1.0, easing: Easing::Organic },
            markets:    PersonaProfile { speed_multiplier: 1.2, easing: Easing::BounceSoft },
            sentinel:   PersonaProfile { speed_multiplier: 0.9, easing: Easing::Glass },
            governor:   PersonaProfile { speed_multiplier: 1.1, easing: Easing::EaseOutBack },
        }
    }
}

// ---------------------------------------------------------------------------
// Operational status table
// ---------------------------------------------------------------------------

/// Fixed presentation constants for one [`OperationalStatus`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatusProfile {
    /// Values below 1.0 slow motion down.
    pub speed_multiplier: f64,
    /// Scales the opacity produced by the layers beneath.
    pub opacity_modifier: f64,
    pub should_pulse: bool,
    /// Cadence used when `should_pulse` is set.
    pub pulse_speed: PulseSpeed,
}

/// One [`StatusProfile`] per [`OperationalStatus`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusTable {
    pub optimal: StatusProfile,
    pub nominal: StatusProfile,
    pub degraded: StatusProfile,
    pub maintenance: StatusProfile,
    pub fault: StatusProfile,
}

impl StatusTable {
    pub fn get(&self, status: OperationalStatus) -> StatusProfile {
        match status {
            OperationalStatus::Optimal     => self.optimal,
            OperationalStatus::Nominal     => self.nominal,
            OperationalStatus::Degraded    => self.degraded,
            OperationalStatus::Maintenance => self.maintenance,
            OperationalStatus::Fault       => self.fault,
        }
    }
}

impl Default for StatusTable {
    fn default() -> Self {
        Self {
            optimal: StatusProfile {
                speed_multiplier: 1.0,
                opacity_modifier: 1.0,
                should_pulse: false,
                pulse_speed: PulseSpeed::None,
            },
            nominal: StatusProfile {
                speed_multiplier: 1.0,
                opacity_modifier: 1.0,
                should_pulse: false,
                pulse_speed: PulseSpeed::None,
            },
            degraded: StatusProfile {
                speed_multiplier: 0.85,
                opacity_modifier: 0.9,
                should_pulse: true,
                pulse_speed: PulseSpeed::Slow,
            },
            maintenance: StatusProfile {
                speed_multiplier: 0.7,
                opacity_modifier: 0.75,
                should_pulse: true,
                pulse_speed: PulseSpeed::Slow,
            },
            fault: StatusProfile {
                speed_multiplier: 1.0,
                opacity_modifier: 1.0,
                should_pulse: true,
                pulse_speed: PulseSpeed::Fast,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_persona_table_matches_motion_identities() {
        let table = PersonaTable::default();
        assert_eq!(table.get(AgentPersona::Operations), PersonaProfile::FALLBACK);
        assert_eq!(table.get(AgentPersona::Markets).speed_multiplier, 1.2);
        assert_eq!(table.get(AgentPersona::Sentinel).easing, Easing::Glass);
        assert_eq!(table.get(AgentPersona::Governor).easing, Easing::EaseOutBack);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let json = r#"{ "decay": { "floor": 0.4 }, "alert_repetitions": 5 }"#;
        let config: Config = serde_json::from_str(json).expect("should parse");
        assert_eq!(config.decay.floor, 0.4);
        assert_eq!(config.decay.rate_per_minute, 0.8);
        assert_eq!(config.alert_repetitions, 5);
        assert_eq!(config.statuses, StatusTable::default());
    }

    #[test]
    fn test_status_defaults_never_speed_motion_up() {
        let table = StatusTable::default();
        for status in OperationalStatus::ALL {
            let profile = table.get(status);
            assert!(profile.speed_multiplier <= 1.0);
            assert_eq!(profile.should_pulse, profile.pulse_speed != PulseSpeed::None);
        }
    }
}
