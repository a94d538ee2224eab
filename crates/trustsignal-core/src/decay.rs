// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 MuVeraAI Corporation

//! Temporal confidence decay.
//!
//! ```text
//! decayFactor          = ratePerMinute ^ (ageSeconds / 60)
//! displayedConfidence  = confidence × max(decayFactor, floor)
//! ```
//!
//! The floor is a hard clamp: stale-but-valid data is down-weighted, never
//! erased.

use crate::config::DecayConfig;
use crate::freshness::clamp_age;
use crate::trust::clamp_confidence;

/// Exponential decay of a 0–100 confidence score over time.
///
/// # Examples
///
/// ```rust
/// use trustsignal_core::decay::TemporalDecayEngine;
///
/// let engine = TemporalDecayEngine::default();
/// assert_eq!(engine.decay(92.0, 0.0), 92.0);
/// assert!((engine.decay(92.0, 45.0) - 77.9).abs() < 0.1);
/// assert_eq!(engine.decay(92.0, 86_400.0), 46.0);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct TemporalDecayEngine {
    rate_per_minute: f64,
    floor: f64,
}

impl TemporalDecayEngine {
    /// Build an engine, clamping the rate and floor into `[0, 1]` so decay
    /// can never grow a score.
    pub fn new(config: DecayConfig) -> Self {
        Self {
            rate_per_minute: unit_or(config.rate_per_minute, 1.0),
            floor: unit_or(config.floor, 0.0),
        }
    }

    pub fn rate_per_minute(&self) -> f64 {
        self.rate_per_minute
    }

    pub fn floor(&self) -> f64 {
        self.floor
    }

    /// Raw factor `rate ^ (age / 60)` before the floor applies.
    pub fn raw_factor(&self, age_seconds: f64) -> f64 {
        self.rate_per_minute.powf(clamp_age(age_seconds) / 60.0)
    }

    /// Multiplier applied to confidence at `age_seconds`: the raw factor
    /// clamped to the floor.  Exactly 1.0 at age zero.
    pub fn factor(&self, age_seconds: f64) -> f64 {
        self.raw_factor(age_seconds).max(self.floor)
    }

    /// Confidence displayed for a record of the given age.
    pub fn decay(&self, confidence: f64, age_seconds: f64) -> f64 {
        clamp_confidence(confidence) * self.factor(age_seconds)
    }
}

impl Default for TemporalDecayEngine {
    fn default() -> Self {
        Self::new(DecayConfig::default())
    }
}

fn unit_or(value: f64, fallback: f64) -> f64 {
    if value.is_nan() {
        fallback
    } else {
        value.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factor_is_exactly_one_at_age_zero() {
        let engine = TemporalDecayEngine::default();
        assert_eq!(engine.factor(0.0), 1.0);
        assert_eq!(engine.factor(-10.0), 1.0);
    }

    #[test]
    fn test_factor_after_one_minute_equals_rate() {
        let engine = TemporalDecayEngine::default();
        assert!((engine.factor(60.0) - 0.8).abs() < 1e-12);
    }

    #[test]
    fn test_floor_bounds_very_old_records() {
        let engine = TemporalDecayEngine::default();
        assert_eq!(engine.factor(3_600.0), 0.5);
        assert_eq!(engine.decay(80.0, 1e9), 40.0);
    }

    #[test]
    fn test_out_of_range_config_is_clamped() {
        let engine = TemporalDecayEngine::new(DecayConfig { rate_per_minute: 1.5, floor: -1.0 });
        assert_eq!(engine.rate_per_minute(), 1.0);
        assert_eq!(engine.floor(), 0.0);
        assert_eq!(engine.decay(70.0, 600.0), 70.0);
    }

    #[test]
    fn test_confidence_is_clamped_before_decay() {
        let engine = TemporalDecayEngine::default();
        assert_eq!(engine.decay(140.0, 0.0), 100.0);
        assert_eq!(engine.decay(-5.0, 30.0), 0.0);
    }
}
