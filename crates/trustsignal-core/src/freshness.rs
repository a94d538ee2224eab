// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 MuVeraAI Corporation

//! Freshness classification.
//!
//! [`FreshnessClassifier`] buckets a record's age into one of four
//! [`FreshnessTier`]s and attaches the duration modifier that tier implies.
//! The bucketing is a single ordered comparison chain, so every nonnegative
//! age lands in exactly one tier even when a hand-edited configuration breaks
//! the ascending-threshold contract.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config::FreshnessThresholds;
use crate::types::FreshnessTier;

/// Outcome of a [`FreshnessClassifier::classify`] call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FreshnessReading {
    pub tier: FreshnessTier,
    /// 1.0, 1.1, 1.2 or 1.3 for critical, warning, normal and stale.
    pub duration_modifier: f64,
}

/// Age-to-tier classifier.
///
/// # Examples
///
/// ```rust
/// use trustsignal_core::{freshness::FreshnessClassifier, types::FreshnessTier};
///
/// let classifier = FreshnessClassifier::default();
/// assert_eq!(classifier.classify(9.9).tier, FreshnessTier::Critical);
/// assert_eq!(classifier.classify(10.0).tier, FreshnessTier::Warning);
/// assert_eq!(classifier.classify(300.0).tier, FreshnessTier::Stale);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct FreshnessClassifier {
    thresholds: FreshnessThresholds,
}

impl FreshnessClassifier {
    pub fn new(thresholds: FreshnessThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> FreshnessThresholds {
        self.thresholds
    }

    /// Classify `age_seconds`.  Negative and NaN ages count as zero.
    pub fn classify(&self, age_seconds: f64) -> FreshnessReading {
        let age = clamp_age(age_seconds);
        let tier = if age < self.thresholds.critical_secs {
            FreshnessTier::Critical
        } else if age < self.thresholds.warning_secs {
            FreshnessTier::Warning
        } else if age < self.thresholds.stale_secs {
            FreshnessTier::Normal
        } else {
            FreshnessTier::Stale
        };
        FreshnessReading { tier, duration_modifier: duration_modifier(tier) }
    }
}

/// Duration modifier for a tier; older data animates more slowly.
pub fn duration_modifier(tier: FreshnessTier) -> f64 {
    match tier {
        FreshnessTier::Critical => 1.0,
        FreshnessTier::Warning  => 1.1,
        FreshnessTier::Normal   => 1.2,
        FreshnessTier::Stale    => 1.3,
    }
}

/// Seconds elapsed between `timestamp` and `now`, clamped to zero so that
/// records stamped slightly in the future (clock skew) read as brand new.
///
/// ```rust
/// use chrono::{Duration, TimeZone, Utc};
/// use trustsignal_core::freshness::age_seconds;
///
/// let now = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
/// assert_eq!(age_seconds(now, now - Duration::seconds(45)), 45.0);
/// assert_eq!(age_seconds(now, now + Duration::seconds(5)), 0.0);
/// ```
pub fn age_seconds(now: DateTime<Utc>, timestamp: DateTime<Utc>) -> f64 {
    let millis = now.signed_duration_since(timestamp).num_milliseconds();
    (millis.max(0) as f64) / 1000.0
}

pub(crate) fn clamp_age(age_seconds: f64) -> f64 {
    if age_seconds.is_nan() {
        0.0
    } else {
        age_seconds.max(0.0)
    }
}
