// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 MuVeraAI Corporation

//! Shared data types used across every computation stage.
//!
//! Wire-facing types serialise with `camelCase` field names and variant names
//! so that the presentation layer can hand records over as JSON without any
//! conversion step.  Derived values are plain data: they are recomputed on
//! every evaluation and never written back to a source record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

// ---------------------------------------------------------------------------
// Trust
// ---------------------------------------------------------------------------

/// Discrete trust label derived from a 0–100 confidence score.
///
/// Variants are declared from weakest to strongest so that the derived
/// [`Ord`] matches the score ordering: a higher score never yields a lower
/// grade.
///
/// # Examples
///
/// ```rust
/// use trustsignal_core::types::TrustGrade;
///
/// assert!(TrustGrade::Excellent > TrustGrade::Good);
/// assert_eq!(TrustGrade::Suspect as u8, 0);
/// ```
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TrustGrade {
    /// Score below the `poor` cutoff.
    Suspect = 0,
    /// Score at or above the `poor` cutoff.
    Poor = 1,
    /// Score at or above the `fair` cutoff.
    Fair = 2,
    /// Score at or above the `good` cutoff.
    Good = 3,
    /// Score at or above the `excellent` cutoff.
    Excellent = 4,
}

impl TrustGrade {
    /// Human-readable display name for logging and UI surfaces.
    pub fn display_name(self) -> &'static str {
        match self {
            TrustGrade::Suspect   => "Suspect",
            TrustGrade::Poor      => "Poor",
            TrustGrade::Fair      => "Fair",
            TrustGrade::Good      => "Good",
            TrustGrade::Excellent => "Excellent",
        }
    }
}

impl Default for TrustGrade {
    /// Records without trust metadata render as `good`.
    fn default() -> Self {
        TrustGrade::Good
    }
}

/// Structured confidence metadata attached to a decision or message by its
/// upstream producer.
///
/// The engine never mutates a `TrustMathematics` value.  Out-of-range fields
/// are tolerated on input and normalised by [`TrustMathematics::normalized`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrustMathematics {
    /// Confidence on a 0–100 scale.
    pub confidence_score: f64,
    /// Number of independent corroborating sources.
    #[serde(default, deserialize_with = "lenient_count")]
    pub witness_count: i64,
    /// Statistical spread; larger values erode trust.
    #[serde(default)]
    pub deviation_sigma: f64,
    /// Producer-side flag requesting an alert pulse.
    #[serde(default)]
    pub exceeds_threshold: bool,
    /// Label attached by the producer at creation time.
    #[serde(default)]
    pub trust_grade: TrustGrade,
}

// ---------------------------------------------------------------------------
// Operational state
// ---------------------------------------------------------------------------

/// Operational state of a decision or process.  Always derived, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OperationalStatus {
    Optimal,
    Nominal,
    Degraded,
    Maintenance,
    Fault,
}

impl OperationalStatus {
    /// Every status, in declaration order.
    pub const ALL: [OperationalStatus; 5] = [
        OperationalStatus::Optimal,
        OperationalStatus::Nominal,
        OperationalStatus::Degraded,
        OperationalStatus::Maintenance,
        OperationalStatus::Fault,
    ];

    /// Lowercase wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            OperationalStatus::Optimal     => "optimal",
            OperationalStatus::Nominal     => "nominal",
            OperationalStatus::Degraded    => "degraded",
            OperationalStatus::Maintenance => "maintenance",
            OperationalStatus::Fault       => "fault",
        }
    }

    /// Parse a wire name, ignoring ASCII case.  Returns `None` for anything
    /// that is not one of the five states.
    pub fn from_name(name: &str) -> Option<Self> {
        OperationalStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(name.trim()))
    }
}

impl Default for OperationalStatus {
    fn default() -> Self {
        OperationalStatus::Nominal
    }
}

/// Coarse health vocabulary used by dense multi-element displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HealthCategory {
    Healthy,
    Degraded,
    Critical,
    Offline,
}

impl HealthCategory {
    /// Lowercase wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            HealthCategory::Healthy  => "healthy",
            HealthCategory::Degraded => "degraded",
            HealthCategory::Critical => "critical",
            HealthCategory::Offline  => "offline",
        }
    }
}

/// Severity of the decision being rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Impact {
    Low,
    Medium,
    High,
    Critical,
}

// ---------------------------------------------------------------------------
// Freshness
// ---------------------------------------------------------------------------

/// Urgency tier derived from the age of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FreshnessTier {
    /// Younger than `critical_secs`.
    Critical,
    /// Younger than `warning_secs`.
    Warning,
    /// Younger than `stale_secs`.
    Normal,
    /// Everything older.
    Stale,
}

// ---------------------------------------------------------------------------
// Agent persona
// ---------------------------------------------------------------------------

/// Named agent role with a fixed motion identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AgentPersona {
    Operations,
    Markets,
    Sentinel,
    Governor,
}

impl AgentPersona {
    /// Parse a persona name, ignoring ASCII case.
    ///
    /// ```rust
    /// use trustsignal_core::types::AgentPersona;
    /// assert_eq!(AgentPersona::from_name("Governor"), Some(AgentPersona::Governor));
    /// assert_eq!(AgentPersona::from_name("auditor"), None);
    /// ```
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "operations" => Some(AgentPersona::Operations),
            "markets"    => Some(AgentPersona::Markets),
            "sentinel"   => Some(AgentPersona::Sentinel),
            "governor"   => Some(AgentPersona::Governor),
            _ => None,
        }
    }
}

/// Easing identity attached by the persona layer.  The engine only names
/// the curve; the rendering collaborator owns its shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Easing {
    Organic,
    BounceSoft,
    Glass,
    EaseOutBack,
}

// ---------------------------------------------------------------------------
// Motion
// ---------------------------------------------------------------------------

/// Cadence of a repeating pulse.  Ordered from calmest to most urgent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum PulseSpeed {
    #[default]
    None,
    Slow,
    Medium,
    Fast,
}

/// The user's motion preference, injected into every evaluation instead of
/// being read from a global environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum MotionPreference {
    #[default]
    Full,
    Reduced,
}

/// Domain-specific state that may override pulse cadence and neutralise
/// colour (composition layer 5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DomainOverlay {
    /// A governance rule is actively being enforced.
    Enforcement,
    /// A governance rule has been violated.
    Violation,
}

/// Global emergency state (composition layer 6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct EmergencyOverride {
    pub active: bool,
}

impl EmergencyOverride {
    pub const ACTIVE: EmergencyOverride = EmergencyOverride { active: true };
    pub const INACTIVE: EmergencyOverride = EmergencyOverride { active: false };
}

/// Which confidence value a trust grade is derived from.
///
/// Two screens rendering the same record must agree on the grade, so the
/// policy is chosen explicitly per pipeline (and may be overridden per
/// evaluation) rather than left implicit at each call site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum GradePolicy {
    /// Grade from the producer's undecayed `confidence_score`.
    #[default]
    Raw,
    /// Grade from the age-decayed confidence.
    Decayed,
}

// ---------------------------------------------------------------------------
// Source record
// ---------------------------------------------------------------------------

/// A decision, chat message, or transaction as delivered by the record feed.
///
/// Records are immutable snapshots; the engine only ever borrows them.
///
/// # Examples
///
/// ```rust
/// use trustsignal_core::types::{AgentPersona, SourceRecord};
///
/// let record = SourceRecord::from_json(r#"{
///     "id": "decision-7",
///     "timestamp": "2026-03-01T12:00:00Z",
///     "confidence": 82.0,
///     "agent": "markets"
/// }"#).unwrap();
///
/// assert_eq!(record.agent, Some(AgentPersona::Markets));
/// assert!(record.trust_math.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceRecord {
    /// Stable identifier, used as the memoization key.
    #[serde(default)]
    pub id: String,
    /// Creation time (ISO 8601 on the wire).
    pub timestamp: DateTime<Utc>,
    /// Plain 0–100 confidence for records without full trust metadata.
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub trust_math: Option<TrustMathematics>,
    /// Status precomputed by the producer; derived when absent.
    #[serde(default)]
    pub operational_status: Option<OperationalStatus>,
    /// Unknown persona names deserialise to `None`.
    #[serde(default, deserialize_with = "lenient_persona")]
    pub agent: Option<AgentPersona>,
    #[serde(default)]
    pub impact: Option<Impact>,
    #[serde(default)]
    pub is_in_maintenance: Option<bool>,
    #[serde(default)]
    pub domain: Option<DomainOverlay>,
}

impl SourceRecord {
    /// Minimal record carrying only an id and a timestamp.
    pub fn new(id: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            timestamp,
            confidence: None,
            trust_math: None,
            operational_status: None,
            agent: None,
            impact: None,
            is_in_maintenance: None,
            domain: None,
        }
    }

    /// Parse a record from its JSON wire form.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// The confidence the engine works from: the trust metadata's score when
    /// present, otherwise the plain `confidence` field.
    pub fn effective_confidence(&self) -> Option<f64> {
        self.trust_math
            .as_ref()
            .map(|math| math.confidence_score)
            .or(self.confidence)
    }
}

/// Counts arrive as `3` or `3.0` depending on the producer; fractional
/// values truncate and `null` reads as zero.
fn lenient_count<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Count {
        Whole(i64),
        Fractional(f64),
    }

    Ok(match Option::<Count>::deserialize(deserializer)? {
        Some(Count::Whole(count)) => count,
        // `as` saturates and maps NaN to zero.
        Some(Count::Fractional(count)) => count as i64,
        None => 0,
    })
}

fn lenient_persona<'de, D>(deserializer: D) -> Result<Option<AgentPersona>, D::Error>
where
    D: Deserializer<'de>,
{
    let name: Option<String> = Option::deserialize(deserializer)?;
    Ok(name.as_deref().and_then(AgentPersona::from_name))
}

// ---------------------------------------------------------------------------
// Evaluation
// ---------------------------------------------------------------------------

/// Per-evaluation inputs that do not belong to the record itself.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EvaluationContext {
    /// Evaluation timestamp.  Two evaluations with the same record and the
    /// same `now` produce identical output.
    pub now: DateTime<Utc>,
    pub motion: MotionPreference,
    pub emergency: EmergencyOverride,
    /// Overrides the pipeline's configured [`GradePolicy`] when set.
    pub grade_policy: Option<GradePolicy>,
}

impl EvaluationContext {
    /// Context at `now` with full motion, no emergency and the pipeline's
    /// default grade policy.
    pub fn at(now: DateTime<Utc>) -> Self {
        Self {
            now,
            motion: MotionPreference::Full,
            emergency: EmergencyOverride::INACTIVE,
            grade_policy: None,
        }
    }

    pub fn with_motion(mut self, motion: MotionPreference) -> Self {
        self.motion = motion;
        self
    }

    pub fn with_emergency(mut self, emergency: EmergencyOverride) -> Self {
        self.emergency = emergency;
        self
    }

    pub fn with_grade_policy(mut self, policy: GradePolicy) -> Self {
        self.grade_policy = Some(policy);
        self
    }
}

/// Final presentation parameters handed to the rendering collaborator.
///
/// Produced fresh by every call to
/// [`CompositionPipeline::evaluate`](crate::pipeline::CompositionPipeline::evaluate).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivedPresentationParams {
    /// 0.5–1.0 (exactly the emergency opacity while an emergency is active).
    pub opacity: f64,
    /// Motion slowdown before persona scaling; ≥ 1.0 unless reduced motion
    /// collapsed it.
    pub duration_multiplier: f64,
    /// Base duration scaled by every layer, in seconds.
    pub duration_seconds: f64,
    pub pulse_speed: PulseSpeed,
    pub should_alert: bool,
    /// Number of alert pulses to play before settling.
    pub alert_repetitions: u8,
    pub health_category: HealthCategory,
    pub operational_status: OperationalStatus,
    pub trust_grade: TrustGrade,
    pub freshness_tier: FreshnessTier,
    /// Age-decayed confidence, when the record carries any confidence.
    pub displayed_confidence: Option<f64>,
    pub easing: Easing,
    /// Set by the emergency layer.
    pub desaturate: bool,
    /// Set by the domain layer.
    pub color_neutral: bool,
}
