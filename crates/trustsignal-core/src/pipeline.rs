// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 MuVeraAI Corporation

//! Composition pipeline — the top-level combination of every computation
//! stage into one [`DerivedPresentationParams`].
//!
//! ## Layer order
//!
//! Several state concerns can apply to one record at once (a fault-state
//! decision from the governor persona that is also stale, say).  They are
//! combined in one fixed order.  A later layer's explicit assignments always
//! win; fields a layer does not touch pass through unchanged.
//!
//! 1. **Base** — opacity 1.0, duration multiplier 1.0, no pulse, no alert.
//! 2. **Trust** — sets opacity, duration multiplier and alert from the
//!    record's trust metadata.
//! 3. **Decay** — scales opacity down by age and computes the displayed
//!    confidence.  Leaves the duration multiplier alone.
//! 4. **Status** — scales opacity by the status table, sets the pulse,
//!    slows motion for sluggish states, and forces the alert on `fault`.
//! 5. **Domain** — governance enforcement or violation overrides the pulse
//!    and neutralises colour.
//! 6. **Emergency** — forces the emergency opacity and desaturation.
//! 7. **Persona** — scales the final duration and attaches the easing.
//!    Never touches opacity or alert flags.
//!
//! After layer 7 the alert repetition count is fixed from the final alert
//! flag, and a reduced-motion preference collapses every duration to the
//! configured near-zero multiplier and stops pulsing.
//!
//! Evaluation is pure: the same record and the same [`EvaluationContext`]
//! always yield identical output, and nothing is written back.

use tracing::{debug, trace, warn};

use crate::cache::{CacheKey, ParamsCache};
use crate::config::Config;
use crate::decay::TemporalDecayEngine;
use crate::freshness::{age_seconds, FreshnessClassifier};
use crate::persona::AgentPersonaCalibrator;
use crate::status::OperationalStatusMapper;
use crate::trust::{TrustScoreCalculator, MAX_OPACITY, MIN_OPACITY};
use crate::types::{
    DerivedPresentationParams, DomainOverlay, Easing, EvaluationContext, GradePolicy,
    HealthCategory, MotionPreference, OperationalStatus, PulseSpeed, SourceRecord, TrustGrade,
};

/// One step of the composition order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Layer {
    Base,
    Trust,
    Decay,
    Status,
    Domain,
    Emergency,
    Persona,
}

impl Layer {
    /// Every layer, lowest precedence first.
    pub const ORDER: [Layer; 7] = [
        Layer::Base,
        Layer::Trust,
        Layer::Decay,
        Layer::Status,
        Layer::Domain,
        Layer::Emergency,
        Layer::Persona,
    ];
}

/// Parameters as they stood after one layer ran.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerSnapshot {
    pub layer: Layer,
    pub params: DerivedPresentationParams,
}

/// Per-layer trace of one evaluation, for debugging and for checking
/// precedence.
#[derive(Debug, Clone, PartialEq)]
pub struct CompositionBreakdown {
    pub age_seconds: f64,
    pub decay_factor: f64,
    pub layers: Vec<LayerSnapshot>,
    pub final_params: DerivedPresentationParams,
}

impl CompositionBreakdown {
    /// Snapshot taken right after `layer`.
    pub fn after(&self, layer: Layer) -> Option<&DerivedPresentationParams> {
        self.layers
            .iter()
            .find(|snapshot| snapshot.layer == layer)
            .map(|snapshot| &snapshot.params)
    }
}

/// Composes all computation stages into a single evaluation API.
///
/// # Examples
///
/// ```rust
/// use chrono::{Duration, TimeZone, Utc};
/// use trustsignal_core::{
///     pipeline::CompositionPipeline,
///     config::Config,
///     types::{AgentPersona, EmergencyOverride, EvaluationContext, FreshnessTier, SourceRecord},
/// };
///
/// let pipeline = CompositionPipeline::new(Config::default());
/// let now = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
///
/// let mut record = SourceRecord::new("decision-1", now - Duration::seconds(400));
/// record.confidence = Some(30.0);
/// record.agent = Some(AgentPersona::Governor);
///
/// let params = pipeline.evaluate(&record, &EvaluationContext::at(now));
/// assert_eq!(params.freshness_tier, FreshnessTier::Stale);
/// assert!(params.should_alert);          // fault: confidence < 50
/// assert_eq!(params.alert_repetitions, 3);
///
/// let ctx = EvaluationContext::at(now).with_emergency(EmergencyOverride::ACTIVE);
/// assert_eq!(pipeline.evaluate(&record, &ctx).opacity, 0.7);
/// ```
#[derive(Debug, Clone)]
pub struct CompositionPipeline {
    config: Config,
    freshness: FreshnessClassifier,
    trust: TrustScoreCalculator,
    decay: TemporalDecayEngine,
    status: OperationalStatusMapper,
    persona: AgentPersonaCalibrator,
}

impl CompositionPipeline {
    /// Build every stage from one configuration.
    pub fn new(config: Config) -> Self {
        Self {
            freshness: FreshnessClassifier::new(config.freshness),
            trust: TrustScoreCalculator::new(config.grade_cutoffs),
            decay: TemporalDecayEngine::new(config.decay),
            status: OperationalStatusMapper::new(config.statuses),
            persona: AgentPersonaCalibrator::new(config.personas),
            config,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn freshness(&self) -> &FreshnessClassifier {
        &self.freshness
    }

    pub fn trust(&self) -> &TrustScoreCalculator {
        &self.trust
    }

    pub fn decay(&self) -> &TemporalDecayEngine {
        &self.decay
    }

    pub fn status(&self) -> &OperationalStatusMapper {
        &self.status
    }

    pub fn persona(&self) -> &AgentPersonaCalibrator {
        &self.persona
    }

    /// Evaluate `record` at `ctx.now` and return fresh presentation
    /// parameters.  Never fails.
    pub fn evaluate(&self, record: &SourceRecord, ctx: &EvaluationContext) -> DerivedPresentationParams {
        let (_, _, params) = self.compose(record, ctx, |_, _| {});
        debug!(
            record_id = %record.id,
            status = params.operational_status.as_str(),
            tier = ?params.freshness_tier,
            grade = params.trust_grade.display_name(),
            opacity = params.opacity,
            alert = params.should_alert,
            "evaluated presentation params"
        );
        params
    }

    /// Like [`evaluate`](Self::evaluate), but answers from `cache` when the
    /// same record has already been evaluated under the same context.
    ///
    /// On a miss, entries evaluated more than one re-evaluation interval
    /// before `ctx.now` are evicted first, so the cache holds at most one
    /// window of evaluations.
    pub fn evaluate_cached<C: ParamsCache>(
        &self,
        record: &SourceRecord,
        ctx: &EvaluationContext,
        cache: &mut C,
    ) -> DerivedPresentationParams {
        let key = CacheKey::new(&record.id, ctx);
        if let Some(params) = cache.get(&key) {
            trace!(record_id = %record.id, "presentation params cache hit");
            return params;
        }
        cache.evict_before(self.cache_cutoff_ms(ctx));
        let params = self.evaluate(record, ctx);
        cache.insert(key, params.clone());
        params
    }

    fn cache_cutoff_ms(&self, ctx: &EvaluationContext) -> i64 {
        let window = i64::try_from(self.config.reevaluation_interval_ms).unwrap_or(i64::MAX);
        ctx.now.timestamp_millis().saturating_sub(window)
    }

    /// Evaluate and keep a snapshot after every layer.
    pub fn evaluate_breakdown(&self, record: &SourceRecord, ctx: &EvaluationContext) -> CompositionBreakdown {
        let mut layers = Vec::with_capacity(Layer::ORDER.len());
        let (age, factor, final_params) = self.compose(record, ctx, |layer, params| {
            layers.push(LayerSnapshot { layer, params: params.clone() });
        });
        CompositionBreakdown { age_seconds: age, decay_factor: factor, layers, final_params }
    }

    fn compose<F>(
        &self,
        record: &SourceRecord,
        ctx: &EvaluationContext,
        mut on_layer: F,
    ) -> (f64, f64, DerivedPresentationParams)
    where
        F: FnMut(Layer, &DerivedPresentationParams),
    {
        let age = age_seconds(ctx.now, record.timestamp);
        let freshness = self.freshness.classify(age);
        let decay_factor = self.decay.factor(age);
        let policy = ctx.grade_policy.unwrap_or(self.config.grade_policy);
        let base_duration = non_negative_or(self.config.base_duration_secs, Config::default().base_duration_secs);

        // ------------------------------------------------------------------
        // Layer 1: Base
        // ------------------------------------------------------------------
        let mut params = DerivedPresentationParams {
            opacity: MAX_OPACITY,
            duration_multiplier: 1.0,
            duration_seconds: base_duration,
            pulse_speed: PulseSpeed::None,
            should_alert: false,
            alert_repetitions: 0,
            health_category: HealthCategory::Healthy,
            operational_status: OperationalStatus::Nominal,
            trust_grade: TrustGrade::Good,
            freshness_tier: freshness.tier,
            displayed_confidence: None,
            easing: Easing::Organic,
            desaturate: false,
            color_neutral: false,
        };
        checkpoint(Layer::Base, &params, &mut on_layer);

        // ------------------------------------------------------------------
        // Layer 2: Trust
        // ------------------------------------------------------------------
        if let Some(math) = &record.trust_math {
            let assessment = self.trust.assess(math);
            if assessment.grade != math.trust_grade {
                warn!(
                    record_id = %record.id,
                    score = math.confidence_score,
                    labelled = math.trust_grade.display_name(),
                    derived = assessment.grade.display_name(),
                    "producer trust grade contradicts its score; using derived grade"
                );
            }
            params.opacity = assessment.opacity;
            params.duration_multiplier = assessment.duration_modifier;
            params.should_alert = assessment.should_alert;
            params.trust_grade = assessment.grade;
        }
        checkpoint(Layer::Trust, &params, &mut on_layer);

        // ------------------------------------------------------------------
        // Layer 3: Decay
        // ------------------------------------------------------------------
        params.opacity = clamp_opacity(params.opacity * decay_factor);
        params.displayed_confidence = record
            .effective_confidence()
            .map(|confidence| self.decay.decay(confidence, age));
        if policy == GradePolicy::Decayed && record.trust_math.is_some() {
            if let Some(displayed) = params.displayed_confidence {
                params.trust_grade = self.trust.grade(displayed);
            }
        }
        checkpoint(Layer::Decay, &params, &mut on_layer);

        // ------------------------------------------------------------------
        // Layer 4: Status
        // ------------------------------------------------------------------
        let status = self.status.resolve(record);
        let profile = self.status.profile(status);
        params.operational_status = status;
        params.health_category = HealthCategory::from_status(Some(status));
        params.opacity = clamp_opacity(params.opacity * profile.opacity_modifier);
        params.pulse_speed = if profile.should_pulse { profile.pulse_speed } else { PulseSpeed::None };
        if profile.speed_multiplier > 0.0 && profile.speed_multiplier.is_finite() {
            params.duration_multiplier = (params.duration_multiplier / profile.speed_multiplier).max(1.0);
        }
        if status == OperationalStatus::Fault {
            params.should_alert = true;
        }
        checkpoint(Layer::Status, &params, &mut on_layer);

        // ------------------------------------------------------------------
        // Layer 5: Domain
        // ------------------------------------------------------------------
        match record.domain {
            Some(DomainOverlay::Enforcement) => {
                params.pulse_speed = PulseSpeed::Slow;
                params.color_neutral = true;
            }
            Some(DomainOverlay::Violation) => {
                params.pulse_speed = PulseSpeed::Fast;
                params.color_neutral = true;
            }
            None => {}
        }
        checkpoint(Layer::Domain, &params, &mut on_layer);

        // ------------------------------------------------------------------
        // Layer 6: Emergency
        // ------------------------------------------------------------------
        if ctx.emergency.active {
            params.opacity = clamp_opacity(self.config.emergency_opacity);
            params.desaturate = true;
        }
        checkpoint(Layer::Emergency, &params, &mut on_layer);

        // ------------------------------------------------------------------
        // Layer 7: Persona
        // ------------------------------------------------------------------
        let persona = self.persona.profile(record.agent);
        params.duration_seconds = self.persona.effective_duration(
            base_duration * params.duration_multiplier,
            record.agent,
            freshness.duration_modifier,
        );
        params.easing = persona.easing;
        checkpoint(Layer::Persona, &params, &mut on_layer);

        // ------------------------------------------------------------------
        // Alert bound and motion preference
        // ------------------------------------------------------------------
        params.alert_repetitions = if params.should_alert { self.config.alert_repetitions } else { 0 };

        if ctx.motion == MotionPreference::Reduced {
            let instant = instant_multiplier(self.config.reduced_motion_multiplier);
            params.duration_multiplier = instant;
            params.duration_seconds = base_duration * instant;
            params.pulse_speed = PulseSpeed::None;
            params.alert_repetitions = 0;
        }

        (age, decay_factor, params)
    }
}

impl Default for CompositionPipeline {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

fn checkpoint<F>(layer: Layer, params: &DerivedPresentationParams, on_layer: &mut F)
where
    F: FnMut(Layer, &DerivedPresentationParams),
{
    trace!(
        ?layer,
        opacity = params.opacity,
        duration_multiplier = params.duration_multiplier,
        pulse = ?params.pulse_speed,
        alert = params.should_alert,
        "composition layer applied"
    );
    on_layer(layer, params);
}

fn clamp_opacity(opacity: f64) -> f64 {
    if opacity.is_nan() {
        MIN_OPACITY
    } else {
        opacity.clamp(MIN_OPACITY, MAX_OPACITY)
    }
}

/// Reduced motion must stay shorter than full motion: anything outside
/// `[0, 1)` falls back to the default multiplier.
fn instant_multiplier(configured: f64) -> f64 {
    if (0.0..1.0).contains(&configured) {
        configured
    } else {
        Config::default().reduced_motion_multiplier
    }
}

fn non_negative_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() && value >= 0.0 {
        value
    } else {
        fallback
    }
}
