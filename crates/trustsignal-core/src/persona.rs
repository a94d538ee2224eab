// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 MuVeraAI Corporation

//! Agent persona calibration: a static lookup, no computation beyond the
//! final duration formula
//!
//! ```text
//! effectiveDuration = baseDuration / speedMultiplier × freshnessDurationModifier
//! ```

use crate::config::{PersonaProfile, PersonaTable};
use crate::types::AgentPersona;

/// Persona lookup backed by the configured [`PersonaTable`].
///
/// # Examples
///
/// ```rust
/// use trustsignal_core::{persona::AgentPersonaCalibrator, types::{AgentPersona, Easing}};
///
/// let calibrator = AgentPersonaCalibrator::default();
/// assert_eq!(calibrator.profile(Some(AgentPersona::Markets)).easing, Easing::BounceSoft);
/// assert_eq!(calibrator.profile(None).easing, Easing::Organic);
///
/// // 1.2 / 1.2 × 1.0
/// let seconds = calibrator.effective_duration(1.2, Some(AgentPersona::Markets), 1.0);
/// assert!((seconds - 1.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct AgentPersonaCalibrator {
    table: PersonaTable,
}

impl AgentPersonaCalibrator {
    pub fn new(table: PersonaTable) -> Self {
        Self { table }
    }

    /// Profile for `persona`; missing personas get [`PersonaProfile::FALLBACK`],
    /// as does a configured profile whose multiplier is not a positive number.
    pub fn profile(&self, persona: Option<AgentPersona>) -> PersonaProfile {
        match persona.map(|persona| self.table.get(persona)) {
            Some(profile) if profile.speed_multiplier > 0.0 && profile.speed_multiplier.is_finite() => profile,
            Some(profile) => PersonaProfile {
                speed_multiplier: PersonaProfile::FALLBACK.speed_multiplier,
                easing: profile.easing,
            },
            None => PersonaProfile::FALLBACK,
        }
    }

    /// Scale `base_duration` by the persona's speed and the freshness
    /// modifier.
    pub fn effective_duration(
        &self,
        base_duration: f64,
        persona: Option<AgentPersona>,
        freshness_duration_modifier: f64,
    ) -> f64 {
        base_duration / self.profile(persona).speed_multiplier * freshness_duration_modifier
    }
}
