// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 MuVeraAI Corporation

//! Bounded alert pulsing.
//!
//! An alert never pulses forever.  [`AlertPlan`] spells out the sequence a
//! consumer plays: `repetitions` alert pulses, then the steady-state cadence,
//! then nothing more.

use crate::types::{DerivedPresentationParams, PulseSpeed};

/// One step of an [`AlertPlan`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PulsePhase {
    /// Alert pulse number `n` (1-based).
    Alert(u8),
    /// Settle into the steady-state cadence.
    Steady(PulseSpeed),
}

/// Finite iterator over the pulse phases of one evaluation.
///
/// # Examples
///
/// ```rust
/// use trustsignal_core::{alert::{AlertPlan, PulsePhase}, types::PulseSpeed};
///
/// let phases: Vec<_> = AlertPlan::new(3, PulseSpeed::Slow).collect();
/// assert_eq!(phases, vec![
///     PulsePhase::Alert(1),
///     PulsePhase::Alert(2),
///     PulsePhase::Alert(3),
///     PulsePhase::Steady(PulseSpeed::Slow),
/// ]);
/// ```
#[derive(Debug, Clone)]
pub struct AlertPlan {
    repetitions: u8,
    played: u8,
    steady: Option<PulseSpeed>,
}

impl AlertPlan {
    pub fn new(repetitions: u8, steady: PulseSpeed) -> Self {
        Self { repetitions, played: 0, steady: Some(steady) }
    }

    /// Plan for a derived parameter set.
    pub fn for_params(params: &DerivedPresentationParams) -> Self {
        Self::new(params.alert_repetitions, params.pulse_speed)
    }
}

impl Iterator for AlertPlan {
    type Item = PulsePhase;

    fn next(&mut self) -> Option<PulsePhase> {
        if self.played < self.repetitions {
            self.played += 1;
            return Some(PulsePhase::Alert(self.played));
        }
        self.steady.take().map(PulsePhase::Steady)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = usize::from(self.repetitions - self.played) + usize::from(self.steady.is_some());
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for AlertPlan {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_alert_goes_straight_to_steady() {
        let phases: Vec<_> = AlertPlan::new(0, PulseSpeed::None).collect();
        assert_eq!(phases, vec![PulsePhase::Steady(PulseSpeed::None)]);
    }

    #[test]
    fn test_plan_is_finite_and_sized() {
        let mut plan = AlertPlan::new(u8::MAX, PulseSpeed::Fast);
        assert_eq!(plan.len(), 256);
        assert_eq!(plan.by_ref().count(), 256);
        assert_eq!(plan.next(), None);
    }
}
