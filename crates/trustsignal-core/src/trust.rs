// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 MuVeraAI Corporation

//! Trust scoring.
//!
//! [`TrustScoreCalculator`] turns a [`TrustMathematics`] snapshot into the
//! three values the trust layer contributes to composition:
//!
//! * **opacity** — confidence plus a witness bonus minus a deviation penalty,
//!   clamped to `[0.5, 1.0]`
//! * **duration modifier** — never below 1.0; fewer witnesses and wider
//!   deviation slow motion down
//! * **alert** — mirrors the producer's `exceeds_threshold` flag
//!
//! and derives a [`TrustGrade`] from a score through [`GradeCutoffs`].  No
//! input is ever rejected: every field is clamped first.

use crate::config::GradeCutoffs;
use crate::types::{TrustGrade, TrustMathematics};

/// Lowest opacity any trust computation may produce.
pub const MIN_OPACITY: f64 = 0.5;
/// Highest opacity any trust computation may produce.
pub const MAX_OPACITY: f64 = 1.0;

const WITNESS_OPACITY_STEP: f64 = 0.02;
const WITNESS_OPACITY_CAP: f64 = 0.10;
const DEVIATION_OPACITY_STEP: f64 = 0.05;
const DEVIATION_OPACITY_CAP: f64 = 0.20;
const DEVIATION_DURATION_STEP: f64 = 0.15;
const DEVIATION_DURATION_CAP: f64 = 0.5;
const UNWITNESSED_DURATION: f64 = 1.2;
const WITNESS_DURATION_STEP: f64 = 0.1;

/// Everything the trust layer derives from one snapshot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrustAssessment {
    pub opacity: f64,
    pub duration_modifier: f64,
    pub should_alert: bool,
    /// Grade of the raw, undecayed score.
    pub grade: TrustGrade,
}

/// Stateless calculator parameterised by grade cutoffs.
///
/// # Examples
///
/// ```rust
/// use trustsignal_core::{
///     trust::TrustScoreCalculator,
///     types::{TrustGrade, TrustMathematics},
/// };
///
/// let calculator = TrustScoreCalculator::default();
/// let math = TrustMathematics {
///     confidence_score: 92.0,
///     witness_count: 3,
///     deviation_sigma: 0.5,
///     exceeds_threshold: false,
///     trust_grade: TrustGrade::Excellent,
/// };
///
/// let assessment = calculator.assess(&math);
/// assert_eq!(assessment.grade, TrustGrade::Excellent);
/// assert!((assessment.opacity - 0.955).abs() < 1e-9);
/// assert!(!assessment.should_alert);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct TrustScoreCalculator {
    cutoffs: GradeCutoffs,
}

impl TrustScoreCalculator {
    pub fn new(cutoffs: GradeCutoffs) -> Self {
        Self { cutoffs }
    }

    pub fn cutoffs(&self) -> GradeCutoffs {
        self.cutoffs
    }

    /// Run every trust computation over a normalised copy of `math`.
    pub fn assess(&self, math: &TrustMathematics) -> TrustAssessment {
        let math = math.normalized();
        TrustAssessment {
            opacity: opacity(&math),
            duration_modifier: duration_modifier(&math),
            should_alert: math.exceeds_threshold,
            grade: self.grade(math.confidence_score),
        }
    }

    /// Grade for a 0–100 score.  This is the single mapping used wherever a
    /// grade is derived, whatever the score's provenance.
    pub fn grade(&self, score: f64) -> TrustGrade {
        grade_for_score(score, &self.cutoffs)
    }
}

/// Step function from score to grade, inclusive at each cutoff.
///
/// ```rust
/// use trustsignal_core::{config::GradeCutoffs, trust::grade_for_score, types::TrustGrade};
///
/// let cutoffs = GradeCutoffs::default();
/// assert_eq!(grade_for_score(89.0, &cutoffs), TrustGrade::Good);
/// assert_eq!(grade_for_score(90.0, &cutoffs), TrustGrade::Excellent);
/// assert_eq!(grade_for_score(69.0, &cutoffs), TrustGrade::Fair);
/// assert_eq!(grade_for_score(70.0, &cutoffs), TrustGrade::Good);
/// ```
pub fn grade_for_score(score: f64, cutoffs: &GradeCutoffs) -> TrustGrade {
    let score = clamp_confidence(score);
    if score >= cutoffs.excellent {
        TrustGrade::Excellent
    } else if score >= cutoffs.good {
        TrustGrade::Good
    } else if score >= cutoffs.fair {
        TrustGrade::Fair
    } else if score >= cutoffs.poor {
        TrustGrade::Poor
    } else {
        TrustGrade::Suspect
    }
}

fn opacity(math: &TrustMathematics) -> f64 {
    let witness_bonus = (math.witness_count as f64 * WITNESS_OPACITY_STEP).min(WITNESS_OPACITY_CAP);
    let deviation_penalty = (math.deviation_sigma * DEVIATION_OPACITY_STEP).min(DEVIATION_OPACITY_CAP);
    (math.confidence_score / 100.0 + witness_bonus - deviation_penalty).clamp(MIN_OPACITY, MAX_OPACITY)
}

fn duration_modifier(math: &TrustMathematics) -> f64 {
    let deviation = 1.0 + (math.deviation_sigma * DEVIATION_DURATION_STEP).min(DEVIATION_DURATION_CAP);
    let witnesses = if math.witness_count == 0 {
        UNWITNESSED_DURATION
    } else {
        (UNWITNESSED_DURATION - math.witness_count as f64 * WITNESS_DURATION_STEP).max(1.0)
    };
    deviation * witnesses
}

impl TrustMathematics {
    /// Copy with every field forced into its valid range: confidence into
    /// `[0, 100]`, witnesses and deviation to `>= 0`.
    pub fn normalized(&self) -> TrustMathematics {
        TrustMathematics {
            confidence_score: clamp_confidence(self.confidence_score),
            witness_count: self.witness_count.max(0),
            deviation_sigma: if self.deviation_sigma.is_nan() {
                0.0
            } else {
                self.deviation_sigma.max(0.0)
            },
            exceeds_threshold: self.exceeds_threshold,
            trust_grade: self.trust_grade,
        }
    }

    /// Whether the producer's label agrees with the grade its own score maps
    /// to under `cutoffs`.
    pub fn grade_matches_score(&self, cutoffs: &GradeCutoffs) -> bool {
        self.trust_grade == grade_for_score(self.confidence_score, cutoffs)
    }
}

/// Clamp a confidence into `[0, 100]`; NaN reads as zero.
pub(crate) fn clamp_confidence(confidence: f64) -> f64 {
    if confidence.is_nan() {
        0.0
    } else {
        confidence.clamp(0.0, 100.0)
    }
}
