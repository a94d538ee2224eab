// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 MuVeraAI Corporation

//! # trustsignal-core
//!
//! Trust, freshness and decay computations that turn raw provenance data on
//! a decision, message or transaction into the presentation parameters every
//! surface renders identically: opacity, motion duration, pulse cadence,
//! health category and alert flag.
//!
//! Every function here is pure and total.  Nothing is written back to a
//! source record, and out-of-range inputs are clamped rather than rejected.
//!
//! ## Architecture
//!
//! ```text
//! CompositionPipeline
//!   ├── FreshnessClassifier      — age → freshness tier + duration modifier
//!   ├── TrustScoreCalculator     — trust metadata → opacity, grade, alert
//!   ├── TemporalDecayEngine      — confidence × max(rate^(age/60), floor)
//!   ├── OperationalStatusMapper  — record → status → health category
//!   └── AgentPersonaCalibrator   — persona → speed multiplier + easing
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use chrono::{Duration, TimeZone, Utc};
//! use trustsignal_core::{
//!     CompositionPipeline, Config, EvaluationContext, SourceRecord,
//!     types::{FreshnessTier, TrustGrade, TrustMathematics},
//! };
//!
//! let pipeline = CompositionPipeline::new(Config::default());
//! let now = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
//!
//! let mut record = SourceRecord::new("decision-42", now - Duration::seconds(45));
//! record.trust_math = Some(TrustMathematics {
//!     confidence_score: 92.0,
//!     witness_count: 3,
//!     deviation_sigma: 0.5,
//!     exceeds_threshold: false,
//!     trust_grade: TrustGrade::Excellent,
//! });
//!
//! let params = pipeline.evaluate(&record, &EvaluationContext::at(now));
//! assert_eq!(params.freshness_tier, FreshnessTier::Warning);
//! assert_eq!(params.trust_grade, TrustGrade::Excellent);
//! assert!(!params.should_alert);
//! ```

pub mod alert;
pub mod cache;
pub mod config;
pub mod config_loader;
pub mod decay;
pub mod freshness;
pub mod live;
pub mod persona;
pub mod pipeline;
pub mod status;
pub mod trust;
pub mod types;

// Re-export the most commonly used items at the crate root so consumers can
// write `use trustsignal_core::CompositionPipeline;` instead of the fully
// qualified path.
pub use cache::{InMemoryCache, ParamsCache};
pub use config::Config;
pub use pipeline::CompositionPipeline;
pub use types::{
    DerivedPresentationParams, EvaluationContext, FreshnessTier, GradePolicy, HealthCategory,
    MotionPreference, OperationalStatus, PulseSpeed, SourceRecord, TrustGrade, TrustMathematics,
};
