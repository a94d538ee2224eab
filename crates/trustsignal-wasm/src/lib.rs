// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 MuVeraAI Corporation

//! # trustsignal-wasm
//!
//! WebAssembly bindings for the trust-signal presentation engine.
//!
//! This crate exposes `trustsignal-core` to JavaScript and TypeScript
//! rendering layers via `wasm-bindgen`, so every surface derives its opacity,
//! motion and alert state from the same Rust code.
//!
//! ## Architecture
//!
//! Each handle wraps one [`CompositionPipeline`].  Pipelines are stored in a
//! thread-local registry keyed by integer handles because WASM is
//! single-threaded and `wasm_bindgen` cannot export opaque Rust structs
//! across the JS boundary without serialisation overhead.
//!
//! The evaluation timestamp and motion preference are always passed in by
//! the caller.  Nothing here reads the clock or the host environment.
//!
//! ## Exported Functions
//!
//! | Function                      | Description                                          |
//! |-------------------------------|------------------------------------------------------|
//! | `create_pipeline`             | Create a pipeline with default config                |
//! | `create_pipeline_with_config` | Create a pipeline with explicit JSON config          |
//! | `destroy_pipeline`            | Release a pipeline handle and free its memory        |
//! | `evaluate`                    | Evaluate a record (JSON in, JSON out)                |
//! | `evaluate_object`             | Evaluate a record (JS object in, JS object out)      |
//! | `classify_freshness`          | Freshness tier and duration modifier for an age      |
//! | `decay_confidence`            | Age-decayed confidence                               |
//! | `grade_for_score`             | Trust grade discriminant for a 0–100 score           |
//! | `health_for_status`           | Health category for a status name                    |
//!
//! ## JavaScript Usage
//!
//! ```js
//! import init, { create_pipeline, evaluate, destroy_pipeline } from '@trustsignal/wasm';
//!
//! await init();
//!
//! const handle = create_pipeline();
//! const reducedMotion = matchMedia('(prefers-reduced-motion: reduce)').matches;
//!
//! const params = JSON.parse(evaluate(handle, JSON.stringify({
//!   id:        'decision-42',
//!   timestamp: '2026-03-01T11:59:15Z',
//!   trustMath: {
//!     confidenceScore:  92,
//!     witnessCount:     3,
//!     deviationSigma:   0.5,
//!     exceedsThreshold: false,
//!     trustGrade:       'excellent',
//!   },
//!   agent: 'markets',
//! }), Date.now(), reducedMotion, false));
//!
//! element.style.opacity = params.opacity;
//! element.style.transitionDuration = `${params.durationSeconds}s`;
//!
//! destroy_pipeline(handle);
//! ```

use std::cell::RefCell;
use std::collections::HashMap;

use chrono::{DateTime, Utc};
use trustsignal_core::{
    config::Config,
    pipeline::CompositionPipeline,
    types::{
        DerivedPresentationParams, EmergencyOverride, EvaluationContext, HealthCategory,
        MotionPreference, OperationalStatus, SourceRecord,
    },
};
use wasm_bindgen::prelude::*;

// ---------------------------------------------------------------------------
// Pipeline registry
// ---------------------------------------------------------------------------

// WASM is single-threaded; RefCell<HashMap<...>> is safe here.
thread_local! {
    static PIPELINES: RefCell<HashMap<u32, CompositionPipeline>> = RefCell::new(HashMap::new());
    static NEXT_HANDLE: RefCell<u32> = RefCell::new(0);
}

/// Allocate a new pipeline handle. Handles wrap around at `u32::MAX - 1` to
/// reserve `u32::MAX` as the error sentinel.
fn next_handle() -> u32 {
    NEXT_HANDLE.with(|counter| {
        let handle = *counter.borrow();
        let next = if handle >= u32::MAX - 1 { 0 } else { handle + 1 };
        *counter.borrow_mut() = next;
        handle
    })
}

fn register(pipeline: CompositionPipeline) -> u32 {
    let handle = next_handle();
    PIPELINES.with(|pipelines| {
        pipelines.borrow_mut().insert(handle, pipeline);
    });
    handle
}

/// Run a closure with shared access to a pipeline. Returns `Err(message)` if
/// the handle is unknown.
fn with_pipeline<F, R>(handle: u32, callback: F) -> Result<R, String>
where
    F: FnOnce(&CompositionPipeline) -> R,
{
    PIPELINES.with(|pipelines| {
        let map = pipelines.borrow();
        match map.get(&handle) {
            Some(pipeline) => Ok(callback(pipeline)),
            None => Err(format!("unknown pipeline handle {}", handle)),
        }
    })
}

fn error_json(message: impl std::fmt::Display) -> String {
    serde_json::json!({ "error": message.to_string() }).to_string()
}

/// Build the evaluation context from the scalar arguments JS can pass.
fn context(now_ms: f64, reduced_motion: bool, emergency: bool) -> Result<EvaluationContext, String> {
    let now = if now_ms.is_finite() {
        DateTime::<Utc>::from_timestamp_millis(now_ms as i64)
    } else {
        None
    };
    let now = now.ok_or_else(|| format!("invalid evaluation time {}", now_ms))?;
    let motion = if reduced_motion { MotionPreference::Reduced } else { MotionPreference::Full };
    Ok(EvaluationContext::at(now)
        .with_motion(motion)
        .with_emergency(EmergencyOverride { active: emergency }))
}

fn evaluate_record(
    handle: u32,
    record: &SourceRecord,
    now_ms: f64,
    reduced_motion: bool,
    emergency: bool,
) -> Result<DerivedPresentationParams, String> {
    let ctx = context(now_ms, reduced_motion, emergency)?;
    with_pipeline(handle, |pipeline| pipeline.evaluate(record, &ctx))
}

// ---------------------------------------------------------------------------
// Pipeline lifecycle
// ---------------------------------------------------------------------------

/// Create a new [`CompositionPipeline`] with default configuration and
/// return its integer handle.
///
/// Pass this handle to all subsequent function calls.
#[wasm_bindgen]
pub fn create_pipeline() -> u32 {
    register(CompositionPipeline::new(Config::default()))
}

/// Create a new [`CompositionPipeline`] with explicit configuration.
///
/// `config_json` is a JSON object matching the [`Config`] shape.  Omitted
/// keys keep their defaults:
///
/// ```json
/// {
///   "decay": { "rate_per_minute": 0.8, "floor": 0.5 },
///   "grade_policy": "decayed"
/// }
/// ```
///
/// The config is not range-checked here; the pipeline clamps out-of-range
/// opacity and reduced-motion values at evaluation time.
///
/// Returns the integer pipeline handle, or `u32::MAX` on parse error.
#[wasm_bindgen]
pub fn create_pipeline_with_config(config_json: &str) -> u32 {
    match serde_json::from_str::<Config>(config_json) {
        Ok(config) => register(CompositionPipeline::new(config)),
        Err(_) => u32::MAX,
    }
}

/// Release the pipeline associated with `handle`, freeing its memory.
///
/// After calling this function the handle is no longer valid.
#[wasm_bindgen]
pub fn destroy_pipeline(handle: u32) {
    PIPELINES.with(|pipelines| {
        pipelines.borrow_mut().remove(&handle);
    });
}

// ---------------------------------------------------------------------------
// Evaluation
// ---------------------------------------------------------------------------

/// Evaluate a record and return JSON-serialised presentation parameters.
///
/// * `record_json`    -- a source record in its camelCase wire form
/// * `now_ms`         -- evaluation time, Unix epoch milliseconds
/// * `reduced_motion` -- the user's reduced-motion preference
/// * `emergency`      -- whether the global emergency override is active
///
/// Returns `{"error":"..."}` on parse failure or unknown handle.
#[wasm_bindgen]
pub fn evaluate(handle: u32, record_json: &str, now_ms: f64, reduced_motion: bool, emergency: bool) -> String {
    let record = match SourceRecord::from_json(record_json) {
        Ok(record) => record,
        Err(error) => return error_json(format!("record parse error: {}", error)),
    };

    match evaluate_record(handle, &record, now_ms, reduced_motion, emergency) {
        Ok(params) => serde_json::to_string(&params)
            .unwrap_or_else(|error| error_json(format!("serialisation error: {}", error))),
        Err(error) => error_json(error),
    }
}

/// Same as [`evaluate`], taking and returning plain JS objects instead of
/// JSON strings.
#[wasm_bindgen]
pub fn evaluate_object(
    handle: u32,
    record: JsValue,
    now_ms: f64,
    reduced_motion: bool,
    emergency: bool,
) -> Result<JsValue, JsValue> {
    let record: SourceRecord = serde_wasm_bindgen::from_value(record)?;
    let params = evaluate_record(handle, &record, now_ms, reduced_motion, emergency)
        .map_err(|error| JsValue::from_str(&error))?;
    Ok(serde_wasm_bindgen::to_value(&params)?)
}

// ---------------------------------------------------------------------------
// Individual stages
// ---------------------------------------------------------------------------

/// Classify an age in seconds, returning
/// `{"tier":"warning","durationModifier":1.1}`.
#[wasm_bindgen]
pub fn classify_freshness(handle: u32, age_seconds: f64) -> String {
    match with_pipeline(handle, |pipeline| pipeline.freshness().classify(age_seconds)) {
        Ok(reading) => serde_json::to_string(&reading)
            .unwrap_or_else(|error| error_json(format!("serialisation error: {}", error))),
        Err(error) => error_json(error),
    }
}

/// Age-decayed confidence.  Returns `NaN` if the handle is unknown.
#[wasm_bindgen]
pub fn decay_confidence(handle: u32, confidence: f64, age_seconds: f64) -> f64 {
    with_pipeline(handle, |pipeline| pipeline.decay().decay(confidence, age_seconds)).unwrap_or(f64::NAN)
}

/// Trust grade for a 0–100 score as its `u8` discriminant (`0` suspect
/// through `4` excellent).  Returns `u8::MAX` if the handle is unknown.
#[wasm_bindgen]
pub fn grade_for_score(handle: u32, score: f64) -> u8 {
    with_pipeline(handle, |pipeline| pipeline.trust().grade(score) as u8).unwrap_or(u8::MAX)
}

/// Health category name for an operational status name.  Unknown or empty
/// names read as a missing status, which is `"offline"`.
#[wasm_bindgen]
pub fn health_for_status(status: &str) -> String {
    HealthCategory::from_status(OperationalStatus::from_name(status)).as_str().into()
}

// ---------------------------------------------------------------------------
// wasm-bindgen-test
// ---------------------------------------------------------------------------


// ---------------------------------------------------------------------------
// Native unit tests (run with `cargo test` outside of WASM)
// ---------------------------------------------------------------------------

#[cfg(test)]
#[cfg(not(target_arch = "wasm32"))]
mod native_tests {
    use super::*;

    const NOW_MS: f64 = 1_772_366_400_000.0; // 2026-03-01T12:00:00Z

    #[test]
    fn test_pipeline_lifecycle() {
        let handle = create_pipeline();
        assert_ne!(handle, u32::MAX);
        destroy_pipeline(handle);
        assert!(decay_confidence(handle, 90.0, 0.0).is_nan());
    }

    #[test]
    fn test_config_json() {
        let handle = create_pipeline_with_config(r#"{"decay":{"floor":0.9}}"#);
        assert_ne!(handle, u32::MAX);
        let decayed = decay_confidence(handle, 100.0, 3_600.0);
        assert!((decayed - 90.0).abs() < 1e-9);
        destroy_pipeline(handle);

        assert_eq!(create_pipeline_with_config("not json"), u32::MAX);
    }

    #[test]
    fn test_out_of_range_config_keeps_output_bounds() {
        let handle = create_pipeline_with_config(r#"{"emergency_opacity":3.0,"reduced_motion_multiplier":5.0}"#);
        assert_ne!(handle, u32::MAX);
        let record = r#"{"id":"d","timestamp":"2026-03-01T12:00:00Z","confidence":95.0}"#;

        let params: DerivedPresentationParams =
            serde_json::from_str(&evaluate(handle, record, NOW_MS, true, true)).unwrap();
        assert_eq!(params.opacity, 1.0);
        assert_eq!(params.duration_multiplier, 0.01);
        assert!(params.duration_seconds < 0.6);
        destroy_pipeline(handle);
    }

    #[test]
    fn test_evaluate_round_trip() {
        let handle = create_pipeline();
        let record = r#"{
            "id": "decision-42",
            "timestamp": "2026-03-01T11:59:15Z",
            "trustMath": {
                "confidenceScore": 92.0,
                "witnessCount": 3,
                "deviationSigma": 0.5,
                "exceedsThreshold": true,
                "trustGrade": "excellent"
            }
        }"#;

        let result = evaluate(handle, record, NOW_MS, false, false);
        let params: DerivedPresentationParams = serde_json::from_str(&result).unwrap();
        assert_eq!(params.freshness_tier, trustsignal_core::FreshnessTier::Warning);
        assert!(params.should_alert);
        assert_eq!(params.alert_repetitions, 3);

        let reduced: DerivedPresentationParams =
            serde_json::from_str(&evaluate(handle, record, NOW_MS, true, false)).unwrap();
        assert_eq!(reduced.alert_repetitions, 0);
        destroy_pipeline(handle);
    }

    #[test]
    fn test_evaluate_errors() {
        let handle = create_pipeline();
        let bad_record = evaluate(handle, "{", NOW_MS, false, false);
        assert!(bad_record.starts_with("{\"error\":\"record parse error"));

        let record = r#"{"id":"d","timestamp":"2026-03-01T12:00:00Z"}"#;
        let bad_time = evaluate(handle, record, f64::NAN, false, false);
        assert!(bad_time.contains("invalid evaluation time"));

        let unknown = evaluate(99_999, record, NOW_MS, false, false);
        assert!(unknown.contains("unknown pipeline handle 99999"));
        destroy_pipeline(handle);
    }

    #[test]
    fn test_stage_functions() {
        let handle = create_pipeline();
        assert_eq!(
            classify_freshness(handle, 45.0),
            r#"{"tier":"warning","durationModifier":1.1}"#
        );
        assert_eq!(grade_for_score(handle, 92.0), 4);
        assert_eq!(grade_for_score(handle, 29.0), 0);
        assert_eq!(grade_for_score(99_999, 92.0), u8::MAX);
        assert_eq!(decay_confidence(handle, 92.0, 0.0), 92.0);
        destroy_pipeline(handle);
    }

    #[test]
    fn test_health_for_status() {
        assert_eq!(health_for_status("optimal"), "healthy");
        assert_eq!(health_for_status("Degraded"), "degraded");
        assert_eq!(health_for_status("fault"), "critical");
        assert_eq!(health_for_status("maintenance"), "critical");
        assert_eq!(health_for_status(""), "offline");
        assert_eq!(health_for_status("rebooting"), "offline");
    }
}
