// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 MuVeraAI Corporation

//! Optional memoization of derived parameters.
//!
//! Derived parameters are never persisted and nothing depends on a cache
//! being present: [`CompositionPipeline::evaluate`](crate::pipeline::CompositionPipeline::evaluate)
//! is always correct on its own.  A [`ParamsCache`] only saves recomputing a
//! record that several surfaces render within the same evaluation tick.
//!
//! Keys carry the evaluation timestamp and every context input, so a cached
//! value can never be served for a different moment or preference.
//!
//! # Implementing `ParamsCache`
//!
//! ```rust
//! use trustsignal_core::cache::{CacheKey, ParamsCache};
//! use trustsignal_core::types::DerivedPresentationParams;
//!
//! struct NoCache;
//!
//! impl ParamsCache for NoCache {
//!     fn get(&self, _key: &CacheKey) -> Option<DerivedPresentationParams> { None }
//!     fn insert(&mut self, _key: CacheKey, _params: DerivedPresentationParams) {}
//!     fn evict_before(&mut self, _evaluated_at_ms: i64) {}
//!     fn clear(&mut self) {}
//! }
//! ```

use hashbrown::HashMap;

use crate::types::{DerivedPresentationParams, EvaluationContext, GradePolicy, MotionPreference};

/// Identity of one evaluation: which record, when, and under which context.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub record_id: String,
    /// Evaluation timestamp in Unix epoch milliseconds.
    pub evaluated_at_ms: i64,
    pub motion: MotionPreference,
    pub emergency: bool,
    pub grade_policy: Option<GradePolicy>,
}

impl CacheKey {
    pub fn new(record_id: &str, ctx: &EvaluationContext) -> Self {
        Self {
            record_id: record_id.into(),
            evaluated_at_ms: ctx.now.timestamp_millis(),
            motion: ctx.motion,
            emergency: ctx.emergency.active,
            grade_policy: ctx.grade_policy,
        }
    }
}

/// Pluggable memoization interface.
pub trait ParamsCache {
    /// Previously stored parameters for `key`, if any.
    fn get(&self, key: &CacheKey) -> Option<DerivedPresentationParams>;

    /// Store or overwrite the parameters for `key`.
    fn insert(&mut self, key: CacheKey, params: DerivedPresentationParams);

    /// Drop every entry evaluated before `evaluated_at_ms`.
    /// [`CompositionPipeline::evaluate_cached`](crate::pipeline::CompositionPipeline::evaluate_cached)
    /// calls this on every miss with `now` minus the re-evaluation interval.
    fn evict_before(&mut self, evaluated_at_ms: i64);

    /// Drop everything.
    fn clear(&mut self);
}

/// A volatile [`ParamsCache`] backed by [`hashbrown::HashMap`].
///
/// # Examples
///
/// ```rust
/// use chrono::{TimeZone, Utc};
/// use trustsignal_core::{
///     cache::{InMemoryCache, ParamsCache},
///     pipeline::CompositionPipeline,
///     types::{EvaluationContext, SourceRecord},
/// };
///
/// let pipeline = CompositionPipeline::default();
/// let mut cache = InMemoryCache::new();
/// let now = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
/// let record = SourceRecord::new("msg-1", now);
///
/// pipeline.evaluate_cached(&record, &EvaluationContext::at(now), &mut cache);
/// assert_eq!(cache.len(), 1);
///
/// cache.evict_before(now.timestamp_millis() + 1);
/// assert!(cache.is_empty());
/// ```
#[derive(Debug, Default, Clone)]
pub struct InMemoryCache {
    entries: HashMap<CacheKey, DerivedPresentationParams>,
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ParamsCache for InMemoryCache {
    fn get(&self, key: &CacheKey) -> Option<DerivedPresentationParams> {
        self.entries.get(key).cloned()
    }

    fn insert(&mut self, key: CacheKey, params: DerivedPresentationParams) {
        self.entries.insert(key, params);
    }

    fn evict_before(&mut self, evaluated_at_ms: i64) {
        self.entries.retain(|key, _| key.evaluated_at_ms >= evaluated_at_ms);
    }

    fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::CompositionPipeline;
    use crate::types::{EmergencyOverride, SourceRecord};
    use chrono::{Duration, TimeZone, Utc};

    #[test]
    fn test_context_changes_miss_the_cache() {
        let pipeline = CompositionPipeline::default();
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        let record = SourceRecord::new("r", now);
        let mut cache = InMemoryCache::new();

        let calm = EvaluationContext::at(now);
        let urgent = calm.with_emergency(EmergencyOverride::ACTIVE);
        let later = EvaluationContext::at(now + Duration::seconds(30));

        let first = pipeline.evaluate_cached(&record, &calm, &mut cache);
        let second = pipeline.evaluate_cached(&record, &urgent, &mut cache);
        pipeline.evaluate_cached(&record, &later, &mut cache);

        assert_ne!(first.opacity, second.opacity);
        assert_eq!(cache.len(), 3);

        cache.evict_before(later.now.timestamp_millis());
        assert_eq!(cache.len(), 1);

        cache.clear();
        assert!(cache.is_empty());
    }
}
