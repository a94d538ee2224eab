// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 MuVeraAI Corporation

//! Live re-evaluation backed by Tokio.
//!
//! This module is only compiled when the `async` feature flag is enabled:
//!
//! ```toml
//! [dependencies]
//! trustsignal-core = { version = "0.1", features = ["async"] }
//! ```
//!
//! # Design
//!
//! A [`LiveEvaluator`] owns one Tokio task per evaluating context.  The task
//! recomputes the record's [`DerivedPresentationParams`] whenever any of
//! three sources fires:
//!
//! 1. a new or updated record arrives ([`LiveEvaluator::publish`])
//! 2. the periodic re-evaluation tick elapses, so age-driven decay shows on
//!    otherwise idle records
//! 3. the user's [`MotionPreference`] changes, observed through a `watch`
//!    subscription rather than by polling
//!
//! The emergency override is a fourth, caller-driven input.  Output is
//! published on a `watch` channel.
//!
//! Teardown is deterministic: [`LiveEvaluator::shutdown`] stops the task and
//! waits for it, and dropping the evaluator aborts it.  Either way the
//! interval and the preference subscription are released with the task.
//!
//! # Example
//!
//! ```rust,no_run
//! use chrono::Utc;
//! use tokio::sync::watch;
//! use trustsignal_core::{
//!     live::LiveEvaluator,
//!     pipeline::CompositionPipeline,
//!     types::{MotionPreference, SourceRecord},
//! };
//!
//! #[tokio::main]
//! async fn main() {
//!     let (_motion_tx, motion_rx) = watch::channel(MotionPreference::Full);
//!     let evaluator = LiveEvaluator::spawn(CompositionPipeline::default(), motion_rx);
//!     let mut updates = evaluator.subscribe();
//!
//!     evaluator.publish(SourceRecord::new("decision-1", Utc::now()));
//!     updates.changed().await.unwrap();
//!     println!("{:?}", *updates.borrow());
//!
//!     evaluator.shutdown().await;
//! }
//! ```

#![cfg(feature = "async")]

use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, trace};

use crate::pipeline::CompositionPipeline;
use crate::types::{
    DerivedPresentationParams, EmergencyOverride, EvaluationContext, MotionPreference, SourceRecord,
};

/// Source of evaluation timestamps.
pub trait Clock: Send + Sync + 'static {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Handle to a running re-evaluation task.
pub struct LiveEvaluator {
    record_tx: watch::Sender<Option<SourceRecord>>,
    emergency_tx: watch::Sender<EmergencyOverride>,
    output_rx: watch::Receiver<Option<DerivedPresentationParams>>,
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl LiveEvaluator {
    /// Spawn a re-evaluation task on the current Tokio runtime using the
    /// wall clock.
    pub fn spawn(pipeline: CompositionPipeline, motion: watch::Receiver<MotionPreference>) -> Self {
        Self::spawn_with_clock(pipeline, motion, SystemClock)
    }

    /// Spawn a re-evaluation task that reads time from `clock`.
    pub fn spawn_with_clock<C: Clock>(
        pipeline: CompositionPipeline,
        motion: watch::Receiver<MotionPreference>,
        clock: C,
    ) -> Self {
        let (record_tx, record_rx) = watch::channel(None);
        let (emergency_tx, emergency_rx) = watch::channel(EmergencyOverride::INACTIVE);
        let (output_tx, output_rx) = watch::channel(None);
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        let worker = Worker {
            pipeline,
            clock,
            record_rx,
            emergency_rx,
            motion_rx: motion,
            output_tx,
        };
        let task = tokio::spawn(worker.run(shutdown_rx));

        Self {
            record_tx,
            emergency_tx,
            output_rx,
            shutdown_tx: Some(shutdown_tx),
            task: Some(task),
        }
    }

    /// Replace the record being evaluated and recompute immediately.
    pub fn publish(&self, record: SourceRecord) {
        self.record_tx.send_replace(Some(record));
    }

    /// Turn the emergency override on or off.
    pub fn set_emergency(&self, emergency: EmergencyOverride) {
        self.emergency_tx.send_replace(emergency);
    }

    /// Subscribe to every recomputation.
    pub fn subscribe(&self) -> watch::Receiver<Option<DerivedPresentationParams>> {
        self.output_rx.clone()
    }

    /// Most recent output, `None` until a record has been published.
    pub fn latest(&self) -> Option<DerivedPresentationParams> {
        self.output_rx.borrow().clone()
    }

    /// Stop the task and wait until it has released its interval and
    /// subscriptions.
    pub async fn shutdown(mut self) {
        if let Some(shutdown_tx) = self.shutdown_tx.take() {
            let _ = shutdown_tx.send(());
        }
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for LiveEvaluator {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

// ---------------------------------------------------------------------------
// Worker
// ---------------------------------------------------------------------------

struct Worker<C: Clock> {
    pipeline: CompositionPipeline,
    clock: C,
    record_rx: watch::Receiver<Option<SourceRecord>>,
    emergency_rx: watch::Receiver<EmergencyOverride>,
    motion_rx: watch::Receiver<MotionPreference>,
    output_tx: watch::Sender<Option<DerivedPresentationParams>>,
}

impl<C: Clock> Worker<C> {
    async fn run(mut self, mut shutdown_rx: oneshot::Receiver<()>) {
        let period = Duration::from_millis(self.pipeline.config().reevaluation_interval_ms.max(1));
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut motion_open = true;

        info!(interval_ms = period.as_millis() as u64, "live evaluation started");

        loop {
            tokio::select! {
                biased;
                _ = &mut shutdown_rx => break,
                changed = self.record_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    debug!("record updated");
                }
                changed = self.emergency_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    debug!(active = self.emergency_rx.borrow().active, "emergency override changed");
                }
                changed = self.motion_rx.changed(), if motion_open => {
                    match changed {
                        Ok(()) => debug!(preference = ?*self.motion_rx.borrow(), "motion preference changed"),
                        // The preference source is gone; keep the last value.
                        Err(_) => motion_open = false,
                    }
                }
                _ = ticker.tick() => trace!("re-evaluation tick"),
            }
            self.recompute();
        }

        info!("live evaluation stopped");
    }

    fn recompute(&mut self) {
        let record = self.record_rx.borrow_and_update().clone();
        let Some(record) = record else {
            return;
        };
        let ctx = EvaluationContext::at(self.clock.now())
            .with_motion(*self.motion_rx.borrow_and_update())
            .with_emergency(*self.emergency_rx.borrow_and_update());
        let params = self.pipeline.evaluate(&record, &ctx);
        self.output_tx.send_replace(Some(params));
    }
}
