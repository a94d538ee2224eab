// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 MuVeraAI Corporation

//! Operational status mapping.
//!
//! [`OperationalStatusMapper`] evaluates a priority-ordered decision table,
//! top-down, first match wins:
//!
//! 1. in maintenance                          → `maintenance`
//! 2. critical impact, or confidence < 50     → `fault`
//! 3. confidence ≥ 90                         → `optimal`
//! 4. confidence ≥ 70                         → `nominal`
//! 5. otherwise                               → `degraded`
//!
//! Each status then looks up fixed constants in the configured
//! [`StatusTable`], and translates to a coarser [`HealthCategory`] for dense
//! displays such as sensor grids.

use crate::config::{StatusProfile, StatusTable};
use crate::trust::clamp_confidence;
use crate::types::{HealthCategory, Impact, OperationalStatus, SourceRecord};

const FAULT_BELOW: f64 = 50.0;
const OPTIMAL_FROM: f64 = 90.0;
const NOMINAL_FROM: f64 = 70.0;

/// The record attributes the decision table reads.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StatusInputs {
    pub in_maintenance: bool,
    pub impact: Option<Impact>,
    /// `None` when the record carries no confidence at all.
    pub confidence: Option<f64>,
}

impl StatusInputs {
    pub fn from_record(record: &SourceRecord) -> Self {
        Self {
            in_maintenance: record.is_in_maintenance.unwrap_or(false),
            impact: record.impact,
            confidence: record.effective_confidence(),
        }
    }
}

/// Decision table plus the per-status constant table.
///
/// # Examples
///
/// ```rust
/// use trustsignal_core::{
///     status::{OperationalStatusMapper, StatusInputs},
///     types::{Impact, OperationalStatus},
/// };
///
/// let mapper = OperationalStatusMapper::default();
///
/// let status = mapper.map(&StatusInputs {
///     in_maintenance: true,
///     impact: None,
///     confidence: Some(95.0),
/// });
/// assert_eq!(status, OperationalStatus::Maintenance);
///
/// let status = mapper.map(&StatusInputs {
///     in_maintenance: false,
///     impact: Some(Impact::Critical),
///     confidence: Some(99.0),
/// });
/// assert_eq!(status, OperationalStatus::Fault);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct OperationalStatusMapper {
    table: StatusTable,
}

impl OperationalStatusMapper {
    pub fn new(table: StatusTable) -> Self {
        Self { table }
    }

    /// Run the decision table.  A record with no confidence that is neither
    /// in maintenance nor critical maps to `nominal`.
    pub fn map(&self, inputs: &StatusInputs) -> OperationalStatus {
        if inputs.in_maintenance {
            return OperationalStatus::Maintenance;
        }
        if inputs.impact == Some(Impact::Critical) {
            return OperationalStatus::Fault;
        }
        let Some(confidence) = inputs.confidence.map(clamp_confidence) else {
            return OperationalStatus::Nominal;
        };
        if confidence < FAULT_BELOW {
            OperationalStatus::Fault
        } else if confidence >= OPTIMAL_FROM {
            OperationalStatus::Optimal
        } else if confidence >= NOMINAL_FROM {
            OperationalStatus::Nominal
        } else {
            OperationalStatus::Degraded
        }
    }

    /// Status for a record: the producer's precomputed status when present,
    /// otherwise the decision table over the record's attributes.
    pub fn resolve(&self, record: &SourceRecord) -> OperationalStatus {
        match record.operational_status {
            Some(status) => status,
            None => self.map(&StatusInputs::from_record(record)),
        }
    }

    /// Fixed presentation constants for `status`.
    pub fn profile(&self, status: OperationalStatus) -> StatusProfile {
        self.table.get(status)
    }
}

impl HealthCategory {
    /// Translate a status into the coarse health vocabulary.  The absence of
    /// any status reads as `offline`.
    ///
    /// ```rust
    /// use trustsignal_core::types::{HealthCategory, OperationalStatus};
    ///
    /// assert_eq!(HealthCategory::from_status(Some(OperationalStatus::Nominal)), HealthCategory::Healthy);
    /// assert_eq!(HealthCategory::from_status(Some(OperationalStatus::Maintenance)), HealthCategory::Critical);
    /// assert_eq!(HealthCategory::from_status(None), HealthCategory::Offline);
    /// ```
    pub fn from_status(status: Option<OperationalStatus>) -> HealthCategory {
        match status {
            Some(OperationalStatus::Optimal) | Some(OperationalStatus::Nominal) => HealthCategory::Healthy,
            Some(OperationalStatus::Degraded) => HealthCategory::Degraded,
            Some(OperationalStatus::Maintenance) | Some(OperationalStatus::Fault) => HealthCategory::Critical,
            None => HealthCategory::Offline,
        }
    }

    /// Rank used to summarise many elements; higher is worse.
    pub fn severity(self) -> u8 {
        match self {
            HealthCategory::Healthy  => 0,
            HealthCategory::Degraded => 1,
            HealthCategory::Offline  => 2,
            HealthCategory::Critical => 3,
        }
    }
}

/// Worst health across a grid of elements, each of which may be missing a
/// status.  An empty grid is `offline`.
pub fn aggregate_health(statuses: &[Option<OperationalStatus>]) -> HealthCategory {
    statuses
        .iter()
        .map(|status| HealthCategory::from_status(*status))
        .max_by_key(|category| category.severity())
        .unwrap_or(HealthCategory::Offline)
}
