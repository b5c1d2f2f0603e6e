//! Serialisable scenario snapshots for import/export and save/fetch stores.
//!
//! The snapshot is the one JSON shape shared with host applications: file
//! import/export and the opaque key/value save endpoint both move this
//! record. The core neither parses files nor talks to the store.

use crate::scenario::Scenario;
use chrono::{DateTime, Utc};
use ladder_core::types::{Constraints, SearchRanges};
use serde::{Deserialize, Serialize};

/// Current snapshot schema version.
pub const SNAPSHOT_VERSION: u32 = 1;

/// A complete saved state: scenario plus optimiser configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioSnapshot {
    /// Schema version for forward-compatible hosts.
    pub version: u32,
    /// Capture timestamp.
    pub saved_at: DateTime<Utc>,
    /// The full scenario bundle.
    pub scenario: Scenario,
    /// Guardrails in force when the snapshot was taken.
    pub constraints: Constraints,
    /// Grid-search ranges in force when the snapshot was taken.
    pub ranges: SearchRanges,
}

impl ScenarioSnapshot {
    /// Captures the current state, stamped with `Utc::now()`.
    pub fn capture(scenario: Scenario, constraints: Constraints, ranges: SearchRanges) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            saved_at: Utc::now(),
            scenario,
            constraints,
            ranges,
        }
    }

    /// Serialises to the interchange JSON shape.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Deserialises from the interchange JSON shape.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}
