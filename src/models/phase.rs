//! Project phase model.
//!
//! Phases are meant to run one after another. Overlaps are allowed but
//! reported by the conflict detector.

use serde::{Deserialize, Serialize};

use super::Interval;
use crate::concurrency::{Versioned, INITIAL_VERSION};
use crate::error::EntityKind;

/// A phase of a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Phase {
    /// Unique phase identifier.
    pub id: String,
    /// Owning project.
    pub project_id: String,
    /// Human-readable name.
    pub name: String,
    /// Planned dates.
    pub interval: Interval,
    /// Lifecycle status.
    pub status: PhaseStatus,
    /// Concurrency token.
    pub version: u64,
}

/// Phase lifecycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PhaseStatus {
    #[default]
    Planned,
    InProgress,
    Completed,
    OnHold,
    Cancelled,
}

impl Phase {
    /// Creates a planned phase at the initial version.
    pub fn new(id: impl Into<String>, project_id: impl Into<String>, interval: Interval) -> Self {
        Self {
            id: id.into(),
            project_id: project_id.into(),
            name: String::new(),
            interval,
            status: PhaseStatus::Planned,
            version: INITIAL_VERSION,
        }
    }

    /// Sets the name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the status.
    pub fn with_status(mut self, status: PhaseStatus) -> Self {
        self.status = status;
        self
    }
}

impl Versioned for Phase {
    const KIND: EntityKind = EntityKind::Phase;

    fn id(&self) -> &str {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }

    fn set_version(&mut self, version: u64) {
        self.version = version;
    }
}
