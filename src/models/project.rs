//! Project model.

use serde::{Deserialize, Serialize};

use crate::concurrency::{Versioned, INITIAL_VERSION};
use crate::error::EntityKind;

/// A construction project. Owns phases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    /// Unique project identifier.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Lifecycle status.
    pub status: ProjectStatus,
    /// Concurrency token.
    pub version: u64,
}

/// Project lifecycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProjectStatus {
    #[default]
    Draft,
    Active,
    Suspended,
    Closed,
}

impl Project {
    /// Creates a draft project at the initial version.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            status: ProjectStatus::Draft,
            version: INITIAL_VERSION,
        }
    }

    /// Sets the name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

impl Versioned for Project {
    const KIND: EntityKind = EntityKind::Project;

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
