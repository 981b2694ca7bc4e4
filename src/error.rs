//! Engine error types.
//!
//! Hard errors are limited to malformed input (intervals, percentages,
//! configuration) and rejected writes (stale versions, exhausted quotas,
//! missing entities). Overlapping phases and over-allocated members are
//! valid states; they are reported as [`Conflict`](crate::conflict::Conflict)s,
//! never as errors.
//!
//! Nothing here is retried inside the engine. Retry policy belongs to the caller.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Result alias used throughout the engine.
pub type Result<T> = std::result::Result<T, EngineError>;

/// Errors produced by the allocation and conflict engine.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    /// A bounded interval whose start lies after its end.
    #[error("invalid interval: start {start} is after end {end}")]
    InvalidInterval { start: NaiveDate, end: NaiveDate },

    /// Working percentage outside `0..=100`.
    #[error("invalid working percentage {percentage} (expected 0..=100)")]
    InvalidPercentage { percentage: u32 },

    /// A stored version below the initial version.
    #[error("{entity} '{id}' has version {version}; versions start at 1")]
    InvalidVersion {
        entity: EntityKind,
        id: String,
        version: u64,
    },

    /// Day count requested for an open-ended interval.
    #[error("interval starting {start} has no end; duration is undefined")]
    UnboundedDuration { start: NaiveDate },

    /// The supplied version does not match the stored one.
    #[error("{entity} '{id}' is at version {current}, update was based on version {supplied}")]
    StaleVersion {
        entity: EntityKind,
        id: String,
        current: u64,
        supplied: u64,
    },

    /// The modification ledger has no remaining events.
    #[error("modification quota exhausted for project '{project_id}': {used} of {total_allowed} used")]
    QuotaExceeded {
        project_id: String,
        total_allowed: u32,
        used: u32,
    },

    /// A record with this id already exists.
    #[error("{entity} '{id}' already exists")]
    Duplicate { entity: EntityKind, id: String },

    /// The referenced entity no longer exists.
    #[error("{entity} '{id}' not found")]
    NotFound { entity: EntityKind, id: String },

    /// Engine configuration rejected at load time.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Serializable error category, as surfaced to API clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    InvalidInterval,
    InvalidPercentage,
    InvalidVersion,
    UnboundedDuration,
    StaleVersion,
    QuotaExceeded,
    Duplicate,
    NotFound,
    Config,
}

/// Entity types that can be named in an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityKind {
    Task,
    Phase,
    Project,
    Assignment,
    Ledger,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Task => "task",
            Self::Phase => "phase",
            Self::Project => "project",
            Self::Assignment => "assignment",
            Self::Ledger => "ledger",
        };
        f.write_str(name)
    }
}

impl EngineError {
    /// Creates a not-found error.
    pub fn not_found(entity: EntityKind, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }

    /// Error category.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidInterval { .. } => ErrorKind::InvalidInterval,
            Self::InvalidPercentage { .. } => ErrorKind::InvalidPercentage,
            Self::InvalidVersion { .. } => ErrorKind::InvalidVersion,
            Self::UnboundedDuration { .. } => ErrorKind::UnboundedDuration,
            Self::StaleVersion { .. } => ErrorKind::StaleVersion,
            Self::QuotaExceeded { .. } => ErrorKind::QuotaExceeded,
            Self::Duplicate { .. } => ErrorKind::Duplicate,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Config(_) => ErrorKind::Config,
        }
    }

    /// HTTP status the API layer should answer with.
    pub fn http_status(&self) -> u16 {
        match self.kind() {
            ErrorKind::InvalidInterval
            | ErrorKind::InvalidPercentage
            | ErrorKind::InvalidVersion
            | ErrorKind::UnboundedDuration => 400,
            ErrorKind::StaleVersion | ErrorKind::Duplicate => 409,
            ErrorKind::QuotaExceeded => 422,
            ErrorKind::NotFound => 404,
            ErrorKind::Config => 500,
        }
    }

    /// Whether the caller should re-read the entity and decide again.
    ///
    /// Stale versions and vanished entities are handled the same way.
    pub fn requires_reread(&self) -> bool {
        matches!(self.kind(), ErrorKind::StaleVersion | ErrorKind::NotFound)
    }

    /// Remaining modification count, for quota rejections.
    pub fn remaining_modifications(&self) -> Option<u32> {
        match self {
            Self::QuotaExceeded {
                total_allowed,
                used,
                ..
            } => Some(total_allowed.saturating_sub(*used)),
            _ => None,
        }
    }
}
