//! Optimistic concurrency guard.
//!
//! Every mutable scheduling record carries a version that starts at
//! [`INITIAL_VERSION`] and grows by exactly one per accepted mutation. A
//! write must name the version it read. A mismatch is rejected with
//! [`EngineError::StaleVersion`]; nothing is merged.
//!
//! # Storage Contract
//! The guard only decides. Making read-check-write atomic is the storage
//! collaborator's job, e.g. `UPDATE .. SET .., version = version + 1
//! WHERE id = ? AND version = ?` with a check on the affected row count.
//! See [`ScheduleStore`](crate::store::ScheduleStore).

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EntityKind, Result};
use crate::models::{Interval, Phase, PhaseStatus, Project, ProjectStatus, Task, TaskStatus};

/// Version assigned on creation.
pub const INITIAL_VERSION: u64 = 1;

/// A record protected by a version counter.
pub trait Versioned {
    /// Entity type, for error reporting.
    const KIND: EntityKind;

    /// Record identifier.
    fn id(&self) -> &str;

    /// Current version.
    fn version(&self) -> u64;

    /// Overwrites the version. Only the guard should call this.
    fn set_version(&mut self, version: u64);
}

/// A change applied to a copy of a record during an accepted update.
///
/// Implemented by the typed `*Changes` structs and by any
/// `FnOnce(&mut T)` closure.
pub trait Patch<T> {
    /// Writes the change into `target`.
    fn apply_to(self, target: &mut T);
}

impl<T, F> Patch<T> for F
where
    F: FnOnce(&mut T),
{
    fn apply_to(self, target: &mut T) {
        self(target)
    }
}

/// Checks that `supplied_version` matches the record.
pub fn check_version<T: Versioned>(current: &T, supplied_version: u64) -> Result<()> {
    if current.version() != supplied_version {
        tracing::warn!(
            entity = %T::KIND,
            id = current.id(),
            current = current.version(),
            supplied = supplied_version,
            "rejecting stale update"
        );
        return Err(EngineError::StaleVersion {
            entity: T::KIND,
            id: current.id().to_string(),
            current: current.version(),
            supplied: supplied_version,
        });
    }
    Ok(())
}

/// Applies `changes` to a copy of `current` if the versions match.
///
/// Returns the updated record at `current.version() + 1`. On mismatch the
/// input is untouched and no change is applied.
pub fn apply_update<T, P>(current: &T, supplied_version: u64, changes: P) -> Result<T>
where
    T: Versioned + Clone,
    P: Patch<T>,
{
    check_version(current, supplied_version)?;

    let mut next = current.clone();
    changes.apply_to(&mut next);
    next.set_version(current.version() + 1);

    tracing::debug!(
        entity = %T::KIND,
        id = next.id(),
        version = next.version(),
        "update accepted"
    );
    Ok(next)
}

/// Partial update of a [`Task`]. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskChanges {
    pub name: Option<String>,
    pub status: Option<TaskStatus>,
}

impl TaskChanges {
    /// Changes only the status.
    pub fn status(status: TaskStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }
}

impl Patch<Task> for TaskChanges {
    fn apply_to(self, task: &mut Task) {
        if let Some(name) = self.name {
            task.name = name;
        }
        if let Some(status) = self.status {
            task.status = status;
        }
    }
}

/// Partial update of a [`Phase`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhaseChanges {
    pub name: Option<String>,
    pub interval: Option<Interval>,
    pub status: Option<PhaseStatus>,
}

impl Patch<Phase> for PhaseChanges {
    fn apply_to(self, phase: &mut Phase) {
        if let Some(name) = self.name {
            phase.name = name;
        }
        if let Some(interval) = self.interval {
            phase.interval = interval;
        }
        if let Some(status) = self.status {
            phase.status = status;
        }
    }
}

/// Partial update of a [`Project`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectChanges {
    pub name: Option<String>,
    pub status: Option<ProjectStatus>,
}

impl Patch<Project> for ProjectChanges {
    fn apply_to(self, project: &mut Project) {
        if let Some(name) = self.name {
            project.name = name;
        }
        if let Some(status) = self.status {
            project.status = status;
        }
    }
}
