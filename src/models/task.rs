//! Task model.
//!
//! A task is a unit of work inside a phase. Tasks have no scheduling
//! semantics of their own here; they matter because they are versioned and
//! are removed together with their phase.

use serde::{Deserialize, Serialize};

use crate::concurrency::{Versioned, INITIAL_VERSION};
use crate::error::EntityKind;

/// A task within a phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Unique task identifier.
    pub id: String,
    /// Owning phase. Deleting the phase deletes the task.
    pub phase_id: String,
    /// Human-readable name.
    pub name: String,
    /// Progress status.
    pub status: TaskStatus,
    /// Concurrency token.
    pub version: u64,
}

/// Task progress.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    #[default]
    Todo,
    InProgress,
    Blocked,
    Done,
}

impl Task {
    /// Creates a new task at the initial version.
    pub fn new(id: impl Into<String>, phase_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            phase_id: phase_id.into(),
            name: String::new(),
            status: TaskStatus::Todo,
            version: INITIAL_VERSION,
        }
    }

    /// Sets the task name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the status.
    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }

    /// Overrides the version, for records loaded from storage.
    /// [`MemoryStore`](crate::store::MemoryStore) refuses versions below 1.
    pub fn with_version(mut self, version: u64) -> Self {
        self.version = version;
        self
    }

    /// Whether the task is finished.
    pub fn is_done(&self) -> bool {
        self.status == TaskStatus::Done
    }
}

impl Versioned for Task {
    const KIND: EntityKind = EntityKind::Task;

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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_builder() {
        let task = Task::new("T1", "PH1")
            .with_name("Pour foundation")
            .with_status(TaskStatus::InProgress)
            .with_version(3);

        assert_eq!(task.id, "T1");
        assert_eq!(task.phase_id, "PH1");
        assert_eq!(task.name, "Pour foundation");
        assert_eq!(task.status, TaskStatus::InProgress);
        assert_eq!(task.version, 3);
        assert!(!task.is_done());
    }

    #[test]
    fn test_task_defaults() {
        let task = Task::new("T1", "PH1");
        assert_eq!(task.version, INITIAL_VERSION);
        assert_eq!(task.status, TaskStatus::Todo);
    }
}
