//! Storage collaborator interface.
//!
//! The engine does not persist anything. It needs a store that can load
//! the records it computes over and that offers an atomic
//! compare-and-swap on version for every versioned entity:
//!
//! ```sql
//! UPDATE task SET status = ?, version = version + 1
//! WHERE id = ? AND version = ?
//! -- 0 rows affected: re-read; missing row is NOT_FOUND, else STALE_VERSION
//! ```
//!
//! Without that primitive the guarantee "exactly one of two concurrent
//! updates wins" does not hold, and no in-process lock can restore it.
//!
//! [`MemoryStore`] is a reference implementation backed by a single lock.

mod memory;

pub use memory::MemoryStore;

use crate::concurrency::{PhaseChanges, ProjectChanges, TaskChanges};
use crate::error::Result;
use crate::models::{Assignment, Phase, Project, Task};
use crate::quota::ModificationLedger;

/// Which assignments to load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignmentScope<'a> {
    /// Every assignment of one team member, across projects.
    TeamMember(&'a str),
    /// Assignments of one phase.
    Phase(&'a str),
    /// Assignments of all phases of one project.
    Project(&'a str),
}

/// Persistence operations the engine relies on.
///
/// Implementations must make each `cas_update_*` and
/// `append_ledger_event` call atomic with respect to concurrent callers.
pub trait ScheduleStore: Send + Sync {
    /// Loads assignments in a stable order.
    fn load_assignments(&self, scope: AssignmentScope<'_>) -> Result<Vec<Assignment>>;

    /// Loads a project's phases in a stable order.
    fn load_phases(&self, project_id: &str) -> Result<Vec<Phase>>;

    /// Loads one task, or `NOT_FOUND`.
    fn load_task(&self, task_id: &str) -> Result<Task>;

    /// Loads one phase, or `NOT_FOUND`.
    fn load_phase(&self, phase_id: &str) -> Result<Phase>;

    /// Loads one project, or `NOT_FOUND`.
    fn load_project(&self, project_id: &str) -> Result<Project>;

    /// Applies `changes` iff the task is still at `expected_version`.
    fn cas_update_task(
        &self,
        task_id: &str,
        expected_version: u64,
        changes: TaskChanges,
    ) -> Result<Task>;

    /// Applies `changes` iff the phase is still at `expected_version`.
    fn cas_update_phase(
        &self,
        phase_id: &str,
        expected_version: u64,
        changes: PhaseChanges,
    ) -> Result<Phase>;

    /// Applies `changes` iff the project is still at `expected_version`.
    fn cas_update_project(
        &self,
        project_id: &str,
        expected_version: u64,
        changes: ProjectChanges,
    ) -> Result<Project>;

    /// Loads a project's modification ledger.
    fn load_ledger(&self, project_id: &str) -> Result<ModificationLedger>;

    /// Appends one modification event, or fails with `QUOTA_EXCEEDED`.
    fn append_ledger_event(&self, project_id: &str, days_used: u32) -> Result<ModificationLedger>;
}
