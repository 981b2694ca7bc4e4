//! Engine facade for the API layer.
//!
//! Binds the pure components to a [`ScheduleStore`]. Reads load fresh data
//! and recompute; writes go through the store's compare-and-swap. Nothing is
//! cached between calls, so the workload and conflict views always agree.
//!
//! | Endpoint kind | Method | Failure surfaced as |
//! |---------------|--------|---------------------|
//! | workload view | [`workload`](SchedulingEngine::workload) | - |
//! | timeline / conflicts | [`detect_conflicts`](SchedulingEngine::detect_conflicts) | 404 |
//! | PUT/PATCH task, phase, project | `update_*` | 409 / 404 |
//! | requirement modification | [`record_modification`](SchedulingEngine::record_modification) | 422 |

use std::collections::HashSet;

use crate::allocation::{
    team_members, team_workload, workload_timeline, WorkloadSegment, WorkloadSnapshot,
};
use crate::concurrency::{PhaseChanges, ProjectChanges, TaskChanges};
use crate::config::EngineConfig;
use crate::conflict::{Conflict, ConflictDetector, ConflictType};
use crate::error::Result;
use crate::models::{Assignment, Interval, Phase, Project, Task};
use crate::quota::{ModificationLedger, QuotaStatus};
use crate::store::{AssignmentScope, ScheduleStore};

/// Allocation and conflict engine over a store.
#[derive(Debug)]
pub struct SchedulingEngine<S> {
    store: S,
    detector: ConflictDetector,
}

impl<S: ScheduleStore> SchedulingEngine<S> {
    /// Creates an engine with the given configuration.
    pub fn new(store: S, config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            store,
            detector: ConflictDetector::new(config),
        })
    }

    /// Underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Configuration in use.
    pub fn config(&self) -> &EngineConfig {
        self.detector.config()
    }

    /// Workload of one member over `query`, across all their projects.
    pub fn workload(&self, team_member_id: &str, query: &Interval) -> Result<WorkloadSnapshot> {
        let assignments = self
            .store
            .load_assignments(AssignmentScope::TeamMember(team_member_id))?;
        Ok(WorkloadSnapshot::compute(
            &assignments,
            team_member_id,
            query,
            self.config(),
        ))
    }

    /// Step-wise workload of one member across `range`.
    pub fn workload_timeline(
        &self,
        team_member_id: &str,
        range: &Interval,
    ) -> Result<Vec<WorkloadSegment>> {
        let assignments = self
            .store
            .load_assignments(AssignmentScope::TeamMember(team_member_id))?;
        Ok(workload_timeline(
            &assignments,
            team_member_id,
            range,
            self.config(),
        ))
    }

    /// Workload of every member staffed on `project_id`, counting all of
    /// their assignments.
    pub fn team_workload(
        &self,
        project_id: &str,
        query: &Interval,
    ) -> Result<Vec<WorkloadSnapshot>> {
        let assignments = self.member_wide_assignments(project_id)?;
        Ok(team_workload(&assignments, query, self.config()))
    }

    /// Phase overlaps of `project_id` and over-allocations of its members.
    ///
    /// Members are taken from the project's assignments, and their totals
    /// include assignments on other projects. An over-allocation is kept
    /// only if at least one of this project's assignments contributes to it.
    pub fn detect_conflicts(&self, project_id: &str) -> Result<Vec<Conflict>> {
        let phases = self.store.load_phases(project_id)?;
        let own: HashSet<String> = self
            .store
            .load_assignments(AssignmentScope::Project(project_id))?
            .into_iter()
            .map(|a| a.id)
            .collect();
        let assignments = self.member_wide_assignments(project_id)?;

        let mut conflicts = self.detector.detect(project_id, &phases, &assignments);
        conflicts.retain(|c| {
            c.conflict_type == ConflictType::PhaseOverlap
                || c.involved_ids.iter().any(|id| own.contains(id))
        });
        Ok(conflicts)
    }

    /// Project assignments first, then the same members' other assignments.
    fn member_wide_assignments(&self, project_id: &str) -> Result<Vec<Assignment>> {
        let mut assignments = self
            .store
            .load_assignments(AssignmentScope::Project(project_id))?;
        let members: Vec<String> = team_members(&assignments)
            .into_iter()
            .map(str::to_string)
            .collect();
        for member in &members {
            for a in self.store.load_assignments(AssignmentScope::TeamMember(member))? {
                if !assignments.iter().any(|known| known.id == a.id) {
                    assignments.push(a);
                }
            }
        }
        Ok(assignments)
    }

    /// Updates a task if `version` is current.
    pub fn update_task(&self, task_id: &str, version: u64, changes: TaskChanges) -> Result<Task> {
        let task = self.store.cas_update_task(task_id, version, changes)?;
        tracing::info!(task = task_id, version = task.version, "task updated");
        Ok(task)
    }

    /// Updates a phase if `version` is current.
    pub fn update_phase(
        &self,
        phase_id: &str,
        version: u64,
        changes: PhaseChanges,
    ) -> Result<Phase> {
        let phase = self.store.cas_update_phase(phase_id, version, changes)?;
        tracing::info!(phase = phase_id, version = phase.version, "phase updated");
        Ok(phase)
    }

    /// Updates a project if `version` is current.
    pub fn update_project(
        &self,
        project_id: &str,
        version: u64,
        changes: ProjectChanges,
    ) -> Result<Project> {
        let project = self.store.cas_update_project(project_id, version, changes)?;
        tracing::info!(project = project_id, version = project.version, "project updated");
        Ok(project)
    }

    /// Consumes one modification. `days_used` defaults to the ledger's
    /// days-per-modification.
    pub fn record_modification(
        &self,
        project_id: &str,
        days_used: Option<u32>,
    ) -> Result<ModificationLedger> {
        let days = match days_used {
            Some(days) => days,
            None => self.store.load_ledger(project_id)?.days_per_modification,
        };
        self.store.append_ledger_event(project_id, days)
    }

    /// Quota summary for a project.
    pub fn modification_status(&self, project_id: &str) -> Result<QuotaStatus> {
        Ok(self.store.load_ledger(project_id)?.status())
    }
}
