//! In-memory store.
//!
//! All state sits behind one `RwLock`; every compare-and-swap runs under
//! the write guard, which makes read-check-write atomic.

use std::collections::HashMap;

use parking_lot::RwLock;

use super::{AssignmentScope, ScheduleStore};
use crate::concurrency::{
    apply_update, Patch, PhaseChanges, ProjectChanges, TaskChanges, Versioned, INITIAL_VERSION,
};
use crate::config::EngineConfig;
use crate::error::{EngineError, EntityKind, Result};
use crate::models::{Assignment, Phase, Project, Task};
use crate::quota::ModificationLedger;

#[derive(Debug, Default)]
struct State {
    projects: HashMap<String, Project>,
    // Vecs keep insertion order, so loads are stable.
    phases: Vec<Phase>,
    tasks: Vec<Task>,
    assignments: Vec<Assignment>,
    ledgers: HashMap<String, ModificationLedger>,
}

/// Thread-safe in-memory [`ScheduleStore`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    config: EngineConfig,
    state: RwLock<State>,
}

impl MemoryStore {
    /// Creates an empty store. `config` supplies default ledger policy.
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            state: RwLock::new(State::default()),
        }
    }

    /// Inserts a new project.
    ///
    /// Existing records change only through `cas_update_*`, so an id that is
    /// already present is rejected rather than replaced.
    pub fn insert_project(&self, project: Project) -> Result<()> {
        let mut state = self.state.write();
        check_new(&project, state.projects.contains_key(&project.id))?;
        state.projects.insert(project.id.clone(), project);
        Ok(())
    }

    /// Inserts a new phase. The project must exist.
    pub fn insert_phase(&self, phase: Phase) -> Result<()> {
        let mut state = self.state.write();
        if !state.projects.contains_key(&phase.project_id) {
            return Err(EngineError::not_found(EntityKind::Project, &phase.project_id));
        }
        check_new(&phase, state.phases.iter().any(|p| p.id == phase.id))?;
        state.phases.push(phase);
        Ok(())
    }

    /// Inserts a new task. The phase must exist.
    pub fn insert_task(&self, task: Task) -> Result<()> {
        let mut state = self.state.write();
        if !state.phases.iter().any(|p| p.id == task.phase_id) {
            return Err(EngineError::not_found(EntityKind::Phase, &task.phase_id));
        }
        check_new(&task, state.tasks.iter().any(|t| t.id == task.id))?;
        state.tasks.push(task);
        Ok(())
    }

    /// Inserts a new assignment. The phase must exist.
    pub fn insert_assignment(&self, assignment: Assignment) -> Result<()> {
        let mut state = self.state.write();
        if !state.phases.iter().any(|p| p.id == assignment.phase_id) {
            return Err(EngineError::not_found(EntityKind::Phase, &assignment.phase_id));
        }
        if state.assignments.iter().any(|a| a.id == assignment.id) {
            return Err(EngineError::Duplicate {
                entity: EntityKind::Assignment,
                id: assignment.id,
            });
        }
        state.assignments.push(assignment);
        Ok(())
    }

    /// Removes an assignment entirely.
    pub fn delete_assignment(&self, assignment_id: &str) -> Result<Assignment> {
        let mut state = self.state.write();
        let idx = state
            .assignments
            .iter()
            .position(|a| a.id == assignment_id)
            .ok_or_else(|| EngineError::not_found(EntityKind::Assignment, assignment_id))?;
        Ok(state.assignments.remove(idx))
    }

    /// Deletes a phase with its tasks and assignments in one step.
    pub fn delete_phase(&self, phase_id: &str) -> Result<Phase> {
        let mut state = self.state.write();
        let idx = state
            .phases
            .iter()
            .position(|p| p.id == phase_id)
            .ok_or_else(|| EngineError::not_found(EntityKind::Phase, phase_id))?;
        let phase = state.phases.remove(idx);

        let tasks_before = state.tasks.len();
        state.tasks.retain(|t| t.phase_id != phase_id);
        state.assignments.retain(|a| a.phase_id != phase_id);
        tracing::info!(
            phase = phase_id,
            tasks = tasks_before - state.tasks.len(),
            "phase deleted with its tasks"
        );
        Ok(phase)
    }

    /// Installs a ledger with an explicit policy, replacing any existing one.
    pub fn open_ledger(&self, ledger: ModificationLedger) {
        self.state
            .write()
            .ledgers
            .insert(ledger.project_id.clone(), ledger);
    }

    fn ledger_or_default(&self, state: &State, project_id: &str) -> Result<ModificationLedger> {
        if let Some(ledger) = state.ledgers.get(project_id) {
            return Ok(ledger.clone());
        }
        if state.projects.contains_key(project_id) {
            return Ok(ModificationLedger::with_defaults(project_id, &self.config));
        }
        Err(EngineError::not_found(EntityKind::Project, project_id))
    }
}

/// Rejects a record that is already stored or carries a version below 1.
fn check_new<T: Versioned>(record: &T, exists: bool) -> Result<()> {
    if exists {
        return Err(EngineError::Duplicate {
            entity: T::KIND,
            id: record.id().to_string(),
        });
    }
    if record.version() < INITIAL_VERSION {
        return Err(EngineError::InvalidVersion {
            entity: T::KIND,
            id: record.id().to_string(),
            version: record.version(),
        });
    }
    Ok(())
}

/// Compare-and-swap on one slot.
fn cas<T, P>(slot: Option<&mut T>, id: &str, expected: u64, changes: P) -> Result<T>
where
    T: Versioned + Clone,
    P: Patch<T>,
{
    let Some(slot) = slot else {
        tracing::warn!(entity = %T::KIND, id, "update of missing record");
        return Err(EngineError::not_found(T::KIND, id));
    };
    let next = apply_update(&*slot, expected, changes)?;
    *slot = next.clone();
    Ok(next)
}

impl ScheduleStore for MemoryStore {
    fn load_assignments(&self, scope: AssignmentScope<'_>) -> Result<Vec<Assignment>> {
        let state = self.state.read();
        let selected = match scope {
            AssignmentScope::TeamMember(member) => state
                .assignments
                .iter()
                .filter(|a| a.team_member_id == member)
                .cloned()
                .collect(),
            AssignmentScope::Phase(phase_id) => state
                .assignments
                .iter()
                .filter(|a| a.phase_id == phase_id)
                .cloned()
                .collect(),
            AssignmentScope::Project(project_id) => {
                let phase_ids: Vec<&str> = state
                    .phases
                    .iter()
                    .filter(|p| p.project_id == project_id)
                    .map(|p| p.id.as_str())
                    .collect();
                state
                    .assignments
                    .iter()
                    .filter(|a| phase_ids.contains(&a.phase_id.as_str()))
                    .cloned()
                    .collect()
            }
        };
        Ok(selected)
    }

    fn load_phases(&self, project_id: &str) -> Result<Vec<Phase>> {
        let state = self.state.read();
        if !state.projects.contains_key(project_id) {
            return Err(EngineError::not_found(EntityKind::Project, project_id));
        }
        Ok(state
            .phases
            .iter()
            .filter(|p| p.project_id == project_id)
            .cloned()
            .collect())
    }

    fn load_task(&self, task_id: &str) -> Result<Task> {
        self.state
            .read()
            .tasks
            .iter()
            .find(|t| t.id == task_id)
            .cloned()
            .ok_or_else(|| EngineError::not_found(EntityKind::Task, task_id))
    }

    fn load_phase(&self, phase_id: &str) -> Result<Phase> {
        self.state
            .read()
            .phases
            .iter()
            .find(|p| p.id == phase_id)
            .cloned()
            .ok_or_else(|| EngineError::not_found(EntityKind::Phase, phase_id))
    }

    fn load_project(&self, project_id: &str) -> Result<Project> {
        self.state
            .read()
            .projects
            .get(project_id)
            .cloned()
            .ok_or_else(|| EngineError::not_found(EntityKind::Project, project_id))
    }

    fn cas_update_task(
        &self,
        task_id: &str,
        expected_version: u64,
        changes: TaskChanges,
    ) -> Result<Task> {
        let mut state = self.state.write();
        let slot = state.tasks.iter_mut().find(|t| t.id == task_id);
        cas(slot, task_id, expected_version, changes)
    }

    fn cas_update_phase(
        &self,
        phase_id: &str,
        expected_version: u64,
        changes: PhaseChanges,
    ) -> Result<Phase> {
        let mut state = self.state.write();
        let slot = state.phases.iter_mut().find(|p| p.id == phase_id);
        cas(slot, phase_id, expected_version, changes)
    }

    fn cas_update_project(
        &self,
        project_id: &str,
        expected_version: u64,
        changes: ProjectChanges,
    ) -> Result<Project> {
        let mut state = self.state.write();
        let slot = state.projects.get_mut(project_id);
        cas(slot, project_id, expected_version, changes)
    }

    fn load_ledger(&self, project_id: &str) -> Result<ModificationLedger> {
        let state = self.state.read();
        self.ledger_or_default(&state, project_id)
    }

    fn append_ledger_event(&self, project_id: &str, days_used: u32) -> Result<ModificationLedger> {
        let mut state = self.state.write();
        let next = self.ledger_or_default(&state, project_id)?.consume(days_used)?;
        state.ledgers.insert(project_id.to_string(), next.clone());
        Ok(next)
    }
}
