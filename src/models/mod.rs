//! Scheduling domain models.
//!
//! Plain data for the records the engine reads: projects own phases,
//! phases own tasks and assignments, assignments reference team members.
//!
//! | Type | Versioned | Owned by |
//! |------|-----------|----------|
//! | `Project` | yes | - |
//! | `Phase` | yes | `Project` |
//! | `Task` | yes | `Phase` |
//! | `Assignment` | no | `Phase` |

mod assignment;
pub mod interval;
mod phase;
mod project;
mod task;

pub use assignment::{Assignment, AssignmentRole, MAX_WORKING_PERCENTAGE};
pub use interval::Interval;
pub use phase::{Phase, PhaseStatus};
pub use project::{Project, ProjectStatus};
pub use task::{Task, TaskStatus};
