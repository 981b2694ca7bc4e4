//! Team-member assignment model.
//!
//! An assignment places one team member on one phase at a declared
//! working percentage for a date interval. The percentage means "share of
//! available time within this interval", so it counts in full on every
//! day the assignment is active.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::Interval;
use crate::error::{EngineError, Result};

/// Upper bound for a single assignment's working percentage.
pub const MAX_WORKING_PERCENTAGE: u32 = 100;

/// A team member's assignment to a phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    /// Unique assignment identifier.
    pub id: String,
    /// Owning phase.
    pub phase_id: String,
    /// Assigned team member (back-reference, not owned).
    pub team_member_id: String,
    /// Role on the phase.
    pub role: AssignmentRole,
    /// Declared share of the member's time, `0..=100`.
    pub working_percentage: u32,
    /// When the assignment applies.
    pub interval: Interval,
    /// Inactive assignments are ignored by workload computations.
    pub active: bool,
}

/// Role of a team member within a phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssignmentRole {
    #[default]
    TeamMember,
    TeamLeader,
}

impl Assignment {
    /// Creates an active team-member assignment.
    ///
    /// Rejects percentages above [`MAX_WORKING_PERCENTAGE`].
    pub fn new(
        id: impl Into<String>,
        phase_id: impl Into<String>,
        team_member_id: impl Into<String>,
        working_percentage: u32,
        interval: Interval,
    ) -> Result<Self> {
        check_percentage(working_percentage)?;
        Ok(Self {
            id: id.into(),
            phase_id: phase_id.into(),
            team_member_id: team_member_id.into(),
            role: AssignmentRole::TeamMember,
            working_percentage,
            interval,
            active: true,
        })
    }

    /// Sets the role.
    pub fn with_role(mut self, role: AssignmentRole) -> Self {
        self.role = role;
        self
    }

    /// Sets the active flag.
    pub fn with_active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    /// Changes the working percentage.
    pub fn set_working_percentage(&mut self, working_percentage: u32) -> Result<()> {
        check_percentage(working_percentage)?;
        self.working_percentage = working_percentage;
        Ok(())
    }

    /// Ends the assignment on `end` (exclusive).
    pub fn end_on(&mut self, end: NaiveDate) -> Result<()> {
        self.interval = self.interval.with_end(end)?;
        Ok(())
    }

    /// Logically ends the assignment without touching its interval.
    pub fn deactivate(&mut self) {
        self.active = false;
    }

    /// Whether this assignment counts toward the member's workload.
    #[inline]
    pub fn counts_for(&self, team_member_id: &str) -> bool {
        self.active && self.team_member_id == team_member_id
    }

    /// Whether the assignment is a team lead position.
    pub fn is_leader(&self) -> bool {
        self.role == AssignmentRole::TeamLeader
    }
}

fn check_percentage(percentage: u32) -> Result<()> {
    if percentage > MAX_WORKING_PERCENTAGE {
        return Err(EngineError::InvalidPercentage { percentage });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::interval::date;

    fn january() -> Interval {
        Interval::bounded(date(2024, 1, 1), date(2024, 1, 31)).unwrap()
    }

    #[test]
    fn test_assignment_builder() {
        let a = Assignment::new("A1", "PH1", "alice", 60, january())
            .unwrap()
            .with_role(AssignmentRole::TeamLeader);

        assert_eq!(a.id, "A1");
        assert_eq!(a.phase_id, "PH1");
        assert_eq!(a.working_percentage, 60);
        assert!(a.active);
        assert!(a.is_leader());
        assert!(a.counts_for("alice"));
        assert!(!a.counts_for("bob"));
    }

    #[test]
    fn test_percentage_bounds() {
        assert!(Assignment::new("A1", "PH1", "alice", 100, january()).is_ok());
        let err = Assignment::new("A1", "PH1", "alice", 101, january()).unwrap_err();
        assert_eq!(err, EngineError::InvalidPercentage { percentage: 101 });

        let mut a = Assignment::new("A1", "PH1", "alice", 50, january()).unwrap();
        assert!(a.set_working_percentage(150).is_err());
        assert_eq!(a.working_percentage, 50);
    }

    #[test]
    fn test_end_and_deactivate() {
        let mut a =
            Assignment::new("A1", "PH1", "alice", 50, Interval::open_ended(date(2024, 1, 1)))
                .unwrap();
        a.end_on(date(2024, 3, 1)).unwrap();
        assert_eq!(a.interval.end(), Some(date(2024, 3, 1)));

        assert!(a.end_on(date(2023, 12, 1)).is_err());
        assert_eq!(a.interval.end(), Some(date(2024, 3, 1)));

        a.deactivate();
        assert!(!a.counts_for("alice"));
    }

    #[test]
    fn test_wire_format() {
        let a = Assignment::new("A1", "PH1", "alice", 60, january()).unwrap();
        let json = serde_json::to_value(&a).unwrap();
        assert_eq!(json["role"], "TEAM_MEMBER");
        assert_eq!(json["interval"]["end"], "2024-01-31");
    }
}
