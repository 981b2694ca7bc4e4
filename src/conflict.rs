//! Conflict detection.
//!
//! Two independent checks over the current schedule:
//!
//! - **Phase overlap**: two phases of the same project whose intervals
//!   overlap. Phases are meant to be sequential, but concurrent phases are
//!   sometimes intended, so this is reported, not rejected.
//! - **Resource over-allocation**: a boundary date on which a team member's
//!   total allocation exceeds capacity.
//!
//! Both are pure and recompute on every call.
//!
//! # Ordering
//! Phase pairs come first, ordered by phase start (ties keep input order),
//! then over-allocations grouped by team member in order of first
//! appearance in the assignment list, each member's dates ascending.
//! Unchanged input always yields identical output.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::allocation::{allocation_on, boundary_points, contributing, team_members};
use crate::config::EngineConfig;
use crate::models::{Assignment, Interval, Phase};

/// A detected scheduling conflict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conflict {
    #[serde(rename = "type")]
    pub conflict_type: ConflictType,
    pub description: String,
    /// Phase ids for overlaps, assignment ids for over-allocations.
    pub involved_ids: Vec<String>,
    /// Over-allocated member.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_member_id: Option<String>,
    /// Date the overlap or over-allocation begins.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    /// Allocation on `date`, for over-allocations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_percentage: Option<u32>,
}

/// Conflict classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConflictType {
    PhaseOverlap,
    ResourceOverallocation,
}

impl Conflict {
    /// Creates a phase overlap conflict.
    pub fn phase_overlap(a: &Phase, b: &Phase) -> Self {
        let shared = a.interval.intersection(&b.interval);
        let description = match shared {
            Some(shared) => format!(
                "Phases '{}' and '{}' overlap {}",
                a.id,
                b.id,
                describe_span(&shared)
            ),
            None => format!("Phases '{}' and '{}' overlap", a.id, b.id),
        };
        Self {
            conflict_type: ConflictType::PhaseOverlap,
            description,
            involved_ids: vec![a.id.clone(), b.id.clone()],
            team_member_id: None,
            date: shared.map(|s| s.start()),
            total_percentage: None,
        }
    }

    /// Creates a resource over-allocation conflict.
    pub fn overallocation(
        team_member_id: &str,
        date: NaiveDate,
        total_percentage: u32,
        assignment_ids: Vec<String>,
    ) -> Self {
        Self {
            conflict_type: ConflictType::ResourceOverallocation,
            description: format!(
                "Team member '{}' is allocated {}% from {} ({})",
                team_member_id,
                total_percentage,
                date,
                assignment_ids.join(", ")
            ),
            involved_ids: assignment_ids,
            team_member_id: Some(team_member_id.to_string()),
            date: Some(date),
            total_percentage: Some(total_percentage),
        }
    }
}

fn describe_span(interval: &Interval) -> String {
    match interval.end() {
        Some(end) => format!("from {} until {}", interval.start(), end),
        None => format!("from {} onward", interval.start()),
    }
}

/// Runs both conflict checks with a shared configuration.
#[derive(Debug, Clone, Default)]
pub struct ConflictDetector {
    config: EngineConfig,
}

impl ConflictDetector {
    /// Creates a detector.
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Configuration in use.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// All conflicts of one project.
    ///
    /// `phases` may contain other projects' phases; they are skipped.
    /// `assignments` is taken as the caller's scope for over-allocation.
    pub fn detect(
        &self,
        project_id: &str,
        phases: &[Phase],
        assignments: &[Assignment],
    ) -> Vec<Conflict> {
        let mut conflicts = self.phase_overlaps(project_id, phases);
        conflicts.extend(self.resource_overallocations(assignments));
        tracing::debug!(
            project = project_id,
            conflicts = conflicts.len(),
            "conflict detection finished"
        );
        conflicts
    }

    /// Overlapping phase pairs within `project_id`.
    pub fn phase_overlaps(&self, project_id: &str, phases: &[Phase]) -> Vec<Conflict> {
        let mut ordered: Vec<&Phase> = phases
            .iter()
            .filter(|p| p.project_id == project_id)
            .collect();
        // Stable: equal starts keep input order.
        ordered.sort_by_key(|p| p.interval.start());

        let mut conflicts = Vec::new();
        for (i, a) in ordered.iter().enumerate() {
            for b in &ordered[i + 1..] {
                if a.interval.overlaps(&b.interval) {
                    conflicts.push(Conflict::phase_overlap(a, b));
                }
            }
        }
        conflicts
    }

    /// Boundary dates on which any member exceeds capacity.
    pub fn resource_overallocations(&self, assignments: &[Assignment]) -> Vec<Conflict> {
        let mut conflicts = Vec::new();
        for member in team_members(assignments) {
            conflicts.extend(self.member_overallocations(assignments, member));
        }
        conflicts
    }

    /// Over-allocated boundary dates of one member.
    pub fn member_overallocations(
        &self,
        assignments: &[Assignment],
        team_member_id: &str,
    ) -> Vec<Conflict> {
        let own = assignments.iter().filter(|a| a.counts_for(team_member_id));

        let mut conflicts = Vec::new();
        for point in boundary_points(own) {
            let total = allocation_on(assignments, team_member_id, point);
            if !self.config.is_overallocated(total) {
                continue;
            }
            let day = Interval::day(point);
            let ids = contributing(assignments, team_member_id, &day)
                .map(|a| a.id.clone())
                .collect();
            tracing::debug!(
                team_member = team_member_id,
                %point,
                total,
                "over-allocation found"
            );
            conflicts.push(Conflict::overallocation(team_member_id, point, total, ids));
        }
        conflicts
    }
}

/// Detects conflicts with the default configuration.
pub fn detect_conflicts(
    project_id: &str,
    phases: &[Phase],
    assignments: &[Assignment],
) -> Vec<Conflict> {
    ConflictDetector::default().detect(project_id, phases, assignments)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::interval::date;
    use proptest::prelude::*;

    fn phase(id: &str, project: &str, start: NaiveDate, end: NaiveDate) -> Phase {
        Phase::new(id, project, Interval::bounded(start, end).unwrap())
    }

    fn assign(
        id: &str,
        member: &str,
        pct: u32,
        start: NaiveDate,
        end: Option<NaiveDate>,
    ) -> Assignment {
        Assignment::new(id, "PH-A", member, pct, Interval::new(start, end).unwrap()).unwrap()
    }

    #[test]
    fn test_single_phase_overlap() {
        let phases = vec![
            phase("PH-A", "P1", date(2024, 1, 1), date(2024, 3, 1)),
            phase("PH-B", "P1", date(2024, 2, 1), date(2024, 4, 1)),
        ];
        let conflicts = detect_conflicts("P1", &phases, &[]);

        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].conflict_type, ConflictType::PhaseOverlap);
        assert_eq!(conflicts[0].involved_ids, vec!["PH-A", "PH-B"]);
        assert_eq!(conflicts[0].date, Some(date(2024, 2, 1)));
    }

    #[test]
    fn test_adjacent_phases_do_not_conflict() {
        let phases = vec![
            phase("PH-A", "P1", date(2024, 1, 1), date(2024, 2, 1)),
            phase("PH-B", "P1", date(2024, 2, 1), date(2024, 3, 1)),
        ];
        assert!(detect_conflicts("P1", &phases, &[]).is_empty());
    }

    #[test]
    fn test_other_projects_ignored() {
        let phases = vec![
            phase("PH-A", "P1", date(2024, 1, 1), date(2024, 3, 1)),
            phase("PH-X", "P2", date(2024, 2, 1), date(2024, 4, 1)),
        ];
        assert!(detect_conflicts("P1", &phases, &[]).is_empty());
    }

    #[test]
    fn test_pairs_follow_phase_start() {
        // Input order is deliberately reversed.
        let phases = vec![
            phase("PH-C", "P1", date(2024, 3, 1), date(2024, 5, 1)),
            phase("PH-B", "P1", date(2024, 2, 1), date(2024, 4, 1)),
            phase("PH-A", "P1", date(2024, 1, 1), date(2024, 3, 15)),
        ];
        let ids: Vec<Vec<String>> = detect_conflicts("P1", &phases, &[])
            .into_iter()
            .map(|c| c.involved_ids)
            .collect();
        assert_eq!(
            ids,
            vec![
                vec!["PH-A".to_string(), "PH-B".to_string()],
                vec!["PH-A".to_string(), "PH-C".to_string()],
                vec!["PH-B".to_string(), "PH-C".to_string()],
            ]
        );
    }

    #[test]
    fn test_open_ended_phase_overlaps_later_phases() {
        let phases = vec![
            Phase::new("PH-A", "P1", Interval::open_ended(date(2024, 1, 1))),
            phase("PH-B", "P1", date(2025, 6, 1), date(2025, 7, 1)),
        ];
        let conflicts = detect_conflicts("P1", &phases, &[]);
        assert_eq!(conflicts.len(), 1);
        assert!(conflicts[0].description.contains("until 2025-07-01"));
    }

    #[test]
    fn test_overallocation_reported_at_boundary() {
        let assignments = vec![
            assign("A1", "alice", 60, date(2024, 1, 1), Some(date(2024, 1, 31))),
            assign("A2", "alice", 50, date(2024, 1, 15), Some(date(2024, 2, 15))),
        ];
        let conflicts = detect_conflicts("P1", &[], &assignments);

        assert_eq!(conflicts.len(), 1);
        let c = &conflicts[0];
        assert_eq!(c.conflict_type, ConflictType::ResourceOverallocation);
        assert_eq!(c.team_member_id.as_deref(), Some("alice"));
        assert_eq!(c.date, Some(date(2024, 1, 15)));
        assert_eq!(c.total_percentage, Some(110));
        assert_eq!(c.involved_ids, vec!["A1", "A2"]);
    }

    #[test]
    fn test_full_allocation_is_not_a_conflict() {
        let assignments = vec![
            assign("A1", "alice", 50, date(2024, 1, 1), Some(date(2024, 2, 1))),
            assign("A2", "alice", 50, date(2024, 1, 1), None),
        ];
        assert!(detect_conflicts("P1", &[], &assignments).is_empty());
    }

    #[test]
    fn test_handover_on_same_day_is_not_a_conflict() {
        let assignments = vec![
            assign("A1", "alice", 80, date(2024, 1, 1), Some(date(2024, 2, 1))),
            assign("A2", "alice", 80, date(2024, 2, 1), Some(date(2024, 3, 1))),
        ];
        assert!(detect_conflicts("P1", &[], &assignments).is_empty());
    }

    #[test]
    fn test_only_offending_boundaries_reported() {
        let assignments = vec![
            assign("A1", "alice", 60, date(2024, 1, 1), Some(date(2024, 3, 1))),
            assign("A2", "alice", 30, date(2024, 1, 10), None),
            assign("A3", "alice", 20, date(2024, 1, 20), Some(date(2024, 2, 1))),
            assign("B1", "bob", 100, date(2024, 1, 1), None),
        ];
        let conflicts = detect_conflicts("P1", &[], &assignments);
        let dates: Vec<_> = conflicts.iter().map(|c| c.date.unwrap()).collect();
        // 110 on Jan 20; back to 90 on Feb 1.
        assert_eq!(dates, vec![date(2024, 1, 20)]);
    }

    #[test]
    fn test_members_in_assignment_order() {
        let assignments = vec![
            assign("B1", "bob", 70, date(2024, 1, 1), None),
            assign("A1", "alice", 70, date(2024, 1, 1), None),
            assign("B2", "bob", 70, date(2024, 1, 1), None),
            assign("A2", "alice", 70, date(2024, 1, 1), None),
        ];
        let members: Vec<_> = detect_conflicts("P1", &[], &assignments)
            .into_iter()
            .filter_map(|c| c.team_member_id)
            .collect();
        assert_eq!(members, vec!["bob", "alice"]);
    }

    #[test]
    fn test_custom_capacity() {
        let assignments = vec![
            assign("A1", "alice", 60, date(2024, 1, 1), None),
            assign("A2", "alice", 50, date(2024, 1, 1), None),
        ];
        let lenient = ConflictDetector::new(EngineConfig::default().with_capacity(110));
        assert!(lenient.detect("P1", &[], &assignments).is_empty());
    }

    #[test]
    fn test_wire_format() {
        let phases = vec![
            phase("PH-A", "P1", date(2024, 1, 1), date(2024, 3, 1)),
            phase("PH-B", "P1", date(2024, 2, 1), date(2024, 4, 1)),
        ];
        let json = serde_json::to_value(&detect_conflicts("P1", &phases, &[])[0]).unwrap();
        assert_eq!(json["type"], "PHASE_OVERLAP");
        assert!(json.get("team_member_id").is_none());
    }

    proptest! {
        #[test]
        fn prop_detection_idempotent(
            specs in proptest::collection::vec((0usize..3, 0i64..60, 0u64..40, 10u32..=100), 0..10),
        ) {
            let base = date(2024, 1, 1);
            let members = ["alice", "bob", "carol"];
            let mut phases = Vec::new();
            let mut assignments = Vec::new();
            for (i, &(m, offset, len, pct)) in specs.iter().enumerate() {
                let start = base + chrono::Duration::days(offset);
                let end = start + chrono::Days::new(len);
                phases.push(phase(&format!("PH{i}"), "P1", start, end));
                assignments.push(assign(&format!("A{i}"), members[m], pct, start, Some(end)));
            }

            let first = detect_conflicts("P1", &phases, &assignments);
            let second = detect_conflicts("P1", &phases, &assignments);
            prop_assert_eq!(first, second);
        }
    }
}
