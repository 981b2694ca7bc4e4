//! Allocation accumulator.
//!
//! Computes how much of a team member's time is committed within a query
//! interval. An assignment counts at its full declared percentage whenever
//! its interval overlaps the query; there is no weighting by overlap length,
//! because the declared percentage is already "share of time within this
//! interval".
//!
//! Nothing here is cached. Workload views are recomputed from the live
//! assignment list on every call, so deleted or ended assignments drop out
//! immediately.
//!
//! # Example
//!
//! ```
//! use chrono::NaiveDate;
//! use site_schedule::allocation::{is_overallocated, total_allocation};
//! use site_schedule::models::{Assignment, Interval};
//!
//! let d = |m, day| NaiveDate::from_ymd_opt(2024, m, day).unwrap();
//! let assignments = vec![
//!     Assignment::new("A1", "PH-A", "alice", 60, Interval::bounded(d(1, 1), d(1, 31)).unwrap()).unwrap(),
//!     Assignment::new("A2", "PH-B", "alice", 50, Interval::bounded(d(1, 15), d(2, 15)).unwrap()).unwrap(),
//! ];
//!
//! let total = total_allocation(&assignments, "alice", &Interval::day(d(1, 20)));
//! assert_eq!(total, 110);
//! assert!(is_overallocated(total));
//! ```

mod timeline;

pub use timeline::{boundary_points, peak_allocation, workload_timeline, WorkloadSegment};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::config::{EngineConfig, FULL_ALLOCATION_PERCENT};
use crate::models::{Assignment, Interval};

/// Derived workload of one member over one interval. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkloadSnapshot {
    pub team_member_id: String,
    pub interval: Interval,
    pub total_percentage: u32,
    pub is_overallocated: bool,
}

/// Active assignments of `team_member_id` overlapping `query`, in input order.
pub fn contributing<'a>(
    assignments: &'a [Assignment],
    team_member_id: &'a str,
    query: &'a Interval,
) -> impl Iterator<Item = &'a Assignment> + 'a {
    assignments
        .iter()
        .filter(move |a| a.counts_for(team_member_id) && a.interval.overlaps(query))
}

/// Sum of working percentages of the member's active assignments that
/// overlap `query`. May exceed 100.
pub fn total_allocation(assignments: &[Assignment], team_member_id: &str, query: &Interval) -> u32 {
    contributing(assignments, team_member_id, query)
        .map(|a| a.working_percentage)
        .sum()
}

/// Allocation on a single calendar day.
pub fn allocation_on(assignments: &[Assignment], team_member_id: &str, date: NaiveDate) -> u32 {
    total_allocation(assignments, team_member_id, &Interval::day(date))
}

/// Whether `total` exceeds full allocation. Exactly 100 is allowed.
#[inline]
pub fn is_overallocated(total: u32) -> bool {
    total > FULL_ALLOCATION_PERCENT
}

/// Distinct team members in order of first appearance.
pub fn team_members(assignments: &[Assignment]) -> Vec<&str> {
    let mut members: Vec<&str> = Vec::new();
    for a in assignments {
        if !members.contains(&a.team_member_id.as_str()) {
            members.push(&a.team_member_id);
        }
    }
    members
}

impl WorkloadSnapshot {
    /// Computes the snapshot for one member.
    pub fn compute(
        assignments: &[Assignment],
        team_member_id: &str,
        query: &Interval,
        config: &EngineConfig,
    ) -> Self {
        let total = total_allocation(assignments, team_member_id, query);
        tracing::debug!(
            team_member = team_member_id,
            total,
            "computed workload snapshot"
        );
        Self {
            team_member_id: team_member_id.to_string(),
            interval: *query,
            total_percentage: total,
            is_overallocated: config.is_overallocated(total),
        }
    }

    /// Spare capacity left, zero when over-allocated.
    pub fn headroom(&self, config: &EngineConfig) -> u32 {
        config.capacity_percent.saturating_sub(self.total_percentage)
    }
}

/// One snapshot per team member, in first-appearance order.
pub fn team_workload(
    assignments: &[Assignment],
    query: &Interval,
    config: &EngineConfig,
) -> Vec<WorkloadSnapshot> {
    team_members(assignments)
        .into_iter()
        .map(|member| WorkloadSnapshot::compute(assignments, member, query, config))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::interval::date;
    use proptest::prelude::*;

    fn assign(
        id: &str,
        member: &str,
        pct: u32,
        start: NaiveDate,
        end: Option<NaiveDate>,
    ) -> Assignment {
        Assignment::new(id, "PH1", member, pct, Interval::new(start, end).unwrap()).unwrap()
    }

    fn scenario() -> Vec<Assignment> {
        vec![
            assign("A1", "alice", 60, date(2024, 1, 1), Some(date(2024, 1, 31))),
            assign("A2", "alice", 50, date(2024, 1, 15), Some(date(2024, 2, 15))),
            assign("B1", "bob", 100, date(2024, 1, 1), None),
        ]
    }

    #[test]
    fn test_overlapping_assignments_sum() {
        let a = scenario();
        let total = allocation_on(&a, "alice", date(2024, 1, 20));
        assert_eq!(total, 110);
        assert!(is_overallocated(total));

        assert_eq!(allocation_on(&a, "alice", date(2024, 2, 20)), 0);
        assert_eq!(allocation_on(&a, "alice", date(2024, 1, 5)), 60);
        assert_eq!(allocation_on(&a, "alice", date(2024, 2, 1)), 50);
    }

    #[test]
    fn test_no_weighting_by_overlap() {
        let a = scenario();
        // The whole of Q1 touches both assignments.
        let q1 = Interval::bounded(date(2024, 1, 1), date(2024, 3, 31)).unwrap();
        assert_eq!(total_allocation(&a, "alice", &q1), 110);
    }

    #[test]
    fn test_exactly_full_is_not_over() {
        assert!(!is_overallocated(100));
        assert!(is_overallocated(101));
        let a = scenario();
        let bob = allocation_on(&a, "bob", date(2030, 1, 1)); // open-ended
        assert_eq!(bob, 100);
        assert!(!is_overallocated(bob));
    }

    #[test]
    fn test_inactive_and_unknown_ignored() {
        let mut a = scenario();
        a[1].deactivate();
        assert_eq!(allocation_on(&a, "alice", date(2024, 1, 20)), 60);
        assert_eq!(allocation_on(&a, "carol", date(2024, 1, 20)), 0);
        assert_eq!(total_allocation(&[], "alice", &Interval::day(date(2024, 1, 1))), 0);
    }

    #[test]
    fn test_end_date_is_exclusive() {
        let a = scenario();
        // A1 ends Jan 31: not counted on Jan 31 itself.
        assert_eq!(allocation_on(&a, "alice", date(2024, 1, 31)), 50);
    }

    #[test]
    fn test_team_workload_order() {
        let a = scenario();
        let config = EngineConfig::default();
        let view = team_workload(&a, &Interval::day(date(2024, 1, 20)), &config);

        assert_eq!(view.len(), 2);
        assert_eq!(view[0].team_member_id, "alice");
        assert_eq!(view[0].total_percentage, 110);
        assert!(view[0].is_overallocated);
        assert_eq!(view[0].headroom(&config), 0);
        assert_eq!(view[1].team_member_id, "bob");
        assert!(!view[1].is_overallocated);
    }

    #[test]
    fn test_snapshot_respects_capacity() {
        let a = scenario();
        let lenient = EngineConfig::default().with_capacity(120);
        let day = Interval::day(date(2024, 1, 20));
        let snap = WorkloadSnapshot::compute(&a, "alice", &day, &lenient);
        assert_eq!(snap.total_percentage, 110);
        assert!(!snap.is_overallocated);
        assert_eq!(snap.headroom(&lenient), 10);
    }

    proptest! {
        #[test]
        fn prop_order_independent(
            specs in proptest::collection::vec((0i64..90, 1u64..60, 0u32..=100, any::<bool>()), 0..12)
                .prop_shuffle(),
            query_offset in 0i64..120,
        ) {
            let base = date(2024, 1, 1);
            let assignments: Vec<Assignment> = specs
                .iter()
                .enumerate()
                .map(|(i, &(offset, len, pct, open))| {
                    let start = base + chrono::Duration::days(offset);
                    let end = if open { None } else { Some(start + chrono::Days::new(len)) };
                    assign(&format!("A{i}"), "alice", pct, start, end)
                })
                .collect();
            let query = Interval::day(base + chrono::Duration::days(query_offset));

            let forward = total_allocation(&assignments, "alice", &query);
            let mut reversed = assignments.clone();
            reversed.reverse();
            prop_assert_eq!(forward, total_allocation(&reversed, "alice", &query));

            let mut rotated = assignments.clone();
            if !rotated.is_empty() {
                rotated.rotate_left(1);
            }
            prop_assert_eq!(forward, total_allocation(&rotated, "alice", &query));
        }
    }
}
