//! Breakpoint sweep over a member's assignments.
//!
//! Allocation is a step function of the date: it can only change where an
//! assignment starts or ends. Evaluating it once at every boundary point
//! therefore yields every distinct value, including the maximum, without
//! sampling individual days.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{allocation_on, contributing};
use crate::config::EngineConfig;
use crate::models::{Assignment, Interval};

/// A maximal stretch of constant allocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkloadSegment {
    pub interval: Interval,
    pub total_percentage: u32,
    pub is_overallocated: bool,
    /// Contributing assignments, in input order.
    pub assignment_ids: Vec<String>,
}

/// Sorted, de-duplicated start and bounded end dates.
pub fn boundary_points<'a, I>(assignments: I) -> Vec<NaiveDate>
where
    I: IntoIterator<Item = &'a Assignment>,
{
    let mut points: Vec<NaiveDate> = assignments
        .into_iter()
        .flat_map(|a| std::iter::once(a.interval.start()).chain(a.interval.end()))
        .collect();
    points.sort_unstable();
    points.dedup();
    points
}

/// Step-wise workload of one member across `range`.
///
/// Segments tile `range` from its start; the last one ends with `range`
/// (open-ended if `range` is). Consecutive stretches with the same
/// contributing assignments are merged.
pub fn workload_timeline(
    assignments: &[Assignment],
    team_member_id: &str,
    range: &Interval,
    config: &EngineConfig,
) -> Vec<WorkloadSegment> {
    let relevant: Vec<&Assignment> = contributing(assignments, team_member_id, range).collect();

    let mut points: Vec<NaiveDate> = boundary_points(relevant.iter().copied())
        .into_iter()
        .filter(|p| range.contains(*p))
        .collect();
    if points.first() != Some(&range.start()) {
        points.insert(0, range.start());
    }

    let mut segments: Vec<WorkloadSegment> = Vec::with_capacity(points.len());
    for (i, &point) in points.iter().enumerate() {
        let end = points.get(i + 1).copied().or(range.end());
        let day = Interval::day(point);
        let ids: Vec<String> = relevant
            .iter()
            .filter(|a| a.interval.overlaps(&day))
            .map(|a| a.id.clone())
            .collect();

        if let Some(last) = segments.last_mut() {
            if last.assignment_ids == ids {
                last.interval = Interval::from_ordered(last.interval.start(), end);
                continue;
            }
        }

        let total = allocation_on(assignments, team_member_id, point);
        segments.push(WorkloadSegment {
            interval: Interval::from_ordered(point, end),
            total_percentage: total,
            is_overallocated: config.is_overallocated(total),
            assignment_ids: ids,
        });
    }
    segments
}

/// Highest allocation the member ever reaches. Zero without assignments.
pub fn peak_allocation(assignments: &[Assignment], team_member_id: &str) -> u32 {
    let own = assignments.iter().filter(|a| a.counts_for(team_member_id));
    boundary_points(own)
        .into_iter()
        .map(|p| allocation_on(assignments, team_member_id, p))
        .max()
        .unwrap_or(0)
}
