//! Workload arithmetic.
//!
//! Each routine contributes its own duration truncated to whole hours, and
//! the workload is the sum of those. Two 90 minute sessions are 2 hours,
//! not 3.

use chrono::NaiveTime;

use crate::entity::Routine;

/// Wall-clock hours from `start` to `end` on the same day, truncated
/// toward zero.
pub fn hours_between(start: NaiveTime, end: NaiveTime) -> i64 {
    (end - start).num_hours()
}

pub fn total_hours<'a, I>(routines: I) -> i64
where
    I: IntoIterator<Item = &'a Routine>,
{
    routines.into_iter().map(Routine::hours).sum()
}
