use chrono::{NaiveDate, NaiveTime};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Teacher {
    pub teacher_id: i64,
    pub name: String,
    pub department: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct StudyGroup {
    pub group_id: i64,
    pub group_name: String,
    pub description: String,
}

/// One scheduled session. The teacher and group links are weak: plain
/// nullable ids resolved when the routine is written.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Routine {
    pub routine_id: i64,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub routine_date: NaiveDate,
    pub teacher_id: Option<i64>,
    pub group_id: Option<i64>,
}

impl Routine {
    /// Whole hours this session counts towards a workload.
    pub fn hours(&self) -> i64 {
        crate::workload::hours_between(self.start_time, self.end_time)
    }
}
