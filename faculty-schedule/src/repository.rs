use chrono::NaiveDate;
use faculty::db::{AppDbHandle, BaseRepository};

use crate::entity::{Routine, StudyGroup, Teacher};

#[async_trait::async_trait]
pub trait TeacherRepository: BaseRepository<Teacher> {
    /// Exact, case-sensitive match. Names are not unique; the lowest id
    /// wins.
    async fn find_by_name(
        &self,
        h: &mut AppDbHandle<'_>,
        name: &str,
    ) -> faculty::Result<Option<Teacher>>;
}

pub trait StudyGroupRepository: BaseRepository<StudyGroup> {}

#[async_trait::async_trait]
pub trait RoutineRepository: BaseRepository<Routine> {
    /// Routines taught by `teacher_id` dated within `start..=end`.
    async fn find_by_teacher_and_date_between(
        &self,
        h: &mut AppDbHandle<'_>,
        teacher_id: i64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> faculty::Result<Vec<Routine>>;

    async fn find_by_group(
        &self,
        h: &mut AppDbHandle<'_>,
        group_id: i64,
    ) -> faculty::Result<Vec<Routine>>;
}
