use chrono::NaiveDate;

use crate::{
    dto::{RoutineDto, StudyGroupDto, TeacherDto},
    error::Result,
};

#[async_trait::async_trait]
pub trait TeacherService: Sync + Send {
    async fn find_by_id(&self, id: i64) -> Result<TeacherDto>;

    async fn find_all(&self) -> Result<Vec<TeacherDto>>;

    /// Stores a new teacher; any identifier in `teacher` is ignored.
    async fn create(&self, teacher: TeacherDto) -> Result<TeacherDto>;

    /// Replaces name, department and email. The identifier never changes.
    async fn update(&self, id: i64, teacher: TeacherDto) -> Result<TeacherDto>;

    async fn delete(&self, id: i64) -> Result<()>;
}

#[async_trait::async_trait]
pub trait StudyGroupService: Sync + Send {
    async fn find_by_id(&self, id: i64) -> Result<StudyGroupDto>;

    async fn find_all(&self) -> Result<Vec<StudyGroupDto>>;

    async fn create(&self, group: StudyGroupDto) -> Result<StudyGroupDto>;

    async fn update(
        &self,
        id: i64,
        group: StudyGroupDto,
    ) -> Result<StudyGroupDto>;

    async fn delete(&self, id: i64) -> Result<()>;
}

#[async_trait::async_trait]
pub trait RoutineService: Sync + Send {
    /// Links the teacher and group named by id when they exist; an id that
    /// resolves to nothing leaves that link unset.
    async fn create(&self, routine: RoutineDto) -> Result<RoutineDto>;

    async fn update(&self, id: i64, routine: RoutineDto) -> Result<RoutineDto>;

    async fn delete(&self, id: i64) -> Result<()>;

    async fn get_all(&self) -> Result<Vec<RoutineDto>>;

    async fn get_by_id(&self, id: i64) -> Result<RoutineDto>;

    /// Whole hours taught by the teacher called `teacher_name` between
    /// `start` and `end`, both inclusive.
    async fn calculate_teacher_workload(
        &self,
        teacher_name: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<i64>;

    /// Whole hours scheduled for the group across all dates.
    async fn calculate_group_workload(&self, group_id: i64) -> Result<i64>;
}

mod routine_service_impl;
mod study_group_service_impl;
mod teacher_service_impl;

pub use routine_service_impl::*;
pub use study_group_service_impl::*;
pub use teacher_service_impl::*;
