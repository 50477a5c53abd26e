use std::sync::Arc;

use chrono::NaiveDate;
use faculty::db::{AppDbHandle, AppDbPool, Handle};

use crate::{
    dto::RoutineDto,
    entity::Routine,
    error::{EntityKind, Error, Result, StorageContext, TeacherRef},
    repository::{RoutineRepository, StudyGroupRepository, TeacherRepository},
    service::RoutineService,
    workload,
};

pub struct RoutineServiceImpl<R, T, G>
where
    R: RoutineRepository,
    T: TeacherRepository,
    G: StudyGroupRepository,
{
    pub pool: AppDbPool,
    pub routines: Arc<R>,
    pub teachers: Arc<T>,
    pub groups: Arc<G>,
}

impl<R, T, G> RoutineServiceImpl<R, T, G>
where
    R: RoutineRepository,
    T: TeacherRepository,
    G: StudyGroupRepository,
{
    pub fn new(
        pool: AppDbPool,
        routines: Arc<R>,
        teachers: Arc<T>,
        groups: Arc<G>,
    ) -> Self {
        Self {
            pool,
            routines,
            teachers,
            groups,
        }
    }

    /// `Some(id)` only when the teacher exists.
    async fn resolve_teacher(
        &self,
        h: &mut AppDbHandle<'_>,
        teacher_id: Option<i64>,
    ) -> Result<Option<i64>> {
        let Some(id) = teacher_id else {
            return Ok(None);
        };
        let found = self
            .teachers
            .find_by_id(h, id)
            .await
            .storage(EntityKind::Routine)?;
        if found.is_none() {
            tracing::warn!(teacher_id = id, "teacher not found, link omitted");
        }
        Ok(found.map(|t| t.teacher_id))
    }

    /// `Some(id)` only when the group exists.
    async fn resolve_group(
        &self,
        h: &mut AppDbHandle<'_>,
        group_id: Option<i64>,
    ) -> Result<Option<i64>> {
        let Some(id) = group_id else {
            return Ok(None);
        };
        let found = self
            .groups
            .find_by_id(h, id)
            .await
            .storage(EntityKind::Routine)?;
        if found.is_none() {
            tracing::warn!(group_id = id, "group not found, link omitted");
        }
        Ok(found.map(|g| g.group_id))
    }
}

fn ensure_time_range(routine: &RoutineDto) -> Result<()> {
    if routine.end_time <= routine.start_time {
        return Err(Error::InvalidTimeRange {
            start: routine.start_time,
            end: routine.end_time,
        });
    }
    Ok(())
}

#[async_trait::async_trait]
impl<R, T, G> RoutineService for RoutineServiceImpl<R, T, G>
where
    R: RoutineRepository,
    T: TeacherRepository,
    G: StudyGroupRepository,
{
    async fn create(&self, routine: RoutineDto) -> Result<RoutineDto> {
        tracing::info!(?routine, "saving routine");
        ensure_time_range(&routine)?;

        let mut pool_handle = Handle::Pool(self.pool.clone());
        let mut tx = pool_handle.begin().await.storage(EntityKind::Routine)?;

        let teacher_id = self.resolve_teacher(&mut tx, routine.teacher_id).await?;
        let group_id = self.resolve_group(&mut tx, routine.group_id).await?;
        let entity = Routine {
            routine_id: 0,
            start_time: routine.start_time,
            end_time: routine.end_time,
            routine_date: routine.routine_date,
            teacher_id,
            group_id,
        };

        let saved = self
            .routines
            .create(&mut tx, entity)
            .await
            .storage(EntityKind::Routine)?;
        tx.commit().await.storage(EntityKind::Routine)?;
        tracing::info!(routine_id = saved.routine_id, "saved routine");
        Ok(saved.into())
    }

    async fn update(&self, id: i64, routine: RoutineDto) -> Result<RoutineDto> {
        tracing::info!(routine_id = id, ?routine, "updating routine");
        let mut pool_handle = Handle::Pool(self.pool.clone());
        let mut tx = pool_handle.begin().await.storage(EntityKind::Routine)?;

        let mut existing = self
            .routines
            .find_by_id(&mut tx, id)
            .await
            .storage(EntityKind::Routine)?
            .ok_or(Error::RoutineNotFound(id))?;
        ensure_time_range(&routine)?;

        existing.routine_date = routine.routine_date;
        existing.start_time = routine.start_time;
        existing.end_time = routine.end_time;
        // an unresolved id keeps whatever link was already stored
        if let Some(teacher_id) =
            self.resolve_teacher(&mut tx, routine.teacher_id).await?
        {
            existing.teacher_id = Some(teacher_id);
        }
        if let Some(group_id) =
            self.resolve_group(&mut tx, routine.group_id).await?
        {
            existing.group_id = Some(group_id);
        }

        let updated = self
            .routines
            .update(&mut tx, existing)
            .await
            .storage(EntityKind::Routine)?;
        tx.commit().await.storage(EntityKind::Routine)?;
        Ok(updated.into())
    }

    async fn delete(&self, id: i64) -> Result<()> {
        tracing::info!(routine_id = id, "deleting routine");
        let mut pool_handle = Handle::Pool(self.pool.clone());
        let mut tx = pool_handle.begin().await.storage(EntityKind::Routine)?;

        if !self
            .routines
            .exists_by_id(&mut tx, id)
            .await
            .storage(EntityKind::Routine)?
        {
            return Err(Error::RoutineNotFound(id));
        }
        self.routines
            .delete(&mut tx, id)
            .await
            .storage(EntityKind::Routine)?;
        tx.commit().await.storage(EntityKind::Routine)?;
        Ok(())
    }

    async fn get_all(&self) -> Result<Vec<RoutineDto>> {
        let mut handle = Handle::Pool(self.pool.clone());
        let routines = self
            .routines
            .find_all(&mut handle)
            .await
            .storage(EntityKind::Routine)?;
        tracing::info!(count = routines.len(), "fetched routines");
        Ok(routines.into_iter().map(Into::into).collect())
    }

    async fn get_by_id(&self, id: i64) -> Result<RoutineDto> {
        let mut handle = Handle::Pool(self.pool.clone());
        self.routines
            .find_by_id(&mut handle, id)
            .await
            .storage(EntityKind::Routine)?
            .map(Into::into)
            .ok_or(Error::RoutineNotFound(id))
    }

    async fn calculate_teacher_workload(
        &self,
        teacher_name: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<i64> {
        tracing::info!(teacher_name, %start, %end, "calculating teacher workload");
        let mut handle = Handle::Pool(self.pool.clone());
        let teacher = self
            .teachers
            .find_by_name(&mut handle, teacher_name)
            .await
            .storage(EntityKind::Teacher)?
            .ok_or_else(|| {
                Error::TeacherNotFound(TeacherRef::Name(teacher_name.to_owned()))
            })?;

        let routines = self
            .routines
            .find_by_teacher_and_date_between(
                &mut handle,
                teacher.teacher_id,
                start,
                end,
            )
            .await
            .storage(EntityKind::Routine)?;
        let hours = workload::total_hours(&routines);
        tracing::info!(
            teacher_id = teacher.teacher_id,
            routines = routines.len(),
            hours,
            "calculated teacher workload"
        );
        Ok(hours)
    }

    async fn calculate_group_workload(&self, group_id: i64) -> Result<i64> {
        tracing::info!(group_id, "calculating group workload");
        let mut handle = Handle::Pool(self.pool.clone());
        let group = self
            .groups
            .find_by_id(&mut handle, group_id)
            .await
            .storage(EntityKind::Group)?
            .ok_or(Error::GroupNotFound(group_id))?;

        let routines = self
            .routines
            .find_by_group(&mut handle, group.group_id)
            .await
            .storage(EntityKind::Routine)?;
        let hours = workload::total_hours(&routines);
        tracing::info!(group_id, hours, "calculated group workload");
        Ok(hours)
    }
}
