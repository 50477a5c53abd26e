use chrono::NaiveDate;
use faculty::db::{AppDbHandle, AsExecutor, BaseRepository};

use crate::{
    entity::{Routine, StudyGroup, Teacher},
    repository::{RoutineRepository, StudyGroupRepository, TeacherRepository},
};

const SCHEMA: &str = include_str!("infra/schema.sql");

/// Creates any missing tables and indexes. Safe to run on every start.
pub async fn init_schema(h: &mut AppDbHandle<'_>) -> faculty::Result<()> {
    sqlx::raw_sql(SCHEMA)
        .execute(h.as_executor())
        .await
        .map_err(faculty::db::map_err)?;
    tracing::debug!("schema ready");
    Ok(())
}

pub struct TeacherRepositoryImpl;

#[async_trait::async_trait]
impl BaseRepository<Teacher> for TeacherRepositoryImpl {
    const TABLE: &'static str = "teacher";
    const KEY: &'static str = "teacher_id";

    async fn create(
        &self,
        h: &mut AppDbHandle<'_>,
        entity: Teacher,
    ) -> faculty::Result<Teacher> {
        sqlx::query_as(
            "INSERT INTO teacher (name, department, email) \
             VALUES (?, ?, ?) RETURNING *",
        )
        .bind(entity.name)
        .bind(entity.department)
        .bind(entity.email)
        .fetch_one(h.as_executor())
        .await
        .map_err(faculty::db::map_err)
    }

    async fn update(
        &self,
        h: &mut AppDbHandle<'_>,
        entity: Teacher,
    ) -> faculty::Result<Teacher> {
        sqlx::query_as(
            "UPDATE teacher SET name = ?, department = ?, email = ? \
             WHERE teacher_id = ? RETURNING *",
        )
        .bind(entity.name)
        .bind(entity.department)
        .bind(entity.email)
        .bind(entity.teacher_id)
        .fetch_one(h.as_executor())
        .await
        .map_err(faculty::db::map_err)
    }
}

#[async_trait::async_trait]
impl TeacherRepository for TeacherRepositoryImpl {
    async fn find_by_name(
        &self,
        h: &mut AppDbHandle<'_>,
        name: &str,
    ) -> faculty::Result<Option<Teacher>> {
        sqlx::query_as(
            "SELECT * FROM teacher WHERE name = ? ORDER BY teacher_id LIMIT 1",
        )
        .bind(name)
        .fetch_optional(h.as_executor())
        .await
        .map_err(faculty::db::map_err)
    }
}

pub struct StudyGroupRepositoryImpl;

#[async_trait::async_trait]
impl BaseRepository<StudyGroup> for StudyGroupRepositoryImpl {
    const TABLE: &'static str = "study_group";
    const KEY: &'static str = "group_id";

    async fn create(
        &self,
        h: &mut AppDbHandle<'_>,
        entity: StudyGroup,
    ) -> faculty::Result<StudyGroup> {
        sqlx::query_as(
            "INSERT INTO study_group (group_name, description) \
             VALUES (?, ?) RETURNING *",
        )
        .bind(entity.group_name)
        .bind(entity.description)
        .fetch_one(h.as_executor())
        .await
        .map_err(faculty::db::map_err)
    }

    async fn update(
        &self,
        h: &mut AppDbHandle<'_>,
        entity: StudyGroup,
    ) -> faculty::Result<StudyGroup> {
        sqlx::query_as(
            "UPDATE study_group SET group_name = ?, description = ? \
             WHERE group_id = ? RETURNING *",
        )
        .bind(entity.group_name)
        .bind(entity.description)
        .bind(entity.group_id)
        .fetch_one(h.as_executor())
        .await
        .map_err(faculty::db::map_err)
    }
}

impl StudyGroupRepository for StudyGroupRepositoryImpl {}

pub struct RoutineRepositoryImpl;

#[async_trait::async_trait]
impl BaseRepository<Routine> for RoutineRepositoryImpl {
    const TABLE: &'static str = "routine";
    const KEY: &'static str = "routine_id";

    async fn create(
        &self,
        h: &mut AppDbHandle<'_>,
        entity: Routine,
    ) -> faculty::Result<Routine> {
        sqlx::query_as(
            "INSERT INTO routine \
             (start_time, end_time, routine_date, teacher_id, group_id) \
             VALUES (?, ?, ?, ?, ?) RETURNING *",
        )
        .bind(entity.start_time)
        .bind(entity.end_time)
        .bind(entity.routine_date)
        .bind(entity.teacher_id)
        .bind(entity.group_id)
        .fetch_one(h.as_executor())
        .await
        .map_err(faculty::db::map_err)
    }

    async fn update(
        &self,
        h: &mut AppDbHandle<'_>,
        entity: Routine,
    ) -> faculty::Result<Routine> {
        sqlx::query_as(
            "UPDATE routine SET start_time = ?, end_time = ?, \
             routine_date = ?, teacher_id = ?, group_id = ? \
             WHERE routine_id = ? RETURNING *",
        )
        .bind(entity.start_time)
        .bind(entity.end_time)
        .bind(entity.routine_date)
        .bind(entity.teacher_id)
        .bind(entity.group_id)
        .bind(entity.routine_id)
        .fetch_one(h.as_executor())
        .await
        .map_err(faculty::db::map_err)
    }
}

#[async_trait::async_trait]
impl RoutineRepository for RoutineRepositoryImpl {
    async fn find_by_teacher_and_date_between(
        &self,
        h: &mut AppDbHandle<'_>,
        teacher_id: i64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> faculty::Result<Vec<Routine>> {
        sqlx::query_as(
            "SELECT * FROM routine \
             WHERE teacher_id = ? AND routine_date BETWEEN ? AND ? \
             ORDER BY routine_date, start_time",
        )
        .bind(teacher_id)
        .bind(start)
        .bind(end)
        .fetch_all(h.as_executor())
        .await
        .map_err(faculty::db::map_err)
    }

    async fn find_by_group(
        &self,
        h: &mut AppDbHandle<'_>,
        group_id: i64,
    ) -> faculty::Result<Vec<Routine>> {
        sqlx::query_as(
            "SELECT * FROM routine WHERE group_id = ? \
             ORDER BY routine_date, start_time",
        )
        .bind(group_id)
        .fetch_all(h.as_executor())
        .await
        .map_err(faculty::db::map_err)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use chrono::NaiveTime;
    use faculty::db::{AppDbPool, Handle};

    use super::*;

    pub(crate) async fn setup_db() -> AppDbPool {
        let pool = faculty::db::connect(&faculty::config::DatabaseConfig {
            url: "sqlite::memory:".into(),
            max_connections: 1,
        })
        .await
        .expect("Failed to open in-memory sqlite");
        init_schema(&mut Handle::Pool(pool.clone()))
            .await
            .expect("Failed to create schema");
        pool
    }

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn teacher(name: &str) -> Teacher {
        Teacher {
            teacher_id: 0,
            name: name.into(),
            department: "Maths".into(),
            email: format!("{}@school.test", name.to_lowercase()),
        }
    }

    fn routine(day: u32, teacher_id: Option<i64>, group_id: Option<i64>) -> Routine {
        Routine {
            routine_id: 0,
            start_time: time(9, 0),
            end_time: time(11, 0),
            routine_date: date(day),
            teacher_id,
            group_id,
        }
    }

    #[tokio::test]
    async fn test_schema_init_is_idempotent() -> faculty::Result<()> {
        let pool = setup_db().await;
        init_schema(&mut Handle::Pool(pool)).await
    }

    #[tokio::test]
    async fn test_teacher_repository_crud() -> faculty::Result<()> {
        let mut handle = Handle::Pool(setup_db().await);
        let repo = TeacherRepositoryImpl;

        let created = repo.create(&mut handle, teacher("Ada")).await?;
        assert!(created.teacher_id > 0);
        assert_eq!(created.name, "Ada");

        let found = repo.find_by_id(&mut handle, created.teacher_id).await?;
        assert_eq!(found.as_ref(), Some(&created));
        assert!(repo.exists_by_id(&mut handle, created.teacher_id).await?);

        let mut to_update = created.clone();
        to_update.email = "ada@elsewhere.test".into();
        let updated = repo.update(&mut handle, to_update).await?;
        assert_eq!(updated.email, "ada@elsewhere.test");
        assert_eq!(updated.teacher_id, created.teacher_id);

        assert_eq!(repo.find_all(&mut handle).await?.len(), 1);

        repo.delete(&mut handle, created.teacher_id).await?;
        assert!(repo.find_by_id(&mut handle, created.teacher_id).await?.is_none());
        assert!(!repo.exists_by_id(&mut handle, created.teacher_id).await?);
        Ok(())
    }

    #[tokio::test]
    async fn test_find_by_name_prefers_lowest_id() -> faculty::Result<()> {
        let mut handle = Handle::Pool(setup_db().await);
        let repo = TeacherRepositoryImpl;

        let first = repo.create(&mut handle, teacher("Ada")).await?;
        repo.create(&mut handle, teacher("Ada")).await?;
        repo.create(&mut handle, teacher("Grace")).await?;

        let found = repo.find_by_name(&mut handle, "Ada").await?;
        assert_eq!(found.map(|t| t.teacher_id), Some(first.teacher_id));
        assert!(repo.find_by_name(&mut handle, "ada").await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_study_group_repository_crud() -> faculty::Result<()> {
        let mut handle = Handle::Pool(setup_db().await);
        let repo = StudyGroupRepositoryImpl;

        let created = repo
            .create(
                &mut handle,
                StudyGroup {
                    group_id: 0,
                    group_name: "G1".into(),
                    description: String::new(),
                },
            )
            .await?;
        assert_eq!(created.group_name, "G1");
        assert_eq!(created.description, "");

        let mut to_update = created.clone();
        to_update.description = "evening cohort".into();
        let updated = repo.update(&mut handle, to_update).await?;
        assert_eq!(updated.description, "evening cohort");

        repo.delete(&mut handle, created.group_id).await?;
        assert!(repo.find_all(&mut handle).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_routine_round_trips_date_and_times() -> faculty::Result<()> {
        let mut handle = Handle::Pool(setup_db().await);
        let repo = RoutineRepositoryImpl;

        let mut input = routine(10, None, None);
        input.end_time = time(10, 30);
        let created = repo.create(&mut handle, input.clone()).await?;

        let found = repo
            .find_by_id(&mut handle, created.routine_id)
            .await?
            .expect("routine stored");
        assert_eq!(found.start_time, input.start_time);
        assert_eq!(found.end_time, input.end_time);
        assert_eq!(found.routine_date, input.routine_date);
        assert_eq!(found.teacher_id, None);
        Ok(())
    }

    #[tokio::test]
    async fn test_routine_date_range_is_inclusive() -> faculty::Result<()> {
        let mut handle = Handle::Pool(setup_db().await);
        let teachers = TeacherRepositoryImpl;
        let routines = RoutineRepositoryImpl;

        let ada = teachers.create(&mut handle, teacher("Ada")).await?;
        let grace = teachers.create(&mut handle, teacher("Grace")).await?;

        for day in [1, 15, 31] {
            routines
                .create(&mut handle, routine(day, Some(ada.teacher_id), None))
                .await?;
        }
        routines
            .create(&mut handle, routine(15, Some(grace.teacher_id), None))
            .await?;

        let found = routines
            .find_by_teacher_and_date_between(
                &mut handle,
                ada.teacher_id,
                date(1),
                date(31),
            )
            .await?;
        assert_eq!(found.len(), 3);

        let found = routines
            .find_by_teacher_and_date_between(
                &mut handle,
                ada.teacher_id,
                date(2),
                date(30),
            )
            .await?;
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].routine_date, date(15));
        Ok(())
    }

    #[tokio::test]
    async fn test_find_by_group() -> faculty::Result<()> {
        let mut handle = Handle::Pool(setup_db().await);
        let groups = StudyGroupRepositoryImpl;
        let routines = RoutineRepositoryImpl;

        let g1 = groups
            .create(
                &mut handle,
                StudyGroup {
                    group_id: 0,
                    group_name: "G1".into(),
                    description: String::new(),
                },
            )
            .await?;

        routines.create(&mut handle, routine(3, None, Some(g1.group_id))).await?;
        routines.create(&mut handle, routine(4, None, Some(g1.group_id))).await?;
        routines.create(&mut handle, routine(5, None, None)).await?;

        let found = routines.find_by_group(&mut handle, g1.group_id).await?;
        assert_eq!(found.len(), 2);
        assert!(found.iter().all(|r| r.group_id == Some(g1.group_id)));
        Ok(())
    }

    #[tokio::test]
    async fn test_deleting_teacher_clears_routine_link() -> faculty::Result<()> {
        let mut handle = Handle::Pool(setup_db().await);
        let teachers = TeacherRepositoryImpl;
        let routines = RoutineRepositoryImpl;

        let ada = teachers.create(&mut handle, teacher("Ada")).await?;
        let created = routines
            .create(&mut handle, routine(10, Some(ada.teacher_id), None))
            .await?;

        teachers.delete(&mut handle, ada.teacher_id).await?;

        let found = routines
            .find_by_id(&mut handle, created.routine_id)
            .await?
            .expect("routine survives teacher deletion");
        assert_eq!(found.teacher_id, None);
        Ok(())
    }
}
