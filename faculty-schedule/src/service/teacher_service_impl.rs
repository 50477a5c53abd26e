use std::sync::Arc;

use faculty::db::{AppDbPool, Handle};

use crate::{
    dto::TeacherDto,
    error::{EntityKind, Error, Result, StorageContext, TeacherRef},
    repository::TeacherRepository,
    service::TeacherService,
};

pub struct TeacherServiceImpl<R: TeacherRepository> {
    pub pool: AppDbPool,
    pub repo: Arc<R>,
}

impl<R: TeacherRepository> TeacherServiceImpl<R> {
    pub fn new(pool: AppDbPool, repo: Arc<R>) -> Self {
        Self { pool, repo }
    }
}

#[async_trait::async_trait]
impl<R: TeacherRepository> TeacherService for TeacherServiceImpl<R> {
    async fn find_by_id(&self, id: i64) -> Result<TeacherDto> {
        tracing::info!(teacher_id = id, "fetching teacher");
        let mut handle = Handle::Pool(self.pool.clone());
        let teacher = self
            .repo
            .find_by_id(&mut handle, id)
            .await
            .storage(EntityKind::Teacher)?
            .ok_or(Error::TeacherNotFound(TeacherRef::Id(id)))?;
        Ok(teacher.into())
    }

    async fn find_all(&self) -> Result<Vec<TeacherDto>> {
        let mut handle = Handle::Pool(self.pool.clone());
        let teachers =
            self.repo.find_all(&mut handle).await.storage(EntityKind::Teacher)?;
        tracing::info!(count = teachers.len(), "fetched teachers");
        Ok(teachers.into_iter().map(Into::into).collect())
    }

    async fn create(&self, teacher: TeacherDto) -> Result<TeacherDto> {
        tracing::info!(name = %teacher.name, "saving teacher");
        let mut handle = Handle::Pool(self.pool.clone());
        let mut entity = teacher.into_entity();
        entity.teacher_id = 0;
        let saved = self
            .repo
            .create(&mut handle, entity)
            .await
            .storage(EntityKind::Teacher)?;
        tracing::info!(teacher_id = saved.teacher_id, "saved teacher");
        Ok(saved.into())
    }

    async fn update(&self, id: i64, teacher: TeacherDto) -> Result<TeacherDto> {
        tracing::info!(teacher_id = id, "updating teacher");
        let mut pool_handle = Handle::Pool(self.pool.clone());
        let mut tx = pool_handle.begin().await.storage(EntityKind::Teacher)?;

        let mut existing = self
            .repo
            .find_by_id(&mut tx, id)
            .await
            .storage(EntityKind::Teacher)?
            .ok_or(Error::TeacherNotFound(TeacherRef::Id(id)))?;
        existing.name = teacher.name;
        existing.department = teacher.department;
        existing.email = teacher.email;

        let updated = self
            .repo
            .update(&mut tx, existing)
            .await
            .storage(EntityKind::Teacher)?;
        tx.commit().await.storage(EntityKind::Teacher)?;
        Ok(updated.into())
    }

    async fn delete(&self, id: i64) -> Result<()> {
        tracing::info!(teacher_id = id, "deleting teacher");
        let mut pool_handle = Handle::Pool(self.pool.clone());
        let mut tx = pool_handle.begin().await.storage(EntityKind::Teacher)?;

        if !self
            .repo
            .exists_by_id(&mut tx, id)
            .await
            .storage(EntityKind::Teacher)?
        {
            return Err(Error::TeacherNotFound(TeacherRef::Id(id)));
        }
        self.repo.delete(&mut tx, id).await.storage(EntityKind::Teacher)?;
        tx.commit().await.storage(EntityKind::Teacher)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::infra::{TeacherRepositoryImpl, tests::setup_db};

    async fn service() -> TeacherServiceImpl<TeacherRepositoryImpl> {
        TeacherServiceImpl::new(setup_db().await, Arc::new(TeacherRepositoryImpl))
    }

    fn ada() -> TeacherDto {
        TeacherDto {
            teacher_id: None,
            name: "Ada".into(),
            department: "Computing".into(),
            email: "ada@school.test".into(),
        }
    }

    #[tokio::test]
    async fn test_create_then_find() -> Result<()> {
        let service = service().await;

        let created = service.create(ada()).await?;
        let id = created.teacher_id.expect("identifier assigned");

        let found = service.find_by_id(id).await?;
        assert_eq!(found, created);
        assert_eq!(TeacherDto { teacher_id: None, ..found }, ada());
        Ok(())
    }

    #[tokio::test]
    async fn test_create_ignores_supplied_id() -> Result<()> {
        let service = service().await;
        let created = service
            .create(TeacherDto {
                teacher_id: Some(42),
                ..ada()
            })
            .await?;
        assert_eq!(created.teacher_id, Some(1));
        Ok(())
    }

    #[tokio::test]
    async fn test_empty_fields_are_accepted() -> Result<()> {
        let service = service().await;
        let created = service.create(TeacherDto::default()).await?;
        assert_eq!(created.name, "");
        assert_eq!(created.email, "");
        Ok(())
    }

    #[tokio::test]
    async fn test_update_replaces_fields_but_not_id() -> Result<()> {
        let service = service().await;
        let id = service.create(ada()).await?.teacher_id.unwrap();

        let updated = service
            .update(
                id,
                TeacherDto {
                    teacher_id: Some(999),
                    name: "Ada L.".into(),
                    department: "Maths".into(),
                    email: "al@school.test".into(),
                },
            )
            .await?;

        assert_eq!(updated.teacher_id, Some(id));
        assert_eq!(updated.name, "Ada L.");
        assert_eq!(service.find_by_id(id).await?, updated);
        Ok(())
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() -> Result<()> {
        let service = service().await;
        let id = service.create(ada()).await?.teacher_id.unwrap();

        let err = service.update(id + 1, TeacherDto::default()).await;
        assert!(matches!(
            err,
            Err(Error::TeacherNotFound(TeacherRef::Id(missing))) if missing == id + 1
        ));
        assert_eq!(service.find_all().await?, vec![service.find_by_id(id).await?]);
        Ok(())
    }

    #[tokio::test]
    async fn test_delete() -> Result<()> {
        let service = service().await;
        let id = service.create(ada()).await?.teacher_id.unwrap();

        service.delete(id).await?;
        assert!(matches!(
            service.find_by_id(id).await,
            Err(Error::TeacherNotFound(_))
        ));
        assert!(matches!(
            service.delete(id).await,
            Err(Error::TeacherNotFound(_))
        ));
        Ok(())
    }
}
