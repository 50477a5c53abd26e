use std::sync::Arc;

use faculty::db::{AppDbPool, Handle};

use crate::{
    dto::StudyGroupDto,
    error::{EntityKind, Error, Result, StorageContext},
    repository::StudyGroupRepository,
    service::StudyGroupService,
};

pub struct StudyGroupServiceImpl<R: StudyGroupRepository> {
    pub pool: AppDbPool,
    pub repo: Arc<R>,
}

impl<R: StudyGroupRepository> StudyGroupServiceImpl<R> {
    pub fn new(pool: AppDbPool, repo: Arc<R>) -> Self {
        Self { pool, repo }
    }
}

#[async_trait::async_trait]
impl<R: StudyGroupRepository> StudyGroupService for StudyGroupServiceImpl<R> {
    async fn find_by_id(&self, id: i64) -> Result<StudyGroupDto> {
        tracing::info!(group_id = id, "fetching study group");
        let mut handle = Handle::Pool(self.pool.clone());
        self.repo
            .find_by_id(&mut handle, id)
            .await
            .storage(EntityKind::Group)?
            .map(Into::into)
            .ok_or(Error::GroupNotFound(id))
    }

    async fn find_all(&self) -> Result<Vec<StudyGroupDto>> {
        let mut handle = Handle::Pool(self.pool.clone());
        let groups =
            self.repo.find_all(&mut handle).await.storage(EntityKind::Group)?;
        Ok(groups.into_iter().map(Into::into).collect())
    }

    async fn create(&self, group: StudyGroupDto) -> Result<StudyGroupDto> {
        tracing::info!(group_name = %group.group_name, "saving study group");
        let mut handle = Handle::Pool(self.pool.clone());
        let mut entity = group.into_entity();
        entity.group_id = 0;
        let saved = self
            .repo
            .create(&mut handle, entity)
            .await
            .storage(EntityKind::Group)?;
        tracing::info!(group_id = saved.group_id, "saved study group");
        Ok(saved.into())
    }

    async fn update(
        &self,
        id: i64,
        group: StudyGroupDto,
    ) -> Result<StudyGroupDto> {
        tracing::info!(group_id = id, "updating study group");
        let mut pool_handle = Handle::Pool(self.pool.clone());
        let mut tx = pool_handle.begin().await.storage(EntityKind::Group)?;

        let mut existing = self
            .repo
            .find_by_id(&mut tx, id)
            .await
            .storage(EntityKind::Group)?
            .ok_or(Error::GroupNotFound(id))?;
        existing.group_name = group.group_name;
        existing.description = group.description;

        let updated = self
            .repo
            .update(&mut tx, existing)
            .await
            .storage(EntityKind::Group)?;
        tx.commit().await.storage(EntityKind::Group)?;
        Ok(updated.into())
    }

    async fn delete(&self, id: i64) -> Result<()> {
        tracing::info!(group_id = id, "deleting study group");
        let mut pool_handle = Handle::Pool(self.pool.clone());
        let mut tx = pool_handle.begin().await.storage(EntityKind::Group)?;

        if !self
            .repo
            .exists_by_id(&mut tx, id)
            .await
            .storage(EntityKind::Group)?
        {
            return Err(Error::GroupNotFound(id));
        }
        self.repo.delete(&mut tx, id).await.storage(EntityKind::Group)?;
        tx.commit().await.storage(EntityKind::Group)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::infra::{StudyGroupRepositoryImpl, tests::setup_db};

    async fn service() -> StudyGroupServiceImpl<StudyGroupRepositoryImpl> {
        StudyGroupServiceImpl::new(
            setup_db().await,
            Arc::new(StudyGroupRepositoryImpl),
        )
    }

    fn g1() -> StudyGroupDto {
        StudyGroupDto {
            group_id: None,
            group_name: "G1".into(),
            description: "first years".into(),
        }
    }

    #[tokio::test]
    async fn test_create_then_find() -> Result<()> {
        let service = service().await;
        let created = service.create(g1()).await?;
        let id = created.group_id.expect("identifier assigned");

        let found = service.find_by_id(id).await?;
        assert_eq!(StudyGroupDto { group_id: None, ..found }, g1());
        Ok(())
    }

    #[tokio::test]
    async fn test_update() -> Result<()> {
        let service = service().await;
        let id = service.create(g1()).await?.group_id.unwrap();

        let updated = service
            .update(
                id,
                StudyGroupDto {
                    group_id: None,
                    group_name: "G1-b".into(),
                    description: String::new(),
                },
            )
            .await?;
        assert_eq!(updated.group_id, Some(id));
        assert_eq!(updated.group_name, "G1-b");
        assert_eq!(updated.description, "");
        Ok(())
    }

    #[tokio::test]
    async fn test_missing_group_is_not_found() {
        let service = service().await;

        assert!(matches!(
            service.find_by_id(7).await,
            Err(Error::GroupNotFound(7))
        ));
        assert!(matches!(
            service.update(7, g1()).await,
            Err(Error::GroupNotFound(7))
        ));
        assert!(matches!(service.delete(7).await, Err(Error::GroupNotFound(7))));
        assert!(service.find_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_then_find() -> Result<()> {
        let service = service().await;
        let id = service.create(g1()).await?.group_id.unwrap();

        service.delete(id).await?;
        let err = service.find_by_id(id).await.unwrap_err();
        assert_eq!(err.to_string(), format!("Group not found with id: {id}"));
        Ok(())
    }
}
