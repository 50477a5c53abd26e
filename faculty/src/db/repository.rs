use sqlx::sqlite::SqliteRow;

use crate::db::{AppDbHandle, AsExecutor, map_err};

/// CRUD over one table keyed by a single integer column.
///
/// Implementors name the table and its key and supply the two statements
/// that depend on the row's columns. Lookups, listing and deletes are
/// shared. Every method takes a [`Handle`](crate::db::Handle) so the same
/// repository serves plain pool reads and transactional writes.
#[async_trait::async_trait]
pub trait BaseRepository<T>: Sync + Send
where
    T: for<'r> sqlx::FromRow<'r, SqliteRow> + Send + Unpin + 'static,
{
    const TABLE: &'static str;
    const KEY: &'static str;

    /// Inserts `entity`, ignoring its identifier, and returns the stored row.
    async fn create(
        &self,
        h: &mut AppDbHandle<'_>,
        entity: T,
    ) -> crate::Result<T>;

    /// Overwrites the row carrying `entity`'s identifier.
    async fn update(
        &self,
        h: &mut AppDbHandle<'_>,
        entity: T,
    ) -> crate::Result<T>;

    async fn find_by_id(
        &self,
        h: &mut AppDbHandle<'_>,
        id: i64,
    ) -> crate::Result<Option<T>> {
        let sql =
            format!("SELECT * FROM {} WHERE {} = ?", Self::TABLE, Self::KEY);
        sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(h.as_executor())
            .await
            .map_err(map_err)
    }

    /// Every row, in key order.
    async fn find_all(
        &self,
        h: &mut AppDbHandle<'_>,
    ) -> crate::Result<Vec<T>> {
        let sql =
            format!("SELECT * FROM {} ORDER BY {}", Self::TABLE, Self::KEY);
        sqlx::query_as(&sql)
            .fetch_all(h.as_executor())
            .await
            .map_err(map_err)
    }

    /// Removing an absent row is not an error.
    async fn delete(
        &self,
        h: &mut AppDbHandle<'_>,
        id: i64,
    ) -> crate::Result<()> {
        let sql =
            format!("DELETE FROM {} WHERE {} = ?", Self::TABLE, Self::KEY);
        sqlx::query(&sql)
            .bind(id)
            .execute(h.as_executor())
            .await
            .map_err(map_err)?;
        Ok(())
    }

    async fn exists_by_id(
        &self,
        h: &mut AppDbHandle<'_>,
        id: i64,
    ) -> crate::Result<bool> {
        let sql = format!(
            "SELECT EXISTS (SELECT 1 FROM {} WHERE {} = ?)",
            Self::TABLE,
            Self::KEY
        );
        sqlx::query_scalar(&sql)
            .bind(id)
            .fetch_one(h.as_executor())
            .await
            .map_err(map_err)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{
        config::DatabaseConfig,
        db::{AppDbPool, Handle, connect},
    };

    #[derive(Debug, PartialEq, sqlx::FromRow)]
    struct Tag {
        tag_id: i64,
        label: String,
    }

    struct TagRepository;

    #[async_trait::async_trait]
    impl BaseRepository<Tag> for TagRepository {
        const TABLE: &'static str = "tag";
        const KEY: &'static str = "tag_id";

        async fn create(
            &self,
            h: &mut AppDbHandle<'_>,
            entity: Tag,
        ) -> crate::Result<Tag> {
            sqlx::query_as("INSERT INTO tag (label) VALUES (?) RETURNING *")
                .bind(entity.label)
                .fetch_one(h.as_executor())
                .await
                .map_err(map_err)
        }

        async fn update(
            &self,
            h: &mut AppDbHandle<'_>,
            entity: Tag,
        ) -> crate::Result<Tag> {
            sqlx::query_as(
                "UPDATE tag SET label = ? WHERE tag_id = ? RETURNING *",
            )
            .bind(entity.label)
            .bind(entity.tag_id)
            .fetch_one(h.as_executor())
            .await
            .map_err(map_err)
        }
    }

    async fn tag_pool() -> AppDbPool {
        let pool = connect(&DatabaseConfig {
            url: "sqlite::memory:".into(),
            max_connections: 1,
        })
        .await
        .unwrap();
        sqlx::query(
            "CREATE TABLE tag (tag_id INTEGER PRIMARY KEY AUTOINCREMENT, \
             label TEXT NOT NULL)",
        )
        .execute(&pool)
        .await
        .unwrap();
        pool
    }

    fn tag(label: &str) -> Tag {
        Tag {
            tag_id: 0,
            label: label.into(),
        }
    }

    #[tokio::test]
    async fn test_shared_lookups_use_table_and_key() -> crate::Result<()> {
        let mut h = Handle::Pool(tag_pool().await);
        let repo = TagRepository;

        let b = repo.create(&mut h, tag("b")).await?;
        let a = repo.create(&mut h, tag("a")).await?;

        assert_eq!(repo.find_by_id(&mut h, a.tag_id).await?, Some(a));
        assert!(repo.exists_by_id(&mut h, b.tag_id).await?);
        assert!(!repo.exists_by_id(&mut h, 99).await?);

        let labels: Vec<String> = repo
            .find_all(&mut h)
            .await?
            .into_iter()
            .map(|t| t.label)
            .collect();
        assert_eq!(labels, vec!["b", "a"]);
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() -> crate::Result<()> {
        let mut h = Handle::Pool(tag_pool().await);
        let repo = TagRepository;
        let saved = repo.create(&mut h, tag("gone")).await?;

        repo.delete(&mut h, saved.tag_id).await?;
        repo.delete(&mut h, saved.tag_id).await?;

        assert_eq!(repo.find_by_id(&mut h, saved.tag_id).await?, None);
        assert!(repo.find_all(&mut h).await?.is_empty());
        Ok(())
    }
}
