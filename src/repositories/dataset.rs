use crate::entities::{DatasetItem, NewDatasetItem, TagStats};
use anyhow::Result;
use async_trait::async_trait;
use sqlx::{Pool, Postgres};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DatasetRepositoryTrait {
    async fn insert(&self, content: &str, tag: &str, created_by: &str) -> Result<DatasetItem>;
    /// Newest first.
    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<DatasetItem>>;
    async fn count(&self) -> Result<i64>;
    async fn tag_stats(&self) -> Result<Vec<TagStats>>;
    /// `None` when no item has `id`.
    async fn update(
        &self,
        id: i64,
        content: &str,
        tag: &str,
        updated_by: &str,
    ) -> Result<Option<DatasetItem>>;
    async fn delete(&self, id: i64) -> Result<bool>;
    /// Clears the table and inserts `items` in one transaction.
    async fn replace_all(&self, items: &[NewDatasetItem], created_by: &str) -> Result<u64>;
}

#[derive(Clone)]
pub struct DatasetRepository {
    pool: Pool<Postgres>,
}

impl DatasetRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DatasetRepositoryTrait for DatasetRepository {
    async fn insert(&self, content: &str, tag: &str, created_by: &str) -> Result<DatasetItem> {
        let item = sqlx::query_as::<_, DatasetItem>(
            r#"
            INSERT INTO dataset_items (content, tag, created_by)
            VALUES ($1, $2, $3)
            RETURNING id, content, tag, created_by, updated_by, created_at, updated_at
            "#,
        )
        .bind(content)
        .bind(tag)
        .bind(created_by)
        .fetch_one(&self.pool)
        .await?;

        Ok(item)
    }

    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<DatasetItem>> {
        let items = sqlx::query_as::<_, DatasetItem>(
            r#"
            SELECT id, content, tag, created_by, updated_by, created_at, updated_at
            FROM dataset_items
            ORDER BY created_at DESC, id DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    async fn count(&self) -> Result<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM dataset_items")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn tag_stats(&self) -> Result<Vec<TagStats>> {
        let stats = sqlx::query_as::<_, TagStats>(
            r#"
            SELECT tag,
                   COUNT(*) AS count,
                   AVG(char_length(content))::float8 AS avg_content_chars
            FROM dataset_items
            GROUP BY tag
            ORDER BY tag
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(stats)
    }

    async fn update(
        &self,
        id: i64,
        content: &str,
        tag: &str,
        updated_by: &str,
    ) -> Result<Option<DatasetItem>> {
        let item = sqlx::query_as::<_, DatasetItem>(
            r#"
            UPDATE dataset_items
            SET content = $1, tag = $2, updated_by = $3, updated_at = now()
            WHERE id = $4
            RETURNING id, content, tag, created_by, updated_by, created_at, updated_at
            "#,
        )
        .bind(content)
        .bind(tag)
        .bind(updated_by)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(item)
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM dataset_items WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn replace_all(&self, items: &[NewDatasetItem], created_by: &str) -> Result<u64> {
        let (contents, tags): (Vec<&str>, Vec<&str>) = items
            .iter()
            .map(|item| (item.content.as_str(), item.tag.as_str()))
            .unzip();

        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM dataset_items")
            .execute(&mut *tx)
            .await?;

        let inserted = sqlx::query(
            r#"
            INSERT INTO dataset_items (content, tag, created_by)
            SELECT content, tag, $3
            FROM UNNEST($1::text[], $2::text[]) AS t(content, tag)
            "#,
        )
        .bind(contents)
        .bind(tags)
        .bind(created_by)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(inserted.rows_affected())
    }
}
