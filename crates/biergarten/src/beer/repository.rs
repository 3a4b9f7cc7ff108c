//! Beer post repository for database operations.

use anyhow::{Context, Result};
use sqlx::SqlitePool;
use tracing::{debug, instrument};

use super::models::{BeerPost, NewBeerPost};
use crate::ids;

const BEER_COLUMNS: &str = "id, name, beer_type, description, brewery_id, image, abv, ibu, \
                            posted_by, created_at, updated_at";

/// Repository for beer post database operations.
#[derive(Debug, Clone)]
pub struct BeerRepository {
    pool: SqlitePool,
}

impl BeerRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    #[instrument(skip(self, post), fields(name = %post.name))]
    pub async fn create(&self, posted_by: &str, post: NewBeerPost) -> Result<BeerPost> {
        let id = ids::generate(ids::BEER_PREFIX);
        let now = chrono::Utc::now().to_rfc3339();

        debug!("Creating beer post: {} ({})", post.name, id);

        sqlx::query(
            r#"
            INSERT INTO beer_posts (id, name, beer_type, description, brewery_id, image, abv, ibu, posted_by, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&post.name)
        .bind(&post.beer_type)
        .bind(&post.description)
        .bind(&post.brewery_id)
        .bind(&post.image)
        .bind(post.abv)
        .bind(post.ibu)
        .bind(posted_by)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await
        .context("Failed to insert beer post")?;

        self.get(&id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Beer post not found after creation"))
    }

    /// All beer posts, newest first.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<BeerPost>> {
        let posts = sqlx::query_as::<_, BeerPost>(&format!(
            "SELECT {BEER_COLUMNS} FROM beer_posts ORDER BY created_at DESC, id"
        ))
        .fetch_all(&self.pool)
        .await
        .context("Failed to list beer posts")?;

        Ok(posts)
    }

    #[instrument(skip(self))]
    pub async fn list_by_brewery(&self, brewery_id: &str) -> Result<Vec<BeerPost>> {
        let posts = sqlx::query_as::<_, BeerPost>(&format!(
            "SELECT {BEER_COLUMNS} FROM beer_posts WHERE brewery_id = ? ORDER BY created_at DESC, id"
        ))
        .bind(brewery_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list beer posts by brewery")?;

        Ok(posts)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: &str) -> Result<Option<BeerPost>> {
        let post = sqlx::query_as::<_, BeerPost>(&format!(
            "SELECT {BEER_COLUMNS} FROM beer_posts WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch beer post")?;

        Ok(post)
    }

    /// Replace the editable fields of a post. Returns `None` if it is gone.
    #[instrument(skip(self, post))]
    pub async fn update(&self, id: &str, post: NewBeerPost) -> Result<Option<BeerPost>> {
        let now = chrono::Utc::now().to_rfc3339();

        let result = sqlx::query(
            r#"
            UPDATE beer_posts
            SET name = ?, beer_type = ?, description = ?, brewery_id = ?, image = ?,
                abv = ?, ibu = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&post.name)
        .bind(&post.beer_type)
        .bind(&post.description)
        .bind(&post.brewery_id)
        .bind(&post.image)
        .bind(post.abv)
        .bind(post.ibu)
        .bind(&now)
        .bind(id)
        .execute(&self.pool)
        .await
        .context("Failed to update beer post")?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get(id).await
    }

    /// Delete a post. Returns whether a row was removed.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM beer_posts WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete beer post")?;

        Ok(result.rows_affected() > 0)
    }
}
