//! Brewery repository for database operations.

use anyhow::{Context, Result};
use sqlx::SqlitePool;
use tracing::{debug, instrument};

use super::models::{Brewery, NewBrewery};
use crate::ids;

const BREWERY_COLUMNS: &str =
    "id, name, description, location, posted_by, created_at, updated_at";

/// Repository for brewery database operations.
#[derive(Debug, Clone)]
pub struct BreweryRepository {
    pool: SqlitePool,
}

impl BreweryRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    #[instrument(skip(self, brewery), fields(name = %brewery.name))]
    pub async fn create(&self, posted_by: &str, brewery: NewBrewery) -> Result<Brewery> {
        let id = ids::generate(ids::BREWERY_PREFIX);
        let now = chrono::Utc::now().to_rfc3339();

        debug!("Creating brewery: {} ({})", brewery.name, id);

        sqlx::query(
            r#"
            INSERT INTO breweries (id, name, description, location, posted_by, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&brewery.name)
        .bind(&brewery.description)
        .bind(&brewery.location)
        .bind(posted_by)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await
        .context("Failed to insert brewery")?;

        self.get(&id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Brewery not found after creation"))
    }

    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<Brewery>> {
        let breweries = sqlx::query_as::<_, Brewery>(&format!(
            "SELECT {BREWERY_COLUMNS} FROM breweries ORDER BY name COLLATE NOCASE, id"
        ))
        .fetch_all(&self.pool)
        .await
        .context("Failed to list breweries")?;

        Ok(breweries)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: &str) -> Result<Option<Brewery>> {
        let brewery = sqlx::query_as::<_, Brewery>(&format!(
            "SELECT {BREWERY_COLUMNS} FROM breweries WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch brewery")?;

        Ok(brewery)
    }

    #[instrument(skip(self))]
    pub async fn exists(&self, id: &str) -> Result<bool> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM breweries WHERE id = ?")
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .context("Failed to check brewery")?;

        Ok(count.0 > 0)
    }
}
