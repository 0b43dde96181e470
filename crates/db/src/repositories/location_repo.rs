//! Repository for the `locations` table.

use sqlx::PgPool;

use crate::models::location::Location;

const COLUMNS: &str = "id, slug, name, created_at, updated_at";

pub struct LocationRepo;

impl LocationRepo {
    /// All locations, ordered by id.
    pub async fn list(pool: &PgPool) -> Result<Vec<Location>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM locations ORDER BY id");
        sqlx::query_as::<_, Location>(&query).fetch_all(pool).await
    }

    /// Insert a location, returning the created row.
    pub async fn create(pool: &PgPool, slug: &str, name: &str) -> Result<Location, sqlx::Error> {
        let query = format!(
            "INSERT INTO locations (slug, name) VALUES ($1, $2) RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Location>(&query)
            .bind(slug)
            .bind(name)
            .fetch_one(pool)
            .await
    }
}
