//! Repository for the `recipes` table.

use galley_core::types::DbId;
use sqlx::PgPool;

use crate::models::recipe::{CreateRecipe, Recipe};

const COLUMNS: &str = "id, name, category, created_at, updated_at";

/// Read access to the recipe catalog.
pub struct RecipeRepo;

impl RecipeRepo {
    /// Insert a catalog entry, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateRecipe) -> Result<Recipe, sqlx::Error> {
        let query = format!(
            "INSERT INTO recipes (name, category) VALUES ($1, $2) RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Recipe>(&query)
            .bind(&input.name)
            .bind(&input.category)
            .fetch_one(pool)
            .await
    }

    /// All recipes, ordered by id.
    pub async fn list_all(pool: &PgPool) -> Result<Vec<Recipe>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM recipes ORDER BY id");
        sqlx::query_as::<_, Recipe>(&query).fetch_all(pool).await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Recipe>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM recipes WHERE id = $1");
        sqlx::query_as::<_, Recipe>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Recipes with the given ids; unknown ids are ignored.
    pub async fn find_by_ids(pool: &PgPool, ids: &[DbId]) -> Result<Vec<Recipe>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM recipes WHERE id = ANY($1) ORDER BY id");
        sqlx::query_as::<_, Recipe>(&query)
            .bind(ids)
            .fetch_all(pool)
            .await
    }

    /// Exact, case-insensitive name lookup. Surrounding whitespace is ignored.
    ///
    /// When several recipes share a name the oldest one wins.
    pub async fn find_id_by_name(pool: &PgPool, name: &str) -> Result<Option<DbId>, sqlx::Error> {
        let row: Option<(DbId,)> = sqlx::query_as(
            "SELECT id FROM recipes WHERE LOWER(name) = LOWER($1) ORDER BY id LIMIT 1",
        )
        .bind(name.trim())
        .fetch_optional(pool)
        .await?;
        Ok(row.map(|(id,)| id))
    }
}
