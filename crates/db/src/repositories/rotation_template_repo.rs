//! Repository for the `rotation_templates` table.

use galley_core::types::DbId;
use sqlx::PgPool;

use crate::models::rotation::{CreateRotationTemplate, RotationTemplate};

const COLUMNS: &str = "id, name, week_count, is_active, created_at, updated_at";

pub struct RotationTemplateRepo;

impl RotationTemplateRepo {
    /// Insert a new active template, returning the created row.
    ///
    /// Fails with a `uq_rotation_templates_active` violation if another
    /// template is already active.
    pub async fn create(
        pool: &PgPool,
        input: &CreateRotationTemplate,
    ) -> Result<RotationTemplate, sqlx::Error> {
        let query = format!(
            "INSERT INTO rotation_templates (name, week_count, is_active) \
             VALUES ($1, $2, true) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, RotationTemplate>(&query)
            .bind(&input.name)
            .bind(input.week_count)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<RotationTemplate>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM rotation_templates WHERE id = $1");
        sqlx::query_as::<_, RotationTemplate>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// The active template, if any.
    pub async fn find_active(pool: &PgPool) -> Result<Option<RotationTemplate>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM rotation_templates \
             WHERE is_active = true \
             ORDER BY id \
             LIMIT 1"
        );
        sqlx::query_as::<_, RotationTemplate>(&query)
            .fetch_optional(pool)
            .await
    }
}
