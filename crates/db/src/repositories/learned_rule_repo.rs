//! Repository for the `learned_rules` table.

use galley_core::types::DbId;
use sqlx::PgPool;

use crate::models::learned_rule::{LearnedRule, UpsertLearnedRule};

const COLUMNS: &str = "id, main_recipe_id, rule_type, target_recipe_name, confidence, source, \
     description, is_active, created_at, updated_at";

pub struct LearnedRuleRepo;

impl LearnedRuleRepo {
    /// Insert a rule, or refresh confidence, source and description of the
    /// existing rule for the same (main, type, target). `is_active` of an
    /// existing rule is preserved.
    pub async fn upsert(
        pool: &PgPool,
        input: &UpsertLearnedRule,
    ) -> Result<LearnedRule, sqlx::Error> {
        let query = format!(
            "INSERT INTO learned_rules \
                (main_recipe_id, rule_type, target_recipe_name, confidence, source, description) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             ON CONFLICT ON CONSTRAINT uq_learned_rules_target DO UPDATE SET \
                confidence = EXCLUDED.confidence, \
                source = EXCLUDED.source, \
                description = EXCLUDED.description \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, LearnedRule>(&query)
            .bind(input.main_recipe_id)
            .bind(&input.rule_type)
            .bind(&input.target_recipe_name)
            .bind(input.confidence)
            .bind(&input.source)
            .bind(&input.description)
            .fetch_one(pool)
            .await
    }

    /// Rules ordered by confidence, highest first.
    pub async fn list(
        pool: &PgPool,
        include_inactive: bool,
    ) -> Result<Vec<LearnedRule>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM learned_rules \
             WHERE ($1 OR is_active) \
             ORDER BY confidence DESC, id"
        );
        sqlx::query_as::<_, LearnedRule>(&query)
            .bind(include_inactive)
            .fetch_all(pool)
            .await
    }

    pub async fn set_active(
        pool: &PgPool,
        id: DbId,
        is_active: bool,
    ) -> Result<Option<LearnedRule>, sqlx::Error> {
        let query = format!(
            "UPDATE learned_rules SET is_active = $2 WHERE id = $1 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, LearnedRule>(&query)
            .bind(id)
            .bind(is_active)
            .fetch_optional(pool)
            .await
    }
}
