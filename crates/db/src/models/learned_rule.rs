//! Learned pairing rule model.

use galley_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `learned_rules` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct LearnedRule {
    pub id: DbId,
    pub main_recipe_id: DbId,
    pub rule_type: String,
    pub target_recipe_name: String,
    pub confidence: f64,
    pub source: String,
    pub description: String,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for inserting or refreshing a rule.
#[derive(Debug, Clone)]
pub struct UpsertLearnedRule {
    pub main_recipe_id: DbId,
    pub rule_type: String,
    pub target_recipe_name: String,
    pub confidence: f64,
    pub source: String,
    pub description: String,
}

/// DTO for a manual toggle.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateLearnedRule {
    pub is_active: bool,
}
