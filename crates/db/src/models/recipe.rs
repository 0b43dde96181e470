//! Recipe catalog read model.

use galley_core::auto_fill::CatalogRecipe;
use galley_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `recipes` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Recipe {
    pub id: DbId,
    pub name: String,
    pub category: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<&Recipe> for CatalogRecipe {
    fn from(r: &Recipe) -> Self {
        CatalogRecipe {
            id: r.id,
            category: r.category.clone(),
        }
    }
}

/// DTO for inserting a catalog entry (catalog sync and tests).
#[derive(Debug, Clone, Deserialize)]
pub struct CreateRecipe {
    pub name: String,
    pub category: String,
}
