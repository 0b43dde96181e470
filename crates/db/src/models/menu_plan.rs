//! Menu plan model: dated, location-bound menu entries.

use chrono::NaiveDate;
use galley_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `menu_plans` table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct MenuPlan {
    pub id: DbId,
    pub date: NaiveDate,
    pub meal: String,
    pub course: String,
    pub recipe_id: DbId,
    pub portions: i32,
    pub location_id: DbId,
    pub rotation_week_nr: Option<i32>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Insert DTO produced by the week materializer.
#[derive(Debug, Clone)]
pub struct CreateMenuPlan {
    pub date: NaiveDate,
    pub meal: String,
    pub course: String,
    pub recipe_id: DbId,
    pub portions: i32,
    pub location_id: DbId,
    pub rotation_week_nr: Option<i32>,
}
