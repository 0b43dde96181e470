//! Rotation template and slot models (menu rotation engine).

use galley_core::grid::{SlotKey, SlotState};
use galley_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `rotation_templates` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct RotationTemplate {
    pub id: DbId,
    pub name: String,
    pub week_count: i32,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a template.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateRotationTemplate {
    pub name: String,
    pub week_count: i32,
}

/// A row from the `rotation_slots` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct RotationSlot {
    pub id: DbId,
    pub template_id: DbId,
    pub week_nr: i32,
    pub day_of_week: i16,
    pub meal: String,
    pub location_slug: String,
    pub course: String,
    pub recipe_id: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl RotationSlot {
    pub fn key(&self) -> SlotKey {
        SlotKey {
            week_nr: self.week_nr,
            day_of_week: self.day_of_week,
            meal: self.meal.clone(),
            location_slug: self.location_slug.clone(),
            course: self.course.clone(),
        }
    }
}

impl From<&RotationSlot> for SlotState {
    fn from(s: &RotationSlot) -> Self {
        SlotState {
            id: s.id,
            week_nr: s.week_nr,
            day_of_week: s.day_of_week,
            meal: s.meal.clone(),
            location_slug: s.location_slug.clone(),
            course: s.course.clone(),
            recipe_id: s.recipe_id,
        }
    }
}

/// DTO for creating a single slot by hand.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateRotationSlot {
    pub week_nr: i32,
    pub day_of_week: i16,
    pub meal: String,
    pub location_slug: String,
    pub course: String,
    pub recipe_id: Option<DbId>,
}

/// DTO for a manual slot edit. `recipe_id: null` clears the slot.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateRotationSlot {
    pub recipe_id: Option<DbId>,
}

/// Slot counts for a template, split by location.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct LocationSlotCount {
    pub location_slug: String,
    pub slot_count: i64,
    pub filled_count: i64,
}
