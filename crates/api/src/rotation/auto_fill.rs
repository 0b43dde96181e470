//! Auto-fill service: loads the catalog and slots, runs the planner, and
//! writes the chosen recipes back.

use std::collections::BTreeMap;

use galley_core::auto_fill::{plan_auto_fill, CatalogRecipe};
use galley_core::error::CoreError;
use galley_core::grid::SlotState;
use galley_core::types::DbId;
use galley_db::repositories::{RecipeRepo, RotationSlotRepo, RotationTemplateRepo};
use serde::Serialize;
use sqlx::PgPool;

use crate::error::AppResult;

#[derive(Debug, Serialize)]
pub struct AutoFillSummary {
    pub filled: usize,
    pub skipped: usize,
    pub skipped_by_course: BTreeMap<String, usize>,
}

/// Fill the slots of `template_id`.
///
/// With `overwrite` unset, filled slots are kept. Every slot is visited once;
/// a course whose recipe pool is empty is skipped rather than failing the run.
pub async fn auto_fill(pool: &PgPool, template_id: DbId, overwrite: bool) -> AppResult<AutoFillSummary> {
    RotationTemplateRepo::find_by_id(pool, template_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "RotationTemplate",
            id: template_id,
        })?;

    let recipes: Vec<CatalogRecipe> = RecipeRepo::list_all(pool)
        .await?
        .iter()
        .map(CatalogRecipe::from)
        .collect();
    let slots: Vec<SlotState> = RotationSlotRepo::list_by_template(pool, template_id, None)
        .await?
        .iter()
        .map(SlotState::from)
        .collect();

    // The thread-local rng must not live across an await point.
    let plan = {
        let mut rng = rand::rng();
        plan_auto_fill(&recipes, &slots, overwrite, &mut rng)
    };

    for assignment in &plan.assignments {
        RotationSlotRepo::set_recipe(pool, assignment.slot_id, Some(assignment.recipe_id)).await?;
    }

    tracing::info!(
        template_id,
        overwrite,
        recipes = recipes.len(),
        slots = slots.len(),
        filled = plan.filled,
        skipped = plan.skipped,
        "Auto-fill complete"
    );

    Ok(AutoFillSummary {
        filled: plan.filled,
        skipped: plan.skipped,
        skipped_by_course: plan.skipped_by_course,
    })
}
