//! Week materializer: turns a rotation week into dated menu plans.

use chrono::{Duration, NaiveDate};
use galley_core::calendar::{iso_week_range, rotation_week_for, validate_monday};
use galley_core::error::CoreError;
use galley_core::grid::SlotState;
use galley_core::materialize::{project_week, PlannedMeal};
use galley_core::rotation::validate_week_nr;
use galley_core::types::DbId;
use galley_db::models::menu_plan::{CreateMenuPlan, MenuPlan};
use galley_db::repositories::{MenuPlanRepo, RotationSlotRepo, RotationTemplateRepo};
use serde::Serialize;
use sqlx::PgPool;

use crate::error::AppResult;
use crate::rotation::location::LocationResolver;

/// Menu plans of one calendar week.
#[derive(Debug, Serialize)]
pub struct WeekPlan {
    pub year: i32,
    pub week: u32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Rotation week the calendar week maps onto, if a template is active.
    pub rotation_week_nr: Option<i32>,
    /// Whether this call created the plans.
    pub generated: bool,
    pub plans: Vec<MenuPlan>,
}

/// Result of materializing one rotation week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Materialized {
    /// Plans removed from the calendar week before generation.
    pub replaced: u64,
    pub created: u64,
}

/// Foreign key from `menu_plans.location_id` to `locations`.
const LOCATION_FK: &str = "menu_plans_location_id_fkey";

/// Materialize rotation week `week_nr` of `template_id` onto the week
/// starting at `monday`.
///
/// With `replace` set, plans already dated in that week are deleted in the
/// same transaction as the insert, so a failed generation leaves them in
/// place. Fails if the template is missing or the rotation week has no slot
/// rows at all. A week whose slots are all empty creates nothing.
pub async fn generate_week(
    pool: &PgPool,
    resolver: &LocationResolver,
    template_id: DbId,
    week_nr: i32,
    monday: NaiveDate,
    portions: i32,
    replace: bool,
) -> AppResult<Materialized> {
    validate_monday(monday)?;

    let template = RotationTemplateRepo::find_by_id(pool, template_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "RotationTemplate",
            id: template_id,
        })?;
    validate_week_nr(week_nr, template.week_count)?;

    let slots = RotationSlotRepo::list_by_template(pool, template_id, Some(week_nr)).await?;
    if slots.is_empty() {
        return Err(CoreError::NotFound {
            entity: "RotationWeek",
            id: DbId::from(week_nr),
        }
        .into());
    }

    let states: Vec<SlotState> = slots.iter().map(SlotState::from).collect();
    let planned = project_week(monday, &states);
    let sunday = monday + Duration::days(6);

    let mut reloaded = false;
    loop {
        let rows = menu_plan_rows(pool, resolver, &planned, week_nr, portions).await?;

        match MenuPlanRepo::replace_range(pool, monday, sunday, replace, &rows).await {
            Ok((replaced, created)) => {
                tracing::info!(
                    template_id,
                    week_nr,
                    %monday,
                    replaced,
                    created,
                    "Rotation week materialized"
                );
                return Ok(Materialized { replaced, created });
            }
            // A location recreated under the same slug leaves its old id in
            // the resolver cache. Reload once and retry.
            Err(e) if !reloaded && is_stale_location(&e) => {
                tracing::warn!(error = %e, %monday, "Stale location id, reloading locations");
                resolver.invalidate().await;
                reloaded = true;
            }
            Err(e) => return Err(e.into()),
        }
    }
}

fn is_stale_location(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::Database(db_err)
            if db_err.code().as_deref() == Some("23503")
                && db_err.constraint() == Some(LOCATION_FK)
    )
}

/// Attach location ids to projected meals. Meals at unknown locations are
/// dropped with a warning.
async fn menu_plan_rows(
    pool: &PgPool,
    resolver: &LocationResolver,
    planned: &[PlannedMeal],
    week_nr: i32,
    portions: i32,
) -> Result<Vec<CreateMenuPlan>, sqlx::Error> {
    let slugs: Vec<&str> = planned.iter().map(|p| p.location_slug.as_str()).collect();
    let location_ids = resolver.resolve_many(pool, &slugs).await?;

    let mut rows = Vec::with_capacity(planned.len());
    for meal in planned {
        let Some(&location_id) = location_ids.get(&meal.location_slug) else {
            tracing::warn!(
                location_slug = %meal.location_slug,
                date = %meal.date,
                "Skipping menu entry for unknown location"
            );
            continue;
        };
        rows.push(CreateMenuPlan {
            date: meal.date,
            meal: meal.meal.clone(),
            course: meal.course.clone(),
            recipe_id: meal.recipe_id,
            portions,
            location_id,
            rotation_week_nr: Some(week_nr),
        });
    }
    Ok(rows)
}

/// Return the menu plans of ISO week `week` of `year`, generating them from
/// the active template when the week is empty.
///
/// Existing plans are returned unchanged unless `force` is set, in which
/// case they are replaced. Nothing is generated (and nothing is cleared)
/// when there is no active template or the matching rotation week has no
/// filled slot.
pub async fn get_or_generate_week_plan(
    pool: &PgPool,
    resolver: &LocationResolver,
    year: i32,
    week: u32,
    force: bool,
    portions: i32,
) -> AppResult<WeekPlan> {
    let (start_date, end_date) = iso_week_range(year, week)?;
    let existing = MenuPlanRepo::list_range(pool, start_date, end_date).await?;

    let mut plan = WeekPlan {
        year,
        week,
        start_date,
        end_date,
        rotation_week_nr: None,
        generated: false,
        plans: existing,
    };

    let Some(template) = RotationTemplateRepo::find_active(pool).await? else {
        return Ok(plan);
    };
    let rotation_week_nr = rotation_week_for(week, template.week_count)?;
    plan.rotation_week_nr = Some(rotation_week_nr);

    if !plan.plans.is_empty() && !force {
        return Ok(plan);
    }

    let (_, filled) = RotationSlotRepo::count_week(pool, template.id, rotation_week_nr).await?;
    if filled == 0 {
        tracing::debug!(
            template_id = template.id,
            rotation_week_nr,
            "Rotation week has no filled slots, nothing to generate"
        );
        return Ok(plan);
    }

    let outcome = generate_week(
        pool,
        resolver,
        template.id,
        rotation_week_nr,
        start_date,
        portions,
        !plan.plans.is_empty(),
    )
    .await?;
    if outcome.replaced > 0 {
        tracing::info!(year, week, replaced = outcome.replaced, "Week plans regenerated");
    }

    plan.plans = MenuPlanRepo::list_range(pool, start_date, end_date).await?;
    plan.generated = true;
    Ok(plan)
}
