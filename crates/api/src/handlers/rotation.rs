//! Handlers for rotation templates and slots.

use std::collections::HashMap;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::NaiveDate;
use galley_core::calendar::validate_monday;
use galley_core::error::CoreError;
use galley_core::grid::SlotState;
use galley_core::pairing::observable_pairings;
use galley_core::rotation::{
    validate_course, validate_day_of_week, validate_location, validate_week_nr, Course, Meal,
    RecipeCategory,
};
use galley_core::types::DbId;
use galley_db::models::rotation::{CreateRotationSlot, RotationTemplate, UpdateRotationSlot};
use galley_db::repositories::{MenuPlanRepo, RecipeRepo, RotationSlotRepo, RotationTemplateRepo};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::rotation::{auto_fill, grid, materializer};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct SlotListParams {
    pub week_nr: Option<i32>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AutoFillRequest {
    #[serde(default)]
    pub overwrite: bool,
}

#[derive(Debug, Deserialize)]
pub struct GenerateWeekRequest {
    pub monday_date: NaiveDate,
    /// Replace menu plans already present for that calendar week.
    #[serde(default)]
    pub replace: bool,
}

#[derive(Debug, Deserialize)]
pub struct PairingParams {
    pub week_nr: i32,
    pub day_of_week: i16,
    pub meal: String,
    pub location_slug: String,
}

#[derive(Debug, Serialize)]
pub struct PairingView {
    pub main_course: &'static str,
    pub side_course: &'static str,
    pub pairing_type: &'static str,
    pub main_recipe_id: DbId,
    pub main_name: Option<String>,
    pub side_recipe_id: DbId,
    pub side_name: Option<String>,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn load_template(pool: &PgPool, id: DbId) -> AppResult<RotationTemplate> {
    RotationTemplateRepo::find_by_id(pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "RotationTemplate",
            id,
        }))
}

fn parse_meal(raw: &str) -> AppResult<Meal> {
    Meal::parse(raw).ok_or_else(|| {
        AppError::Core(CoreError::Validation(format!("Unknown meal '{raw}'")))
    })
}

/// A recipe placed by hand must exist and fit the slot's course.
async fn check_recipe_for_course(pool: &PgPool, recipe_id: DbId, course: Course) -> AppResult<()> {
    let recipe = RecipeRepo::find_by_id(pool, recipe_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Recipe",
            id: recipe_id,
        }))?;

    let fits = RecipeCategory::parse(&recipe.category).is_some_and(|c| course.accepts(c));
    if !fits {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Recipe '{}' ({}) cannot be served as {}",
            recipe.name,
            recipe.category,
            course.as_str()
        ))));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Template
// ---------------------------------------------------------------------------

/// GET /api/v1/rotation/template
///
/// Return the active template, creating and provisioning it if needed.
pub async fn get_template(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let overview = grid::ensure_default_template(&state.pool).await?;
    Ok(Json(DataResponse { data: overview }))
}

// ---------------------------------------------------------------------------
// Slots
// ---------------------------------------------------------------------------

/// GET /api/v1/rotation/templates/{id}/slots?week_nr=
pub async fn list_slots(
    State(state): State<AppState>,
    Path(template_id): Path<DbId>,
    Query(params): Query<SlotListParams>,
) -> AppResult<impl IntoResponse> {
    let template = load_template(&state.pool, template_id).await?;
    if let Some(week_nr) = params.week_nr {
        validate_week_nr(week_nr, template.week_count)?;
    }

    let slots = RotationSlotRepo::list_by_template(&state.pool, template_id, params.week_nr).await?;
    Ok(Json(DataResponse { data: slots }))
}

/// POST /api/v1/rotation/templates/{id}/slots
///
/// Create a single slot. A slot for the same cell already existing is a 409.
pub async fn create_slot(
    State(state): State<AppState>,
    Path(template_id): Path<DbId>,
    Json(mut input): Json<CreateRotationSlot>,
) -> AppResult<impl IntoResponse> {
    let template = load_template(&state.pool, template_id).await?;
    validate_week_nr(input.week_nr, template.week_count)?;
    validate_day_of_week(input.day_of_week)?;
    validate_location(&input.location_slug)?;
    let course = validate_course(&input.course)?;
    input.meal = parse_meal(&input.meal)?.as_str().to_string();

    if let Some(recipe_id) = input.recipe_id {
        check_recipe_for_course(&state.pool, recipe_id, course).await?;
    }

    let slot = RotationSlotRepo::create(&state.pool, template_id, &input).await?;
    tracing::info!(template_id, slot_id = slot.id, "Rotation slot created");

    Ok((StatusCode::CREATED, Json(DataResponse { data: slot })))
}

/// PATCH /api/v1/rotation/slots/{id}
///
/// Set or clear (`recipe_id: null`) the recipe of a slot.
pub async fn update_slot(
    State(state): State<AppState>,
    Path(slot_id): Path<DbId>,
    Json(input): Json<UpdateRotationSlot>,
) -> AppResult<impl IntoResponse> {
    let slot = RotationSlotRepo::find_by_id(&state.pool, slot_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "RotationSlot",
            id: slot_id,
        }))?;

    if let Some(recipe_id) = input.recipe_id {
        let course = validate_course(&slot.course)?;
        check_recipe_for_course(&state.pool, recipe_id, course).await?;
    }

    let updated = RotationSlotRepo::set_recipe(&state.pool, slot_id, input.recipe_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "RotationSlot",
            id: slot_id,
        }))?;

    tracing::info!(slot_id, recipe_id = ?input.recipe_id, "Rotation slot updated");
    Ok(Json(DataResponse { data: updated }))
}

// ---------------------------------------------------------------------------
// Auto-fill & materialization
// ---------------------------------------------------------------------------

/// POST /api/v1/rotation/templates/{id}/auto-fill
pub async fn run_auto_fill(
    State(state): State<AppState>,
    Path(template_id): Path<DbId>,
    body: Option<Json<AutoFillRequest>>,
) -> AppResult<impl IntoResponse> {
    let request = body.map(|Json(r)| r).unwrap_or_default();
    let summary = auto_fill::auto_fill(&state.pool, template_id, request.overwrite).await?;
    Ok(Json(DataResponse { data: summary }))
}

/// POST /api/v1/rotation/templates/{id}/weeks/{week_nr}/generate
///
/// Materialize one rotation week onto the calendar week starting at
/// `monday_date`. Refuses to stack on top of existing plans unless
/// `replace` is set.
pub async fn generate_week(
    State(state): State<AppState>,
    Path((template_id, week_nr)): Path<(DbId, i32)>,
    Json(input): Json<GenerateWeekRequest>,
) -> AppResult<impl IntoResponse> {
    let monday = input.monday_date;
    validate_monday(monday)?;
    let template = load_template(&state.pool, template_id).await?;
    validate_week_nr(week_nr, template.week_count)?;
    let sunday = monday + chrono::Duration::days(6);

    if !input.replace && MenuPlanRepo::count_range(&state.pool, monday, sunday).await? > 0 {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "Menu plans already exist for the week of {monday}"
        ))));
    }

    let outcome = materializer::generate_week(
        &state.pool,
        &state.locations,
        template_id,
        week_nr,
        monday,
        state.config.default_portions,
        input.replace,
    )
    .await?;

    Ok((StatusCode::CREATED, Json(DataResponse { data: outcome })))
}

// ---------------------------------------------------------------------------
// Pairings
// ---------------------------------------------------------------------------

/// GET /api/v1/rotation/templates/{id}/pairings
///
/// Rateable main/side pairings of one (week, day, meal, location).
pub async fn list_pairings(
    State(state): State<AppState>,
    Path(template_id): Path<DbId>,
    Query(params): Query<PairingParams>,
) -> AppResult<impl IntoResponse> {
    let template = load_template(&state.pool, template_id).await?;
    validate_week_nr(params.week_nr, template.week_count)?;
    validate_day_of_week(params.day_of_week)?;
    validate_location(&params.location_slug)?;
    let meal = parse_meal(&params.meal)?;

    let slots = RotationSlotRepo::list_meal(
        &state.pool,
        template_id,
        params.week_nr,
        params.day_of_week,
        meal.as_str(),
        &params.location_slug,
    )
    .await?;
    let states: Vec<SlotState> = slots.iter().map(SlotState::from).collect();
    let pairings = observable_pairings(&states);

    let ids: Vec<DbId> = pairings
        .iter()
        .flat_map(|p| [p.main_recipe_id, p.side_recipe_id])
        .collect();
    let names: HashMap<DbId, String> = RecipeRepo::find_by_ids(&state.pool, &ids)
        .await?
        .into_iter()
        .map(|r| (r.id, r.name))
        .collect();

    let views: Vec<PairingView> = pairings
        .into_iter()
        .map(|p| PairingView {
            main_course: p.main_course.as_str(),
            side_course: p.side_course.as_str(),
            pairing_type: p.pairing_type.as_str(),
            main_recipe_id: p.main_recipe_id,
            main_name: names.get(&p.main_recipe_id).cloned(),
            side_recipe_id: p.side_recipe_id,
            side_name: names.get(&p.side_recipe_id).cloned(),
        })
        .collect();

    Ok(Json(DataResponse { data: views }))
}
