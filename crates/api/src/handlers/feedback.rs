//! Handlers for pairing feedback: submission, listing, scores and stats.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use galley_core::error::CoreError;
use galley_core::exploration::{adaptive_epsilon, COLD_START_RATINGS};
use galley_core::pairing::{
    validate_batch_size, validate_comment, validate_dish_reference, validate_pairing_type,
    validate_rating,
};
use galley_core::rotation::{validate_day_of_week, validate_location, validate_week_nr, Meal};
use galley_core::types::DbId;
use galley_db::models::feedback::{CreatePairingRating, PairingScore, SubmitFeedback};
use galley_db::repositories::{
    clamp_limit, clamp_offset, PairingRatingRepo, PairingScoreRepo, RecipeRepo,
    RotationTemplateRepo,
};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::background::aggregation::AggregationTrigger;
use crate::error::{AppError, AppResult};
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// Pairings shown at each end of the dashboard ranking.
const RANKING_SIZE: i64 = 5;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub accepted: usize,
    pub unresolved: usize,
    pub aggregation_queued: bool,
}

#[derive(Debug, Deserialize)]
pub struct ScoreParams {
    pub pairing_type: Option<String>,
    pub min_count: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct ExplorationState {
    pub total_ratings: i64,
    pub base_epsilon: f64,
    pub epsilon: f64,
    pub cold_start: bool,
}

#[derive(Debug, Serialize)]
pub struct FeedbackStats {
    pub total_ratings: i64,
    pub ratings_last_7_days: i64,
    pub unresolved_ratings: i64,
    pub average_rating: Option<f64>,
    pub scored_pairings: i64,
    pub epsilon: f64,
    pub top_pairings: Vec<PairingScore>,
    pub bottom_pairings: Vec<PairingScore>,
}

#[derive(Debug, Serialize)]
pub struct AggregateResponse {
    pub queued: bool,
}

// ---------------------------------------------------------------------------
// Submission
// ---------------------------------------------------------------------------

/// Resolve one side of a pairing to `(recipe_id, dish_name)`.
///
/// A given id must exist; its name fills in a missing dish name. A bare name
/// is matched case-insensitively and stays unresolved when nothing matches.
async fn resolve_dish(
    pool: &PgPool,
    role: &str,
    recipe_id: Option<DbId>,
    name: Option<&str>,
) -> AppResult<(Option<DbId>, Option<String>)> {
    let name = name.map(str::trim).filter(|n| !n.is_empty());

    match recipe_id {
        Some(id) => {
            let recipe = RecipeRepo::find_by_id(pool, id).await?.ok_or_else(|| {
                AppError::Core(CoreError::Validation(format!(
                    "Unknown {role} recipe id {id}"
                )))
            })?;
            Ok((Some(id), Some(name.map(str::to_string).unwrap_or(recipe.name))))
        }
        None => {
            let Some(name) = name else {
                return Ok((None, None));
            };
            let id = RecipeRepo::find_id_by_name(pool, name).await?;
            Ok((id, Some(name.to_string())))
        }
    }
}

/// POST /api/v1/feedback
///
/// Record a batch of pairing ratings and queue a score recompute. The batch
/// is validated as a whole before anything is written.
pub async fn submit_feedback(
    State(state): State<AppState>,
    Json(input): Json<SubmitFeedback>,
) -> AppResult<impl IntoResponse> {
    validate_batch_size(input.ratings.len())?;
    validate_day_of_week(input.day_of_week)?;
    validate_location(&input.location_slug)?;
    let meal = Meal::parse(&input.meal).ok_or_else(|| {
        AppError::Core(CoreError::Validation(format!("Unknown meal '{}'", input.meal)))
    })?;

    if let Some(template_id) = input.template_id {
        let template = RotationTemplateRepo::find_by_id(&state.pool, template_id)
            .await?
            .ok_or(AppError::Core(CoreError::NotFound {
                entity: "RotationTemplate",
                id: template_id,
            }))?;
        let week_nr = input.week_nr.ok_or_else(|| {
            AppError::Core(CoreError::Validation(
                "week_nr is required when template_id is given".into(),
            ))
        })?;
        validate_week_nr(week_nr, template.week_count)?;
    }

    for (i, entry) in input.ratings.iter().enumerate() {
        let check = || -> Result<(), CoreError> {
            validate_pairing_type(&entry.pairing_type)?;
            validate_rating(entry.rating)?;
            validate_comment(entry.comment.as_deref())?;
            validate_dish_reference("main", entry.main_recipe_id, entry.main_name.as_deref())?;
            validate_dish_reference("side", entry.side_recipe_id, entry.side_name.as_deref())
        };
        check().map_err(|e| match e {
            CoreError::Validation(msg) => CoreError::Validation(format!("ratings[{i}]: {msg}")),
            other => other,
        })?;
    }

    let mut rows = Vec::with_capacity(input.ratings.len());
    for entry in &input.ratings {
        let (main_recipe_id, main_dish_name) =
            resolve_dish(&state.pool, "main", entry.main_recipe_id, entry.main_name.as_deref())
                .await?;
        let (side_recipe_id, side_dish_name) =
            resolve_dish(&state.pool, "side", entry.side_recipe_id, entry.side_name.as_deref())
                .await?;

        rows.push(CreatePairingRating {
            user_id: input.user_id,
            template_id: input.template_id,
            // Game-mode ratings are not tied to a rotation week.
            week_nr: input.template_id.and(input.week_nr),
            day_of_week: input.day_of_week,
            meal: meal.as_str().to_string(),
            location_slug: input.location_slug.clone(),
            main_recipe_id,
            side_recipe_id,
            main_dish_name,
            side_dish_name,
            pairing_type: entry.pairing_type.clone(),
            rating: entry.rating,
            comment: entry.comment.clone(),
        });
    }

    let created = PairingRatingRepo::insert_batch(&state.pool, &rows).await?;
    let unresolved = created
        .iter()
        .filter(|r| r.main_recipe_id.is_none() || r.side_recipe_id.is_none())
        .count();
    let aggregation_queued = state.aggregation.enqueue(AggregationTrigger::Submission);

    tracing::info!(
        accepted = created.len(),
        unresolved,
        template_id = ?input.template_id,
        "Pairing feedback recorded"
    );

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: SubmitResponse {
                accepted: created.len(),
                unresolved,
                aggregation_queued,
            },
        }),
    ))
}

// ---------------------------------------------------------------------------
// Reads
// ---------------------------------------------------------------------------

/// GET /api/v1/feedback?limit=&offset=
pub async fn list_feedback(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> AppResult<impl IntoResponse> {
    let ratings = PairingRatingRepo::list(
        &state.pool,
        clamp_limit(params.limit),
        clamp_offset(params.offset),
    )
    .await?;
    Ok(Json(DataResponse { data: ratings }))
}

/// GET /api/v1/feedback/scores?pairing_type=&min_count=
pub async fn list_scores(
    State(state): State<AppState>,
    Query(params): Query<ScoreParams>,
) -> AppResult<impl IntoResponse> {
    if let Some(pairing_type) = params.pairing_type.as_deref() {
        validate_pairing_type(pairing_type)?;
    }
    let min_count = params.min_count.unwrap_or(1).max(0);

    let scores =
        PairingScoreRepo::list(&state.pool, params.pairing_type.as_deref(), min_count).await?;
    Ok(Json(DataResponse { data: scores }))
}

/// GET /api/v1/feedback/stats
pub async fn get_stats(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let counters = PairingRatingRepo::counters(&state.pool).await?;
    let top_pairings = PairingScoreRepo::top(&state.pool, RANKING_SIZE).await?;
    let bottom_pairings = PairingScoreRepo::bottom(&state.pool, RANKING_SIZE).await?;

    let stats = FeedbackStats {
        epsilon: adaptive_epsilon(counters.total_ratings, state.config.base_epsilon),
        total_ratings: counters.total_ratings,
        ratings_last_7_days: counters.ratings_last_7_days,
        unresolved_ratings: counters.unresolved_ratings,
        average_rating: counters.average_rating,
        scored_pairings: counters.scored_pairings,
        top_pairings,
        bottom_pairings,
    };
    Ok(Json(DataResponse { data: stats }))
}

/// GET /api/v1/feedback/exploration
pub async fn get_exploration(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let total_ratings = PairingRatingRepo::count(&state.pool).await?;
    let base_epsilon = state.config.base_epsilon;

    Ok(Json(DataResponse {
        data: ExplorationState {
            total_ratings,
            base_epsilon,
            epsilon: adaptive_epsilon(total_ratings, base_epsilon),
            cold_start: total_ratings < COLD_START_RATINGS,
        },
    }))
}

/// POST /api/v1/feedback/aggregate
///
/// Queue a score recompute; returns before it runs.
pub async fn trigger_aggregation(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let queued = state.aggregation.enqueue(AggregationTrigger::Manual);
    Ok((
        StatusCode::ACCEPTED,
        Json(DataResponse {
            data: AggregateResponse { queued },
        }),
    ))
}
