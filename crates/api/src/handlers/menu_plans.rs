//! Handlers for dated menu plans.

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::rotation::materializer;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct WeekPlanParams {
    #[serde(default)]
    pub force: bool,
}

/// GET /api/v1/menu-plans/weeks/{year}/{week}?force=
///
/// Plans of an ISO week, generated from the active rotation on first access.
/// `force=true` regenerates them.
pub async fn get_week_plan(
    State(state): State<AppState>,
    Path((year, week)): Path<(i32, u32)>,
    Query(params): Query<WeekPlanParams>,
) -> AppResult<impl IntoResponse> {
    let plan = materializer::get_or_generate_week_plan(
        &state.pool,
        &state.locations,
        year,
        week,
        params.force,
        state.config.default_portions,
    )
    .await?;

    Ok(Json(DataResponse { data: plan }))
}
