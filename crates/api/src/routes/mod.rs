pub mod feedback;
pub mod health;
pub mod menu_plans;
pub mod rotation;
pub mod rules;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /rotation/template                                  ensure + fetch active template
/// /rotation/templates/{id}/slots                      list, create
/// /rotation/templates/{id}/auto-fill                  fill empty slots (POST)
/// /rotation/templates/{id}/weeks/{week_nr}/generate   materialize a week (POST)
/// /rotation/templates/{id}/pairings                   rateable pairings
/// /rotation/slots/{id}                                set/clear recipe (PATCH)
///
/// /menu-plans/weeks/{year}/{week}                     get-or-generate week plan
///
/// /feedback                                           submit (POST), list
/// /feedback/scores                                    aggregated scores
/// /feedback/stats                                     dashboard statistics
/// /feedback/exploration                               adaptive epsilon
/// /feedback/aggregate                                 queue recompute (POST)
///
/// /rules                                              list
/// /rules/analyze                                      derive rules (POST)
/// /rules/validate                                     AI review (POST)
/// /rules/{id}                                         toggle (PATCH)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/rotation", rotation::router())
        .nest("/menu-plans", menu_plans::router())
        .nest("/feedback", feedback::router())
        .nest("/rules", rules::router())
}
