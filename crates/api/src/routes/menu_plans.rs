use axum::routing::get;
use axum::Router;

use crate::handlers::menu_plans;
use crate::state::AppState;

/// Mounted at `/menu-plans`.
pub fn router() -> Router<AppState> {
    Router::new().route("/weeks/{year}/{week}", get(menu_plans::get_week_plan))
}
