//! Feedback routes mounted at `/feedback`.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::feedback;
use crate::state::AppState;

/// ```text
/// POST   /              -> submit_feedback
/// GET    /              -> list_feedback
/// GET    /scores        -> list_scores
/// GET    /stats         -> get_stats
/// GET    /exploration   -> get_exploration
/// POST   /aggregate     -> trigger_aggregation
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(feedback::list_feedback).post(feedback::submit_feedback),
        )
        .route("/scores", get(feedback::list_scores))
        .route("/stats", get(feedback::get_stats))
        .route("/exploration", get(feedback::get_exploration))
        .route("/aggregate", post(feedback::trigger_aggregation))
}
