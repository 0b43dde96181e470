//! Learned rule routes mounted at `/rules`.

use axum::routing::{get, patch, post};
use axum::Router;

use crate::handlers::rules;
use crate::state::AppState;

/// ```text
/// GET    /           -> list_rules
/// POST   /analyze    -> analyze_rules
/// POST   /validate   -> validate_rules
/// PATCH  /{id}       -> update_rule
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(rules::list_rules))
        .route("/analyze", post(rules::analyze_rules))
        .route("/validate", post(rules::validate_rules))
        .route("/{id}", patch(rules::update_rule))
}
