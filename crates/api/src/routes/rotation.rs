//! Rotation routes mounted at `/rotation`.

use axum::routing::{get, patch, post};
use axum::Router;

use crate::handlers::rotation;
use crate::state::AppState;

/// ```text
/// GET    /template                                 -> get_template
/// GET    /templates/{id}/slots                     -> list_slots
/// POST   /templates/{id}/slots                     -> create_slot
/// POST   /templates/{id}/auto-fill                 -> run_auto_fill
/// POST   /templates/{id}/weeks/{week_nr}/generate  -> generate_week
/// GET    /templates/{id}/pairings                  -> list_pairings
/// PATCH  /slots/{id}                               -> update_slot
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/template", get(rotation::get_template))
        .route(
            "/templates/{id}/slots",
            get(rotation::list_slots).post(rotation::create_slot),
        )
        .route("/templates/{id}/auto-fill", post(rotation::run_auto_fill))
        .route(
            "/templates/{id}/weeks/{week_nr}/generate",
            post(rotation::generate_week),
        )
        .route("/templates/{id}/pairings", get(rotation::list_pairings))
        .route("/slots/{id}", patch(rotation::update_slot))
}
