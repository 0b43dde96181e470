//! Pairing feedback models: raw ratings, derived scores, dashboard stats.

use galley_core::rules::ScoredPairing;
use galley_core::scoring::RatingTally;
use galley_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `pairing_ratings` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PairingRating {
    pub id: DbId,
    pub user_id: Option<DbId>,
    pub template_id: Option<DbId>,
    pub week_nr: Option<i32>,
    pub day_of_week: i16,
    pub meal: String,
    pub location_slug: String,
    pub main_recipe_id: Option<DbId>,
    pub side_recipe_id: Option<DbId>,
    pub main_dish_name: Option<String>,
    pub side_dish_name: Option<String>,
    pub pairing_type: String,
    pub rating: i16,
    pub comment: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Request body for a rating submission.
///
/// A submission without `template_id` is a game-mode submission: dishes are
/// identified by name and resolved case-insensitively.
#[derive(Debug, Clone, Deserialize)]
pub struct SubmitFeedback {
    pub user_id: Option<DbId>,
    pub template_id: Option<DbId>,
    pub week_nr: Option<i32>,
    pub day_of_week: i16,
    pub meal: String,
    pub location_slug: String,
    pub ratings: Vec<RatingEntry>,
}

/// One rated pairing inside a [`SubmitFeedback`] batch.
#[derive(Debug, Clone, Deserialize)]
pub struct RatingEntry {
    pub main_recipe_id: Option<DbId>,
    pub side_recipe_id: Option<DbId>,
    pub main_name: Option<String>,
    pub side_name: Option<String>,
    pub pairing_type: String,
    pub rating: i16,
    pub comment: Option<String>,
}

/// Fully validated, id-resolved rating ready for insertion.
#[derive(Debug, Clone)]
pub struct CreatePairingRating {
    pub user_id: Option<DbId>,
    pub template_id: Option<DbId>,
    pub week_nr: Option<i32>,
    pub day_of_week: i16,
    pub meal: String,
    pub location_slug: String,
    pub main_recipe_id: Option<DbId>,
    pub side_recipe_id: Option<DbId>,
    pub main_dish_name: Option<String>,
    pub side_dish_name: Option<String>,
    pub pairing_type: String,
    pub rating: i16,
    pub comment: Option<String>,
}

/// Per-pairing rating totals, summed in SQL.
#[derive(Debug, Clone, FromRow)]
pub struct RatingTallyRow {
    pub main_recipe_id: DbId,
    pub side_recipe_id: DbId,
    pub pairing_type: String,
    pub rating_sum: i64,
    pub rating_count: i64,
}

impl From<RatingTallyRow> for RatingTally {
    fn from(r: RatingTallyRow) -> Self {
        RatingTally {
            main_recipe_id: r.main_recipe_id,
            side_recipe_id: r.side_recipe_id,
            pairing_type: r.pairing_type,
            rating_sum: r.rating_sum,
            rating_count: r.rating_count,
        }
    }
}

/// A row from `pairing_scores`, joined with both dish names.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct PairingScore {
    pub main_recipe_id: DbId,
    pub main_name: String,
    pub side_recipe_id: DbId,
    pub side_name: String,
    pub pairing_type: String,
    pub avg_score: f64,
    pub weighted_score: f64,
    pub rating_count: i64,
    pub last_updated: Timestamp,
}

impl From<&PairingScore> for ScoredPairing {
    fn from(s: &PairingScore) -> Self {
        ScoredPairing {
            main_recipe_id: s.main_recipe_id,
            main_name: s.main_name.clone(),
            side_recipe_id: s.side_recipe_id,
            side_name: s.side_name.clone(),
            pairing_type: s.pairing_type.clone(),
            avg_score: s.avg_score,
            weighted_score: s.weighted_score,
            rating_count: s.rating_count,
        }
    }
}

/// Aggregate counters for the feedback dashboard.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct FeedbackCounters {
    pub total_ratings: i64,
    pub ratings_last_7_days: i64,
    pub unresolved_ratings: i64,
    pub average_rating: Option<f64>,
    pub scored_pairings: i64,
}
