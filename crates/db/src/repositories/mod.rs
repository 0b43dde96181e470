//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument.

pub mod learned_rule_repo;
pub mod location_repo;
pub mod menu_plan_repo;
pub mod pairing_rating_repo;
pub mod pairing_score_repo;
pub mod recipe_repo;
pub mod rotation_slot_repo;
pub mod rotation_template_repo;

pub use learned_rule_repo::LearnedRuleRepo;
pub use location_repo::LocationRepo;
pub use menu_plan_repo::MenuPlanRepo;
pub use pairing_rating_repo::PairingRatingRepo;
pub use pairing_score_repo::PairingScoreRepo;
pub use recipe_repo::RecipeRepo;
pub use rotation_slot_repo::RotationSlotRepo;
pub use rotation_template_repo::RotationTemplateRepo;

/// Default page size for list endpoints.
pub const DEFAULT_LIMIT: i64 = 50;

/// Upper bound on any requested page size.
pub const MAX_LIMIT: i64 = 500;

/// Clamp a requested page size into `1..=MAX_LIMIT`.
pub fn clamp_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
}

/// Clamp a requested offset to be non-negative.
pub fn clamp_offset(offset: Option<i64>) -> i64 {
    offset.unwrap_or(0).max(0)
}
