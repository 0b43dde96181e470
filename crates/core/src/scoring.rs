//! Pairing score aggregation with shrinkage toward a neutral prior.
//!
//! `weighted_score` is a Bayesian average: the observed ratings are blended
//! with [`PRIOR_PSEUDO_COUNT`] imaginary ratings of [`NEUTRAL_PRIOR`].
//! Sparse pairings stay close to the prior; well-rated pairings converge to
//! their raw average.

use crate::types::DbId;

/// Neutral midpoint of the 1..=5 rating scale.
pub const NEUTRAL_PRIOR: f64 = 3.0;

/// Weight of the prior, expressed as a number of virtual ratings.
///
/// Must exceed 1 so that a single rating stays closer to the prior than to
/// its own value.
pub const PRIOR_PSEUDO_COUNT: f64 = 5.0;

/// Shrunk estimate of a pairing's quality.
///
/// Returns [`NEUTRAL_PRIOR`] when there are no ratings.
pub fn weighted_score(avg_score: f64, rating_count: i64) -> f64 {
    if rating_count <= 0 {
        return NEUTRAL_PRIOR;
    }
    let n = rating_count as f64;
    (PRIOR_PSEUDO_COUNT * NEUTRAL_PRIOR + n * avg_score) / (PRIOR_PSEUDO_COUNT + n)
}

/// Share of the estimate carried by observed data, in `[0, 1)`.
pub fn evidence_weight(rating_count: i64) -> f64 {
    if rating_count <= 0 {
        return 0.0;
    }
    let n = rating_count as f64;
    n / (n + PRIOR_PSEUDO_COUNT)
}

/// Rating totals for one (main, side, pairing type), as summed by the store.
#[derive(Debug, Clone)]
pub struct RatingTally {
    pub main_recipe_id: DbId,
    pub side_recipe_id: DbId,
    pub pairing_type: String,
    pub rating_sum: i64,
    pub rating_count: i64,
}

/// Aggregated score for one (main, side, pairing type).
#[derive(Debug, Clone, PartialEq)]
pub struct PairingAggregate {
    pub main_recipe_id: DbId,
    pub side_recipe_id: DbId,
    pub pairing_type: String,
    pub avg_score: f64,
    pub weighted_score: f64,
    pub rating_count: i64,
}

/// Turn rating tallies into scored aggregates.
///
/// Tallies with no ratings are dropped. Output is ordered by main, side, type
/// so a rebuild from the same ratings always produces the same rows.
pub fn score_tallies(tallies: &[RatingTally]) -> Vec<PairingAggregate> {
    let mut scored: Vec<PairingAggregate> = tallies
        .iter()
        .filter(|t| t.rating_count > 0)
        .map(|t| {
            let avg_score = t.rating_sum as f64 / t.rating_count as f64;
            PairingAggregate {
                main_recipe_id: t.main_recipe_id,
                side_recipe_id: t.side_recipe_id,
                pairing_type: t.pairing_type.clone(),
                avg_score,
                weighted_score: weighted_score(avg_score, t.rating_count),
                rating_count: t.rating_count,
            }
        })
        .collect();
    scored.sort_by(|a, b| {
        (a.main_recipe_id, a.side_recipe_id, &a.pairing_type)
            .cmp(&(b.main_recipe_id, b.side_recipe_id, &b.pairing_type))
    });
    scored
}
