//! Adaptive exploration rate for pairing selection.
//!
//! The rate is consumed by whatever decides which pairing to surface next;
//! nothing here samples.

/// Exploration rate used while feedback is too sparse to trust.
pub const MAX_EPSILON: f64 = 0.5;

/// Number of ratings below which exploration stays at [`MAX_EPSILON`].
pub const COLD_START_RATINGS: i64 = 50;

/// Exponential decay rate per rating beyond the cold start.
pub const DECAY_RATE: f64 = 0.01;

/// Default floor the rate decays toward.
pub const DEFAULT_BASE_EPSILON: f64 = 0.1;

/// Exploration probability for the current rating volume.
///
/// `0.5` during cold start (`total_ratings < 50`), then
/// `base + (0.5 - base) * e^(-0.01 * (total_ratings - 50))`, decaying
/// monotonically toward `base_epsilon`.
pub fn adaptive_epsilon(total_ratings: i64, base_epsilon: f64) -> f64 {
    if total_ratings < COLD_START_RATINGS {
        return MAX_EPSILON;
    }
    let excess = (total_ratings - COLD_START_RATINGS) as f64;
    base_epsilon + (MAX_EPSILON - base_epsilon) * (-DECAY_RATE * excess).exp()
}
