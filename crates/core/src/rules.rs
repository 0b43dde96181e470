//! Pairing rule learning.
//!
//! Aggregated pairing scores with enough ratings are sorted into
//! `preferred` and `forbidden` buckets. The resulting rules are advisory:
//! they are stored for human review and toggled by hand, and the auto-fill
//! planner does not read them.

use crate::error::CoreError;
use crate::scoring::{evidence_weight, NEUTRAL_PRIOR};
use crate::types::DbId;

/// Average score at or above which a pairing is preferred.
pub const PREFERRED_THRESHOLD: f64 = 4.0;

/// Average score at or below which a pairing is forbidden.
pub const FORBIDDEN_THRESHOLD: f64 = 2.0;

/// Minimum ratings before a pairing takes part in analysis.
pub const DEFAULT_MIN_RATING_COUNT: i64 = 3;

// ---------------------------------------------------------------------------
// RuleType / RuleSource
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleType {
    Preferred,
    Forbidden,
}

impl RuleType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleType::Preferred => "preferred",
            RuleType::Forbidden => "forbidden",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleSource {
    Human,
    Ai,
}

impl RuleSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleSource::Human => "human",
            RuleSource::Ai => "ai",
        }
    }
}

// ---------------------------------------------------------------------------
// Analysis
// ---------------------------------------------------------------------------

/// An aggregated pairing score joined with dish names.
#[derive(Debug, Clone)]
pub struct ScoredPairing {
    pub main_recipe_id: DbId,
    pub main_name: String,
    pub side_recipe_id: DbId,
    pub side_name: String,
    pub pairing_type: String,
    pub avg_score: f64,
    pub weighted_score: f64,
    pub rating_count: i64,
}

/// A rule proposed by pattern analysis, not yet persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleCandidate {
    pub main_recipe_id: DbId,
    pub rule_type: RuleType,
    pub target_recipe_name: String,
    pub confidence: f64,
    pub description: String,
}

/// Result of [`analyze_patterns`].
#[derive(Debug, Clone, Default)]
pub struct PatternAnalysis {
    pub preferred: Vec<RuleCandidate>,
    pub forbidden: Vec<RuleCandidate>,
    /// Pairings that met the rating-count threshold.
    pub considered: usize,
}

impl PatternAnalysis {
    pub fn is_empty(&self) -> bool {
        self.preferred.is_empty() && self.forbidden.is_empty()
    }

    pub fn candidates(&self) -> impl Iterator<Item = &RuleCandidate> {
        self.preferred.iter().chain(self.forbidden.iter())
    }

    /// Human-readable summary, also used when nothing qualified.
    pub fn message(&self, min_rating_count: i64) -> String {
        if self.considered == 0 {
            format!("No pairing has at least {min_rating_count} ratings yet")
        } else if self.is_empty() {
            format!(
                "{} pairings analysed, none clearly preferred or forbidden",
                self.considered
            )
        } else {
            format!(
                "{} preferred and {} forbidden pairings found among {} analysed",
                self.preferred.len(),
                self.forbidden.len(),
                self.considered
            )
        }
    }
}

/// Confidence in a rule: how far the average sits from neutral, scaled by
/// how much of the shrunk estimate comes from real ratings.
pub fn rule_confidence(avg_score: f64, rating_count: i64) -> f64 {
    let strength = ((avg_score - NEUTRAL_PRIOR).abs() / 2.0).clamp(0.0, 1.0);
    strength * evidence_weight(rating_count)
}

/// Classify scored pairings into preferred and forbidden rule candidates.
///
/// Pairings with fewer than `min_rating_count` ratings are ignored. Each
/// bucket is ordered by descending confidence.
pub fn analyze_patterns(scores: &[ScoredPairing], min_rating_count: i64) -> PatternAnalysis {
    let mut analysis = PatternAnalysis::default();

    for score in scores.iter().filter(|s| s.rating_count >= min_rating_count) {
        analysis.considered += 1;

        let rule_type = if score.avg_score >= PREFERRED_THRESHOLD {
            RuleType::Preferred
        } else if score.avg_score <= FORBIDDEN_THRESHOLD {
            RuleType::Forbidden
        } else {
            continue;
        };

        let description = match rule_type {
            RuleType::Preferred => format!(
                "{} pairs well with {} ({}: avg {:.2} over {} ratings)",
                score.main_name, score.side_name, score.pairing_type, score.avg_score, score.rating_count
            ),
            RuleType::Forbidden => format!(
                "Avoid serving {} with {} ({}: avg {:.2} over {} ratings)",
                score.main_name, score.side_name, score.pairing_type, score.avg_score, score.rating_count
            ),
        };

        let candidate = RuleCandidate {
            main_recipe_id: score.main_recipe_id,
            rule_type,
            target_recipe_name: score.side_name.clone(),
            confidence: rule_confidence(score.avg_score, score.rating_count),
            description,
        };

        match rule_type {
            RuleType::Preferred => analysis.preferred.push(candidate),
            RuleType::Forbidden => analysis.forbidden.push(candidate),
        }
    }

    let by_confidence = |a: &RuleCandidate, b: &RuleCandidate| b.confidence.total_cmp(&a.confidence);
    analysis.preferred.sort_by(by_confidence);
    analysis.forbidden.sort_by(by_confidence);
    analysis
}

/// Validate a confidence value supplied from outside (e.g. an AI verdict).
pub fn validate_confidence(confidence: f64) -> Result<(), CoreError> {
    if !(0.0..=1.0).contains(&confidence) {
        return Err(CoreError::Validation(format!(
            "confidence must be between 0.0 and 1.0, got {confidence}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scored(main: DbId, side: &str, avg: f64, count: i64) -> ScoredPairing {
        ScoredPairing {
            main_recipe_id: main,
            main_name: format!("Main {main}"),
            side_recipe_id: 100,
            side_name: side.to_string(),
            pairing_type: "main_starch".into(),
            avg_score: avg,
            weighted_score: avg,
            rating_count: count,
        }
    }

    #[test]
    fn thresholds_are_inclusive() {
        let analysis = analyze_patterns(
            &[scored(1, "Rice", 4.0, 3), scored(2, "Fries", 2.0, 3)],
            3,
        );
        assert_eq!(analysis.preferred.len(), 1);
        assert_eq!(analysis.forbidden.len(), 1);
        assert_eq!(analysis.preferred[0].target_recipe_name, "Rice");
        assert_eq!(analysis.forbidden[0].rule_type, RuleType::Forbidden);
    }

    #[test]
    fn middling_scores_produce_no_rule() {
        let analysis = analyze_patterns(&[scored(1, "Rice", 3.2, 10)], 3);
        assert!(analysis.is_empty());
        assert_eq!(analysis.considered, 1);
        assert!(analysis.message(3).contains("none clearly"));
    }

    #[test]
    fn sparse_pairings_are_ignored() {
        let analysis = analyze_patterns(&[scored(1, "Rice", 5.0, 2)], 3);
        assert!(analysis.is_empty());
        assert_eq!(analysis.considered, 0);
        assert!(analysis.message(3).contains("at least 3"));
    }

    #[test]
    fn stronger_evidence_sorts_first() {
        let analysis = analyze_patterns(
            &[scored(1, "Rice", 4.5, 3), scored(2, "Noodles", 4.5, 30)],
            3,
        );
        assert_eq!(analysis.preferred[0].main_recipe_id, 2);
    }

    #[test]
    fn confidence_is_a_unit_value() {
        for (avg, count) in [(5.0, 1000), (1.0, 1), (4.0, 3), (3.0, 50)] {
            let c = rule_confidence(avg, count);
            assert!(validate_confidence(c).is_ok(), "{c}");
        }
        assert_eq!(rule_confidence(3.0, 50), 0.0);
    }

    #[test]
    fn out_of_range_confidence_is_rejected() {
        assert!(validate_confidence(1.2).is_err());
        assert!(validate_confidence(-0.1).is_err());
    }
}
