//! Handlers for learned pairing rules.
//!
//! Analysis derives candidates from aggregated scores and stores them as
//! `human` rules. Validation sends the same candidates to the external
//! reviewer and stores the approved ones as `ai` rules. Both fail soft: no
//! qualifying pattern, or an unavailable reviewer, yields an empty list and
//! a message instead of an error.

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use galley_core::error::CoreError;
use galley_core::rules::{
    analyze_patterns, validate_confidence, PatternAnalysis, RuleCandidate, RuleSource,
    ScoredPairing,
};
use galley_core::types::DbId;
use galley_db::models::learned_rule::{LearnedRule, UpdateLearnedRule, UpsertLearnedRule};
use galley_db::repositories::{LearnedRuleRepo, PairingScoreRepo};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::error::{AppError, AppResult};
use crate::query::IncludeInactiveParams;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct AnalyzeRequest {
    pub min_rating_count: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub rules: Vec<LearnedRule>,
    pub preferred: usize,
    pub forbidden: usize,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ValidateResponse {
    pub rules: Vec<LearnedRule>,
    pub candidates: usize,
    pub rejected: usize,
    pub message: String,
}

async fn run_analysis(pool: &PgPool, min_rating_count: i64) -> AppResult<PatternAnalysis> {
    let scores: Vec<ScoredPairing> = PairingScoreRepo::list(pool, None, min_rating_count)
        .await?
        .iter()
        .map(ScoredPairing::from)
        .collect();
    Ok(analyze_patterns(&scores, min_rating_count))
}

fn upsert_input(
    candidate: &RuleCandidate,
    source: RuleSource,
    confidence: f64,
    description: String,
) -> UpsertLearnedRule {
    UpsertLearnedRule {
        main_recipe_id: candidate.main_recipe_id,
        rule_type: candidate.rule_type.as_str().to_string(),
        target_recipe_name: candidate.target_recipe_name.clone(),
        confidence,
        source: source.as_str().to_string(),
        description,
    }
}

/// GET /api/v1/rules?include_inactive=
pub async fn list_rules(
    State(state): State<AppState>,
    Query(params): Query<IncludeInactiveParams>,
) -> AppResult<impl IntoResponse> {
    let rules = LearnedRuleRepo::list(&state.pool, params.include_inactive).await?;
    Ok(Json(DataResponse { data: rules }))
}

/// POST /api/v1/rules/analyze
///
/// Classify scored pairings and upsert the resulting rules. Re-running
/// refreshes confidence without duplicating rules.
pub async fn analyze_rules(
    State(state): State<AppState>,
    body: Option<Json<AnalyzeRequest>>,
) -> AppResult<impl IntoResponse> {
    let request = body.map(|Json(r)| r).unwrap_or_default();
    let min_rating_count = request
        .min_rating_count
        .unwrap_or(state.config.rule_min_rating_count)
        .max(1);

    let analysis = run_analysis(&state.pool, min_rating_count).await?;

    let mut rules = Vec::new();
    for candidate in analysis.candidates() {
        let input = upsert_input(
            candidate,
            RuleSource::Human,
            candidate.confidence,
            candidate.description.clone(),
        );
        rules.push(LearnedRuleRepo::upsert(&state.pool, &input).await?);
    }

    tracing::info!(
        min_rating_count,
        considered = analysis.considered,
        preferred = analysis.preferred.len(),
        forbidden = analysis.forbidden.len(),
        "Pairing pattern analysis complete"
    );

    Ok(Json(DataResponse {
        data: AnalyzeResponse {
            rules,
            preferred: analysis.preferred.len(),
            forbidden: analysis.forbidden.len(),
            message: analysis.message(min_rating_count),
        },
    }))
}

/// POST /api/v1/rules/validate
///
/// Send the current candidates to the external reviewer and store the
/// approved ones.
pub async fn validate_rules(
    State(state): State<AppState>,
    body: Option<Json<AnalyzeRequest>>,
) -> AppResult<impl IntoResponse> {
    let request = body.map(|Json(r)| r).unwrap_or_default();
    let min_rating_count = request
        .min_rating_count
        .unwrap_or(state.config.rule_min_rating_count)
        .max(1);

    let empty = |candidates: usize, message: String| ValidateResponse {
        rules: Vec::new(),
        candidates,
        rejected: 0,
        message,
    };

    let Some(validator) = state.rule_validator.as_ref() else {
        return Ok(Json(DataResponse {
            data: empty(0, "AI rule validation is not configured".to_string()),
        }));
    };

    let analysis = run_analysis(&state.pool, min_rating_count).await?;
    if analysis.is_empty() {
        return Ok(Json(DataResponse {
            data: empty(0, analysis.message(min_rating_count)),
        }));
    }

    let candidates: Vec<RuleCandidate> = analysis.candidates().cloned().collect();
    let verdicts = match validator.validate(&candidates).await {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!(error = %e, candidates = candidates.len(), "Rule validation failed");
            return Ok(Json(DataResponse {
                data: empty(candidates.len(), format!("AI rule validation unavailable: {e}")),
            }));
        }
    };

    let mut rules = Vec::new();
    let mut rejected = 0;
    for candidate in &candidates {
        let Some(verdict) = verdicts.iter().find(|v| v.matches(candidate)) else {
            rejected += 1;
            continue;
        };
        if !verdict.approved {
            rejected += 1;
            continue;
        }

        let confidence = verdict.confidence.unwrap_or(candidate.confidence);
        if let Err(e) = validate_confidence(confidence) {
            tracing::warn!(error = %e, main_recipe_id = candidate.main_recipe_id, "Ignoring verdict");
            rejected += 1;
            continue;
        }

        let description = verdict
            .reason
            .clone()
            .filter(|r| !r.trim().is_empty())
            .unwrap_or_else(|| candidate.description.clone());
        let input = upsert_input(candidate, RuleSource::Ai, confidence, description);
        rules.push(LearnedRuleRepo::upsert(&state.pool, &input).await?);
    }

    tracing::info!(
        candidates = candidates.len(),
        approved = rules.len(),
        rejected,
        "AI rule validation complete"
    );

    let message = format!(
        "{} of {} candidate rules approved",
        rules.len(),
        candidates.len()
    );
    Ok(Json(DataResponse {
        data: ValidateResponse {
            rules,
            candidates: candidates.len(),
            rejected,
            message,
        },
    }))
}

/// PATCH /api/v1/rules/{id}
pub async fn update_rule(
    State(state): State<AppState>,
    Path(rule_id): Path<DbId>,
    Json(input): Json<UpdateLearnedRule>,
) -> AppResult<impl IntoResponse> {
    let rule = LearnedRuleRepo::set_active(&state.pool, rule_id, input.is_active)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "LearnedRule",
            id: rule_id,
        }))?;

    tracing::info!(rule_id, is_active = input.is_active, "Learned rule toggled");
    Ok(Json(DataResponse { data: rule }))
}
