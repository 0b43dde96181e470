//! Learned rule analysis, AI validation and toggling.

mod common;

use std::sync::Arc;

use async_trait::async_trait;
use axum::http::StatusCode;
use common::{body_json, get, patch_json, post_json, seed_recipe};
use galley_api::background::aggregation::aggregate;
use galley_api::rule_validator::{RuleValidator, RuleValidatorError, RuleVerdict};
use galley_core::rules::{RuleCandidate, RuleType};
use serde_json::{json, Value};
use sqlx::PgPool;

/// Approves preferred rules and rejects forbidden ones.
struct PreferOnly;

#[async_trait]
impl RuleValidator for PreferOnly {
    async fn validate(
        &self,
        candidates: &[RuleCandidate],
    ) -> Result<Vec<RuleVerdict>, RuleValidatorError> {
        Ok(candidates
            .iter()
            .map(|c| RuleVerdict {
                main_recipe_id: c.main_recipe_id,
                rule_type: c.rule_type.as_str().to_string(),
                target_recipe_name: c.target_recipe_name.to_uppercase(),
                approved: c.rule_type == RuleType::Preferred,
                confidence: Some(0.9),
                reason: Some("Classic combination".to_string()),
            })
            .collect())
    }
}

struct Unavailable;

#[async_trait]
impl RuleValidator for Unavailable {
    async fn validate(
        &self,
        _candidates: &[RuleCandidate],
    ) -> Result<Vec<RuleVerdict>, RuleValidatorError> {
        Err(RuleValidatorError::HttpStatus(503))
    }
}

/// Three 5-star Goulash/Rice and three 1-star Goulash/Fries ratings, scored.
async fn seed_scored_pairings(pool: &PgPool) {
    seed_recipe(pool, "Goulash", "MainMeat").await;
    seed_recipe(pool, "Rice", "Sides").await;
    seed_recipe(pool, "Fries", "Sides").await;

    let entry = |side: &str, rating: i16| {
        json!({ "main_name": "Goulash", "side_name": side, "pairing_type": "main_starch", "rating": rating })
    };
    let response = post_json(
        common::build_test_app(pool.clone()),
        "/api/v1/feedback",
        json!({
            "day_of_week": 2,
            "meal": "dinner",
            "location_slug": "campus",
            "ratings": [
                entry("Rice", 5), entry("Rice", 5), entry("Rice", 5),
                entry("Fries", 1), entry("Fries", 1), entry("Fries", 1),
            ],
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    aggregate(pool).await.unwrap();
}

async fn analyze(pool: &PgPool, body: Value) -> Value {
    let response = post_json(common::build_test_app(pool.clone()), "/api/v1/rules/analyze", body).await;
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await["data"].clone()
}

async fn list_rules(pool: &PgPool, uri: &str) -> Vec<Value> {
    body_json(get(common::build_test_app(pool.clone()), uri).await).await["data"]
        .as_array()
        .unwrap()
        .clone()
}

// ---------------------------------------------------------------------------
// Analysis
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn analysis_without_data_reports_why(pool: PgPool) {
    let data = analyze(&pool, json!({})).await;
    assert!(data["rules"].as_array().unwrap().is_empty());
    assert_eq!(data["message"], "No pairing has at least 3 ratings yet");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn analysis_derives_rules_idempotently(pool: PgPool) {
    seed_scored_pairings(&pool).await;

    let data = analyze(&pool, json!({})).await;
    assert_eq!(data["preferred"], 1);
    assert_eq!(data["forbidden"], 1);
    let rules = data["rules"].as_array().unwrap();
    assert_eq!(rules.len(), 2);
    assert!(rules.iter().all(|r| r["source"] == "human" && r["is_active"] == true));
    assert_eq!(rules[0]["rule_type"], "preferred");
    assert_eq!(rules[0]["target_recipe_name"], "Rice");
    assert_eq!(rules[1]["target_recipe_name"], "Fries");

    analyze(&pool, json!({})).await;
    assert_eq!(list_rules(&pool, "/api/v1/rules").await.len(), 2);

    let strict = analyze(&pool, json!({ "min_rating_count": 4 })).await;
    assert!(strict["rules"].as_array().unwrap().is_empty());
}

// ---------------------------------------------------------------------------
// AI validation
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn validation_without_validator_is_a_no_op(pool: PgPool) {
    seed_scored_pairings(&pool).await;

    let response = post_json(common::build_test_app(pool.clone()), "/api/v1/rules/validate", json!({})).await;
    assert_eq!(response.status(), StatusCode::OK);
    let data = body_json(response).await["data"].clone();
    assert_eq!(data["message"], "AI rule validation is not configured");
    assert!(list_rules(&pool, "/api/v1/rules").await.is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn approved_candidates_become_ai_rules(pool: PgPool) {
    seed_scored_pairings(&pool).await;

    let app = common::build_test_app_with(pool.clone(), Some(Arc::new(PreferOnly)));
    let response = post_json(app, "/api/v1/rules/validate", json!({})).await;
    assert_eq!(response.status(), StatusCode::OK);

    let data = body_json(response).await["data"].clone();
    assert_eq!(data["candidates"], 2);
    assert_eq!(data["rejected"], 1);
    let rules = data["rules"].as_array().unwrap();
    assert_eq!(rules.len(), 1);
    assert_eq!(rules[0]["source"], "ai");
    assert_eq!(rules[0]["confidence"], 0.9);
    assert_eq!(rules[0]["description"], "Classic combination");
    assert_eq!(rules[0]["target_recipe_name"], "Rice");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn unavailable_validator_fails_soft(pool: PgPool) {
    seed_scored_pairings(&pool).await;

    let app = common::build_test_app_with(pool.clone(), Some(Arc::new(Unavailable)));
    let response = post_json(app, "/api/v1/rules/validate", json!({})).await;
    assert_eq!(response.status(), StatusCode::OK);

    let data = body_json(response).await["data"].clone();
    assert_eq!(data["candidates"], 2);
    assert!(data["rules"].as_array().unwrap().is_empty());
    assert!(data["message"]
        .as_str()
        .unwrap()
        .starts_with("AI rule validation unavailable"));
}

// ---------------------------------------------------------------------------
// Toggle
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn deactivated_rules_are_hidden_by_default(pool: PgPool) {
    seed_scored_pairings(&pool).await;
    let rules = analyze(&pool, json!({})).await["rules"].clone();
    let id = rules[1]["id"].as_i64().unwrap();

    let response = patch_json(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/rules/{id}"),
        json!({ "is_active": false }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["is_active"], false);

    assert_eq!(list_rules(&pool, "/api/v1/rules").await.len(), 1);
    assert_eq!(list_rules(&pool, "/api/v1/rules?include_inactive=true").await.len(), 2);

    // Re-analysis refreshes the rule but keeps it switched off.
    analyze(&pool, json!({})).await;
    assert_eq!(list_rules(&pool, "/api/v1/rules").await.len(), 1);

    let missing = patch_json(
        common::build_test_app(pool),
        "/api/v1/rules/999999",
        json!({ "is_active": true }),
    )
    .await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}
