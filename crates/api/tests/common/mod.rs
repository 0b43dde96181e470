#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use galley_db::models::recipe::CreateRecipe;
use galley_db::repositories::RecipeRepo;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use galley_api::background::aggregation::AggregationQueue;
use galley_api::config::{LogFormat, ServerConfig};
use galley_api::rotation::location::LocationResolver;
use galley_api::router::build_app_router;
use galley_api::rule_validator::RuleValidator;
use galley_api::state::AppState;

/// Test `ServerConfig` with development defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        default_portions: 0,
        base_epsilon: 0.1,
        rule_min_rating_count: 3,
        rule_validator: None,
        log_format: LogFormat::Text,
    }
}

/// Application router over `pool`, without a rule validator.
///
/// No aggregation worker runs; tests that need scores call
/// `galley_api::background::aggregation::aggregate` directly.
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with(pool, None)
}

pub fn build_test_app_with(pool: PgPool, validator: Option<Arc<dyn RuleValidator>>) -> Router {
    let config = test_config();
    let (aggregation, _worker) = AggregationQueue::new();

    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        locations: Arc::new(LocationResolver::new()),
        aggregation,
        rule_validator: validator,
    };

    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    app.oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn send_json(app: Router, method: Method, uri: &str, body: serde_json::Value) -> Response<Body> {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send_json(app, Method::POST, uri, body).await
}

pub async fn patch_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send_json(app, Method::PATCH, uri, body).await
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

pub async fn seed_recipe(pool: &PgPool, name: &str, category: &str) -> i64 {
    RecipeRepo::create(
        pool,
        &CreateRecipe {
            name: name.to_string(),
            category: category.to_string(),
        },
    )
    .await
    .unwrap()
    .id
}

/// Two recipes for every catalog category; enough for every course.
pub async fn seed_catalog(pool: &PgPool) {
    for category in [
        "ClearSoups",
        "CreamSoups",
        "MainMeat",
        "MainFish",
        "MainVegan",
        "Sides",
        "Salads",
        "HotDesserts",
        "ColdDesserts",
    ] {
        for n in 1..=2 {
            seed_recipe(pool, &format!("{category} {n}"), category).await;
        }
    }
}
