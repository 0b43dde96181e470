//! Integration tests for ratings, score rebuilds and learned rules.

use galley_db::models::feedback::CreatePairingRating;
use galley_db::models::learned_rule::UpsertLearnedRule;
use galley_db::models::recipe::CreateRecipe;
use galley_db::repositories::{LearnedRuleRepo, PairingRatingRepo, PairingScoreRepo, RecipeRepo};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn new_recipe(pool: &PgPool, name: &str, category: &str) -> i64 {
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

fn rating(main: Option<i64>, side: Option<i64>, value: i16) -> CreatePairingRating {
    CreatePairingRating {
        user_id: None,
        template_id: None,
        week_nr: None,
        day_of_week: 2,
        meal: "lunch".to_string(),
        location_slug: "city".to_string(),
        main_recipe_id: main,
        side_recipe_id: side,
        main_dish_name: None,
        side_dish_name: None,
        pairing_type: "main_starch".to_string(),
        rating: value,
        comment: None,
    }
}

// ---------------------------------------------------------------------------
// Ratings
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn batch_insert_is_all_or_nothing(pool: PgPool) {
    let main = new_recipe(&pool, "Schnitzel", "MainMeat").await;
    let side = new_recipe(&pool, "Fries", "Starch").await;

    let ok = PairingRatingRepo::insert_batch(
        &pool,
        &[rating(Some(main), Some(side), 4), rating(Some(main), Some(side), 5)],
    )
    .await
    .unwrap();
    assert_eq!(ok.len(), 2);

    // The second row violates the rating CHECK, so the first must roll back.
    let err = PairingRatingRepo::insert_batch(
        &pool,
        &[rating(Some(main), Some(side), 3), rating(Some(main), Some(side), 9)],
    )
    .await;
    assert!(err.is_err());
    assert_eq!(PairingRatingRepo::count(&pool).await.unwrap(), 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn list_is_newest_first_and_paged(pool: PgPool) {
    let main = new_recipe(&pool, "Schnitzel", "MainMeat").await;
    let side = new_recipe(&pool, "Fries", "Starch").await;
    for value in 1..=5 {
        PairingRatingRepo::insert_batch(&pool, &[rating(Some(main), Some(side), value)])
            .await
            .unwrap();
    }

    let page = PairingRatingRepo::list(&pool, 2, 0).await.unwrap();
    assert_eq!(page.len(), 2);
    assert_eq!(page[0].rating, 5);

    let rest = PairingRatingRepo::list(&pool, 10, 2).await.unwrap();
    assert_eq!(rest.len(), 3);
    assert_eq!(rest[2].rating, 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn unresolved_names_are_resolved_once_recipes_exist(pool: PgPool) {
    let side = new_recipe(&pool, "Rice", "Starch").await;
    let mut entry = rating(None, Some(side), 5);
    entry.main_dish_name = Some("Chicken Curry".to_string());
    PairingRatingRepo::insert_batch(&pool, &[entry]).await.unwrap();

    assert_eq!(PairingRatingRepo::resolve_names(&pool).await.unwrap(), 0);
    let counters = PairingRatingRepo::counters(&pool).await.unwrap();
    assert_eq!(counters.unresolved_ratings, 1);

    let main = new_recipe(&pool, "chicken curry", "MainMeat").await;
    assert_eq!(PairingRatingRepo::resolve_names(&pool).await.unwrap(), 1);

    let stored = PairingRatingRepo::list(&pool, 1, 0).await.unwrap();
    assert_eq!(stored[0].main_recipe_id, Some(main));
    let counters = PairingRatingRepo::counters(&pool).await.unwrap();
    assert_eq!(counters.unresolved_ratings, 0);
}

// ---------------------------------------------------------------------------
// Scores
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn rebuild_scores_resolved_ratings_only(pool: PgPool) {
    let main = new_recipe(&pool, "Schnitzel", "MainMeat").await;
    let fries = new_recipe(&pool, "Fries", "Starch").await;
    let rice = new_recipe(&pool, "Rice", "Starch").await;

    PairingRatingRepo::insert_batch(
        &pool,
        &[
            rating(Some(main), Some(fries), 5),
            rating(Some(main), Some(fries), 5),
            rating(Some(main), Some(fries), 4),
            rating(Some(main), Some(rice), 1),
            rating(Some(main), None, 3),
        ],
    )
    .await
    .unwrap();

    assert_eq!(PairingScoreRepo::rebuild(&pool).await.unwrap(), 2);

    let scores = PairingScoreRepo::list(&pool, None, 0).await.unwrap();
    assert_eq!(scores.len(), 2);
    assert_eq!(scores[0].side_name, "Fries");
    assert_eq!(scores[0].rating_count, 3);
    assert!((scores[0].avg_score - 14.0 / 3.0).abs() < 1e-9);
    assert!(scores[0].weighted_score < scores[0].avg_score);
    assert!(scores[1].weighted_score > 1.0);

    let frequent = PairingScoreRepo::list(&pool, Some("main_starch"), 2).await.unwrap();
    assert_eq!(frequent.len(), 1);
    assert!(PairingScoreRepo::list(&pool, Some("main_veggie"), 0)
        .await
        .unwrap()
        .is_empty());

    let bottom = PairingScoreRepo::bottom(&pool, 1).await.unwrap();
    assert_eq!(bottom[0].side_recipe_id, rice);
    let top = PairingScoreRepo::top(&pool, 1).await.unwrap();
    assert_eq!(top[0].side_recipe_id, fries);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn rebuild_is_idempotent(pool: PgPool) {
    let main = new_recipe(&pool, "Schnitzel", "MainMeat").await;
    let side = new_recipe(&pool, "Fries", "Starch").await;
    PairingRatingRepo::insert_batch(&pool, &[rating(Some(main), Some(side), 4)])
        .await
        .unwrap();

    PairingScoreRepo::rebuild(&pool).await.unwrap();
    let first = PairingScoreRepo::list(&pool, None, 0).await.unwrap();
    PairingScoreRepo::rebuild(&pool).await.unwrap();
    let second = PairingScoreRepo::list(&pool, None, 0).await.unwrap();

    assert_eq!(first.len(), second.len());
    assert_eq!(first[0].weighted_score, second[0].weighted_score);
    assert_eq!(PairingRatingRepo::counters(&pool).await.unwrap().scored_pairings, 1);
}

// ---------------------------------------------------------------------------
// Learned rules
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn upsert_refreshes_but_keeps_activation(pool: PgPool) {
    let main = new_recipe(&pool, "Schnitzel", "MainMeat").await;
    let mut input = UpsertLearnedRule {
        main_recipe_id: main,
        rule_type: "preferred".to_string(),
        target_recipe_name: "Fries".to_string(),
        confidence: 0.4,
        source: "human".to_string(),
        description: "first".to_string(),
    };

    let rule = LearnedRuleRepo::upsert(&pool, &input).await.unwrap();
    assert!(rule.is_active);

    LearnedRuleRepo::set_active(&pool, rule.id, false)
        .await
        .unwrap()
        .unwrap();

    input.confidence = 0.8;
    input.source = "ai".to_string();
    let refreshed = LearnedRuleRepo::upsert(&pool, &input).await.unwrap();
    assert_eq!(refreshed.id, rule.id);
    assert_eq!(refreshed.confidence, 0.8);
    assert_eq!(refreshed.source, "ai");
    assert!(!refreshed.is_active);

    assert!(LearnedRuleRepo::list(&pool, false).await.unwrap().is_empty());
    assert_eq!(LearnedRuleRepo::list(&pool, true).await.unwrap().len(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn confidence_outside_unit_range_is_rejected(pool: PgPool) {
    let main = new_recipe(&pool, "Schnitzel", "MainMeat").await;
    let result = LearnedRuleRepo::upsert(
        &pool,
        &UpsertLearnedRule {
            main_recipe_id: main,
            rule_type: "forbidden".to_string(),
            target_recipe_name: "Custard".to_string(),
            confidence: 1.5,
            source: "human".to_string(),
            description: String::new(),
        },
    )
    .await;
    assert!(result.is_err());
}
