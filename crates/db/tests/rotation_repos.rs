//! Integration tests for rotation templates, slots and menu plans.

use chrono::NaiveDate;
use galley_core::grid::{full_grid, location_grid, SlotKey};
use galley_core::rotation::{Course, Meal, MIRROR_LOCATION, PRIMARY_LOCATION};
use galley_db::models::menu_plan::CreateMenuPlan;
use galley_db::models::recipe::CreateRecipe;
use galley_db::models::rotation::{CreateRotationSlot, CreateRotationTemplate};
use galley_db::repositories::{
    LocationRepo, MenuPlanRepo, RecipeRepo, RotationSlotRepo, RotationTemplateRepo,
};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn new_template(pool: &PgPool, week_count: i32) -> i64 {
    RotationTemplateRepo::create(
        pool,
        &CreateRotationTemplate {
            name: "Test rotation".to_string(),
            week_count,
        },
    )
    .await
    .unwrap()
    .id
}

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

// ---------------------------------------------------------------------------
// Templates
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn only_one_template_can_be_active(pool: PgPool) {
    assert!(RotationTemplateRepo::find_active(&pool).await.unwrap().is_none());

    let id = new_template(&pool, 6).await;
    let active = RotationTemplateRepo::find_active(&pool).await.unwrap().unwrap();
    assert_eq!(active.id, id);
    assert_eq!(active.week_count, 6);

    let second = RotationTemplateRepo::create(
        &pool,
        &CreateRotationTemplate {
            name: "Another".to_string(),
            week_count: 4,
        },
    )
    .await;
    assert!(second.is_err());
}

// ---------------------------------------------------------------------------
// Slots
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn insert_missing_skips_existing_cells(pool: PgPool) {
    let template_id = new_template(&pool, 1).await;
    let grid = full_grid(1);

    let inserted = RotationSlotRepo::insert_missing(&pool, template_id, &grid)
        .await
        .unwrap();
    assert_eq!(inserted as usize, grid.len());

    let again = RotationSlotRepo::insert_missing(&pool, template_id, &grid)
        .await
        .unwrap();
    assert_eq!(again, 0);

    let count = RotationSlotRepo::count_by_template(&pool, template_id)
        .await
        .unwrap();
    assert_eq!(count as usize, grid.len());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn counts_are_split_by_location(pool: PgPool) {
    let template_id = new_template(&pool, 2).await;
    let city = location_grid(2, PRIMARY_LOCATION);
    RotationSlotRepo::insert_missing(&pool, template_id, &city)
        .await
        .unwrap();

    let counts = RotationSlotRepo::count_by_location(&pool, template_id)
        .await
        .unwrap();
    assert_eq!(counts.len(), 1);
    assert_eq!(counts[0].location_slug, PRIMARY_LOCATION);
    assert_eq!(counts[0].slot_count as usize, city.len());
    assert_eq!(counts[0].filled_count, 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn duplicate_slot_violates_cell_constraint(pool: PgPool) {
    let template_id = new_template(&pool, 6).await;
    let input = CreateRotationSlot {
        week_nr: 1,
        day_of_week: 1,
        meal: "lunch".to_string(),
        location_slug: PRIMARY_LOCATION.to_string(),
        course: "soup".to_string(),
        recipe_id: None,
    };
    RotationSlotRepo::create(&pool, template_id, &input).await.unwrap();

    let err = RotationSlotRepo::create(&pool, template_id, &input)
        .await
        .unwrap_err();
    let db_err = err.as_database_error().unwrap();
    assert_eq!(db_err.constraint(), Some("uq_rotation_slots_cell"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn set_recipe_fills_and_clears(pool: PgPool) {
    let template_id = new_template(&pool, 1).await;
    let recipe_id = new_recipe(&pool, "Tomato soup", "Soup").await;
    let key = SlotKey::new(1, 3, Meal::Lunch, PRIMARY_LOCATION, Course::Soup);
    RotationSlotRepo::insert_missing(&pool, template_id, &[key])
        .await
        .unwrap();
    let slot = RotationSlotRepo::list_by_template(&pool, template_id, Some(1))
        .await
        .unwrap()
        .remove(0);

    let filled = RotationSlotRepo::set_recipe(&pool, slot.id, Some(recipe_id))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(filled.recipe_id, Some(recipe_id));
    assert_eq!(
        RotationSlotRepo::count_week(&pool, template_id, 1).await.unwrap(),
        (1, 1)
    );

    let cleared = RotationSlotRepo::set_recipe(&pool, slot.id, None)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(cleared.recipe_id, None);

    assert!(RotationSlotRepo::set_recipe(&pool, 999_999, None)
        .await
        .unwrap()
        .is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn week_filter_and_course_order(pool: PgPool) {
    let template_id = new_template(&pool, 2).await;
    RotationSlotRepo::insert_missing(&pool, template_id, &full_grid(2))
        .await
        .unwrap();

    let week2 = RotationSlotRepo::list_by_template(&pool, template_id, Some(2))
        .await
        .unwrap();
    assert!(week2.iter().all(|s| s.week_nr == 2));
    assert_eq!(week2.len(), full_grid(1).len());

    let meal = RotationSlotRepo::list_meal(&pool, template_id, 2, 0, "dinner", MIRROR_LOCATION)
        .await
        .unwrap();
    let courses: Vec<&str> = meal.iter().map(|s| s.course.as_str()).collect();
    let expected: Vec<&str> = Course::ALL.iter().map(|c| c.as_str()).collect();
    assert_eq!(courses, expected);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn deleting_a_recipe_empties_its_slots(pool: PgPool) {
    let template_id = new_template(&pool, 1).await;
    let recipe_id = new_recipe(&pool, "Apple pie", "Dessert").await;
    let slot = RotationSlotRepo::create(
        &pool,
        template_id,
        &CreateRotationSlot {
            week_nr: 1,
            day_of_week: 5,
            meal: "dinner".to_string(),
            location_slug: PRIMARY_LOCATION.to_string(),
            course: "dessert".to_string(),
            recipe_id: Some(recipe_id),
        },
    )
    .await
    .unwrap();

    sqlx::query("DELETE FROM recipes WHERE id = $1")
        .bind(recipe_id)
        .execute(&pool)
        .await
        .unwrap();

    let slot = RotationSlotRepo::find_by_id(&pool, slot.id).await.unwrap().unwrap();
    assert_eq!(slot.recipe_id, None);
}

// ---------------------------------------------------------------------------
// Menu plans
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn menu_plan_range_roundtrip(pool: PgPool) {
    let recipe_id = new_recipe(&pool, "Goulash", "MainMeat").await;
    let locations = LocationRepo::list(&pool).await.unwrap();
    let city = locations.iter().find(|l| l.slug == PRIMARY_LOCATION).unwrap();

    let monday = NaiveDate::from_ymd_opt(2026, 10, 12).unwrap();
    let sunday = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
    let plans: Vec<CreateMenuPlan> = (0..3)
        .map(|offset| CreateMenuPlan {
            date: monday + chrono::Duration::days(offset),
            meal: "lunch".to_string(),
            course: "main1".to_string(),
            recipe_id,
            portions: 0,
            location_id: city.id,
            rotation_week_nr: Some(6),
        })
        .collect();

    assert_eq!(MenuPlanRepo::insert_many(&pool, &plans).await.unwrap(), 3);
    assert_eq!(MenuPlanRepo::insert_many(&pool, &[]).await.unwrap(), 0);

    let listed = MenuPlanRepo::list_range(&pool, monday, sunday).await.unwrap();
    assert_eq!(listed.len(), 3);
    assert_eq!(listed[0].date, monday);
    assert!(listed.iter().all(|p| p.rotation_week_nr == Some(6)));

    let next_monday = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
    assert_eq!(
        MenuPlanRepo::count_range(&pool, next_monday, next_monday).await.unwrap(),
        0
    );

    assert_eq!(MenuPlanRepo::delete_range(&pool, monday, sunday).await.unwrap(), 3);
    assert_eq!(MenuPlanRepo::count_range(&pool, monday, sunday).await.unwrap(), 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn failed_replace_keeps_existing_plans(pool: PgPool) {
    let recipe_id = new_recipe(&pool, "Goulash", "MainMeat").await;
    let city = LocationRepo::list(&pool)
        .await
        .unwrap()
        .into_iter()
        .find(|l| l.slug == PRIMARY_LOCATION)
        .unwrap();

    let monday = NaiveDate::from_ymd_opt(2026, 10, 12).unwrap();
    let sunday = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
    let plan = |portions: i32| CreateMenuPlan {
        date: monday,
        meal: "lunch".to_string(),
        course: "main1".to_string(),
        recipe_id,
        portions,
        location_id: city.id,
        rotation_week_nr: Some(6),
    };

    let (deleted, inserted) = MenuPlanRepo::replace_range(&pool, monday, sunday, false, &[plan(10), plan(12)])
        .await
        .unwrap();
    assert_eq!((deleted, inserted), (0, 2));

    // Negative portions violate the CHECK constraint, so the insert fails
    // after the delete has already run inside the transaction.
    let err = MenuPlanRepo::replace_range(&pool, monday, sunday, true, &[plan(-1)])
        .await
        .unwrap_err();
    assert!(matches!(err, sqlx::Error::Database(_)));
    assert_eq!(MenuPlanRepo::count_range(&pool, monday, sunday).await.unwrap(), 2);

    let (deleted, inserted) = MenuPlanRepo::replace_range(&pool, monday, sunday, true, &[plan(5)])
        .await
        .unwrap();
    assert_eq!((deleted, inserted), (2, 1));
}
