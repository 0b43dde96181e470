//! Repository for the `rotation_slots` table.

use galley_core::grid::SlotKey;
use galley_core::types::DbId;
use sqlx::PgPool;

use crate::models::rotation::{CreateRotationSlot, LocationSlotCount, RotationSlot};

const COLUMNS: &str = "id, template_id, week_nr, day_of_week, meal, location_slug, course, \
     recipe_id, created_at, updated_at";

/// Ordering used by every slot listing: calendar position, then course order.
const ORDER: &str = "ORDER BY week_nr, day_of_week, location_slug, meal, \
     array_position(ARRAY['soup','main1','side1a','side1b','main2','side2a','side2b','dessert'], course), \
     id";

pub struct RotationSlotRepo;

impl RotationSlotRepo {
    /// Insert grid cells in bulk. Cells that already exist are left untouched.
    ///
    /// Returns the number of rows actually inserted.
    pub async fn insert_missing(
        pool: &PgPool,
        template_id: DbId,
        keys: &[SlotKey],
    ) -> Result<u64, sqlx::Error> {
        if keys.is_empty() {
            return Ok(0);
        }

        let week_nrs: Vec<i32> = keys.iter().map(|k| k.week_nr).collect();
        let days: Vec<i16> = keys.iter().map(|k| k.day_of_week).collect();
        let meals: Vec<&str> = keys.iter().map(|k| k.meal.as_str()).collect();
        let locations: Vec<&str> = keys.iter().map(|k| k.location_slug.as_str()).collect();
        let courses: Vec<&str> = keys.iter().map(|k| k.course.as_str()).collect();

        let result = sqlx::query(
            "INSERT INTO rotation_slots \
                (template_id, week_nr, day_of_week, meal, location_slug, course) \
             SELECT $1, * FROM UNNEST($2::int[], $3::smallint[], $4::text[], $5::text[], $6::text[]) \
             ON CONFLICT ON CONSTRAINT uq_rotation_slots_cell DO NOTHING",
        )
        .bind(template_id)
        .bind(&week_nrs)
        .bind(&days)
        .bind(&meals)
        .bind(&locations)
        .bind(&courses)
        .execute(pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Insert one slot, returning the created row.
    pub async fn create(
        pool: &PgPool,
        template_id: DbId,
        input: &CreateRotationSlot,
    ) -> Result<RotationSlot, sqlx::Error> {
        let query = format!(
            "INSERT INTO rotation_slots \
                (template_id, week_nr, day_of_week, meal, location_slug, course, recipe_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, RotationSlot>(&query)
            .bind(template_id)
            .bind(input.week_nr)
            .bind(input.day_of_week)
            .bind(&input.meal)
            .bind(&input.location_slug)
            .bind(&input.course)
            .bind(input.recipe_id)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<RotationSlot>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM rotation_slots WHERE id = $1");
        sqlx::query_as::<_, RotationSlot>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// All slots of a template, optionally restricted to one rotation week.
    pub async fn list_by_template(
        pool: &PgPool,
        template_id: DbId,
        week_nr: Option<i32>,
    ) -> Result<Vec<RotationSlot>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM rotation_slots \
             WHERE template_id = $1 AND ($2::int IS NULL OR week_nr = $2) \
             {ORDER}"
        );
        sqlx::query_as::<_, RotationSlot>(&query)
            .bind(template_id)
            .bind(week_nr)
            .fetch_all(pool)
            .await
    }

    /// Slots of one (week, day, meal, location) cell group.
    pub async fn list_meal(
        pool: &PgPool,
        template_id: DbId,
        week_nr: i32,
        day_of_week: i16,
        meal: &str,
        location_slug: &str,
    ) -> Result<Vec<RotationSlot>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM rotation_slots \
             WHERE template_id = $1 AND week_nr = $2 AND day_of_week = $3 \
               AND meal = $4 AND location_slug = $5 \
             {ORDER}"
        );
        sqlx::query_as::<_, RotationSlot>(&query)
            .bind(template_id)
            .bind(week_nr)
            .bind(day_of_week)
            .bind(meal)
            .bind(location_slug)
            .fetch_all(pool)
            .await
    }

    pub async fn count_by_template(pool: &PgPool, template_id: DbId) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM rotation_slots WHERE template_id = $1")
                .bind(template_id)
                .fetch_one(pool)
                .await?;
        Ok(count)
    }

    /// Slot and filled counts per location.
    pub async fn count_by_location(
        pool: &PgPool,
        template_id: DbId,
    ) -> Result<Vec<LocationSlotCount>, sqlx::Error> {
        sqlx::query_as::<_, LocationSlotCount>(
            "SELECT location_slug, \
                    COUNT(*) AS slot_count, \
                    COUNT(recipe_id) AS filled_count \
             FROM rotation_slots \
             WHERE template_id = $1 \
             GROUP BY location_slug \
             ORDER BY location_slug",
        )
        .bind(template_id)
        .fetch_all(pool)
        .await
    }

    /// `(total, filled)` slot counts for one rotation week.
    pub async fn count_week(
        pool: &PgPool,
        template_id: DbId,
        week_nr: i32,
    ) -> Result<(i64, i64), sqlx::Error> {
        sqlx::query_as(
            "SELECT COUNT(*), COUNT(recipe_id) FROM rotation_slots \
             WHERE template_id = $1 AND week_nr = $2",
        )
        .bind(template_id)
        .bind(week_nr)
        .fetch_one(pool)
        .await
    }

    /// Set (or clear, with `None`) the recipe of a slot.
    pub async fn set_recipe(
        pool: &PgPool,
        id: DbId,
        recipe_id: Option<DbId>,
    ) -> Result<Option<RotationSlot>, sqlx::Error> {
        let query = format!(
            "UPDATE rotation_slots SET recipe_id = $2 WHERE id = $1 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, RotationSlot>(&query)
            .bind(id)
            .bind(recipe_id)
            .fetch_optional(pool)
            .await
    }
}
