//! Repository for the `menu_plans` table.

use chrono::NaiveDate;
use sqlx::{PgExecutor, PgPool};

use crate::models::menu_plan::{CreateMenuPlan, MenuPlan};

const COLUMNS: &str = "id, date, meal, course, recipe_id, portions, location_id, \
     rotation_week_nr, created_at, updated_at";

pub struct MenuPlanRepo;

impl MenuPlanRepo {
    /// Plans dated within `start..=end`, in calendar order.
    pub async fn list_range(
        pool: &PgPool,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<MenuPlan>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM menu_plans \
             WHERE date BETWEEN $1 AND $2 \
             ORDER BY date, meal, location_id, \
                array_position(ARRAY['soup','main1','side1a','side1b','main2','side2a','side2b','dessert'], course), \
                id"
        );
        sqlx::query_as::<_, MenuPlan>(&query)
            .bind(start)
            .bind(end)
            .fetch_all(pool)
            .await
    }

    pub async fn count_range(
        pool: &PgPool,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM menu_plans WHERE date BETWEEN $1 AND $2")
                .bind(start)
                .bind(end)
                .fetch_one(pool)
                .await?;
        Ok(count)
    }

    /// Delete every plan dated within `start..=end`. Returns rows deleted.
    pub async fn delete_range<'e>(
        executor: impl PgExecutor<'e>,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM menu_plans WHERE date BETWEEN $1 AND $2")
            .bind(start)
            .bind(end)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }

    /// Insert a batch of plans in one statement. Returns rows inserted.
    pub async fn insert_many<'e>(
        executor: impl PgExecutor<'e>,
        plans: &[CreateMenuPlan],
    ) -> Result<u64, sqlx::Error> {
        if plans.is_empty() {
            return Ok(0);
        }

        let dates: Vec<NaiveDate> = plans.iter().map(|p| p.date).collect();
        let meals: Vec<&str> = plans.iter().map(|p| p.meal.as_str()).collect();
        let courses: Vec<&str> = plans.iter().map(|p| p.course.as_str()).collect();
        let recipes: Vec<i64> = plans.iter().map(|p| p.recipe_id).collect();
        let portions: Vec<i32> = plans.iter().map(|p| p.portions).collect();
        let locations: Vec<i64> = plans.iter().map(|p| p.location_id).collect();
        let weeks: Vec<Option<i32>> = plans.iter().map(|p| p.rotation_week_nr).collect();

        let result = sqlx::query(
            "INSERT INTO menu_plans \
                (date, meal, course, recipe_id, portions, location_id, rotation_week_nr) \
             SELECT * FROM UNNEST($1::date[], $2::text[], $3::text[], $4::bigint[], \
                                  $5::int[], $6::bigint[], $7::int[])",
        )
        .bind(&dates)
        .bind(&meals)
        .bind(&courses)
        .bind(&recipes)
        .bind(&portions)
        .bind(&locations)
        .bind(&weeks)
        .execute(executor)
        .await?;

        Ok(result.rows_affected())
    }

    /// Insert `plans` for the week `start..=end`, first deleting the plans
    /// already dated in that range when `clear` is set.
    ///
    /// Both steps share one transaction: if the insert fails, the deleted
    /// plans are restored. Returns `(deleted, inserted)`.
    pub async fn replace_range(
        pool: &PgPool,
        start: NaiveDate,
        end: NaiveDate,
        clear: bool,
        plans: &[CreateMenuPlan],
    ) -> Result<(u64, u64), sqlx::Error> {
        let mut tx = pool.begin().await?;

        let deleted = if clear {
            Self::delete_range(&mut *tx, start, end).await?
        } else {
            0
        };
        let inserted = Self::insert_many(&mut *tx, plans).await?;

        tx.commit().await?;
        Ok((deleted, inserted))
    }
}
