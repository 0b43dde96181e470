//! Repository for the append-only `pairing_ratings` table.

use sqlx::PgPool;

use crate::models::feedback::{CreatePairingRating, FeedbackCounters, PairingRating};

const COLUMNS: &str = "id, user_id, template_id, week_nr, day_of_week, meal, location_slug, \
     main_recipe_id, side_recipe_id, main_dish_name, side_dish_name, pairing_type, rating, \
     comment, created_at, updated_at";

pub struct PairingRatingRepo;

impl PairingRatingRepo {
    /// Insert a submission batch atomically. Either every rating is stored
    /// or none is.
    pub async fn insert_batch(
        pool: &PgPool,
        ratings: &[CreatePairingRating],
    ) -> Result<Vec<PairingRating>, sqlx::Error> {
        let query = format!(
            "INSERT INTO pairing_ratings \
                (user_id, template_id, week_nr, day_of_week, meal, location_slug, \
                 main_recipe_id, side_recipe_id, main_dish_name, side_dish_name, \
                 pairing_type, rating, comment) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13) \
             RETURNING {COLUMNS}"
        );

        let mut tx = pool.begin().await?;
        let mut created = Vec::with_capacity(ratings.len());
        for r in ratings {
            let row = sqlx::query_as::<_, PairingRating>(&query)
                .bind(r.user_id)
                .bind(r.template_id)
                .bind(r.week_nr)
                .bind(r.day_of_week)
                .bind(&r.meal)
                .bind(&r.location_slug)
                .bind(r.main_recipe_id)
                .bind(r.side_recipe_id)
                .bind(&r.main_dish_name)
                .bind(&r.side_dish_name)
                .bind(&r.pairing_type)
                .bind(r.rating)
                .bind(&r.comment)
                .fetch_one(&mut *tx)
                .await?;
            created.push(row);
        }
        tx.commit().await?;

        Ok(created)
    }

    /// Most recent ratings first.
    pub async fn list(
        pool: &PgPool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<PairingRating>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM pairing_ratings \
             ORDER BY created_at DESC, id DESC \
             LIMIT $1 OFFSET $2"
        );
        sqlx::query_as::<_, PairingRating>(&query)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM pairing_ratings")
            .fetch_one(pool)
            .await?;
        Ok(count)
    }

    /// Fill in missing recipe ids from the stored dish names, where a recipe
    /// with that exact name (case-insensitive) now exists.
    ///
    /// Returns the number of rows updated across both columns.
    pub async fn resolve_names(pool: &PgPool) -> Result<u64, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let mains = sqlx::query(
            "UPDATE pairing_ratings pr \
             SET main_recipe_id = ( \
                 SELECT r.id FROM recipes r \
                 WHERE LOWER(r.name) = LOWER(TRIM(pr.main_dish_name)) \
                 ORDER BY r.id LIMIT 1) \
             WHERE pr.main_recipe_id IS NULL \
               AND pr.main_dish_name IS NOT NULL \
               AND EXISTS (SELECT 1 FROM recipes r \
                           WHERE LOWER(r.name) = LOWER(TRIM(pr.main_dish_name)))",
        )
        .execute(&mut *tx)
        .await?;

        let sides = sqlx::query(
            "UPDATE pairing_ratings pr \
             SET side_recipe_id = ( \
                 SELECT r.id FROM recipes r \
                 WHERE LOWER(r.name) = LOWER(TRIM(pr.side_dish_name)) \
                 ORDER BY r.id LIMIT 1) \
             WHERE pr.side_recipe_id IS NULL \
               AND pr.side_dish_name IS NOT NULL \
               AND EXISTS (SELECT 1 FROM recipes r \
                           WHERE LOWER(r.name) = LOWER(TRIM(pr.side_dish_name)))",
        )
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(mains.rows_affected() + sides.rows_affected())
    }

    /// Dashboard counters in a single round trip.
    pub async fn counters(pool: &PgPool) -> Result<FeedbackCounters, sqlx::Error> {
        sqlx::query_as::<_, FeedbackCounters>(
            "SELECT \
                COUNT(*) AS total_ratings, \
                COUNT(*) FILTER (WHERE created_at >= NOW() - INTERVAL '7 days') \
                    AS ratings_last_7_days, \
                COUNT(*) FILTER (WHERE main_recipe_id IS NULL OR side_recipe_id IS NULL) \
                    AS unresolved_ratings, \
                AVG(rating)::float8 AS average_rating, \
                (SELECT COUNT(*) FROM pairing_scores) AS scored_pairings \
             FROM pairing_ratings",
        )
        .fetch_one(pool)
        .await
    }
}
