//! Repository for the derived `pairing_scores` table.

use galley_core::scoring::{score_tallies, RatingTally};
use sqlx::PgPool;

use crate::models::feedback::{PairingScore, RatingTallyRow};

/// Advisory lock key serializing score rebuilds across processes.
const REBUILD_LOCK_KEY: i64 = 0x6761_6c6c_6579_0001;

const SELECT_JOINED: &str = "SELECT ps.main_recipe_id, m.name AS main_name, \
            ps.side_recipe_id, s.name AS side_name, \
            ps.pairing_type, ps.avg_score, ps.weighted_score, ps.rating_count, \
            ps.updated_at AS last_updated \
     FROM pairing_scores ps \
     JOIN recipes m ON m.id = ps.main_recipe_id \
     JOIN recipes s ON s.id = ps.side_recipe_id";

pub struct PairingScoreRepo;

impl PairingScoreRepo {
    /// Recompute every score from the raw ratings and replace the table.
    ///
    /// Runs in one transaction under an advisory lock, so concurrent rebuilds
    /// serialize and readers never see a partially rebuilt table. Returns the
    /// number of scored pairings.
    pub async fn rebuild(pool: &PgPool) -> Result<usize, sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(REBUILD_LOCK_KEY)
            .execute(&mut *tx)
            .await?;

        let rows = sqlx::query_as::<_, RatingTallyRow>(
            "SELECT main_recipe_id, side_recipe_id, pairing_type, \
                    SUM(rating)::bigint AS rating_sum, \
                    COUNT(*) AS rating_count \
             FROM pairing_ratings \
             WHERE main_recipe_id IS NOT NULL AND side_recipe_id IS NOT NULL \
             GROUP BY main_recipe_id, side_recipe_id, pairing_type",
        )
        .fetch_all(&mut *tx)
        .await?;

        let tallies: Vec<RatingTally> = rows.into_iter().map(Into::into).collect();
        let scored = score_tallies(&tallies);

        sqlx::query("DELETE FROM pairing_scores")
            .execute(&mut *tx)
            .await?;

        if !scored.is_empty() {
            let mains: Vec<i64> = scored.iter().map(|s| s.main_recipe_id).collect();
            let sides: Vec<i64> = scored.iter().map(|s| s.side_recipe_id).collect();
            let types: Vec<&str> = scored.iter().map(|s| s.pairing_type.as_str()).collect();
            let avgs: Vec<f64> = scored.iter().map(|s| s.avg_score).collect();
            let weighted: Vec<f64> = scored.iter().map(|s| s.weighted_score).collect();
            let counts: Vec<i64> = scored.iter().map(|s| s.rating_count).collect();

            sqlx::query(
                "INSERT INTO pairing_scores \
                    (main_recipe_id, side_recipe_id, pairing_type, avg_score, \
                     weighted_score, rating_count) \
                 SELECT * FROM UNNEST($1::bigint[], $2::bigint[], $3::text[], \
                                      $4::float8[], $5::float8[], $6::bigint[])",
            )
            .bind(&mains)
            .bind(&sides)
            .bind(&types)
            .bind(&avgs)
            .bind(&weighted)
            .bind(&counts)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(scored.len())
    }

    /// Scores ordered by weighted score, best first.
    pub async fn list(
        pool: &PgPool,
        pairing_type: Option<&str>,
        min_count: i64,
    ) -> Result<Vec<PairingScore>, sqlx::Error> {
        let query = format!(
            "{SELECT_JOINED} \
             WHERE ($1::text IS NULL OR ps.pairing_type = $1) AND ps.rating_count >= $2 \
             ORDER BY ps.weighted_score DESC, ps.rating_count DESC, ps.main_recipe_id, ps.side_recipe_id"
        );
        sqlx::query_as::<_, PairingScore>(&query)
            .bind(pairing_type)
            .bind(min_count)
            .fetch_all(pool)
            .await
    }

    /// The `n` highest weighted scores.
    pub async fn top(pool: &PgPool, n: i64) -> Result<Vec<PairingScore>, sqlx::Error> {
        let query = format!(
            "{SELECT_JOINED} \
             ORDER BY ps.weighted_score DESC, ps.rating_count DESC, ps.id \
             LIMIT $1"
        );
        sqlx::query_as::<_, PairingScore>(&query)
            .bind(n)
            .fetch_all(pool)
            .await
    }

    /// The `n` lowest weighted scores.
    pub async fn bottom(pool: &PgPool, n: i64) -> Result<Vec<PairingScore>, sqlx::Error> {
        let query = format!(
            "{SELECT_JOINED} \
             ORDER BY ps.weighted_score ASC, ps.rating_count DESC, ps.id \
             LIMIT $1"
        );
        sqlx::query_as::<_, PairingScore>(&query)
            .bind(n)
            .fetch_all(pool)
            .await
    }
}
