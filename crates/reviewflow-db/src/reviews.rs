//! Database operations for the `reviews` table.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reviewflow_core::{NewReview, Review, ReviewChanges, Sentiment};
use sqlx::PgPool;

use crate::store::ReviewStore;
use crate::DbError;

const REVIEW_COLUMNS: &str =
    "id, movie_id, content, rating, sentiment, confidence, created_at, updated_at";

// ---------------------------------------------------------------------------
// Row type
// ---------------------------------------------------------------------------

/// A row from the `reviews` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ReviewRow {
    pub id: i64,
    pub movie_id: String,
    pub content: String,
    pub rating: i32,
    pub sentiment: String,
    pub confidence: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl TryFrom<ReviewRow> for Review {
    type Error = DbError;

    fn try_from(row: ReviewRow) -> Result<Self, Self::Error> {
        let sentiment = row
            .sentiment
            .parse::<Sentiment>()
            .map_err(|e| DbError::InvalidRow {
                id: row.id,
                reason: e.to_string(),
            })?;

        Ok(Review {
            id: row.id,
            movie_id: row.movie_id,
            content: row.content,
            rating: row.rating,
            sentiment,
            confidence: row.confidence,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

// ---------------------------------------------------------------------------
// Postgres store
// ---------------------------------------------------------------------------

/// [`ReviewStore`] backed by a shared, bounded Postgres pool.
///
/// Each call checks a connection out of the pool for a single statement and
/// returns it when the statement completes or fails.
#[derive(Debug, Clone)]
pub struct PgReviewStore {
    pool: PgPool,
}

impl PgReviewStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl ReviewStore for PgReviewStore {
    async fn create(&self, review: NewReview) -> Result<Review, DbError> {
        let sentiment = review.sentiment();
        let row = sqlx::query_as::<_, ReviewRow>(&format!(
            "INSERT INTO reviews (movie_id, content, rating, sentiment, confidence) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {REVIEW_COLUMNS}"
        ))
        .bind(review.movie_id())
        .bind(review.content())
        .bind(review.rating())
        .bind(sentiment.label.as_str())
        .bind(sentiment.confidence)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| query_failed("create", e))?;

        row.try_into()
    }

    async fn get(&self, id: i64) -> Result<Review, DbError> {
        let row = sqlx::query_as::<_, ReviewRow>(&format!(
            "SELECT {REVIEW_COLUMNS} FROM reviews WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| query_failed("get", e))?
        .ok_or(DbError::NotFound)?;

        row.try_into()
    }

    async fn list_by_movie(&self, movie_id: &str) -> Result<Vec<Review>, DbError> {
        let rows = sqlx::query_as::<_, ReviewRow>(&format!(
            "SELECT {REVIEW_COLUMNS} FROM reviews \
             WHERE movie_id = $1 \
             ORDER BY created_at DESC, id DESC"
        ))
        .bind(movie_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| query_failed("list_by_movie", e))?;

        rows.into_iter().map(Review::try_from).collect()
    }

    async fn update(&self, id: i64, changes: ReviewChanges) -> Result<Review, DbError> {
        let sentiment = changes.sentiment();
        let row = sqlx::query_as::<_, ReviewRow>(&format!(
            "UPDATE reviews \
             SET content = $1, rating = $2, sentiment = $3, confidence = $4, updated_at = NOW() \
             WHERE id = $5 \
             RETURNING {REVIEW_COLUMNS}"
        ))
        .bind(changes.content())
        .bind(changes.rating())
        .bind(sentiment.label.as_str())
        .bind(sentiment.confidence)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| query_failed("update", e))?
        .ok_or(DbError::NotFound)?;

        row.try_into()
    }

    async fn delete(&self, id: i64) -> Result<(), DbError> {
        let result = sqlx::query("DELETE FROM reviews WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| query_failed("delete", e))?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound);
        }

        Ok(())
    }

    async fn ping(&self) -> Result<(), DbError> {
        crate::ping(&self.pool)
            .await
            .map_err(|e| query_failed("ping", e))
    }
}

fn query_failed(operation: &'static str, error: sqlx::Error) -> DbError {
    tracing::error!(operation, error = %error, "review query failed");
    DbError::Sqlx(error)
}
