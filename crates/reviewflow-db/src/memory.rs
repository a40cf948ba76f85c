//! In-process [`ReviewStore`] for tests and local runs.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use reviewflow_core::{NewReview, Review, ReviewChanges};
use tokio::sync::RwLock;

use crate::store::ReviewStore;
use crate::DbError;

#[derive(Debug, Default)]
struct MemoryState {
    last_id: i64,
    reviews: BTreeMap<i64, Review>,
}

/// Same contract as [`crate::PgReviewStore`], held in memory.
///
/// The lock is held only for the duration of a single record operation.
#[derive(Debug, Default)]
pub struct MemoryReviewStore {
    state: RwLock<MemoryState>,
}

impl MemoryReviewStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of stored reviews across all movies.
    pub async fn len(&self) -> usize {
        self.state.read().await.reviews.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl ReviewStore for MemoryReviewStore {
    async fn create(&self, review: NewReview) -> Result<Review, DbError> {
        let sentiment = review.sentiment();
        let mut state = self.state.write().await;
        state.last_id += 1;
        let record = Review {
            id: state.last_id,
            movie_id: review.movie_id().to_string(),
            content: review.content().to_string(),
            rating: review.rating(),
            sentiment: sentiment.label,
            confidence: sentiment.confidence,
            created_at: Utc::now(),
            updated_at: None,
        };
        state.reviews.insert(record.id, record.clone());
        Ok(record)
    }

    async fn get(&self, id: i64) -> Result<Review, DbError> {
        self.state
            .read()
            .await
            .reviews
            .get(&id)
            .cloned()
            .ok_or(DbError::NotFound)
    }

    async fn list_by_movie(&self, movie_id: &str) -> Result<Vec<Review>, DbError> {
        let state = self.state.read().await;
        let mut reviews: Vec<Review> = state
            .reviews
            .values()
            .filter(|r| r.movie_id == movie_id)
            .cloned()
            .collect();
        drop(state);

        reviews.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(reviews)
    }

    async fn update(&self, id: i64, changes: ReviewChanges) -> Result<Review, DbError> {
        let mut state = self.state.write().await;
        let review = state.reviews.get_mut(&id).ok_or(DbError::NotFound)?;
        let sentiment = changes.sentiment();
        review.content = changes.content().to_string();
        review.rating = changes.rating();
        review.sentiment = sentiment.label;
        review.confidence = sentiment.confidence;
        review.updated_at = Some(Utc::now());
        Ok(review.clone())
    }

    async fn delete(&self, id: i64) -> Result<(), DbError> {
        self.state
            .write()
            .await
            .reviews
            .remove(&id)
            .map(|_| ())
            .ok_or(DbError::NotFound)
    }

    async fn ping(&self) -> Result<(), DbError> {
        Ok(())
    }
}
