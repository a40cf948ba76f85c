//! The storage contract the review pipeline depends on.

use async_trait::async_trait;
use reviewflow_core::{NewReview, Review, ReviewChanges};

use crate::DbError;

/// Durable keyed storage for reviews.
///
/// Every operation is atomic for a single record. Implementations assign
/// `id` and `created_at` on create and never change either afterwards.
#[async_trait]
pub trait ReviewStore: Send + Sync {
    /// Persist a new review and return it with its assigned `id` and `created_at`.
    async fn create(&self, review: NewReview) -> Result<Review, DbError>;

    /// Fetch one review by id.
    ///
    /// Returns [`DbError::NotFound`] for an unknown id.
    async fn get(&self, id: i64) -> Result<Review, DbError>;

    /// All reviews for `movie_id`, newest first (`created_at DESC, id DESC`).
    async fn list_by_movie(&self, movie_id: &str) -> Result<Vec<Review>, DbError>;

    /// Overwrite the mutable fields of review `id` and stamp `updated_at`.
    ///
    /// Returns [`DbError::NotFound`] for an unknown id.
    async fn update(&self, id: i64, changes: ReviewChanges) -> Result<Review, DbError>;

    /// Remove review `id`.
    ///
    /// Returns [`DbError::NotFound`] for an unknown id.
    async fn delete(&self, id: i64) -> Result<(), DbError>;

    /// Liveness check used by the health endpoint.
    async fn ping(&self) -> Result<(), DbError>;
}
