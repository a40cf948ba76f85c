//! Behavioural tests for `ReviewPipeline` against the in-memory store.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use reviewflow_core::{
    NewReview, Review, ReviewChanges, ReviewDraft, ReviewPatch, ReviewValidator, Sentiment,
    SentimentResult,
};
use reviewflow_db::{DbError, MemoryReviewStore, ReviewStore};
use reviewflow_pipeline::{PipelineError, ReviewPipeline};
use reviewflow_sentiment::{ClassificationError, LexiconClassifier, SentimentClassifier};

// ---------------------------------------------------------------------------
// Test doubles
// ---------------------------------------------------------------------------

/// Returns a fixed result and counts calls.
struct FixedClassifier {
    result: SentimentResult,
    calls: AtomicUsize,
}

impl FixedClassifier {
    fn new(label: Sentiment, confidence: f64) -> Self {
        Self {
            result: SentimentResult { label, confidence },
            calls: AtomicUsize::new(0),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SentimentClassifier for FixedClassifier {
    fn backend(&self) -> &'static str {
        "fixed"
    }

    async fn classify(&self, _text: &str) -> Result<SentimentResult, ClassificationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.result)
    }
}

struct FailingClassifier;

#[async_trait]
impl SentimentClassifier for FailingClassifier {
    fn backend(&self) -> &'static str {
        "failing"
    }

    async fn classify(&self, _text: &str) -> Result<SentimentResult, ClassificationError> {
        Err(ClassificationError::Unavailable("model offline".to_string()))
    }
}

/// Wraps a `MemoryReviewStore` and counts every call.
#[derive(Default)]
struct CountingStore {
    inner: MemoryReviewStore,
    calls: AtomicUsize,
}

impl CountingStore {
    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn tick(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl ReviewStore for CountingStore {
    async fn create(&self, review: NewReview) -> Result<Review, DbError> {
        self.tick();
        self.inner.create(review).await
    }

    async fn get(&self, id: i64) -> Result<Review, DbError> {
        self.tick();
        self.inner.get(id).await
    }

    async fn list_by_movie(&self, movie_id: &str) -> Result<Vec<Review>, DbError> {
        self.tick();
        self.inner.list_by_movie(movie_id).await
    }

    async fn update(&self, id: i64, changes: ReviewChanges) -> Result<Review, DbError> {
        self.tick();
        self.inner.update(id, changes).await
    }

    async fn delete(&self, id: i64) -> Result<(), DbError> {
        self.tick();
        self.inner.delete(id).await
    }

    async fn ping(&self) -> Result<(), DbError> {
        self.inner.ping().await
    }
}

/// Every write fails as if the pool were exhausted.
struct BrokenStore;

#[async_trait]
impl ReviewStore for BrokenStore {
    async fn create(&self, _review: NewReview) -> Result<Review, DbError> {
        Err(DbError::Sqlx(sqlx::Error::PoolTimedOut))
    }

    async fn get(&self, _id: i64) -> Result<Review, DbError> {
        Err(DbError::Sqlx(sqlx::Error::PoolTimedOut))
    }

    async fn list_by_movie(&self, _movie_id: &str) -> Result<Vec<Review>, DbError> {
        Err(DbError::Sqlx(sqlx::Error::PoolTimedOut))
    }

    async fn update(&self, _id: i64, _changes: ReviewChanges) -> Result<Review, DbError> {
        Err(DbError::Sqlx(sqlx::Error::PoolTimedOut))
    }

    async fn delete(&self, _id: i64) -> Result<(), DbError> {
        Err(DbError::Sqlx(sqlx::Error::PoolTimedOut))
    }

    async fn ping(&self) -> Result<(), DbError> {
        Err(DbError::Sqlx(sqlx::Error::PoolTimedOut))
    }
}

/// Reads and creates go through; every update fails.
#[derive(Default)]
struct UpdateFailsStore {
    inner: MemoryReviewStore,
}

#[async_trait]
impl ReviewStore for UpdateFailsStore {
    async fn create(&self, review: NewReview) -> Result<Review, DbError> {
        self.inner.create(review).await
    }

    async fn get(&self, id: i64) -> Result<Review, DbError> {
        self.inner.get(id).await
    }

    async fn list_by_movie(&self, movie_id: &str) -> Result<Vec<Review>, DbError> {
        self.inner.list_by_movie(movie_id).await
    }

    async fn update(&self, _id: i64, _changes: ReviewChanges) -> Result<Review, DbError> {
        Err(DbError::Sqlx(sqlx::Error::PoolTimedOut))
    }

    async fn delete(&self, id: i64) -> Result<(), DbError> {
        self.inner.delete(id).await
    }

    async fn ping(&self) -> Result<(), DbError> {
        self.inner.ping().await
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn draft(movie_id: &str, content: &str, rating: i32) -> ReviewDraft {
    ReviewDraft {
        movie_id: movie_id.to_string(),
        content: content.to_string(),
        rating,
    }
}

fn lexicon_pipeline() -> ReviewPipeline {
    ReviewPipeline::new(
        ReviewValidator::default(),
        Arc::new(LexiconClassifier::builtin(512)),
        Arc::new(MemoryReviewStore::new()),
    )
}

fn counted_pipeline(
    classifier: Arc<FixedClassifier>,
    store: Arc<CountingStore>,
) -> ReviewPipeline {
    ReviewPipeline::new(ReviewValidator::default(), classifier, store)
}

// ---------------------------------------------------------------------------
// submit
// ---------------------------------------------------------------------------

#[tokio::test]
async fn masterpiece_review_is_positive() {
    let pipeline = lexicon_pipeline();
    let review = pipeline
        .submit(&draft(
            "tt0111161",
            "A masterpiece that defines the genre. The acting was superb.",
            5,
        ))
        .await
        .expect("submit");

    assert_eq!(review.sentiment, Sentiment::Positive);
    assert!(review.confidence > 0.5 && review.confidence <= 1.0);
    assert_eq!(review.rating, 5);
    assert!(review.id > 0);
    assert!(review.updated_at.is_none());
}

#[tokio::test]
async fn disappointing_review_is_negative() {
    let pipeline = lexicon_pipeline();
    let review = pipeline
        .submit(&draft(
            "tt0111161",
            "Disappointing, slow, and confusing plot.",
            2,
        ))
        .await
        .expect("submit");

    assert_eq!(review.sentiment, Sentiment::Negative);
    assert!(review.confidence > 0.5);
}

#[tokio::test]
async fn short_content_is_rejected_without_touching_store_or_classifier() {
    let classifier = Arc::new(FixedClassifier::new(Sentiment::Positive, 0.9));
    let store = Arc::new(CountingStore::default());
    let pipeline = counted_pipeline(Arc::clone(&classifier), Arc::clone(&store));

    let err = pipeline
        .submit(&draft("tt0111161", "Short", 4))
        .await
        .unwrap_err();

    assert!(
        matches!(err, PipelineError::Validation(ref e) if e.field() == "content"),
        "expected content validation error, got: {err:?}"
    );
    assert_eq!(err.step(), "validate");
    assert_eq!(classifier.calls(), 0);
    assert_eq!(store.calls(), 0);
}

#[tokio::test]
async fn content_length_outside_bounds_never_reaches_store() {
    let classifier = Arc::new(FixedClassifier::new(Sentiment::Positive, 0.9));
    let store = Arc::new(CountingStore::default());
    let pipeline = counted_pipeline(Arc::clone(&classifier), Arc::clone(&store));

    let cases = [
        String::new(),
        "x".repeat(9),
        "   padded   ".to_string(),
        "y".repeat(2001),
        "z".repeat(10_000),
    ];
    for content in &cases {
        let result = pipeline.submit(&draft("tt1", content, 3)).await;
        assert!(
            matches!(result, Err(PipelineError::Validation(_))),
            "content of {} chars should be rejected, got: {result:?}",
            content.len()
        );
    }

    assert_eq!(store.calls(), 0);
    assert_eq!(classifier.calls(), 0);
}

#[tokio::test]
async fn rating_above_max_is_rejected_referencing_rating() {
    let pipeline = lexicon_pipeline();
    let err = pipeline
        .submit(&draft("tt0111161", "A perfectly reasonable review.", 6))
        .await
        .unwrap_err();

    assert!(
        matches!(err, PipelineError::Validation(ref e) if e.field() == "rating"),
        "expected rating validation error, got: {err:?}"
    );
}

#[tokio::test]
async fn first_failing_field_wins() {
    let pipeline = lexicon_pipeline();
    let err = pipeline.submit(&draft("", "bad", 0)).await.unwrap_err();

    assert!(
        matches!(err, PipelineError::Validation(ref e) if e.field() == "movie_id"),
        "expected movie_id validation error, got: {err:?}"
    );
}

#[tokio::test]
async fn classifier_failure_persists_nothing() {
    let store = Arc::new(MemoryReviewStore::new());
    let pipeline = ReviewPipeline::new(
        ReviewValidator::default(),
        Arc::new(FailingClassifier),
        Arc::clone(&store) as Arc<dyn ReviewStore>,
    );

    let err = pipeline
        .submit(&draft("tt1", "Would have been a fine review.", 4))
        .await
        .unwrap_err();

    assert!(
        matches!(err, PipelineError::Classification(ClassificationError::Unavailable(_))),
        "expected classification error, got: {err:?}"
    );
    assert_eq!(err.step(), "classify");
    assert!(pipeline.list_for_movie("tt1").await.expect("list").is_empty());
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn store_failure_surfaces_as_storage_error() {
    let pipeline = ReviewPipeline::new(
        ReviewValidator::default(),
        Arc::new(FixedClassifier::new(Sentiment::Positive, 0.9)),
        Arc::new(BrokenStore),
    );

    let err = pipeline
        .submit(&draft("tt1", "Would have been a fine review.", 4))
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::Storage(_)), "got: {err:?}");
    assert_eq!(err.step(), "persist");
    assert!(matches!(pipeline.ping().await, Err(PipelineError::Storage(_))));
}

#[tokio::test]
async fn submitted_review_is_listed_exactly_once() {
    let pipeline = lexicon_pipeline();
    let review = pipeline
        .submit(&draft("tt42", "  Great film with a superb cast.  ", 4))
        .await
        .expect("submit");

    assert_eq!(review.content, "Great film with a superb cast.");

    let listed = pipeline.list_for_movie("tt42").await.expect("list");
    assert_eq!(listed.iter().filter(|r| r.id == review.id).count(), 1);
    assert_eq!(listed[0], review);
}

#[tokio::test]
async fn list_is_idempotent_without_writes() {
    let pipeline = lexicon_pipeline();
    for content in ["Loved every minute.", "Boring and far too long.", "Fine."] {
        let _ = pipeline.submit(&draft("tt7", content, 3)).await;
    }

    let first = pipeline.list_for_movie("tt7").await.expect("list");
    let second = pipeline.list_for_movie("tt7").await.expect("list");
    assert_eq!(first.len(), 2);
    assert_eq!(first, second);
}

#[tokio::test]
async fn concurrent_submissions_get_distinct_ids() {
    let pipeline = Arc::new(lexicon_pipeline());
    let tasks = (0..24).map(|i| {
        let pipeline = Arc::clone(&pipeline);
        tokio::spawn(async move {
            pipeline
                .submit(&draft("tt9", &format!("Concurrent take number {i}."), 3))
                .await
                .expect("submit")
                .id
        })
    });

    let mut ids: Vec<i64> = futures::future::join_all(tasks)
        .await
        .into_iter()
        .map(|r| r.expect("task"))
        .collect();
    ids.sort_unstable();
    ids.dedup();

    assert_eq!(ids.len(), 24);
    assert_eq!(pipeline.list_for_movie("tt9").await.expect("list").len(), 24);
}

// ---------------------------------------------------------------------------
// update / delete / analyze
// ---------------------------------------------------------------------------

#[tokio::test]
async fn update_rating_only_keeps_sentiment_and_skips_classifier() {
    let classifier = Arc::new(FixedClassifier::new(Sentiment::Positive, 0.83));
    let store = Arc::new(CountingStore::default());
    let pipeline = counted_pipeline(Arc::clone(&classifier), store);

    let created = pipeline
        .submit(&draft("tt1", "An honest, charming film.", 4))
        .await
        .expect("submit");
    assert_eq!(classifier.calls(), 1);

    let updated = pipeline
        .update(
            created.id,
            &ReviewPatch {
                content: None,
                rating: Some(2),
            },
        )
        .await
        .expect("update");

    assert_eq!(classifier.calls(), 1);
    assert_eq!(updated.rating, 2);
    assert_eq!(updated.sentiment, created.sentiment);
    assert!((updated.confidence - created.confidence).abs() < f64::EPSILON);
    assert!(updated.updated_at.is_some());
}

#[tokio::test]
async fn update_with_same_content_modulo_whitespace_skips_classifier() {
    let classifier = Arc::new(FixedClassifier::new(Sentiment::Positive, 0.83));
    let pipeline = counted_pipeline(Arc::clone(&classifier), Arc::default());

    let created = pipeline
        .submit(&draft("tt1", "An honest, charming film.", 4))
        .await
        .expect("submit");

    pipeline
        .update(
            created.id,
            &ReviewPatch {
                content: Some("  An honest, charming film.\n".to_string()),
                rating: None,
            },
        )
        .await
        .expect("update");

    assert_eq!(classifier.calls(), 1);
}

#[tokio::test]
async fn update_with_new_content_reclassifies() {
    let pipeline = lexicon_pipeline();
    let created = pipeline
        .submit(&draft("tt1", "A masterpiece, simply brilliant.", 5))
        .await
        .expect("submit");
    assert_eq!(created.sentiment, Sentiment::Positive);

    let updated = pipeline
        .update(
            created.id,
            &ReviewPatch {
                content: Some("On rewatch it was dull and disappointing.".to_string()),
                rating: Some(2),
            },
        )
        .await
        .expect("update");

    assert_eq!(updated.id, created.id);
    assert_eq!(updated.created_at, created.created_at);
    assert_eq!(updated.sentiment, Sentiment::Negative);
    assert_eq!(updated.content, "On rewatch it was dull and disappointing.");
}

#[tokio::test]
async fn update_with_invalid_rating_leaves_record_untouched() {
    let pipeline = lexicon_pipeline();
    let created = pipeline
        .submit(&draft("tt1", "A masterpiece, simply brilliant.", 5))
        .await
        .expect("submit");

    let err = pipeline
        .update(
            created.id,
            &ReviewPatch {
                content: None,
                rating: Some(0),
            },
        )
        .await
        .unwrap_err();

    assert!(
        matches!(err, PipelineError::Validation(ref e) if e.field() == "rating"),
        "got: {err:?}"
    );
    assert_eq!(pipeline.get(created.id).await.expect("get"), created);
}

#[tokio::test]
async fn update_with_failing_classifier_leaves_record_untouched() {
    let store = Arc::new(MemoryReviewStore::new());
    let seeded = lexicon_pipeline_with_store(Arc::clone(&store))
        .submit(&draft("tt1", "A masterpiece, simply brilliant.", 5))
        .await
        .expect("submit");

    let failing = ReviewPipeline::new(
        ReviewValidator::default(),
        Arc::new(FailingClassifier),
        Arc::clone(&store) as Arc<dyn ReviewStore>,
    );
    let err = failing
        .update(
            seeded.id,
            &ReviewPatch {
                content: Some("Completely different words now.".to_string()),
                rating: None,
            },
        )
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::Classification(_)), "got: {err:?}");
    assert_eq!(store.get(seeded.id).await.expect("get"), seeded);
}

#[tokio::test]
async fn update_store_failure_surfaces_as_storage_error() {
    let store = Arc::new(UpdateFailsStore::default());
    let pipeline = ReviewPipeline::new(
        ReviewValidator::default(),
        Arc::new(FixedClassifier::new(Sentiment::Positive, 0.9)),
        Arc::clone(&store) as Arc<dyn ReviewStore>,
    );
    let seeded = pipeline
        .submit(&draft("tt1", "A perfectly decent evening out.", 3))
        .await
        .expect("submit");

    let err = pipeline
        .update(
            seeded.id,
            &ReviewPatch {
                content: None,
                rating: Some(5),
            },
        )
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::Storage(_)), "got: {err:?}");
    assert_eq!(err.step(), "persist");
    assert_eq!(store.get(seeded.id).await.expect("get"), seeded);
}

#[tokio::test]
async fn update_lookup_failure_is_storage_not_not_found() {
    let pipeline = ReviewPipeline::new(
        ReviewValidator::default(),
        Arc::new(FixedClassifier::new(Sentiment::Positive, 0.9)),
        Arc::new(BrokenStore),
    );

    let err = pipeline
        .update(
            1,
            &ReviewPatch {
                content: None,
                rating: Some(2),
            },
        )
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::Storage(_)), "got: {err:?}");
    assert_eq!(err.step(), "persist");
}

fn lexicon_pipeline_with_store(store: Arc<MemoryReviewStore>) -> ReviewPipeline {
    ReviewPipeline::new(
        ReviewValidator::default(),
        Arc::new(LexiconClassifier::builtin(512)),
        store,
    )
}

#[tokio::test]
async fn update_unknown_id_is_not_found() {
    let pipeline = lexicon_pipeline();
    let err = pipeline
        .update(
            404,
            &ReviewPatch {
                content: None,
                rating: Some(3),
            },
        )
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::NotFound { id: 404 }), "got: {err:?}");
}

#[tokio::test]
async fn empty_patch_returns_current_review() {
    let classifier = Arc::new(FixedClassifier::new(Sentiment::Negative, 0.7));
    let pipeline = counted_pipeline(Arc::clone(&classifier), Arc::default());
    let created = pipeline
        .submit(&draft("tt1", "Not my kind of movie.", 2))
        .await
        .expect("submit");

    let same = pipeline
        .update(created.id, &ReviewPatch::default())
        .await
        .expect("update");

    assert_eq!(same, created);
    assert_eq!(classifier.calls(), 1);
}

#[tokio::test]
async fn delete_removes_and_second_delete_is_not_found() {
    let pipeline = lexicon_pipeline();
    let created = pipeline
        .submit(&draft("tt1", "Short-lived but a fine review.", 3))
        .await
        .expect("submit");

    pipeline.delete(created.id).await.expect("delete");
    assert!(pipeline.list_for_movie("tt1").await.expect("list").is_empty());

    let err = pipeline.delete(created.id).await.unwrap_err();
    assert!(matches!(err, PipelineError::NotFound { .. }), "got: {err:?}");
}

#[tokio::test]
async fn analyze_does_not_store() {
    let store = Arc::new(CountingStore::default());
    let classifier = Arc::new(FixedClassifier::new(Sentiment::Positive, 0.95));
    let pipeline = counted_pipeline(Arc::clone(&classifier), Arc::clone(&store));

    let result = pipeline.analyze("anything at all").await.expect("analyze");
    assert_eq!(result.label, Sentiment::Positive);
    assert_eq!(classifier.calls(), 1);
    assert_eq!(store.calls(), 0);
}

#[tokio::test]
async fn analyze_is_deterministic() {
    let pipeline = lexicon_pipeline();
    let text = "Brilliant performances but a slow, predictable script.";
    let first = pipeline.analyze(text).await.expect("first");
    let second = pipeline.analyze(text).await.expect("second");
    assert_eq!(first, second);
}
