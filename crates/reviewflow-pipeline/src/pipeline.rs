//! Submission orchestration and its state machine.

use std::fmt;
use std::sync::Arc;

use reviewflow_core::{
    NewReview, Review, ReviewChanges, ReviewDraft, ReviewPatch, ReviewValidator, SentimentResult,
};
use reviewflow_db::ReviewStore;
use reviewflow_sentiment::SentimentClassifier;

use crate::error::PipelineError;

/// Where a single submission is in its lifecycle.
///
/// `Persisted`, `Rejected` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionState {
    Drafted,
    Validated,
    Classified,
    Persisted,
    Rejected,
    Failed,
}

impl SubmissionState {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SubmissionState::Drafted => "DRAFTED",
            SubmissionState::Validated => "VALIDATED",
            SubmissionState::Classified => "CLASSIFIED",
            SubmissionState::Persisted => "PERSISTED",
            SubmissionState::Rejected => "REJECTED",
            SubmissionState::Failed => "FAILED",
        }
    }

    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            SubmissionState::Persisted | SubmissionState::Rejected | SubmissionState::Failed
        )
    }
}

impl fmt::Display for SubmissionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validates, classifies and persists reviews.
///
/// The three steps of a submission run strictly in order and a failure at
/// any step ends the submission without touching later steps. Nothing is
/// retried here.
#[derive(Clone)]
pub struct ReviewPipeline {
    validator: ReviewValidator,
    classifier: Arc<dyn SentimentClassifier>,
    store: Arc<dyn ReviewStore>,
}

impl fmt::Debug for ReviewPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReviewPipeline")
            .field("validator", &self.validator)
            .field("classifier", &self.classifier.backend())
            .finish_non_exhaustive()
    }
}

impl ReviewPipeline {
    #[must_use]
    pub fn new(
        validator: ReviewValidator,
        classifier: Arc<dyn SentimentClassifier>,
        store: Arc<dyn ReviewStore>,
    ) -> Self {
        Self {
            validator,
            classifier,
            store,
        }
    }

    #[must_use]
    pub fn validator(&self) -> &ReviewValidator {
        &self.validator
    }

    #[must_use]
    pub fn classifier_backend(&self) -> &'static str {
        self.classifier.backend()
    }

    /// Validate, classify and persist a new review.
    ///
    /// Fails closed: a review whose content cannot be classified is never
    /// written, and the caller must resubmit the whole draft.
    ///
    /// # Errors
    ///
    /// - [`PipelineError::Validation`] if the draft violates a bound. Neither
    ///   the classifier nor the store is called.
    /// - [`PipelineError::Classification`] if the classifier fails. The store
    ///   is not called.
    /// - [`PipelineError::Storage`] if the store rejects the write.
    pub async fn submit(&self, draft: &ReviewDraft) -> Result<Review, PipelineError> {
        trace_state(SubmissionState::Drafted, &draft.movie_id);

        let validated = match self.validator.validate(draft) {
            Ok(validated) => validated,
            Err(e) => {
                tracing::warn!(
                    state = %SubmissionState::Rejected,
                    movie_id = %draft.movie_id,
                    field = e.field(),
                    "review rejected"
                );
                return Err(e.into());
            }
        };
        trace_state(SubmissionState::Validated, validated.movie_id());

        let sentiment = self.classify_step(validated.content(), validated.movie_id()).await?;
        trace_state(SubmissionState::Classified, validated.movie_id());

        let movie_id = validated.movie_id().to_string();
        let review = self
            .store
            .create(NewReview::new(validated, sentiment))
            .await
            .map_err(|e| {
                tracing::warn!(
                    state = %SubmissionState::Failed,
                    movie_id = %movie_id,
                    error = %e,
                    "failed to persist review"
                );
                PipelineError::Storage(e)
            })?;

        tracing::info!(
            state = %SubmissionState::Persisted,
            movie_id = %review.movie_id,
            review_id = review.id,
            sentiment = %review.sentiment,
            "review persisted"
        );
        Ok(review)
    }

    /// All reviews for `movie_id`, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Storage`] if the store query fails.
    pub async fn list_for_movie(&self, movie_id: &str) -> Result<Vec<Review>, PipelineError> {
        self.store
            .list_by_movie(movie_id.trim())
            .await
            .map_err(PipelineError::Storage)
    }

    /// Fetch a single review.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::NotFound`] for an unknown id, or
    /// [`PipelineError::Storage`] if the store query fails.
    pub async fn get(&self, id: i64) -> Result<Review, PipelineError> {
        self.store
            .get(id)
            .await
            .map_err(|e| PipelineError::from_store(e, id))
    }

    /// Apply `patch` to review `id`.
    ///
    /// The merged fields are re-validated. Classification re-runs only when
    /// the (trimmed) content differs from what is stored; otherwise the prior
    /// sentiment and confidence are kept. An empty patch returns the stored
    /// review without writing.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::NotFound`] for an unknown id, and otherwise
    /// the same errors as [`ReviewPipeline::submit`].
    pub async fn update(&self, id: i64, patch: &ReviewPatch) -> Result<Review, PipelineError> {
        let current = self.get(id).await?;
        if patch.is_empty() {
            return Ok(current);
        }

        let validated = self.validator.validate(&current.merge(patch)).map_err(|e| {
            tracing::warn!(
                state = %SubmissionState::Rejected,
                review_id = id,
                field = e.field(),
                "review update rejected"
            );
            PipelineError::from(e)
        })?;

        let sentiment = if validated.content() == current.content {
            tracing::debug!(review_id = id, "content unchanged, keeping sentiment");
            SentimentResult {
                label: current.sentiment,
                confidence: current.confidence,
            }
        } else {
            self.classify_step(validated.content(), validated.movie_id())
                .await?
        };

        let review = self
            .store
            .update(id, ReviewChanges::new(validated, sentiment))
            .await
            .map_err(|e| PipelineError::from_store(e, id))?;

        tracing::info!(
            state = %SubmissionState::Persisted,
            review_id = id,
            sentiment = %review.sentiment,
            "review updated"
        );
        Ok(review)
    }

    /// Delete review `id`.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::NotFound`] for an unknown id, or
    /// [`PipelineError::Storage`] if the store fails.
    pub async fn delete(&self, id: i64) -> Result<(), PipelineError> {
        self.store
            .delete(id)
            .await
            .map_err(|e| PipelineError::from_store(e, id))?;
        tracing::debug!(review_id = id, "review deleted");
        Ok(())
    }

    /// Classify free text without validating or storing it.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Classification`] if the classifier fails.
    pub async fn analyze(&self, text: &str) -> Result<SentimentResult, PipelineError> {
        Ok(self.classifier.classify(text).await?)
    }

    /// Check that the store is reachable.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Storage`] if the store is unreachable.
    pub async fn ping(&self) -> Result<(), PipelineError> {
        self.store.ping().await.map_err(PipelineError::Storage)
    }

    async fn classify_step(
        &self,
        content: &str,
        movie_id: &str,
    ) -> Result<SentimentResult, PipelineError> {
        self.classifier.classify(content).await.map_err(|e| {
            tracing::warn!(
                state = %SubmissionState::Failed,
                movie_id = %movie_id,
                backend = self.classifier.backend(),
                error = %e,
                "classification failed, review not persisted"
            );
            PipelineError::Classification(e)
        })
    }
}

fn trace_state(state: SubmissionState, movie_id: &str) {
    tracing::debug!(state = %state, movie_id = %movie_id, "submission state");
}
