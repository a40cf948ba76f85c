//! Structural checks applied to every review before it is classified or stored.
//!
//! Checks run in a fixed order (`movie_id`, then `content`, then `rating`) and
//! stop at the first violation. Errors are never aggregated.

use thiserror::Error;

use crate::review::ReviewDraft;

pub const DEFAULT_MIN_REVIEW_LENGTH: usize = 10;
pub const DEFAULT_MAX_REVIEW_LENGTH: usize = 2000;
pub const DEFAULT_MIN_RATING: i32 = 1;
pub const DEFAULT_MAX_RATING: i32 = 5;
pub const DEFAULT_MAX_MOVIE_ID_LENGTH: usize = 64;

/// Inclusive bounds enforced by [`ReviewValidator`].
///
/// Lengths are counted in characters, not bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReviewBounds {
    pub min_review_length: usize,
    pub max_review_length: usize,
    pub min_rating: i32,
    pub max_rating: i32,
    pub max_movie_id_length: usize,
}

impl Default for ReviewBounds {
    fn default() -> Self {
        Self {
            min_review_length: DEFAULT_MIN_REVIEW_LENGTH,
            max_review_length: DEFAULT_MAX_REVIEW_LENGTH,
            min_rating: DEFAULT_MIN_RATING,
            max_rating: DEFAULT_MAX_RATING,
            max_movie_id_length: DEFAULT_MAX_MOVIE_ID_LENGTH,
        }
    }
}

/// The first constraint a draft violated, with the offending field name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} must not be empty")]
    Empty { field: &'static str },

    #[error("{field} must be at least {min} characters, got {actual}")]
    TooShort {
        field: &'static str,
        min: usize,
        actual: usize,
    },

    #[error("{field} must be at most {max} characters, got {actual}")]
    TooLong {
        field: &'static str,
        max: usize,
        actual: usize,
    },

    #[error("{field} must be between {min} and {max}, got {actual}")]
    OutOfRange {
        field: &'static str,
        min: i32,
        max: i32,
        actual: i32,
    },
}

impl ValidationError {
    /// Name of the field that failed validation.
    #[must_use]
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::Empty { field }
            | ValidationError::TooShort { field, .. }
            | ValidationError::TooLong { field, .. }
            | ValidationError::OutOfRange { field, .. } => field,
        }
    }
}

/// A draft that passed [`ReviewValidator::validate`].
///
/// `movie_id` and `content` are stored trimmed. Fields are private so the
/// only way to obtain one is through the validator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedDraft {
    movie_id: String,
    content: String,
    rating: i32,
}

impl ValidatedDraft {
    #[must_use]
    pub fn movie_id(&self) -> &str {
        &self.movie_id
    }

    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    #[must_use]
    pub fn rating(&self) -> i32 {
        self.rating
    }

    #[must_use]
    pub fn into_parts(self) -> (String, String, i32) {
        (self.movie_id, self.content, self.rating)
    }
}

/// Pure, side-effect free review validator.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReviewValidator {
    bounds: ReviewBounds,
}

impl ReviewValidator {
    #[must_use]
    pub fn new(bounds: ReviewBounds) -> Self {
        Self { bounds }
    }

    #[must_use]
    pub fn bounds(&self) -> &ReviewBounds {
        &self.bounds
    }

    /// Validate `draft`, returning the normalized form.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] encountered, checking
    /// `movie_id`, `content` and `rating` in that order.
    pub fn validate(&self, draft: &ReviewDraft) -> Result<ValidatedDraft, ValidationError> {
        let movie_id = draft.movie_id.trim();
        if movie_id.is_empty() {
            return Err(ValidationError::Empty { field: "movie_id" });
        }
        let movie_id_len = movie_id.chars().count();
        if movie_id_len > self.bounds.max_movie_id_length {
            return Err(ValidationError::TooLong {
                field: "movie_id",
                max: self.bounds.max_movie_id_length,
                actual: movie_id_len,
            });
        }

        let content = draft.content.trim();
        let content_len = content.chars().count();
        if content_len < self.bounds.min_review_length {
            return Err(ValidationError::TooShort {
                field: "content",
                min: self.bounds.min_review_length,
                actual: content_len,
            });
        }
        if content_len > self.bounds.max_review_length {
            return Err(ValidationError::TooLong {
                field: "content",
                max: self.bounds.max_review_length,
                actual: content_len,
            });
        }

        if !(self.bounds.min_rating..=self.bounds.max_rating).contains(&draft.rating) {
            return Err(ValidationError::OutOfRange {
                field: "rating",
                min: self.bounds.min_rating,
                max: self.bounds.max_rating,
                actual: draft.rating,
            });
        }

        Ok(ValidatedDraft {
            movie_id: movie_id.to_string(),
            content: content.to_string(),
            rating: draft.rating,
        })
    }
}
