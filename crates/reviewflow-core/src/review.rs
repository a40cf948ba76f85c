//! Review domain types shared by every layer.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::validate::ValidatedDraft;
use crate::CoreError;

/// Binary sentiment label produced by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Sentiment {
    Positive,
    Negative,
}

impl Sentiment {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Sentiment::Positive => "POSITIVE",
            Sentiment::Negative => "NEGATIVE",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Sentiment {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "POSITIVE" => Ok(Sentiment::Positive),
            "NEGATIVE" => Ok(Sentiment::Negative),
            other => Err(CoreError::InvalidSentiment(other.to_string())),
        }
    }
}

/// Output of one classification: the argmax label and its probability mass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SentimentResult {
    pub label: Sentiment,
    /// Probability of `label`, in `[0.5, 1.0]`.
    pub confidence: f64,
}

/// Unvalidated review payload as submitted by a caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewDraft {
    pub movie_id: String,
    pub content: String,
    pub rating: i32,
}

/// Partial update. `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewPatch {
    pub content: Option<String>,
    pub rating: Option<i32>,
}

impl ReviewPatch {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.content.is_none() && self.rating.is_none()
    }
}

/// A persisted review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub id: i64,
    pub movie_id: String,
    pub content: String,
    pub rating: i32,
    pub sentiment: Sentiment,
    pub confidence: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Review {
    /// Rebuild the draft this review would have been submitted as, with
    /// `patch` applied on top.
    #[must_use]
    pub fn merge(&self, patch: &ReviewPatch) -> ReviewDraft {
        ReviewDraft {
            movie_id: self.movie_id.clone(),
            content: patch
                .content
                .clone()
                .unwrap_or_else(|| self.content.clone()),
            rating: patch.rating.unwrap_or(self.rating),
        }
    }
}

/// A validated, classified review ready for `ReviewStore::create`.
///
/// Only constructible from a [`ValidatedDraft`], so a record can never reach
/// the store without passing validation and classification first.
#[derive(Debug, Clone, PartialEq)]
pub struct NewReview {
    draft: ValidatedDraft,
    sentiment: SentimentResult,
}

impl NewReview {
    #[must_use]
    pub fn new(draft: ValidatedDraft, sentiment: SentimentResult) -> Self {
        Self { draft, sentiment }
    }

    #[must_use]
    pub fn movie_id(&self) -> &str {
        self.draft.movie_id()
    }

    #[must_use]
    pub fn content(&self) -> &str {
        self.draft.content()
    }

    #[must_use]
    pub fn rating(&self) -> i32 {
        self.draft.rating()
    }

    #[must_use]
    pub fn sentiment(&self) -> SentimentResult {
        self.sentiment
    }
}

/// Replacement values for the mutable columns of an existing review.
///
/// `content`, `rating`, `sentiment` and `confidence` are always written
/// together so the sentiment can never drift from the content it describes.
/// Like [`NewReview`], only constructible from a [`ValidatedDraft`].
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewChanges {
    draft: ValidatedDraft,
    sentiment: SentimentResult,
}

impl ReviewChanges {
    #[must_use]
    pub fn new(draft: ValidatedDraft, sentiment: SentimentResult) -> Self {
        Self { draft, sentiment }
    }

    #[must_use]
    pub fn content(&self) -> &str {
        self.draft.content()
    }

    #[must_use]
    pub fn rating(&self) -> i32 {
        self.draft.rating()
    }

    #[must_use]
    pub fn sentiment(&self) -> SentimentResult {
        self.sentiment
    }
}
