//! Sentiment classification for movie reviews.
//!
//! Exposes the [`SentimentClassifier`] seam used by the review pipeline and
//! two backends: an in-process lexicon model and a client for a remote Text
//! Embeddings Inference (TEI) server hosting a sequence-classification model.
//! [`classifier_from_model_path`] picks one from the `MODEL_PATH` setting.

pub mod classifier;
pub mod error;
pub mod lexicon;
pub mod tei;
pub mod tokens;

pub use classifier::{classifier_from_model_path, SentimentClassifier, LEXICON_MODEL};
pub use error::ClassificationError;
pub use lexicon::{LexiconClassifier, LexiconModel};
pub use tei::TeiClassifier;
pub use tokens::truncate_to_tokens;
