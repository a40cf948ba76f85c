use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use reviewflow_core::{ClassifierSettings, SentimentResult};

use crate::error::ClassificationError;
use crate::lexicon::{LexiconClassifier, LexiconModel};
use crate::tei::TeiClassifier;

/// `MODEL_PATH` value selecting the built-in lexicon model.
pub const LEXICON_MODEL: &str = "lexicon";

/// Binary sentiment classifier.
///
/// Implementations must be deterministic for a fixed model and input, must
/// silently truncate input beyond their token budget, and must be safe to
/// call concurrently through a shared reference.
#[async_trait]
pub trait SentimentClassifier: Send + Sync {
    /// Short backend name for logs.
    fn backend(&self) -> &'static str;

    /// Classify `text` as positive or negative.
    ///
    /// # Errors
    ///
    /// Returns [`ClassificationError`] if the backend is unavailable or its
    /// output cannot be interpreted.
    async fn classify(&self, text: &str) -> Result<SentimentResult, ClassificationError>;
}

/// Build the classifier selected by `settings.model_path`.
///
/// - `lexicon` selects the built-in lexicon model.
/// - `http://` or `https://` URLs select a remote TEI server.
/// - anything else is read as a path to a JSON weights file.
///
/// The returned handle is meant to be built once and shared.
///
/// # Errors
///
/// Returns [`ClassificationError::ModelLoad`] if the backend cannot be built.
pub fn classifier_from_model_path(
    settings: &ClassifierSettings,
) -> Result<Arc<dyn SentimentClassifier>, ClassificationError> {
    let model_path = settings.model_path.trim();

    if model_path.eq_ignore_ascii_case(LEXICON_MODEL) {
        tracing::info!(backend = "lexicon", "using built-in lexicon sentiment model");
        return Ok(Arc::new(LexiconClassifier::builtin(settings.max_tokens)));
    }

    if model_path.starts_with("http://") || model_path.starts_with("https://") {
        tracing::info!(backend = "tei", url = model_path, "using remote sentiment model");
        let client = TeiClassifier::new(model_path, settings.timeout_secs, settings.max_tokens)?;
        return Ok(Arc::new(client));
    }

    let model = LexiconModel::from_file(Path::new(model_path))?;
    tracing::info!(
        backend = "lexicon",
        path = model_path,
        vocabulary = model.vocabulary_size(),
        "loaded sentiment weights from file"
    );
    Ok(Arc::new(LexiconClassifier::new(model, settings.max_tokens)))
}
