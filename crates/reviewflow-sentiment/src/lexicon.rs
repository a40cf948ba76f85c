//! In-process logistic lexicon model for movie-review sentiment.
//!
//! Each known word contributes a fixed weight to a logit; the positive-class
//! probability is `sigmoid(bias + Σ weights)`. A negator (`not`, `never`, ...)
//! flips the sign of the next scored word. Scoring is a pure function of the
//! weights and the input, so predictions are deterministic.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use reviewflow_core::{Sentiment, SentimentResult};
use serde::Deserialize;

use crate::classifier::SentimentClassifier;
use crate::error::ClassificationError;
use crate::tokens::truncate_to_tokens;

/// Small positive prior so neutral text never lands on an exact tie.
pub(crate) const BUILTIN_BIAS: f32 = 0.1;

/// Built-in word weights, tuned for film reviews.
///
/// Keys are lowercase single words. Positive weights push toward `POSITIVE`.
pub(crate) const LEXICON: &[(&str, f32)] = &[
    // Positive signals
    ("masterpiece", 2.0),
    ("superb", 1.8),
    ("brilliant", 1.8),
    ("excellent", 1.7),
    ("outstanding", 1.7),
    ("amazing", 1.6),
    ("wonderful", 1.6),
    ("stunning", 1.5),
    ("beautiful", 1.3),
    ("beautifully", 1.3),
    ("great", 1.4),
    ("loved", 1.5),
    ("love", 1.4),
    ("best", 1.2),
    ("gripping", 1.3),
    ("moving", 1.1),
    ("powerful", 1.2),
    ("funny", 1.0),
    ("hilarious", 1.3),
    ("charming", 1.1),
    ("enjoyable", 1.2),
    ("enjoyed", 1.2),
    ("fun", 0.9),
    ("good", 1.0),
    ("solid", 0.7),
    ("fantastic", 1.6),
    ("perfect", 1.5),
    ("recommend", 1.1),
    ("memorable", 1.1),
    ("compelling", 1.2),
    ("delight", 1.3),
    ("delightful", 1.4),
    ("classic", 0.9),
    ("entertaining", 1.1),
    ("impressive", 1.2),
    ("riveting", 1.4),
    // Negative signals
    ("disappointing", -1.8),
    ("disappointed", -1.7),
    ("awful", -1.9),
    ("terrible", -1.9),
    ("horrible", -1.9),
    ("worst", -2.0),
    ("boring", -1.6),
    ("bored", -1.4),
    ("dull", -1.4),
    ("slow", -0.8),
    ("confusing", -1.2),
    ("confused", -1.0),
    ("mess", -1.4),
    ("bad", -1.4),
    ("poor", -1.3),
    ("poorly", -1.3),
    ("weak", -1.0),
    ("predictable", -0.9),
    ("forgettable", -1.2),
    ("waste", -1.8),
    ("wasted", -1.6),
    ("hate", -1.6),
    ("hated", -1.7),
    ("annoying", -1.2),
    ("pointless", -1.5),
    ("tedious", -1.5),
    ("mediocre", -1.2),
    ("overrated", -1.1),
    ("cliche", -0.9),
    ("clichéd", -0.9),
    ("unwatchable", -2.0),
    ("stupid", -1.4),
];

/// Words that invert the polarity of the next scored word.
const NEGATORS: &[&str] = &[
    "not", "no", "never", "isn't", "wasn't", "don't", "didn't", "doesn't", "hardly",
];

#[derive(Debug, Deserialize)]
struct WeightsFile {
    bias: f32,
    weights: HashMap<String, f32>,
}

/// Immutable logistic lexicon model. Shared read-only across callers.
#[derive(Debug, Clone)]
pub struct LexiconModel {
    bias: f32,
    weights: HashMap<String, f32>,
}

impl LexiconModel {
    /// The built-in movie-review lexicon.
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            bias: BUILTIN_BIAS,
            weights: LEXICON
                .iter()
                .map(|&(word, weight)| (word.to_string(), weight))
                .collect(),
        }
    }

    /// Load weights from a JSON file of the form
    /// `{"bias": 0.1, "weights": {"great": 1.4, ...}}`.
    ///
    /// # Errors
    ///
    /// Returns [`ClassificationError::ModelLoad`] if the file cannot be read,
    /// is not valid JSON of that shape, contains non-finite weights, or has
    /// keys that differ only by case.
    pub fn from_file(path: &Path) -> Result<Self, ClassificationError> {
        let model_path = path.display().to_string();
        let load_err = |reason: String| ClassificationError::ModelLoad {
            model_path: model_path.clone(),
            reason,
        };

        let raw = std::fs::read_to_string(path).map_err(|e| load_err(e.to_string()))?;
        let file: WeightsFile =
            serde_json::from_str(&raw).map_err(|e| load_err(format!("invalid weights: {e}")))?;

        if !file.bias.is_finite() || file.weights.values().any(|w| !w.is_finite()) {
            return Err(load_err("weights must be finite numbers".to_string()));
        }

        let mut weights = HashMap::with_capacity(file.weights.len());
        for (word, weight) in file.weights {
            let key = word.to_lowercase();
            if weights.insert(key, weight).is_some() {
                return Err(load_err(format!(
                    "weight for '{word}' collides with another key after lowercasing"
                )));
            }
        }

        Ok(Self {
            bias: file.bias,
            weights,
        })
    }

    #[must_use]
    pub fn vocabulary_size(&self) -> usize {
        self.weights.len()
    }

    /// Score at most `max_tokens` tokens of `text`.
    ///
    /// Exact ties resolve to [`Sentiment::Positive`].
    #[must_use]
    pub fn predict(&self, text: &str, max_tokens: usize) -> SentimentResult {
        let mut logit = f64::from(self.bias);
        let mut negate = false;

        for raw in truncate_to_tokens(text, max_tokens).split_whitespace() {
            let word = raw
                .trim_matches(|c: char| !c.is_alphabetic())
                .to_lowercase();
            if word.is_empty() {
                continue;
            }
            if NEGATORS.contains(&word.as_str()) {
                negate = true;
                continue;
            }
            if let Some(&weight) = self.weights.get(&word) {
                let weight = f64::from(weight);
                logit += if negate { -weight } else { weight };
                negate = false;
            }
        }

        let p_positive = 1.0 / (1.0 + (-logit).exp());
        if p_positive >= 0.5 {
            SentimentResult {
                label: Sentiment::Positive,
                confidence: p_positive,
            }
        } else {
            SentimentResult {
                label: Sentiment::Negative,
                confidence: 1.0 - p_positive,
            }
        }
    }
}

/// [`SentimentClassifier`] backed by a shared [`LexiconModel`].
///
/// Inference runs on tokio's blocking pool so scoring long reviews never
/// stalls the async workers.
#[derive(Debug, Clone)]
pub struct LexiconClassifier {
    model: Arc<LexiconModel>,
    max_tokens: usize,
}

impl LexiconClassifier {
    #[must_use]
    pub fn new(model: LexiconModel, max_tokens: usize) -> Self {
        Self {
            model: Arc::new(model),
            max_tokens,
        }
    }

    #[must_use]
    pub fn builtin(max_tokens: usize) -> Self {
        Self::new(LexiconModel::builtin(), max_tokens)
    }
}

#[async_trait]
impl SentimentClassifier for LexiconClassifier {
    fn backend(&self) -> &'static str {
        "lexicon"
    }

    async fn classify(&self, text: &str) -> Result<SentimentResult, ClassificationError> {
        let model = Arc::clone(&self.model);
        let max_tokens = self.max_tokens;
        let text = text.to_owned();

        tokio::task::spawn_blocking(move || model.predict(&text, max_tokens))
            .await
            .map_err(|e| ClassificationError::Inference(format!("inference task failed: {e}")))
    }
}
