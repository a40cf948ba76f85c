//! Client for a TEI (Text Embeddings Inference) server hosting a
//! sequence-classification model, e.g. an SST-2 fine-tuned DistilBERT.

use std::time::Duration;

use async_trait::async_trait;
use reviewflow_core::{Sentiment, SentimentResult};
use serde::{Deserialize, Serialize};

use crate::classifier::SentimentClassifier;
use crate::error::ClassificationError;
use crate::tokens::truncate_to_tokens;

/// TEI HTTP client for the `/predict` endpoint.
#[derive(Debug, Clone)]
pub struct TeiClassifier {
    client: reqwest::Client,
    url: String,
    max_tokens: usize,
}

#[derive(Serialize)]
struct PredictRequest<'a> {
    inputs: &'a str,
    truncate: bool,
}

#[derive(Debug, Deserialize)]
struct Prediction {
    label: String,
    score: f64,
}

/// TEI answers a single input with a flat list, and some deployments wrap it
/// in a one-element batch.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PredictResponse {
    Single(Vec<Prediction>),
    Batch(Vec<Vec<Prediction>>),
}

impl TeiClassifier {
    /// Create a client for the TEI server at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`ClassificationError::ModelLoad`] if the HTTP client cannot be
    /// constructed.
    pub fn new(
        base_url: &str,
        timeout_secs: u64,
        max_tokens: usize,
    ) -> Result<Self, ClassificationError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("reviewflow/0.1 (sentiment)")
            .build()
            .map_err(|e| ClassificationError::ModelLoad {
                model_path: base_url.to_string(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            client,
            url: format!("{}/predict", base_url.trim_end_matches('/')),
            max_tokens,
        })
    }
}

#[async_trait]
impl SentimentClassifier for TeiClassifier {
    fn backend(&self) -> &'static str {
        "tei"
    }

    async fn classify(&self, text: &str) -> Result<SentimentResult, ClassificationError> {
        let request = PredictRequest {
            inputs: truncate_to_tokens(text, self.max_tokens),
            truncate: true,
        };

        let response = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| ClassificationError::Unavailable(format!("TEI request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(ClassificationError::Unavailable(format!(
                "TEI returned status {}",
                response.status()
            )));
        }

        let body: PredictResponse = response
            .json()
            .await
            .map_err(|e| ClassificationError::Inference(format!("TEI response parse error: {e}")))?;

        let predictions = match body {
            PredictResponse::Single(p) => p,
            PredictResponse::Batch(mut batch) => {
                if batch.len() != 1 {
                    return Err(ClassificationError::Inference(format!(
                        "TEI returned {} predictions for 1 input",
                        batch.len()
                    )));
                }
                batch.remove(0)
            }
        };

        resolve_binary(&predictions)
    }
}

fn parse_label(label: &str) -> Option<Sentiment> {
    match label.to_ascii_uppercase().as_str() {
        "POSITIVE" | "POS" | "LABEL_1" => Some(Sentiment::Positive),
        "NEGATIVE" | "NEG" | "LABEL_0" => Some(Sentiment::Negative),
        _ => None,
    }
}

/// Reduce per-label scores to the argmax label and its probability.
///
/// When both classes are reported their scores are renormalised to sum to 1.
/// When only one class is reported the other is taken as its complement.
/// Exact ties resolve to [`Sentiment::Positive`].
fn resolve_binary(predictions: &[Prediction]) -> Result<SentimentResult, ClassificationError> {
    let mut positive = None;
    let mut negative = None;

    for p in predictions {
        if !(p.score.is_finite() && (0.0..=1.0).contains(&p.score)) {
            return Err(ClassificationError::Inference(format!(
                "score {} for label '{}' is outside [0, 1]",
                p.score, p.label
            )));
        }
        let slot = match parse_label(&p.label) {
            Some(Sentiment::Positive) => &mut positive,
            Some(Sentiment::Negative) => &mut negative,
            None => {
                return Err(ClassificationError::Inference(format!(
                    "unexpected label '{}'",
                    p.label
                )))
            }
        };
        if slot.replace(p.score).is_some() {
            return Err(ClassificationError::Inference(format!(
                "label '{}' reported more than once",
                p.label
            )));
        }
    }

    let (p_pos, p_neg) = match (positive, negative) {
        (Some(pos), Some(neg)) => {
            let total = pos + neg;
            if total <= 0.0 {
                return Err(ClassificationError::Inference(
                    "TEI scores sum to zero".to_string(),
                ));
            }
            (pos / total, neg / total)
        }
        (Some(pos), None) => (pos, 1.0 - pos),
        (None, Some(neg)) => (1.0 - neg, neg),
        (None, None) => {
            return Err(ClassificationError::Inference(
                "TEI returned no predictions".to_string(),
            ))
        }
    };

    Ok(if p_pos >= p_neg {
        SentimentResult {
            label: Sentiment::Positive,
            confidence: p_pos,
        }
    } else {
        SentimentResult {
            label: Sentiment::Negative,
            confidence: p_neg,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prediction(label: &str, score: f64) -> Prediction {
        Prediction {
            label: label.to_string(),
            score,
        }
    }

    #[test]
    fn picks_argmax_label() {
        let result = resolve_binary(&[
            prediction("NEGATIVE", 0.97),
            prediction("POSITIVE", 0.03),
        ])
        .expect("resolve");
        assert_eq!(result.label, Sentiment::Negative);
        assert!((result.confidence - 0.97).abs() < 1e-9);
    }

    #[test]
    fn generic_label_names_are_mapped() {
        let result = resolve_binary(&[prediction("LABEL_1", 0.8), prediction("LABEL_0", 0.2)])
            .expect("resolve");
        assert_eq!(result.label, Sentiment::Positive);
    }

    #[test]
    fn single_low_score_implies_other_class() {
        let result = resolve_binary(&[prediction("positive", 0.1)]).expect("resolve");
        assert_eq!(result.label, Sentiment::Negative);
        assert!((result.confidence - 0.9).abs() < 1e-9);
    }

    #[test]
    fn tie_resolves_positive() {
        let result = resolve_binary(&[prediction("POSITIVE", 0.5), prediction("NEGATIVE", 0.5)])
            .expect("resolve");
        assert_eq!(result.label, Sentiment::Positive);
    }

    #[test]
    fn unknown_label_is_inference_error() {
        let err = resolve_binary(&[prediction("NEUTRAL", 0.9)]).unwrap_err();
        assert!(matches!(err, ClassificationError::Inference(ref m) if m.contains("NEUTRAL")));
    }

    #[test]
    fn out_of_range_score_is_inference_error() {
        let err = resolve_binary(&[prediction("POSITIVE", 1.5)]).unwrap_err();
        assert!(matches!(err, ClassificationError::Inference(_)));
    }

    #[test]
    fn unnormalised_scores_are_renormalised() {
        let result = resolve_binary(&[prediction("POSITIVE", 0.3), prediction("NEGATIVE", 0.2)])
            .expect("resolve");
        assert_eq!(result.label, Sentiment::Positive);
        assert!((result.confidence - 0.6).abs() < 1e-9);
    }

    #[test]
    fn repeated_label_is_inference_error() {
        let err = resolve_binary(&[prediction("POSITIVE", 0.9), prediction("POS", 0.2)])
            .unwrap_err();
        assert!(
            matches!(err, ClassificationError::Inference(ref m) if m.contains("more than once")),
            "got {err:?}"
        );
    }

    #[test]
    fn zero_total_is_inference_error() {
        let err = resolve_binary(&[prediction("POSITIVE", 0.0), prediction("NEGATIVE", 0.0)])
            .unwrap_err();
        assert!(matches!(err, ClassificationError::Inference(_)), "got {err:?}");
    }

    #[test]
    fn empty_output_is_inference_error() {
        assert!(matches!(
            resolve_binary(&[]),
            Err(ClassificationError::Inference(_))
        ));
    }
}
