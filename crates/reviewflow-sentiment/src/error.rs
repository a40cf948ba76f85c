use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClassificationError {
    /// The backend could not be constructed (unreadable or malformed weights,
    /// invalid client configuration).
    #[error("failed to load model '{model_path}': {reason}")]
    ModelLoad { model_path: String, reason: String },

    /// The inference server could not be reached or answered with a non-2xx status.
    #[error("classifier backend unavailable: {0}")]
    Unavailable(String),

    /// The backend ran but produced no usable prediction.
    #[error("inference failed: {0}")]
    Inference(String),
}
