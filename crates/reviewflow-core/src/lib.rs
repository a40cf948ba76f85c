pub mod app_config;
pub mod config;
pub mod finetune;
pub mod review;
pub mod validate;

pub use app_config::{AppConfig, ClassifierSettings, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use finetune::{load_finetune_config, FineTuneConfig};
pub use review::{
    NewReview, Review, ReviewChanges, ReviewDraft, ReviewPatch, Sentiment, SentimentResult,
};
pub use validate::{ReviewBounds, ReviewValidator, ValidatedDraft, ValidationError};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid sentiment label: {0}")]
    InvalidSentiment(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read fine-tune config at {path}: {source}")]
    FineTuneFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse fine-tune config: {0}")]
    FineTuneFileParse(#[source] serde_yaml::Error),

    #[error("fine-tune config validation failed: {0}")]
    Validation(String),
}
