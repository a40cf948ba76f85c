//! Options for the offline classifier fine-tuning job.
//!
//! The job itself runs outside this workspace; this module only defines and
//! validates the configuration file it consumes, so the accepted option set
//! is explicit and typos fail loudly.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::ConfigError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FineTuneConfig {
    /// Pretrained checkpoint to start from.
    pub base_model: String,
    /// Labeled corpus identifier or path.
    pub dataset: String,
    pub output_dir: PathBuf,
    pub learning_rate: f64,
    pub batch_size: u32,
    pub num_epochs: u32,
    pub weight_decay: f64,
    /// Fraction of total steps used for linear warmup, in `[0, 1)`.
    pub warmup_ratio: f64,
    pub max_seq_length: u32,
    /// Fraction of the corpus held out for evaluation, in `(0, 1)`.
    pub eval_split: f64,
    pub seed: u64,
}

impl Default for FineTuneConfig {
    fn default() -> Self {
        Self {
            base_model: "distilbert-base-uncased".to_string(),
            dataset: "sst2".to_string(),
            output_dir: PathBuf::from("./models/sentiment"),
            learning_rate: 2e-5,
            batch_size: 16,
            num_epochs: 3,
            weight_decay: 0.01,
            warmup_ratio: 0.0,
            max_seq_length: 512,
            eval_split: 0.1,
            seed: 42,
        }
    }
}

/// Load and validate a fine-tuning configuration from a YAML file.
///
/// Options absent from the file take their defaults.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, contains unknown keys,
/// or fails validation.
pub fn load_finetune_config(path: &Path) -> Result<FineTuneConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FineTuneFileIo {
        path: path.display().to_string(),
        source: e,
    })?;
    parse_finetune_config(&content)
}

fn parse_finetune_config(content: &str) -> Result<FineTuneConfig, ConfigError> {
    let config: FineTuneConfig =
        serde_yaml::from_str(content).map_err(ConfigError::FineTuneFileParse)?;
    config.validate()?;
    Ok(config)
}

impl FineTuneConfig {
    /// Check every option against its allowed range.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] naming the first offending option.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_model.trim().is_empty() {
            return Err(ConfigError::Validation(
                "base_model must be non-empty".to_string(),
            ));
        }
        if self.dataset.trim().is_empty() {
            return Err(ConfigError::Validation(
                "dataset must be non-empty".to_string(),
            ));
        }
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(ConfigError::Validation(format!(
                "learning_rate must be a positive number, got {}",
                self.learning_rate
            )));
        }
        if self.batch_size == 0 {
            return Err(ConfigError::Validation(
                "batch_size must be greater than zero".to_string(),
            ));
        }
        if self.num_epochs == 0 {
            return Err(ConfigError::Validation(
                "num_epochs must be greater than zero".to_string(),
            ));
        }
        if !(self.weight_decay.is_finite() && self.weight_decay >= 0.0) {
            return Err(ConfigError::Validation(format!(
                "weight_decay must be non-negative, got {}",
                self.weight_decay
            )));
        }
        if !(0.0..1.0).contains(&self.warmup_ratio) {
            return Err(ConfigError::Validation(format!(
                "warmup_ratio must be in [0, 1), got {}",
                self.warmup_ratio
            )));
        }
        if self.max_seq_length == 0 {
            return Err(ConfigError::Validation(
                "max_seq_length must be greater than zero".to_string(),
            ));
        }
        if !(self.eval_split > 0.0 && self.eval_split < 1.0) {
            return Err(ConfigError::Validation(format!(
                "eval_split must be in (0, 1), got {}",
                self.eval_split
            )));
        }
        Ok(())
    }
}
