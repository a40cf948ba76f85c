use std::net::SocketAddr;

use crate::validate::ReviewBounds;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Classifier backend settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifierSettings {
    /// `lexicon`, an `http(s)://` inference server URL, or a weights file path.
    pub model_path: String,
    pub timeout_secs: u64,
    pub max_tokens: usize,
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    pub classifier: ClassifierSettings,
    pub review_bounds: ReviewBounds,
    pub rate_limit_per_minute: usize,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("database_url", &"[redacted]")
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field("classifier", &self.classifier)
            .field("review_bounds", &self.review_bounds)
            .field("rate_limit_per_minute", &self.rate_limit_per_minute)
            .finish()
    }
}
