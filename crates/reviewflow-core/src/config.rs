use std::net::SocketAddr;
use std::str::FromStr;

use crate::app_config::{AppConfig, ClassifierSettings, Environment};
use crate::validate::ReviewBounds;
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Parse `var` with its `FromStr` impl, falling back to `default` when unset.
fn parse_or<T, F>(lookup: &F, var: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    match lookup(var) {
        Ok(raw) => raw.trim().parse::<T>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        }),
        Err(_) => Ok(default),
    }
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so tests can drive it with a `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let database_url =
        lookup("DATABASE_URL").map_err(|_| ConfigError::MissingEnvVar("DATABASE_URL".into()))?;

    let env = parse_environment(&or_default("REVIEWFLOW_ENV", "development"))?;
    let bind_addr = parse_or::<SocketAddr, _>(
        &lookup,
        "REVIEWFLOW_BIND_ADDR",
        SocketAddr::from(([0, 0, 0, 0], 8000)),
    )?;
    let log_level = or_default("REVIEWFLOW_LOG_LEVEL", "info");

    let db_max_connections = parse_or(&lookup, "REVIEWFLOW_DB_MAX_CONNECTIONS", 10_u32)?;
    let db_min_connections = parse_or(&lookup, "REVIEWFLOW_DB_MIN_CONNECTIONS", 1_u32)?;
    let db_acquire_timeout_secs = parse_or(&lookup, "REVIEWFLOW_DB_ACQUIRE_TIMEOUT_SECS", 10_u64)?;

    let classifier = ClassifierSettings {
        model_path: or_default("MODEL_PATH", "lexicon"),
        timeout_secs: parse_or(&lookup, "CLASSIFIER_TIMEOUT_SECS", 30_u64)?,
        max_tokens: parse_or(&lookup, "CLASSIFIER_MAX_TOKENS", 512_usize)?,
    };
    if classifier.max_tokens == 0 {
        return Err(invalid("CLASSIFIER_MAX_TOKENS", "must be greater than zero"));
    }

    let defaults = ReviewBounds::default();
    let review_bounds = ReviewBounds {
        min_review_length: parse_or(&lookup, "MIN_REVIEW_LENGTH", defaults.min_review_length)?,
        max_review_length: parse_or(&lookup, "MAX_REVIEW_LENGTH", defaults.max_review_length)?,
        min_rating: parse_or(&lookup, "MIN_RATING", defaults.min_rating)?,
        max_rating: parse_or(&lookup, "MAX_RATING", defaults.max_rating)?,
        max_movie_id_length: parse_or(
            &lookup,
            "MAX_MOVIE_ID_LENGTH",
            defaults.max_movie_id_length,
        )?,
    };
    check_bounds(&review_bounds)?;

    let rate_limit_per_minute = parse_or(&lookup, "RATE_LIMIT_PER_MINUTE", 60_usize)?;

    Ok(AppConfig {
        database_url,
        env,
        bind_addr,
        log_level,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        classifier,
        review_bounds,
        rate_limit_per_minute,
    })
}

fn check_bounds(bounds: &ReviewBounds) -> Result<(), ConfigError> {
    if bounds.min_review_length == 0 {
        return Err(invalid("MIN_REVIEW_LENGTH", "must be at least 1"));
    }
    if bounds.min_review_length > bounds.max_review_length {
        return Err(invalid(
            "MAX_REVIEW_LENGTH",
            "must be greater than or equal to MIN_REVIEW_LENGTH",
        ));
    }
    if bounds.min_rating > bounds.max_rating {
        return Err(invalid(
            "MAX_RATING",
            "must be greater than or equal to MIN_RATING",
        ));
    }
    if bounds.max_movie_id_length == 0 {
        return Err(invalid("MAX_MOVIE_ID_LENGTH", "must be at least 1"));
    }
    Ok(())
}

fn invalid(var: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason: reason.to_string(),
    }
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "REVIEWFLOW_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
