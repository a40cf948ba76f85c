//! Offline unit tests for reviewflow-db pool configuration and row types.
//! These tests do not require a live database connection.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use chrono::Utc;
use reviewflow_core::{AppConfig, ClassifierSettings, Environment, Review, ReviewBounds};
use reviewflow_db::{PoolConfig, ReviewRow};

#[test]
fn pool_config_from_app_config_uses_core_values() {
    let app_config = AppConfig {
        database_url: "postgres://example".to_string(),
        env: Environment::Test,
        bind_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 8000),
        log_level: "info".to_string(),
        db_max_connections: 42,
        db_min_connections: 7,
        db_acquire_timeout_secs: 9,
        classifier: ClassifierSettings {
            model_path: "lexicon".to_string(),
            timeout_secs: 30,
            max_tokens: 512,
        },
        review_bounds: ReviewBounds::default(),
        rate_limit_per_minute: 60,
    };

    let pool_config = PoolConfig::from_app_config(&app_config);
    assert_eq!(pool_config.max_connections, 42);
    assert_eq!(pool_config.min_connections, 7);
    assert_eq!(pool_config.acquire_timeout_secs, 9);
}

/// Compile-time smoke test: confirm that [`ReviewRow`] has all expected
/// fields with the correct types and converts into a [`Review`].
#[test]
fn review_row_has_expected_fields() {
    let row = ReviewRow {
        id: 1_i64,
        movie_id: "tt0111161".to_string(),
        content: "Get busy living or get busy dying.".to_string(),
        rating: 5_i32,
        sentiment: "POSITIVE".to_string(),
        confidence: 0.97_f64,
        created_at: Utc::now(),
        updated_at: None,
    };

    let review = Review::try_from(row).expect("row converts");
    assert_eq!(review.id, 1);
    assert_eq!(review.movie_id, "tt0111161");
    assert_eq!(review.rating, 5);
    assert!(review.updated_at.is_none());
}
