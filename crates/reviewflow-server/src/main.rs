mod api;
mod middleware;

use std::{net::SocketAddr, sync::Arc};

use reviewflow_db::PgReviewStore;
use reviewflow_pipeline::ReviewPipeline;
use tracing_subscriber::EnvFilter;

use crate::{
    api::{build_app, AppState},
    middleware::RateLimitState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = reviewflow_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let pool_config = reviewflow_db::PoolConfig::from_app_config(&config);
    let pool = reviewflow_db::connect_pool(&config.database_url, pool_config).await?;
    let applied = reviewflow_db::run_migrations(&pool).await?;
    tracing::info!(applied, "migrations up to date");

    let classifier = reviewflow_sentiment::classifier_from_model_path(&config.classifier)?;
    let pipeline = ReviewPipeline::new(
        reviewflow_core::ReviewValidator::new(config.review_bounds),
        classifier,
        Arc::new(PgReviewStore::new(pool)),
    );

    let app = build_app(
        AppState {
            pipeline: Arc::new(pipeline),
        },
        RateLimitState::per_minute(config.rate_limit_per_minute),
    );

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, env = %config.env, "reviewflow server listening");
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
