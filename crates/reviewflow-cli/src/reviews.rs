//! Command handlers. Database commands build the same pipeline the server uses.

use std::path::Path;
use std::sync::Arc;

use reviewflow_core::{AppConfig, ClassifierSettings, Review, ReviewDraft, ReviewPatch};
use reviewflow_db::PgReviewStore;
use reviewflow_pipeline::ReviewPipeline;

async fn connect(config: &AppConfig) -> anyhow::Result<sqlx::PgPool> {
    let pool_config = reviewflow_db::PoolConfig::from_app_config(config);
    let pool = reviewflow_db::connect_pool(&config.database_url, pool_config).await?;
    Ok(pool)
}

async fn build_pipeline() -> anyhow::Result<ReviewPipeline> {
    let config = reviewflow_core::load_app_config()?;
    let pool = connect(&config).await?;
    let classifier = reviewflow_sentiment::classifier_from_model_path(&config.classifier)?;

    Ok(ReviewPipeline::new(
        reviewflow_core::ReviewValidator::new(config.review_bounds),
        classifier,
        Arc::new(PgReviewStore::new(pool)),
    ))
}

fn print_review(review: &Review) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(review)?);
    Ok(())
}

pub(crate) async fn run_migrate() -> anyhow::Result<()> {
    let config = reviewflow_core::load_app_config()?;
    let pool = connect(&config).await?;
    let applied = reviewflow_db::run_migrations(&pool).await?;
    tracing::info!(applied, "migrations complete");
    println!("applied {applied} migration(s)");
    Ok(())
}

pub(crate) async fn run_submit(
    movie_id: String,
    content: String,
    rating: i32,
) -> anyhow::Result<()> {
    let pipeline = build_pipeline().await?;
    let review = pipeline
        .submit(&ReviewDraft {
            movie_id,
            content,
            rating,
        })
        .await?;
    tracing::info!(
        review_id = review.id,
        movie_id = %review.movie_id,
        sentiment = %review.sentiment,
        "review submitted"
    );
    print_review(&review)
}

pub(crate) async fn run_list(movie_id: &str) -> anyhow::Result<()> {
    let pipeline = build_pipeline().await?;
    let reviews = pipeline.list_for_movie(movie_id).await?;
    tracing::debug!(movie_id, count = reviews.len(), "listed reviews");

    if reviews.is_empty() {
        println!("no reviews for {movie_id}");
        return Ok(());
    }

    for review in &reviews {
        println!(
            "{}\t{}/5\t{}\t{:.3}\t{}\t{}",
            review.id,
            review.rating,
            review.sentiment,
            review.confidence,
            review.created_at.format("%Y-%m-%d %H:%M"),
            review.content
        );
    }
    Ok(())
}

pub(crate) async fn run_update(
    id: i64,
    content: Option<String>,
    rating: Option<i32>,
) -> anyhow::Result<()> {
    let patch = ReviewPatch { content, rating };
    if patch.is_empty() {
        anyhow::bail!("nothing to update; pass --content and/or --rating");
    }

    let pipeline = build_pipeline().await?;
    let review = pipeline.update(id, &patch).await?;
    tracing::info!(review_id = id, sentiment = %review.sentiment, "review updated");
    print_review(&review)
}

pub(crate) async fn run_delete(id: i64) -> anyhow::Result<()> {
    let pipeline = build_pipeline().await?;
    pipeline.delete(id).await?;
    tracing::info!(review_id = id, "review deleted");
    println!("deleted review {id}");
    Ok(())
}

pub(crate) async fn run_classify(text: &str, settings: &ClassifierSettings) -> anyhow::Result<()> {
    let classifier = reviewflow_sentiment::classifier_from_model_path(settings)?;
    let result = classifier.classify(text).await?;
    tracing::debug!(backend = classifier.backend(), label = %result.label, "classified text");
    println!("{}\t{:.4}", result.label, result.confidence);
    Ok(())
}

pub(crate) fn run_finetune_config(path: &Path) -> anyhow::Result<()> {
    let config = reviewflow_core::load_finetune_config(path)?;
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}
