mod reviews;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "reviewflow-cli")]
#[command(about = "Movie review ingestion and sentiment command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Apply pending database migrations
    Migrate,
    /// Validate, classify and store a new review
    Submit {
        #[arg(long)]
        movie_id: String,
        #[arg(long)]
        rating: i32,
        #[arg(long)]
        content: String,
    },
    /// List reviews for a movie, newest first
    List {
        #[arg(long)]
        movie_id: String,
    },
    /// Change the content and/or rating of a review
    Update {
        id: i64,
        #[arg(long)]
        content: Option<String>,
        #[arg(long)]
        rating: Option<i32>,
    },
    /// Delete a review
    Delete { id: i64 },
    /// Classify text without storing it
    Classify {
        text: String,
        #[command(flatten)]
        model: ModelArgs,
    },
    /// Parse and validate a fine-tuning YAML file, then print the resolved options
    FinetuneConfig { path: PathBuf },
}

/// Classifier selection for commands that do not need a database.
#[derive(Debug, Args)]
struct ModelArgs {
    /// `lexicon`, an inference server URL, or a path to a weights file
    #[arg(long, env = "MODEL_PATH", default_value = reviewflow_sentiment::LEXICON_MODEL)]
    model_path: String,
    #[arg(long, env = "CLASSIFIER_TIMEOUT_SECS", default_value_t = 30)]
    timeout_secs: u64,
    #[arg(long, env = "CLASSIFIER_MAX_TOKENS", default_value_t = 512)]
    max_tokens: usize,
}

impl ModelArgs {
    fn settings(&self) -> reviewflow_core::ClassifierSettings {
        reviewflow_core::ClassifierSettings {
            model_path: self.model_path.clone(),
            timeout_secs: self.timeout_secs,
            max_tokens: self.max_tokens,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let default_level =
        std::env::var("REVIEWFLOW_LOG_LEVEL").unwrap_or_else(|_| "warn".to_string());
    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(default_level))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Migrate => reviews::run_migrate().await,
        Commands::Submit {
            movie_id,
            rating,
            content,
        } => reviews::run_submit(movie_id, content, rating).await,
        Commands::List { movie_id } => reviews::run_list(&movie_id).await,
        Commands::Update {
            id,
            content,
            rating,
        } => reviews::run_update(id, content, rating).await,
        Commands::Delete { id } => reviews::run_delete(id).await,
        Commands::Classify { text, model } => {
            reviews::run_classify(&text, &model.settings()).await
        }
        Commands::FinetuneConfig { path } => reviews::run_finetune_config(&path),
    }
}
