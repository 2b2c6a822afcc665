use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use vidstats_core::AppConfig;
use vidstats_db::Dataset;
use vidstats_engine::{AnswerEngine, PgAnalyticsStore};
use vidstats_nlp::{LlmClassifier, LlmSynthesizer, OpenAiClient};

#[derive(Debug, Parser)]
#[command(name = "vidstats-cli")]
#[command(about = "Video statistics analytics toolbox")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Apply pending database migrations.
    Migrate,
    /// Check database connectivity.
    Ping,
    /// Load a JSON dataset of videos and their snapshots.
    Load {
        /// Path to the dataset file.
        file: PathBuf,
    },
    /// Answer one analytics question and exit.
    Ask {
        /// The question, in natural language.
        question: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = vidstats_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Migrate => migrate(&config).await,
        Commands::Ping => ping(&config).await,
        Commands::Load { file } => load(&config, &file).await,
        Commands::Ask { question } => ask(&config, &question).await,
    }
}

async fn migrate(config: &AppConfig) -> anyhow::Result<()> {
    let pool = vidstats_db::connect_pool_from_config(config).await?;
    let applied = vidstats_db::run_migrations(&pool).await?;
    println!("applied {applied} migration(s)");
    Ok(())
}

async fn ping(config: &AppConfig) -> anyhow::Result<()> {
    let pool = vidstats_db::connect_pool_from_config(config).await?;
    vidstats_db::ping(&pool).await?;
    println!("database reachable");
    Ok(())
}

async fn load(config: &AppConfig, file: &Path) -> anyhow::Result<()> {
    let raw = tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("reading {}", file.display()))?;
    let dataset = Dataset::from_json(&raw)
        .with_context(|| format!("parsing dataset {}", file.display()))?;

    let pool = vidstats_db::connect_pool_from_config(config).await?;
    let stats = vidstats_db::load_dataset(&pool, &dataset).await?;
    println!(
        "loaded {} videos and {} snapshots",
        stats.videos, stats.snapshots
    );
    Ok(())
}

async fn ask(config: &AppConfig, question: &str) -> anyhow::Result<()> {
    let api_key = config
        .openai_api_key
        .clone()
        .context("OPENAI_API_KEY is not set")?;

    let pool = vidstats_db::connect_pool_from_config(config).await?;
    let model_client = OpenAiClient::with_base_url(
        &api_key,
        &config.openai_model,
        config.openai_timeout_secs,
        &config.openai_base_url,
    )?;
    let engine = AnswerEngine::new(
        Arc::new(LlmClassifier::new(model_client.clone())),
        Arc::new(LlmSynthesizer::new(model_client)),
        Arc::new(PgAnalyticsStore::new(pool)),
    );

    println!("{}", engine.answer(question).await);
    Ok(())
}
