mod poller;
mod telegram;

use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;
use vidstats_engine::{AnswerEngine, PgAnalyticsStore};
use vidstats_nlp::{LlmClassifier, LlmSynthesizer, OpenAiClient};

use crate::poller::Poller;
use crate::telegram::TelegramClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = vidstats_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let api_key = config
        .openai_api_key
        .clone()
        .context("OPENAI_API_KEY is not set")?;
    let bot_token = config
        .telegram_bot_token
        .clone()
        .context("TELEGRAM_BOT_TOKEN is not set")?;

    let pool = vidstats_db::connect_pool_from_config(&config).await?;
    let applied = vidstats_db::run_migrations(&pool).await?;
    if applied > 0 {
        tracing::info!(applied, "applied pending migrations");
    }

    let model_client = OpenAiClient::with_base_url(
        &api_key,
        &config.openai_model,
        config.openai_timeout_secs,
        &config.openai_base_url,
    )?;
    let engine = Arc::new(AnswerEngine::new(
        Arc::new(LlmClassifier::new(model_client.clone())),
        Arc::new(LlmSynthesizer::new(model_client)),
        Arc::new(PgAnalyticsStore::new(pool)),
    ));

    let telegram = TelegramClient::new(&bot_token, config.telegram_poll_timeout_secs)?;
    tracing::info!(model = %config.openai_model, "starting bot poller");

    Poller::new(telegram, engine).run(shutdown_signal()).await;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
