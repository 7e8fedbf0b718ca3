mod auth;
mod config;
mod routes;

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;

use fitplan_core::catalog::PgExerciseStore;
use fitplan_core::generation::{GeminiClient, PlanGenerator};
use fitplan_core::service::WorkoutService;
use fitplan_db::pool;

use config::{ServerArgs, ServerConfig};
use routes::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = ServerArgs::parse();
    let config = ServerConfig::resolve(args)?;
    tracing::debug!(gemini = ?config.gemini, bind = %config.bind, port = config.port, "configuration resolved");

    let pool = pool::create_pool(&config.db_config).await?;
    let store = Arc::new(PgExerciseStore::new(pool));

    let gemini = GeminiClient::new(config.gemini).context("failed to build Gemini client")?;
    tracing::info!(model = %gemini.config().model, "Gemini client ready");

    let service = WorkoutService::new(store, PlanGenerator::new(Arc::new(gemini)));
    let state = AppState::new(service, &config.api_key);

    routes::run_serve(state, &config.bind, config.port).await
}
