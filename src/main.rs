// src/main.rs — Aggregator entry point

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;

use aggregator::api::{self, ApiState};
use aggregator::cli::{Cli, Commands};
use aggregator::core::AggregationPipeline;
use aggregator::infra::config::Config;
use aggregator::infra::logger;
use aggregator::memory::{self, StoreHandle};
use aggregator::provider::openai_compat::OpenAICompatProvider;
use aggregator::provider::ModelProvider;

#[tokio::main]
async fn main() {
    // Pick up API_KEY / OPENROUTER_API_KEY from a local .env, if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Serving is long-running; surface its progress by default
    let level = match cli.command {
        Commands::Serve { .. } => "info",
        _ => "warn",
    };
    logger::init_logging(level);

    if let Err(e) = run(cli).await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    // Load config (falls back to defaults if no config.toml)
    let mut config = if let Some(ref path) = cli.config {
        Config::load_from(std::path::Path::new(path))?
    } else {
        Config::load()?
    };
    if let Some(ref db) = cli.db {
        config.history.db_path = Some(PathBuf::from(db));
    }

    match cli.command {
        Commands::Info => aggregator::cli::history::show_info(&config),
        Commands::Migrate { status, rollback } => {
            aggregator::cli::migrate::run_migrate(&config.history.db_path(), status, rollback)
        }
        Commands::Stats { json } => {
            let store = init_store(&config)?;
            aggregator::cli::history::show_stats(&store, json).await
        }
        Commands::History { limit, json } => {
            let store = init_store(&config)?;
            aggregator::cli::history::show_history(&store, &config, limit, json).await
        }
        Commands::Clear { yes } => {
            let store = init_store(&config)?;
            aggregator::cli::history::clear_history(&store, yes).await
        }
        Commands::Ask { question, json } => {
            let pipeline = init_pipeline(&config)?;
            aggregator::cli::ask::run_ask(&pipeline, &question.join(" "), json).await
        }
        Commands::Serve { host, port } => {
            if let Some(host) = host {
                config.api.host = host;
            }
            if let Some(port) = port {
                config.api.port = port;
            }
            let pipeline = Arc::new(init_pipeline(&config)?);
            let [first, second, judge] = pipeline.source_ids();
            tracing::info!("Sources: {first}, {second}; judge: {judge}");
            let state = ApiState::new(pipeline, &config);
            api::start_server(&config.api, state).await
        }
    }
}

/// Open the history database and start the store task.
fn init_store(config: &Config) -> anyhow::Result<StoreHandle> {
    let db_path = config.history.db_path();
    let store = memory::open(&db_path).map_err(|e| {
        anyhow::anyhow!("Could not open database {}: {e}", db_path.display())
    })?;
    tracing::debug!("History database: {}", db_path.display());
    let (handle, _join) = memory::spawn_store_server(store);
    Ok(handle)
}

fn init_pipeline(config: &Config) -> anyhow::Result<AggregationPipeline> {
    let api_key = config.provider.api_key().ok_or_else(|| {
        anyhow::anyhow!(
            "No API key found. Set {} (or API_KEY) in the environment or a .env file.",
            config.provider.api_key_env
        )
    })?;
    let provider: Arc<dyn ModelProvider> = Arc::new(OpenAICompatProvider::new(
        "openrouter",
        api_key,
        config.provider.base_url.clone(),
    ));
    let store = init_store(config)?;
    Ok(AggregationPipeline::from_config(
        provider,
        config,
        Arc::new(store),
    ))
}
