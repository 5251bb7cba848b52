//! Command-line front end for wello.
//!
//! Answers a single query given as an argument, or one query per line from
//! stdin. Stands in for the web layer during local runs.

use std::path::PathBuf;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::EnvFilter;

use wello::{Config, RecommendationService, Secrets, WelloError};

/// Nutrition recommendations for a symptom or nutrient.
#[derive(Parser)]
#[command(name = "wello")]
#[command(version)]
#[command(about = "Cached LLM nutrition recommendations")]
struct Args {
    /// Symptom or nutrient to ask about. Reads stdin when omitted.
    query: Option<String>,

    /// Path to configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print the metrics snapshot as JSON before exiting.
    #[arg(long)]
    metrics: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("wello=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config = Config::load(args.config.as_deref())?;
    let service = build_service(&config)?;

    info!(
        model = %config.generation.model,
        strategy = ?service.strategy(),
        ttl_secs = service.ttl().as_secs(),
        "wello ready"
    );

    match args.query {
        Some(query) => answer(&service, &query).await,
        None => {
            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            while let Some(line) = lines.next_line().await? {
                answer(&service, &line).await;
            }
        }
    }

    if args.metrics {
        println!("{}", serde_json::to_string_pretty(&service.metrics())?);
    }

    Ok(())
}

/// Build a [`RecommendationService`] from configuration and secrets.
fn build_service(config: &Config) -> Result<RecommendationService, WelloError> {
    let key = Secrets::resolve_api_key()?.ok_or_else(|| {
        WelloError::Configuration(format!(
            "no API key: set {} or add api_key to ~/.wello/secrets.toml",
            wello::config::API_KEY_ENV
        ))
    })?;

    RecommendationService::from_config(config, key)
}

async fn answer(service: &RecommendationService, query: &str) {
    let recommendation = service.get_recommendation(query).await;
    let text = recommendation.display_text();
    if !text.is_empty() {
        println!("{text}\n");
    }
}
