//! Narrative Risk Analyzer — Binary Entrypoint
//! Boots the Axum HTTP server with the analysis service, metrics and CORS.

use anyhow::Context;
use narrative_risk_analyzer::{
    api::{self, AppState},
    config::AnalysisConfig,
    metrics::Metrics,
    AnalysisService,
};
use shuttle_axum::ShuttleAxum;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Compact tracing logs; `RUST_LOG` overrides the default filter.
/// The runtime may already have installed a subscriber, in which case this is a no-op.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("narrative_risk_analyzer=info,warn"));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .try_init();
}

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();

    init_tracing();

    let config = AnalysisConfig::load_default().context("loading analysis config")?;
    info!(
        similarity_threshold = config.narrative.similarity_threshold,
        seed = config.bot.seed,
        "analysis config loaded"
    );

    let metrics = Metrics::init()?;
    let state = AppState::new(AnalysisService::new(config));
    let router = api::router_with_metrics(state, &metrics);

    Ok(router.into())
}
