mod config;
mod db;
mod errors;
mod models;
mod providers;
mod recommendation;
mod routes;
mod state;
mod store;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::{create_pool, ensure_schema};
use crate::providers::build_providers;
use crate::recommendation::Orchestrator;
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::{AssessmentStore, MemoryStore, PgAssessmentStore};

/// Only bounds connection setup; the orchestrator enforces the per-attempt deadline.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("pathway_api={}", &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Pathway API v{}", env!("CARGO_PKG_VERSION"));

    // Storage: Postgres when configured, otherwise process memory
    let store: Arc<dyn AssessmentStore> = match &config.database_url {
        Some(url) => {
            let db = create_pool(url).await?;
            ensure_schema(&db).await?;
            Arc::new(PgAssessmentStore::new(db))
        }
        None => {
            warn!("DATABASE_URL not set, assessments are kept in memory only");
            Arc::new(MemoryStore::new())
        }
    };

    // Providers share one HTTP client
    let client = reqwest::Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .build()
        .context("Failed to build HTTP client")?;
    let providers = build_providers(&config, client);
    let orchestrator = Orchestrator::new(
        providers,
        config.provider_timeout,
        config.synthesizer_seed,
    );

    let active = orchestrator.active_providers();
    if active.is_empty() {
        warn!("No provider API keys configured, every recommendation will be rule-based");
    } else {
        info!(
            "Provider chain: {} (timeout {}s)",
            active.join(" -> "),
            config.provider_timeout.as_secs()
        );
    }

    // Build app state
    let state = AppState {
        store,
        orchestrator: Arc::new(orchestrator),
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
