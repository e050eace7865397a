mod config;
mod errors;
mod history;
mod llm_client;
mod matching;
mod models;
mod pipeline;
mod routes;
mod state;
mod store;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::history::loader::load_or_empty;
use crate::llm_client::{AnthropicClient, ModelClient};
use crate::matching::{EmployeeMatcher, RoleMatcher};
use crate::pipeline::PipelineCoordinator;
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::{AnalysisStore, InMemoryAnalysisStore};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Foresight API v{}", env!("CARGO_PKG_VERSION"));

    // Load the reference snapshot; the service degrades gracefully without it
    let history = Arc::new(load_or_empty(config.reference_data_path.as_deref()));
    info!(
        "Historical index ready: {} projects, {} employees",
        history.project_count(),
        history.employee_count()
    );

    // Initialize LLM client
    let model: Arc<dyn ModelClient> =
        Arc::new(AnthropicClient::new(config.anthropic_api_key.clone()));
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    // Analysis store and employee matcher
    let store: Arc<dyn AnalysisStore> = Arc::new(InMemoryAnalysisStore::new());
    let matcher: Arc<dyn RoleMatcher> = Arc::new(EmployeeMatcher::new(Arc::clone(&history)));

    // Pipeline coordinator owns the analysis lifecycle
    let coordinator = Arc::new(PipelineCoordinator::new(
        model,
        history,
        matcher,
        Arc::clone(&store),
    ));

    // Build app state
    let state = AppState {
        coordinator,
        store,
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
