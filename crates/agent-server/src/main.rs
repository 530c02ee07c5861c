//! PSU Advisor Server
//!
//! HTTP/WebSocket surface over the agent loop: dataset endpoints, a
//! blocking query endpoint, and a streaming endpoint that relays
//! progress events while a query runs.

mod handlers;
mod state;

use std::sync::Arc;

use anyhow::Context;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use agent_core::{AgentConfig, LlmProvider, ToolRegistry};
use agent_runtime::OpenRouterProvider;
use psu_advisor::{build_registry, AnalysisToolkit, GeneratorConfig, PsuDataset};

use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let data_path =
        std::env::var("PSU_DATA_PATH").unwrap_or_else(|_| "data/psu_data.csv".to_string());
    let dataset = PsuDataset::load_or_generate(&data_path, &GeneratorConfig::default())
        .with_context(|| format!("loading dataset from {data_path}"))?;
    tracing::info!(
        psus = dataset.psu_names().len(),
        sectors = dataset.sectors().len(),
        records = dataset.records().len(),
        "Dataset ready"
    );

    let toolkit = AnalysisToolkit::new(Arc::new(dataset));
    let registry: ToolRegistry = build_registry(&toolkit);

    let provider = OpenRouterProvider::from_env().context("configuring LLM provider")?;

    let mut config = AgentConfig::default();
    if let Ok(model) = std::env::var("AGENT_MODEL") {
        config.generation.model = model;
    }
    tracing::info!(model = %config.generation.model, "Agent configured");

    match provider.health_check().await {
        Ok(true) => tracing::info!("LLM provider reachable"),
        Ok(false) | Err(_) => {
            tracing::warn!("LLM provider not reachable; queries will fail until it is");
        }
    }

    let state = AppState {
        provider: Arc::new(provider),
        tools: Arc::new(registry),
        toolkit,
        config,
    };

    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods(tower_http::cors::Any)
        .allow_headers(tower_http::cors::Any);

    let app = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/api/models", get(handlers::list_models))
        .route("/api/dataset/overview", get(handlers::dataset_overview))
        .route("/api/dataset/psus", get(handlers::list_psus))
        .route("/api/dataset/sectors", get(handlers::list_sectors))
        .route("/api/query", post(handlers::query_handler))
        .route("/api/query/stream", get(handlers::query_stream_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    tracing::info!("Listening on {addr}");

    axum::serve(listener, app).await?;

    Ok(())
}
