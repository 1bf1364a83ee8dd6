// src/api/mod.rs — HTTP API in front of the aggregation pipeline

pub mod handlers;
pub mod types;

use axum::http::HeaderValue;
use axum::routing::{delete, get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::core::AggregationPipeline;
use crate::infra::config::{ApiConfig, Config, HistoryConfig};
pub use types::{AskRequest, AskResponse};

/// Shared state for API handlers.
#[derive(Clone)]
pub struct ApiState {
    pub pipeline: Arc<AggregationPipeline>,
    pub history: HistoryConfig,
    pub info: Arc<types::InfoResponse>,
}

impl ApiState {
    pub fn new(pipeline: Arc<AggregationPipeline>, config: &Config) -> Self {
        Self {
            pipeline,
            history: config.history.clone(),
            info: Arc::new(types::InfoResponse::new(config.available_models())),
        }
    }
}

/// Build the axum router with all API routes.
pub fn build_router(state: ApiState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin([
            HeaderValue::from_static("http://localhost:8501"),
            HeaderValue::from_static("http://127.0.0.1:8501"),
            HeaderValue::from_static("http://localhost:3000"),
            HeaderValue::from_static("http://127.0.0.1:3000"),
        ])
        .allow_methods(tower_http::cors::Any)
        .allow_headers(tower_http::cors::Any);

    Router::new()
        .route("/ask", post(handlers::ask))
        .route("/stats", get(handlers::stats))
        .route("/history", get(handlers::history))
        .route("/clear", delete(handlers::clear))
        .route("/info", get(handlers::info))
        .route("/health", get(handlers::health))
        .layer(cors)
        .with_state(state)
}

/// Start the API server and serve until Ctrl-C.
pub async fn start_server(config: &ApiConfig, state: ApiState) -> anyhow::Result<()> {
    let addr = format!("{}:{}", config.host, config.port);

    let router = build_router(state);

    tracing::info!("API server listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("Shutting down API server");
            }
        })
        .await?;
    Ok(())
}
