//! HTTP request handlers for the Recroute API

use axum::{
    Router as AxumRouter,
    routing::{get, post},
};
use std::sync::Arc;
use std::time::Duration;

use crate::catalog::Catalog;
use crate::client::bedrock::BedrockBackend;
use crate::client::openai::{OpenAiBackend, resolve_api_key};
use crate::client::{ModelBackend, ModelClient};
use crate::config::{BackendKind, Config};
use crate::error::{AppError, AppResult};
use crate::router::Router;

pub mod health;
pub mod recommend;

/// Application state shared across all handlers
///
/// Holds the configuration and the router with its model routing table.
/// Built once at startup; all fields are Arc'd for cheap cloning across
/// Axum handlers.
#[derive(Clone)]
pub struct AppState {
    config: Arc<Config>,
    router: Arc<Router>,
}

impl AppState {
    /// Build application state from validated configuration
    ///
    /// Constructs one model client per `[[backends]]` entry. Fails if an
    /// OpenAI backend has no resolvable API key.
    pub fn new(config: Arc<Config>) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.server.request_timeout_seconds))
            .build()
            .map_err(|e| AppError::Internal(format!("failed to build HTTP client: {e}")))?;

        let mut clients = Vec::with_capacity(config.backends.len());
        for entry in &config.backends {
            let backend: Arc<dyn ModelBackend> = match entry.kind {
                BackendKind::Bedrock => Arc::new(BedrockBackend::new(
                    entry.model_key.clone(),
                    entry.base_url.clone(),
                    config.generation,
                    http.clone(),
                )),
                BackendKind::Openai => {
                    let api_key =
                        resolve_api_key(entry.api_key_env.as_deref(), entry.api_key_file.as_deref())
                        .map_err(|e| AppError::Config(format!("{}: {e}", entry.model_id)))?;
                    Arc::new(OpenAiBackend::new(
                        entry.model_key.clone(),
                        entry.base_url.clone(),
                        api_key,
                        config.generation,
                        http.clone(),
                    ))
                }
            };
            clients.push((entry.model_id.clone(), Arc::new(ModelClient::new(backend))));
        }

        let router = Arc::new(Router::new(Arc::new(Catalog::builtin()), clients));

        Ok(Self { config, router })
    }

    /// Get reference to the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get reference to the request router
    pub fn router(&self) -> &Router {
        &self.router
    }
}

/// Build the application's route tree
pub fn app(state: AppState) -> AxumRouter {
    AxumRouter::new()
        .route("/recommend", post(recommend::handler))
        .route("/health", get(health::handler))
        .layer(axum::middleware::from_fn(
            crate::middleware::request_id_middleware,
        ))
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(state)
}
