//! HTTP API channel (axum).
//!
//! ```text
//! GET  /                    → {"Hello": "World"}
//! POST /gaou/{parametre}    → PersonDescriptor extracted from `parametre`
//! GET  /docs                → API reference page
//! GET  /docs/openapi.json   → OpenAPI 3.1 document
//! ```
//!
//! The shutdown token is wired to axum's graceful shutdown.

mod api;
mod docs;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::config::HttpConfig;
use crate::error::AppError;
use crate::extract::LlmAdapter;
use crate::llm::ModelId;
use crate::subsystems::runtime::{Component, ComponentFuture};

// ── Shared request state ──────────────────────────────────────────────────────

/// Router state injected into every handler. Cheap to clone.
#[derive(Clone)]
pub struct ApiState {
    pub adapter: Arc<LlmAdapter>,
    /// Model used for `POST /gaou/{parametre}`.
    pub model: ModelId,
    /// Put the adapter error text in 500 bodies.
    pub debug: bool,
}

impl ApiState {
    pub fn new(adapter: Arc<LlmAdapter>, config: &HttpConfig) -> Self {
        Self { adapter, model: config.model, debug: config.debug }
    }
}

// ── HttpChannel ───────────────────────────────────────────────────────────────

pub struct HttpChannel {
    channel_id: String,
    bind_addr: String,
    state: ApiState,
}

impl HttpChannel {
    pub fn new(channel_id: impl Into<String>, bind_addr: impl Into<String>, state: ApiState) -> Self {
        Self { channel_id: channel_id.into(), bind_addr: bind_addr.into(), state }
    }
}

impl Component for HttpChannel {
    fn id(&self) -> &str {
        &self.channel_id
    }

    fn run(self: Box<Self>, shutdown: CancellationToken) -> ComponentFuture {
        Box::pin(run_http(self.channel_id, self.bind_addr, self.state, shutdown))
    }
}

async fn run_http(
    channel_id: String,
    bind_addr: String,
    state: ApiState,
    shutdown: CancellationToken,
) -> Result<(), AppError> {
    let router = build_router(state);

    let listener = TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| AppError::Http(format!("bind failed on {bind_addr}: {e}")))?;

    info!(%channel_id, %bind_addr, "http channel listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .map_err(|e| AppError::Http(format!("server error: {e}")))?;

    info!(%channel_id, "http channel shut down");
    Ok(())
}

// ── Router ────────────────────────────────────────────────────────────────────

pub fn build_router(state: ApiState) -> Router {
    Router::new()
        .route("/",                  get(api::root))
        .route("/gaou/{parametre}",  post(api::create_gaou))
        .route("/docs",              get(docs::page))
        .route("/docs/openapi.json", get(docs::openapi))
        .with_state(state)
}
