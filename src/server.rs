// HTTP server wiring

use axum::{routing::get, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::api;
use crate::config::ResolverConfig;
use crate::downloader::orchestrator::Cascade;
use crate::downloader::proxy::DownloadProxy;
use crate::downloader::utils::build_http_client;

/// Shared by every request; no per-request state is kept
#[derive(Clone)]
pub struct AppState {
    pub cascade: Arc<Cascade>,
    pub proxy: Arc<DownloadProxy>,
}

impl AppState {
    pub fn from_config(config: &ResolverConfig) -> Result<Self, reqwest::Error> {
        let client = build_http_client(config)?;
        Ok(Self {
            cascade: Arc::new(Cascade::from_config(config, client.clone())),
            proxy: Arc::new(DownloadProxy::new(client, config)),
        })
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(api::status))
        .route("/api/info", get(api::info))
        .route("/api/download", get(api::download))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bind `addr` and serve until the process is stopped
pub async fn run(config: ResolverConfig, addr: SocketAddr) -> anyhow::Result<()> {
    let state = AppState::from_config(&config)?;
    let listener = TcpListener::bind(addr).await?;

    tracing::info!(
        addr = %listener.local_addr()?,
        mirrors = config.stream_index_mirrors.len(),
        proxy = config.outbound_proxy.is_some(),
        "Media resolver listening"
    );

    axum::serve(listener, router(state)).await?;
    Ok(())
}
