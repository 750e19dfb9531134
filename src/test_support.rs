// Shared helpers for in-process upstreams and scripted resolvers

use async_trait::async_trait;
use axum::Router;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

use crate::downloader::errors::ResolveError;
use crate::downloader::models::{MediaInfo, Platform, ResolveRequest};
use crate::downloader::traits::MediaResolver;

/// Serve `app` on an ephemeral local port
pub async fn spawn_upstream(app: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

/// Base URL of a port nothing listens on
pub async fn dead_endpoint() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

pub fn sample_info(download_url: &str) -> MediaInfo {
    MediaInfo {
        id: Some("sample".to_string()),
        title: "Sample".to_string(),
        thumbnail: None,
        duration: Some(1.0),
        platform: Platform::Generic,
        download_url: download_url.to_string(),
        ext: "mp4".to_string(),
    }
}

/// Resolver that succeeds or fails on demand and records each call
pub struct ScriptedResolver {
    name: &'static str,
    succeed: bool,
    needs_id: bool,
    log: Arc<Mutex<Vec<&'static str>>>,
}

impl ScriptedResolver {
    pub fn new(name: &'static str, succeed: bool, log: Arc<Mutex<Vec<&'static str>>>) -> Self {
        Self {
            name,
            succeed,
            needs_id: false,
            log,
        }
    }

    pub fn needing_id(mut self) -> Self {
        self.needs_id = true;
        self
    }
}

#[async_trait]
impl MediaResolver for ScriptedResolver {
    fn name(&self) -> &'static str {
        self.name
    }

    fn requires_canonical_id(&self) -> bool {
        self.needs_id
    }

    async fn resolve(&self, _request: &ResolveRequest) -> Result<MediaInfo, ResolveError> {
        self.log.lock().unwrap().push(self.name);
        if self.succeed {
            Ok(sample_info(self.name))
        } else {
            Err(ResolveError::Transport("connection refused".to_string()))
        }
    }
}
