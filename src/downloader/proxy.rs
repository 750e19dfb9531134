// Download relay - streams a resolved media URL back to the client
//
// Bytes are passed through untouched in fixed-size chunks, so memory stays at
// one chunk per transfer regardless of file size.

use bytes::{Bytes, BytesMut};
use futures::stream::{self, BoxStream};
use futures::{Stream, StreamExt, TryStreamExt};
use regex::Regex;
use reqwest::header::{CONTENT_TYPE, REFERER};
use reqwest::Client;
use std::io;
use std::time::Duration;

use super::errors::ProxyError;
use super::models::DownloadRequest;
use super::utils::is_http_url;
use crate::config::ResolverConfig;

pub const DEFAULT_CONTENT_TYPE: &str = "video/mp4";
const MAX_TITLE_CHARS: usize = 100;

lazy_static::lazy_static! {
    // Letters, numbers, `_`, `-`, `.` and space survive; marks do not.
    static ref UNSAFE_FILENAME_CHAR: Regex = Regex::new(r"[^\p{L}\p{N}_\-. ]").unwrap();
}

/// Upstream response ready to be relayed
pub struct ProxiedDownload {
    pub content_type: String,
    pub content_disposition: String,
    pub body: BoxStream<'static, io::Result<Bytes>>,
}

pub struct DownloadProxy {
    client: Client,
    referer: Option<String>,
    timeout: Duration,
    chunk_size: usize,
}

impl DownloadProxy {
    pub fn new(client: Client, config: &ResolverConfig) -> Self {
        Self {
            client,
            referer: config.referer.clone(),
            timeout: config.download_timeout,
            chunk_size: config.chunk_size.max(1),
        }
    }

    /// Open the upstream stream and prepare response headers
    pub async fn proxy_download(
        &self,
        request: &DownloadRequest,
    ) -> Result<ProxiedDownload, ProxyError> {
        if !is_http_url(&request.source_url) {
            return Err(ProxyError::InvalidInput("source must be an http(s) url".to_string()));
        }

        let mut upstream = self.client.get(&request.source_url);
        if let Some(referer) = &self.referer {
            upstream = upstream.header(REFERER, referer);
        }

        let response = tokio::time::timeout(self.timeout, upstream.send())
            .await
            .map_err(|_| {
                ProxyError::Transport(format!("no response within {}s", self.timeout.as_secs()))
            })??;

        let status = response.status();
        if !status.is_success() {
            return Err(ProxyError::UpstreamStatus(status));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .unwrap_or(DEFAULT_CONTENT_TYPE)
            .to_string();

        tracing::info!(
            title = %request.display_title,
            %content_type,
            length = response.content_length(),
            "Relaying download"
        );

        let upstream = response.bytes_stream().map_err(io::Error::other).boxed();
        let body = relay_chunks(upstream, self.chunk_size, self.timeout)
            .inspect_err(|e| tracing::error!("Download relay aborted: {}", e))
            .boxed();

        Ok(ProxiedDownload {
            content_type,
            content_disposition: content_disposition(&request.display_title, &request.extension),
            body,
        })
    }
}

/// Regroup upstream pieces into chunks of exactly `chunk_size` bytes (the last may be shorter)
///
/// `stall` bounds the wait for each upstream piece, not for a whole chunk, so a
/// slow transfer survives as long as bytes keep arriving. A silent upstream
/// ends the stream with a `TimedOut` error.
fn relay_chunks<S>(
    upstream: S,
    chunk_size: usize,
    stall: Duration,
) -> impl Stream<Item = io::Result<Bytes>> + Send + 'static
where
    S: Stream<Item = io::Result<Bytes>> + Unpin + Send + 'static,
{
    let relay = Relay {
        upstream,
        pending: BytesMut::with_capacity(chunk_size),
        chunk_size,
        stall,
        finished: false,
    };
    stream::try_unfold(relay, next_chunk)
}

struct Relay<S> {
    upstream: S,
    pending: BytesMut,
    chunk_size: usize,
    stall: Duration,
    finished: bool,
}

async fn next_chunk<S>(mut relay: Relay<S>) -> io::Result<Option<(Bytes, Relay<S>)>>
where
    S: Stream<Item = io::Result<Bytes>> + Unpin,
{
    loop {
        if relay.pending.len() >= relay.chunk_size {
            let chunk = relay.pending.split_to(relay.chunk_size).freeze();
            return Ok(Some((chunk, relay)));
        }
        if relay.finished {
            if relay.pending.is_empty() {
                return Ok(None);
            }
            let chunk = relay.pending.split().freeze();
            return Ok(Some((chunk, relay)));
        }

        match tokio::time::timeout(relay.stall, relay.upstream.next()).await {
            Ok(Some(piece)) => relay.pending.extend_from_slice(&piece?),
            Ok(None) => relay.finished = true,
            Err(_) => {
                return Err(io::Error::new(io::ErrorKind::TimedOut, "upstream stalled"));
            }
        }
    }
}

/// Replace anything but letters, numbers, `-`, `_`, `.` and space, cap at 100 chars
pub fn sanitize_filename(title: &str, extension: &str) -> String {
    let clean: String = UNSAFE_FILENAME_CHAR
        .replace_all(title, "_")
        .chars()
        .take(MAX_TITLE_CHARS)
        .collect();

    format!("{}.{}", clean, extension)
}

/// RFC 5987 attachment header for the sanitized filename
pub fn content_disposition(title: &str, extension: &str) -> String {
    format!(
        "attachment; filename*=UTF-8''{}",
        urlencoding::encode(&sanitize_filename(title, extension))
    )
}
