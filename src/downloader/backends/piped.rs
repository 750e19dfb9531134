// Stream-index backend - Piped API
//
// Piped instances are independently hosted mirrors of the same API, so this
// backend resolves against one given mirror and is wrapped in an
// InstanceRotator to walk the configured list.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::Duration;

use super::json_seconds;
use crate::downloader::errors::ResolveError;
use crate::downloader::format_selector::FormatSelector;
use crate::downloader::models::{CandidateStream, MediaInfo, Platform, ResolveRequest, DEFAULT_EXT};
use crate::downloader::traits::MirroredBackend;
use crate::downloader::utils::absolute_url;

pub struct PipedBackend {
    client: Client,
    timeout: Duration,
}

impl PipedBackend {
    pub fn new(client: Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    fn streams_url(endpoint: &str, video_id: &str) -> String {
        format!("{}/streams/{}", endpoint.trim_end_matches('/'), video_id)
    }

    /// Pick a stream from a `/streams/{id}` body and map it onto `MediaInfo`
    fn parse_streams(
        endpoint: &str,
        video_id: &str,
        json: &Value,
    ) -> Result<MediaInfo, ResolveError> {
        if let Some(error) = json.get("error").filter(|e| !e.is_null()) {
            let message = error.as_str().map(str::to_string).unwrap_or_else(|| error.to_string());
            return Err(ResolveError::UpstreamStatus(message));
        }

        let candidates: Vec<CandidateStream> = match json.get("videoStreams") {
            Some(Value::Null) | None => Vec::new(),
            Some(streams) => serde_json::from_value(streams.clone())?,
        };

        let best = FormatSelector::select_best(&candidates).ok_or(ResolveError::NoCandidate)?;
        let download_url = absolute_url(endpoint, &best.url).ok_or(ResolveError::NoCandidate)?;

        Ok(MediaInfo {
            id: Some(video_id.to_string()),
            title: json["title"]
                .as_str()
                .filter(|t| !t.trim().is_empty())
                .unwrap_or(Platform::StreamIndexed.placeholder_title())
                .to_string(),
            thumbnail: json["thumbnailUrl"].as_str().map(str::to_string),
            duration: json_seconds(&json["duration"]),
            platform: Platform::StreamIndexed,
            download_url,
            ext: DEFAULT_EXT.to_string(),
        })
    }
}

#[async_trait]
impl MirroredBackend for PipedBackend {
    fn name(&self) -> &'static str {
        "piped"
    }

    fn requires_canonical_id(&self) -> bool {
        true
    }

    async fn resolve_at(
        &self,
        endpoint: &str,
        request: &ResolveRequest,
    ) -> Result<MediaInfo, ResolveError> {
        let video_id = request
            .canonical_id
            .as_deref()
            .ok_or_else(|| ResolveError::InvalidInput("no video id in url".to_string()))?;

        let response = self
            .client
            .get(Self::streams_url(endpoint, video_id))
            .timeout(self.timeout)
            .send()
            .await?;

        if response.status() != StatusCode::OK {
            return Err(ResolveError::UpstreamStatus(response.status().to_string()));
        }

        let json: Value = response.json().await?;
        Self::parse_streams(endpoint, video_id, &json)
    }
}
