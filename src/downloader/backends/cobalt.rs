// Generic backend - cobalt extraction API
//
// Handles anything the platform-specific backends could not. The API gives
// neither an id nor a thumbnail, so those are synthesized.

use async_trait::async_trait;
use rand::Rng;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;

use super::json_string;
use crate::config::PLACEHOLDER_THUMBNAIL;
use crate::downloader::errors::ResolveError;
use crate::downloader::models::{MediaInfo, Platform, ResolveRequest, DEFAULT_EXT};
use crate::downloader::traits::MediaResolver;
use crate::downloader::utils::absolute_url;

/// `status` values that mean a media URL was produced
const SUCCESS_STATUSES: &[&str] = &["stream", "redirect"];

pub struct CobaltBackend {
    name: &'static str,
    client: Client,
    endpoint: String,
    timeout: Duration,
}

impl CobaltBackend {
    pub fn new(
        name: &'static str,
        client: Client,
        endpoint: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            name,
            client,
            endpoint: endpoint.into(),
            timeout,
        }
    }

    fn payload(url: &str) -> Value {
        json!({
            "url": url,
            "vCodec": "h264",
            "vQuality": "720",
            "filenamePattern": "basic",
            "isAudioOnly": false,
        })
    }

    /// Any success status, or any body with a `url` key, counts as resolved
    fn is_success(json: &Value) -> bool {
        let status_ok = json["status"]
            .as_str()
            .map_or(false, |s| SUCCESS_STATUSES.contains(&s));

        status_ok || json.get("url").is_some()
    }

    fn parse_response(endpoint: &str, json: &Value) -> Result<MediaInfo, ResolveError> {
        if !Self::is_success(json) {
            let status = json["status"].as_str().unwrap_or("unknown");
            let text = json["text"].as_str().unwrap_or("");
            return Err(ResolveError::UpstreamStatus(format!("status {}: {}", status, text)));
        }

        let download_url = json["url"]
            .as_str()
            .and_then(|u| absolute_url(endpoint, u))
            .ok_or_else(|| ResolveError::Malformed("success without a usable url".to_string()))?;

        let correlation = rand::rng().random_range(1000..=9999);

        Ok(MediaInfo {
            id: Some(format!("dl-{}", correlation)),
            title: json_string(&json["text"])
                .unwrap_or_else(|| Platform::Generic.placeholder_title().to_string()),
            thumbnail: Some(PLACEHOLDER_THUMBNAIL.to_string()),
            duration: None,
            platform: Platform::Generic,
            download_url,
            ext: DEFAULT_EXT.to_string(),
        })
    }
}

#[async_trait]
impl MediaResolver for CobaltBackend {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn resolve(&self, request: &ResolveRequest) -> Result<MediaInfo, ResolveError> {
        let response = self
            .client
            .post(&self.endpoint)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&Self::payload(&request.url))
            .timeout(self.timeout)
            .send()
            .await?;

        let http_status = response.status();
        let json: Value = response.json().await?;

        Self::parse_response(&self.endpoint, &json).map_err(|e| match e {
            ResolveError::UpstreamStatus(msg) if !http_status.is_success() => {
                ResolveError::UpstreamStatus(format!("{} ({})", http_status, msg))
            }
            other => other,
        })
    }
}
