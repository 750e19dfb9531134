// Short-form backend - TikWM extraction API
//
// One POST with the raw URL. The HTTP status says little; success is
// `code == 0` in the body.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

use super::{json_seconds, json_string};
use crate::config::ResolverConfig;
use crate::downloader::errors::ResolveError;
use crate::downloader::models::{MediaInfo, Platform, ResolveRequest, DEFAULT_EXT};
use crate::downloader::traits::MediaResolver;
use crate::downloader::utils::absolute_url;

pub struct TikwmBackend {
    client: Client,
    endpoint: String,
    timeout: Duration,
}

impl TikwmBackend {
    pub fn new(client: Client, config: &ResolverConfig) -> Self {
        Self {
            client,
            endpoint: config.short_form_endpoint.clone(),
            timeout: config.short_form_timeout,
        }
    }

    /// Map a TikWM body onto `MediaInfo`
    fn parse_response(endpoint: &str, json: &Value) -> Result<MediaInfo, ResolveError> {
        match json["code"].as_i64() {
            Some(0) => {}
            Some(code) => {
                let msg = json["msg"].as_str().unwrap_or("no message");
                return Err(ResolveError::UpstreamStatus(format!("code {}: {}", code, msg)));
            }
            None => return Err(ResolveError::Malformed("missing code field".to_string())),
        }

        let data = &json["data"];
        if !data.is_object() {
            return Err(ResolveError::Malformed("missing data object".to_string()));
        }

        let download_url = data["play"]
            .as_str()
            .and_then(|play| absolute_url(endpoint, play))
            .ok_or_else(|| ResolveError::Malformed("missing play url".to_string()))?;

        Ok(MediaInfo {
            id: json_string(&data["id"]),
            title: json_string(&data["title"])
                .unwrap_or_else(|| Platform::ShortForm.placeholder_title().to_string()),
            thumbnail: data["cover"].as_str().and_then(|c| absolute_url(endpoint, c)),
            duration: json_seconds(&data["duration"]),
            platform: Platform::ShortForm,
            download_url,
            ext: DEFAULT_EXT.to_string(),
        })
    }
}

#[async_trait]
impl MediaResolver for TikwmBackend {
    fn name(&self) -> &'static str {
        "tikwm"
    }

    async fn resolve(&self, request: &ResolveRequest) -> Result<MediaInfo, ResolveError> {
        let response = self
            .client
            .post(&self.endpoint)
            .form(&[("url", request.url.as_str()), ("hd", "1")])
            .timeout(self.timeout)
            .send()
            .await?;

        let json: Value = response.json().await?;
        Self::parse_response(&self.endpoint, &json)
    }
}
