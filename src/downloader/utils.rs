// Helper functions shared by backends and the download relay

use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use std::time::Duration;
use url::Url;

use crate::config::ResolverConfig;

/// Build the pooled outbound client (browser UA, optional proxy)
///
/// No total timeout is set here: resolvers set their own per request and the
/// download relay must not be cut off mid-transfer.
pub fn build_http_client(config: &ResolverConfig) -> Result<reqwest::Client, reqwest::Error> {
    let mut headers = HeaderMap::new();
    match HeaderValue::from_str(&config.user_agent) {
        Ok(ua) => {
            headers.insert(USER_AGENT, ua);
        }
        Err(_) => {
            tracing::warn!("User agent is not a valid header value, sending none");
        }
    }

    let mut builder = reqwest::Client::builder()
        .default_headers(headers)
        .connect_timeout(Duration::from_secs(10))
        .pool_max_idle_per_host(20);

    if let Some(proxy_url) = config.outbound_proxy.as_deref() {
        match reqwest::Proxy::all(proxy_url) {
            Ok(proxy) => {
                tracing::info!("Routing outbound requests through {}", proxy_url);
                builder = builder.proxy(proxy);
            }
            Err(e) => {
                // Direct connection still works for most backends
                tracing::warn!("Invalid proxy URL {}: {}, connecting directly", proxy_url, e);
            }
        }
    }

    builder.build()
}

/// Resolve `raw` against `base` and require an http(s) result
///
/// Backends sometimes hand out host-relative media paths.
pub fn absolute_url(base: &str, raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    let parsed = match Url::parse(raw) {
        Ok(url) => url,
        Err(url::ParseError::RelativeUrlWithoutBase) => Url::parse(base).ok()?.join(raw).ok()?,
        Err(_) => return None,
    };

    match parsed.scheme() {
        "http" | "https" => Some(parsed.to_string()),
        _ => None,
    }
}

/// Whether a user-supplied source URL may be fetched by the relay
pub fn is_http_url(raw: &str) -> bool {
    Url::parse(raw)
        .map(|u| matches!(u.scheme(), "http" | "https") && u.host_str().is_some())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absolute_url_passthrough() {
        assert_eq!(
            absolute_url("https://api.example/", "https://cdn.example/v.mp4?sig=1"),
            Some("https://cdn.example/v.mp4?sig=1".to_string())
        );
    }

    #[test]
    fn test_absolute_url_joins_relative() {
        assert_eq!(
            absolute_url("https://www.tikwm.com/api/", "/video/media/play/123.mp4"),
            Some("https://www.tikwm.com/video/media/play/123.mp4".to_string())
        );
    }

    #[test]
    fn test_absolute_url_rejects_empty_and_other_schemes() {
        assert_eq!(absolute_url("https://api.example/", "  "), None);
        assert_eq!(absolute_url("https://api.example/", "ftp://files.example/v"), None);
        assert_eq!(absolute_url("https://api.example/", "javascript:alert(1)"), None);
    }

    #[test]
    fn test_is_http_url() {
        assert!(is_http_url("https://cdn.example/v.mp4"));
        assert!(!is_http_url("file:///etc/passwd"));
        assert!(!is_http_url("not a url"));
    }

    #[test]
    fn test_client_builds_with_bad_proxy() {
        let mut config = ResolverConfig::default();
        config.outbound_proxy = Some("http://[::1".to_string());
        assert!(build_http_client(&config).is_ok());
    }
}
