// Service configuration - endpoints, timeouts and outbound headers
//
// Built once at startup and shared read-only between requests.

use std::time::Duration;

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/122.0.0.0 Safari/537.36";

/// Placeholder artwork for backends that return no thumbnail
pub const PLACEHOLDER_THUMBNAIL: &str =
    "https://images.unsplash.com/photo-1611162617213-7d7a39e9b1d7?auto=format&fit=crop&w=300";

const ENV_PREFIX: &str = "MEDIA_RESOLVER_";

/// Endpoints, timeouts and headers for every backend
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Browser user agent sent on every outbound request
    pub user_agent: String,
    /// Referer sent by the download relay
    pub referer: Option<String>,
    /// HTTP or SOCKS5 proxy for outbound calls (e.g. "socks5h://127.0.0.1:1080")
    pub outbound_proxy: Option<String>,

    pub short_form_endpoint: String,
    pub short_form_timeout: Duration,

    /// Stream-index mirrors, probed in this order
    pub stream_index_mirrors: Vec<String>,
    /// Timeout for a single mirror
    pub stream_index_timeout: Duration,

    pub generic_primary: String,
    pub generic_backup: String,
    pub generic_timeout: Duration,

    /// Deadline for the upstream response head and for each relayed chunk
    pub download_timeout: Duration,
    /// Size of each relayed chunk in bytes
    pub chunk_size: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            referer: Some("https://www.youtube.com/".to_string()),
            outbound_proxy: None,
            short_form_endpoint: "https://www.tikwm.com/api/".to_string(),
            short_form_timeout: Duration::from_secs(7),
            stream_index_mirrors: vec![
                "https://pipedapi.kavin.rocks".to_string(),
                "https://pipedapi.adminforge.de".to_string(),
                "https://pipedapi.r4fo.com".to_string(),
                "https://api.piped.private.coffee".to_string(),
                "https://pipedapi.darkness.services".to_string(),
            ],
            stream_index_timeout: Duration::from_millis(2500),
            generic_primary: "https://api.cobalt.tools/api/json".to_string(),
            generic_backup: "https://co.wuk.sh/api/json".to_string(),
            generic_timeout: Duration::from_secs(8),
            download_timeout: Duration::from_secs(30),
            chunk_size: 1024 * 1024,
        }
    }
}

impl ResolverConfig {
    /// Defaults with `MEDIA_RESOLVER_*` environment overrides applied
    pub fn from_env() -> Self {
        Self::default().apply_overrides(|key| std::env::var(format!("{ENV_PREFIX}{key}")).ok())
    }

    /// Apply overrides from any key lookup (environment, tests)
    pub fn apply_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let millis = |key: &str| {
            get(key).and_then(|v| match v.parse::<u64>() {
                Ok(ms) => Some(Duration::from_millis(ms)),
                Err(_) => {
                    tracing::warn!("Ignoring {ENV_PREFIX}{key}={v}: not a number of milliseconds");
                    None
                }
            })
        };

        if let Some(ua) = get("USER_AGENT") {
            self.user_agent = ua;
        }
        if let Some(referer) = get("REFERER") {
            // "none" disables the header
            self.referer = (referer != "none").then_some(referer);
        }
        if let Some(proxy) = get("PROXY") {
            self.outbound_proxy = Some(proxy);
        }
        if let Some(endpoint) = get("TIKWM_URL") {
            self.short_form_endpoint = endpoint;
        }
        if let Some(mirrors) = get("PIPED_MIRRORS") {
            let list: Vec<String> = mirrors
                .split(',')
                .map(|m| m.trim().trim_end_matches('/').to_string())
                .filter(|m| !m.is_empty())
                .collect();
            if !list.is_empty() {
                self.stream_index_mirrors = list;
            }
        }
        if let Some(primary) = get("COBALT_PRIMARY") {
            self.generic_primary = primary;
        }
        if let Some(backup) = get("COBALT_BACKUP") {
            self.generic_backup = backup;
        }
        if let Some(t) = millis("TIKWM_TIMEOUT_MS") {
            self.short_form_timeout = t;
        }
        if let Some(t) = millis("PIPED_TIMEOUT_MS") {
            self.stream_index_timeout = t;
        }
        if let Some(t) = millis("COBALT_TIMEOUT_MS") {
            self.generic_timeout = t;
        }
        if let Some(t) = millis("DOWNLOAD_TIMEOUT_MS") {
            self.download_timeout = t;
        }

        self
    }

    pub fn with_short_form_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.short_form_endpoint = endpoint.into();
        self
    }

    pub fn with_stream_index_mirrors(mut self, mirrors: Vec<String>) -> Self {
        self.stream_index_mirrors = mirrors;
        self
    }

    pub fn with_generic_endpoints(
        mut self,
        primary: impl Into<String>,
        backup: impl Into<String>,
    ) -> Self {
        self.generic_primary = primary.into();
        self.generic_backup = backup.into();
        self
    }

    pub fn with_timeouts(mut self, resolve: Duration, download: Duration) -> Self {
        self.short_form_timeout = resolve;
        self.stream_index_timeout = resolve;
        self.generic_timeout = resolve;
        self.download_timeout = download;
        self
    }

    pub fn with_referer(mut self, referer: Option<String>) -> Self {
        self.referer = referer;
        self
    }

    pub fn with_chunk_size(mut self, bytes: usize) -> Self {
        self.chunk_size = bytes.max(1);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = ResolverConfig::default();
        assert_eq!(config.stream_index_mirrors.len(), 5);
        assert_eq!(config.stream_index_timeout, Duration::from_millis(2500));
        assert_eq!(config.chunk_size, 1_048_576);
        assert!(config.download_timeout >= Duration::from_secs(15));
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("PIPED_MIRRORS", " https://a.example/ , ,https://b.example"),
            ("COBALT_TIMEOUT_MS", "1500"),
            ("PIPED_TIMEOUT_MS", "soon"),
            ("REFERER", "none"),
            ("USER_AGENT", "   "),
        ]);

        let config = ResolverConfig::default()
            .apply_overrides(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(
            config.stream_index_mirrors,
            vec!["https://a.example".to_string(), "https://b.example".to_string()]
        );
        assert_eq!(config.generic_timeout, Duration::from_millis(1500));
        assert_eq!(config.stream_index_timeout, Duration::from_millis(2500));
        assert_eq!(config.referer, None);
        assert_eq!(config.user_agent, DEFAULT_USER_AGENT);
    }
}
