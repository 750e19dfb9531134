// Cascade orchestrator with per-platform fallback stages
//
// Each platform has an ordered list of resolvers. Stages run strictly one
// after another; the next one starts only after the previous one failed or
// timed out. There is no overall deadline, so the worst case is the sum of the
// stage timeouts.

use reqwest::Client;
use std::sync::Arc;

use super::backends::{CobaltBackend, PipedBackend, TikwmBackend};
use super::classifier::{classify, extract_canonical_id};
use super::errors::ResolveError;
use super::models::{AttemptOutcome, MediaInfo, Platform, ResolutionAttempt, ResolveRequest};
use super::rotation::InstanceRotator;
use super::traits::MediaResolver;
use crate::config::ResolverConfig;

/// Log one resolver call at a level matching its outcome
pub fn record_attempt(attempt: &ResolutionAttempt) {
    let endpoint = attempt.endpoint.as_deref().unwrap_or("-");
    match &attempt.outcome {
        AttemptOutcome::Success(info) => {
            tracing::info!(
                provider = attempt.provider,
                endpoint,
                platform = %info.platform,
                "Resolved media"
            );
        }
        AttemptOutcome::Failure(e) => {
            tracing::warn!(
                provider = attempt.provider,
                endpoint,
                kind = e.kind(),
                "Resolver failed: {}",
                e
            );
        }
    }
}

pub struct Cascade {
    short_form: Vec<Arc<dyn MediaResolver>>,
    stream_indexed: Vec<Arc<dyn MediaResolver>>,
    generic: Vec<Arc<dyn MediaResolver>>,
}

impl Cascade {
    pub fn new() -> Self {
        Self {
            short_form: Vec::new(),
            stream_indexed: Vec::new(),
            generic: Vec::new(),
        }
    }

    /// Production stage lists for every platform
    pub fn from_config(config: &ResolverConfig, client: Client) -> Self {
        let tikwm: Arc<dyn MediaResolver> = Arc::new(TikwmBackend::new(client.clone(), config));
        let piped: Arc<dyn MediaResolver> = Arc::new(InstanceRotator::new(
            PipedBackend::new(client.clone(), config.stream_index_timeout),
            config.stream_index_mirrors.clone(),
        ));
        let cobalt_primary: Arc<dyn MediaResolver> = Arc::new(CobaltBackend::new(
            "cobalt-primary",
            client.clone(),
            config.generic_primary.clone(),
            config.generic_timeout,
        ));
        let cobalt_backup: Arc<dyn MediaResolver> = Arc::new(CobaltBackend::new(
            "cobalt-backup",
            client,
            config.generic_backup.clone(),
            config.generic_timeout,
        ));

        let mut cascade = Self::new();
        cascade.add_stage(Platform::ShortForm, tikwm);
        cascade.add_stage(Platform::ShortForm, cobalt_primary.clone());

        cascade.add_stage(Platform::StreamIndexed, piped);
        cascade.add_stage(Platform::StreamIndexed, cobalt_primary.clone());
        cascade.add_stage(Platform::StreamIndexed, cobalt_backup.clone());

        cascade.add_stage(Platform::Generic, cobalt_primary);
        cascade.add_stage(Platform::Generic, cobalt_backup);
        cascade
    }

    /// Append a resolver to the end of a platform's stage list
    pub fn add_stage(&mut self, platform: Platform, resolver: Arc<dyn MediaResolver>) {
        match platform {
            Platform::ShortForm => self.short_form.push(resolver),
            Platform::StreamIndexed => self.stream_indexed.push(resolver),
            Platform::Generic => self.generic.push(resolver),
        }
    }

    pub fn stages(&self, platform: Platform) -> &[Arc<dyn MediaResolver>] {
        match platform {
            Platform::ShortForm => &self.short_form,
            Platform::StreamIndexed => &self.stream_indexed,
            Platform::Generic => &self.generic,
        }
    }

    /// Classify a raw URL and run its platform's stages
    pub async fn resolve(&self, raw_url: &str) -> Result<MediaInfo, ResolveError> {
        let url = raw_url.trim();
        if url.is_empty() {
            return Err(ResolveError::InvalidInput("URL is required".to_string()));
        }

        let platform = classify(url);
        let canonical_id = match platform {
            Platform::StreamIndexed => extract_canonical_id(url),
            _ => None,
        };
        tracing::debug!(%platform, canonical_id = canonical_id.as_deref(), "Classified url");

        self.resolve_request(platform, &ResolveRequest::new(url, canonical_id))
            .await
    }

    /// Run the stages for `platform` until one succeeds
    pub async fn resolve_request(
        &self,
        platform: Platform,
        request: &ResolveRequest,
    ) -> Result<MediaInfo, ResolveError> {
        let mut failures: Vec<(&'static str, ResolveError)> = Vec::new();

        for stage in self.stages(platform) {
            if stage.requires_canonical_id() && request.canonical_id.is_none() {
                tracing::debug!(provider = stage.name(), "Skipping stage: no canonical id");
                continue;
            }

            tracing::debug!(provider = stage.name(), "Trying stage");
            let outcome = match stage.resolve(request).await {
                Ok(info) => AttemptOutcome::Success(info),
                Err(e) => AttemptOutcome::Failure(e),
            };
            let attempt = ResolutionAttempt {
                provider: stage.name(),
                endpoint: None,
                outcome,
            };
            record_attempt(&attempt);

            match attempt.outcome {
                AttemptOutcome::Success(info) => return Ok(info),
                AttemptOutcome::Failure(e) => failures.push((attempt.provider, e)),
            }
        }

        let summary = failures
            .iter()
            .map(|(provider, e)| format!("{}: {}", provider, e.kind()))
            .collect::<Vec<_>>()
            .join(", ");
        tracing::warn!(%platform, url = %request.url, "Cascade exhausted [{}]", summary);

        Err(ResolveError::Exhausted {
            attempts: failures.len(),
        })
    }
}

impl Default for Cascade {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{dead_endpoint, spawn_upstream, ScriptedResolver};
    use axum::routing::post;
    use axum::Router;
    use std::sync::Mutex;
    use std::time::{Duration, Instant};

    type CallLog = Arc<Mutex<Vec<&'static str>>>;

    fn stage(name: &'static str, succeed: bool, log: &CallLog) -> Arc<dyn MediaResolver> {
        Arc::new(ScriptedResolver::new(name, succeed, log.clone()))
    }

    fn scripted_cascade(log: &CallLog, succeed: &[&str]) -> Cascade {
        let ok = |name: &str| succeed.iter().any(|s| *s == name);
        let mut cascade = Cascade::new();
        cascade.add_stage(Platform::ShortForm, stage("short", ok("short"), log));
        cascade.add_stage(Platform::ShortForm, stage("generic-a", ok("generic-a"), log));
        cascade.add_stage(
            Platform::StreamIndexed,
            Arc::new(ScriptedResolver::new("index", ok("index"), log.clone()).needing_id()),
        );
        cascade.add_stage(Platform::StreamIndexed, stage("generic-a", ok("generic-a"), log));
        cascade.add_stage(Platform::StreamIndexed, stage("generic-b", ok("generic-b"), log));
        cascade.add_stage(Platform::Generic, stage("generic-a", ok("generic-a"), log));
        cascade.add_stage(Platform::Generic, stage("generic-b", ok("generic-b"), log));
        cascade
    }

    #[tokio::test]
    async fn test_short_form_tries_short_form_first() {
        let log = CallLog::default();
        let cascade = scripted_cascade(&log, &["generic-a"]);

        let info = cascade.resolve("https://www.tiktok.com/@a/video/1").await.unwrap();
        assert_eq!(info.download_url, "generic-a");
        assert_eq!(*log.lock().unwrap(), vec!["short", "generic-a"]);
    }

    #[tokio::test]
    async fn test_short_form_success_stops_cascade() {
        let log = CallLog::default();
        let cascade = scripted_cascade(&log, &["short", "generic-a"]);

        cascade.resolve("https://vm.tiktok.com/ZM123/").await.unwrap();
        assert_eq!(*log.lock().unwrap(), vec!["short"]);
    }

    #[tokio::test]
    async fn test_stream_indexed_order() {
        let log = CallLog::default();
        let cascade = scripted_cascade(&log, &["generic-b"]);

        let info = cascade
            .resolve("https://www.youtube.com/watch?v=abcdefghijk")
            .await
            .unwrap();
        assert_eq!(info.download_url, "generic-b");
        assert_eq!(*log.lock().unwrap(), vec!["index", "generic-a", "generic-b"]);
    }

    #[tokio::test]
    async fn test_stream_indexed_without_id_skips_index() {
        let log = CallLog::default();
        let cascade = scripted_cascade(&log, &["index", "generic-a"]);

        cascade.resolve("https://www.youtube.com/feed/library").await.unwrap();
        assert_eq!(*log.lock().unwrap(), vec!["generic-a"]);
    }

    #[tokio::test]
    async fn test_generic_exhausted_runs_each_stage_once() {
        let log = CallLog::default();
        let cascade = scripted_cascade(&log, &[]);

        let result = cascade.resolve("https://www.instagram.com/reel/Cxyz/").await;
        assert!(matches!(result, Err(ResolveError::Exhausted { attempts: 2 })));
        assert_eq!(*log.lock().unwrap(), vec!["generic-a", "generic-b"]);
    }

    #[tokio::test]
    async fn test_blank_url_is_invalid() {
        let cascade = Cascade::new();
        assert!(matches!(
            cascade.resolve("   ").await,
            Err(ResolveError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_repeated_resolution_is_stable() {
        let log = CallLog::default();
        let cascade = scripted_cascade(&log, &["short"]);

        let first = cascade.resolve("https://www.tiktok.com/@a/video/1").await.unwrap();
        let second = cascade.resolve("https://www.tiktok.com/@a/video/1").await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_production_cascade_exhausts_on_transport_errors() {
        let dead = dead_endpoint().await;
        let config = ResolverConfig::default()
            .with_short_form_endpoint(dead.clone())
            .with_stream_index_mirrors(vec![dead.clone(), dead.clone()])
            .with_generic_endpoints(dead.clone(), dead);
        let cascade = Cascade::from_config(&config, Client::new());

        assert_eq!(cascade.stages(Platform::ShortForm).len(), 2);
        assert_eq!(cascade.stages(Platform::StreamIndexed).len(), 3);
        assert_eq!(cascade.stages(Platform::Generic).len(), 2);

        let result = cascade.resolve("https://youtu.be/abcdefghijk").await;
        assert!(matches!(result, Err(ResolveError::Exhausted { attempts: 3 })));
    }

    #[tokio::test]
    async fn test_stage_timeout_advances_cascade() {
        let hanging = Router::new().route(
            "/api/",
            post(|| async {
                tokio::time::sleep(Duration::from_secs(10)).await;
                "{}"
            }),
        );
        let addr = spawn_upstream(hanging).await;

        let timeout = Duration::from_millis(300);
        let config = ResolverConfig::default()
            .with_short_form_endpoint(format!("http://{addr}/api/"))
            .with_timeouts(timeout, Duration::from_secs(5));

        let log = CallLog::default();
        let mut cascade = Cascade::new();
        cascade.add_stage(
            Platform::ShortForm,
            Arc::new(TikwmBackend::new(Client::new(), &config)),
        );
        cascade.add_stage(Platform::ShortForm, stage("generic-a", true, &log));

        let started = Instant::now();
        let info = cascade.resolve("https://www.tiktok.com/@a/video/1").await.unwrap();
        let elapsed = started.elapsed();

        assert_eq!(info.download_url, "generic-a");
        assert_eq!(*log.lock().unwrap(), vec!["generic-a"]);
        assert!(elapsed >= timeout, "finished before the timeout: {:?}", elapsed);
        assert!(elapsed < Duration::from_secs(3), "waited on the hanging stage: {:?}", elapsed);
    }
}
