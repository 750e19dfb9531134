// InstanceRotator - walks the mirrors of one backend in priority order
//
// Mirrors are probed one at a time; the first success wins. Worst case latency
// is mirrors x per-mirror timeout.

use async_trait::async_trait;

use super::errors::ResolveError;
use super::models::{AttemptOutcome, MediaInfo, ResolutionAttempt, ResolveRequest};
use super::orchestrator::record_attempt;
use super::traits::{MediaResolver, MirroredBackend};

pub struct InstanceRotator<B> {
    backend: B,
    endpoints: Vec<String>,
}

impl<B: MirroredBackend> InstanceRotator<B> {
    pub fn new(backend: B, endpoints: Vec<String>) -> Self {
        Self { backend, endpoints }
    }

    pub fn endpoints(&self) -> &[String] {
        &self.endpoints
    }

    /// Try each endpoint in order, returning the first success
    pub async fn resolve_via_rotation(
        &self,
        request: &ResolveRequest,
    ) -> Result<MediaInfo, ResolveError> {
        for endpoint in &self.endpoints {
            tracing::debug!(provider = self.backend.name(), %endpoint, "Trying mirror");

            let outcome = match self.backend.resolve_at(endpoint, request).await {
                Ok(info) => AttemptOutcome::Success(info),
                Err(e) => AttemptOutcome::Failure(e),
            };
            let attempt = ResolutionAttempt {
                provider: self.backend.name(),
                endpoint: Some(endpoint.clone()),
                outcome,
            };
            record_attempt(&attempt);

            if let AttemptOutcome::Success(info) = attempt.outcome {
                return Ok(info);
            }
        }

        Err(ResolveError::AllEndpointsExhausted(self.endpoints.len()))
    }
}

#[async_trait]
impl<B: MirroredBackend> MediaResolver for InstanceRotator<B> {
    fn name(&self) -> &'static str {
        self.backend.name()
    }

    fn requires_canonical_id(&self) -> bool {
        self.backend.requires_canonical_id()
    }

    async fn resolve(&self, request: &ResolveRequest) -> Result<MediaInfo, ResolveError> {
        self.resolve_via_rotation(request).await
    }
}
