// Resolver trait definitions

use async_trait::async_trait;

use super::errors::ResolveError;
use super::models::{MediaInfo, ResolveRequest};

/// One stage of a resolution cascade
#[async_trait]
pub trait MediaResolver: Send + Sync {
    /// Name of the provider (for logging)
    fn name(&self) -> &'static str;

    /// Whether this stage can only run with a canonical id
    fn requires_canonical_id(&self) -> bool {
        false
    }

    /// Resolve a URL into a direct media descriptor
    async fn resolve(&self, request: &ResolveRequest) -> Result<MediaInfo, ResolveError>;
}

/// Backend reachable through several interchangeable mirrors
///
/// Wrapped by [`super::rotation::InstanceRotator`] to become a `MediaResolver`.
#[async_trait]
pub trait MirroredBackend: Send + Sync {
    fn name(&self) -> &'static str;

    fn requires_canonical_id(&self) -> bool {
        false
    }

    /// Resolve against exactly one mirror base URL
    async fn resolve_at(
        &self,
        endpoint: &str,
        request: &ResolveRequest,
    ) -> Result<MediaInfo, ResolveError>;
}
