// Downloader module - url classification, resolver cascade and download relay

pub mod backends;
pub mod classifier;
pub mod errors;
pub mod format_selector;
pub mod models;
pub mod orchestrator;
pub mod proxy;
pub mod rotation;
pub mod traits;
pub mod utils;

pub use errors::{ProxyError, ResolveError};
pub use models::{DownloadRequest, MediaInfo, Platform, ResolveRequest};
pub use orchestrator::Cascade;
pub use proxy::DownloadProxy;
pub use rotation::InstanceRotator;
pub use traits::{MediaResolver, MirroredBackend};
