// Common data models for resolution and download relay

use serde::{Deserialize, Serialize};
use std::fmt;

use super::errors::ResolveError;

/// Fallback extension when a backend does not tell us the container
pub const DEFAULT_EXT: &str = "mp4";

/// Platform family a URL belongs to
///
/// Serialized with the display labels the web client shows next to a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Platform {
    /// Short-form vertical video (TikTok)
    #[serde(rename = "TikTok")]
    ShortForm,
    /// Video host with an opaque id and a stream index (YouTube)
    #[serde(rename = "YouTube")]
    StreamIndexed,
    /// Anything else, handled by the generic extractor
    #[serde(rename = "Social Media")]
    Generic,
}

impl Platform {
    /// Title used when the backend returns none
    pub fn placeholder_title(&self) -> &'static str {
        match self {
            Self::ShortForm => "TikTok Video",
            Self::StreamIndexed => "YouTube Video",
            Self::Generic => "Downloaded Video",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ShortForm => write!(f, "short-form"),
            Self::StreamIndexed => write!(f, "stream-indexed"),
            Self::Generic => write!(f, "generic"),
        }
    }
}

/// Normalized result of a successful resolution
///
/// `download_url` is always absolute and non-empty; backends that cannot
/// produce one report a failure instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaInfo {
    pub id: Option<String>,
    pub title: String,
    pub thumbnail: Option<String>,
    pub duration: Option<f64>,
    pub platform: Platform,
    pub download_url: String,
    pub ext: String,
}

/// Input handed to every resolver in a cascade
#[derive(Debug, Clone)]
pub struct ResolveRequest {
    /// Trimmed user URL
    pub url: String,
    /// Canonical video id, only for stream-indexed platforms
    pub canonical_id: Option<String>,
}

impl ResolveRequest {
    pub fn new(url: impl Into<String>, canonical_id: Option<String>) -> Self {
        Self {
            url: url.into(),
            canonical_id,
        }
    }
}

/// One entry of a stream index, as returned by the backend
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CandidateStream {
    #[serde(default)]
    pub format: String,
    #[serde(rename = "videoOnly", default)]
    pub is_video_only: bool,
    #[serde(default)]
    pub url: String,
}

/// Outcome of a single resolver call
#[derive(Debug, Clone)]
pub enum AttemptOutcome {
    Success(MediaInfo),
    Failure(ResolveError),
}

/// Record of one resolver call, kept only long enough to log it
#[derive(Debug, Clone)]
pub struct ResolutionAttempt {
    pub provider: &'static str,
    pub endpoint: Option<String>,
    pub outcome: AttemptOutcome,
}

/// Parameters of one proxied download
#[derive(Debug, Clone, PartialEq)]
pub struct DownloadRequest {
    pub source_url: String,
    pub display_title: String,
    pub extension: String,
}

impl DownloadRequest {
    /// Missing or blank title and extension fall back to `video` and `mp4`
    pub fn new(source_url: impl Into<String>, title: Option<String>, ext: Option<String>) -> Self {
        let non_blank = |v: Option<String>| v.filter(|s| !s.trim().is_empty());
        Self {
            source_url: source_url.into(),
            display_title: non_blank(title).unwrap_or_else(|| "video".to_string()),
            extension: non_blank(ext).unwrap_or_else(|| DEFAULT_EXT.to_string()),
        }
    }
}
