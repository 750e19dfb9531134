// Error types for resolution backends and the download relay

use thiserror::Error;

/// Why a single resolution stage produced no result
#[derive(Debug, Clone, Error)]
pub enum ResolveError {
    /// Connect, TLS or mid-body failure talking to a backend
    #[error("transport error: {0}")]
    Transport(String),

    /// Backend did not answer within the stage timeout
    #[error("request timed out")]
    Timeout,

    /// Non-2xx status or an explicit error marker in the body
    #[error("upstream rejected request: {0}")]
    UpstreamStatus(String),

    /// Body did not have the expected shape
    #[error("malformed response: {0}")]
    Malformed(String),

    /// Stream list was empty or the chosen stream had no URL
    #[error("no playable stream in response")]
    NoCandidate,

    /// Missing or unparseable URL / canonical id
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Every mirror of a rotated backend failed
    #[error("all {0} endpoints failed")]
    AllEndpointsExhausted(usize),

    /// Every stage of the platform cascade failed
    #[error("no backend could resolve the url after {attempts} attempts")]
    Exhausted { attempts: usize },
}

impl ResolveError {
    /// Short machine-friendly label for log fields
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Transport(_) => "transport",
            Self::Timeout => "timeout",
            Self::UpstreamStatus(_) => "upstream_status",
            Self::Malformed(_) => "malformed",
            Self::NoCandidate => "no_candidate",
            Self::InvalidInput(_) => "invalid_input",
            Self::AllEndpointsExhausted(_) => "endpoints_exhausted",
            Self::Exhausted { .. } => "exhausted",
        }
    }
}

impl From<reqwest::Error> for ResolveError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return Self::Timeout;
        }
        if err.is_decode() {
            return Self::Malformed(err.to_string());
        }
        if let Some(status) = err.status() {
            return Self::UpstreamStatus(status.to_string());
        }
        Self::Transport(err.to_string())
    }
}

impl From<serde_json::Error> for ResolveError {
    fn from(err: serde_json::Error) -> Self {
        Self::Malformed(err.to_string())
    }
}

/// Failures of the download relay
#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("invalid download request: {0}")]
    InvalidInput(String),

    #[error("upstream transport error: {0}")]
    Transport(String),

    #[error("upstream returned {0}")]
    UpstreamStatus(reqwest::StatusCode),
}

impl From<reqwest::Error> for ProxyError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => Self::UpstreamStatus(status),
            None => Self::Transport(err.to_string()),
        }
    }
}
