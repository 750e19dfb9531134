// HTTP handlers and error mapping
//
// Upstream failure details stay in the logs; clients only ever see the fixed
// messages below.

use axum::{
    body::Body,
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;

use crate::downloader::errors::{ProxyError, ResolveError};
use crate::downloader::models::{DownloadRequest, MediaInfo};
use crate::server::AppState;

pub const URL_REQUIRED: &str = "URL is required";
pub const EXTRACTION_FAILED: &str =
    "Extraction failed. The platform might be blocking requests or the link is private.";
pub const PROXY_FAILED: &str =
    "Proxy download failed: the source link may have expired. Please resolve the URL again.";

/// Error returned by a handler, rendered as `{"detail": ...}`
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub detail: String,
}

impl ApiError {
    pub fn new(status: StatusCode, detail: impl Into<String>) -> Self {
        Self {
            status,
            detail: detail.into(),
        }
    }

    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, detail)
    }

    pub fn internal(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, detail)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "detail": self.detail }))).into_response()
    }
}

impl From<ResolveError> for ApiError {
    fn from(err: ResolveError) -> Self {
        match err {
            ResolveError::InvalidInput(_) => Self::bad_request(URL_REQUIRED),
            other => {
                tracing::warn!(kind = other.kind(), "Resolution failed: {}", other);
                Self::bad_request(EXTRACTION_FAILED)
            }
        }
    }
}

impl From<ProxyError> for ApiError {
    fn from(err: ProxyError) -> Self {
        match err {
            ProxyError::InvalidInput(msg) => Self::bad_request(msg),
            other => {
                tracing::error!("Proxy download failed: {}", other);
                Self::internal(PROXY_FAILED)
            }
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Deserialize)]
pub struct InfoQuery {
    pub url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DownloadQuery {
    pub url: Option<String>,
    pub title: Option<String>,
    pub ext: Option<String>,
}

fn required_url(url: Option<String>) -> ApiResult<String> {
    url.map(|u| u.trim().to_string())
        .filter(|u| !u.is_empty())
        .ok_or_else(|| ApiError::bad_request(URL_REQUIRED))
}

/// `GET /`
pub async fn status() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok", "service": "media-resolver" }))
}

/// `GET /api/info?url=...`
pub async fn info(
    State(state): State<AppState>,
    Query(query): Query<InfoQuery>,
) -> ApiResult<Json<MediaInfo>> {
    let url = required_url(query.url)?;
    let info = state.cascade.resolve(&url).await?;
    Ok(Json(info))
}

/// `GET /api/download?url=...&title=...&ext=...`
pub async fn download(
    State(state): State<AppState>,
    Query(query): Query<DownloadQuery>,
) -> ApiResult<Response> {
    let url = required_url(query.url)?;
    let request = DownloadRequest::new(url, query.title, query.ext);
    let download = state.proxy.proxy_download(&request).await?;

    Ok((
        [
            (header::CONTENT_TYPE, download.content_type),
            (header::CONTENT_DISPOSITION, download.content_disposition),
        ],
        Body::from_stream(download.body),
    )
        .into_response())
}
