// Vayu REST API HTTP client
//
// Wraps `reqwest::Client` with URL construction, status classification
// and body decoding. Endpoint methods live in sibling modules (dashboard,
// sensor, control) as inherent impls, keeping this file focused on
// transport mechanics and the `Result` → `ApiResult` fold.

use std::time::Duration;

use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

use crate::envelope::ApiResult;
use crate::error::Error;
use crate::transport::TransportConfig;

/// Error body shape used by FastAPI-style backends: `{"detail": "..."}`.
#[derive(serde::Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    detail: Option<serde_json::Value>,
    #[serde(default)]
    message: Option<String>,
}

/// Async client for the Vayu monitoring API.
///
/// Stateless between calls and cheap to clone (`reqwest::Client` is an
/// `Arc` internally), so one instance is shared by every resource.
#[derive(Debug, Clone)]
pub struct VayuClient {
    http: reqwest::Client,
    base_url: Url,
    timeout: Duration,
}

impl VayuClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build a client for `base_url` (e.g. `http://localhost:8000`).
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Self::ensure_base(&base_url)?;
        Ok(Self {
            http,
            base_url,
            timeout: transport.timeout,
        })
    }

    /// Wrap an existing `reqwest::Client` (caller manages its settings).
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Result<Self, Error> {
        Self::ensure_base(&base_url)?;
        Ok(Self {
            http,
            base_url,
            timeout: crate::transport::DEFAULT_TIMEOUT,
        })
    }

    fn ensure_base(url: &Url) -> Result<(), Error> {
        if url.cannot_be_a_base() {
            return Err(Error::Client(format!("not a base URL: {url}")));
        }
        Ok(())
    }

    /// The API base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Append path segments to the base URL, percent-encoding each one.
    ///
    /// Device ids are opaque, so they go through `path_segments_mut`
    /// rather than string formatting.
    pub(crate) fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    // ── HTTP verbs ───────────────────────────────────────────────────

    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        url: Url,
        params: &[(&str, String)],
    ) -> Result<T, Error> {
        debug!("GET {url} params={params:?}");
        let resp = self.send(self.http.get(url).query(params)).await?;
        self.handle_response(resp).await
    }

    pub(crate) async fn post<T: DeserializeOwned>(
        &self,
        url: Url,
        params: &[(&str, String)],
    ) -> Result<T, Error> {
        debug!("POST {url} params={params:?}");
        let resp = self.send(self.http.post(url).query(params)).await?;
        self.handle_response(resp).await
    }

    pub(crate) async fn delete<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        debug!("DELETE {url}");
        let resp = self.send(self.http.delete(url)).await?;
        self.handle_response(resp).await
    }

    async fn send(&self, builder: reqwest::RequestBuilder) -> Result<reqwest::Response, Error> {
        builder.send().await.map_err(|e| self.classify(e))
    }

    fn classify(&self, err: reqwest::Error) -> Error {
        if err.is_timeout() {
            Error::Timeout {
                timeout_secs: self.timeout.as_secs(),
            }
        } else {
            Error::Transport(err)
        }
    }

    // ── Response handling ────────────────────────────────────────────

    async fn handle_response<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, Error> {
        let status = resp.status();

        if status == reqwest::StatusCode::NOT_IMPLEMENTED {
            return Err(Error::NotImplemented {
                path: resp.url().path().to_owned(),
            });
        }

        if !status.is_success() {
            return Err(Self::parse_error(status, resp).await);
        }

        let body = resp.text().await.map_err(|e| self.classify(e))?;
        // Empty 2xx bodies (e.g. 204 from DELETE) decode as JSON null.
        let text = if body.trim().is_empty() { "null" } else { &body };
        serde_json::from_str(text).map_err(|e| {
            let preview: String = body.chars().take(200).collect();
            Error::Deserialization {
                message: format!("{e} (body preview: {preview:?})"),
                body,
            }
        })
    }

    async fn parse_error(status: reqwest::StatusCode, resp: reqwest::Response) -> Error {
        let raw = resp.text().await.unwrap_or_default();

        let message = match serde_json::from_str::<ErrorResponse>(&raw) {
            Ok(ErrorResponse {
                detail: Some(serde_json::Value::String(detail)),
                ..
            }) => detail,
            Ok(ErrorResponse {
                message: Some(message),
                ..
            }) => message,
            _ if raw.is_empty() => status.to_string(),
            _ => raw.chars().take(200).collect(),
        };

        Error::Http {
            status: status.as_u16(),
            message,
        }
    }
}

// ── Envelope folding ─────────────────────────────────────────────────

/// Fold an endpoint outcome into the public envelope.
///
/// `resource` names the endpoint in the `501` message
/// (`"Dashboard endpoint not yet implemented"`).
pub(crate) fn settle<T>(result: Result<T, Error>, resource: &str) -> ApiResult<T> {
    match result {
        Ok(data) => ApiResult::ok(data),
        Err(e) if e.is_not_implemented() => {
            debug!(resource, "endpoint not implemented");
            ApiResult::not_implemented(format!("{resource} endpoint not yet implemented"))
        }
        Err(e) => {
            debug!(resource, error = %e, "request failed");
            ApiResult::failure(e.to_string())
        }
    }
}

/// Like [`settle`], but substitute `fallback()` when the host is unreachable.
pub(crate) fn settle_or_fallback<T>(
    result: Result<T, Error>,
    resource: &str,
    fallback: impl FnOnce() -> T,
) -> ApiResult<T> {
    match result {
        Err(e) if e.is_transport() => {
            warn!(resource, error = %e, "backend unreachable, serving fallback data");
            ApiResult::fallback(fallback())
        }
        other => settle(other, resource),
    }
}
