use axum::http::StatusCode;
use bytes::Bytes;
use reqwest::header::CONTENT_TYPE;
use serde::de::IgnoredAny;
use std::error::Error as StdError;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Why a forwarded call produced nothing relayable.
#[derive(Error, Debug)]
pub enum UpstreamError {
    #[error("upstream timed out: {0}")]
    Timeout(#[source] reqwest::Error),

    #[error("upstream unreachable: {0}")]
    Unreachable(#[source] reqwest::Error),

    #[error("upstream returned a non-JSON body: {0}")]
    BadResponse(#[source] serde_json::Error),
}

impl UpstreamError {
    fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            UpstreamError::Timeout(err)
        } else {
            UpstreamError::Unreachable(err)
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            UpstreamError::Timeout(_) => "timeout",
            UpstreamError::Unreachable(_) => "unreachable",
            UpstreamError::BadResponse(_) => "bad_response",
        }
    }

    /// The underlying error and every cause below it, joined with `: `.
    pub fn detail(&self) -> String {
        let mut parts: Vec<String> = Vec::new();
        let mut current: Option<&(dyn StdError + 'static)> = self.source();
        while let Some(err) = current {
            let text = err.to_string();
            if !parts.iter().any(|p| p.contains(&text)) {
                parts.push(text);
            }
            current = err.source();
        }
        if parts.is_empty() {
            self.to_string()
        } else {
            parts.join(": ")
        }
    }
}

/// A buffered upstream answer whose body parsed as a single JSON document.
#[derive(Debug)]
pub struct UpstreamReply {
    pub status: StatusCode,
    pub body: Bytes,
}

#[derive(Clone)]
pub struct OllamaClient {
    http: reqwest::Client,
    base_url: String,
}

impl OllamaClient {
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(OllamaClient {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn tags(&self) -> Result<UpstreamReply, UpstreamError> {
        let request = self.http.get(format!("{}/api/tags", self.base_url));
        Self::execute(request).await
    }

    /// Forwards `body` untouched; the proxy does not validate what the caller sent.
    pub async fn chat(&self, body: Bytes) -> Result<UpstreamReply, UpstreamError> {
        let request = self
            .http
            .post(format!("{}/api/chat", self.base_url))
            .header(CONTENT_TYPE, "application/json")
            .body(body);
        Self::execute(request).await
    }

    async fn execute(request: reqwest::RequestBuilder) -> Result<UpstreamReply, UpstreamError> {
        let response = request.send().await.map_err(UpstreamError::from_transport)?;
        let status = response.status();
        let body = response.bytes().await.map_err(UpstreamError::from_transport)?;

        serde_json::from_slice::<IgnoredAny>(&body).map_err(UpstreamError::BadResponse)?;
        debug!(%status, bytes = body.len(), "upstream replied");

        let status = if status.is_success() {
            StatusCode::OK
        } else {
            status
        };
        Ok(UpstreamReply { status, body })
    }
}
