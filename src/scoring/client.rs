use std::time::Duration;

use reqwest::header::{ACCEPT, CONTENT_TYPE};
use tracing::{debug, instrument, warn};

use super::error::{ProtocolError, ScoringError, ScoringResult};
use crate::model::{ScoringRequest, ScoringResponse};

/// Default end-to-end timeout for one scoring call.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const JSON_MEDIA_TYPE: &str = "application/json";

/// Longest response body kept in [`ScoringError::RemoteRejected`].
const MAX_REJECTED_BODY_BYTES: usize = 4096;

/// Minimal async interface the gateway scores through.
pub trait ScoringClient: Send + Sync {
    /// Sends `request` to the scoring service and returns its validated reply.
    fn score(
        &self,
        request: &ScoringRequest,
    ) -> impl std::future::Future<Output = ScoringResult<ScoringResponse>> + Send;
}

/// JSON-over-HTTP scoring client.
#[derive(Clone, Debug)]
pub struct HttpScoringClient {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpScoringClient {
    /// Creates a client posting to `endpoint` with the given request timeout.
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> ScoringResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ScoringError::Configuration {
                reason: e.to_string(),
            })?;

        Ok(Self::with_client(client, endpoint))
    }

    /// Wraps a preconfigured reqwest client.
    pub fn with_client(client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    /// Returns the configured endpoint URL.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    #[instrument(skip(self, request), fields(endpoint = %self.endpoint, subjects = request.len()))]
    pub async fn score(&self, request: &ScoringRequest) -> ScoringResult<ScoringResponse> {
        let body = serde_json::to_vec(request).map_err(|e| ScoringError::Encode {
            reason: e.to_string(),
        })?;

        let response = self
            .client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, JSON_MEDIA_TYPE)
            .header(ACCEPT, JSON_MEDIA_TYPE)
            .body(body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        let bytes = response.bytes().await.map_err(|e| self.transport_error(e))?;

        debug!(status = status.as_u16(), bytes = bytes.len(), "scoring service replied");

        if !status.is_success() {
            let body = truncated_body(&bytes);
            warn!(status = status.as_u16(), body = %body, "scoring service rejected request");
            return Err(ScoringError::RemoteRejected {
                status: status.as_u16(),
                body,
            });
        }

        parse_reply(&bytes)
    }

    fn transport_error(&self, e: reqwest::Error) -> ScoringError {
        let kind = if e.is_timeout() {
            "timed out"
        } else if e.is_connect() {
            "connection failed"
        } else {
            "request failed"
        };
        ScoringError::transport(format!("{kind} ({}): {e}", self.endpoint))
    }
}

impl ScoringClient for HttpScoringClient {
    async fn score(&self, request: &ScoringRequest) -> ScoringResult<ScoringResponse> {
        self.score(request).await
    }
}

/// Parses and validates a 2xx reply body.
pub(crate) fn parse_reply(bytes: &[u8]) -> ScoringResult<ScoringResponse> {
    let response: ScoringResponse =
        serde_json::from_slice(bytes).map_err(|e| ProtocolError::Malformed {
            reason: e.to_string(),
        })?;
    response.validate()?;
    Ok(response)
}

pub(crate) fn truncated_body(bytes: &[u8]) -> String {
    let end = bytes.len().min(MAX_REJECTED_BODY_BYTES);
    String::from_utf8_lossy(&bytes[..end]).into_owned()
}
