//! The Overpass API client.
//!
//! [`OverpassClient`] issues a single `POST` of the URL-encoded query per
//! fetch and classifies every outcome:
//!
//! - client-side timeout → [`JobError::UpstreamTimeout`] (recoverable)
//! - no HTTP response at all → [`JobError::UpstreamUnreachable`] (recoverable)
//! - HTTP 429 → [`JobError::RateLimited`] (recoverable)
//! - any other non-2xx → [`JobError::UpstreamRejected`] (terminal)
//! - 2xx with an unparsable body → [`JobError::UpstreamMalformed`] (terminal)
//!
//! Schema validation of the parsed body is the caller's next step; this
//! layer only guarantees well-formed JSON.

use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;

use mapwatch_core::error::JobError;

/// Public Overpass interpreter endpoint.
pub const OVERPASS_URL: &str = "https://overpass-api.de/api/interpreter";

/// Request deadline when the query carries no `[timeout:N]` directive.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Client identity sent with every request. Overpass operators ask bulk
/// consumers to be identifiable.
const USER_AGENT: &str = concat!("mapwatch-worker/", env!("CARGO_PKG_VERSION"));

/// `[timeout:N]` directive inside an Overpass QL prologue.
static TIMEOUT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[timeout:(\d+)\]").expect("timeout regex is valid"));

/// HTTP client for a single Overpass endpoint.
pub struct OverpassClient {
    client: reqwest::Client,
    endpoint: String,
}

impl OverpassClient {
    /// Create a client for the given interpreter endpoint.
    pub fn new(endpoint: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .expect("Failed to build reqwest HTTP client");
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    /// Create a client reusing an existing [`reqwest::Client`] (connection
    /// pooling across components).
    pub fn with_client(client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    /// Interpreter endpoint this client targets.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Execute one query. At most one HTTP call happens per invocation; the
    /// deadline comes from the query's own `[timeout:N]` directive.
    ///
    /// Returns the parsed JSON body; the caller schema-validates it.
    pub async fn fetch(&self, query: &str) -> Result<serde_json::Value, JobError> {
        let timeout_secs = query_timeout(query);

        tracing::debug!(
            endpoint = %self.endpoint,
            timeout_secs,
            query_len = query.len(),
            "Sending Overpass request"
        );

        // `form` URL-encodes the body and fixes the content type to
        // application/x-www-form-urlencoded, the shape Overpass expects.
        let response = self
            .client
            .post(&self.endpoint)
            .timeout(Duration::from_secs(timeout_secs))
            .form(&[("data", query)])
            .send()
            .await
            .map_err(|e| classify_transport_error(&e, timeout_secs))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(classify_failure_status(status.as_u16(), body));
        }

        let body = response
            .text()
            .await
            .map_err(|e| classify_transport_error(&e, timeout_secs))?;

        tracing::debug!(status = status.as_u16(), body_len = body.len(), "Overpass responded");

        serde_json::from_str(&body).map_err(|e| JobError::UpstreamMalformed(e.to_string()))
    }
}

/// Read the request deadline from the query's `[timeout:N]` directive,
/// falling back to [`DEFAULT_TIMEOUT_SECS`] when absent or unparsable.
pub fn query_timeout(query: &str) -> u64 {
    TIMEOUT_RE
        .captures(query)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(DEFAULT_TIMEOUT_SECS)
}

/// Classify an error raised before any HTTP response arrived.
fn classify_transport_error(error: &reqwest::Error, timeout_secs: u64) -> JobError {
    if error.is_timeout() {
        JobError::UpstreamTimeout { timeout_secs }
    } else {
        JobError::UpstreamUnreachable(error.to_string())
    }
}

/// Classify a non-2xx HTTP status.
fn classify_failure_status(status: u16, body: String) -> JobError {
    if status == 429 {
        JobError::RateLimited
    } else {
        JobError::UpstreamRejected { status, body }
    }
}
