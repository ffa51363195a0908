//! Submitted job payload and its validation rules.
//!
//! A producer enqueues `{ query?, message? }`. The query, when present, must
//! be an Overpass QL document requesting JSON output; the worker substitutes
//! [`DEFAULT_QUERY`] when no query is supplied (smoke-test jobs carry only a
//! message). Validation happens before any cache or network access.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::error::JobError;

/// Queries must request JSON output explicitly; everything downstream
/// (parsing, schema validation, caching) assumes it.
pub const REQUIRED_OUTPUT_MARKER: &str = "[out:json]";

/// Minimum accepted query length.
pub const QUERY_MIN_LEN: u64 = 5;

/// Maximum accepted query length. Overpass itself rejects absurdly large
/// documents; this bound fails them before they ever reach the wire.
pub const QUERY_MAX_LEN: u64 = 50_000;

/// Substitute query for jobs submitted without one. A one-block bounding-box
/// probe around central London, small enough to be cheap against the shared
/// rate budget.
pub const DEFAULT_QUERY: &str =
    "[out:json][timeout:25];(way[\"building\"](51.500,-0.113,51.503,-0.109););out body;";

/// Raw data attached to a job by the producer.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct JobPayload {
    /// Overpass QL query text. Optional: message-only smoke jobs omit it.
    #[validate(
        length(min = 5, max = 50000),
        custom(function = validate_output_marker)
    )]
    pub query: Option<String>,

    /// Free-text note from the producer. Must be non-empty when present.
    #[validate(length(min = 1))]
    pub message: Option<String>,
}

impl JobPayload {
    /// Payload carrying only a query.
    pub fn with_query(query: impl Into<String>) -> Self {
        Self {
            query: Some(query.into()),
            message: None,
        }
    }

    /// Payload carrying only a message (smoke-test job).
    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            query: None,
            message: Some(message.into()),
        }
    }

    /// Validate the payload shape, mapping failures to the terminal
    /// [`JobError::PayloadInvalid`] classification.
    pub fn ensure_valid(&self) -> Result<(), JobError> {
        self.validate()
            .map_err(|e| JobError::PayloadInvalid(e.to_string()))
    }

    /// The query to execute: the submitted one, or [`DEFAULT_QUERY`] when
    /// the producer supplied none.
    pub fn effective_query(&self) -> &str {
        self.query.as_deref().unwrap_or(DEFAULT_QUERY)
    }
}

/// Reject queries that do not request JSON output.
fn validate_output_marker(query: &str) -> Result<(), ValidationError> {
    if query.contains(REQUIRED_OUTPUT_MARKER) {
        return Ok(());
    }
    let mut err = ValidationError::new("output_marker");
    err.message = Some(Cow::Borrowed(
        "Query must be a valid OSM JSON query and include [out:json]",
    ));
    Err(err)
}
