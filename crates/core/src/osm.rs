//! Tolerant OSM document model.
//!
//! The upstream payload is untrusted: recognised fields are strictly typed,
//! unknown extra fields are ignored (serde's default), and anything that does
//! not fit is a terminal [`JobError::ResponseSchemaInvalid`]. A malformed
//! payload already received will not improve on retry.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::JobError;

/// One OSM primitive. Only `type` and `id` are mandatory; geometry and tags
/// depend on the element kind and the query's output directives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OsmElement {
    #[serde(rename = "type")]
    pub element_type: ElementType,

    pub id: i64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub lon: Option<f64>,

    /// Node references, present on ways.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nodes: Option<Vec<i64>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<HashMap<String, String>>,
}

/// The three OSM primitive kinds. Anything else fails deserialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementType {
    Node,
    Way,
    Relation,
}

/// A full Overpass response document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OsmResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub generator: Option<String>,

    /// Overpass server metadata block; shape varies by server version, kept
    /// opaque.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub osm3s: Option<serde_json::Value>,

    pub elements: Vec<OsmElement>,
}

impl OsmResponse {
    /// Number of elements in the document.
    pub fn element_count(&self) -> usize {
        self.elements.len()
    }
}

/// Structurally validate a parsed upstream body.
///
/// This is the second of the two trust boundaries (the first is payload
/// validation): the body is already known to be JSON, this checks it is an
/// OSM response.
pub fn parse_response(body: serde_json::Value) -> Result<OsmResponse, JobError> {
    serde_json::from_value(body).map_err(|e| JobError::ResponseSchemaInvalid(e.to_string()))
}
