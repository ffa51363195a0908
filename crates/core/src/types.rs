//! Shared identifier and result types.

use serde::{Deserialize, Serialize};

use crate::confidence::DataStats;

/// Queue-assigned job identifier. Opaque to the worker; the queue owns the
/// format (the in-memory queue uses UUIDs, a broker may use anything).
pub type JobId = String;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Outcome returned to the queue after a successful attempt.
///
/// A job either produces a full `JobResult` or fails with a classified
/// [`JobError`](crate::error::JobError); partial results are never returned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobResult {
    pub success: bool,

    /// When the attempt finished (UTC).
    pub processed_at: Timestamp,

    /// Element count and confidence flag for the fetched data. `None` only
    /// for results that carried no data stage (not produced by the current
    /// pipeline, but the queue contract allows it).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_stats: Option<DataStats>,
}

impl JobResult {
    /// Build a successful result stamped with the current time.
    pub fn success(data_stats: DataStats) -> Self {
        Self {
            success: true,
            processed_at: chrono::Utc::now(),
            data_stats: Some(data_stats),
        }
    }
}
