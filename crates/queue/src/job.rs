//! Job delivery types and well-known names.

use serde::{Deserialize, Serialize};

use mapwatch_core::payload::JobPayload;
use mapwatch_core::types::JobId;

/// Name of the queue carrying data-fetch jobs.
pub const DATA_FETCH_QUEUE_NAME: &str = "data-fetch-queue";

/// Job name used by smoke-test producers.
pub const TEST_JOB_NAME: &str = "test-job";

/// A job as delivered to a worker.
///
/// Owned by the queue until claimed; the payload is immutable once enqueued.
/// `attempt` counts deliveries of this job including the current one, so the
/// first delivery carries `attempt == 1`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    /// Queue-assigned opaque identifier.
    pub id: JobId,

    /// Producer-chosen job name (e.g. [`TEST_JOB_NAME`]).
    pub name: String,

    pub payload: JobPayload,

    pub attempt: u32,
}
