//! Job-queue collaborator interface.
//!
//! The durable queue itself is an external system; this crate specifies the
//! interface the rest of the pipeline programs against ([`queue::JobQueue`]),
//! the delivery types, and the queue-owned retry policy. [`queue::InMemoryQueue`]
//! is the in-process binding used by tests and single-process smoke runs.

pub mod job;
pub mod queue;
pub mod retry;

pub use job::{Job, DATA_FETCH_QUEUE_NAME, TEST_JOB_NAME};
pub use queue::{InMemoryQueue, JobQueue, QueueError};
pub use retry::{RetryDecision, RetryPolicy};
