//! The queue seam and its in-process binding.

use async_trait::async_trait;
use tokio::sync::{mpsc, Mutex};

use mapwatch_core::error::JobError;
use mapwatch_core::payload::JobPayload;
use mapwatch_core::types::{JobId, JobResult};

use crate::job::Job;
use crate::retry::{RetryDecision, RetryPolicy};

/// Errors from the queue transport itself (not from jobs).
#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    /// The queue has been closed; no further jobs are accepted.
    #[error("Queue is closed")]
    Closed,
}

/// Producer/consumer interface of the durable job queue.
///
/// The transport is an external collaborator; everything here is the contract
/// the pipeline depends on. `fail` applies the queue's retry policy and
/// reports the decision it took, so callers can log or assert on it.
#[async_trait]
pub trait JobQueue: Send + Sync {
    /// Submit a job. Returns the queue-assigned id.
    async fn enqueue(&self, job_name: &str, payload: JobPayload) -> Result<JobId, QueueError>;

    /// Claim the next job, waiting until one is available. `None` means the
    /// queue is closed and drained.
    async fn dequeue(&self) -> Option<Job>;

    /// Record a successful attempt and archive the job.
    async fn complete(&self, job: Job, result: JobResult);

    /// Record a failed attempt. The queue re-enqueues with backoff or
    /// archives the job as terminally failed, per its policy.
    async fn fail(&self, job: Job, error: &JobError) -> RetryDecision;
}

/// In-process [`JobQueue`] binding.
///
/// Backs the seam for tests and single-process smoke runs. Delivery order is
/// FIFO; retries re-enter the channel after their backoff delay. Terminal
/// outcomes are archived and inspectable, which is what the behaviour tests
/// assert against.
pub struct InMemoryQueue {
    policy: RetryPolicy,
    sender: Mutex<Option<mpsc::UnboundedSender<Job>>>,
    receiver: Mutex<mpsc::UnboundedReceiver<Job>>,
    completed: Mutex<Vec<(Job, JobResult)>>,
    failed: Mutex<Vec<(Job, String)>>,
}

impl InMemoryQueue {
    pub fn new() -> Self {
        Self::with_policy(RetryPolicy::default())
    }

    pub fn with_policy(policy: RetryPolicy) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self {
            policy,
            sender: Mutex::new(Some(sender)),
            receiver: Mutex::new(receiver),
            completed: Mutex::new(Vec::new()),
            failed: Mutex::new(Vec::new()),
        }
    }

    /// Stop accepting new jobs. Jobs already queued are still delivered;
    /// pending retries whose delay has not elapsed are dropped.
    pub async fn close(&self) {
        self.sender.lock().await.take();
    }

    /// Archived successful outcomes, in completion order.
    pub async fn completed(&self) -> Vec<(Job, JobResult)> {
        self.completed.lock().await.clone()
    }

    /// Archived terminal failures with their last error message.
    pub async fn failed(&self) -> Vec<(Job, String)> {
        self.failed.lock().await.clone()
    }
}

impl Default for InMemoryQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl JobQueue for InMemoryQueue {
    async fn enqueue(&self, job_name: &str, payload: JobPayload) -> Result<JobId, QueueError> {
        let guard = self.sender.lock().await;
        let sender = guard.as_ref().ok_or(QueueError::Closed)?;
        let job = Job {
            id: uuid::Uuid::new_v4().to_string(),
            name: job_name.to_string(),
            payload,
            attempt: 1,
        };
        let id = job.id.clone();
        sender.send(job).map_err(|_| QueueError::Closed)?;
        tracing::debug!(job_id = %id, job_name, "Job enqueued");
        Ok(id)
    }

    async fn dequeue(&self) -> Option<Job> {
        self.receiver.lock().await.recv().await
    }

    async fn complete(&self, job: Job, result: JobResult) {
        tracing::info!(job_id = %job.id, attempt = job.attempt, "Job completed");
        self.completed.lock().await.push((job, result));
    }

    async fn fail(&self, job: Job, error: &JobError) -> RetryDecision {
        let decision = self.policy.decide(error, job.attempt);
        match decision {
            RetryDecision::Retry { delay } => {
                tracing::warn!(
                    job_id = %job.id,
                    attempt = job.attempt,
                    delay_ms = delay.as_millis() as u64,
                    error = %error,
                    "Job failed, retrying with backoff"
                );
                let sender = self.sender.lock().await.clone();
                let mut retry_job = job;
                retry_job.attempt += 1;
                if let Some(sender) = sender {
                    tokio::spawn(async move {
                        tokio::time::sleep(delay).await;
                        if sender.send(retry_job).is_err() {
                            tracing::warn!("Queue closed before a scheduled retry was delivered");
                        }
                    });
                }
            }
            RetryDecision::Terminal => {
                tracing::error!(
                    job_id = %job.id,
                    attempt = job.attempt,
                    error = %error,
                    "Job terminally failed"
                );
                self.failed.lock().await.push((job, error.to_string()));
            }
        }
        decision
    }
}
