//! Classified job errors.
//!
//! Every failure a job attempt can produce is one [`JobError`] variant, and
//! each variant carries a fixed recoverable/unrecoverable classification.
//! The worker raises the error once at the point of detection and hands it
//! to the queue unchanged; the queue maps [`JobError::is_recoverable`] to its
//! retry policy and never reclassifies.

/// A classified failure of one job attempt.
#[derive(Debug, thiserror::Error)]
pub enum JobError {
    /// The submitted payload failed validation. Retrying cannot fix a
    /// malformed payload.
    #[error("Invalid job payload: {0}")]
    PayloadInvalid(String),

    /// The upstream call did not complete within its deadline, or was
    /// cancelled client-side.
    #[error("Upstream request timed out after {timeout_secs}s")]
    UpstreamTimeout { timeout_secs: u64 },

    /// The upstream could not be reached at all (DNS, refused connection).
    /// No HTTP response was received.
    #[error("Upstream unreachable: {0}")]
    UpstreamUnreachable(String),

    /// Upstream throttling signal (HTTP 429). The caller must back off
    /// before the next attempt.
    #[error("Rate limit exceeded (429)")]
    RateLimited,

    /// Any other non-2xx status. The request is assumed permanently invalid.
    #[error("Upstream rejected the request ({status}): {body}")]
    UpstreamRejected { status: u16, body: String },

    /// A 2xx response whose body was not parsable JSON.
    #[error("Upstream returned malformed data: {0}")]
    UpstreamMalformed(String),

    /// A parsed body that does not match the expected OSM response shape.
    #[error("Upstream response failed schema validation: {0}")]
    ResponseSchemaInvalid(String),
}

impl JobError {
    /// Whether the queue may retry the attempt.
    ///
    /// Recoverable errors are transient upstream conditions; everything else
    /// will fail identically on a retry and is terminal immediately.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            JobError::UpstreamTimeout { .. }
                | JobError::UpstreamUnreachable(_)
                | JobError::RateLimited
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_and_rate_limit_are_recoverable() {
        assert!(JobError::UpstreamTimeout { timeout_secs: 30 }.is_recoverable());
        assert!(JobError::RateLimited.is_recoverable());
        assert!(JobError::UpstreamUnreachable("dns failure".into()).is_recoverable());
    }

    #[test]
    fn payload_and_schema_errors_are_terminal() {
        assert!(!JobError::PayloadInvalid("too short".into()).is_recoverable());
        assert!(!JobError::ResponseSchemaInvalid("elements missing".into()).is_recoverable());
        assert!(!JobError::UpstreamMalformed("not json".into()).is_recoverable());
        assert!(!JobError::UpstreamRejected {
            status: 400,
            body: "bad query".into()
        }
        .is_recoverable());
    }

    #[test]
    fn rate_limit_message_names_the_status() {
        assert_eq!(JobError::RateLimited.to_string(), "Rate limit exceeded (429)");
    }

    #[test]
    fn rejected_message_carries_status_and_body() {
        let err = JobError::UpstreamRejected {
            status: 504,
            body: "gateway timeout".into(),
        };
        assert_eq!(
            err.to_string(),
            "Upstream rejected the request (504): gateway timeout"
        );
    }
}
