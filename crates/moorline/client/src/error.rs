//! Client error types

use thiserror::Error;

/// Errors surfaced by the node client and job poller.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Connection or body-decoding failure
    #[error("transport error: {0}")]
    Http(#[from] reqwest::Error),

    /// Status code differed from the single expected one; the body is
    /// discarded and the step is fatal
    #[error("unexpected status code: got {got}, want {want}")]
    UnexpectedStatus {
        /// Status the node returned
        got: u16,
        /// Status the operation expected
        want: u16,
    },

    /// JSON (de)serialization failure
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// The node reported the job finished with a failure
    #[error("job failed: {message}")]
    JobFailed {
        /// Service-reported failure text, verbatim
        message: String,
    },

    /// Opt-in polling bound exhausted while the job was still pending
    #[error("job {job_id} still pending after {attempts} polls")]
    PollTimeout {
        /// Job that never reached a terminal state
        job_id: String,
        /// Pending responses observed before giving up
        attempts: u32,
    },

    /// Requested attribute absent from the committed view
    #[error("attribute not found: {0}")]
    AttributeNotFound(String),
}

/// Result type for node client operations
pub type ClientResult<T> = Result<T, ClientError>;
