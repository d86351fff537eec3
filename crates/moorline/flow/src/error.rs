//! Flow error types

use crate::flow::FlowStage;
use moorline_client::ClientError;
use moorline_proof::ProofError;
use moorline_types::ResultDecodeError;
use thiserror::Error;

/// Errors surfaced while driving a document lifecycle.
#[derive(Debug, Error)]
pub enum FlowError {
    /// A remote call failed
    #[error(transparent)]
    Client(#[from] ClientError),

    /// Proof-field construction failed
    #[error(transparent)]
    Proof(#[from] ProofError),

    /// The compute result attribute could not be decoded
    #[error(transparent)]
    Result(#[from] ResultDecodeError),

    /// The lifecycle task ended without reporting an outcome
    #[error("lifecycle task aborted")]
    Aborted,

    /// A transition was attempted out of order
    #[error("cannot {action} at stage {stage:?}")]
    Sequence {
        /// Transition that was attempted
        action: &'static str,
        /// Stage the flow was actually in
        stage: FlowStage,
    },
}

/// Result type for lifecycle operations
pub type FlowResult<T> = Result<T, FlowError>;
