//! Error types for the coprocessor path.

use vfe_core::FuseFieldIdentity;
use vfe_graph::VariableType;

/// Failure talking to the coprocessor.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("coprocessor did not answer within {timeout_ms} ms")]
    Timeout { timeout_ms: u64 },

    #[error("coprocessor unreachable: {0}")]
    Unreachable(String),

    #[error("coprocessor rejected {command} with status {status:#x}")]
    Rejected { command: &'static str, status: u32 },

    #[error("failed to marshal {command} payload: {message}")]
    Marshal {
        command: &'static str,
        message: String,
    },
}

/// Per-call query failure. Never invalidates the constructed graph.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("status for variable {index} is tagged {actual:?}, expected {expected:?}")]
    TypeMismatch {
        index: usize,
        expected: VariableType,
        actual: VariableType,
    },

    #[error("no sensed-fuse variable constructed for {0:?}")]
    NotFound(FuseFieldIdentity),

    #[error("coprocessor returned no status for variable {index}")]
    MissingStatus { index: usize },
}
