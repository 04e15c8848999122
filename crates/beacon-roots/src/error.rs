use thiserror::Error;

pub type Result<T, E = HarnessError> = std::result::Result<T, E>;

/// Fatal harness errors.
///
/// These describe a broken test input or output, never a contract outcome: a revert is reported
/// through [`crate::ExecutionResult`], not through this type.
#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("malformed test vector: {0}")]
    Decode(#[source] serde_json::Error),
    #[error("failed to encode execution result: {0}")]
    Encode(#[source] serde_json::Error),
}
