//! Engine error types.

use thiserror::Error;

/// Result type for engine storage operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Hard failures surfaced at the engine's storage boundary.
///
/// Remote-facing failures never appear here; they fold into the tagged
/// attempt outcome consumed by the resolution policy.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The durable row store rejected an operation.
    #[error("storage failure: {0}")]
    Storage(String),
}
