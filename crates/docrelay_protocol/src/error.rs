//! Failure results delivered to observers.

use crate::operation::OperationKind;
use thiserror::Error;

/// Underlying cause of a failed remote attempt.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FailureCause {
    /// Credential exchange failed before any document command was issued.
    ///
    /// Says nothing about the queued mutation itself, only that access to
    /// the backend could not be established right now.
    #[error("credential exchange failed: {message}")]
    Exchange {
        /// Transport or service failure description.
        message: String,
    },

    /// The conditional document command was rejected as a conflict: the
    /// remote resource diverged from the client's last known state.
    #[error("remote precondition failed (status {status}): {message}")]
    Conflict {
        /// HTTP status reported by the service.
        status: u16,
        /// Service failure description.
        message: String,
    },

    /// Any other non-success status or a transport-level fault.
    #[error("remote command failed (status {status:?}): {message}")]
    Remote {
        /// HTTP status, or `None` for a transport-level fault.
        status: Option<u16>,
        /// Failure description.
        message: String,
    },
}

impl FailureCause {
    /// Returns true if a later drain may succeed without local changes.
    ///
    /// Only exchange failures are retryable; a conflict is provably stale
    /// and other remote failures are terminal for the queued attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(self, FailureCause::Exchange { .. })
    }
}

/// A failed sync attempt for one pending operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} operation failed: {cause}")]
pub struct SyncError {
    /// The operation kind the failure applies to.
    pub kind: OperationKind,
    /// Underlying cause.
    pub cause: FailureCause,
}

impl SyncError {
    /// Creates a sync error for the given kind and cause.
    pub fn new(kind: OperationKind, cause: FailureCause) -> Self {
        Self { kind, cause }
    }
}
