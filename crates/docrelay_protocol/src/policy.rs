//! Conflict resolution policy.
//!
//! The policy is a pure function from the tagged outcome of one two-phase
//! remote attempt to a queue disposition plus the result handed to a
//! registered observer. Keeping it here, away from transport code, lets the
//! decision table be tested in isolation.

use crate::document::DocumentMetadata;
use crate::error::{FailureCause, SyncError};
use crate::operation::OperationKind;
use serde_json::Value;

/// The status the remote service uses for a failed precondition.
pub const CONFLICT_STATUS: u16 = 409;

/// Tagged outcome of the two-phase remote attempt for one pending operation.
#[derive(Debug, Clone, PartialEq)]
pub enum AttemptOutcome {
    /// Credential exchange failed; no document command was issued.
    ExchangeFailed {
        /// Transport or service failure description.
        message: String,
    },
    /// The document command succeeded.
    Applied(DocumentMetadata),
    /// The conditional command was rejected because the remote diverged.
    Conflicted {
        /// HTTP status reported by the service.
        status: u16,
        /// Service failure description.
        message: String,
    },
    /// Any other non-success status or a transport fault.
    Failed {
        /// HTTP status, or `None` for a transport-level fault.
        status: Option<u16>,
        /// Failure description.
        message: String,
    },
}

/// What the operation log should do with the queue entry.
#[derive(Debug, Clone, PartialEq)]
pub enum Disposition {
    /// Leave the entry pending for the next connectivity edge.
    Retain,
    /// Clear the pending marker, optionally storing a new etag/body.
    Finalize {
        /// Server-assigned etag to store, if any.
        etag: Option<String>,
        /// Document body to store, if any.
        document: Option<Value>,
    },
    /// Remove the entry; the local intent is void.
    Discard,
}

/// A policy decision for one processed entry.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    /// Queue disposition applied by the operation log.
    pub disposition: Disposition,
    /// Result delivered to the observer, if one is registered.
    pub result: Result<DocumentMetadata, SyncError>,
}

/// Decides the disposition and observer result for one remote attempt.
///
/// | Outcome | Disposition | Result |
/// |---|---|---|
/// | exchange failure | retain unchanged | error (retryable) |
/// | success | finalize with new etag/body | metadata |
/// | conflict | discard | error |
/// | other failure | finalize unchanged | error |
///
/// Transient access failures must not destroy queued intent; a confirmed
/// conflict would repeat identically on every retry, so the entry is
/// dropped; other deterministic failures are finalized rather than retried
/// forever, at the cost of losing that mutation. Unrecognized kinds are
/// short-circuited by the dispatcher and never reach this function.
pub fn resolve(kind: &OperationKind, outcome: AttemptOutcome) -> Resolution {
    match outcome {
        AttemptOutcome::ExchangeFailed { message } => Resolution {
            disposition: Disposition::Retain,
            result: Err(SyncError::new(
                kind.clone(),
                FailureCause::Exchange { message },
            )),
        },
        AttemptOutcome::Applied(metadata) => Resolution {
            disposition: Disposition::Finalize {
                etag: metadata.etag.clone(),
                document: metadata.document.clone(),
            },
            result: Ok(metadata),
        },
        AttemptOutcome::Conflicted { status, message } => Resolution {
            disposition: Disposition::Discard,
            result: Err(SyncError::new(
                kind.clone(),
                FailureCause::Conflict { status, message },
            )),
        },
        AttemptOutcome::Failed { status, message } => Resolution {
            disposition: Disposition::Finalize {
                etag: None,
                document: None,
            },
            result: Err(SyncError::new(
                kind.clone(),
                FailureCause::Remote { status, message },
            )),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn metadata() -> DocumentMetadata {
        DocumentMetadata {
            document_id: "doc-1".into(),
            partition: "user-p1".into(),
            etag: Some("\"v3\"".into()),
            document: Some(json!({"title": "x"})),
        }
    }

    #[test]
    fn exchange_failure_retains() {
        let resolution = resolve(
            &OperationKind::Create,
            AttemptOutcome::ExchangeFailed { message: "service unavailable".into() },
        );

        assert_eq!(resolution.disposition, Disposition::Retain);
        let err = resolution.result.unwrap_err();
        assert_eq!(err.kind, OperationKind::Create);
        assert!(err.cause.is_retryable());
    }

    #[test]
    fn success_finalizes_with_server_state() {
        let resolution = resolve(&OperationKind::Replace, AttemptOutcome::Applied(metadata()));

        assert_eq!(
            resolution.disposition,
            Disposition::Finalize {
                etag: Some("\"v3\"".into()),
                document: Some(json!({"title": "x"})),
            }
        );
        assert_eq!(resolution.result.unwrap(), metadata());
    }

    #[test]
    fn delete_success_finalizes_without_etag() {
        let resolution = resolve(
            &OperationKind::Delete,
            AttemptOutcome::Applied(DocumentMetadata::deleted("doc-1", "user-p1")),
        );

        assert_eq!(
            resolution.disposition,
            Disposition::Finalize { etag: None, document: None }
        );
        assert!(resolution.result.is_ok());
    }

    #[test]
    fn conflict_discards() {
        let resolution = resolve(
            &OperationKind::Delete,
            AttemptOutcome::Conflicted { status: 409, message: "etag mismatch".into() },
        );

        assert_eq!(resolution.disposition, Disposition::Discard);
        let err = resolution.result.unwrap_err();
        assert_eq!(
            err.cause,
            FailureCause::Conflict { status: 409, message: "etag mismatch".into() }
        );
    }

    #[test]
    fn other_failure_finalizes_unchanged() {
        let resolution = resolve(
            &OperationKind::Replace,
            AttemptOutcome::Failed { status: Some(500), message: "You failed!".into() },
        );

        assert_eq!(
            resolution.disposition,
            Disposition::Finalize { etag: None, document: None }
        );
        let err = resolution.result.unwrap_err();
        assert!(!err.cause.is_retryable());
    }

    #[test]
    fn transport_fault_is_a_plain_failure() {
        let resolution = resolve(
            &OperationKind::Create,
            AttemptOutcome::Failed { status: None, message: "connection reset".into() },
        );

        assert_eq!(
            resolution.disposition,
            Disposition::Finalize { etag: None, document: None }
        );
        assert_eq!(
            resolution.result.unwrap_err().cause,
            FailureCause::Remote { status: None, message: "connection reset".into() }
        );
    }

    proptest! {
        #[test]
        fn failed_never_touches_stored_state(
            status in proptest::option::of(100u16..600),
            message in ".{0,32}",
        ) {
            let resolution = resolve(
                &OperationKind::Create,
                AttemptOutcome::Failed { status, message },
            );
            prop_assert_eq!(
                resolution.disposition,
                Disposition::Finalize { etag: None, document: None }
            );
            prop_assert!(resolution.result.is_err());
        }

        #[test]
        fn exchange_failures_always_retry(message in ".{0,32}") {
            let resolution = resolve(
                &OperationKind::Delete,
                AttemptOutcome::ExchangeFailed { message },
            );
            prop_assert_eq!(resolution.disposition, Disposition::Retain);
            prop_assert!(resolution.result.unwrap_err().cause.is_retryable());
        }
    }
}
