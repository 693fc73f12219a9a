//! # Docrelay Protocol
//!
//! Data model and conflict resolution policy for the docrelay sync core.
//!
//! This crate provides:
//! - `PendingOperation` for queued local mutations
//! - `RemoteCredential` for scoped access to the remote document service
//! - `DocumentMetadata` / `SyncError` result types
//! - The pure conflict resolution policy (`resolve`)
//!
//! This is a pure data crate with no I/O operations.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod credential;
mod document;
mod error;
mod operation;
mod policy;

pub use credential::RemoteCredential;
pub use document::{DocumentEnvelope, DocumentMetadata};
pub use error::{FailureCause, SyncError};
pub use operation::{OperationKind, PendingOperation, DEFAULT_EXPIRATION_SECS};
pub use policy::{resolve, AttemptOutcome, Disposition, Resolution, CONFLICT_STATUS};
