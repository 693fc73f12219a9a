//! # Docrelay Engine
//!
//! Connectivity-driven sync engine for the docrelay document store.
//!
//! This crate provides:
//! - Operation log contract and in-memory implementation
//! - Credential exchange client with expiry-aware caching
//! - Remote document client (conditional create/replace/delete)
//! - Sync dispatcher reacting to connectivity transitions
//! - HTTP transport abstraction with a scriptable mock
//!
//! ## Architecture
//!
//! A connectivity online edge triggers one synchronous drain pass: pending
//! operations are listed per table and pushed one at a time through
//! credential exchange, the remote document command, and the resolution
//! policy, strictly in enqueue order within a table.
//!
//! ## Key invariants
//!
//! - FIFO per table; an entry's pipeline completes before the next starts
//! - Exchange failures retain queue entries; conflicts discard them
//! - A single entry's failure never aborts the drain pass
//! - No retries within a pass; retries ride the next online edge

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod dispatcher;
mod error;
mod exchange;
mod http;
mod oplog;
mod remote;

pub use config::SyncConfig;
pub use dispatcher::{DrainState, DrainStats, SyncDispatcher, SyncObserver};
pub use error::{EngineError, EngineResult};
pub use exchange::CredentialClient;
pub use http::{HttpClient, HttpRequest, HttpResponse, Method, MockHttpClient};
pub use oplog::{MemoryOperationLog, OperationLog};
pub use remote::DocumentClient;
