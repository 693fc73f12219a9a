//! Document results and the wire envelope.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Metadata for a document confirmed by the remote service.
///
/// Produced only on a successful remote command. After a delete, `etag` and
/// `document` are both `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentMetadata {
    /// Document identifier.
    pub document_id: String,
    /// Logical partition key.
    pub partition: String,
    /// Server-assigned optimistic-concurrency token.
    pub etag: Option<String>,
    /// Document body echoed by the service.
    pub document: Option<Value>,
}

impl DocumentMetadata {
    /// Metadata for a confirmed delete: no etag, no body.
    pub fn deleted(document_id: impl Into<String>, partition: impl Into<String>) -> Self {
        Self {
            document_id: document_id.into(),
            partition: partition.into(),
            etag: None,
            document: None,
        }
    }
}

/// Wire envelope wrapping a document on create/replace commands and their
/// responses.
///
/// Requests carry `id`, `partition`, `ttl` and the body; responses echo the
/// same shape with the server-assigned `etag` filled in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentEnvelope {
    /// Document identifier.
    pub id: String,
    /// Logical partition key.
    pub partition: String,
    /// Server-assigned etag; absent on requests.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
    /// Document time-to-live in seconds; absent on responses.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl: Option<i64>,
    /// The document body.
    pub document: Value,
}

impl DocumentEnvelope {
    /// Converts a response envelope into the success metadata.
    pub fn into_metadata(self) -> DocumentMetadata {
        DocumentMetadata {
            document_id: self.id,
            partition: self.partition,
            etag: self.etag,
            document: Some(self.document),
        }
    }
}
