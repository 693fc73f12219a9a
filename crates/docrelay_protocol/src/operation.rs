//! Pending operations.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Default document time-to-live in seconds (one day).
pub const DEFAULT_EXPIRATION_SECS: i64 = 60 * 60 * 24;

/// Kind of queued mutation.
///
/// Rows persist the kind as a string; a value this crate does not recognize
/// round-trips through [`OperationKind::Other`] so the stored form is never
/// lost. Unrecognized kinds are skipped by the dispatcher and never reach
/// the remote service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum OperationKind {
    /// Unconditional insert of a new document.
    Create,
    /// Conditional upsert of an existing document.
    Replace,
    /// Conditional delete of an existing document.
    Delete,
    /// Unrecognized kind read back from storage; never replayed.
    Other(String),
}

impl OperationKind {
    /// Returns the stored string form.
    pub fn as_str(&self) -> &str {
        match self {
            OperationKind::Create => "CREATE",
            OperationKind::Replace => "REPLACE",
            OperationKind::Delete => "DELETE",
            OperationKind::Other(s) => s,
        }
    }

    /// Parses the stored string form, preserving unrecognized values.
    pub fn parse(s: &str) -> Self {
        match s {
            "CREATE" => OperationKind::Create,
            "REPLACE" => OperationKind::Replace,
            "DELETE" => OperationKind::Delete,
            other => OperationKind::Other(other.to_string()),
        }
    }

    /// Returns true if the dispatcher knows how to replay this kind.
    pub fn is_supported(&self) -> bool {
        !matches!(self, OperationKind::Other(_))
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<OperationKind> for String {
    fn from(kind: OperationKind) -> Self {
        match kind {
            OperationKind::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl From<String> for OperationKind {
    fn from(s: String) -> Self {
        OperationKind::parse(&s)
    }
}

/// One queued local mutation awaiting remote application.
///
/// # Fields
///
/// - `table`: the logical table (collection) the document belongs to
/// - `kind`: Create, Replace or Delete
/// - `partition`: the logical partition key
/// - `document_id`: the document identifier
/// - `document`: the serialized body; absent for deletes
/// - `etag`: the last known optimistic-concurrency token, if any
/// - `expiration_secs`: document time-to-live forwarded to the service
///
/// At most one live pending operation per (table, document id) is
/// authoritative for replay; superseding earlier queued mutations to the
/// same document is the storage layer's concern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingOperation {
    /// Logical table (collection) name.
    pub table: String,
    /// Mutation kind.
    pub kind: OperationKind,
    /// Logical partition key.
    pub partition: String,
    /// Document identifier.
    pub document_id: String,
    /// Serialized document body; `None` for deletes.
    pub document: Option<Value>,
    /// Last known optimistic-concurrency token.
    pub etag: Option<String>,
    /// Document time-to-live in seconds.
    pub expiration_secs: i64,
}

impl PendingOperation {
    /// Creates a queued Create operation.
    pub fn create(
        table: impl Into<String>,
        partition: impl Into<String>,
        document_id: impl Into<String>,
        document: Value,
    ) -> Self {
        Self::new(table, OperationKind::Create, partition, document_id, Some(document))
    }

    /// Creates a queued Replace operation.
    pub fn replace(
        table: impl Into<String>,
        partition: impl Into<String>,
        document_id: impl Into<String>,
        document: Value,
    ) -> Self {
        Self::new(table, OperationKind::Replace, partition, document_id, Some(document))
    }

    /// Creates a queued Delete operation.
    pub fn delete(
        table: impl Into<String>,
        partition: impl Into<String>,
        document_id: impl Into<String>,
    ) -> Self {
        Self::new(table, OperationKind::Delete, partition, document_id, None)
    }

    /// Creates a queued operation of an arbitrary kind.
    pub fn new(
        table: impl Into<String>,
        kind: OperationKind,
        partition: impl Into<String>,
        document_id: impl Into<String>,
        document: Option<Value>,
    ) -> Self {
        Self {
            table: table.into(),
            kind,
            partition: partition.into(),
            document_id: document_id.into(),
            document,
            etag: None,
            expiration_secs: DEFAULT_EXPIRATION_SECS,
        }
    }

    /// Sets the optimistic-concurrency token.
    pub fn with_etag(mut self, etag: impl Into<String>) -> Self {
        self.etag = Some(etag.into());
        self
    }

    /// Sets the document time-to-live in seconds.
    pub fn with_expiration(mut self, secs: i64) -> Self {
        self.expiration_secs = secs;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn kind_string_forms() {
        assert_eq!(OperationKind::Create.as_str(), "CREATE");
        assert_eq!(OperationKind::Replace.as_str(), "REPLACE");
        assert_eq!(OperationKind::Delete.as_str(), "DELETE");

        assert_eq!(OperationKind::parse("CREATE"), OperationKind::Create);
        assert_eq!(OperationKind::parse("REPLACE"), OperationKind::Replace);
        assert_eq!(OperationKind::parse("DELETE"), OperationKind::Delete);
        assert_eq!(
            OperationKind::parse("Order a coffee"),
            OperationKind::Other("Order a coffee".to_string())
        );
    }

    #[test]
    fn kind_supported() {
        assert!(OperationKind::Create.is_supported());
        assert!(OperationKind::Replace.is_supported());
        assert!(OperationKind::Delete.is_supported());
        assert!(!OperationKind::Other("PATCH".into()).is_supported());
    }

    #[test]
    fn create_defaults() {
        let op = PendingOperation::create("notes", "user-p1", "doc-1", json!({"title": "x"}));

        assert_eq!(op.kind, OperationKind::Create);
        assert_eq!(op.table, "notes");
        assert_eq!(op.partition, "user-p1");
        assert_eq!(op.document_id, "doc-1");
        assert_eq!(op.document, Some(json!({"title": "x"})));
        assert_eq!(op.etag, None);
        assert_eq!(op.expiration_secs, DEFAULT_EXPIRATION_SECS);
    }

    #[test]
    fn delete_has_no_document() {
        let op = PendingOperation::delete("notes", "user-p1", "doc-1");
        assert_eq!(op.kind, OperationKind::Delete);
        assert_eq!(op.document, None);
    }

    #[test]
    fn builder_setters() {
        let op = PendingOperation::replace("notes", "p", "d", json!({}))
            .with_etag("\"v7\"")
            .with_expiration(300);
        assert_eq!(op.etag.as_deref(), Some("\"v7\""));
        assert_eq!(op.expiration_secs, 300);
    }

    #[test]
    fn kind_serde_uses_plain_strings() {
        let encoded = serde_json::to_string(&OperationKind::Delete).unwrap();
        assert_eq!(encoded, "\"DELETE\"");

        let decoded: OperationKind = serde_json::from_str("\"Order a coffee\"").unwrap();
        assert_eq!(decoded, OperationKind::Other("Order a coffee".into()));
    }

    proptest! {
        #[test]
        fn kind_roundtrip_preserves_stored_form(s in ".{0,24}") {
            let kind = OperationKind::parse(&s);
            prop_assert_eq!(kind.as_str(), s.as_str());
        }
    }
}
