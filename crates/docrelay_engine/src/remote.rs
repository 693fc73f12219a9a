//! Remote document client.
//!
//! Issues the conditional create/replace/delete command for one pending
//! operation using an exchanged credential. Never returns a hard error:
//! every failure mode folds into the tagged outcome consumed by the
//! resolution policy.

use crate::http::{HttpClient, HttpRequest, Method};
use docrelay_protocol::{
    AttemptOutcome, DocumentEnvelope, DocumentMetadata, OperationKind, PendingOperation,
    RemoteCredential, CONFLICT_STATUS,
};
use std::sync::Arc;
use tracing::debug;

/// Client for the remote document service.
pub struct DocumentClient<C: HttpClient> {
    api_version: String,
    client: Arc<C>,
}

impl<C: HttpClient> DocumentClient<C> {
    /// Creates a client sending the given API version string.
    pub fn new(api_version: impl Into<String>, client: Arc<C>) -> Self {
        Self {
            api_version: api_version.into(),
            client,
        }
    }

    /// Issues the document command for one pending operation.
    pub fn execute(
        &self,
        credential: &RemoteCredential,
        op: &PendingOperation,
    ) -> AttemptOutcome {
        let request = match self.build_request(credential, op) {
            Ok(request) => request,
            Err(message) => return AttemptOutcome::Failed { status: None, message },
        };

        debug!(
            "issuing {} {} for document {}",
            request.method.as_str(),
            request.url,
            op.document_id
        );

        match self.client.send(request) {
            Ok(response) => classify(op, response.status, &response.body),
            Err(message) => AttemptOutcome::Failed { status: None, message },
        }
    }

    fn build_request(
        &self,
        credential: &RemoteCredential,
        op: &PendingOperation,
    ) -> Result<HttpRequest, String> {
        let collection_url = format!(
            "https://{}/dbs/{}/colls/{}/docs",
            credential.account, credential.database, credential.collection
        );

        let mut request = match &op.kind {
            OperationKind::Create => HttpRequest::new(Method::Post, collection_url)
                .with_header("content-type", "application/json")
                .with_body(envelope_body(op)?),
            OperationKind::Replace => HttpRequest::new(Method::Post, collection_url)
                .with_header("content-type", "application/json")
                .with_header("doc-upsert", "true")
                .with_body(envelope_body(op)?),
            OperationKind::Delete => HttpRequest::new(
                Method::Delete,
                format!("{}/{}", collection_url, op.document_id),
            ),
            // Unrecognized kinds are filtered by the dispatcher before exchange.
            OperationKind::Other(kind) => {
                return Err(format!("unsupported operation kind {kind}"));
            }
        };

        request = request
            .with_header("authorization", &credential.token)
            .with_header("api-version", &self.api_version)
            .with_header("partition-key", &op.partition);

        // Create is unconditional; Replace/Delete carry the last known etag.
        if !matches!(op.kind, OperationKind::Create) {
            if let Some(etag) = &op.etag {
                request = request.with_header("if-match", etag);
            }
        }

        Ok(request)
    }
}

fn envelope_body(op: &PendingOperation) -> Result<String, String> {
    let envelope = DocumentEnvelope {
        id: op.document_id.clone(),
        partition: op.partition.clone(),
        etag: None,
        ttl: Some(op.expiration_secs),
        document: op.document.clone().unwrap_or(serde_json::Value::Null),
    };
    serde_json::to_string(&envelope).map_err(|e| format!("failed to encode document envelope: {e}"))
}

fn classify(op: &PendingOperation, status: u16, body: &str) -> AttemptOutcome {
    if (200..300).contains(&status) {
        if matches!(op.kind, OperationKind::Delete) {
            return AttemptOutcome::Applied(DocumentMetadata::deleted(
                op.document_id.clone(),
                op.partition.clone(),
            ));
        }
        return match serde_json::from_str::<DocumentEnvelope>(body) {
            Ok(envelope) => AttemptOutcome::Applied(envelope.into_metadata()),
            Err(e) => AttemptOutcome::Failed {
                status: Some(status),
                message: format!("malformed document response: {e}"),
            },
        };
    }

    if status == CONFLICT_STATUS {
        return AttemptOutcome::Conflicted {
            status,
            message: body.to_string(),
        };
    }

    AttemptOutcome::Failed {
        status: Some(status),
        message: body.to_string(),
    }
}
