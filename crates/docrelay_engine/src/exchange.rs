//! Credential exchange client.
//!
//! Resolves a logical partition into a scoped, time-limited credential for
//! the remote document service. Exchange is always attempted before a
//! document command; a failure here is retryable and never mutates the
//! operation log.

use crate::http::{HttpClient, HttpRequest, Method};
use docrelay_protocol::RemoteCredential;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::debug;

#[derive(Debug, Serialize)]
struct ExchangeRequest<'a> {
    partitions: Vec<&'a str>,
}

#[derive(Debug, Deserialize)]
struct ExchangeResponse {
    credentials: Vec<RemoteCredential>,
}

/// Client for the credential exchange endpoint.
///
/// Credentials are cached per partition and reused while unexpired, so a
/// drain over many operations in one partition performs a single exchange.
/// Expired entries are evicted and re-exchanged transparently.
pub struct CredentialClient<C: HttpClient> {
    exchange_url: String,
    app_key: String,
    client: Arc<C>,
    cache: Mutex<HashMap<String, RemoteCredential>>,
}

impl<C: HttpClient> CredentialClient<C> {
    /// Creates a client for the given exchange endpoint.
    pub fn new(
        exchange_url: impl Into<String>,
        app_key: impl Into<String>,
        client: Arc<C>,
    ) -> Self {
        Self {
            exchange_url: exchange_url.into(),
            app_key: app_key.into(),
            client,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Resolves a logical partition into a scoped credential.
    ///
    /// Every failure mode — transport fault, non-success status, malformed
    /// or empty response — is an exchange failure: access could not be
    /// established, which says nothing about the queued mutation itself.
    pub fn exchange(&self, table: &str, partition: &str) -> Result<RemoteCredential, String> {
        let now = unix_now();
        if let Some(cached) = self.cached(partition, now) {
            debug!("reusing cached credential for partition {partition} (table {table})");
            return Ok(cached);
        }

        let body = serde_json::to_string(&ExchangeRequest {
            partitions: vec![partition],
        })
        .map_err(|e| format!("failed to encode exchange request: {e}"))?;

        let request = HttpRequest::new(Method::Post, format!("{}/partitions", self.exchange_url))
            .with_header("app-key", &self.app_key)
            .with_header("content-type", "application/json")
            .with_body(body);

        let response = self.client.send(request)?;
        if !response.is_success() {
            return Err(format!("exchange returned status {}", response.status));
        }

        let parsed: ExchangeResponse = serde_json::from_str(&response.body)
            .map_err(|e| format!("malformed exchange response: {e}"))?;
        let credential = parsed
            .credentials
            .into_iter()
            .next()
            .ok_or_else(|| format!("no credential returned for partition {partition}"))?;

        self.cache
            .lock()
            .insert(partition.to_string(), credential.clone());
        Ok(credential)
    }

    /// Drops all cached credentials.
    pub fn clear_cache(&self) {
        self.cache.lock().clear();
    }

    fn cached(&self, partition: &str, now: i64) -> Option<RemoteCredential> {
        let mut cache = self.cache.lock();
        if let Some(credential) = cache.get(partition) {
            if credential.is_valid(now) {
                return Some(credential.clone());
            }
        }
        cache.remove(partition);
        None
    }
}

fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or_default()
}
