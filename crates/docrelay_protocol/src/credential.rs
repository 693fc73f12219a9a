//! Remote service credentials.

use serde::{Deserialize, Serialize};

/// A scoped, time-limited credential for the remote document service.
///
/// Produced by the credential exchange; maps a logical partition to the
/// physical resource coordinates plus a bearer token. Never persisted —
/// a credential is scoped to a drain pass or until it expires, whichever
/// comes first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteCredential {
    /// Logical partition this credential is scoped to.
    pub partition: String,
    /// Host of the storage account serving the partition.
    pub account: String,
    /// Database name within the account.
    pub database: String,
    /// Collection name within the database.
    pub collection: String,
    /// Bearer token presented on document commands.
    pub token: String,
    /// Expiry as unix seconds.
    pub expires_on: i64,
}

impl RemoteCredential {
    /// Returns true if the credential has expired at `now` (unix seconds).
    pub fn is_expired(&self, now: i64) -> bool {
        now >= self.expires_on
    }

    /// Returns true if the credential is still usable at `now`.
    pub fn is_valid(&self, now: i64) -> bool {
        !self.is_expired(now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credential(expires_on: i64) -> RemoteCredential {
        RemoteCredential {
            partition: "user-p1".into(),
            account: "acct.docs.example.com".into(),
            database: "appdb".into(),
            collection: "notes".into(),
            token: "rt-abc".into(),
            expires_on,
        }
    }

    #[test]
    fn expiry_boundary() {
        let cred = credential(1_000);
        assert!(cred.is_valid(999));
        assert!(cred.is_expired(1_000));
        assert!(cred.is_expired(1_001));
    }

    #[test]
    fn wire_roundtrip() {
        let cred = credential(42);
        let encoded = serde_json::to_string(&cred).unwrap();
        let decoded: RemoteCredential = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, cred);
    }
}
