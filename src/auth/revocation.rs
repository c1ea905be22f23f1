use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// In-memory set of revoked token ids.
///
/// Each entry is kept until the moment the token could no longer be used
/// for anything (end of its refresh window), after which `purge` drops it.
#[derive(Debug, Clone, Default)]
pub struct RevocationList {
    entries: Arc<RwLock<HashMap<Uuid, DateTime<Utc>>>>,
}

impl RevocationList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Revokes `jti` until `until`. Returns `false` if it was already revoked.
    pub async fn revoke(&self, jti: Uuid, until: DateTime<Utc>) -> bool {
        let mut entries = self.entries.write().await;
        if entries.contains_key(&jti) {
            return false;
        }
        entries.insert(jti, until);
        true
    }

    pub async fn is_revoked(&self, jti: &Uuid) -> bool {
        self.entries.read().await.contains_key(jti)
    }

    /// Drops entries whose retention has passed. Returns how many were removed.
    pub async fn purge(&self, now: DateTime<Utc>) -> usize {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, until| *until > now);
        before - entries.len()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}
