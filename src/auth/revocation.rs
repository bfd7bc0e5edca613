use std::collections::HashMap;
use std::sync::{Arc, Weak};
use std::time::Duration;

use tokio::sync::RwLock;
use uuid::Uuid;

use super::SessionClaims;

/// Sessions ended by logout before their token expired.
///
/// Keyed by the token's `jti`; each entry is kept only until the token's own
/// `exp`, after which the signature check rejects it anyway.
#[derive(Default)]
pub struct RevokedSessions {
    revoked: RwLock<HashMap<Uuid, i64>>,
}

impl RevokedSessions {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn revoke(&self, claims: &SessionClaims) {
        self.revoked.write().await.insert(claims.jti, claims.exp);
        tracing::info!("Session {} for {} revoked", claims.jti, claims.sub);
    }

    pub async fn is_revoked(&self, jti: Uuid) -> bool {
        self.revoked.read().await.contains_key(&jti)
    }

    /// Forget revocations whose tokens have expired; returns how many
    pub async fn evict_expired(&self) -> usize {
        let now = chrono::Utc::now().timestamp();
        let mut revoked = self.revoked.write().await;
        let before = revoked.len();
        revoked.retain(|_, exp| *exp > now);
        before - revoked.len()
    }

    pub fn spawn_sweeper(self: &Arc<Self>, interval: Duration) -> tokio::task::JoinHandle<()> {
        let sessions: Weak<Self> = Arc::downgrade(self);
        let interval = interval.max(crate::services::bulk_service::MIN_SWEEP_INTERVAL);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let Some(sessions) = sessions.upgrade() else {
                    break;
                };
                let evicted = sessions.evict_expired().await;
                if evicted > 0 {
                    tracing::debug!("Forgot {} expired session revocations", evicted);
                }
            }
        })
    }
}
