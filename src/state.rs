use std::sync::Arc;
use std::time::Duration;

use crate::auth::{IdentityProvider, RevokedSessions};
use crate::config::AppConfig;
use crate::database::RecordingRepository;
use crate::services::BulkRequestService;

/// Shared handles injected into every handler
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub repository: Arc<dyn RecordingRepository>,
    pub bulk: Arc<BulkRequestService>,
    pub identity: Arc<dyn IdentityProvider>,
    /// Sessions ended by logout
    pub sessions: Arc<RevokedSessions>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        repository: Arc<dyn RecordingRepository>,
        identity: Arc<dyn IdentityProvider>,
    ) -> Self {
        let bulk = BulkRequestService::new(Duration::from_secs(config.bulk.request_ttl_secs));
        Self {
            config: Arc::new(config),
            repository,
            bulk: Arc::new(bulk),
            identity,
            sessions: Arc::new(RevokedSessions::new()),
        }
    }

    pub fn session_secret(&self) -> &str {
        &self.config.security.session_secret
    }
}
