//! Application state shared by every handler

use sea_orm::DatabaseConnection;
use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::domain::RemoteStore;
use crate::infrastructure::{FtpStore, LocalStore};

/// Outbound timeout for the image proxy.
pub const PROXY_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone)]
pub struct AppState {
    db: DatabaseConnection,
    pub config: Arc<Config>,
    pub local_store: Arc<LocalStore>,
    pub remote_store: Arc<dyn RemoteStore>,
    pub http: reqwest::Client,
}

impl AppState {
    /// Build the state with the stores described by `config`.
    pub fn new(db: DatabaseConnection, config: Config) -> Self {
        let remote_store: Arc<dyn RemoteStore> = Arc::new(FtpStore::new(config.ftp.clone()));
        Self::with_remote_store(db, config, remote_store)
    }

    /// Same as [`AppState::new`] with a caller-provided remote store.
    pub fn with_remote_store(
        db: DatabaseConnection,
        config: Config,
        remote_store: Arc<dyn RemoteStore>,
    ) -> Self {
        let local_store = Arc::new(LocalStore::new(
            config.upload_dir.clone(),
            &config.public_uploads_url,
        ));

        let http = reqwest::Client::builder()
            .timeout(PROXY_TIMEOUT)
            .user_agent(concat!("dealhub/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!("Falling back to default HTTP client: {}", e);
                reqwest::Client::new()
            });

        Self {
            db,
            config: Arc::new(config),
            local_store,
            remote_store,
            http,
        }
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }
}
