use std::sync::Arc;

use chrono::Utc;
use tracing::{error, warn};

use folio_db::Database;
use folio_db::models::{IdentityFields, UpsertUser};
use folio_types::models::Role;

use crate::error::ApiError;
use crate::llm::LlmClient;
use crate::notify::Notifier;
use crate::oauth::{IdentityClient, IdentityError};
use crate::session::SessionSigner;

pub type AppState = Arc<AppStateInner>;

/// Everything the handlers need from the environment. Every field is
/// optional; a missing value disables the feature that needs it.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    pub app_id: String,
    pub jwt_secret: Option<String>,
    pub oauth_server_url: Option<String>,
    pub owner_open_id: Option<String>,
    pub forge_api_url: Option<String>,
    pub forge_api_key: Option<String>,
}

pub struct AppStateInner {
    db: Option<Arc<Database>>,
    pub sessions: SessionSigner,
    pub identity: IdentityClient,
    pub llm: LlmClient,
    pub notifier: Notifier,
    owner_open_id: Option<String>,
}

impl AppStateInner {
    pub fn new(db: Option<Database>, settings: Settings) -> Result<Self, IdentityError> {
        if db.is_none() {
            warn!("No database configured; reads return empty results and writes fail");
        }
        Ok(Self {
            db: db.map(Arc::new),
            sessions: SessionSigner::new(settings.jwt_secret, settings.app_id.clone()),
            identity: IdentityClient::new(settings.oauth_server_url, settings.app_id)?,
            llm: LlmClient::new(settings.forge_api_url.clone(), settings.forge_api_key.clone()),
            notifier: Notifier::new(settings.forge_api_url, settings.forge_api_key),
            owner_open_id: settings.owner_open_id.filter(|id| !id.is_empty()),
        })
    }

    pub fn has_database(&self) -> bool {
        self.db.is_some()
    }

    /// Runs a blocking store call off the async runtime. Fails with
    /// `DatabaseUnavailable` when no store is configured.
    pub async fn db<F, T>(&self, f: F) -> Result<T, ApiError>
    where
        F: FnOnce(&Database) -> anyhow::Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let db = self.db.clone().ok_or(ApiError::DatabaseUnavailable)?;
        tokio::task::spawn_blocking(move || f(&db))
            .await
            .map_err(|e| {
                error!("spawn_blocking join error: {}", e);
                ApiError::Internal(format!("blocking task failed: {e}"))
            })?
            .map_err(ApiError::from)
    }

    /// Read path: without a store the caller gets the empty value instead of
    /// an error.
    pub async fn db_or_default<F, T>(&self, f: F) -> Result<T, ApiError>
    where
        F: FnOnce(&Database) -> anyhow::Result<T> + Send + 'static,
        T: Default + Send + 'static,
    {
        if self.db.is_none() {
            warn!("Database not available; returning empty result");
            return Ok(T::default());
        }
        self.db(f).await
    }

    /// Role forced on upsert: the configured owner is always an admin.
    pub fn role_for(&self, open_id: &str) -> Option<Role> {
        match &self.owner_open_id {
            Some(owner) if owner == open_id => Some(Role::Admin),
            _ => None,
        }
    }

    /// Records a sign-in: refreshes identity fields when given and stamps
    /// `last_signed_in`. Without a store this is a logged no-op.
    pub async fn sign_in(
        &self,
        open_id: &str,
        identity: Option<IdentityFields>,
    ) -> Result<(), ApiError> {
        if self.db.is_none() {
            warn!("Cannot upsert user {}: database not available", open_id);
            return Ok(());
        }
        let upsert = UpsertUser {
            open_id: open_id.to_string(),
            identity,
            role: self.role_for(open_id),
            last_signed_in: Utc::now(),
        };
        self.db(move |db| db.upsert_user(&upsert)).await
    }
}
