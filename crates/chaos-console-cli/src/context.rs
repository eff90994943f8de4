/*
[INPUT]:  Loaded ConsoleConfig
[OUTPUT]: AppContext shared by all command handlers
[POS]:    Application layer - dependency wiring
[UPDATE]: When handlers need new shared resources
*/

use anyhow::Result;
use chaos_console_adapter::ChaosClient;
use std::sync::Arc;
use tracing::debug;

use crate::action::Action;
use crate::config::ConsoleConfig;
use crate::session::{SessionState, SessionStore};

/// Everything a command handler needs, passed explicitly
#[derive(Debug)]
pub struct AppContext {
    pub config: ConsoleConfig,
    pub client: Arc<ChaosClient>,
    pub store: SessionStore,
    pub session: SessionState,
}

impl AppContext {
    /// Build the client and hydrate the session
    pub async fn new(config: ConsoleConfig) -> Result<Self> {
        let client = Arc::new(config.build_client()?);
        let store = match &config.session_dir {
            Some(dir) => SessionStore::new(dir),
            None => SessionStore::in_data_dir()?,
        };
        let session = store.load().await?;
        debug!(path = %store.path().display(), "session loaded");

        Ok(Self {
            config,
            client,
            store,
            session,
        })
    }

    /// Apply an action and persist the session
    pub async fn record(&mut self, action: impl Into<Action>) -> Result<()> {
        let action = action.into();
        debug!(?action, "recording action");
        self.session.apply(action);
        self.store.save(&self.session).await
    }
}
