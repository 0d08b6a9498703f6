use std::sync::Arc;

use crate::config::AppConfig;
use crate::database::{DatabaseManager, SharedStore};
use crate::directory::{self, SharedDirectory};
use crate::services::{OrganizationService, RoleService, UserService};

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: SharedStore,
    pub directory: SharedDirectory,
    pub organizations: OrganizationService,
    pub roles: RoleService,
    pub users: UserService,
}

impl AppState {
    pub fn new(config: AppConfig, store: SharedStore, directory: SharedDirectory) -> Self {
        Self {
            config: Arc::new(config),
            organizations: OrganizationService::new(store.clone()),
            roles: RoleService::new(store.clone()),
            users: UserService::new(store.clone()),
            store,
            directory,
        }
    }

    /// Open the configured store and profile directory
    pub async fn from_config(config: AppConfig) -> anyhow::Result<Self> {
        let store = DatabaseManager::open(&config.database).await?;
        let directory = directory::from_config(&config.directory)?;
        Ok(Self::new(config, store, directory))
    }
}
