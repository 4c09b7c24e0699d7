pub mod auth;
pub mod task;

use std::sync::Arc;

use crate::config;
use crate::gateway::Gateway;
use crate::session::SessionManager;
use crate::store::{CredentialStore, FileStore};
use crate::tasks::TaskApi;

/// Session manager wired to the file-backed store and environment config.
pub(crate) fn session_manager() -> anyhow::Result<SessionManager> {
    Ok(SessionManager::new(config::config().clone(), credential_store()?))
}

/// Task facade over a gateway reading the same file-backed store.
pub(crate) fn task_api() -> anyhow::Result<TaskApi> {
    Ok(TaskApi::new(Gateway::new(
        config::config().clone(),
        credential_store()?,
    )))
}

fn credential_store() -> anyhow::Result<Arc<dyn CredentialStore>> {
    Ok(Arc::new(FileStore::from_config_dir()?))
}
