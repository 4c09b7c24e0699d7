use std::sync::{Arc, Mutex};

use super::{CredentialStore, StoredCredentials};

/// In-memory CredentialStore for tests and embedding. Clones share the same
/// underlying entries.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    credentials: Arc<Mutex<StoredCredentials>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_credentials(credentials: StoredCredentials) -> Self {
        Self {
            credentials: Arc::new(Mutex::new(credentials)),
        }
    }
}

impl CredentialStore for MemoryStore {
    fn load(&self) -> StoredCredentials {
        self.credentials
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }

    fn store(&self, credentials: &StoredCredentials) {
        if let Ok(mut guard) = self.credentials.lock() {
            *guard = credentials.clone();
        }
    }

    fn clear(&self) {
        if let Ok(mut guard) = self.credentials.lock() {
            *guard = StoredCredentials::default();
        }
    }
}
