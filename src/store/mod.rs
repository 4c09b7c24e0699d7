use std::fs;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

mod memory;
pub use memory::MemoryStore;

/// The persisted credential entries. Each field is independent: a token can
/// exist without a user id (for example after a half-finished login of an
/// older client version). The store keeps whatever it is given; deciding
/// whether a partial entry counts as a session is the session manager's job.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredCredentials {
    pub token: Option<String>,
    pub user_id: Option<String>,
    /// ISO 8601 timestamp; advisory only, never enforced by the client.
    pub expires_at: Option<String>,
}

impl StoredCredentials {
    pub fn new(token: String, user_id: String, expires_at: Option<String>) -> Self {
        Self {
            token: Some(token),
            user_id: Some(user_id),
            expires_at,
        }
    }

    /// True when both token and user id are present and non-empty.
    pub fn is_complete(&self) -> bool {
        matches!(&self.token, Some(t) if !t.is_empty())
            && matches!(&self.user_id, Some(u) if !u.is_empty())
    }

    pub fn expires_at_utc(&self) -> Option<DateTime<Utc>> {
        self.expires_at
            .as_deref()
            .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
            .map(|dt| dt.with_timezone(&Utc))
    }
}

/// Persisted key/value storage for the current credential. Survives process
/// restarts; cleared explicitly only by logout.
///
/// Operations are infallible from the caller's point of view: an unreadable
/// backing file loads as empty (the credential is re-obtainable by logging
/// in again) and write failures are logged rather than surfaced.
pub trait CredentialStore: Send + Sync {
    fn load(&self) -> StoredCredentials;
    fn store(&self, credentials: &StoredCredentials);
    fn clear(&self);
}

/// File-backed store: `credentials.json` under the taskdeck config dir.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Store under `$TASKDECK_CONFIG_DIR`, or `~/.config/taskdeck/` when the
    /// override is not set.
    pub fn from_config_dir() -> anyhow::Result<Self> {
        let dir = config_dir()?;
        Ok(Self {
            path: dir.join("credentials.json"),
        })
    }

    pub fn at_path(path: PathBuf) -> Self {
        Self { path }
    }
}

impl CredentialStore for FileStore {
    fn load(&self) -> StoredCredentials {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(_) => return StoredCredentials::default(),
        };
        match serde_json::from_str(&content) {
            Ok(credentials) => credentials,
            Err(e) => {
                tracing::warn!("ignoring unreadable credential file {:?}: {}", self.path, e);
                StoredCredentials::default()
            }
        }
    }

    fn store(&self, credentials: &StoredCredentials) {
        let result = serde_json::to_string_pretty(credentials)
            .map_err(anyhow::Error::from)
            .and_then(|content| fs::write(&self.path, content).map_err(anyhow::Error::from));
        if let Err(e) = result {
            tracing::warn!("failed to persist credentials to {:?}: {}", self.path, e);
        }
    }

    fn clear(&self) {
        match fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!("failed to clear credentials at {:?}: {}", self.path, e),
        }
    }
}

fn config_dir() -> anyhow::Result<PathBuf> {
    let config_dir = if let Ok(custom_dir) = std::env::var("TASKDECK_CONFIG_DIR") {
        PathBuf::from(custom_dir)
    } else {
        let home = std::env::var("HOME")
            .map_err(|_| anyhow::anyhow!("HOME environment variable not set"))?;
        PathBuf::from(home).join(".config").join("taskdeck")
    };

    if !config_dir.exists() {
        fs::create_dir_all(&config_dir)?;
    }

    Ok(config_dir)
}
