use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;
use url::Url;

/// Client configuration: where the backend lives and the API path prefix
/// every endpoint is mounted under. Both are read once at startup; nothing
/// else in the pipeline is configurable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    pub base_url: Url,
    pub api_prefix: String,
}

impl ClientConfig {
    /// Build from `TASKDECK_API_URL` / `TASKDECK_API_PREFIX`, falling back to
    /// the development defaults of the backend this client talks to.
    pub fn from_env() -> anyhow::Result<Self> {
        let raw_url = env::var("TASKDECK_API_URL")
            .unwrap_or_else(|_| "http://localhost:8000".to_string());
        let base_url = Url::parse(&raw_url)
            .map_err(|e| anyhow::anyhow!("invalid TASKDECK_API_URL '{}': {}", raw_url, e))?;

        let api_prefix =
            env::var("TASKDECK_API_PREFIX").unwrap_or_else(|_| "/api/v1".to_string());

        Ok(Self {
            base_url,
            api_prefix: normalize_prefix(&api_prefix),
        })
    }

    pub fn new(base_url: Url, api_prefix: &str) -> Self {
        Self {
            base_url,
            api_prefix: normalize_prefix(api_prefix),
        }
    }

    /// Full URL for an endpoint path such as `/tasks/` or `/auth/token`.
    pub fn endpoint_url(&self, endpoint: &str) -> String {
        let base = self.base_url.as_str().trim_end_matches('/');
        format!("{}{}{}", base, self.api_prefix, endpoint)
    }
}

/// Prefix always starts with `/` and never ends with one; empty stays empty.
fn normalize_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return String::new();
    }
    if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{}", trimmed)
    }
}

// Global singleton for the CLI path; library callers construct their own.
pub static CONFIG: Lazy<ClientConfig> = Lazy::new(|| {
    ClientConfig::from_env().unwrap_or_else(|e| {
        tracing::error!("configuration error: {}", e);
        std::process::exit(1);
    })
});

pub fn config() -> &'static ClientConfig {
    &CONFIG
}
