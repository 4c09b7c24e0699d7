use std::sync::Arc;

use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use crate::config::ClientConfig;
use crate::error::{ApiFailure, ApiResult};
use crate::gateway::{decode_body, send_and_classify};
use crate::store::{CredentialStore, StoredCredentials};
use crate::transform::string_or_number;

/// The current authenticated session. Held exclusively by the
/// `SessionManager`; created on login, destroyed on logout.
#[derive(Debug, Clone)]
pub struct Session {
    pub user_id: String,
    pub token: String,
    pub expires_at: Option<DateTime<Utc>>,
    pub is_authenticated: bool,
}

impl Session {
    /// Advisory only. Nothing in the client logs out or refreshes on expiry;
    /// the backend's 401 is the enforcement point.
    pub fn is_expired(&self) -> bool {
        self.expires_at.map(|at| at <= Utc::now()).unwrap_or(false)
    }
}

/// Profile returned by the `/auth/me` endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub email: String,
    pub username: String,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Token acquisition response, already camelCased by the response ladder.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_at: Option<String>,
}

/// Owns the authentication state machine: Unauthenticated (initial) and
/// Authenticated. `login` and `logout` are the only transitions that touch
/// the credential store; failed logins leave both state and store untouched.
///
/// Talks to the authentication endpoints directly rather than through the
/// `Gateway`: token acquisition happens before anything is stored, so the
/// bearer header must come from the login response, not the store.
pub struct SessionManager {
    client: Client,
    config: ClientConfig,
    store: Arc<dyn CredentialStore>,
    current: Option<Session>,
}

impl SessionManager {
    pub fn new(config: ClientConfig, store: Arc<dyn CredentialStore>) -> Self {
        Self {
            client: Client::new(),
            config,
            store,
            current: None,
        }
    }

    pub fn current(&self) -> Option<&Session> {
        self.current.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.current.is_some()
    }

    /// Re-adopt a previously persisted credential without contacting the
    /// backend. Only a complete entry (token and user id both present)
    /// counts; partial entries leave the manager Unauthenticated and the
    /// store as it was.
    pub fn restore_from_store(&mut self) -> Option<&Session> {
        let stored = self.store.load();
        if !stored.is_complete() {
            return None;
        }

        let expires_at = stored.expires_at_utc();
        self.current = Some(Session {
            // is_complete() guarantees both fields
            user_id: stored.user_id.unwrap_or_default(),
            token: stored.token.unwrap_or_default(),
            expires_at,
            is_authenticated: true,
        });
        self.current.as_ref()
    }

    /// Exchange credentials for a token, fetch the profile it belongs to,
    /// persist the result, and transition to Authenticated.
    pub async fn login(&mut self, email: &str, password: &str) -> ApiResult<Session> {
        let url = self.config.endpoint_url("/auth/token");
        let body = json!({ "email": email, "password": password });

        tracing::debug!(%url, "requesting access token");
        let response = send_and_classify(self.client.post(&url).json(&body)).await?;
        let token: TokenResponse = decode_body(response)?;

        // the token response doesn't identify the user; ask the backend
        let profile = self.fetch_profile(&token.access_token).await?;

        let credentials = StoredCredentials::new(
            token.access_token.clone(),
            profile.id.clone(),
            token.expires_at.clone(),
        );
        self.store.store(&credentials);

        let session = Session {
            user_id: profile.id,
            token: token.access_token,
            expires_at: credentials.expires_at_utc(),
            is_authenticated: true,
        };
        tracing::info!(user_id = %session.user_id, "logged in");
        self.current = Some(session.clone());
        Ok(session)
    }

    /// Clear the store and return to Unauthenticated. Safe to call in any
    /// state.
    pub fn logout(&mut self) {
        self.store.clear();
        if self.current.take().is_some() {
            tracing::info!("logged out");
        }
    }

    /// Profile of whoever the current token belongs to. Uses the active
    /// session's token, falling back to whatever the store holds.
    pub async fn whoami(&self) -> ApiResult<UserProfile> {
        let token = self
            .current
            .as_ref()
            .map(|session| session.token.clone())
            .or_else(|| self.store.load().token)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| ApiFailure::validation("not logged in"))?;

        self.fetch_profile(&token).await
    }

    /// Create a new account. Does not log in and never touches the store.
    pub async fn register(
        &self,
        email: &str,
        username: &str,
        password: &str,
    ) -> ApiResult<UserProfile> {
        let url = self.config.endpoint_url("/auth/register");
        let body = json!({
            "email": email,
            "username": username,
            "password": password,
        });

        let response = send_and_classify(self.client.post(&url).json(&body)).await?;
        decode_body(response)
    }

    async fn fetch_profile(&self, token: &str) -> ApiResult<UserProfile> {
        let url = self.config.endpoint_url("/auth/me");
        let response = send_and_classify(self.client.get(&url).bearer_auth(token)).await?;
        decode_body(response)
    }
}
