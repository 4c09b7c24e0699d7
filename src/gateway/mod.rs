use std::sync::Arc;

use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde_json::{json, Value};

use crate::config::ClientConfig;
use crate::error::{ApiFailure, ApiResult};
use crate::store::CredentialStore;
use crate::transform::snake_to_camel;

/// The single choke point for task-backend calls: reads the credential
/// store, attaches the bearer header when a token is present, performs the
/// call, and classifies the outcome into an `ApiResult`. Success bodies come
/// back with snake_case keys rewritten to camelCase.
///
/// The gateway never writes to the credential store; when no token is stored
/// the request simply goes out unauthenticated and the backend answers with
/// an authorization error.
pub struct Gateway {
    client: Client,
    config: ClientConfig,
    store: Arc<dyn CredentialStore>,
}

impl Gateway {
    pub fn new(config: ClientConfig, store: Arc<dyn CredentialStore>) -> Self {
        Self {
            client: Client::new(),
            config,
            store,
        }
    }

    /// Perform `method` against `endpoint` (path under the API prefix) with
    /// an optional JSON body. `Ok(None)` means the backend replied without a
    /// body (204 or empty).
    pub async fn execute(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&Value>,
    ) -> ApiResult<Option<Value>> {
        let url = self.config.endpoint_url(endpoint);
        let mut request = self.client.request(method.clone(), url.as_str());

        if let Some(token) = self.store.load().token.filter(|t| !t.is_empty()) {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        tracing::debug!(%method, %url, "dispatching api request");
        send_and_classify(request).await
    }

    pub async fn get(&self, endpoint: &str) -> ApiResult<Option<Value>> {
        self.execute(Method::GET, endpoint, None).await
    }

    pub async fn post(&self, endpoint: &str, body: &Value) -> ApiResult<Option<Value>> {
        self.execute(Method::POST, endpoint, Some(body)).await
    }

    pub async fn put(&self, endpoint: &str, body: &Value) -> ApiResult<Option<Value>> {
        self.execute(Method::PUT, endpoint, Some(body)).await
    }

    pub async fn patch(&self, endpoint: &str) -> ApiResult<Option<Value>> {
        self.execute(Method::PATCH, endpoint, None).await
    }

    pub async fn delete(&self, endpoint: &str) -> ApiResult<Option<Value>> {
        self.execute(Method::DELETE, endpoint, None).await
    }
}

/// Send a prepared request and classify the outcome. Shared with the session
/// manager, whose token-acquisition calls must not read the credential store
/// but classify responses identically.
pub(crate) async fn send_and_classify(request: RequestBuilder) -> ApiResult<Option<Value>> {
    let response = match request.send().await {
        Ok(response) => response,
        Err(e) => {
            tracing::warn!("transport failure: {}", e);
            return Err(ApiFailure::network(e.to_string()));
        }
    };

    classify_response(response).await
}

/// Outcome ladder for a received response:
/// non-2xx with a tolerantly-parsed error body, then empty body, then JSON
/// (camelCased), then verbatim text.
pub(crate) async fn classify_response(response: Response) -> ApiResult<Option<Value>> {
    let status = response.status();

    if !status.is_success() {
        let details = response
            .json::<Value>()
            .await
            .unwrap_or_else(|_| json!({}));
        let message = error_message(&details, status.as_u16());
        tracing::warn!(status = status.as_u16(), "api request failed: {}", message);
        return Err(ApiFailure::http(status.as_u16(), message, details));
    }

    if status == StatusCode::NO_CONTENT || response.content_length() == Some(0) {
        return Ok(None);
    }

    let is_json = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|ct| ct.contains("application/json"))
        .unwrap_or(false);

    let text = response
        .text()
        .await
        .map_err(|e| ApiFailure::network(e.to_string()))?;
    if text.is_empty() {
        return Ok(None);
    }

    if is_json {
        match serde_json::from_str::<Value>(&text) {
            Ok(value) => Ok(Some(snake_to_camel(value))),
            // declared JSON but not parsable as such; same bucket as any
            // other malformed transport payload
            Err(e) => Err(ApiFailure::network(e.to_string())),
        }
    } else {
        Ok(Some(Value::String(text)))
    }
}

/// Decode a classified response body into a typed shape. An absent body or
/// a mismatched shape is the collaborator violating its contract, surfaced
/// as a validation-class failure rather than a panic.
pub(crate) fn decode_body<T: serde::de::DeserializeOwned>(body: Option<Value>) -> ApiResult<T> {
    let value = body.ok_or_else(|| ApiFailure::validation("empty response body"))?;
    serde_json::from_value(value)
        .map_err(|e| ApiFailure::validation(format!("unexpected response shape: {}", e)))
}

/// Server `message` field preferred, then FastAPI-style `detail`, then a
/// generic fallback.
fn error_message(details: &Value, status: u16) -> String {
    details
        .get("message")
        .or_else(|| details.get("detail"))
        .and_then(|value| value.as_str())
        .map(str::to_string)
        .unwrap_or_else(|| format!("HTTP error {}", status))
}
