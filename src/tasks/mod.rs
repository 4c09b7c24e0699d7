use serde::{Deserialize, Serialize};

use crate::error::{ApiFailure, ApiResult};
use crate::gateway::{decode_body, Gateway};
use crate::transform::string_or_number;

/// A task as the client sees it: camelCase fields decoded from the
/// transformed response JSON. Tasks are transient copies owned by the
/// backend; nothing is cached between requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(deserialize_with = "string_or_number")]
    pub user_id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub completed: bool,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CreateTaskInput {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateTaskInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

/// Typed wrappers over the gateway, one per backend task operation. The only
/// client-side validation lives here: `create` rejects a blank title before
/// any request goes out.
pub struct TaskApi {
    gateway: Gateway,
}

impl TaskApi {
    pub fn new(gateway: Gateway) -> Self {
        Self { gateway }
    }

    pub async fn list(&self) -> ApiResult<Vec<Task>> {
        let body = self.gateway.get("/tasks/").await?;
        decode_body(body)
    }

    pub async fn create(&self, input: CreateTaskInput) -> ApiResult<Task> {
        let title = input.title.trim();
        if title.is_empty() {
            return Err(ApiFailure::validation("Task title must not be empty"));
        }
        let description = input
            .description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string);

        let payload = serde_json::to_value(CreateTaskInput {
            title: title.to_string(),
            description,
        })
        .map_err(|e| ApiFailure::validation(e.to_string()))?;

        let body = self.gateway.post("/tasks/", &payload).await?;
        decode_body(body)
    }

    pub async fn get(&self, id: &str) -> ApiResult<Task> {
        let body = self.gateway.get(&format!("/tasks/{}", id)).await?;
        decode_body(body)
    }

    pub async fn update(&self, id: &str, input: UpdateTaskInput) -> ApiResult<Task> {
        let UpdateTaskInput {
            title,
            description,
            completed,
        } = input;
        let input = UpdateTaskInput {
            title: title.map(|t| t.trim().to_string()),
            description,
            completed,
        };
        let payload =
            serde_json::to_value(input).map_err(|e| ApiFailure::validation(e.to_string()))?;

        let body = self.gateway.put(&format!("/tasks/{}", id), &payload).await?;
        decode_body(body)
    }

    /// Backend answers 204; any body it might send is ignored.
    pub async fn delete(&self, id: &str) -> ApiResult<()> {
        self.gateway.delete(&format!("/tasks/{}", id)).await?;
        Ok(())
    }

    pub async fn toggle(&self, id: &str) -> ApiResult<Task> {
        let body = self.gateway.patch(&format!("/tasks/{}/toggle", id)).await?;
        decode_body(body)
    }
}
