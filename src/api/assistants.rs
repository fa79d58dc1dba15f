//! Assistants and assistant files (`/assistants`, beta).

use reqwest::{Method, RequestBuilder};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use crate::client::{Client, ClientError};
use crate::context::RequestContext;
use crate::model::null_as_default;

const ASSISTANTS_SUFFIX: &str = "/assistants";
const ASSISTANTS_FILES_SUFFIX: &str = "/files";
const BETA_HEADER: &str = "OpenAI-Beta";
const BETA_ASSISTANTS_VERSION: &str = "assistants=v1";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssistantToolType {
    CodeInterpreter,
    Retrieval,
    Function,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDefinition {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// JSON schema of the function arguments.
    #[serde(default)]
    pub parameters: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssistantTool {
    #[serde(rename = "type")]
    pub tool_type: AssistantToolType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function: Option<FunctionDefinition>,
}

impl AssistantTool {
    pub fn new(tool_type: AssistantToolType) -> Self {
        Self {
            tool_type,
            function: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Assistant {
    pub id: String,
    pub object: String,
    pub created_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
    /// `None` when the server sent no tools at all.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<AssistantTool>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_ids: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<HashMap<String, Value>>,
}

/// Body of create and modify calls.
///
/// `tools: None` leaves the field out of the JSON, so a modify call keeps the
/// assistant's tools; `Some(vec![])` clears them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssistantRequest {
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<AssistantTool>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_ids: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<HashMap<String, Value>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssistantsList {
    #[serde(rename = "data", default, deserialize_with = "null_as_default")]
    pub assistants: Vec<Assistant>,
    #[serde(default)]
    pub last_id: Option<String>,
    #[serde(default)]
    pub first_id: Option<String>,
    #[serde(default)]
    pub has_more: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantDeleteResponse {
    pub id: String,
    pub object: String,
    pub deleted: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssistantFile {
    pub id: String,
    pub object: String,
    pub created_at: i64,
    pub assistant_id: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssistantFileRequest {
    pub file_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssistantFilesList {
    #[serde(rename = "data", default, deserialize_with = "null_as_default")]
    pub assistant_files: Vec<AssistantFile>,
}

/// Cursor parameters of list calls.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pagination {
    pub limit: Option<u32>,
    /// `asc` or `desc`
    pub order: Option<String>,
    pub after: Option<String>,
    pub before: Option<String>,
}

impl Pagination {
    /// Set parameters as query pairs, for `RequestBuilder::query`.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        [
            ("limit", self.limit.map(|l| l.to_string())),
            ("order", self.order.clone()),
            ("after", self.after.clone()),
            ("before", self.before.clone()),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.map(|v| (key, v)))
        .collect()
    }
}

impl Client {
    fn assistants_request(&self, method: Method, suffix: &str) -> RequestBuilder {
        self.request(method, suffix, None)
            .header(BETA_HEADER, BETA_ASSISTANTS_VERSION)
    }

    pub async fn create_assistant(
        &self,
        ctx: &RequestContext,
        request: AssistantRequest,
    ) -> Result<Assistant, ClientError> {
        let req = self
            .assistants_request(Method::POST, ASSISTANTS_SUFFIX)
            .json(&request);
        self.send_request(ctx, req).await
    }

    pub async fn retrieve_assistant(
        &self,
        ctx: &RequestContext,
        assistant_id: &str,
    ) -> Result<Assistant, ClientError> {
        let suffix = format!("{}/{}", ASSISTANTS_SUFFIX, assistant_id);
        let req = self.assistants_request(Method::GET, &suffix);
        self.send_request(ctx, req).await
    }

    pub async fn modify_assistant(
        &self,
        ctx: &RequestContext,
        assistant_id: &str,
        request: AssistantRequest,
    ) -> Result<Assistant, ClientError> {
        let suffix = format!("{}/{}", ASSISTANTS_SUFFIX, assistant_id);
        let req = self.assistants_request(Method::POST, &suffix).json(&request);
        self.send_request(ctx, req).await
    }

    pub async fn delete_assistant(
        &self,
        ctx: &RequestContext,
        assistant_id: &str,
    ) -> Result<AssistantDeleteResponse, ClientError> {
        let suffix = format!("{}/{}", ASSISTANTS_SUFFIX, assistant_id);
        let req = self.assistants_request(Method::DELETE, &suffix);
        self.send_request(ctx, req).await
    }

    pub async fn list_assistants(
        &self,
        ctx: &RequestContext,
        pagination: &Pagination,
    ) -> Result<AssistantsList, ClientError> {
        let req = self
            .assistants_request(Method::GET, ASSISTANTS_SUFFIX)
            .query(&pagination.query_pairs());
        self.send_request(ctx, req).await
    }

    pub async fn create_assistant_file(
        &self,
        ctx: &RequestContext,
        assistant_id: &str,
        request: AssistantFileRequest,
    ) -> Result<AssistantFile, ClientError> {
        let suffix = format!("{}/{}{}", ASSISTANTS_SUFFIX, assistant_id, ASSISTANTS_FILES_SUFFIX);
        let req = self.assistants_request(Method::POST, &suffix).json(&request);
        self.send_request(ctx, req).await
    }

    pub async fn retrieve_assistant_file(
        &self,
        ctx: &RequestContext,
        assistant_id: &str,
        file_id: &str,
    ) -> Result<AssistantFile, ClientError> {
        let suffix = format!(
            "{}/{}{}/{}",
            ASSISTANTS_SUFFIX, assistant_id, ASSISTANTS_FILES_SUFFIX, file_id
        );
        let req = self.assistants_request(Method::GET, &suffix);
        self.send_request(ctx, req).await
    }

    /// Detach a file from an assistant. The response body is not inspected.
    pub async fn delete_assistant_file(
        &self,
        ctx: &RequestContext,
        assistant_id: &str,
        file_id: &str,
    ) -> Result<(), ClientError> {
        let suffix = format!(
            "{}/{}{}/{}",
            ASSISTANTS_SUFFIX, assistant_id, ASSISTANTS_FILES_SUFFIX, file_id
        );
        let req = self.assistants_request(Method::DELETE, &suffix);
        self.send_request_discarding_body(ctx, req).await
    }

    pub async fn list_assistant_files(
        &self,
        ctx: &RequestContext,
        assistant_id: &str,
        pagination: &Pagination,
    ) -> Result<AssistantFilesList, ClientError> {
        let suffix = format!("{}/{}{}", ASSISTANTS_SUFFIX, assistant_id, ASSISTANTS_FILES_SUFFIX);
        let req = self
            .assistants_request(Method::GET, &suffix)
            .query(&pagination.query_pairs());
        self.send_request(ctx, req).await
    }
}
