//! Chat completions (`/chat/completions`).

use reqwest::Method;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

use crate::client::{Client, ClientError};
use crate::context::RequestContext;
use crate::model::{is_chat_model, null_as_default, Usage};
use crate::stream::StreamReader;

const CHAT_COMPLETIONS_SUFFIX: &str = "/chat/completions";

/// Stream of chat completion deltas.
pub type ChatCompletionStream = StreamReader<ChatCompletionStreamResponse>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
    Tool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatCompletionMessage {
    pub role: ChatRole,
    #[serde(default, deserialize_with = "null_as_default")]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl ChatCompletionMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
            name: None,
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
            name: None,
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
            name: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatCompletionMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub n: Option<u32>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub stream: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub stop: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub presence_penalty: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frequency_penalty: Option<f32>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub logit_bias: HashMap<String, i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
}

impl ChatCompletionRequest {
    pub fn new(model: impl Into<String>, messages: Vec<ChatCompletionMessage>) -> Self {
        Self {
            model: model.into(),
            messages,
            ..Default::default()
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatCompletionChoice {
    #[serde(default)]
    pub index: u32,
    pub message: ChatCompletionMessage,
    #[serde(default, deserialize_with = "null_as_default")]
    pub finish_reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatCompletionResponse {
    pub id: String,
    pub object: String,
    pub created: i64,
    pub model: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub choices: Vec<ChatCompletionChoice>,
    #[serde(default)]
    pub usage: Usage,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatCompletionStreamChoiceDelta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<ChatRole>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatCompletionStreamChoice {
    #[serde(default)]
    pub index: u32,
    #[serde(default)]
    pub delta: ChatCompletionStreamChoiceDelta,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// One chunk of a chat completion stream.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatCompletionStreamResponse {
    pub id: String,
    pub object: String,
    pub created: i64,
    pub model: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub choices: Vec<ChatCompletionStreamChoice>,
    /// Only present on the last chunk, when the server reports usage.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
}

impl Client {
    /// Create a chat completion.
    pub async fn create_chat_completion(
        &self,
        ctx: &RequestContext,
        request: ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, ClientError> {
        if request.stream {
            return Err(ClientError::ChatCompletionStreamNotSupported);
        }
        if !is_chat_model(&request.model) {
            return Err(ClientError::ChatCompletionInvalidModel(request.model));
        }

        let req = self
            .request(Method::POST, CHAT_COMPLETIONS_SUFFIX, Some(&request.model))
            .json(&request);
        self.send_request(ctx, req).await
    }

    /// Create a chat completion and receive it as a stream of deltas.
    pub async fn create_chat_completion_stream(
        &self,
        ctx: &RequestContext,
        mut request: ChatCompletionRequest,
    ) -> Result<ChatCompletionStream, ClientError> {
        if !is_chat_model(&request.model) {
            return Err(ClientError::ChatCompletionInvalidModel(request.model));
        }
        request.stream = true;
        debug!(model = %request.model, "opening chat completion stream");

        self.open_stream(ctx, CHAT_COMPLETIONS_SUFFIX, Some(&request.model), &request)
            .await
    }
}
