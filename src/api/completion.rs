//! Legacy text completions (`/completions`).
//! See: <https://platform.openai.com/docs/api-reference/completions>

use reqwest::Method;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

use crate::client::{Client, ClientError};
use crate::context::RequestContext;
use crate::model::{is_completion_model, null_as_default, Usage};
use crate::stream::StreamReader;

const COMPLETIONS_SUFFIX: &str = "/completions";

/// Stream of completion chunks.
pub type CompletionStream = StreamReader<CompletionResponse>;

/// A prompt: one string or a batch of them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Prompt {
    Text(String),
    Batch(Vec<String>),
}

impl From<&str> for Prompt {
    fn from(s: &str) -> Self {
        Prompt::Text(s.to_string())
    }
}

impl From<String> for Prompt {
    fn from(s: String) -> Self {
        Prompt::Text(s)
    }
}

impl From<Vec<String>> for Prompt {
    fn from(batch: Vec<String>) -> Self {
        Prompt::Batch(batch)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt: Option<Prompt>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suffix: Option<String>,
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
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logprobs: Option<u32>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub echo: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub stop: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub presence_penalty: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frequency_penalty: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub best_of: Option<u32>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub logit_bias: HashMap<String, i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
}

impl CompletionRequest {
    pub fn new(model: impl Into<String>, prompt: impl Into<Prompt>) -> Self {
        Self {
            model: model.into(),
            prompt: Some(prompt.into()),
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

    pub fn with_stop(mut self, stop: Vec<String>) -> Self {
        self.stop = stop;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LogprobResult {
    #[serde(default, deserialize_with = "null_as_default")]
    pub tokens: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub token_logprobs: Vec<f32>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub top_logprobs: Vec<HashMap<String, f32>>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub text_offset: Vec<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompletionChoice {
    pub text: String,
    #[serde(default)]
    pub index: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub finish_reason: String,
    #[serde(default)]
    pub logprobs: Option<LogprobResult>,
}

/// A full completion, or one chunk of a completion stream.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompletionResponse {
    pub id: String,
    pub object: String,
    pub created: i64,
    pub model: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub choices: Vec<CompletionChoice>,
    /// Absent from stream chunks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
}

impl Client {
    /// Create a completion.
    pub async fn create_completion(
        &self,
        ctx: &RequestContext,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, ClientError> {
        if request.stream {
            return Err(ClientError::CompletionStreamNotSupported);
        }
        if !is_completion_model(&request.model) {
            return Err(ClientError::CompletionUnsupportedModel(request.model));
        }

        let req = self
            .request(Method::POST, COMPLETIONS_SUFFIX, Some(&request.model))
            .json(&request);
        self.send_request(ctx, req).await
    }

    /// Create a completion and receive it as a stream of chunks.
    pub async fn create_completion_stream(
        &self,
        ctx: &RequestContext,
        mut request: CompletionRequest,
    ) -> Result<CompletionStream, ClientError> {
        if !is_completion_model(&request.model) {
            return Err(ClientError::CompletionUnsupportedModel(request.model));
        }
        request.stream = true;
        debug!(model = %request.model, "opening completion stream");

        self.open_stream(ctx, COMPLETIONS_SUFFIX, Some(&request.model), &request)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_serialization_skips_unset_fields() {
        let request = CompletionRequest::new("babbage-002", "Lorem ipsum").with_max_tokens(5);
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            json!({"model": "babbage-002", "prompt": "Lorem ipsum", "max_tokens": 5})
        );
    }

    #[test]
    fn test_batch_prompt() {
        let request = CompletionRequest::new(
            "babbage-002",
            vec!["a".to_string(), "b".to_string()],
        );
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["prompt"], json!(["a", "b"]));
    }

    #[test]
    fn test_stream_chunk_without_usage() {
        let chunk: CompletionResponse = serde_json::from_str(
            r#"{"id":"1","object":"completion","created":1598069254,"model":"text-davinci-002","choices":[{"text":"response1","finish_reason":"max_tokens"}]}"#,
        )
        .unwrap();
        assert_eq!(chunk.choices[0].text, "response1");
        assert_eq!(chunk.choices[0].finish_reason, "max_tokens");
        assert!(chunk.usage.is_none());
    }

    #[tokio::test]
    async fn test_unsupported_model_rejected_before_sending() {
        let client = Client::with_config(
            crate::config::ClientConfig::new("whatever").with_base_url("http://localhost/v1".to_string()),
        )
        .unwrap();
        let request = CompletionRequest::new(crate::model::GPT3_DOT5_TURBO, "hi").with_max_tokens(5);

        let err = client
            .create_completion_stream(&RequestContext::background(), request.clone())
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::CompletionUnsupportedModel(_)));

        let err = client
            .create_completion(&RequestContext::background(), request)
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::CompletionUnsupportedModel(_)));
    }

    #[tokio::test]
    async fn test_stream_flag_rejected_on_unary_call() {
        let client = Client::new("whatever").unwrap();
        let mut request = CompletionRequest::new("babbage-002", "hi");
        request.stream = true;
        let err = client
            .create_completion(&RequestContext::background(), request)
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::CompletionStreamNotSupported));
    }
}
