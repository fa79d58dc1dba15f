//! Common data models shared across endpoints: token usage, the server error
//! envelope, and the catalog of model identifiers.

use itertools::Itertools;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

// Completion-only (legacy) models.
pub const GPT3_TEXT_DAVINCI_003: &str = "text-davinci-003";
pub const GPT3_TEXT_DAVINCI_002: &str = "text-davinci-002";
pub const GPT3_TEXT_CURIE_001: &str = "text-curie-001";
pub const GPT3_TEXT_BABBAGE_001: &str = "text-babbage-001";
pub const GPT3_TEXT_ADA_001: &str = "text-ada-001";
pub const GPT3_DAVINCI_002: &str = "davinci-002";
pub const GPT3_BABBAGE_002: &str = "babbage-002";
pub const GPT3_DOT5_TURBO_INSTRUCT: &str = "gpt-3.5-turbo-instruct";

// Chat models.
pub const GPT3_DOT5_TURBO: &str = "gpt-3.5-turbo";
pub const GPT3_DOT5_TURBO_0613: &str = "gpt-3.5-turbo-0613";
pub const GPT3_DOT5_TURBO_1106: &str = "gpt-3.5-turbo-1106";
pub const GPT3_DOT5_TURBO_16K: &str = "gpt-3.5-turbo-16k";
pub const GPT4: &str = "gpt-4";
pub const GPT4_0613: &str = "gpt-4-0613";
pub const GPT4_32K: &str = "gpt-4-32k";
pub const GPT4_TURBO_PREVIEW: &str = "gpt-4-1106-preview";
pub const GPT4_VISION_PREVIEW: &str = "gpt-4-vision-preview";
pub const GPT4O: &str = "gpt-4o";
pub const GPT4O_MINI: &str = "gpt-4o-mini";

/// Models served only by the chat endpoint.
const CHAT_ONLY_MODELS: &[&str] = &[
    GPT3_DOT5_TURBO,
    GPT3_DOT5_TURBO_0613,
    GPT3_DOT5_TURBO_1106,
    GPT3_DOT5_TURBO_16K,
    GPT4,
    GPT4_0613,
    GPT4_32K,
    GPT4_TURBO_PREVIEW,
    GPT4_VISION_PREVIEW,
    GPT4O,
    GPT4O_MINI,
];

/// Models served only by the legacy completions endpoint.
const COMPLETION_ONLY_MODELS: &[&str] = &[
    GPT3_TEXT_DAVINCI_003,
    GPT3_TEXT_DAVINCI_002,
    GPT3_TEXT_CURIE_001,
    GPT3_TEXT_BABBAGE_001,
    GPT3_TEXT_ADA_001,
    GPT3_DAVINCI_002,
    GPT3_BABBAGE_002,
    GPT3_DOT5_TURBO_INSTRUCT,
];

/// Whether `model` may be sent to the legacy `/completions` endpoint.
pub fn is_completion_model(model: &str) -> bool {
    !CHAT_ONLY_MODELS.contains(&model)
}

/// Whether `model` may be sent to `/chat/completions`.
pub fn is_chat_model(model: &str) -> bool {
    !COMPLETION_ONLY_MODELS.contains(&model)
}

/// Token usage information.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Error reported by the server, either as the whole body of a non-2xx
/// response or as a frame inside an event stream.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiError {
    #[serde(default, deserialize_with = "string_or_number")]
    pub code: Option<String>,
    #[serde(default, deserialize_with = "string_or_list")]
    pub message: String,
    #[serde(default)]
    pub param: Option<String>,
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub error_type: String,
    /// Status of the HTTP response that carried the error. Unset for in-stream errors.
    #[serde(skip)]
    pub http_status_code: Option<u16>,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.http_status_code {
            Some(status) => write!(f, "error, status code: {}, message: {}", status, self.message),
            None => f.write_str(&self.message),
        }
    }
}

impl std::error::Error for ApiError {}

/// Wire envelope `{"error": {...}}`.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorResponse {
    pub error: Option<ApiError>,
}

impl ErrorResponse {
    /// Parse a body as an error envelope, returning the inner error only when
    /// the body really carries one.
    pub fn parse(body: &[u8]) -> Option<ApiError> {
        serde_json::from_slice::<ErrorResponse>(body).ok()?.error
    }

    /// Same as [`ErrorResponse::parse`] for an already decoded JSON value.
    pub fn from_value(value: &Value) -> Option<ApiError> {
        let inner = value.get("error").filter(|e| e.is_object())?;
        serde_json::from_value(inner.clone()).ok()
    }
}

/// Deserialize a `null` as `T::default()`. Servers send `null` for empty lists.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Null) | None => None,
        Some(other) => Some(other.to_string()),
    })
}

fn string_or_list<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => s,
        Some(Value::Array(parts)) => parts
            .iter()
            .map(|part| match part {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .join(", "),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    })
}
