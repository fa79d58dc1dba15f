//! Edits (`/edits`).

use reqwest::Method;
use serde::{Deserialize, Serialize};

use crate::client::{Client, ClientError};
use crate::context::RequestContext;
use crate::model::{null_as_default, Usage};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EditsRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub input: String,
    pub instruction: String,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub n: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
}

fn is_zero(n: &usize) -> bool {
    *n == 0
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EditsChoice {
    pub text: String,
    #[serde(default)]
    pub index: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EditsResponse {
    pub object: String,
    pub created: i64,
    #[serde(default)]
    pub usage: Usage,
    #[serde(default, deserialize_with = "null_as_default")]
    pub choices: Vec<EditsChoice>,
}

impl Client {
    /// Ask the model to edit `input` following `instruction`.
    pub async fn edits(
        &self,
        ctx: &RequestContext,
        request: EditsRequest,
    ) -> Result<EditsResponse, ClientError> {
        let req = self
            .request(Method::POST, "/edits", request.model.as_deref())
            .json(&request);
        self.send_request(ctx, req).await
    }
}
