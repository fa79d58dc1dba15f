//! Legacy fine-tunes (`/fine-tunes`).

use reqwest::Method;
use serde::{Deserialize, Serialize};

use crate::client::{Client, ClientError};
use crate::context::RequestContext;
use crate::model::null_as_default;

const FINE_TUNES_SUFFIX: &str = "/fine-tunes";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FineTuneRequest {
    pub training_file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation_file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(rename = "n_epochs", skip_serializing_if = "Option::is_none")]
    pub epochs: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub learning_rate_multiplier: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt_loss_weight: Option<f32>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub compute_classification_metrics: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub classification_n_classes: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub classification_positive_class: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub classification_betas: Vec<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suffix: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FineTuneHyperParams {
    pub batch_size: u32,
    pub learning_rate_multiplier: f32,
    pub n_epochs: u32,
    pub prompt_loss_weight: f32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FineTuneEvent {
    pub object: String,
    pub created_at: i64,
    pub level: String,
    pub message: String,
}

/// A file attached to a fine-tune job.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FineTuneFile {
    pub id: String,
    pub object: String,
    pub bytes: u64,
    pub created_at: i64,
    pub filename: String,
    pub purpose: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FineTune {
    pub id: String,
    pub object: String,
    pub model: String,
    pub created_at: i64,
    #[serde(rename = "events", deserialize_with = "null_as_default")]
    pub fine_tune_event_list: Vec<FineTuneEvent>,
    #[serde(deserialize_with = "null_as_default")]
    pub fine_tuned_model: String,
    #[serde(rename = "hyperparams")]
    pub hyper_params: FineTuneHyperParams,
    #[serde(deserialize_with = "null_as_default")]
    pub organization_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub result_files: Vec<FineTuneFile>,
    pub status: String,
    #[serde(deserialize_with = "null_as_default")]
    pub validation_files: Vec<FineTuneFile>,
    #[serde(deserialize_with = "null_as_default")]
    pub training_files: Vec<FineTuneFile>,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FineTuneList {
    pub object: String,
    #[serde(deserialize_with = "null_as_default")]
    pub data: Vec<FineTune>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FineTuneEventList {
    pub object: String,
    #[serde(deserialize_with = "null_as_default")]
    pub data: Vec<FineTuneEvent>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FineTuneDeleteResponse {
    pub id: String,
    pub object: String,
    pub deleted: bool,
}

impl Client {
    pub async fn create_fine_tune(
        &self,
        ctx: &RequestContext,
        request: FineTuneRequest,
    ) -> Result<FineTune, ClientError> {
        let req = self
            .request(Method::POST, FINE_TUNES_SUFFIX, None)
            .json(&request);
        self.send_request(ctx, req).await
    }

    /// Cancel a running fine-tune job.
    pub async fn cancel_fine_tune(
        &self,
        ctx: &RequestContext,
        fine_tune_id: &str,
    ) -> Result<FineTune, ClientError> {
        let suffix = format!("{}/{}/cancel", FINE_TUNES_SUFFIX, fine_tune_id);
        let req = self.request(Method::POST, &suffix, None);
        self.send_request(ctx, req).await
    }

    pub async fn list_fine_tunes(&self, ctx: &RequestContext) -> Result<FineTuneList, ClientError> {
        let req = self.request(Method::GET, FINE_TUNES_SUFFIX, None);
        self.send_request(ctx, req).await
    }

    pub async fn get_fine_tune(
        &self,
        ctx: &RequestContext,
        fine_tune_id: &str,
    ) -> Result<FineTune, ClientError> {
        let suffix = format!("{}/{}", FINE_TUNES_SUFFIX, fine_tune_id);
        let req = self.request(Method::GET, &suffix, None);
        self.send_request(ctx, req).await
    }

    pub async fn delete_fine_tune(
        &self,
        ctx: &RequestContext,
        fine_tune_id: &str,
    ) -> Result<FineTuneDeleteResponse, ClientError> {
        let suffix = format!("{}/{}", FINE_TUNES_SUFFIX, fine_tune_id);
        let req = self.request(Method::DELETE, &suffix, None);
        self.send_request(ctx, req).await
    }

    pub async fn list_fine_tune_events(
        &self,
        ctx: &RequestContext,
        fine_tune_id: &str,
    ) -> Result<FineTuneEventList, ClientError> {
        let suffix = format!("{}/{}/events", FINE_TUNES_SUFFIX, fine_tune_id);
        let req = self.request(Method::GET, &suffix, None);
        self.send_request(ctx, req).await
    }
}
