//! HTTP client utilities: client construction, URL layout and headers.

use reqwest::header::AUTHORIZATION;
use reqwest::{Client, RequestBuilder};
use std::collections::HashMap;

use crate::config::{ApiType, ClientConfig, AZURE_API_VERSION};

const AZURE_API_PREFIX: &str = "openai";
const AZURE_DEPLOYMENTS_PREFIX: &str = "deployments";
const AZURE_API_KEY_HEADER: &str = "api-key";
const ORGANIZATION_HEADER: &str = "OpenAI-Organization";

/// Build a configured HTTP client from the client configuration.
///
/// This applies common configuration like timeouts and proxies.
pub fn build_http_client(config: &ClientConfig) -> Result<Client, reqwest::Error> {
    let mut builder = Client::builder();

    if let Some(timeout) = config.timeout {
        builder = builder.timeout(timeout);
    }

    if let Some(proxy_url) = &config.proxy {
        builder = builder.proxy(reqwest::Proxy::all(proxy_url)?);
    }

    builder.build()
}

/// Full URL of an endpoint.
///
/// ```
/// use oaiclient::config::ClientConfig;
/// use oaiclient::http::full_url;
///
/// let config = ClientConfig::new("key");
/// assert_eq!(full_url(&config, "/completions", Some("babbage-002")),
///            "https://api.openai.com/v1/completions");
/// ```
pub fn full_url(config: &ClientConfig, suffix: &str, model: Option<&str>) -> String {
    let base = config.base_url.trim_end_matches('/');
    if !config.api_type.is_azure() {
        return format!("{}{}", base, suffix);
    }

    let api_version = config.api_version.as_deref().unwrap_or(AZURE_API_VERSION);
    let separator = if suffix.contains('?') { '&' } else { '?' };
    match model {
        Some(model) => format!(
            "{}/{}/{}/{}{}{}api-version={}",
            base,
            AZURE_API_PREFIX,
            AZURE_DEPLOYMENTS_PREFIX,
            config.deployment_for(model),
            suffix,
            separator,
            api_version
        ),
        None => format!(
            "{}/{}{}{}api-version={}",
            base, AZURE_API_PREFIX, suffix, separator, api_version
        ),
    }
}

/// Attach credentials and the organization header.
pub fn add_auth_headers(mut request: RequestBuilder, config: &ClientConfig) -> RequestBuilder {
    let token = config.auth_token.expose_secret();
    request = match config.api_type {
        ApiType::Azure => request.header(AZURE_API_KEY_HEADER, token),
        ApiType::OpenAi | ApiType::AzureAd => {
            request.header(AUTHORIZATION, format!("Bearer {}", token))
        }
    };
    if let Some(org_id) = &config.org_id {
        request = request.header(ORGANIZATION_HEADER, org_id);
    }
    request
}

/// Add extra headers to a request if specified in the configuration.
pub fn add_extra_headers(
    mut request: RequestBuilder,
    extra_headers: &Option<HashMap<String, String>>,
) -> RequestBuilder {
    if let Some(headers) = extra_headers {
        for (key, value) in headers {
            request = request.header(key, value);
        }
    }
    request
}
