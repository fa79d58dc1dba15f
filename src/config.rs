//! Client configuration: credentials, endpoint selection and transport settings.

use std::collections::HashMap;
use std::time::Duration;

use crate::client::ClientError;

/// Default base URL of the public API.
pub const OPENAI_API_URL_V1: &str = "https://api.openai.com/v1";

/// Default `api-version` sent to Azure deployments.
pub const AZURE_API_VERSION: &str = "2023-05-15";

/// Number of consecutive stream lines without a data payload tolerated before
/// a stream is considered hung.
pub const DEFAULT_EMPTY_MESSAGES_LIMIT: usize = 300;

/// A secret string type for sensitive data like API keys.
/// Prevents accidental logging or display of secrets.
#[derive(Clone, Default)]
pub struct SecretString(String);

impl SecretString {
    /// Create a new secret string.
    pub fn new(s: String) -> Self {
        Self(s)
    }

    /// Get the underlying secret value.
    pub fn expose_secret(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for SecretString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SecretString([REDACTED])")
    }
}

impl From<String> for SecretString {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for SecretString {
    fn from(s: &str) -> Self {
        Self::new(s.to_string())
    }
}

/// Flavour of the remote API, which decides URL layout and auth header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ApiType {
    #[default]
    OpenAi,
    /// Azure OpenAI with an `api-key` header.
    Azure,
    /// Azure OpenAI with an Entra ID bearer token.
    AzureAd,
}

impl ApiType {
    pub fn is_azure(self) -> bool {
        matches!(self, ApiType::Azure | ApiType::AzureAd)
    }
}

/// Configuration for [`crate::Client`].
///
/// # Example
/// ```rust
/// use oaiclient::config::ClientConfig;
/// use std::time::Duration;
///
/// let config = ClientConfig::new("sk-...")
///     .with_base_url("http://localhost:8080/v1".to_string())
///     .with_timeout(Duration::from_secs(30));
/// assert_eq!(config.base_url, "http://localhost:8080/v1");
/// ```
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API key or bearer token
    pub auth_token: SecretString,

    /// Base URL for API endpoints
    pub base_url: String,

    /// Sent as `OpenAI-Organization` when set
    pub org_id: Option<String>,

    pub api_type: ApiType,

    /// Azure `api-version` query parameter
    pub api_version: Option<String>,

    /// Model name to Azure deployment name. Unmapped models have `.` and `:` removed.
    pub azure_model_mapping: HashMap<String, String>,

    /// Request timeout, applied by the HTTP client to the whole exchange
    pub timeout: Option<Duration>,

    /// HTTP proxy URL
    pub proxy: Option<String>,

    /// Additional HTTP headers to include in requests
    pub extra_headers: Option<HashMap<String, String>>,

    pub empty_messages_limit: usize,
}

impl ClientConfig {
    /// Configuration for the public API with the given key.
    pub fn new(auth_token: impl Into<SecretString>) -> Self {
        Self {
            auth_token: auth_token.into(),
            base_url: OPENAI_API_URL_V1.to_string(),
            org_id: None,
            api_type: ApiType::OpenAi,
            api_version: None,
            azure_model_mapping: HashMap::new(),
            timeout: None,
            proxy: None,
            extra_headers: None,
            empty_messages_limit: DEFAULT_EMPTY_MESSAGES_LIMIT,
        }
    }

    /// Configuration for an Azure OpenAI resource, e.g. `https://my-resource.openai.azure.com`.
    pub fn azure(api_key: impl Into<SecretString>, base_url: String) -> Self {
        Self {
            api_type: ApiType::Azure,
            api_version: Some(AZURE_API_VERSION.to_string()),
            ..Self::new(api_key).with_base_url(base_url)
        }
    }

    /// Read `OPENAI_API_KEY`, and optionally `OPENAI_BASE_URL` and `OPENAI_ORG_ID`.
    pub fn from_env() -> Result<Self, ClientError> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| ClientError::Config("OPENAI_API_KEY is not set".to_string()))?;
        let mut config = Self::new(api_key);
        if let Ok(base_url) = std::env::var("OPENAI_BASE_URL") {
            config = config.with_base_url(base_url);
        }
        if let Ok(org_id) = std::env::var("OPENAI_ORG_ID") {
            config = config.with_org_id(org_id);
        }
        Ok(config)
    }

    /// Set the base URL.
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    pub fn with_org_id(mut self, org_id: String) -> Self {
        self.org_id = Some(org_id);
        self
    }

    pub fn with_api_version(mut self, api_version: String) -> Self {
        self.api_version = Some(api_version);
        self
    }

    /// Route `model` to the named Azure deployment.
    pub fn with_azure_deployment(mut self, model: String, deployment: String) -> Self {
        self.azure_model_mapping.insert(model, deployment);
        self
    }

    /// Set the timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the proxy URL.
    pub fn with_proxy(mut self, proxy: String) -> Self {
        self.proxy = Some(proxy);
        self
    }

    /// Add a single extra header.
    pub fn with_header(mut self, key: String, value: String) -> Self {
        self.extra_headers
            .get_or_insert_with(HashMap::new)
            .insert(key, value);
        self
    }

    pub fn with_empty_messages_limit(mut self, limit: usize) -> Self {
        self.empty_messages_limit = limit;
        self
    }

    /// Azure deployment name serving `model`.
    pub fn deployment_for(&self, model: &str) -> String {
        match self.azure_model_mapping.get(model) {
            Some(deployment) => deployment.clone(),
            None => model.chars().filter(|c| *c != '.' && *c != ':').collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::new("sk-test");
        assert_eq!(config.base_url, OPENAI_API_URL_V1);
        assert_eq!(config.api_type, ApiType::OpenAi);
        assert_eq!(config.empty_messages_limit, DEFAULT_EMPTY_MESSAGES_LIMIT);
        assert_eq!(config.auth_token.expose_secret(), "sk-test");
    }

    #[test]
    fn test_secret_is_redacted() {
        let config = ClientConfig::new("sk-very-secret");
        let printed = format!("{:?}", config);
        assert!(!printed.contains("sk-very-secret"));
        assert!(printed.contains("[REDACTED]"));
    }

    #[test]
    fn test_azure_config() {
        let config = ClientConfig::azure("key", "https://example.openai.azure.com".to_string());
        assert!(config.api_type.is_azure());
        assert_eq!(config.api_version.as_deref(), Some(AZURE_API_VERSION));
        assert_eq!(config.base_url, "https://example.openai.azure.com");
    }

    #[test]
    fn test_deployment_for() {
        let config = ClientConfig::azure("key", "https://example.openai.azure.com".to_string())
            .with_azure_deployment("gpt-4".to_string(), "my-gpt4".to_string());
        assert_eq!(config.deployment_for("gpt-4"), "my-gpt4");
        assert_eq!(config.deployment_for("gpt-3.5-turbo"), "gpt-35-turbo");
        assert_eq!(config.deployment_for("ft:babbage-002"), "ftbabbage-002");
    }

    #[test]
    fn test_with_header() {
        let config = ClientConfig::new("k")
            .with_header("X-A".to_string(), "1".to_string())
            .with_header("X-B".to_string(), "2".to_string());
        let headers = config.extra_headers.unwrap();
        assert_eq!(headers.len(), 2);
        assert_eq!(headers["X-B"], "2");
    }
}
