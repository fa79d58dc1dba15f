//! Core client type and error types.

use reqwest::header::{ACCEPT, CACHE_CONTROL, CONNECTION, CONTENT_TYPE};
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::{ClientConfig, SecretString};
use crate::context::RequestContext;
use crate::http::{add_auth_headers, add_extra_headers, build_http_client, full_url};
use crate::model::{ApiError, ErrorResponse};
use crate::stream::StreamReader;

/// Errors that can occur during client operations.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("transport error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error(transparent)]
    Api(#[from] ApiError),

    /// Non-2xx response whose body is not an error envelope.
    #[error("error, status code: {status}, message: {body}")]
    Request { status: StatusCode, body: String },

    #[error("stream has sent too many empty messages")]
    TooManyEmptyStreamMessages,

    #[error("context deadline exceeded")]
    DeadlineExceeded,

    #[error("context canceled")]
    Cancelled,

    #[error("this model is not supported with this method, please use the chat completion client: {0}")]
    CompletionUnsupportedModel(String),

    #[error("streaming is not supported with this method, please use create_completion_stream")]
    CompletionStreamNotSupported,

    #[error("this model is not supported with this method, please use the completion client: {0}")]
    ChatCompletionInvalidModel(String),

    #[error("streaming is not supported with this method, please use create_chat_completion_stream")]
    ChatCompletionStreamNotSupported,

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ClientError {
    /// Whether the error comes from a deadline, a cancellation, or a transport timeout.
    pub fn is_timeout(&self) -> bool {
        match self {
            ClientError::DeadlineExceeded | ClientError::Cancelled => true,
            ClientError::Http(e) => e.is_timeout(),
            ClientError::Io(e) => e.kind() == std::io::ErrorKind::TimedOut,
            _ => false,
        }
    }

    /// The server-reported error, if this is one.
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            ClientError::Api(e) => Some(e),
            _ => None,
        }
    }
}

/// Client for the API. Cheap to clone; clones share the connection pool.
///
/// Endpoint methods live next to their schemas in [`crate::api`].
///
/// # Example
/// ```no_run
/// use oaiclient::{Client, RequestContext};
/// use oaiclient::api::completion::CompletionRequest;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let client = Client::new("your-api-key")?;
///     let request = CompletionRequest::new("babbage-002", "Lorem ipsum").with_max_tokens(5);
///     let response = client
///         .create_completion(&RequestContext::background(), request)
///         .await?;
///     println!("{}", response.choices[0].text);
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Client {
    config: ClientConfig,
    http: reqwest::Client,
}

impl Client {
    /// Create a client for the public API with default settings.
    pub fn new(auth_token: impl Into<SecretString>) -> Result<Self, ClientError> {
        Self::with_config(ClientConfig::new(auth_token))
    }

    pub fn with_config(config: ClientConfig) -> Result<Self, ClientError> {
        let http = build_http_client(&config)?;
        Ok(Self { config, http })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Build a request to `suffix` (e.g. `/completions`). `model` selects the
    /// Azure deployment and is ignored for the public API.
    pub(crate) fn request(&self, method: Method, suffix: &str, model: Option<&str>) -> RequestBuilder {
        let url = full_url(&self.config, suffix, model);
        debug!(%method, %url, "building request");

        let mut req = self
            .http
            .request(method, url)
            .header(CONTENT_TYPE, "application/json");
        req = add_auth_headers(req, &self.config);
        add_extra_headers(req, &self.config.extra_headers)
    }

    /// Send a unary request and decode its JSON body.
    pub(crate) async fn send_request<R: DeserializeOwned>(
        &self,
        ctx: &RequestContext,
        req: RequestBuilder,
    ) -> Result<R, ClientError> {
        ctx.run(async move {
            let response = req.send().await?;
            let status = response.status();
            if !status.is_success() {
                return Err(Self::handle_error_response(response).await);
            }
            let body = response.bytes().await?;
            Ok(serde_json::from_slice(&body)?)
        })
        .await
    }

    /// Send a unary request whose response body carries nothing of interest.
    pub(crate) async fn send_request_discarding_body(
        &self,
        ctx: &RequestContext,
        req: RequestBuilder,
    ) -> Result<(), ClientError> {
        ctx.run(async move {
            let response = req.send().await?;
            if !response.status().is_success() {
                return Err(Self::handle_error_response(response).await);
            }
            Ok(())
        })
        .await
    }

    /// POST `body` to `suffix` and open the response as an event stream of `T`.
    ///
    /// Fails without returning a stream when the context finishes before the
    /// response arrives or when the server answers with a non-2xx status.
    pub async fn open_stream<T, B>(
        &self,
        ctx: &RequestContext,
        suffix: &str,
        model: Option<&str>,
        body: &B,
    ) -> Result<StreamReader<T>, ClientError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let req = self
            .request(Method::POST, suffix, model)
            .header(ACCEPT, "text/event-stream")
            .header(CACHE_CONTROL, "no-cache")
            .header(CONNECTION, "keep-alive")
            .json(body);

        let response = ctx
            .run(async move {
                let response = req.send().await?;
                if !response.status().is_success() {
                    return Err(Self::handle_error_response(response).await);
                }
                Ok(response)
            })
            .await?;

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        if !content_type.starts_with("text/event-stream") {
            debug!(content_type, "stream response is not an event stream");
        }
        debug!(status = %response.status(), "stream opened");

        Ok(StreamReader::from_response(
            response,
            ctx.clone(),
            self.config.empty_messages_limit,
        ))
    }

    /// Turn a non-2xx response into an error.
    async fn handle_error_response(response: reqwest::Response) -> ClientError {
        let status = response.status();
        let body = match response.bytes().await {
            Ok(body) => body,
            Err(e) => return e.into(),
        };
        warn!(%status, "request failed");

        match ErrorResponse::parse(&body) {
            Some(mut api_error) => {
                api_error.http_status_code = Some(status.as_u16());
                ClientError::Api(api_error)
            }
            None => ClientError::Request {
                status,
                body: String::from_utf8_lossy(&body).into_owned(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_timeout_classification() {
        assert!(ClientError::DeadlineExceeded.is_timeout());
        assert!(ClientError::Cancelled.is_timeout());
        assert!(ClientError::Io(io::Error::new(io::ErrorKind::TimedOut, "slow")).is_timeout());
        assert!(!ClientError::Io(io::Error::new(io::ErrorKind::BrokenPipe, "gone")).is_timeout());
        assert!(!ClientError::TooManyEmptyStreamMessages.is_timeout());
    }

    #[test]
    fn test_api_error_accessor() {
        let err: ClientError = ApiError {
            message: "bad".to_string(),
            ..Default::default()
        }
        .into();
        assert_eq!(err.api_error().unwrap().message, "bad");
        assert_eq!(err.to_string(), "bad");
        assert!(ClientError::Cancelled.api_error().is_none());
    }

    #[test]
    fn test_request_error_display() {
        let err = ClientError::Request {
            status: StatusCode::BAD_GATEWAY,
            body: "upstream".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "error, status code: 502 Bad Gateway, message: upstream"
        );
    }
}
