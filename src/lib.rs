//! # oaiclient - OpenAI-compatible API client
//!
//! An async client for OpenAI-style HTTP APIs, including Azure OpenAI
//! deployments, with first-class support for streamed responses.
//!
//! ## Features
//! - Async-first, tokio compatible
//! - Server-Sent Events demultiplexing into typed items
//! - Per-request deadlines and cancellation via [`RequestContext`]
//! - Structured API errors decoded from the server's error envelope
//!
//! ## Architecture
//!
//! - **[`Client`]**: configuration plus a pooled HTTP client. Endpoint methods
//!   are defined in the [`api`] modules.
//! - **[`StreamReader<T>`]**: pull-based reader over an event-stream body.
//!   `recv()` yields `Ok(Some(item))` per data event and `Ok(None)` once the
//!   stream ends; any error terminates the stream.
//! - **[`RequestContext`]**: deadline and cancellation token shared by a
//!   request and its stream.
//!
//! ## Example
//! ```no_run
//! use oaiclient::{Client, RequestContext};
//! use oaiclient::api::completion::CompletionRequest;
//! use oaiclient::model::GPT3_BABBAGE_002;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = Client::new("your-api-key")?;
//!     let ctx = RequestContext::background();
//!
//!     let request = CompletionRequest::new(GPT3_BABBAGE_002, "Lorem ipsum").with_max_tokens(5);
//!     let mut stream = client.create_completion_stream(&ctx, request).await?;
//!     while let Some(chunk) = stream.recv().await? {
//!         print!("{}", chunk.choices[0].text);
//!     }
//!     stream.close();
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod client;
pub mod config;
pub mod context;
pub mod http;
pub mod model;
pub mod sse;
pub mod stream;

// Re-exports for convenience
pub use client::{Client, ClientError};
pub use config::{ApiType, ClientConfig};
pub use context::RequestContext;
pub use model::ApiError;
pub use stream::{StreamReader, StreamState};
