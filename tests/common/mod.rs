//! Shared helpers for the wiremock-backed integration tests.

#![allow(dead_code)]

use oaiclient::{Client, ClientConfig};
use wiremock::MockServer;

pub const TEST_TOKEN: &str = "this-is-my-secure-token-do-not-steal!!";

/// Client pointed at `{server}/v1` using bearer auth.
pub fn openai_client(server: &MockServer) -> Client {
    let config = ClientConfig::new(TEST_TOKEN).with_base_url(format!("{}/v1", server.uri()));
    Client::with_config(config).expect("client should build")
}

/// Client pointed at the server as an Azure resource.
pub fn azure_client(server: &MockServer) -> Client {
    Client::with_config(ClientConfig::azure(TEST_TOKEN, server.uri())).expect("client should build")
}
