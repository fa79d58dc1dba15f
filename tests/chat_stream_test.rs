//! Chat completion streaming against a mock server.

mod common;

use common::{azure_client, openai_client, TEST_TOKEN};
use oaiclient::api::chat::{ChatCompletionMessage, ChatCompletionRequest, ChatRole};
use oaiclient::model::{GPT3_DOT5_TURBO, GPT3_TEXT_DAVINCI_003};
use oaiclient::{ClientError, RequestContext};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn request() -> ChatCompletionRequest {
    ChatCompletionRequest::new(
        GPT3_DOT5_TURBO,
        vec![ChatCompletionMessage::user("Hello!")],
    )
    .with_max_tokens(5)
}

const CHAT_BODY: &str = concat!(
    "data: {\"id\":\"1\",\"object\":\"chat.completion.chunk\",\"created\":1598069254,\"model\":\"gpt-3.5-turbo\",\"choices\":[{\"index\":0,\"delta\":{\"role\":\"assistant\"}}]}\n\n",
    "data: {\"id\":\"1\",\"object\":\"chat.completion.chunk\",\"created\":1598069254,\"model\":\"gpt-3.5-turbo\",\"choices\":[{\"index\":0,\"delta\":{\"content\":\"Hi\"},\"finish_reason\":null}]}\n\n",
    "data: [DONE]\n\n",
);

#[tokio::test]
async fn test_chat_completion_stream() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("Authorization", format!("Bearer {}", TEST_TOKEN)))
        .respond_with(ResponseTemplate::new(200).set_body_raw(CHAT_BODY, "text/event-stream"))
        .expect(1)
        .mount(&server)
        .await;

    let client = openai_client(&server);
    let mut stream = client
        .create_chat_completion_stream(&RequestContext::background(), request())
        .await
        .unwrap();

    let first = stream.recv().await.unwrap().unwrap();
    assert_eq!(first.choices[0].delta.role, Some(ChatRole::Assistant));
    let second = stream.recv().await.unwrap().unwrap();
    assert_eq!(second.choices[0].delta.content.as_deref(), Some("Hi"));
    assert!(second.choices[0].finish_reason.is_none());
    assert!(stream.recv().await.unwrap().is_none());
}

#[tokio::test]
async fn test_azure_chat_completion_stream() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/openai/deployments/gpt-35-turbo/chat/completions"))
        .and(query_param("api-version", "2023-05-15"))
        .and(header("api-key", TEST_TOKEN))
        .respond_with(ResponseTemplate::new(200).set_body_raw(CHAT_BODY, "text/event-stream"))
        .expect(1)
        .mount(&server)
        .await;

    let client = azure_client(&server);
    let mut stream = client
        .create_chat_completion_stream(&RequestContext::background(), request())
        .await
        .unwrap();

    let mut items = 0;
    while stream.recv().await.unwrap().is_some() {
        items += 1;
    }
    assert_eq!(items, 2);
}

#[tokio::test]
async fn test_chat_completion_stream_error_event() {
    let server = MockServer::start().await;
    let body = concat!(
        "event: error\n",
        "data: {\"message\":\"The server had an error while processing your request.\",\"type\":\"server_error\"}\n\n",
    );
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
        .mount(&server)
        .await;

    let client = openai_client(&server);
    let mut stream = client
        .create_chat_completion_stream(&RequestContext::background(), request())
        .await
        .unwrap();

    let err = stream.recv().await.unwrap_err();
    let api_error = err.api_error().expect("api error");
    assert_eq!(api_error.error_type, "server_error");
    assert!(stream.recv().await.unwrap().is_none());
}

#[tokio::test]
async fn test_chat_completion_stream_rejects_completion_model() {
    let server = MockServer::start().await;
    let client = openai_client(&server);
    let request = ChatCompletionRequest::new(
        GPT3_TEXT_DAVINCI_003,
        vec![ChatCompletionMessage::user("Hello!")],
    );

    let err = client
        .create_chat_completion_stream(&RequestContext::background(), request)
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::ChatCompletionInvalidModel(_)));
}
