//! Edits endpoint against a mock server.

mod common;

use common::openai_client;
use oaiclient::api::edits::{EditsChoice, EditsRequest, EditsResponse};
use oaiclient::RequestContext;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

/// Reply with `n` copies of the input followed by the instruction.
fn handle_edit(req: &Request) -> ResponseTemplate {
    let request: EditsRequest = serde_json::from_slice(&req.body).unwrap();
    let mut response: EditsResponse = serde_json::from_value(serde_json::json!({
        "object": "test-object",
        "created": 1700000000,
        "choices": []
    }))
    .unwrap();
    for index in 0..request.n {
        response.choices.push(EditsChoice {
            text: format!("{}{}", request.input, request.instruction),
            index,
        });
    }
    response.usage.prompt_tokens = (request.input.len() + request.instruction.len()) as u32;
    response.usage.completion_tokens = response.choices.len() as u32;
    response.usage.total_tokens = response.usage.prompt_tokens + response.usage.completion_tokens;
    ResponseTemplate::new(200).set_body_json(response)
}

#[tokio::test]
async fn test_edits() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/edits"))
        .respond_with(handle_edit)
        .expect(1)
        .mount(&server)
        .await;

    let client = openai_client(&server);
    let request = EditsRequest {
        model: Some("ada".to_string()),
        input: "Lorem ipsum dolor sit amet, consectetur adipiscing elit".to_string(),
        instruction: "test instruction".to_string(),
        n: 3,
        ..Default::default()
    };
    let response = client
        .edits(&RequestContext::background(), request)
        .await
        .unwrap();

    assert_eq!(response.choices.len(), 3);
    assert_eq!(response.choices[2].index, 2);
    assert_eq!(response.usage.completion_tokens, 3);
}

#[tokio::test]
async fn test_edits_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/edits"))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "error": {
                "message": "The model `ada` does not exist",
                "type": "invalid_request_error",
                "param": "model",
                "code": 404
            }
        })))
        .mount(&server)
        .await;

    let client = openai_client(&server);
    let err = client
        .edits(
            &RequestContext::background(),
            EditsRequest {
                model: Some("ada".to_string()),
                instruction: "fix".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();

    let api_error = err.api_error().expect("api error");
    assert_eq!(api_error.code.as_deref(), Some("404"));
    assert_eq!(api_error.param.as_deref(), Some("model"));
    assert_eq!(api_error.http_status_code, Some(404));
    assert_eq!(
        err.to_string(),
        "error, status code: 404, message: The model `ada` does not exist"
    );
}
