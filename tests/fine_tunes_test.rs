//! Fine-tunes endpoints against a mock server.

mod common;

use common::openai_client;
use oaiclient::api::fine_tunes::FineTuneRequest;
use oaiclient::RequestContext;
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const FINE_TUNE_ID: &str = "fine-tune-id";

fn fine_tune() -> serde_json::Value {
    json!({
        "id": FINE_TUNE_ID,
        "object": "fine-tune",
        "model": "curie",
        "created_at": 1614807352,
        "events": null,
        "fine_tuned_model": null,
        "hyperparams": {"batch_size": 4, "learning_rate_multiplier": 0.1, "n_epochs": 4, "prompt_loss_weight": 0.1},
        "organization_id": "org-1",
        "result_files": [],
        "status": "pending",
        "validation_files": [],
        "training_files": [{"id": "file-1", "object": "file", "bytes": 1547276, "created_at": 1610062281, "filename": "my-data-train.jsonl", "purpose": "fine-tune"}],
        "updated_at": 1614807352
    })
}

async fn mount_fine_tunes(server: &MockServer) {
    let item = format!("/v1/fine-tunes/{}", FINE_TUNE_ID);

    Mock::given(method("POST"))
        .and(path("/v1/fine-tunes"))
        .and(body_partial_json(json!({"training_file": "file-1"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(fine_tune()))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/fine-tunes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "object": "list",
            "data": [fine_tune()]
        })))
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path(format!("{}/cancel", item)))
        .respond_with(ResponseTemplate::new(200).set_body_json(fine_tune()))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("{}/events", item)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "object": "list",
            "data": [{"object": "fine-tune-event", "created_at": 1614807352, "level": "info", "message": "Job enqueued."}]
        })))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path(item.clone()))
        .respond_with(ResponseTemplate::new(200).set_body_json(fine_tune()))
        .mount(server)
        .await;
    Mock::given(method("DELETE"))
        .and(path(item))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": FINE_TUNE_ID,
            "object": "fine-tune",
            "deleted": true
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_fine_tunes() {
    let server = MockServer::start().await;
    mount_fine_tunes(&server).await;
    let client = openai_client(&server);
    let ctx = RequestContext::background();

    let created = client
        .create_fine_tune(
            &ctx,
            FineTuneRequest {
                training_file: "file-1".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(created.id, FINE_TUNE_ID);
    assert!(created.fine_tune_event_list.is_empty());
    assert!(created.fine_tuned_model.is_empty());
    assert_eq!(created.training_files.len(), 1);
    assert_eq!(created.hyper_params.batch_size, 4);

    let list = client.list_fine_tunes(&ctx).await.unwrap();
    assert_eq!(list.data.len(), 1);

    let cancelled = client.cancel_fine_tune(&ctx, FINE_TUNE_ID).await.unwrap();
    assert_eq!(cancelled.id, FINE_TUNE_ID);

    let fetched = client.get_fine_tune(&ctx, FINE_TUNE_ID).await.unwrap();
    assert_eq!(fetched.status, "pending");

    let deleted = client.delete_fine_tune(&ctx, FINE_TUNE_ID).await.unwrap();
    assert!(deleted.deleted);

    let events = client.list_fine_tune_events(&ctx, FINE_TUNE_ID).await.unwrap();
    assert_eq!(events.data.len(), 1);
    assert_eq!(events.data[0].message, "Job enqueued.");
}
