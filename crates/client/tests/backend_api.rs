//! Integration tests for [`BackendApi`] against a canned HTTP server.

mod common;

use assert_matches::assert_matches;
use bulkwatch_client::{BackendApi, FetchError};
use bulkwatch_core::BulkActionStatus;

use common::{action_json, serve_once};

// ---------------------------------------------------------------------------
// Test: list_actions hits GET /bulk-action and parses the array
// ---------------------------------------------------------------------------

#[tokio::test]
async fn list_actions_parses_records() {
    let body = serde_json::json!([
        action_json(1, "A1", "pending"),
        action_json(2, "A2", "completed"),
    ])
    .to_string();
    let (base_url, request) = serve_once("200 OK", "application/json", body).await;

    let api = BackendApi::new(base_url);
    let actions = api.list_actions().await.expect("list should succeed");

    assert_eq!(actions.len(), 2);
    assert_eq!(actions[0].action_id, "A1");
    assert_eq!(actions[1].status, BulkActionStatus::Completed);
    assert!(request.await.unwrap().starts_with("GET /bulk-action "));
}

// ---------------------------------------------------------------------------
// Test: get_action uses the public identifier in the path
// ---------------------------------------------------------------------------

#[tokio::test]
async fn get_action_fetches_by_public_id() {
    let body = action_json(7, "BA-7", "in_progress").to_string();
    let (base_url, request) = serve_once("200 OK", "application/json", body).await;

    let api = BackendApi::new(base_url);
    let action = api.get_action("BA-7").await.expect("get should succeed");

    assert_eq!(action.id, 7);
    assert!(request.await.unwrap().starts_with("GET /bulk-action/BA-7 "));
}

// ---------------------------------------------------------------------------
// Test: 404 maps to NotFound, other failures to Api
// ---------------------------------------------------------------------------

#[tokio::test]
async fn get_action_not_found() {
    let (base_url, _request) =
        serve_once("404 Not Found", "application/json", "{}".to_string()).await;

    let api = BackendApi::new(base_url);
    let err = api.get_action("missing").await.unwrap_err();

    assert_matches!(err, FetchError::NotFound(ref id) if id == "missing");
}

#[tokio::test]
async fn server_error_carries_status_and_body() {
    let (base_url, _request) = serve_once(
        "500 Internal Server Error",
        "text/plain",
        "database down".to_string(),
    )
    .await;

    let api = BackendApi::new(base_url);
    let err = api.list_actions().await.unwrap_err();

    assert_matches!(err, FetchError::Api { status: 500, ref body } if body == "database down");
}

#[tokio::test]
async fn malformed_body_is_a_request_error() {
    let (base_url, _request) =
        serve_once("200 OK", "application/json", "{\"not\":\"a list\"}".to_string()).await;

    let api = BackendApi::new(base_url);
    assert_matches!(api.list_actions().await, Err(FetchError::Request(_)));
}

#[tokio::test]
async fn invalid_base_url_is_rejected_before_sending() {
    let api = BackendApi::new("backend:4000");
    assert_matches!(api.list_actions().await, Err(FetchError::InvalidUrl(_)));
}
