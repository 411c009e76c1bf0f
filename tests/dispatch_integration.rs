//! Dispatch REST routes with mocked Zuper and LLM servers.

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::*;
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn with_context(uri: &str, body: Value, zuper: &MockServer) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("Content-Type", "application/json")
        .header("x-zuper-api-key", "tenant-key")
        .header("x-zuper-base-url", zuper.uri())
        .header("x-zuper-tenant-id", "tenant-1")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn mount_llm_assignment(llm: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"role": "assistant", "content": null, "tool_calls": [{
                "id": "call-1",
                "type": "function",
                "function": {
                    "name": "assignJob",
                    "arguments": "{\"jobUid\":\"job-1\",\"users\":[{\"userUid\":\"u-1\",\"teamUid\":\"t-1\"}]}"
                }
            }]}}]
        })))
        .up_to_n_times(1)
        .mount(llm)
        .await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"role": "assistant", "content": "Assigned job-1 to u-1 through team t-1."}}]
        })))
        .mount(llm)
        .await;
}

#[tokio::test]
async fn test_dispatch_job_assigns_with_runtime_credentials() {
    let zuper = MockServer::start().await;
    let llm = MockServer::start().await;
    mount_llm_assignment(&llm).await;
    Mock::given(method("POST"))
        .and(path("/api/jobs/assign"))
        .and(header("x-api-key", "tenant-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"type": "success"})))
        .expect(1)
        .mount(&zuper)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/jobs/job-1"))
        .and(header("x-api-key", "tenant-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"job_uid": "job-1", "assigned_to": [{"user": {"user_uid": "u-1"}}]}
        })))
        .expect(1)
        .mount(&zuper)
        .await;

    let app = app(&config(None, Some(&llm)));
    let response = app
        .oneshot(with_context(
            "/dispatch/jobs/job-1",
            json!({"preferred_date": "2025-10-07"}),
            &zuper,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["assignment"]["assigned"], true);
    assert_eq!(body["assignment"]["tool_calls"], json!(["assignJob"]));
    assert_eq!(body["assignment"]["steps"], 2);
    assert_eq!(body["message"], "Job job-1 dispatched");

    // The prompt names the job and the date, never the key.
    let received = llm.received_requests().await.unwrap();
    let first: Value = serde_json::from_slice(&received[0].body).unwrap();
    let prompt = first["messages"][1]["content"].as_str().unwrap();
    assert!(prompt.contains("job-1"));
    assert!(prompt.contains("2025-10-07"));
    assert!(!first.to_string().contains("tenant-key"));
}

#[tokio::test]
async fn test_dispatch_without_llm_is_unavailable() {
    let zuper = MockServer::start().await;
    let app = app(&config(Some(&zuper), None));

    let response = app
        .oneshot(post_json("/dispatch/jobs/job-1", json!({})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = extract_json(response).await;
    assert_eq!(body["error"]["code"], "LLM_UNAVAILABLE");
}

#[tokio::test]
async fn test_batch_rejects_empty_list() {
    let llm = MockServer::start().await;
    let app = app(&config(None, Some(&llm)));

    let response = app
        .oneshot(post_json("/dispatch/batch", json!({"job_uids": []})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(extract_json(response).await["error"]["code"], "INVALID_INPUT");
    assert!(llm.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_recommendation() {
    let zuper = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/jobs/job-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"job_uid": "job-1", "job_title": "Boiler service"}
        })))
        .mount(&zuper)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/user/all"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": [
            {"user_uid": "busy", "status": "active"},
            {"user_uid": "idle", "status": "active"},
            {"user_uid": "away", "status": "inactive"}
        ]})))
        .mount(&zuper)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/jobs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": [
            {"job_uid": "a", "assigned_users": ["busy"]},
            {"job_uid": "b", "assigned_users": [{"user": {"user_uid": "busy"}}]}
        ]})))
        .mount(&zuper)
        .await;

    let app = app(&config(Some(&zuper), None));
    let response = app
        .oneshot(get_request("/dispatch/jobs/job-1/recommendation"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response).await;
    let recommendation = &body["recommendation"];
    assert_eq!(recommendation["job"]["job_uid"], "job-1");
    assert_eq!(recommendation["top"]["user"]["user_uid"], "idle");
    assert_eq!(recommendation["top"]["score"], 120);
    assert_eq!(recommendation["alternatives"][0]["user"]["user_uid"], "busy");
    assert_eq!(recommendation["alternatives"][0]["score"], 100);
}

#[tokio::test]
async fn test_recommendation_needs_credentials() {
    let app = app(&config(None, None));
    let response = app
        .oneshot(get_request("/dispatch/jobs/job-1/recommendation"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(extract_json(response).await["error"]["code"], "MISSING_CREDENTIALS");
}
