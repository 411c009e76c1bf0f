//! MCP endpoint tests over the full router.

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::*;
use serde_json::json;
use tower::ServiceExt;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};
use zuper_dispatch::api::mcp::{INVALID_PARAMS, INVALID_REQUEST, METHOD_NOT_FOUND, PARSE_ERROR, SERVER_NAME};

#[tokio::test]
async fn test_initialize_returns_session_header() {
    let app = app(&config(None, None));
    let response = app
        .clone()
        .oneshot(post_json("/mcp", rpc("initialize", json!({}))))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let session = response
        .headers()
        .get("mcp-session-id")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .expect("session header");
    assert!(!session.is_empty());

    let body = extract_json(response).await;
    assert_eq!(body["result"]["serverInfo"]["name"], SERVER_NAME);

    // The new session is accepted on later calls.
    let request = Request::builder()
        .method("POST")
        .uri("/mcp")
        .header("Content-Type", "application/json")
        .header("mcp-session-id", session)
        .body(Body::from(rpc("tools/list", json!({})).to_string()))
        .unwrap();
    assert_eq!(app.oneshot(request).await.unwrap().status(), StatusCode::OK);
}

#[tokio::test]
async fn test_unknown_session_is_rejected() {
    let app = app(&config(None, None));
    let request = Request::builder()
        .method("POST")
        .uri("/mcp")
        .header("mcp-session-id", "no-such-session")
        .body(Body::from(rpc("tools/list", json!({})).to_string()))
        .unwrap();

    assert_eq!(app.oneshot(request).await.unwrap().status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_tools_list_has_whole_catalog() {
    let app = app(&config(None, None));
    let body = mcp(&app, "tools/list", json!({})).await;

    let tools = body["result"]["tools"].as_array().unwrap();
    assert_eq!(tools.len(), 37);
    let assign = tools.iter().find(|t| t["name"] == "assignJob").unwrap();
    assert_eq!(assign["inputSchema"]["type"], "object");
    assert!(assign["inputSchema"]["required"]
        .as_array()
        .unwrap()
        .contains(&json!("jobUid")));
}

#[tokio::test]
async fn test_unknown_tool_is_method_not_found() {
    let app = app(&config(None, None));
    let body = mcp(&app, "tools/call", json!({"name": "deleteEverything", "arguments": {}})).await;
    assert_eq!(body["error"]["code"], METHOD_NOT_FOUND);
}

#[tokio::test]
async fn test_bad_params_fail_before_any_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
        .expect(0)
        .mount(&server)
        .await;

    let app = app(&config(Some(&server), None));
    let body = mcp(&app, "tools/call", json!({"name": "getJob", "arguments": {}})).await;

    assert_eq!(body["result"]["isError"], true);
    let text = body["result"]["content"][0]["text"].as_str().unwrap();
    assert!(text.starts_with("Error: Invalid parameters"), "{}", text);
}

#[tokio::test]
async fn test_array_arguments_fail_before_any_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {}})))
        .expect(0)
        .mount(&server)
        .await;

    let app = app(&config(Some(&server), None));
    for arguments in [json!([1]), json!(["job-1"]), json!("job-1")] {
        let body = mcp(&app, "tools/call", json!({"name": "getJob", "arguments": arguments})).await;

        assert_eq!(body["result"]["isError"], true, "{}", body);
        let text = body["result"]["content"][0]["text"].as_str().unwrap();
        assert!(text.starts_with("Error: Invalid parameters"), "{}", text);
        assert!(text.contains("must be a JSON object"), "{}", text);
    }
}

#[tokio::test]
async fn test_missing_credentials_are_a_tool_error() {
    let app = app(&config(None, None));
    let body = mcp(&app, "tools/call", json!({"name": "getJob", "arguments": {"jobUid": "job-1"}})).await;

    assert_eq!(body["result"]["isError"], true);
    assert!(body["result"]["content"][0]["text"]
        .as_str()
        .unwrap()
        .to_lowercase()
        .contains("api key"));
}

#[tokio::test]
async fn test_header_context_wins_over_environment() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/jobs/job-1"))
        .and(header("x-api-key", "header-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {"job_uid": "job-1"}})))
        .expect(1)
        .mount(&server)
        .await;

    let app = app(&config(Some(&server), None));
    let request = Request::builder()
        .method("POST")
        .uri("/mcp")
        .header("Content-Type", "application/json")
        .header("x-zuper-api-key", "header-key")
        .body(Body::from(
            rpc("tools/call", json!({"name": "getJob", "arguments": {"jobUid": "job-1"}})).to_string(),
        ))
        .unwrap();
    let body = extract_json(app.oneshot(request).await.unwrap()).await;

    assert!(body["result"].get("isError").is_none(), "{}", body);
    let text = body["result"]["content"][0]["text"].as_str().unwrap();
    let result: serde_json::Value = serde_json::from_str(text).unwrap();
    assert_eq!(result["status"], "success");
    assert_eq!(result["data"]["data"]["job_uid"], "job-1");
}

#[tokio::test]
async fn test_protocol_errors() {
    let app = app(&config(None, None));

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/mcp")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(extract_json(response).await["error"]["code"], PARSE_ERROR);

    let response = app
        .clone()
        .oneshot(post_json("/mcp", json!({"jsonrpc": "1.0", "id": 1, "method": "tools/list"})))
        .await
        .unwrap();
    assert_eq!(extract_json(response).await["error"]["code"], INVALID_REQUEST);

    let body = mcp(&app, "tools/explode", json!({})).await;
    assert_eq!(body["error"]["code"], METHOD_NOT_FOUND);
}

#[tokio::test]
async fn test_initialized_notification_is_accepted() {
    let app = app(&config(None, None));
    let response = app
        .oneshot(post_json(
            "/mcp",
            json!({"jsonrpc": "2.0", "method": "notifications/initialized"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::ACCEPTED);
}

#[tokio::test]
async fn test_prompts() {
    let app = app(&config(None, None));

    let listed = mcp(&app, "prompts/list", json!({})).await;
    let prompts = listed["result"]["prompts"].as_array().unwrap();
    assert_eq!(prompts.len(), 12);
    let availability = prompts.iter().find(|p| p["name"] == "check-availability").unwrap();
    assert_eq!(availability["arguments"].as_array().unwrap().len(), 3);

    let missing = mcp(&app, "prompts/get", json!({"name": "customer-overview", "arguments": {}})).await;
    assert_eq!(missing["error"]["code"], INVALID_PARAMS);

    let unknown = mcp(&app, "prompts/get", json!({"name": "no-such-prompt"})).await;
    assert_eq!(unknown["error"]["code"], INVALID_PARAMS);

    let rendered = mcp(
        &app,
        "prompts/get",
        json!({"name": "optimize-schedule", "arguments": {"date": "2025-10-08"}}),
    )
    .await;
    let text = rendered["result"]["messages"][0]["content"]["text"].as_str().unwrap();
    assert!(text.contains("2025-10-08"));
}

#[tokio::test]
async fn test_sse_requires_session() {
    let app = app(&config(None, None));
    let response = app.oneshot(get_request("/mcp")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_health() {
    let llm = MockServer::start().await;
    let app = app(&config(None, Some(&llm)));
    let body = extract_json(app.oneshot(get_request("/health")).await.unwrap()).await;

    assert_eq!(body["status"], "healthy");
    assert_eq!(body["llm_providers"], json!(["openai"]));
    assert!(body["version"].is_string());
}
