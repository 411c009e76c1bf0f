//! Common test utilities and helpers.
#![allow(dead_code)]

use std::collections::HashMap;

use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::MockServer;
use zuper_client::{EnvDefaults, FsmClient, RuntimeContext};
use zuper_dispatch::config::Config;
use zuper_dispatch::tools::ToolContext;
use zuper_dispatch::{api, AppState};

pub const ENV_KEY: &str = "env-key";

/// Config with env credentials pointing at `zuper` and, when given, an
/// OpenAI provider pointing at `llm`.
pub fn config(zuper: Option<&MockServer>, llm: Option<&MockServer>) -> Config {
    let mut vars: HashMap<String, String> = HashMap::new();
    if let Some(server) = zuper {
        vars.insert("ZUPER_API_KEY".into(), ENV_KEY.into());
        vars.insert("ZUPER_BASE_URL".into(), server.uri());
    }
    if llm.is_some() {
        vars.insert("OPENAI_API_KEY".into(), "llm-key".into());
        vars.insert("OPENAI_MODEL".into(), "test-model".into());
    }

    let mut config = Config::from_source(|key| vars.get(key).cloned());
    if let Some(server) = llm {
        for provider in &mut config.llm.providers {
            provider.base_url = server.uri();
        }
    }
    config
}

pub fn app(config: &Config) -> Router {
    api::app(AppState::new(config))
}

/// Tool context whose only credentials are the environment defaults.
pub fn env_context(server: &MockServer) -> ToolContext {
    ToolContext::new(
        FsmClient::new(),
        EnvDefaults {
            api_key: Some(ENV_KEY.into()),
            base_url: Some(server.uri()),
        },
    )
}

/// Tool context with no credential source at all.
pub fn bare_context() -> ToolContext {
    ToolContext::new(FsmClient::new(), EnvDefaults::default())
}

pub fn runtime(server: &MockServer, key: &str) -> RuntimeContext {
    RuntimeContext::new(key, server.uri())
}

/// Extract JSON body from response
pub async fn extract_json(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    serde_json::from_slice(&bytes).unwrap_or(Value::Null)
}

/// Create a POST request with JSON body
pub fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

pub fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn rpc(method: &str, params: Value) -> Value {
    json!({"jsonrpc": "2.0", "id": 1, "method": method, "params": params})
}

/// POST a JSON-RPC request to /mcp and return the parsed body.
pub async fn mcp(app: &Router, method: &str, params: Value) -> Value {
    let response = app
        .clone()
        .oneshot(post_json("/mcp", rpc(method, params)))
        .await
        .unwrap();
    extract_json(response).await
}
