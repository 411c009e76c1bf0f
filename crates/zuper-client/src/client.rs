//! Single-shot request wrapper.

use reqwest::{header, Client, Method};
use serde_json::Value;
use tracing::{debug, warn};

use crate::credentials::Credentials;
use crate::error::{Error, Result};

/// HTTP client for the FSM API.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Clone)]
pub struct FsmClient {
    client: Client,
}

impl Default for FsmClient {
    fn default() -> Self {
        Self::new()
    }
}

impl FsmClient {
    pub fn new() -> Self {
        let client = Client::builder()
            .user_agent(concat!("zuper-dispatch/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self { client }
    }

    /// Perform one request against `{base_url}{endpoint}`.
    ///
    /// `endpoint` carries its own query string. The body is serialized for
    /// every method except GET. A non-2xx status fails with the status and the
    /// raw response text; a 2xx body is returned as parsed, untouched.
    pub async fn request(
        &self,
        endpoint: &str,
        credentials: &Credentials,
        method: Method,
        body: Option<&Value>,
    ) -> Result<Value> {
        let url = format!("{}{}", credentials.base_url.trim_end_matches('/'), endpoint);
        debug!(method = %method, endpoint, "Zuper request");

        let mut request = self
            .client
            .request(method.clone(), &url)
            .header("x-api-key", credentials.api_key.as_str())
            .header(header::CONTENT_TYPE, "application/json");

        if method != Method::GET {
            if let Some(body) = body {
                request = request.body(
                    serde_json::to_vec(body).map_err(|e| Error::Decode(e.to_string()))?,
                );
            }
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let body = if text.is_empty() {
                status.canonical_reason().unwrap_or("").to_string()
            } else {
                text
            };
            warn!(status = status.as_u16(), endpoint, "Zuper request failed");
            return Err(Error::Http {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| Error::Decode(e.to_string()))
    }

    pub async fn get(&self, endpoint: &str, credentials: &Credentials) -> Result<Value> {
        self.request(endpoint, credentials, Method::GET, None).await
    }

    pub async fn post(&self, endpoint: &str, credentials: &Credentials, body: &Value) -> Result<Value> {
        self.request(endpoint, credentials, Method::POST, Some(body)).await
    }

    pub async fn put(&self, endpoint: &str, credentials: &Credentials, body: &Value) -> Result<Value> {
        self.request(endpoint, credentials, Method::PUT, Some(body)).await
    }
}

/// Reject a 2xx body that signals failure through `"type": "error"`.
///
/// The status code alone does not reveal a failed assignment; callers of
/// those endpoints must run the body through this check.
pub fn ensure_success(body: &Value) -> Result<()> {
    if body.get("type").and_then(Value::as_str) == Some("error") {
        let message = body
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("request rejected")
            .to_string();
        return Err(Error::Domain(message));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn creds(server: &MockServer) -> Credentials {
        Credentials::new("test-key", server.uri())
    }

    #[tokio::test]
    async fn test_success_returns_body_unmodified() {
        let server = MockServer::start().await;
        let body = json!({"type": "success", "data": [{"job_uid": "j1"}], "total": 1});
        Mock::given(method("GET"))
            .and(path("/api/jobs"))
            .and(query_param("page", "1"))
            .and(header("x-api-key", "test-key"))
            .and(header("content-type", "application/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body.clone()))
            .expect(1)
            .mount(&server)
            .await;

        let result = FsmClient::new()
            .get("/api/jobs?page=1", &creds(&server))
            .await
            .unwrap();
        assert_eq!(result, body);
    }

    #[tokio::test]
    async fn test_non_2xx_carries_status_and_text() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/jobs/missing"))
            .respond_with(ResponseTemplate::new(404).set_body_string("Job not found"))
            .mount(&server)
            .await;

        let err = FsmClient::new()
            .get("/api/jobs/missing", &creds(&server))
            .await
            .unwrap_err();

        assert_eq!(err.status(), Some(404));
        let message = err.to_string();
        assert!(message.contains("404"));
        assert!(message.contains("Job not found"));
    }

    #[tokio::test]
    async fn test_empty_error_body_uses_reason_phrase() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = FsmClient::new().get("/api/team", &creds(&server)).await.unwrap_err();
        assert_eq!(err.to_string(), "Zuper API error (503): Service Unavailable");
    }

    #[tokio::test]
    async fn test_get_never_sends_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .mount(&server)
            .await;

        FsmClient::new()
            .request(
                "/api/user/all",
                &creds(&server),
                Method::GET,
                Some(&json!({"should": "not be sent"})),
            )
            .await
            .unwrap();

        let received = server.received_requests().await.unwrap();
        assert_eq!(received.len(), 1);
        assert!(received[0].body.is_empty());
    }

    #[tokio::test]
    async fn test_post_serializes_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/customers"))
            .and(body_json(json!({"firstName": "Ada"})))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"data": {"uid": "c1"}})))
            .expect(1)
            .mount(&server)
            .await;

        let result = FsmClient::new()
            .post("/api/customers", &creds(&server), &json!({"firstName": "Ada"}))
            .await
            .unwrap();
        assert_eq!(result["data"]["uid"], "c1");
    }

    #[tokio::test]
    async fn test_trailing_slash_in_base_url() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/team"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
            .expect(1)
            .mount(&server)
            .await;

        let creds = Credentials::new("k", format!("{}/", server.uri()));
        FsmClient::new().get("/api/team", &creds).await.unwrap();
    }

    #[test]
    fn test_ensure_success_detects_error_envelope() {
        let err = ensure_success(&json!({"type": "error", "message": "User not in team"})).unwrap_err();
        assert!(matches!(err, Error::Domain(ref m) if m == "User not in team"));

        assert!(ensure_success(&json!({"type": "success"})).is_ok());
        assert!(ensure_success(&json!({"data": []})).is_ok());
    }
}
