//! Runtime context extraction.
//!
//! A webapp embedding the server forwards its signed-in tenant through
//! `x-zuper-*` headers. The values become the middle source of credential
//! resolution for every tool the request runs.

use axum::{body::Body, extract::Request, http::HeaderMap, middleware::Next, response::Response};
use zuper_client::RuntimeContext;

pub const API_KEY_HEADER: &str = "x-zuper-api-key";
pub const BASE_URL_HEADER: &str = "x-zuper-base-url";
pub const USER_ID_HEADER: &str = "x-zuper-user-id";
pub const TENANT_ID_HEADER: &str = "x-zuper-tenant-id";
pub const ORGANIZATION_ID_HEADER: &str = "x-zuper-organization-id";

fn header(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Build a context from request headers; `None` when no header is set.
pub fn from_headers(headers: &HeaderMap) -> Option<RuntimeContext> {
    let context = RuntimeContext {
        api_key: header(headers, API_KEY_HEADER),
        base_url: header(headers, BASE_URL_HEADER),
        user_id: header(headers, USER_ID_HEADER),
        tenant_id: header(headers, TENANT_ID_HEADER),
        organization_id: header(headers, ORGANIZATION_ID_HEADER),
    };

    if context == RuntimeContext::default() {
        None
    } else {
        Some(context)
    }
}

/// Injects the request's [`RuntimeContext`] into extensions when present.
pub async fn extract_runtime_context(mut req: Request<Body>, next: Next) -> Response {
    if let Some(context) = from_headers(req.headers()) {
        tracing::debug!(
            tenant_id = ?context.tenant_id,
            has_api_key = context.api_key.is_some(),
            "Runtime context from headers"
        );
        req.extensions_mut().insert(context);
    }
    next.run(req).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_from_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(API_KEY_HEADER, HeaderValue::from_static("key-1"));
        headers.insert(BASE_URL_HEADER, HeaderValue::from_static("https://eu.zuperpro.com"));
        headers.insert(TENANT_ID_HEADER, HeaderValue::from_static("tenant-9"));

        let context = from_headers(&headers).unwrap();
        assert!(context.is_valid());
        assert_eq!(context.tenant_id.as_deref(), Some("tenant-9"));
        assert!(context.user_id.is_none());
    }

    #[test]
    fn test_blank_headers_are_absent() {
        let mut headers = HeaderMap::new();
        headers.insert(API_KEY_HEADER, HeaderValue::from_static("  "));
        assert!(from_headers(&headers).is_none());
        assert!(from_headers(&HeaderMap::new()).is_none());
    }
}
