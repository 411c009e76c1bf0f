//! Middleware.
//!
//! - `runtime_context` - per-request Zuper credentials and tenant ids from headers

mod runtime_context;

pub use runtime_context::{
    extract_runtime_context, from_headers, API_KEY_HEADER, BASE_URL_HEADER, ORGANIZATION_ID_HEADER,
    TENANT_ID_HEADER, USER_ID_HEADER,
};
