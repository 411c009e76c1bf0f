//! API Routes
//!
//! Route structure:
//! - /mcp - MCP JSON-RPC endpoint and SSE stream
//! - /dispatch/* - Dispatch runs and recommendations for webapps
//! - /health - Health checks (public)
//!
//! Every route sees the runtime context taken from `x-zuper-*` headers.

mod dispatch;
pub mod mcp;
pub mod status;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::middleware::extract_runtime_context;
use crate::{AppState, Result};

/// Build the route table.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(status::routes())
        .nest("/mcp", mcp::routes())
        .nest("/dispatch", dispatch::routes())
}

/// Complete application with middleware and state.
pub fn app(state: AppState) -> Router {
    routes()
        .layer(axum::middleware::from_fn(extract_runtime_context))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
                .expose_headers(Any),
        )
        .with_state(state)
}

/// Bind and serve until the process is stopped.
pub async fn serve(state: AppState, host: &str, port: u16) -> Result<()> {
    status::init_startup_time();
    mcp::start_session_cleanup();
    tracing::debug!("MCP session cleanup task started");

    let listener = TcpListener::bind((host, port)).await?;
    let addr = listener.local_addr()?;
    tracing::info!(%addr, "Zuper dispatch server listening");

    axum::serve(listener, app(state)).await?;
    Ok(())
}
