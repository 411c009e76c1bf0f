//! Zuper dispatch
//!
//! Tool layer over the Zuper field service management API, served to MCP
//! clients and driven by an LLM dispatcher that assigns jobs to technicians.

pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod middleware;
pub mod services;
pub mod state;
pub mod tools;

pub use config::config;
pub use error::{Error, Result};
pub use state::AppState;
