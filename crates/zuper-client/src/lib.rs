//! Zuper FSM REST client.
//!
//! Two pieces live here:
//! - [`resolve`] turns the explicit / runtime-context / environment sources
//!   into a single [`Credentials`] pair
//! - [`FsmClient`] performs one best-effort request with the fixed header set
//!
//! No retry, timeout or backoff layer: one call is one round trip, and the
//! caller sees whatever the API answered.

mod client;
mod credentials;
mod error;
mod query;

pub use client::{ensure_success, FsmClient};
pub use credentials::{resolve, CredentialOverrides, Credentials, EnvDefaults, RuntimeContext};
pub use error::{Error, Result};
pub use query::{path_segment, QueryString};

pub use reqwest::Method;
