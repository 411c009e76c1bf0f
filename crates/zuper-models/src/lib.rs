//! Data models for the Zuper FSM API.
//!
//! The shapes are owned by the external API, so every record keeps the
//! fields this crate does not know about in an `extra` map instead of
//! failing to deserialize.

mod assignment;
mod job;
mod list;
mod time_off;
mod user;

pub use assignment::*;
pub use job::*;
pub use list::*;
pub use time_off::*;
pub use user::*;
