//! Service layer.
//!
//! - Dispatcher (LLM agent runs over the dispatcher tool subset)
//! - Ranking (deterministic fallback recommendation)
//! - Teams (primary team rule)
//! - Resources and prompts served over MCP

pub mod dispatcher;
pub mod prompts;
pub mod ranking;
pub mod resources;
pub mod teams;

pub use dispatcher::{AutoDispatch, DispatchPreferences, DispatchReport, Dispatcher};
pub use ranking::{RankedCandidate, Recommendation};
pub use teams::PrimaryTeamRule;
