//! Application state shared by the HTTP handlers and the CLI.

use zuper_client::{CredentialOverrides, EnvDefaults, FsmClient, RuntimeContext};
use zuper_llm::{AgentRunner, LlmService};

use crate::config::Config;
use crate::services::dispatcher::Dispatcher;
use crate::services::teams::PrimaryTeamRule;
use crate::tools::ToolContext;

#[derive(Clone)]
pub struct AppState {
    /// Shared FSM HTTP client.
    pub client: FsmClient,
    /// Last-resort credentials from the environment.
    pub defaults: EnvDefaults,
    pub primary_team: PrimaryTeamRule,
    /// LLM completion service with provider fallback.
    pub llm: LlmService,
    pub dispatcher: Dispatcher,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        let llm = LlmService::new(&config.llm);
        let runner = AgentRunner::new(llm.clone()).with_max_steps(config.dispatch.max_steps);

        Self {
            client: FsmClient::new(),
            defaults: config.zuper.env_defaults(),
            primary_team: config.dispatch.primary_team.clone(),
            llm,
            dispatcher: Dispatcher::new(runner),
        }
    }

    /// Tool context for one request.
    pub fn tool_context(&self, runtime: Option<RuntimeContext>) -> ToolContext {
        ToolContext::new(self.client.clone(), self.defaults.clone())
            .with_runtime(runtime)
            .with_primary_team(self.primary_team.clone())
    }

    /// Tool context for CLI runs, where flags fill in what a call omits.
    pub fn cli_context(&self, overrides: CredentialOverrides) -> ToolContext {
        self.tool_context(None).with_overrides(overrides)
    }
}
