//! Tool-calling agent loop.

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::chat::{ChatMessage, ToolSpec};
use crate::{Error, LlmService, Result};

pub const DEFAULT_MAX_STEPS: usize = 16;

/// Failure of a single tool call. Fed back to the model, never fatal to the run.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{0}")]
pub struct ToolError(pub String);

/// Executes tools requested by the model.
#[async_trait]
pub trait ToolExecutor: Send + Sync {
    async fn execute(&self, name: &str, arguments: Value) -> std::result::Result<Value, ToolError>;
}

/// Record of one tool call made during a run.
#[derive(Debug, Clone)]
pub struct ToolInvocation {
    pub name: String,
    pub arguments: Value,
    pub is_error: bool,
}

/// Final answer of a run plus what it took to get there.
#[derive(Debug, Clone)]
pub struct AgentOutcome {
    pub text: String,
    pub steps: usize,
    pub invocations: Vec<ToolInvocation>,
}

impl AgentOutcome {
    /// Whether any successful call to `name` was made.
    pub fn called(&self, name: &str) -> bool {
        self.invocations.iter().any(|i| i.name == name && !i.is_error)
    }
}

/// Drives a conversation until the model answers in plain text.
#[derive(Clone)]
pub struct AgentRunner {
    llm: LlmService,
    max_steps: usize,
}

impl AgentRunner {
    pub fn new(llm: LlmService) -> Self {
        Self {
            llm,
            max_steps: DEFAULT_MAX_STEPS,
        }
    }

    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps.max(1);
        self
    }

    /// Run `prompt` under `system` with `tools` available.
    ///
    /// Each step is one completion. Tool calls from a step are executed in
    /// order and their results appended before the next step.
    pub async fn run(
        &self,
        system: &str,
        prompt: &str,
        tools: &[ToolSpec],
        executor: &dyn ToolExecutor,
    ) -> Result<AgentOutcome> {
        let mut messages = vec![ChatMessage::system(system), ChatMessage::user(prompt)];
        let mut invocations = Vec::new();

        for step in 1..=self.max_steps {
            let reply = self.llm.chat(&messages, tools).await?;

            if !reply.has_tool_calls() {
                info!(steps = step, tool_calls = invocations.len(), "Agent finished");
                return Ok(AgentOutcome {
                    text: reply.content.unwrap_or_default(),
                    steps: step,
                    invocations,
                });
            }

            let calls = reply.tool_calls.clone();
            messages.push(reply);

            for call in calls {
                let name = call.function.name.as_str();
                debug!(step, tool = name, "Executing tool call");

                let (content, arguments, is_error) = match parse_arguments(&call.function.arguments) {
                    Ok(arguments) => match executor.execute(name, arguments.clone()).await {
                        Ok(result) => (result.to_string(), arguments, false),
                        Err(e) => {
                            warn!(tool = name, error = %e, "Tool call failed");
                            (format!("Error: {}", e), arguments, true)
                        }
                    },
                    Err(e) => (format!("Error: {}", e), Value::Null, true),
                };

                invocations.push(ToolInvocation {
                    name: name.to_string(),
                    arguments,
                    is_error,
                });
                messages.push(ChatMessage::tool(call.id, content));
            }
        }

        Err(Error::StepLimit(self.max_steps))
    }
}

fn parse_arguments(raw: &str) -> std::result::Result<Value, ToolError> {
    if raw.trim().is_empty() {
        return Ok(Value::Object(Default::default()));
    }
    serde_json::from_str(raw).map_err(|e| ToolError(format!("invalid tool arguments: {}", e)))
}
