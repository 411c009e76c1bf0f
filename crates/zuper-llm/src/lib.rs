//! LLM service with multi-provider fallback and tool calling.
//!
//! Speaks the OpenAI chat-completions dialect, which both OpenAI and
//! OpenRouter accept. Providers are tried in priority order; a failing
//! provider falls through to the next one without waiting.

mod agent;
mod chat;

pub use agent::{AgentOutcome, AgentRunner, ToolError, ToolExecutor, ToolInvocation, DEFAULT_MAX_STEPS};
pub use chat::{ChatMessage, FunctionCall, Role, ToolCall, ToolSpec};

use std::sync::Arc;

use reqwest::Client;
use serde_json::{json, Value};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use chat::CompletionResponse;

/// Error types for the LLM service.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("No providers configured")]
    NoProviders,

    #[error("Request failed: {0}")]
    Request(String),

    #[error("Agent stopped after {0} steps without a final answer")]
    StepLimit(usize),
}

/// Result type for LLM operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Configuration for an LLM provider.
#[derive(Debug, Clone)]
pub struct LlmProviderConfig {
    pub name: String,
    pub base_url: String,
    pub model: String,
    pub api_key: String,
    /// Lower runs first.
    pub priority: u8,
}

impl LlmProviderConfig {
    /// Provider with the default endpoint and, unless given, default model.
    pub fn named(name: &str, api_key: impl Into<String>, model: Option<String>, priority: u8) -> Self {
        Self {
            name: name.to_string(),
            base_url: default_endpoint(name),
            model: model.unwrap_or_else(|| default_model(name)),
            api_key: api_key.into(),
            priority,
        }
    }
}

/// Configuration for the LLM service.
#[derive(Debug, Clone, Default)]
pub struct LlmConfig {
    pub providers: Vec<LlmProviderConfig>,
    /// Sampling temperature sent with every request.
    pub temperature: Option<f32>,
}

/// Get default endpoint for a provider
pub fn default_endpoint(name: &str) -> String {
    match name {
        "openrouter" => "https://openrouter.ai/api/v1".to_string(),
        _ => "https://api.openai.com/v1".to_string(),
    }
}

/// Get default model for a provider
pub fn default_model(name: &str) -> String {
    match name {
        "openrouter" => "openai/gpt-4o-mini".to_string(),
        _ => "gpt-4o-mini".to_string(),
    }
}

/// Service for chat completions with multi-provider fallback.
#[derive(Clone)]
pub struct LlmService {
    inner: Arc<LlmServiceInner>,
}

struct LlmServiceInner {
    providers: RwLock<Vec<LlmProviderConfig>>,
    temperature: Option<f32>,
    client: Client,
}

impl LlmService {
    pub fn new(config: &LlmConfig) -> Self {
        let client = Client::builder()
            .user_agent(concat!("zuper-dispatch/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_else(|_| Client::new());

        let mut providers = config.providers.clone();
        providers.sort_by_key(|p| p.priority);

        info!(
            providers = ?providers.iter().map(|p| &p.name).collect::<Vec<_>>(),
            "LLM service initialized from config"
        );

        Self {
            inner: Arc::new(LlmServiceInner {
                providers: RwLock::new(providers),
                temperature: config.temperature,
                client,
            }),
        }
    }

    /// Provider names in priority order.
    pub async fn providers(&self) -> Vec<String> {
        let guard = self.inner.providers.read().await;
        guard.iter().map(|p| p.name.clone()).collect()
    }

    pub async fn is_available(&self) -> bool {
        !self.inner.providers.read().await.is_empty()
    }

    /// One chat-completions turn. Returns the assistant message, which
    /// carries either text or tool calls.
    pub async fn chat(&self, messages: &[ChatMessage], tools: &[ToolSpec]) -> Result<ChatMessage> {
        let providers = self.inner.providers.read().await.clone();
        if providers.is_empty() {
            return Err(Error::NoProviders);
        }

        let mut last_error = None;

        for provider in &providers {
            if provider.api_key.is_empty() {
                debug!(provider = %provider.name, "Skipping provider without credentials");
                continue;
            }

            match self.call_provider(provider, messages, tools).await {
                Ok(message) => return Ok(message),
                Err(e) => {
                    warn!(
                        provider = %provider.name,
                        error = %e,
                        "Provider failed, trying next"
                    );
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or(Error::NoProviders))
    }

    /// Single-prompt convenience over [`LlmService::chat`] without tools.
    pub async fn complete(&self, prompt: &str) -> Result<String> {
        let reply = self.chat(&[ChatMessage::user(prompt)], &[]).await?;
        Ok(reply.content.unwrap_or_default())
    }

    async fn call_provider(
        &self,
        provider: &LlmProviderConfig,
        messages: &[ChatMessage],
        tools: &[ToolSpec],
    ) -> Result<ChatMessage> {
        debug!(
            provider = %provider.name,
            model = %provider.model,
            messages = messages.len(),
            "Calling LLM provider"
        );

        let url = format!("{}/chat/completions", provider.base_url.trim_end_matches('/'));
        let body = self.build_request(provider, messages, tools);

        let mut request = self
            .inner
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .header("Authorization", format!("Bearer {}", provider.api_key));

        if provider.name == "openrouter" {
            request = request.header("X-Title", "Zuper Dispatch");
        }

        let response = request
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Request(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| Error::Request(format!("Failed to read response: {}", e)))?;

        if status.as_u16() == 429 {
            return Err(Error::RateLimitExceeded);
        }

        if !status.is_success() {
            return Err(Error::Llm(format!("Provider returned {}: {}", status, text)));
        }

        parse_response(&provider.name, &text)
    }

    fn build_request(&self, provider: &LlmProviderConfig, messages: &[ChatMessage], tools: &[ToolSpec]) -> Value {
        let mut body = json!({
            "model": provider.model,
            "messages": messages,
        });

        if !tools.is_empty() {
            body["tools"] = Value::Array(tools.iter().map(ToolSpec::to_openai).collect());
            body["tool_choice"] = json!("auto");
        }
        if let Some(temperature) = self.inner.temperature {
            body["temperature"] = json!(temperature);
        }

        body
    }
}

fn parse_response(provider: &str, text: &str) -> Result<ChatMessage> {
    let response: CompletionResponse = serde_json::from_str(text)
        .map_err(|e| Error::Llm(format!("Failed to parse response: {}", e)))?;

    if let Some(error) = response.error {
        return Err(Error::Llm(error.message));
    }

    response
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.message)
        .ok_or_else(|| Error::Llm(format!("No choices in {} response", provider)))
}
