//! Configuration management.
//!
//! Loads configuration from environment variables (and `.env`) with support for:
//! - Zuper credential defaults, the last source in credential resolution
//! - Multiple LLM providers with fallback priority
//! - Dispatch tuning: primary team rule and agent step limit

use std::env;
use std::sync::OnceLock;

use tracing::warn;
use zuper_client::EnvDefaults;
use zuper_llm::{LlmConfig, LlmProviderConfig, DEFAULT_MAX_STEPS};

use crate::services::teams::PrimaryTeamRule;

/// Global configuration instance
static CONFIG: OnceLock<Config> = OnceLock::new();

/// Get the global configuration
pub fn config() -> &'static Config {
    CONFIG.get_or_init(Config::from_env)
}

/// Initialize configuration (call once at startup)
pub fn init() -> &'static Config {
    config()
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub zuper: ZuperConfig,
    pub llm: LlmConfig,
    pub dispatch: DispatchConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Default)]
pub struct ZuperConfig {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
}

impl ZuperConfig {
    pub fn env_defaults(&self) -> EnvDefaults {
        EnvDefaults {
            api_key: self.api_key.clone(),
            base_url: self.base_url.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DispatchConfig {
    pub primary_team: PrimaryTeamRule,
    pub max_steps: usize,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            primary_team: PrimaryTeamRule::default(),
            max_steps: DEFAULT_MAX_STEPS,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_source(|key| env::var(key).ok())
    }

    /// Build from any key lookup. Empty values count as unset.
    pub fn from_source(get: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| get(key).filter(|v| !v.trim().is_empty());
        let env_or = |key: &str, default: &str| get(key).unwrap_or_else(|| default.to_string());

        Self {
            server: ServerConfig {
                host: env_or("HOST", "0.0.0.0"),
                port: env_or("PORT", "4111").parse().unwrap_or(4111),
            },
            zuper: ZuperConfig {
                api_key: get("ZUPER_API_KEY"),
                base_url: get("ZUPER_BASE_URL"),
            },
            llm: LlmConfig {
                providers: Self::parse_llm_providers(&get),
                temperature: get("LLM_TEMPERATURE").and_then(|t| t.parse().ok()),
            },
            dispatch: DispatchConfig {
                primary_team: Self::parse_primary_team(get("DISPATCH_PRIMARY_TEAM")),
                max_steps: get("AGENT_MAX_STEPS")
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_MAX_STEPS),
            },
        }
    }

    /// Parse LLM providers from environment.
    /// OpenAI first, OpenRouter as the fallback.
    fn parse_llm_providers(get: &impl Fn(&str) -> Option<String>) -> Vec<LlmProviderConfig> {
        let mut providers = Vec::new();

        if let Some(api_key) = get("OPENAI_API_KEY") {
            providers.push(LlmProviderConfig::named("openai", api_key, get("OPENAI_MODEL"), 0));
        }

        if let Some(api_key) = get("OPENROUTER_API_KEY") {
            providers.push(LlmProviderConfig::named(
                "openrouter",
                api_key,
                get("OPENROUTER_MODEL"),
                1,
            ));
        }

        providers.sort_by_key(|p| p.priority);
        providers
    }

    fn parse_primary_team(value: Option<String>) -> PrimaryTeamRule {
        match value.map(|v| v.parse::<PrimaryTeamRule>()) {
            Some(Ok(rule)) => rule,
            Some(Err(e)) => {
                warn!(error = %e, "Invalid DISPATCH_PRIMARY_TEAM, using first team");
                PrimaryTeamRule::default()
            }
            None => PrimaryTeamRule::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn from_map(pairs: &[(&str, &str)]) -> Config {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_source(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = from_map(&[]);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 4111);
        assert!(config.zuper.api_key.is_none());
        assert!(config.llm.providers.is_empty());
        assert_eq!(config.dispatch.primary_team, PrimaryTeamRule::First);
        assert_eq!(config.dispatch.max_steps, DEFAULT_MAX_STEPS);
    }

    #[test]
    fn test_llm_providers_in_priority_order() {
        let config = from_map(&[
            ("OPENROUTER_API_KEY", "or-key"),
            ("OPENAI_API_KEY", "oa-key"),
            ("OPENAI_MODEL", "gpt-4o"),
        ]);

        let names: Vec<_> = config.llm.providers.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["openai", "openrouter"]);
        assert_eq!(config.llm.providers[0].model, "gpt-4o");
        assert_eq!(config.llm.providers[1].base_url, "https://openrouter.ai/api/v1");
    }

    #[test]
    fn test_empty_values_are_unset() {
        let config = from_map(&[("ZUPER_API_KEY", ""), ("PORT", "not-a-port")]);
        assert!(config.zuper.env_defaults().api_key.is_none());
        assert_eq!(config.server.port, 4111);
    }

    #[test]
    fn test_dispatch_settings() {
        let config = from_map(&[
            ("DISPATCH_PRIMARY_TEAM", "preferred:t-1,t-2"),
            ("AGENT_MAX_STEPS", "8"),
        ]);
        assert_eq!(
            config.dispatch.primary_team,
            PrimaryTeamRule::Preferred(vec!["t-1".into(), "t-2".into()])
        );
        assert_eq!(config.dispatch.max_steps, 8);

        let fallback = from_map(&[("DISPATCH_PRIMARY_TEAM", "random")]);
        assert_eq!(fallback.dispatch.primary_team, PrimaryTeamRule::First);
    }
}
