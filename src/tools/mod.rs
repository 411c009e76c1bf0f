//! Tool catalog.
//!
//! Every FSM operation exposed to MCP clients and to the dispatcher agent.
//! A tool is a name, a description, a JSON input schema and an executor.
//! Executors validate their arguments by deserializing them, resolve
//! credentials, make one request and wrap the answer in an [`Envelope`].

mod assets;
mod contracts;
mod customers;
mod invoices;
mod jobs;
mod parts;
mod properties;
mod quotes;
mod teams;
mod timeoff;
mod timesheets;
mod users;

use std::sync::OnceLock;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::{debug, warn};
use zuper_client::{resolve, CredentialOverrides, Credentials, EnvDefaults, FsmClient, RuntimeContext};
use zuper_llm::{ToolError, ToolExecutor, ToolSpec};
use zuper_models::data_len;

use crate::services::teams::PrimaryTeamRule;
use crate::{Error, Result};

/// Tools handed to the dispatcher agent.
pub const AGENT_TOOLS: &[&str] = &[
    "getJob",
    "listJobs",
    "updateJob",
    "assignJob",
    "unassignJob",
    "assistedScheduling",
    "listUsers",
    "getUser",
    "getUserSkills",
    "getUserTeams",
    "listTeams",
    "getTeam",
    "listTimeOffRequests",
    "checkTimeOffAvailability",
];

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_LIMIT: u32 = 50;

#[derive(Debug, Clone)]
pub struct ToolDefinition {
    pub name: &'static str,
    pub category: &'static str,
    pub description: &'static str,
    pub input_schema: Value,
}

impl ToolDefinition {
    pub(crate) fn new(
        name: &'static str,
        category: &'static str,
        description: &'static str,
        properties: Value,
        required: &[&str],
    ) -> Self {
        Self {
            name,
            category,
            description,
            input_schema: object_schema(properties, required),
        }
    }

    /// Schema offered to the agent: credentials come from the runtime
    /// context there, so the credential properties are dropped.
    pub fn agent_spec(&self) -> ToolSpec {
        let mut schema = self.input_schema.clone();
        if let Some(props) = schema.get_mut("properties").and_then(Value::as_object_mut) {
            props.remove("apiKey");
            props.remove("baseUrl");
        }
        ToolSpec::new(self.name, self.description, schema)
    }
}

fn object_schema(properties: Value, required: &[&str]) -> Value {
    let mut props = match properties {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    props.insert(
        "apiKey".into(),
        json!({
            "type": "string",
            "description": "Zuper API key (x-api-key header). Falls back to the runtime context, then ZUPER_API_KEY."
        }),
    );
    props.insert(
        "baseUrl".into(),
        json!({
            "type": "string",
            "description": "Zuper base URL (e.g. https://us.zuperpro.com). Falls back to the runtime context, then ZUPER_BASE_URL."
        }),
    );

    json!({
        "type": "object",
        "properties": props,
        "required": required,
    })
}

/// Every tool, in catalog order.
pub fn catalog() -> &'static [ToolDefinition] {
    static CATALOG: OnceLock<Vec<ToolDefinition>> = OnceLock::new();
    CATALOG.get_or_init(|| {
        let mut tools = Vec::new();
        tools.extend(jobs::definitions());
        tools.extend(users::definitions());
        tools.extend(teams::definitions());
        tools.extend(customers::definitions());
        tools.extend(invoices::definitions());
        tools.extend(properties::definitions());
        tools.extend(assets::definitions());
        tools.extend(parts::definitions());
        tools.extend(contracts::definitions());
        tools.extend(quotes::definitions());
        tools.extend(timesheets::definitions());
        tools.extend(timeoff::definitions());
        tools
    })
}

pub fn find(name: &str) -> Option<&'static ToolDefinition> {
    catalog().iter().find(|t| t.name == name)
}

/// The agent's subset of the catalog.
pub fn agent_catalog() -> Vec<&'static ToolDefinition> {
    catalog()
        .iter()
        .filter(|t| AGENT_TOOLS.contains(&t.name))
        .collect()
}

/// Everything an executor needs besides its arguments.
#[derive(Clone)]
pub struct ToolContext {
    pub client: FsmClient,
    pub defaults: EnvDefaults,
    pub runtime: Option<RuntimeContext>,
    /// Fills fields a call leaves out, ahead of the runtime context (CLI flags).
    pub overrides: CredentialOverrides,
    pub primary_team: PrimaryTeamRule,
}

impl ToolContext {
    pub fn new(client: FsmClient, defaults: EnvDefaults) -> Self {
        Self {
            client,
            defaults,
            runtime: None,
            overrides: CredentialOverrides::default(),
            primary_team: PrimaryTeamRule::default(),
        }
    }

    pub fn with_runtime(mut self, runtime: Option<RuntimeContext>) -> Self {
        self.runtime = runtime.filter(|r| !r.is_empty());
        self
    }

    pub fn with_overrides(mut self, overrides: CredentialOverrides) -> Self {
        self.overrides = overrides;
        self
    }

    pub fn with_primary_team(mut self, rule: PrimaryTeamRule) -> Self {
        self.primary_team = rule;
        self
    }

    /// Resolve credentials for a call whose arguments may carry their own.
    pub fn credentials(&self, args: &Value) -> Result<Credentials> {
        let mut explicit: CredentialOverrides = parse_args(args)?;
        if explicit.api_key.as_deref().map_or(true, str::is_empty) {
            explicit.api_key = self.overrides.api_key.clone();
        }
        if explicit.base_url.as_deref().map_or(true, str::is_empty) {
            explicit.base_url = self.overrides.base_url.clone();
        }
        Ok(resolve(&explicit, self.runtime.as_ref(), &self.defaults)?)
    }

    /// Credentials without any per-call source.
    pub fn ambient_credentials(&self) -> Result<Credentials> {
        self.credentials(&Value::Null)
    }
}

/// Deserialize tool arguments. A missing argument object counts as `{}`;
/// anything other than an object is rejected.
pub(crate) fn parse_args<T: DeserializeOwned>(args: &Value) -> Result<T> {
    let args = match args {
        Value::Null => Value::Object(Map::new()),
        Value::Object(_) => args.clone(),
        other => {
            return Err(Error::InvalidParams(format!(
                "tool arguments must be a JSON object, got {}",
                json_kind(other)
            )))
        }
    };
    serde_json::from_value(args).map_err(|e| Error::InvalidParams(e.to_string()))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Parse arguments, then resolve credentials. Bad arguments fail first.
pub(crate) fn prepare<T: DeserializeOwned>(ctx: &ToolContext, args: &Value) -> Result<(T, Credentials)> {
    let params = parse_args(args)?;
    let credentials = ctx.credentials(args)?;
    Ok((params, credentials))
}

pub(crate) fn default_page() -> u32 {
    DEFAULT_PAGE
}

pub(crate) fn default_limit() -> u32 {
    DEFAULT_LIMIT
}

/// Shared `page` / `limit` arguments.
#[derive(Debug, Clone, Copy, Deserialize)]
pub(crate) struct Paging {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

/// Uniform tool result: `{status: "success", data, message?, count?}`.
#[derive(Debug, Clone)]
pub struct Envelope {
    data: Value,
    message: Option<String>,
    count: Option<usize>,
    extra: Map<String, Value>,
}

impl Envelope {
    pub fn new(data: Value) -> Self {
        Self {
            data,
            message: None,
            count: None,
            extra: Map::new(),
        }
    }

    /// Envelope for a list call; `count` is the length of `data.data`.
    pub fn listed(data: Value) -> Self {
        let count = data_len(&data);
        Self {
            count: Some(count),
            ..Self::new(data)
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_field(mut self, key: &str, value: Value) -> Self {
        self.extra.insert(key.to_string(), value);
        self
    }

    pub fn into_value(self) -> Value {
        let mut map = Map::new();
        map.insert("status".into(), json!("success"));
        map.insert("data".into(), self.data);
        if let Some(message) = self.message {
            map.insert("message".into(), json!(message));
        }
        if let Some(count) = self.count {
            map.insert("count".into(), json!(count));
        }
        map.extend(self.extra);
        Value::Object(map)
    }
}

/// `uid` of a freshly created record, as the API reports it.
pub(crate) fn created_uid(result: &Value) -> &str {
    result
        .get("data")
        .and_then(|d| d.get("uid").or_else(|| d.get("id")))
        .and_then(Value::as_str)
        .unwrap_or("unknown")
}

/// Run the tool called `name`.
pub async fn execute(ctx: &ToolContext, name: &str, args: Value) -> Result<Value> {
    debug!(tool = name, "Executing tool");

    let result = match name {
        // jobs
        "createJob" => jobs::create_job(ctx, args).await,
        "getJob" => jobs::get_job(ctx, args).await,
        "listJobs" => jobs::list_jobs(ctx, args).await,
        "updateJob" => jobs::update_job(ctx, args).await,
        "assignJob" => jobs::assign_job(ctx, args).await,
        "unassignJob" => jobs::unassign_job(ctx, args).await,
        "assistedScheduling" => jobs::assisted_scheduling(ctx, args).await,
        // users
        "getUser" => users::get_user(ctx, args).await,
        "listUsers" => users::list_users(ctx, args).await,
        "getUserSkills" => users::get_user_skills(ctx, args).await,
        "getUserTeams" => users::get_user_teams(ctx, args).await,
        // teams
        "getTeam" => teams::get_team(ctx, args).await,
        "listTeams" => teams::list_teams(ctx, args).await,
        // customers
        "createCustomer" => customers::create_customer(ctx, args).await,
        "getCustomer" => customers::get_customer(ctx, args).await,
        "listCustomers" => customers::list_customers(ctx, args).await,
        // invoices
        "createInvoice" => invoices::create_invoice(ctx, args).await,
        "getInvoice" => invoices::get_invoice(ctx, args).await,
        "listInvoices" => invoices::list_invoices(ctx, args).await,
        // properties
        "createProperty" => properties::create_property(ctx, args).await,
        "getProperty" => properties::get_property(ctx, args).await,
        // assets
        "createAsset" => assets::create_asset(ctx, args).await,
        "getAsset" => assets::get_asset(ctx, args).await,
        "listAssets" => assets::list_assets(ctx, args).await,
        // parts
        "createPart" => parts::create_part(ctx, args).await,
        "getPart" => parts::get_part(ctx, args).await,
        "listParts" => parts::list_parts(ctx, args).await,
        // service contracts
        "createServiceContract" => contracts::create_contract(ctx, args).await,
        "getServiceContract" => contracts::get_contract(ctx, args).await,
        "listServiceContracts" => contracts::list_contracts(ctx, args).await,
        // quotes
        "createQuote" => quotes::create_quote(ctx, args).await,
        "getQuote" => quotes::get_quote(ctx, args).await,
        "listQuotes" => quotes::list_quotes(ctx, args).await,
        // timesheets
        "listTimesheets" => timesheets::list_timesheets(ctx, args).await,
        "getTimesheetSummary" => timesheets::get_summary(ctx, args).await,
        // time-off
        "listTimeOffRequests" => timeoff::list_requests(ctx, args).await,
        "checkTimeOffAvailability" => timeoff::check_availability(ctx, args).await,
        _ => return Err(Error::NotFound(format!("Tool not found: {}", name))),
    };

    if let Err(e) = &result {
        warn!(tool = name, error = %e, "Tool failed");
    }
    result
}

/// [`ToolExecutor`] over the agent's subset of the catalog.
pub struct AgentToolExecutor {
    ctx: ToolContext,
}

impl AgentToolExecutor {
    pub fn new(ctx: ToolContext) -> Self {
        Self { ctx }
    }

    /// Specs for every tool the agent may call.
    pub fn specs() -> Vec<ToolSpec> {
        agent_catalog().into_iter().map(ToolDefinition::agent_spec).collect()
    }
}

#[async_trait]
impl ToolExecutor for AgentToolExecutor {
    async fn execute(&self, name: &str, arguments: Value) -> std::result::Result<Value, ToolError> {
        if !AGENT_TOOLS.contains(&name) {
            return Err(ToolError(format!("Tool not available to the dispatcher: {}", name)));
        }
        execute(&self.ctx, name, arguments)
            .await
            .map_err(|e| ToolError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_catalog_is_complete_and_unique() {
        let names: HashSet<_> = catalog().iter().map(|t| t.name).collect();
        assert_eq!(names.len(), catalog().len());
        assert_eq!(catalog().len(), 37);

        for name in AGENT_TOOLS {
            assert!(names.contains(name), "agent tool {} missing from catalog", name);
        }
    }

    #[test]
    fn test_every_schema_takes_credentials() {
        for tool in catalog() {
            let props = &tool.input_schema["properties"];
            assert!(props.get("apiKey").is_some(), "{}", tool.name);
            assert!(props.get("baseUrl").is_some(), "{}", tool.name);
            for required in tool.input_schema["required"].as_array().unwrap() {
                let required = required.as_str().unwrap();
                assert!(props.get(required).is_some(), "{} requires unknown {}", tool.name, required);
            }
        }
    }

    #[test]
    fn test_agent_spec_drops_credentials() {
        let spec = find("getJob").unwrap().agent_spec();
        assert!(spec.parameters["properties"].get("apiKey").is_none());
        assert!(spec.parameters["properties"].get("jobUid").is_some());
        assert_eq!(AgentToolExecutor::specs().len(), AGENT_TOOLS.len());
    }

    #[test]
    fn test_envelope_shape() {
        let value = Envelope::listed(json!({"data": [1, 2, 3]}))
            .with_message("ok")
            .into_value();
        assert_eq!(
            value,
            json!({"status": "success", "data": {"data": [1, 2, 3]}, "message": "ok", "count": 3})
        );

        let bare = Envelope::new(json!({})).into_value();
        assert!(bare.get("count").is_none());
        assert!(bare.get("message").is_none());
    }

    #[test]
    fn test_cli_overrides_fill_missing_fields() {
        let ctx = ToolContext::new(FsmClient::new(), EnvDefaults::default())
            .with_overrides(CredentialOverrides {
                api_key: Some("cli-key".into()),
                base_url: Some("https://cli".into()),
            })
            .with_runtime(Some(RuntimeContext::new("ctx-key", "https://ctx")));

        let creds = ctx.credentials(&json!({"baseUrl": "https://param"})).unwrap();
        assert_eq!(creds, Credentials::new("cli-key", "https://param"));
    }

    #[test]
    fn test_missing_credentials() {
        let ctx = ToolContext::new(FsmClient::new(), EnvDefaults::default());
        let err = ctx.ambient_credentials().unwrap_err();
        assert!(matches!(err, Error::Zuper(zuper_client::Error::MissingApiKey)));
    }

    #[test]
    fn test_non_object_arguments_are_rejected() {
        // Serde would otherwise read a sequence positionally into the struct.
        let err = parse_args::<CredentialOverrides>(&json!(["key", "https://x"])).unwrap_err();
        assert!(matches!(err, Error::InvalidParams(_)));
        assert!(err.to_string().contains("an array"));
        assert!(parse_args::<Paging>(&json!("page=2")).is_err());
        assert!(parse_args::<Paging>(&Value::Null).is_ok());
    }

    #[test]
    fn test_created_uid() {
        assert_eq!(created_uid(&json!({"data": {"uid": "c-1"}})), "c-1");
        assert_eq!(created_uid(&json!({"type": "success"})), "unknown");
    }
}
