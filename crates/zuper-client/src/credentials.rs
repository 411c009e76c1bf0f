//! Credential resolution.
//!
//! Precedence, per field: explicit tool parameter > runtime context >
//! environment default. Empty strings count as absent.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A resolved `{api_key, base_url}` pair.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub api_key: String,
    pub base_url: String,
}

impl Credentials {
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: base_url.into(),
        }
    }

    /// Key with everything past the first 8 characters elided, for logs.
    pub fn masked_key(&self) -> String {
        let prefix: String = self.api_key.chars().take(8).collect();
        format!("{}...", prefix)
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &self.masked_key())
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// Credentials passed explicitly with a single call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialOverrides {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub base_url: Option<String>,
}

/// Ambient per-session context, e.g. the signed-in tenant of a web app.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeContext {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub tenant_id: Option<String>,
    #[serde(default)]
    pub organization_id: Option<String>,
}

impl RuntimeContext {
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            base_url: Some(base_url.into()),
            ..Default::default()
        }
    }

    /// A context is usable on its own only when it carries both values.
    pub fn is_valid(&self) -> bool {
        present(&self.api_key).is_some() && present(&self.base_url).is_some()
    }

    /// True when the context supplies neither credential.
    pub fn is_empty(&self) -> bool {
        present(&self.api_key).is_none() && present(&self.base_url).is_none()
    }
}

/// Process-level defaults, read once at startup by the config layer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvDefaults {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// Resolve credentials from the three sources.
///
/// Each field is picked independently, so a call may carry its own key while
/// the base URL comes from the context.
pub fn resolve(
    explicit: &CredentialOverrides,
    context: Option<&RuntimeContext>,
    defaults: &EnvDefaults,
) -> Result<Credentials> {
    let api_key = present(&explicit.api_key)
        .or_else(|| context.and_then(|c| present(&c.api_key)))
        .or_else(|| present(&defaults.api_key))
        .ok_or(Error::MissingApiKey)?;

    let base_url = present(&explicit.base_url)
        .or_else(|| context.and_then(|c| present(&c.base_url)))
        .or_else(|| present(&defaults.base_url))
        .ok_or(Error::MissingBaseUrl)?;

    Ok(Credentials::new(api_key, base_url))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn explicit(key: Option<&str>, url: Option<&str>) -> CredentialOverrides {
        CredentialOverrides {
            api_key: key.map(String::from),
            base_url: url.map(String::from),
        }
    }

    fn context(key: Option<&str>, url: Option<&str>) -> RuntimeContext {
        RuntimeContext {
            api_key: key.map(String::from),
            base_url: url.map(String::from),
            ..Default::default()
        }
    }

    fn defaults(key: Option<&str>, url: Option<&str>) -> EnvDefaults {
        EnvDefaults {
            api_key: key.map(String::from),
            base_url: url.map(String::from),
        }
    }

    #[rstest]
    #[case(true, true, true, "param")]
    #[case(true, true, false, "param")]
    #[case(true, false, true, "param")]
    #[case(true, false, false, "param")]
    #[case(false, true, true, "ctx")]
    #[case(false, true, false, "ctx")]
    #[case(false, false, true, "env")]
    fn test_highest_priority_source_wins(
        #[case] has_param: bool,
        #[case] has_ctx: bool,
        #[case] has_env: bool,
        #[case] expected: &str,
    ) {
        let p = explicit(
            has_param.then_some("param-key"),
            has_param.then_some("https://param"),
        );
        let c = context(has_ctx.then_some("ctx-key"), has_ctx.then_some("https://ctx"));
        let e = defaults(has_env.then_some("env-key"), has_env.then_some("https://env"));

        let creds = resolve(&p, Some(&c), &e).unwrap();
        assert_eq!(creds.api_key, format!("{}-key", expected));
        assert_eq!(creds.base_url, format!("https://{}", expected));
    }

    #[test]
    fn test_no_source_fails_with_missing_key() {
        let err = resolve(&CredentialOverrides::default(), None, &EnvDefaults::default()).unwrap_err();
        assert!(matches!(err, Error::MissingApiKey));
        assert!(err.is_missing_credential());
    }

    #[test]
    fn test_key_without_url_fails_with_missing_url() {
        let err = resolve(
            &explicit(Some("k"), None),
            Some(&context(None, None)),
            &defaults(None, None),
        )
        .unwrap_err();
        assert!(matches!(err, Error::MissingBaseUrl));
    }

    #[test]
    fn test_fields_resolve_independently() {
        let creds = resolve(
            &explicit(Some("param-key"), None),
            Some(&context(None, Some("https://ctx"))),
            &defaults(Some("env-key"), Some("https://env")),
        )
        .unwrap();
        assert_eq!(creds, Credentials::new("param-key", "https://ctx"));
    }

    #[test]
    fn test_empty_strings_count_as_absent() {
        let creds = resolve(
            &explicit(Some(""), Some("")),
            Some(&context(Some(""), None)),
            &defaults(Some("env-key"), Some("https://env")),
        )
        .unwrap();
        assert_eq!(creds, Credentials::new("env-key", "https://env"));
    }

    #[test]
    fn test_context_validity() {
        assert!(RuntimeContext::new("k", "https://x").is_valid());
        assert!(!context(Some("k"), None).is_valid());
        assert!(context(None, Some("")).is_empty());
    }

    #[test]
    fn test_debug_masks_key() {
        let creds = Credentials::new("59ed3a6f230c1803317a", "https://x");
        let rendered = format!("{:?}", creds);
        assert!(rendered.contains("59ed3a6f..."));
        assert!(!rendered.contains("230c1803317a"));
    }
}
