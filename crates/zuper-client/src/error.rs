//! Error types for the FSM client.

/// Result type for FSM client operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(
        "Zuper API key is required. Provide it via:\n\
         1. Tool parameter: {{ apiKey: 'your-key' }}\n\
         2. Runtime context: x-zuper-api-key\n\
         3. Environment variable: ZUPER_API_KEY"
    )]
    MissingApiKey,

    #[error(
        "Zuper base URL is required. Provide it via:\n\
         1. Tool parameter: {{ baseUrl: 'https://your-region.zuperpro.com' }}\n\
         2. Runtime context: x-zuper-base-url\n\
         3. Environment variable: ZUPER_BASE_URL"
    )]
    MissingBaseUrl,

    /// Non-2xx response. `body` is the raw response text, or the reason
    /// phrase when the body was empty.
    #[error("Zuper API error ({status}): {body}")]
    Http { status: u16, body: String },

    /// 2xx response whose envelope carries `"type": "error"`.
    #[error("Zuper API reported an error: {0}")]
    Domain(String),

    #[error("Request failed: {0}")]
    Transport(String),

    #[error("Failed to parse response: {0}")]
    Decode(String),
}

impl Error {
    /// True for errors raised before any network call was made.
    pub fn is_missing_credential(&self) -> bool {
        matches!(self, Error::MissingApiKey | Error::MissingBaseUrl)
    }

    /// HTTP status of the failed response, if there was one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}
