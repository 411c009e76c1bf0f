//! Paged list responses.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The `{ data: [...], total }` shape most list endpoints return.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListResponse<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
    #[serde(default)]
    pub total: Option<u64>,
}

impl<T> Default for ListResponse<T> {
    fn default() -> Self {
        Self {
            data: Vec::new(),
            total: None,
        }
    }
}

impl<T: DeserializeOwned> ListResponse<T> {
    /// Lenient parse of a raw response body.
    ///
    /// Records that do not fit `T` are skipped; a body without a `data`
    /// array yields an empty list.
    pub fn from_value(value: &Value) -> Self {
        let data = value
            .get("data")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| serde_json::from_value(item.clone()).ok())
                    .collect()
            })
            .unwrap_or_default();
        let total = value.get("total").and_then(Value::as_u64);
        Self { data, total }
    }
}

/// Number of records in the `data` array of a raw body (0 when absent).
pub fn data_len(value: &Value) -> usize {
    value
        .get("data")
        .and_then(Value::as_array)
        .map(Vec::len)
        .unwrap_or(0)
}
