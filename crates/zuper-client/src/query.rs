//! Ordered, URL-encoded query string builder and path segment encoding.

use std::borrow::Cow;

/// Percent-encode one path segment, so `/`, `?` and `#` in a uid stay inside it.
pub fn path_segment(value: &str) -> Cow<'_, str> {
    urlencoding::encode(value)
}

/// Query parameters in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryString {
    pairs: Vec<(String, String)>,
}

impl QueryString {
    pub fn new() -> Self {
        Self::default()
    }

    /// `page` and `limit` first, the way every list endpoint expects them.
    pub fn paged(page: u32, limit: u32) -> Self {
        let mut query = Self::new();
        query.push("page", page);
        query.push("limit", limit);
        query
    }

    pub fn push(&mut self, key: &str, value: impl ToString) -> &mut Self {
        self.pairs.push((key.to_string(), value.to_string()));
        self
    }

    /// Append only when the value is present and non-empty.
    pub fn push_opt<V: ToString>(&mut self, key: &str, value: Option<V>) -> &mut Self {
        if let Some(value) = value {
            let value = value.to_string();
            if !value.is_empty() {
                self.pairs.push((key.to_string(), value));
            }
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Render as `a=1&b=2` without the leading `?`.
    pub fn encode(&self) -> String {
        self.pairs
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&")
    }

    /// `path?query`, or just `path` when there are no parameters.
    pub fn append_to(&self, path: &str) -> String {
        if self.is_empty() {
            path.to_string()
        } else {
            format!("{}?{}", path, self.encode())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paged_order_and_encoding() {
        let mut query = QueryString::paged(1, 50);
        query.push_opt("status", Some("in_progress"));
        query.push_opt("search", Some("O'Neil & Sons"));
        query.push_opt::<&str>("missing", None);
        query.push_opt("empty", Some(""));

        assert_eq!(
            query.append_to("/api/jobs"),
            "/api/jobs?page=1&limit=50&status=in_progress&search=O%27Neil%20%26%20Sons"
        );
    }

    #[test]
    fn test_empty_query_leaves_path() {
        assert_eq!(QueryString::new().append_to("/api/team"), "/api/team");
    }

    #[test]
    fn test_path_segment_keeps_separators_inside() {
        assert_eq!(path_segment("job-1"), "job-1");
        assert_eq!(path_segment("../assign?x=1"), "..%2Fassign%3Fx%3D1");
        assert_eq!(path_segment("a#b c"), "a%23b%20c");
    }

    #[test]
    fn test_dotted_keys_survive() {
        let mut query = QueryString::new();
        query.push("filter.user_uid", "u1");
        assert_eq!(query.encode(), "filter.user_uid=u1");
    }
}
