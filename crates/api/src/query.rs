//! Query-string assembly.
//!
//! Façade filters carry optional parameters; only the defined ones reach
//! the wire, and values are form-encoded so free-text filters cannot
//! corrupt the URL.

use std::fmt::Display;

use url::form_urlencoded;

/// Builds a query string from defined parameters only.
#[derive(Debug, Default)]
pub struct QueryBuilder {
    pairs: Vec<(&'static str, String)>,
}

impl QueryBuilder {
    /// Empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `key=value` when the value is defined.
    #[must_use]
    pub fn push<T: Display>(mut self, key: &'static str, value: Option<T>) -> Self {
        if let Some(value) = value {
            self.pairs.push((key, value.to_string()));
        }
        self
    }

    /// Render the query string, `?`-prefixed, or empty when nothing was
    /// defined.
    #[must_use]
    pub fn finish(self) -> String {
        if self.pairs.is_empty() {
            return String::new();
        }
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (key, value) in &self.pairs {
            let _ = serializer.append_pair(key, value);
        }
        format!("?{}", serializer.finish())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn undefined_parameters_are_omitted() {
        let query = QueryBuilder::new()
            .push("status", Some("open"))
            .push("customer_id", None::<&str>)
            .push("page", Some(2))
            .finish();

        assert_eq!(query, "?status=open&page=2");
    }

    #[test]
    fn no_parameters_means_no_query_string() {
        let query = QueryBuilder::new().push("status", None::<&str>).finish();
        assert_eq!(query, "");
    }

    #[test]
    fn values_are_form_encoded() {
        let query = QueryBuilder::new().push("search", Some("a&b c")).finish();
        assert_eq!(query, "?search=a%26b+c");
    }
}
