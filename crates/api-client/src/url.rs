//! URL composition against a configured base
//!
//! Join rules: an endpoint that already carries a scheme is passed through
//! untouched, so callers can escape to fully-qualified URLs. Everything else
//! is joined to the base with exactly one `/` between them, regardless of
//! trailing or leading slashes on either side.

use reqwest::Url;

/// Builds absolute URLs from a base plus endpoint paths
#[derive(Debug, Clone)]
pub struct UrlBuilder {
    base: String,
}

impl UrlBuilder {
    /// Create a builder for the given base URL
    pub fn new(base: impl Into<String>) -> Self {
        Self { base: base.into() }
    }

    /// Resolve an endpoint to an absolute URL
    #[must_use]
    pub fn build(&self, endpoint: &str) -> String {
        if endpoint.contains("://") {
            return endpoint.to_string();
        }

        format!(
            "{}/{}",
            self.base.trim_end_matches('/'),
            endpoint.trim_start_matches('/')
        )
    }

    /// Resolve an endpoint and append a query string
    ///
    /// Parameters with a `None` value are omitted; the rest are encoded in
    /// insertion order.
    pub fn build_with_params<I, K, V>(&self, endpoint: &str, params: I) -> String
    where
        I: IntoIterator<Item = (K, Option<V>)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let absolute = self.build(endpoint);
        let Ok(mut url) = Url::parse(&absolute) else {
            return absolute;
        };

        {
            let mut pairs = url.query_pairs_mut();
            for (name, value) in params {
                if let Some(value) = value {
                    pairs.append_pair(name.as_ref(), value.as_ref());
                }
            }
        }

        // An empty parameter list must not leave a dangling '?'
        if url.query() == Some("") {
            url.set_query(None);
        }

        url.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absolute_endpoint_passes_through() {
        let builder = UrlBuilder::new("http://h:9000/");
        assert_eq!(builder.build("https://x/y"), "https://x/y");
    }

    #[test]
    fn test_single_slash_join() {
        let builder = UrlBuilder::new("http://h:9000/");
        assert_eq!(builder.build("/patients"), "http://h:9000/patients");
        assert_eq!(builder.build("patients"), "http://h:9000/patients");

        let no_trailing = UrlBuilder::new("http://h:9000");
        assert_eq!(no_trailing.build("patients"), "http://h:9000/patients");
    }

    #[test]
    fn test_params_skip_missing_values() {
        let builder = UrlBuilder::new("http://h:9000");
        let url = builder.build_with_params(
            "patients",
            [("status", Some("active")), ("ward", None), ("q", Some(""))],
        );
        assert_eq!(url, "http://h:9000/patients?status=active&q=");
    }

    #[test]
    fn test_params_are_encoded() {
        let builder = UrlBuilder::new("http://h:9000");
        let url = builder.build_with_params("patients", [("name", Some("de la Cruz"))]);
        assert_eq!(url, "http://h:9000/patients?name=de+la+Cruz");
    }

    #[test]
    fn test_empty_params_leave_no_query() {
        let builder = UrlBuilder::new("http://h:9000");
        let url = builder.build_with_params("patients", std::iter::empty::<(&str, Option<&str>)>());
        assert_eq!(url, "http://h:9000/patients");
    }
}
