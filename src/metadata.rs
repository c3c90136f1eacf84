//! The shape of a single request before it is dispatched.

use http::Method;
use url::Url;

/// Everything that varies between two calls to the same endpoint.
///
/// Paths are kept as segments so caller-supplied ids are percent-encoded
/// when the URL is built, instead of being spliced into a string.
///
/// # Examples
///
/// ```
/// use shippo::metadata::RequestMetadata;
/// use url::Url;
///
/// let base = Url::parse("https://api.goshippo.com/").unwrap();
/// let request = RequestMetadata::get("tracks")
///     .segment("usps")
///     .segment("9205 5000")
///     .with_query_param("page", "2");
///
/// assert_eq!(
///     request.url(&base).unwrap().as_str(),
///     "https://api.goshippo.com/tracks/usps/9205%205000?page=2"
/// );
/// ```
#[derive(Debug, Clone)]
pub struct RequestMetadata {
    /// The HTTP method.
    pub method: Method,

    /// Path segments relative to the base URL.
    pub segments: Vec<String>,

    /// Query parameters, in the order they are appended.
    pub query_params: Vec<(String, String)>,

    /// Already-encoded JSON body.
    pub body: Option<String>,

    /// Whether the path ends with `/`.
    pub trailing_slash: bool,
}

impl RequestMetadata {
    /// Creates metadata for a fixed path such as `"customs/items"`.
    ///
    /// A trailing `/` in `path` is preserved.
    pub fn new(method: Method, path: &str) -> Self {
        let trimmed = path.trim_start_matches('/');
        let trailing_slash = trimmed.ends_with('/');
        let trimmed = trimmed.trim_end_matches('/');

        Self {
            method,
            segments: if trimmed.is_empty() {
                Vec::new()
            } else {
                trimmed.split('/').map(str::to_string).collect()
            },
            query_params: Vec::new(),
            body: None,
            trailing_slash,
        }
    }

    /// A GET request.
    pub fn get(path: &str) -> Self {
        Self::new(Method::GET, path)
    }

    /// A POST request.
    pub fn post(path: &str) -> Self {
        Self::new(Method::POST, path)
    }

    /// A PUT request.
    pub fn put(path: &str) -> Self {
        Self::new(Method::PUT, path)
    }

    /// Appends one path segment; it is percent-encoded when the URL is built.
    ///
    /// An empty segment is kept as given and makes [`RequestMetadata::url`]
    /// fail, so a blank id can never resolve to a different endpoint.
    pub fn segment(mut self, segment: impl Into<String>) -> Self {
        self.segments.push(segment.into());
        self.trailing_slash = false;
        self
    }

    /// Ends the path with `/`.
    pub fn with_trailing_slash(mut self) -> Self {
        self.trailing_slash = true;
        self
    }

    /// Adds a query parameter.
    pub fn with_query_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query_params.push((key.into(), value.into()));
        self
    }

    /// Adds multiple query parameters.
    pub fn with_query_params(
        mut self,
        params: impl IntoIterator<Item = (String, String)>,
    ) -> Self {
        self.query_params.extend(params);
        self
    }

    /// Attaches an encoded JSON body.
    pub fn with_body(mut self, body: String) -> Self {
        self.body = Some(body);
        self
    }

    /// The path relative to the base URL, for logging.
    pub fn path(&self) -> String {
        let mut path = self.segments.join("/");
        if self.trailing_slash {
            path.push('/');
        }
        path
    }

    /// Resolves the full request URL against `base`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`](crate::Error::InvalidArgument) if a
    /// segment is empty, or an error if `base` cannot carry a path.
    pub fn url(&self, base: &Url) -> crate::Result<Url> {
        if self.segments.iter().any(|s| s.trim().is_empty()) {
            return Err(crate::Error::InvalidArgument(format!(
                "empty path segment in `{}`",
                self.path()
            )));
        }

        let mut url = base.clone();
        url.set_query(None);
        {
            let mut path = url.path_segments_mut().map_err(|_| {
                crate::Error::ConfigurationError(format!("Base URL cannot be a base: {}", base))
            })?;
            path.pop_if_empty();
            path.extend(&self.segments);
            if self.trailing_slash {
                path.push("");
            }
        }
        if !self.query_params.is_empty() {
            url.query_pairs_mut().extend_pairs(&self.query_params);
        }
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://api.goshippo.com/").unwrap()
    }

    #[test]
    fn test_fixed_path() {
        let url = RequestMetadata::post("customs/declarations").url(&base()).unwrap();
        assert_eq!(url.as_str(), "https://api.goshippo.com/customs/declarations");
    }

    #[test]
    fn test_trailing_slash_is_kept() {
        let url = RequestMetadata::post("tracks/").url(&base()).unwrap();
        assert_eq!(url.as_str(), "https://api.goshippo.com/tracks/");
    }

    #[test]
    fn test_segments_are_encoded() {
        let url = RequestMetadata::get("batches")
            .segment("a/b?c")
            .segment("add_shipments")
            .url(&base())
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.goshippo.com/batches/a%2Fb%3Fc/add_shipments"
        );
    }

    #[test]
    fn test_base_with_path_prefix() {
        let base = Url::parse("http://localhost:1234/v1/").unwrap();
        let url = RequestMetadata::get("rates").segment("r1").url(&base).unwrap();
        assert_eq!(url.as_str(), "http://localhost:1234/v1/rates/r1");
    }

    #[test]
    fn test_empty_segment_is_rejected() {
        for request in [
            RequestMetadata::get("addresses").segment(""),
            RequestMetadata::get("addresses").segment("").segment("validate"),
            RequestMetadata::post("batches").segment("  ").segment("add_shipments"),
        ] {
            let result = request.url(&base());
            assert!(
                matches!(result, Err(crate::Error::InvalidArgument(_))),
                "{:?}",
                result
            );
        }
    }

    #[test]
    fn test_explicit_trailing_slash() {
        let url = RequestMetadata::get("shipments")
            .segment("shp_1")
            .segment("rates")
            .with_trailing_slash()
            .url(&base())
            .unwrap();
        assert_eq!(url.as_str(), "https://api.goshippo.com/shipments/shp_1/rates/");
    }

    #[test]
    fn test_segment_after_fixed_trailing_slash() {
        let request = RequestMetadata::get("tracks/").segment("usps");
        assert_eq!(request.path(), "tracks/usps");
        assert_eq!(
            request.url(&base()).unwrap().as_str(),
            "https://api.goshippo.com/tracks/usps"
        );
    }

    #[test]
    fn test_no_query_marker_without_params() {
        let url = RequestMetadata::get("parcels").url(&base()).unwrap();
        assert!(url.query().is_none());
    }
}
