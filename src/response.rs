//! The undecoded result of a successful dispatch.

use http::{HeaderMap, StatusCode};
use std::time::Duration;

/// A 2xx response whose body has not been decoded yet.
///
/// The body is kept exactly as received; decoding is left to
/// [`codec::decode`](crate::codec::decode) or [`RawResponse::json`].
#[derive(Debug, Clone)]
pub struct RawResponse {
    /// The HTTP status code.
    pub status: StatusCode,

    /// The response headers.
    pub headers: HeaderMap,

    /// The response body, untouched.
    pub body: String,

    /// Time from sending the request until the body was read.
    pub latency: Duration,
}

impl RawResponse {
    /// Decodes the body into `T`.
    pub fn json<T>(&self) -> crate::Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        crate::codec::decode(self.status, &self.body)
    }

    /// Returns a header value by name, if present and valid UTF-8.
    ///
    /// # Examples
    ///
    /// ```
    /// # use shippo::RawResponse;
    /// # use http::{HeaderMap, HeaderValue, StatusCode};
    /// # use std::time::Duration;
    /// let mut headers = HeaderMap::new();
    /// headers.insert("content-type", HeaderValue::from_static("application/json"));
    ///
    /// let response = RawResponse {
    ///     status: StatusCode::OK,
    ///     headers,
    ///     body: "{}".to_string(),
    ///     latency: Duration::from_millis(12),
    /// };
    ///
    /// assert_eq!(response.header("content-type"), Some("application/json"));
    /// ```
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)?.to_str().ok()
    }
}
