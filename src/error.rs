//! Error types for Shippo API calls.
//!
//! Every failure is surfaced to the immediate caller. The two cases callers
//! usually need to tell apart are "the service answered with a structured
//! error" ([`Error::Api`]) and "the service or network could not be reached"
//! ([`Error::Network`]); [`classify`] draws that line.

use http::StatusCode;
use std::time::Duration;

/// The main error type for Shippo API calls.
///
/// # Examples
///
/// ```no_run
/// use shippo::{Client, ClientConfig, Error};
///
/// # async fn example() -> Result<(), Error> {
/// let client = Client::new(ClientConfig::new("shippo_test_token"))?;
///
/// match client.retrieve_address("unknown").await {
///     Ok(address) => println!("Found {:?}", address.object_id),
///     Err(Error::Api { status, raw_response, .. }) => {
///         eprintln!("Shippo rejected the request ({}): {}", status, raw_response);
///     }
///     Err(Error::Network(e)) => eprintln!("Shippo unreachable: {}", e),
///     Err(e) => eprintln!("Other error: {}", e),
/// }
/// # Ok(())
/// # }
/// ```
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// A transport-level failure: the connection failed, the call timed out,
    /// or the server answered with a status above 500.
    ///
    /// The underlying `reqwest::Error` is passed through unchanged.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The service rejected the request with a status of 500 or below.
    ///
    /// `raw_response` holds the error body exactly as received so callers can
    /// inspect or log Shippo's own error description.
    #[error("Shippo API error {status}: {raw_response}")]
    Api {
        /// The HTTP status code
        status: StatusCode,
        /// The raw error body
        raw_response: String,
        /// The transport-level error reqwest reported for this status, if any
        source: Option<reqwest::Error>,
    },

    /// Failed to deserialize the response body into the expected type.
    #[error("Failed to deserialize response (status {status}): {serde_error}")]
    DeserializationFailed {
        /// The raw response body that failed to deserialize
        raw_response: String,
        /// The serde error message
        serde_error: String,
        /// The HTTP status code
        status: StatusCode,
    },

    /// An asynchronously processed object did not reach a terminal status
    /// before the poll deadline.
    #[error(
        "Timed out after {waited:?} waiting for {operation} of {resource} {object_id}. \
         Retrieve the {resource} again later and check whether its status has been updated"
    )]
    RequestTimeout {
        /// What was being waited for, e.g. "rate generation"
        operation: &'static str,
        /// The kind of object being polled, e.g. "shipment"
        resource: &'static str,
        /// The id of the polled object
        object_id: String,
        /// How long the poller waited before giving up
        waited: Duration,
    },

    /// A response decoded fine but lacks something the client needs to
    /// continue, such as the id of an object it must poll.
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    /// Failed to serialize the request body.
    #[error("Failed to serialize request: {0}")]
    SerializationFailed(String),

    /// A carrier-specific extra failed validation before being sent.
    #[error("Invalid extra `{feature}`: {reason}")]
    InvalidExtra {
        /// Wire name of the offending extra
        feature: &'static str,
        /// Why it was rejected
        reason: String,
    },

    /// A caller-supplied argument cannot be sent, such as an empty id.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Invalid configuration was provided.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// An invalid URL was provided.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl Error {
    /// Returns the HTTP status code if this error has one.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::Api { status, .. } => Some(*status),
            Error::DeserializationFailed { status, .. } => Some(*status),
            Error::Network(e) => e.status(),
            _ => None,
        }
    }

    /// Returns the raw response body if this error has one.
    pub fn raw_response(&self) -> Option<&str> {
        match self {
            Error::Api { raw_response, .. } => Some(raw_response),
            Error::DeserializationFailed { raw_response, .. } => Some(raw_response),
            _ => None,
        }
    }

    /// Returns `true` if the service answered with a structured error body.
    pub fn is_api_error(&self) -> bool {
        matches!(self, Error::Api { .. })
    }

    /// Returns `true` for connection failures and opaque server errors.
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Network(_))
    }

    /// Returns `true` if a poll deadline or the HTTP timeout was exceeded.
    pub fn is_timeout(&self) -> bool {
        match self {
            Error::RequestTimeout { .. } => true,
            Error::Network(e) => e.is_timeout(),
            _ => false,
        }
    }
}

/// Decides how a non-2xx response is surfaced.
///
/// Statuses up to and including 500 become [`Error::Api`] carrying the body
/// unchanged. Statuses above 500 re-raise the transport error reqwest
/// produced for the response, so callers see the same failure they would
/// for an unreachable service.
///
/// # Examples
///
/// ```
/// use http::StatusCode;
/// use shippo::{classify, Error};
///
/// let err = classify(StatusCode::NOT_FOUND, r#"{"detail":"not found"}"#.to_string(), None);
/// assert!(matches!(err, Error::Api { .. }));
/// assert_eq!(err.raw_response(), Some(r#"{"detail":"not found"}"#));
/// ```
pub fn classify(
    status: StatusCode,
    raw_response: String,
    cause: Option<reqwest::Error>,
) -> Error {
    match cause {
        Some(cause) if status.as_u16() > 500 => Error::Network(cause),
        cause => Error::Api {
            status,
            raw_response,
            source: cause,
        },
    }
}

/// A specialized `Result` type for Shippo API calls.
pub type Result<T> = std::result::Result<T, Error>;
