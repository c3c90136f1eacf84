//! Client configuration.
//!
//! A [`ClientConfig`] is an explicit value handed to every dispatch. Nothing is
//! read from process-wide state once a client is built, so one configuration
//! can back many concurrent calls.

use crate::{poll::PollBackoff, Error, Result};
use std::fmt;
use std::time::Duration;
use url::Url;

/// The production Shippo endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.goshippo.com/";

/// Default timeout for a single HTTP call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(25);

/// Default time to wait for a shipment's rates to finish generating.
pub const DEFAULT_RATES_POLL_TIMEOUT: Duration = Duration::from_secs(25);

/// Default time to wait for a transaction's label to finish generating.
pub const DEFAULT_TRANSACTION_POLL_TIMEOUT: Duration = Duration::from_secs(25);

/// Tokens with this prefix were issued through OAuth and use the `Bearer` scheme.
pub const OAUTH_TOKEN_PREFIX: &str = "oauth.";

const TOKEN_ENV: &str = "SHIPPO_API_TOKEN";
const API_VERSION_ENV: &str = "SHIPPO_API_VERSION";
const TIMEOUT_ENV: &str = "SHIPPO_TIMEOUT_SECS";

/// The `Authorization` scheme used for a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthScheme {
    /// OAuth access tokens.
    Bearer,
    /// Shippo live and test API tokens.
    ShippoToken,
}

impl AuthScheme {
    /// Picks the scheme from the token's prefix.
    pub fn for_token(token: &str) -> Self {
        if token.starts_with(OAUTH_TOKEN_PREFIX) {
            AuthScheme::Bearer
        } else {
            AuthScheme::ShippoToken
        }
    }

    /// The scheme name as it appears in the header.
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthScheme::Bearer => "Bearer",
            AuthScheme::ShippoToken => "ShippoToken",
        }
    }
}

impl fmt::Display for AuthScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Settings shared by every request a client makes.
///
/// # Examples
///
/// ```
/// use shippo::ClientConfig;
/// use std::time::Duration;
///
/// let config = ClientConfig::builder()
///     .token("shippo_test_abc")
///     .api_version("2018-02-08")
///     .timeout(Duration::from_secs(10))
///     .build()
///     .unwrap();
///
/// assert_eq!(config.authorization(), "ShippoToken shippo_test_abc");
/// assert_eq!(config.api_version(), Some("2018-02-08"));
/// ```
#[derive(Clone)]
pub struct ClientConfig {
    token: String,
    api_version: Option<String>,
    timeout: Duration,
    base_url: Url,
    rates_poll_timeout: Duration,
    transaction_poll_timeout: Duration,
    poll_backoff: PollBackoff,
    user_agent: String,
}

impl ClientConfig {
    /// Creates a configuration with default settings for the given token.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            api_version: None,
            timeout: DEFAULT_TIMEOUT,
            base_url: default_base_url(),
            rates_poll_timeout: DEFAULT_RATES_POLL_TIMEOUT,
            transaction_poll_timeout: DEFAULT_TRANSACTION_POLL_TIMEOUT,
            poll_backoff: PollBackoff::default(),
            user_agent: default_user_agent(),
        }
    }

    /// Creates a new builder.
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    /// Reads the configuration from `SHIPPO_API_TOKEN`, and optionally
    /// `SHIPPO_API_VERSION` and `SHIPPO_TIMEOUT_SECS`.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is missing or the timeout is not a
    /// whole number of seconds.
    pub fn from_env() -> Result<Self> {
        let token = std::env::var(TOKEN_ENV)
            .map_err(|_| Error::ConfigurationError(format!("{} is not set", TOKEN_ENV)))?;

        let mut builder = Self::builder().token(token);

        if let Ok(version) = std::env::var(API_VERSION_ENV) {
            builder = builder.api_version(version);
        }

        if let Ok(raw) = std::env::var(TIMEOUT_ENV) {
            let secs = raw.trim().parse::<u64>().map_err(|e| {
                Error::ConfigurationError(format!("Invalid {}: {}", TIMEOUT_ENV, e))
            })?;
            builder = builder.timeout(Duration::from_secs(secs));
        }

        builder.build()
    }

    /// The access token.
    pub fn token(&self) -> &str {
        &self.token
    }

    /// The scheme the token is sent with.
    pub fn auth_scheme(&self) -> AuthScheme {
        AuthScheme::for_token(&self.token)
    }

    /// The full `Authorization` header value.
    pub fn authorization(&self) -> String {
        format!("{} {}", self.auth_scheme(), self.token)
    }

    /// The API version sent in `Shippo-API-Version`, if any.
    pub fn api_version(&self) -> Option<&str> {
        self.api_version.as_deref()
    }

    /// Timeout applied to each HTTP call.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// The endpoint every resource path is resolved against.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// How long to wait for shipment rates to generate.
    pub fn rates_poll_timeout(&self) -> Duration {
        self.rates_poll_timeout
    }

    /// How long to wait for a transaction's label to generate.
    pub fn transaction_poll_timeout(&self) -> Duration {
        self.transaction_poll_timeout
    }

    /// Delay schedule between poll iterations.
    pub fn poll_backoff(&self) -> &PollBackoff {
        &self.poll_backoff
    }

    /// The `User-Agent` header value.
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// Replaces the access token.
    pub fn set_token(&mut self, token: impl Into<String>) {
        self.token = token.into();
    }

    /// Sets or clears the API version.
    pub fn set_api_version(&mut self, version: Option<String>) {
        self.api_version = version;
    }

    /// Sets the per-call timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if `timeout` is zero; the previous value is kept.
    pub fn set_timeout(&mut self, timeout: Duration) -> Result<()> {
        self.timeout = check_timeout(timeout)?;
        Ok(())
    }

    /// Sets the per-call timeout in whole seconds.
    pub fn set_timeout_secs(&mut self, secs: u64) -> Result<()> {
        self.set_timeout(Duration::from_secs(secs))
    }

    /// Points the configuration at a different endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL cannot be parsed.
    pub fn set_base_url(&mut self, url: impl AsRef<str>) -> Result<()> {
        self.base_url = parse_base_url(url.as_ref())?;
        Ok(())
    }

    /// Sets the rate generation poll timeout.
    pub fn set_rates_poll_timeout(&mut self, timeout: Duration) {
        self.rates_poll_timeout = timeout;
    }

    /// Sets the label generation poll timeout.
    pub fn set_transaction_poll_timeout(&mut self, timeout: Duration) {
        self.transaction_poll_timeout = timeout;
    }

    /// Sets the delay schedule between poll iterations.
    pub fn set_poll_backoff(&mut self, backoff: PollBackoff) {
        self.poll_backoff = backoff;
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("token", &"<redacted>")
            .field("auth_scheme", &self.auth_scheme())
            .field("api_version", &self.api_version)
            .field("timeout", &self.timeout)
            .field("base_url", &self.base_url.as_str())
            .field("rates_poll_timeout", &self.rates_poll_timeout)
            .field("transaction_poll_timeout", &self.transaction_poll_timeout)
            .field("poll_backoff", &self.poll_backoff)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

/// Builder for [`ClientConfig`].
#[derive(Default)]
pub struct ClientConfigBuilder {
    token: Option<String>,
    api_version: Option<String>,
    timeout: Option<Duration>,
    base_url: Option<String>,
    rates_poll_timeout: Option<Duration>,
    transaction_poll_timeout: Option<Duration>,
    poll_backoff: Option<PollBackoff>,
    user_agent: Option<String>,
}

impl ClientConfigBuilder {
    /// Sets the access token. Required.
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Sets the API version header value.
    pub fn api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = Some(version.into());
        self
    }

    /// Sets the per-call timeout. Defaults to 25 seconds.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the endpoint. Defaults to [`DEFAULT_BASE_URL`].
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Sets how long to wait for shipment rates. Defaults to 25 seconds.
    pub fn rates_poll_timeout(mut self, timeout: Duration) -> Self {
        self.rates_poll_timeout = Some(timeout);
        self
    }

    /// Sets how long to wait for a transaction label. Defaults to 25 seconds.
    pub fn transaction_poll_timeout(mut self, timeout: Duration) -> Self {
        self.transaction_poll_timeout = Some(timeout);
        self
    }

    /// Sets the delay schedule between poll iterations.
    pub fn poll_backoff(mut self, backoff: PollBackoff) -> Self {
        self.poll_backoff = Some(backoff);
        self
    }

    /// Overrides the `User-Agent` header.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Builds the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if no token was given, the timeout is zero, or the
    /// base URL is invalid.
    pub fn build(self) -> Result<ClientConfig> {
        let token = self
            .token
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| Error::ConfigurationError("API token is required".to_string()))?;

        let timeout = check_timeout(self.timeout.unwrap_or(DEFAULT_TIMEOUT))?;

        let base_url = match self.base_url {
            Some(url) => parse_base_url(&url)?,
            None => default_base_url(),
        };

        Ok(ClientConfig {
            token,
            api_version: self.api_version,
            timeout,
            base_url,
            rates_poll_timeout: self
                .rates_poll_timeout
                .unwrap_or(DEFAULT_RATES_POLL_TIMEOUT),
            transaction_poll_timeout: self
                .transaction_poll_timeout
                .unwrap_or(DEFAULT_TRANSACTION_POLL_TIMEOUT),
            poll_backoff: self.poll_backoff.unwrap_or_default(),
            user_agent: self.user_agent.unwrap_or_else(default_user_agent),
        })
    }
}

fn check_timeout(timeout: Duration) -> Result<Duration> {
    if timeout.is_zero() {
        return Err(Error::ConfigurationError(
            "Request timeout must be greater than zero".to_string(),
        ));
    }
    Ok(timeout)
}

/// Parses an endpoint, making sure relative paths join underneath it.
fn parse_base_url(raw: &str) -> Result<Url> {
    let mut url = Url::parse(raw)?;
    if url.cannot_be_a_base() {
        return Err(Error::ConfigurationError(format!(
            "Base URL cannot be used as a base: {}",
            raw
        )));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

fn default_base_url() -> Url {
    Url::parse(DEFAULT_BASE_URL).expect("default base URL is valid")
}

fn default_user_agent() -> String {
    format!("Shippo/v1 RustBindings/{}", env!("CARGO_PKG_VERSION"))
}
