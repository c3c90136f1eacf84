//! The asynchronous Shippo client.
//!
//! [`Client`] pairs a connection pool with a [`ClientConfig`] and exposes the
//! typed building blocks the resource methods are written with. The
//! per-endpoint methods are defined alongside it, one per Shippo operation.

use crate::{
    codec, dispatch::dispatch, metadata::RequestMetadata, ClientConfig, Error, RawResponse,
    Result,
};
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;

/// An asynchronous client for the Shippo API.
///
/// Cloning is cheap and clones share the connection pool. The configuration
/// is never mutated after construction; use [`Client::with_config`] to derive
/// a client with different settings.
///
/// # Examples
///
/// ```no_run
/// use shippo::{Client, ClientConfig};
/// use shippo::models::Parcel;
/// use shippo::models::{DistanceUnit, MassUnit};
///
/// # async fn example() -> Result<(), shippo::Error> {
/// let client = Client::new(ClientConfig::new("shippo_test_token"))?;
///
/// let parcel = client
///     .create_parcel(&Parcel {
///         length: Some("6".into()),
///         width: Some("4".into()),
///         height: Some("4".into()),
///         distance_unit: Some(DistanceUnit::Inch),
///         weight: Some("12".into()),
///         mass_unit: Some(MassUnit::Ounce),
///         ..Default::default()
///     })
///     .await?;
/// println!("Created parcel {:?}", parcel.object_id);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http_client: reqwest::Client,
    config: ClientConfig,
}

impl Client {
    /// Creates a client with its own connection pool.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder().build().map_err(|e| {
            Error::ConfigurationError(format!("Failed to build HTTP client: {}", e))
        })?;

        Ok(Self::with_http_client(config, http_client))
    }

    /// Creates a client on top of an existing `reqwest::Client`.
    pub fn with_http_client(config: ClientConfig, http_client: reqwest::Client) -> Self {
        Self {
            inner: Arc::new(ClientInner {
                http_client,
                config,
            }),
        }
    }

    /// Returns a client with `config` that shares this client's connection pool.
    ///
    /// ```no_run
    /// # use shippo::{Client, ClientConfig};
    /// # fn example(client: Client) {
    /// let mut config = client.config().clone();
    /// config.set_api_version(Some("2018-02-08".to_string()));
    /// let pinned = client.with_config(config);
    /// # }
    /// ```
    pub fn with_config(&self, config: ClientConfig) -> Self {
        Self::with_http_client(config, self.inner.http_client.clone())
    }

    /// The configuration every request is dispatched with.
    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// Sends a request and returns the undecoded response.
    pub async fn send(&self, request: &RequestMetadata) -> Result<RawResponse> {
        dispatch(&self.inner.http_client, &self.inner.config, request).await
    }

    /// Sends a request and decodes the response body.
    pub async fn call<Res>(&self, request: RequestMetadata) -> Result<Res>
    where
        Res: DeserializeOwned,
    {
        self.send(&request).await?.json()
    }

    /// Encodes `body` and sends it with `request`, decoding the response.
    pub async fn call_with_body<Req, Res>(
        &self,
        request: RequestMetadata,
        body: &Req,
    ) -> Result<Res>
    where
        Req: Serialize + ?Sized,
        Res: DeserializeOwned,
    {
        let body = codec::encode(body)?;
        self.call(request.with_body(body)).await
    }

    /// GET `path` and decode the response.
    pub async fn get<Res>(&self, path: &str) -> Result<Res>
    where
        Res: DeserializeOwned,
    {
        self.call(RequestMetadata::get(path)).await
    }

    /// POST `body` to `path` and decode the response.
    pub async fn post<Req, Res>(&self, path: &str, body: &Req) -> Result<Res>
    where
        Req: Serialize + ?Sized,
        Res: DeserializeOwned,
    {
        self.call_with_body(RequestMetadata::post(path), body).await
    }

    /// PUT `body` to `path` and decode the response.
    pub async fn put<Req, Res>(&self, path: &str, body: &Req) -> Result<Res>
    where
        Req: Serialize + ?Sized,
        Res: DeserializeOwned,
    {
        self.call_with_body(RequestMetadata::put(path), body).await
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}
