//! A blocking wrapper around the asynchronous [`Client`](crate::Client).
//!
//! Every method drives the async implementation to completion on a private
//! single-threaded runtime, so both modes share one dispatch path and one
//! poller. Do not call these methods from inside an async runtime.

use crate::models::{
    Address, Batch, BatchQuery, BatchRequest, CarrierAccount, Collection, CustomsDeclaration,
    CustomsItem, ListParams, Manifest, ManifestRequest, Parcel, Rate, Refund, RefundRequest,
    Shipment, ShipmentRequest, Track, TrackRequest, Transaction, TransactionRequest,
};
use crate::{metadata::RequestMetadata, ClientConfig, Error, RawResponse, Result};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tokio::runtime::Runtime;

/// A blocking Shippo client.
///
/// # Examples
///
/// ```no_run
/// use shippo::blocking::Client;
/// use shippo::ClientConfig;
///
/// # fn example() -> Result<(), shippo::Error> {
/// let client = Client::new(ClientConfig::new("shippo_test_token"))?;
/// let shipment = client.retrieve_shipment("shipment_id")?;
/// println!("status: {:?}", shipment.status);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Client {
    inner: crate::Client,
    runtime: Arc<Runtime>,
}

macro_rules! blocking {
    ($( $(#[$meta:meta])* fn $name:ident(&self $(, $arg:ident: $ty:ty)*) -> $ret:ty; )*) => {
        $(
            $(#[$meta])*
            pub fn $name(&self $(, $arg: $ty)*) -> Result<$ret> {
                self.runtime.block_on(self.inner.$name($($arg),*))
            }
        )*
    };
}

impl Client {
    /// Creates a blocking client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client or the runtime cannot be built.
    pub fn new(config: ClientConfig) -> Result<Self> {
        Self::from_async(crate::Client::new(config)?)
    }

    /// Wraps an existing async client, sharing its connection pool.
    pub fn from_async(inner: crate::Client) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| Error::ConfigurationError(format!("Failed to build runtime: {}", e)))?;

        Ok(Self {
            inner,
            runtime: Arc::new(runtime),
        })
    }

    /// The configuration every request is dispatched with.
    pub fn config(&self) -> &ClientConfig {
        self.inner.config()
    }

    /// The async client this wraps.
    pub fn as_async(&self) -> &crate::Client {
        &self.inner
    }

    /// Sends a request and returns the undecoded response.
    pub fn send(&self, request: &RequestMetadata) -> Result<RawResponse> {
        self.runtime.block_on(self.inner.send(request))
    }

    /// Sends a request and decodes the response body.
    pub fn call<Res>(&self, request: RequestMetadata) -> Result<Res>
    where
        Res: DeserializeOwned,
    {
        self.runtime.block_on(self.inner.call(request))
    }

    blocking! {
        fn create_address(&self, address: &Address) -> Address;
        fn retrieve_address(&self, id: &str) -> Address;
        fn validate_address(&self, id: &str) -> Address;
        fn list_addresses(&self, params: &ListParams) -> Collection<Address>;

        fn create_parcel(&self, parcel: &Parcel) -> Parcel;
        fn retrieve_parcel(&self, id: &str) -> Parcel;
        fn list_parcels(&self, params: &ListParams) -> Collection<Parcel>;

        fn create_shipment(&self, shipment: &ShipmentRequest) -> Shipment;
        fn retrieve_shipment(&self, id: &str) -> Shipment;
        fn list_shipments(&self, params: &ListParams) -> Collection<Shipment>;

        fn rates_for_shipment(&self, shipment_id: &str, currency: Option<&str>) -> Collection<Rate>;
        /// Blocks until the shipment's rates are generated, then fetches them.
        fn shipping_rates(&self, shipment_id: &str, currency: Option<&str>) -> Collection<Rate>;
        fn retrieve_rate(&self, id: &str) -> Rate;

        fn create_transaction(&self, request: &TransactionRequest) -> Transaction;
        /// Blocks until the label is generated or the poll timeout passes.
        fn create_transaction_and_wait(&self, request: &TransactionRequest) -> Transaction;
        fn retrieve_transaction(&self, id: &str) -> Transaction;
        fn list_transactions(&self, params: &ListParams) -> Collection<Transaction>;

        fn create_customs_item(&self, item: &CustomsItem) -> CustomsItem;
        fn retrieve_customs_item(&self, id: &str) -> CustomsItem;
        fn list_customs_items(&self, params: &ListParams) -> Collection<CustomsItem>;
        fn create_customs_declaration(
            &self,
            declaration: &CustomsDeclaration
        ) -> CustomsDeclaration;
        fn retrieve_customs_declaration(&self, id: &str) -> CustomsDeclaration;
        fn list_customs_declarations(&self, params: &ListParams) -> Collection<CustomsDeclaration>;

        fn create_carrier_account(&self, account: &CarrierAccount) -> CarrierAccount;
        fn update_carrier_account(&self, id: &str, account: &CarrierAccount) -> CarrierAccount;
        fn retrieve_carrier_account(&self, id: &str) -> CarrierAccount;
        fn list_carrier_accounts(&self, params: &ListParams) -> Collection<CarrierAccount>;

        fn create_refund(&self, request: &RefundRequest) -> Refund;
        fn retrieve_refund(&self, id: &str) -> Refund;
        fn list_refunds(&self, params: &ListParams) -> Collection<Refund>;

        fn create_manifest(&self, request: &ManifestRequest) -> Manifest;
        fn retrieve_manifest(&self, id: &str) -> Manifest;
        fn list_manifests(&self, params: &ListParams) -> Collection<Manifest>;

        fn create_batch(&self, request: &BatchRequest) -> Batch;
        fn retrieve_batch(&self, id: &str, query: &BatchQuery) -> Batch;
        fn add_shipments_to_batch(&self, id: &str, shipment_ids: &[String]) -> Batch;
        fn remove_shipments_from_batch(&self, id: &str, batch_shipment_ids: &[String]) -> Batch;
        fn purchase_batch(&self, id: &str) -> Batch;

        fn retrieve_tracking(&self, carrier: &str, tracking_number: &str) -> Track;
        fn register_tracking_webhook(&self, request: &TrackRequest) -> Track;
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("blocking::Client")
            .field("config", self.inner.config())
            .finish_non_exhaustive()
    }
}
