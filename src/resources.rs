//! One method per Shippo endpoint.
//!
//! Each method is a fixed path plus a call into [`Client::call`] or
//! [`Client::call_with_body`]. The two exceptions are
//! [`Client::shipping_rates`] and [`Client::create_transaction_and_wait`],
//! which wait for Shippo's background processing with a [`Poller`].

use crate::codec;
use crate::metadata::RequestMetadata;
use crate::models::{
    Address, Batch, BatchQuery, BatchRequest, CarrierAccount, Collection, CustomsDeclaration,
    CustomsItem, ListParams, Manifest, ManifestRequest, ObjectRef, Parcel, Rate, Refund,
    RefundRequest, Shipment, ShipmentRequest, Track, TrackRequest, Transaction,
    TransactionRequest,
};
use crate::poll::{Pollable, Poller};
use crate::{Client, Error, Result};
use serde::Serialize;
use std::time::Duration;

impl Client {
    fn poller(&self, operation: &'static str, resource: &'static str, timeout: Duration) -> Poller {
        Poller::new(operation, resource, timeout).backoff(self.config().poll_backoff().clone())
    }

    async fn list<T>(&self, path: &str, params: &ListParams) -> Result<Collection<T>>
    where
        T: serde::de::DeserializeOwned,
    {
        let request = RequestMetadata::get(path).with_query_params(codec::query_pairs(params)?);
        self.call(request).await
    }

    async fn create<Req, Res>(&self, path: &str, body: &Req) -> Result<Res>
    where
        Req: Serialize,
        Res: serde::de::DeserializeOwned,
    {
        self.call_with_body(RequestMetadata::post(path), body).await
    }

    async fn retrieve<Res>(&self, path: &str, id: &str) -> Result<Res>
    where
        Res: serde::de::DeserializeOwned,
    {
        self.call(RequestMetadata::get(path).segment(id)).await
    }

    // Addresses

    /// Creates an address. Set `validate` to have Shippo check it on creation.
    pub async fn create_address(&self, address: &Address) -> Result<Address> {
        self.create("addresses", address).await
    }

    /// Retrieves an address by id.
    pub async fn retrieve_address(&self, id: &str) -> Result<Address> {
        self.retrieve("addresses", id).await
    }

    /// Validates a stored address; results are in `validation_results`.
    pub async fn validate_address(&self, id: &str) -> Result<Address> {
        self.call(RequestMetadata::get("addresses").segment(id).segment("validate"))
            .await
    }

    /// Lists stored addresses.
    pub async fn list_addresses(&self, params: &ListParams) -> Result<Collection<Address>> {
        self.list("addresses", params).await
    }

    // Parcels

    /// Creates a parcel. Extras are checked before anything is sent.
    pub async fn create_parcel(&self, parcel: &Parcel) -> Result<Parcel> {
        if let Some(extra) = &parcel.extra {
            extra.validate_for_parcel()?;
        }
        self.create("parcels", parcel).await
    }

    /// Retrieves a parcel by id.
    pub async fn retrieve_parcel(&self, id: &str) -> Result<Parcel> {
        self.retrieve("parcels", id).await
    }

    /// Lists parcels.
    pub async fn list_parcels(&self, params: &ListParams) -> Result<Collection<Parcel>> {
        self.list("parcels", params).await
    }

    // Shipments

    /// Creates a shipment. Extras are checked before anything is sent.
    pub async fn create_shipment(&self, shipment: &ShipmentRequest) -> Result<Shipment> {
        if let Some(extra) = &shipment.extra {
            extra.validate()?;
        }
        self.create("shipments", shipment).await
    }

    /// Retrieves a shipment. Its `status` shows whether rates are still being generated.
    pub async fn retrieve_shipment(&self, id: &str) -> Result<Shipment> {
        self.retrieve("shipments", id).await
    }

    /// Lists shipments.
    pub async fn list_shipments(&self, params: &ListParams) -> Result<Collection<Shipment>> {
        self.list("shipments", params).await
    }

    // Rates

    /// Fetches a shipment's rates without waiting for generation to finish.
    ///
    /// With a currency, amounts are converted to it.
    pub async fn rates_for_shipment(
        &self,
        shipment_id: &str,
        currency: Option<&str>,
    ) -> Result<Collection<Rate>> {
        let request = RequestMetadata::get("shipments")
            .segment(shipment_id)
            .segment("rates");
        let request = match currency {
            Some(currency) => request.segment(currency),
            None => request.with_trailing_slash(),
        };
        self.call(request).await
    }

    /// Waits until the shipment's rates are generated, then fetches them.
    ///
    /// Gives up with [`Error::RequestTimeout`] after the configured
    /// rates poll timeout.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use shippo::{Client, ClientConfig};
    /// # async fn example() -> Result<(), shippo::Error> {
    /// let client = Client::new(ClientConfig::new("shippo_test_token"))?;
    /// let rates = client.shipping_rates("shipment_id", Some("USD")).await?;
    /// for rate in rates.results {
    ///     println!("{:?} {:?}", rate.provider, rate.amount);
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub async fn shipping_rates(
        &self,
        shipment_id: &str,
        currency: Option<&str>,
    ) -> Result<Collection<Rate>> {
        let shipment = self.retrieve_shipment(shipment_id).await?;

        self.poller("rate generation", "shipment", self.config().rates_poll_timeout())
            .run(shipment, || self.retrieve_shipment(shipment_id))
            .await?;

        self.rates_for_shipment(shipment_id, currency).await
    }

    /// Retrieves a single rate by id.
    pub async fn retrieve_rate(&self, id: &str) -> Result<Rate> {
        self.retrieve("rates", id).await
    }

    // Transactions

    /// Purchases a label. The returned transaction may still be processing.
    pub async fn create_transaction(&self, request: &TransactionRequest) -> Result<Transaction> {
        if let Some(extra) = request.shipment.as_ref().and_then(|s| s.extra.as_ref()) {
            extra.validate()?;
        }
        self.create("transactions", request).await
    }

    /// Purchases a label and waits until it is generated.
    ///
    /// Gives up with [`Error::RequestTimeout`] after the configured
    /// transaction poll timeout.
    pub async fn create_transaction_and_wait(
        &self,
        request: &TransactionRequest,
    ) -> Result<Transaction> {
        let transaction = self.create_transaction(request).await?;
        if !transaction.processing_state().is_in_flight() {
            return Ok(transaction);
        }

        let id = transaction
            .object_id
            .clone()
            .ok_or_else(|| Error::UnexpectedResponse("transaction has no object_id".to_string()))?;

        self.poller("label generation", "transaction", self.config().transaction_poll_timeout())
            .run(transaction, || self.retrieve_transaction(&id))
            .await
    }

    /// Retrieves a transaction; poll this to follow label generation yourself.
    pub async fn retrieve_transaction(&self, id: &str) -> Result<Transaction> {
        self.retrieve("transactions", id).await
    }

    /// Lists label purchases.
    pub async fn list_transactions(&self, params: &ListParams) -> Result<Collection<Transaction>> {
        self.list("transactions", params).await
    }

    // Customs

    /// Creates one customs line item.
    pub async fn create_customs_item(&self, item: &CustomsItem) -> Result<CustomsItem> {
        self.create("customs/items", item).await
    }

    /// Retrieves a customs item by id.
    pub async fn retrieve_customs_item(&self, id: &str) -> Result<CustomsItem> {
        self.retrieve("customs/items", id).await
    }

    /// Lists customs items.
    pub async fn list_customs_items(&self, params: &ListParams) -> Result<Collection<CustomsItem>> {
        self.list("customs/items", params).await
    }

    /// Creates a customs declaration for an international shipment.
    pub async fn create_customs_declaration(
        &self,
        declaration: &CustomsDeclaration,
    ) -> Result<CustomsDeclaration> {
        self.create("customs/declarations", declaration).await
    }

    /// Retrieves a customs declaration by id.
    pub async fn retrieve_customs_declaration(&self, id: &str) -> Result<CustomsDeclaration> {
        self.retrieve("customs/declarations", id).await
    }

    /// Lists customs declarations.
    pub async fn list_customs_declarations(
        &self,
        params: &ListParams,
    ) -> Result<Collection<CustomsDeclaration>> {
        self.list("customs/declarations", params).await
    }

    // Carrier accounts

    /// Connects a carrier account.
    pub async fn create_carrier_account(&self, account: &CarrierAccount) -> Result<CarrierAccount> {
        self.create("carrier_accounts", account).await
    }

    /// Updates a carrier account with PUT; unset fields are not sent.
    pub async fn update_carrier_account(
        &self,
        id: &str,
        account: &CarrierAccount,
    ) -> Result<CarrierAccount> {
        self.call_with_body(RequestMetadata::put("carrier_accounts").segment(id), account)
            .await
    }

    /// Retrieves a carrier account by id.
    pub async fn retrieve_carrier_account(&self, id: &str) -> Result<CarrierAccount> {
        self.retrieve("carrier_accounts", id).await
    }

    /// Lists connected carrier accounts.
    pub async fn list_carrier_accounts(
        &self,
        params: &ListParams,
    ) -> Result<Collection<CarrierAccount>> {
        self.list("carrier_accounts", params).await
    }

    // Refunds

    /// Requests a refund for a purchased label.
    pub async fn create_refund(&self, request: &RefundRequest) -> Result<Refund> {
        self.create("refunds", request).await
    }

    /// Retrieves a refund by id.
    pub async fn retrieve_refund(&self, id: &str) -> Result<Refund> {
        self.retrieve("refunds", id).await
    }

    /// Lists refunds.
    pub async fn list_refunds(&self, params: &ListParams) -> Result<Collection<Refund>> {
        self.list("refunds", params).await
    }

    // Manifests

    /// Creates a manifest (scan form) for the given labels.
    pub async fn create_manifest(&self, request: &ManifestRequest) -> Result<Manifest> {
        self.create("manifests", request).await
    }

    /// Retrieves a manifest by id.
    pub async fn retrieve_manifest(&self, id: &str) -> Result<Manifest> {
        self.retrieve("manifests", id).await
    }

    /// Lists manifests.
    pub async fn list_manifests(&self, params: &ListParams) -> Result<Collection<Manifest>> {
        self.list("manifests", params).await
    }

    // Batches

    /// Creates a batch. Inline shipment extras are checked before anything is sent.
    pub async fn create_batch(&self, request: &BatchRequest) -> Result<Batch> {
        for batch_shipment in &request.batch_shipments {
            if let Some(ObjectRef::Object(shipment)) = &batch_shipment.shipment {
                if let Some(extra) = &shipment.extra {
                    extra.validate()?;
                }
            }
        }
        self.create("batches", request).await
    }

    /// Retrieves a batch; `query` pages through and filters its shipments.
    pub async fn retrieve_batch(&self, id: &str, query: &BatchQuery) -> Result<Batch> {
        let request = RequestMetadata::get("batches")
            .segment(id)
            .with_query_params(codec::query_pairs(query)?);
        self.call(request).await
    }

    /// Adds existing shipments to a batch.
    pub async fn add_shipments_to_batch(&self, id: &str, shipment_ids: &[String]) -> Result<Batch> {
        #[derive(Serialize)]
        struct ShipmentEntry<'a> {
            shipment: &'a str,
        }

        let body: Vec<ShipmentEntry<'_>> = shipment_ids
            .iter()
            .map(|shipment| ShipmentEntry { shipment })
            .collect();

        self.call_with_body(
            RequestMetadata::post("batches").segment(id).segment("add_shipments"),
            &body,
        )
        .await
    }

    /// Removes shipments by their batch shipment ids.
    pub async fn remove_shipments_from_batch(
        &self,
        id: &str,
        batch_shipment_ids: &[String],
    ) -> Result<Batch> {
        self.call_with_body(
            RequestMetadata::post("batches").segment(id).segment("remove_shipments"),
            batch_shipment_ids,
        )
        .await
    }

    /// Starts purchasing every label in the batch.
    pub async fn purchase_batch(&self, id: &str) -> Result<Batch> {
        self.call(RequestMetadata::post("batches").segment(id).segment("purchase"))
            .await
    }

    // Tracking

    /// Retrieves tracking status and history for a package.
    pub async fn retrieve_tracking(&self, carrier: &str, tracking_number: &str) -> Result<Track> {
        self.call(
            RequestMetadata::get("tracks")
                .segment(carrier)
                .segment(tracking_number),
        )
        .await
    }

    /// Registers a webhook for tracking updates.
    pub async fn register_tracking_webhook(&self, request: &TrackRequest) -> Result<Track> {
        // The endpoint only accepts the path with a trailing slash.
        self.create("tracks/", request).await
    }
}
