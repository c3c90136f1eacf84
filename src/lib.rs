//! # Shippo - A client for the Shippo shipping API
//!
//! Typed access to Shippo's addresses, parcels, shipments, rates, label
//! transactions, customs, carrier accounts, refunds, manifests, batches and
//! tracking, built on top of `reqwest`. Every request goes through one
//! dispatch path that authenticates it, logs it and classifies failures.
//!
//! ## Quick Start
//!
//! ```no_run
//! use shippo::models::{Address, DistanceUnit, MassUnit, ObjectRef, Parcel, ShipmentRequest};
//! use shippo::{Client, ClientConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), shippo::Error> {
//!     let client = Client::new(ClientConfig::from_env()?)?;
//!
//!     let from = Address {
//!         name: Some("Mr Hippo".into()),
//!         street1: Some("215 Clayton St.".into()),
//!         city: Some("San Francisco".into()),
//!         state: Some("CA".into()),
//!         zip: Some("94117".into()),
//!         country: Some("US".into()),
//!         ..Default::default()
//!     };
//!     let to = Address {
//!         name: Some("Mrs Hippo".into()),
//!         street1: Some("965 Mission St.".into()),
//!         city: Some("San Francisco".into()),
//!         state: Some("CA".into()),
//!         zip: Some("94105".into()),
//!         country: Some("US".into()),
//!         ..Default::default()
//!     };
//!     let parcel = Parcel {
//!         length: Some("5".into()),
//!         width: Some("5".into()),
//!         height: Some("5".into()),
//!         distance_unit: Some(DistanceUnit::Inch),
//!         weight: Some("2".into()),
//!         mass_unit: Some(MassUnit::Pound),
//!         ..Default::default()
//!     };
//!
//!     let shipment = client
//!         .create_shipment(&ShipmentRequest {
//!             address_from: Some(ObjectRef::Object(from)),
//!             address_to: Some(ObjectRef::Object(to)),
//!             parcels: vec![ObjectRef::Object(parcel)],
//!             ..Default::default()
//!         })
//!         .await?;
//!
//!     // Waits until Shippo has finished generating rates.
//!     let id = shipment.object_id.unwrap_or_default();
//!     let rates = client.shipping_rates(&id, Some("USD")).await?;
//!     for rate in rates.results {
//!         println!("{:?} {:?} {:?}", rate.provider, rate.amount, rate.currency);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Rejections the service explains are [`Error::Api`] and carry the body
//! exactly as received. Connection failures and server errors above 500 are
//! [`Error::Network`] with the transport error untouched:
//!
//! ```no_run
//! use shippo::{Client, ClientConfig, Error};
//!
//! # async fn example() -> Result<(), Error> {
//! # let client = Client::new(ClientConfig::new("shippo_test_token"))?;
//! match client.retrieve_transaction("tx_id").await {
//!     Ok(transaction) => println!("Label: {:?}", transaction.label_url),
//!     Err(Error::Api { status, raw_response, .. }) => {
//!         eprintln!("Rejected ({}): {}", status, raw_response);
//!     }
//!     Err(Error::RequestTimeout { object_id, .. }) => {
//!         eprintln!("{} is still processing, try again later", object_id);
//!     }
//!     Err(e) => eprintln!("Other error: {}", e),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Waiting for Background Processing
//!
//! Rates and labels are generated asynchronously. [`Client::shipping_rates`]
//! and [`Client::create_transaction_and_wait`] poll until the object leaves
//! `QUEUED`/`WAITING`, giving up after the configured timeout:
//!
//! ```no_run
//! use shippo::{Client, ClientConfig, PollBackoff};
//! use std::time::Duration;
//!
//! # fn example() -> Result<(), shippo::Error> {
//! let config = ClientConfig::builder()
//!     .token("shippo_test_token")
//!     .transaction_poll_timeout(Duration::from_secs(60))
//!     .poll_backoff(PollBackoff::Fixed(Duration::from_millis(500)))
//!     .build()?;
//! let client = Client::new(config)?;
//! # Ok(())
//! # }
//! ```
//!
//! A synchronous interface over the same implementation lives in
//! [`blocking`].

pub mod blocking;
mod client;
pub mod codec;
pub mod config;
pub mod dispatch;
mod error;
pub mod extras;
pub mod metadata;
pub mod models;
pub mod poll;
mod resources;
mod response;

pub use client::Client;
pub use config::{AuthScheme, ClientConfig, ClientConfigBuilder};
pub use error::{classify, Error, Result};
pub use poll::{PollBackoff, PollDeadline, Pollable, Poller, ProcessingState};
pub use response::RawResponse;
