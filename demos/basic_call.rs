//! Buys a domestic label end to end.
//!
//! This example shows how to:
//! - Configure the client from `SHIPPO_API_TOKEN`
//! - Create a shipment and wait for its rates
//! - Purchase the cheapest rate and wait for the label
//! - Tell rejected requests apart from timeouts
//!
//! Run with: `SHIPPO_API_TOKEN=shippo_test_... cargo run --example basic_call`

use shippo::models::{
    Address, DistanceUnit, LabelFileType, MassUnit, ObjectRef, Parcel, ShipmentRequest,
    TransactionRequest,
};
use shippo::{Client, ClientConfig, Error};

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter("shippo=debug,basic_call=info")
        .init();

    let client = Client::new(ClientConfig::from_env()?)?;

    let address_from = Address {
        name: Some("Mr Hippo".to_string()),
        street1: Some("215 Clayton St.".to_string()),
        city: Some("San Francisco".to_string()),
        state: Some("CA".to_string()),
        zip: Some("94117".to_string()),
        country: Some("US".to_string()),
        phone: Some("+1 555 341 9393".to_string()),
        email: Some("support@goshippo.com".to_string()),
        ..Default::default()
    };

    let address_to = Address {
        name: Some("Mrs Hippo".to_string()),
        street1: Some("965 Mission St.".to_string()),
        city: Some("San Francisco".to_string()),
        state: Some("CA".to_string()),
        zip: Some("94105".to_string()),
        country: Some("US".to_string()),
        ..Default::default()
    };

    let parcel = Parcel {
        length: Some("5".to_string()),
        width: Some("5".to_string()),
        height: Some("5".to_string()),
        distance_unit: Some(DistanceUnit::Inch),
        weight: Some("2".to_string()),
        mass_unit: Some(MassUnit::Pound),
        ..Default::default()
    };

    println!("=== Creating shipment ===");
    let shipment = client
        .create_shipment(&ShipmentRequest {
            address_from: Some(ObjectRef::Object(address_from)),
            address_to: Some(ObjectRef::Object(address_to)),
            parcels: vec![ObjectRef::Object(parcel)],
            is_async: Some(true),
            ..Default::default()
        })
        .await?;

    let Some(shipment_id) = shipment.object_id else {
        return Err(Error::UnexpectedResponse("shipment has no object_id".to_string()));
    };
    println!("Shipment {} is {:?}", shipment_id, shipment.status);

    println!("\n=== Waiting for rates ===");
    let rates = client.shipping_rates(&shipment_id, Some("USD")).await?;
    for rate in &rates.results {
        println!(
            "  {:<8} {:>8} {}  ({:?} days)",
            rate.provider.as_deref().unwrap_or("?"),
            rate.amount.as_deref().unwrap_or("?"),
            rate.currency.as_deref().unwrap_or(""),
            rate.estimated_days,
        );
    }

    let cheapest = rates
        .results
        .iter()
        .filter_map(|rate| {
            let amount = rate.amount.as_deref()?.parse::<f64>().ok()?;
            Some((amount, rate.object_id.clone()?))
        })
        .min_by(|a, b| a.0.total_cmp(&b.0));

    let Some((amount, rate_id)) = cheapest else {
        println!("No rates were returned for this shipment");
        return Ok(());
    };

    println!("\n=== Purchasing rate {} ({:.2} USD) ===", rate_id, amount);
    match client
        .create_transaction_and_wait(&TransactionRequest {
            rate: Some(rate_id),
            label_file_type: Some(LabelFileType::Pdf),
            ..Default::default()
        })
        .await
    {
        Ok(transaction) => {
            println!("Status: {:?}", transaction.status);
            println!("Label: {:?}", transaction.label_url);
            println!("Tracking number: {:?}", transaction.tracking_number);
            for message in transaction.messages {
                println!("Message: {:?}", message.text);
            }
        }
        Err(Error::Api {
            status,
            raw_response,
            ..
        }) => {
            eprintln!("Purchase rejected ({}): {}", status, raw_response);
        }
        Err(Error::RequestTimeout { object_id, .. }) => {
            eprintln!(
                "Label {} is still being generated; retrieve it again later",
                object_id
            );
        }
        Err(e) => return Err(e),
    }

    Ok(())
}
