//! Request and response shapes for Shippo resources.
//!
//! Most fields are optional: responses may omit them, and unset fields are
//! left out of request bodies entirely. Timestamps and money amounts are kept
//! as the strings the API sends.

use crate::extras::Extras;
use crate::poll::Pollable;
use serde::{Deserialize, Serialize};

/// A page of results from a list endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Collection<T> {
    pub count: Option<u64>,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}

impl<T> Default for Collection<T> {
    fn default() -> Self {
        Self {
            count: None,
            next: None,
            previous: None,
            results: Vec::new(),
        }
    }
}

/// Paging for list endpoints.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ListParams {
    /// 1-indexed page number.
    pub page: Option<u32>,
    /// Page size.
    pub results: Option<u32>,
}

/// Either the id of an existing object or the object itself, inline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ObjectRef<T> {
    Id(String),
    Object(T),
}

impl<T> From<&str> for ObjectRef<T> {
    fn from(id: &str) -> Self {
        ObjectRef::Id(id.to_string())
    }
}

impl<T> From<String> for ObjectRef<T> {
    fn from(id: String) -> Self {
        ObjectRef::Id(id)
    }
}

/// A message attached to a response by Shippo or a carrier.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Message {
    pub source: Option<String>,
    pub code: Option<String>,
    pub text: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MassUnit {
    #[serde(rename = "g")]
    Gram,
    #[serde(rename = "oz")]
    Ounce,
    #[serde(rename = "lb")]
    Pound,
    #[serde(rename = "kg")]
    Kilogram,
    /// A value this crate does not know yet. Decoded only, never sent.
    #[serde(other, skip_serializing)]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DistanceUnit {
    #[serde(rename = "cm")]
    Centimeter,
    #[serde(rename = "in")]
    Inch,
    #[serde(rename = "ft")]
    Foot,
    #[serde(rename = "mm")]
    Millimeter,
    #[serde(rename = "m")]
    Meter,
    #[serde(rename = "yd")]
    Yard,
    /// A value this crate does not know yet. Decoded only, never sent.
    #[serde(other, skip_serializing)]
    Unknown,
}

/// Label file format. Without one, the account default is used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LabelFileType {
    #[serde(rename = "PNG")]
    Png,
    #[serde(rename = "PNG_2.3x7.5")]
    Png2_3x7_5,
    #[serde(rename = "PDF")]
    Pdf,
    #[serde(rename = "PDF_2.3x7.5")]
    Pdf2_3x7_5,
    #[serde(rename = "PDF_4x6")]
    Pdf4x6,
    #[serde(rename = "PDF_4x8")]
    Pdf4x8,
    #[serde(rename = "PDF_A4")]
    PdfA4,
    #[serde(rename = "PDF_A6")]
    PdfA6,
    #[serde(rename = "ZPLII")]
    Zplii,
    /// A value this crate does not know yet. Decoded only, never sent.
    #[serde(other, skip_serializing)]
    Unknown,
}

/// Filter for the shipments embedded in a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectResults {
    CreationFailed,
    CreationSucceeded,
    PurchaseFailed,
    PurchaseSucceeded,
    /// A value this crate does not know yet. Decoded only, never sent.
    #[serde(other, skip_serializing)]
    Unknown,
}

/// Where a tracked package is in its journey.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TrackingState {
    PreTransit,
    Transit,
    Delivered,
    Returned,
    Failure,
    /// A value this crate does not know yet. Decoded only, never sent.
    #[serde(other, skip_serializing)]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContentsType {
    Documents,
    Gift,
    Sample,
    Merchandise,
    HumanitarianDonation,
    ReturnMerchandise,
    Other,
    /// A value this crate does not know yet. Decoded only, never sent.
    #[serde(other, skip_serializing)]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NonDeliveryOption {
    Abandon,
    Return,
    /// A value this crate does not know yet. Decoded only, never sent.
    #[serde(other, skip_serializing)]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Incoterm {
    #[serde(rename = "DDP")]
    Ddp,
    #[serde(rename = "DDU")]
    Ddu,
    /// DHL Express and FedEx only.
    #[serde(rename = "FCA")]
    Fca,
    /// A value this crate does not know yet. Decoded only, never sent.
    #[serde(other, skip_serializing)]
    Unknown,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationResults {
    pub is_valid: Option<bool>,
    pub messages: Vec<Message>,
}

/// A postal address. Also used as the create request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Address {
    pub object_id: Option<String>,
    pub object_owner: Option<String>,
    pub object_created: Option<String>,
    pub object_updated: Option<String>,
    pub is_complete: Option<bool>,
    pub name: Option<String>,
    pub company: Option<String>,
    pub street1: Option<String>,
    pub street2: Option<String>,
    pub street3: Option<String>,
    pub street_no: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
    pub country: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub is_residential: Option<bool>,
    /// Ask Shippo to validate the address on creation.
    pub validate: Option<bool>,
    pub metadata: Option<String>,
    pub validation_results: Option<ValidationResults>,
    pub test: Option<bool>,
}

/// A package. Also used as the create request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Parcel {
    pub object_id: Option<String>,
    pub object_state: Option<String>,
    pub object_owner: Option<String>,
    pub object_created: Option<String>,
    pub object_updated: Option<String>,
    pub length: Option<String>,
    pub width: Option<String>,
    pub height: Option<String>,
    pub distance_unit: Option<DistanceUnit>,
    pub weight: Option<String>,
    pub mass_unit: Option<MassUnit>,
    /// Carrier parcel template token, replaces the dimensions.
    pub template: Option<String>,
    pub metadata: Option<String>,
    pub extra: Option<Extras>,
    pub test: Option<bool>,
}

/// Service level of a rate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceLevel {
    pub name: Option<String>,
    pub token: Option<String>,
    pub terms: Option<String>,
}

/// A price quote for one service level of one carrier.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Rate {
    pub object_id: Option<String>,
    pub object_created: Option<String>,
    pub object_owner: Option<String>,
    pub attributes: Vec<String>,
    pub amount: Option<String>,
    pub currency: Option<String>,
    pub amount_local: Option<String>,
    pub currency_local: Option<String>,
    pub provider: Option<String>,
    pub provider_image_75: Option<String>,
    pub provider_image_200: Option<String>,
    pub servicelevel: Option<ServiceLevel>,
    pub estimated_days: Option<u32>,
    pub duration_terms: Option<String>,
    pub messages: Vec<Message>,
    pub zone: Option<String>,
    pub shipment: Option<String>,
    pub carrier_account: Option<String>,
    pub test: Option<bool>,
}

/// A shipment as returned by the API.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Shipment {
    pub object_id: Option<String>,
    pub object_owner: Option<String>,
    pub object_created: Option<String>,
    pub object_updated: Option<String>,
    /// Rate generation status: `QUEUED`, `WAITING`, `SUCCESS` or `ERROR`.
    pub status: Option<String>,
    pub address_from: Option<Address>,
    pub address_to: Option<Address>,
    pub address_return: Option<Address>,
    pub parcels: Vec<Parcel>,
    pub shipment_date: Option<String>,
    pub customs_declaration: Option<String>,
    pub carrier_accounts: Vec<String>,
    pub metadata: Option<String>,
    pub extra: Option<Extras>,
    pub rates: Vec<Rate>,
    pub messages: Vec<Message>,
    pub test: Option<bool>,
}

impl Pollable for Shipment {
    fn processing_status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    fn object_id(&self) -> Option<&str> {
        self.object_id.as_deref()
    }
}

/// Parameters for creating a shipment.
///
/// Addresses and parcels can be given inline or as ids of existing objects.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShipmentRequest {
    pub address_from: Option<ObjectRef<Address>>,
    pub address_to: Option<ObjectRef<Address>>,
    pub address_return: Option<ObjectRef<Address>>,
    pub parcels: Vec<ObjectRef<Parcel>>,
    pub shipment_date: Option<String>,
    pub customs_declaration: Option<String>,
    pub carrier_accounts: Option<Vec<String>>,
    pub metadata: Option<String>,
    pub extra: Option<Extras>,
    /// Return immediately and generate rates in the background.
    #[serde(rename = "async")]
    pub is_async: Option<bool>,
}

/// A label purchase.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Transaction {
    pub object_id: Option<String>,
    pub object_owner: Option<String>,
    pub object_created: Option<String>,
    pub object_updated: Option<String>,
    pub object_state: Option<String>,
    /// Label generation status: `QUEUED`, `WAITING`, `SUCCESS` or `ERROR`.
    pub status: Option<String>,
    pub rate: Option<String>,
    pub tracking_number: Option<String>,
    pub tracking_status: Option<TrackingState>,
    pub tracking_url_provider: Option<String>,
    pub label_url: Option<String>,
    pub label_file_type: Option<LabelFileType>,
    pub commercial_invoice_url: Option<String>,
    pub eta: Option<String>,
    pub metadata: Option<String>,
    pub messages: Vec<Message>,
    pub test: Option<bool>,
}

impl Pollable for Transaction {
    fn processing_status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    fn object_id(&self) -> Option<&str> {
        self.object_id.as_deref()
    }
}

/// Parameters for purchasing a label, either from a rate or in one call
/// from an inline shipment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransactionRequest {
    pub rate: Option<String>,
    pub shipment: Option<ShipmentRequest>,
    pub carrier_account: Option<String>,
    pub servicelevel_token: Option<String>,
    pub label_file_type: Option<LabelFileType>,
    pub metadata: Option<String>,
    #[serde(rename = "async")]
    pub is_async: Option<bool>,
}

/// One line item of a customs declaration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomsItem {
    pub object_id: Option<String>,
    pub object_owner: Option<String>,
    pub object_state: Option<String>,
    pub description: Option<String>,
    pub quantity: Option<u32>,
    pub net_weight: Option<String>,
    pub mass_unit: Option<MassUnit>,
    pub value_amount: Option<String>,
    pub value_currency: Option<String>,
    pub origin_country: Option<String>,
    pub tariff_number: Option<String>,
    pub sku_code: Option<String>,
    pub eccn_ear99: Option<String>,
    pub metadata: Option<String>,
    pub test: Option<bool>,
}

/// A customs declaration. `items` holds customs item ids.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomsDeclaration {
    pub object_id: Option<String>,
    pub object_owner: Option<String>,
    pub object_created: Option<String>,
    pub object_updated: Option<String>,
    pub object_state: Option<String>,
    pub exporter_reference: Option<String>,
    pub importer_reference: Option<String>,
    pub contents_type: Option<ContentsType>,
    pub contents_explanation: Option<String>,
    pub invoice: Option<String>,
    pub license: Option<String>,
    pub certificate: Option<String>,
    pub notes: Option<String>,
    /// EEL / PFC exemption, e.g. `NOEEI_30_37_a`.
    pub eel_pfc: Option<String>,
    pub aes_itn: Option<String>,
    pub non_delivery_option: Option<NonDeliveryOption>,
    pub certify: Option<bool>,
    pub certify_signer: Option<String>,
    pub address_importer: Option<Address>,
    pub disclaimer: Option<String>,
    pub incoterm: Option<Incoterm>,
    pub items: Vec<String>,
    pub metadata: Option<String>,
    pub test: Option<bool>,
}

/// A carrier account. Also used for create and update requests.
///
/// `parameters` holds the carrier-specific credentials, whose shape differs
/// per carrier.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CarrierAccount {
    pub object_id: Option<String>,
    pub object_owner: Option<String>,
    pub carrier: Option<String>,
    pub account_id: Option<String>,
    pub parameters: Option<serde_json::Map<String, serde_json::Value>>,
    pub active: Option<bool>,
    pub metadata: Option<String>,
    pub test: Option<bool>,
}

/// A label refund.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Refund {
    pub object_id: Option<String>,
    pub object_owner: Option<String>,
    pub object_created: Option<String>,
    pub object_updated: Option<String>,
    pub status: Option<String>,
    pub transaction: Option<String>,
    pub test: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RefundRequest {
    /// Id of the transaction to refund.
    pub transaction: String,
    #[serde(rename = "async")]
    pub is_async: Option<bool>,
}

/// An end-of-day scan form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Manifest {
    pub object_id: Option<String>,
    pub object_owner: Option<String>,
    pub object_created: Option<String>,
    pub object_updated: Option<String>,
    pub status: Option<String>,
    pub carrier_account: Option<String>,
    pub shipment_date: Option<String>,
    pub address_from: Option<ObjectRef<Address>>,
    pub transactions: Vec<String>,
    pub documents: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManifestRequest {
    pub carrier_account: String,
    pub shipment_date: String,
    pub address_from: Option<ObjectRef<Address>>,
    pub transactions: Option<Vec<String>>,
    #[serde(rename = "async")]
    pub is_async: Option<bool>,
}

/// A shipment inside a batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchShipment {
    pub object_id: Option<String>,
    pub status: Option<String>,
    pub shipment: Option<ObjectRef<ShipmentRequest>>,
    pub carrier_account: Option<String>,
    pub servicelevel_token: Option<String>,
    pub metadata: Option<String>,
    pub transaction: Option<String>,
    pub messages: Vec<Message>,
}

/// Per-state counts of a batch's shipments.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchObjectResults {
    pub creation_failed: Option<u64>,
    pub creation_succeeded: Option<u64>,
    pub purchase_failed: Option<u64>,
    pub purchase_succeeded: Option<u64>,
}

/// A group of shipments purchased together.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Batch {
    pub object_id: Option<String>,
    pub object_owner: Option<String>,
    pub object_created: Option<String>,
    pub object_updated: Option<String>,
    /// `VALIDATING`, `VALID`, `INVALID`, `PURCHASING` or `PURCHASED`.
    pub status: Option<String>,
    pub default_carrier_account: Option<String>,
    pub default_servicelevel_token: Option<String>,
    pub label_filetype: Option<LabelFileType>,
    pub metadata: Option<String>,
    pub batch_shipments: Collection<BatchShipment>,
    pub object_results: Option<BatchObjectResults>,
    pub label_url: Vec<String>,
    pub test: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchRequest {
    pub default_carrier_account: String,
    pub default_servicelevel_token: String,
    pub label_filetype: Option<LabelFileType>,
    pub metadata: Option<String>,
    pub batch_shipments: Vec<BatchShipment>,
}

/// Query for retrieving a batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchQuery {
    /// Page of `batch_shipments`; omitted when `None`.
    pub page: Option<u32>,
    pub object_results: Option<ObjectResults>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShortAddress {
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
    pub country: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackingSubstatus {
    pub code: Option<String>,
    pub text: Option<String>,
    pub action_required: Option<bool>,
}

/// One tracking update.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackingEvent {
    pub object_id: Option<String>,
    pub object_created: Option<String>,
    pub object_updated: Option<String>,
    pub status: Option<TrackingState>,
    pub status_details: Option<String>,
    pub status_date: Option<String>,
    pub substatus: Option<TrackingSubstatus>,
    pub location: Option<ShortAddress>,
}

/// Tracking information for a package.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Track {
    pub carrier: Option<String>,
    pub tracking_number: Option<String>,
    pub address_from: Option<ShortAddress>,
    pub address_to: Option<ShortAddress>,
    pub transaction: Option<String>,
    pub eta: Option<String>,
    pub original_eta: Option<String>,
    pub servicelevel: Option<ServiceLevel>,
    pub metadata: Option<String>,
    pub tracking_status: Option<TrackingEvent>,
    pub tracking_history: Vec<TrackingEvent>,
    pub test: Option<bool>,
}

/// Registers a tracking webhook for a package.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackRequest {
    pub carrier: String,
    pub tracking_number: String,
    pub metadata: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec;
    use http::StatusCode;

    #[test]
    fn test_shipment_request_accepts_ids_and_objects() {
        let request = ShipmentRequest {
            address_from: Some("addr_from".into()),
            address_to: Some(ObjectRef::Object(Address {
                name: Some("Mr Hippo".to_string()),
                country: Some("US".to_string()),
                ..Default::default()
            })),
            parcels: vec!["parcel_1".into()],
            is_async: Some(false),
            ..Default::default()
        };

        let body = codec::encode(&request).unwrap();
        assert_eq!(
            body,
            r#"{"address_from":"addr_from","address_to":{"country":"US","name":"Mr Hippo"},"async":false,"parcels":["parcel_1"]}"#
        );
    }

    #[test]
    fn test_unknown_tracking_state_decodes() {
        let event: TrackingEvent =
            codec::decode(StatusCode::OK, r#"{"status":"HELD_AT_CUSTOMS"}"#).unwrap();
        assert_eq!(event.status, Some(TrackingState::Unknown));
    }

    #[test]
    fn test_label_file_type_names() {
        let body = codec::encode(&TransactionRequest {
            rate: Some("rate_1".to_string()),
            label_file_type: Some(LabelFileType::Pdf4x6),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(body, r#"{"label_file_type":"PDF_4x6","rate":"rate_1"}"#);
    }

    #[test]
    fn test_batch_query_pairs() {
        let pairs = codec::query_pairs(&BatchQuery {
            page: Some(2),
            object_results: Some(ObjectResults::PurchaseFailed),
        })
        .unwrap();
        assert_eq!(
            pairs,
            vec![
                ("object_results".to_string(), "purchase_failed".to_string()),
                ("page".to_string(), "2".to_string()),
            ]
        );
    }

    #[test]
    fn test_shipment_decodes_rates() {
        let shipment: Shipment = codec::decode(
            StatusCode::OK,
            r#"{"object_id":"s1","status":"SUCCESS","rates":[{"object_id":"r1","amount":"5.50","servicelevel":{"token":"usps_priority"}}],"unused":1}"#,
        )
        .unwrap();
        assert_eq!(shipment.rates.len(), 1);
        assert_eq!(
            shipment.rates[0].servicelevel.as_ref().unwrap().token.as_deref(),
            Some("usps_priority")
        );
        assert!(!shipment.processing_state().is_in_flight());
    }

    #[test]
    fn test_unknown_label_file_type_does_not_fail_decode() {
        let transaction: Transaction = codec::decode(
            StatusCode::OK,
            r#"{"object_id":"tx","status":"SUCCESS","label_file_type":"PDF_W_PSL_4x6"}"#,
        )
        .unwrap();
        assert_eq!(transaction.label_file_type, Some(LabelFileType::Unknown));
        assert_eq!(transaction.status.as_deref(), Some("SUCCESS"));
    }

    #[test]
    fn test_unknown_units_and_results_decode() {
        let parcel: Parcel =
            codec::decode(StatusCode::OK, r#"{"mass_unit":"st","distance_unit":"ly"}"#).unwrap();
        assert_eq!(parcel.mass_unit, Some(MassUnit::Unknown));
        assert_eq!(parcel.distance_unit, Some(DistanceUnit::Unknown));

        let item: CustomsDeclaration = codec::decode(
            StatusCode::OK,
            r#"{"contents_type":"PERSONAL_EFFECTS","incoterm":"DAP","non_delivery_option":"HOLD"}"#,
        )
        .unwrap();
        assert_eq!(item.contents_type, Some(ContentsType::Unknown));
        assert_eq!(item.incoterm, Some(Incoterm::Unknown));
        assert_eq!(item.non_delivery_option, Some(NonDeliveryOption::Unknown));
    }

    #[test]
    fn test_unknown_values_are_not_sent() {
        let result = codec::encode(&TransactionRequest {
            label_file_type: Some(LabelFileType::Unknown),
            ..Default::default()
        });
        assert!(matches!(result, Err(crate::Error::SerializationFailed(_))));
    }
}
