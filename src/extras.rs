//! Carrier-specific options attached to shipments and parcels.
//!
//! Each option only matters to some carriers, so instead of one struct with
//! dozens of optional fields they are kept in an [`Extras`] map keyed by the
//! option's wire name. Every entry is validated on its own before a request
//! is sent. Unrecognised keys in a response are dropped.

use crate::{Error, Result};
use serde::de::{self, Deserializer};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

const MAX_REFERENCE_LEN: usize = 50;

const DELIVERY_TIMEFRAMES: [&str; 6] = [
    "10001200", "12001400", "14001600", "16001800", "18002000", "19002100",
];

/// Signature requirement on delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SignatureConfirmation {
    Standard,
    Adult,
    /// USPS only.
    Certified,
    /// FedEx only.
    Indirect,
    /// Deutsche Post only.
    CarrierConfirmation,
    /// A value this crate does not know yet. Decoded only, never sent.
    #[serde(other, skip_serializing)]
    Unknown,
}

/// Carrier providing insurance directly instead of Shippo's default provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InsuranceProvider {
    Fedex,
    Ups,
    Ontrac,
    /// A value this crate does not know yet. Decoded only, never sent.
    #[serde(other, skip_serializing)]
    Unknown,
}

/// Shipment insurance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insurance {
    pub amount: String,
    pub currency: String,
    #[serde(default)]
    pub provider: Option<InsuranceProvider>,
    #[serde(default)]
    pub content: Option<String>,
}

/// How a collect-on-delivery amount may be paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    SecuredFunds,
    Cash,
    Any,
    /// A value this crate does not know yet. Decoded only, never sent.
    #[serde(other, skip_serializing)]
    Unknown,
}

/// Collect on delivery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionOnDelivery {
    pub amount: String,
    pub currency: String,
    #[serde(default)]
    pub payment_method: Option<PaymentMethod>,
}

/// License type of an alcohol recipient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlcoholRecipient {
    Licensee,
    Consumer,
    /// A value this crate does not know yet. Decoded only, never sent.
    #[serde(other, skip_serializing)]
    Unknown,
}

/// Alcohol declaration (FedEx and UPS).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alcohol {
    pub contains_alcohol: bool,
    #[serde(default)]
    pub recipient_type: Option<AlcoholRecipient>,
}

/// Dry ice declaration (FedEx and UPS). Weight is in kilograms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DryIce {
    pub contains_dry_ice: bool,
    pub weight: String,
}

/// Party billed for the shipment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BillingParty {
    Sender,
    Recipient,
    ThirdParty,
    /// A value this crate does not know yet. Decoded only, never sent.
    #[serde(other, skip_serializing)]
    Unknown,
}

/// Billing details (UPS, FedEx and DHL Germany).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Billing {
    #[serde(rename = "type")]
    pub party: Option<BillingParty>,
    pub account: Option<String>,
    pub zip: Option<String>,
    pub country: Option<String>,
    pub participation_code: Option<String>,
}

/// One carrier-specific option.
#[derive(Debug, Clone, PartialEq)]
pub enum Extra {
    SignatureConfirmation(SignatureConfirmation),
    Insurance(Insurance),
    CollectionOnDelivery(CollectionOnDelivery),
    Alcohol(Alcohol),
    DryIce(DryIce),
    Billing(Billing),
    /// Text printed on the label, up to 50 characters.
    Reference1(String),
    /// Text printed on the label, up to 50 characters.
    Reference2(String),
    IsReturn(bool),
    SaturdayDelivery(bool),
    BypassAddressValidation(bool),
    /// Retail instead of account rates (UPS and FedEx).
    RequestRetailRates(bool),
    /// Premium service (DHL Germany international).
    Premium(bool),
    /// `HHMMHHMM` delivery window (DHL Germany Paket Sameday).
    PreferredDeliveryTimeframe(String),
    /// Lasership container type, e.g. `Box` or `Tube`.
    ContainerType(String),
    /// USPS Parcel Select sort level.
    UspsSortType(String),
    /// USPS Parcel Select entry facility.
    UspsEntryFacility(String),
    /// DHL eCommerce dangerous goods code.
    DangerousGoodsCode(String),
}

impl Extra {
    /// The option's key in the `extra` object.
    pub fn key(&self) -> &'static str {
        match self {
            Extra::SignatureConfirmation(_) => "signature_confirmation",
            Extra::Insurance(_) => "insurance",
            Extra::CollectionOnDelivery(_) => "COD",
            Extra::Alcohol(_) => "alcohol",
            Extra::DryIce(_) => "dry_ice",
            Extra::Billing(_) => "billing",
            Extra::Reference1(_) => "reference_1",
            Extra::Reference2(_) => "reference_2",
            Extra::IsReturn(_) => "is_return",
            Extra::SaturdayDelivery(_) => "saturday_delivery",
            Extra::BypassAddressValidation(_) => "bypass_address_validation",
            Extra::RequestRetailRates(_) => "request_retail_rates",
            Extra::Premium(_) => "premium",
            Extra::PreferredDeliveryTimeframe(_) => "preferred_delivery_timeframe",
            Extra::ContainerType(_) => "container_type",
            Extra::UspsSortType(_) => "usps_sort_type",
            Extra::UspsEntryFacility(_) => "usps_entry_facility",
            Extra::DangerousGoodsCode(_) => "dangerous_goods_code",
        }
    }

    /// Whether the option is accepted on a parcel, not just a shipment.
    pub fn applies_to_parcel(&self) -> bool {
        matches!(
            self,
            Extra::Insurance(_)
                | Extra::CollectionOnDelivery(_)
                | Extra::Reference1(_)
                | Extra::Reference2(_)
        )
    }

    /// Checks this option on its own.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidExtra`] describing the first problem found.
    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: String| {
            Err(Error::InvalidExtra {
                feature: self.key(),
                reason,
            })
        };

        if self.has_unknown_value() {
            return invalid("holds a value received from the API that cannot be sent".to_string());
        }

        match self {
            Extra::Insurance(Insurance {
                amount, currency, ..
            })
            | Extra::CollectionOnDelivery(CollectionOnDelivery {
                amount, currency, ..
            }) => {
                if !is_positive_decimal(amount) {
                    return invalid(format!("amount `{}` is not a positive number", amount));
                }
                if !is_currency_code(currency) {
                    return invalid(format!("`{}` is not a 3-letter currency code", currency));
                }
            }
            Extra::DryIce(dry_ice) => {
                if dry_ice.contains_dry_ice && !is_positive_decimal(&dry_ice.weight) {
                    return invalid(format!(
                        "weight `{}` is not a positive number of kilograms",
                        dry_ice.weight
                    ));
                }
            }
            Extra::Alcohol(alcohol) => {
                if !alcohol.contains_alcohol && alcohol.recipient_type.is_some() {
                    return invalid("recipient_type set without contains_alcohol".to_string());
                }
            }
            Extra::Billing(billing) => {
                if let Some(country) = &billing.country {
                    if country.len() != 2 || !country.chars().all(|c| c.is_ascii_alphabetic()) {
                        return invalid(format!("`{}` is not an ISO 3166-1 alpha-2 code", country));
                    }
                }
            }
            Extra::Reference1(text) | Extra::Reference2(text) => {
                let len = text.chars().count();
                if len > MAX_REFERENCE_LEN {
                    return invalid(format!(
                        "{} characters exceeds the limit of {}",
                        len, MAX_REFERENCE_LEN
                    ));
                }
            }
            Extra::PreferredDeliveryTimeframe(window) => {
                if !DELIVERY_TIMEFRAMES.contains(&window.as_str()) {
                    return invalid(format!("`{}` is not a supported delivery window", window));
                }
            }
            Extra::ContainerType(value)
            | Extra::UspsSortType(value)
            | Extra::UspsEntryFacility(value)
            | Extra::DangerousGoodsCode(value) => {
                if value.trim().is_empty() {
                    return invalid("value is empty".to_string());
                }
            }
            Extra::SignatureConfirmation(_)
            | Extra::IsReturn(_)
            | Extra::SaturdayDelivery(_)
            | Extra::BypassAddressValidation(_)
            | Extra::RequestRetailRates(_)
            | Extra::Premium(_) => {}
        }

        Ok(())
    }

    fn has_unknown_value(&self) -> bool {
        match self {
            Extra::SignatureConfirmation(v) => *v == SignatureConfirmation::Unknown,
            Extra::Insurance(v) => v.provider == Some(InsuranceProvider::Unknown),
            Extra::CollectionOnDelivery(v) => v.payment_method == Some(PaymentMethod::Unknown),
            Extra::Alcohol(v) => v.recipient_type == Some(AlcoholRecipient::Unknown),
            Extra::Billing(v) => v.party == Some(BillingParty::Unknown),
            _ => false,
        }
    }

    fn to_value(&self) -> serde_json::Result<Value> {
        match self {
            Extra::SignatureConfirmation(v) => serde_json::to_value(v),
            Extra::Insurance(v) => serde_json::to_value(v),
            Extra::CollectionOnDelivery(v) => serde_json::to_value(v),
            Extra::Alcohol(v) => serde_json::to_value(v),
            Extra::DryIce(v) => serde_json::to_value(v),
            Extra::Billing(v) => serde_json::to_value(v),
            Extra::IsReturn(v)
            | Extra::SaturdayDelivery(v)
            | Extra::BypassAddressValidation(v)
            | Extra::RequestRetailRates(v)
            | Extra::Premium(v) => Ok(Value::Bool(*v)),
            Extra::Reference1(v)
            | Extra::Reference2(v)
            | Extra::PreferredDeliveryTimeframe(v)
            | Extra::ContainerType(v)
            | Extra::UspsSortType(v)
            | Extra::UspsEntryFacility(v)
            | Extra::DangerousGoodsCode(v) => Ok(Value::String(v.clone())),
        }
    }

    /// Parses a single entry; `None` for keys this crate does not know.
    fn from_entry(key: &str, value: Value) -> Option<serde_json::Result<Extra>> {
        use serde_json::from_value;

        let extra = match key {
            "signature_confirmation" => from_value(value).map(Extra::SignatureConfirmation),
            "insurance" => from_value(value).map(Extra::Insurance),
            "COD" => from_value(value).map(Extra::CollectionOnDelivery),
            "alcohol" => from_value(value).map(Extra::Alcohol),
            "dry_ice" => from_value(value).map(Extra::DryIce),
            "billing" => from_value(value).map(Extra::Billing),
            "reference_1" => from_value(value).map(Extra::Reference1),
            "reference_2" => from_value(value).map(Extra::Reference2),
            "is_return" => from_value(value).map(Extra::IsReturn),
            "saturday_delivery" => from_value(value).map(Extra::SaturdayDelivery),
            "bypass_address_validation" => from_value(value).map(Extra::BypassAddressValidation),
            "request_retail_rates" => from_value(value).map(Extra::RequestRetailRates),
            "premium" => from_value(value).map(Extra::Premium),
            "preferred_delivery_timeframe" => {
                from_value(value).map(Extra::PreferredDeliveryTimeframe)
            }
            "container_type" => from_value(value).map(Extra::ContainerType),
            "usps_sort_type" => from_value(value).map(Extra::UspsSortType),
            "usps_entry_facility" => from_value(value).map(Extra::UspsEntryFacility),
            "dangerous_goods_code" => from_value(value).map(Extra::DangerousGoodsCode),
            _ => return None,
        };
        Some(extra)
    }
}

/// The `extra` object of a shipment or parcel.
///
/// # Examples
///
/// ```
/// use shippo::extras::{Extra, Extras, SignatureConfirmation};
///
/// let extras = Extras::new()
///     .with(Extra::SignatureConfirmation(SignatureConfirmation::Adult))
///     .with(Extra::Reference1("Order 1042".to_string()));
///
/// extras.validate().unwrap();
/// assert_eq!(
///     serde_json::to_string(&extras).unwrap(),
///     r#"{"reference_1":"Order 1042","signature_confirmation":"ADULT"}"#
/// );
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extras {
    entries: BTreeMap<&'static str, Extra>,
}

impl Extras {
    /// An empty set of options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an option, replacing any previous option with the same key.
    pub fn with(mut self, extra: Extra) -> Self {
        self.insert(extra);
        self
    }

    /// Adds an option, returning the one it replaced.
    pub fn insert(&mut self, extra: Extra) -> Option<Extra> {
        self.entries.insert(extra.key(), extra)
    }

    /// Looks up an option by wire name.
    pub fn get(&self, key: &str) -> Option<&Extra> {
        self.entries.get(key)
    }

    /// Removes an option by wire name.
    pub fn remove(&mut self, key: &str) -> Option<Extra> {
        self.entries.remove(key)
    }

    /// Iterates options in key order.
    pub fn iter(&self) -> impl Iterator<Item = &Extra> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Validates every option independently.
    pub fn validate(&self) -> Result<()> {
        self.iter().try_for_each(Extra::validate)
    }

    /// Validates every option and checks it may be set on a parcel.
    pub fn validate_for_parcel(&self) -> Result<()> {
        for extra in self.iter() {
            if !extra.applies_to_parcel() {
                return Err(Error::InvalidExtra {
                    feature: extra.key(),
                    reason: "only allowed on shipments".to_string(),
                });
            }
            extra.validate()?;
        }
        Ok(())
    }
}

impl FromIterator<Extra> for Extras {
    fn from_iter<I: IntoIterator<Item = Extra>>(iter: I) -> Self {
        let mut extras = Extras::new();
        for extra in iter {
            extras.insert(extra);
        }
        extras
    }
}

impl Serialize for Extras {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, extra) in &self.entries {
            let value = extra.to_value().map_err(serde::ser::Error::custom)?;
            map.serialize_entry(key, &value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Extras {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = BTreeMap::<String, Value>::deserialize(deserializer)?;
        let mut extras = Extras::new();
        for (key, value) in raw {
            if value.is_null() {
                continue;
            }
            match Extra::from_entry(&key, value) {
                Some(Ok(extra)) => {
                    extras.insert(extra);
                }
                Some(Err(e)) => {
                    return Err(de::Error::custom(format!("invalid extra `{}`: {}", key, e)))
                }
                None => tracing::debug!(key = %key, "Ignoring unrecognised extra"),
            }
        }
        Ok(extras)
    }
}

fn is_positive_decimal(raw: &str) -> bool {
    raw.trim().parse::<f64>().is_ok_and(|v| v.is_finite() && v > 0.0)
}

fn is_currency_code(raw: &str) -> bool {
    raw.len() == 3 && raw.chars().all(|c| c.is_ascii_uppercase())
}
