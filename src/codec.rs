//! JSON encoding and decoding of request and response bodies.
//!
//! Encoded bodies never contain `null`: absent optional fields are dropped at
//! every nesting level. Decoding ignores unknown fields and reports malformed
//! payloads as [`Error::DeserializationFailed`] with the raw body attached.

use crate::{Error, Result};
use http::StatusCode;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

/// Serializes `value` to a JSON body, dropping null object fields.
///
/// # Examples
///
/// ```
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Params {
///     name: Option<String>,
///     zip: Option<String>,
/// }
///
/// let body = shippo::codec::encode(&Params { name: Some("Mr Hippo".into()), zip: None }).unwrap();
/// assert_eq!(body, r#"{"name":"Mr Hippo"}"#);
/// ```
pub fn encode<T>(value: &T) -> Result<String>
where
    T: Serialize + ?Sized,
{
    let mut json =
        serde_json::to_value(value).map_err(|e| Error::SerializationFailed(e.to_string()))?;
    strip_nulls(&mut json);
    serde_json::to_string(&json).map_err(|e| Error::SerializationFailed(e.to_string()))
}

/// Deserializes a response body into `T`.
///
/// `status` is only used to annotate the error.
pub fn decode<T>(status: StatusCode, raw_body: &str) -> Result<T>
where
    T: DeserializeOwned,
{
    serde_json::from_str::<T>(raw_body).map_err(|e| {
        tracing::error!(
            error = %e,
            raw_response = %raw_body,
            "Failed to deserialize response"
        );

        Error::DeserializationFailed {
            raw_response: raw_body.to_string(),
            serde_error: e.to_string(),
            status,
        }
    })
}

/// Flattens a parameter struct into query pairs.
///
/// Only scalar fields are allowed; unset fields are skipped.
pub fn query_pairs<T>(params: &T) -> Result<Vec<(String, String)>>
where
    T: Serialize,
{
    let json =
        serde_json::to_value(params).map_err(|e| Error::SerializationFailed(e.to_string()))?;

    let Value::Object(fields) = json else {
        return Err(Error::SerializationFailed(
            "query parameters must serialize to an object".to_string(),
        ));
    };

    let mut pairs = Vec::with_capacity(fields.len());
    for (key, value) in fields {
        let value = match value {
            Value::Null => continue,
            Value::String(s) => s,
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => n.to_string(),
            Value::Array(_) | Value::Object(_) => {
                return Err(Error::SerializationFailed(format!(
                    "query parameter `{}` is not a scalar",
                    key
                )))
            }
        };
        pairs.push((key, value));
    }
    Ok(pairs)
}

fn strip_nulls(value: &mut Value) {
    match value {
        Value::Object(map) => {
            map.retain(|_, v| !v.is_null());
            map.values_mut().for_each(strip_nulls);
        }
        Value::Array(items) => items.iter_mut().for_each(strip_nulls),
        _ => {}
    }
}
