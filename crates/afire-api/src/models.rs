// Wire types for the vendor cloud API.
//
// Only the fields the client consumes are modelled; everything else in
// the JSON is ignored.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Device attribute snapshot: attribute key to integer value.
///
/// Boolean attributes are reported by the cloud as JSON booleans and
/// normalized to `0`/`1`.
pub type Attributes = BTreeMap<String, i64>;

/// `POST /login` response.
#[derive(Debug, Deserialize)]
pub(crate) struct LoginResponse {
    pub token: Option<String>,
    pub uid: Option<String>,
    /// Unix timestamp (seconds).
    pub expire_at: Option<i64>,
}

/// A device bound to the account, as returned by `GET /bindings`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct DeviceBinding {
    pub did: String,
    #[serde(default)]
    pub product_name: Option<String>,
    #[serde(default)]
    pub mac: Option<String>,
    #[serde(default)]
    pub product_key: Option<String>,
    /// User-assigned alias from the vendor app.
    #[serde(default)]
    pub dev_alias: Option<String>,
}

/// `GET /bindings` response.
#[derive(Debug, Deserialize)]
pub(crate) struct BindingsResponse {
    #[serde(default)]
    pub devices: Vec<DeviceBinding>,
}

/// `GET /devdata/{did}/latest` response.
#[derive(Debug, Deserialize)]
pub(crate) struct LatestResponse {
    #[serde(default)]
    pub attr: Option<serde_json::Map<String, Value>>,
}

/// `POST /control/{did}` request body.
#[derive(Debug, Serialize)]
pub(crate) struct ControlRequest<'a> {
    pub attrs: &'a Attributes,
}

/// Normalize a raw attribute value to an integer.
///
/// Integers pass through, booleans become `0`/`1`, and floats with an
/// integral value are converted. Anything else yields `None`.
#[allow(clippy::cast_possible_truncation, clippy::as_conversions)]
pub(crate) fn attribute_value(value: &Value) -> Option<i64> {
    match value {
        Value::Bool(b) => Some(i64::from(*b)),
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && f.abs() < 9.0e15)
                .map(|f| f as i64)
        }),
        _ => None,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn binding_tolerates_missing_optional_fields() {
        let binding: DeviceBinding = serde_json::from_value(json!({ "did": "abc" })).unwrap();
        assert_eq!(binding.did, "abc");
        assert!(binding.product_key.is_none());
        assert!(binding.mac.is_none());
    }

    #[test]
    fn attribute_values_are_normalized() {
        assert_eq!(attribute_value(&json!(3)), Some(3));
        assert_eq!(attribute_value(&json!(true)), Some(1));
        assert_eq!(attribute_value(&json!(false)), Some(0));
        assert_eq!(attribute_value(&json!(2.0)), Some(2));
        assert_eq!(attribute_value(&json!(2.5)), None);
        assert_eq!(attribute_value(&json!("on")), None);
        assert_eq!(attribute_value(&json!(null)), None);
    }
}
