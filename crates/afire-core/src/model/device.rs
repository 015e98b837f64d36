// ── Device descriptor ──

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use afire_api::{Attributes, DeviceBinding};

use crate::catalog::classify_model;

const DEFAULT_NAME: &str = "AFIRE Fireplace";
const UNKNOWN_MAC: &str = "unknown";

/// Fireplace product line.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum DeviceModel {
    Prestige,
    Advance,
}

/// One fireplace and its last reported attribute state.
///
/// Rebuilt from scratch on every refresh; `attributes` is a full
/// replacement of what the cloud reported, never a patch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceDescriptor {
    pub id: String,
    pub display_name: String,
    pub alias: Option<String>,
    pub mac_address: String,
    pub product_key: Option<String>,
    pub model: DeviceModel,
    pub attributes: Attributes,
}

impl DeviceDescriptor {
    /// Combine a binding with its attributes, classifying the model once.
    pub fn from_binding(binding: DeviceBinding, attributes: Attributes) -> Self {
        let model = classify_model(binding.product_key.as_deref());
        Self {
            id: binding.did,
            display_name: binding
                .product_name
                .unwrap_or_else(|| DEFAULT_NAME.into()),
            alias: binding.dev_alias.filter(|a| !a.trim().is_empty()),
            mac_address: binding.mac.unwrap_or_else(|| UNKNOWN_MAC.into()),
            product_key: binding.product_key,
            model,
            attributes,
        }
    }

    pub fn attribute(&self, key: &str) -> Option<i64> {
        self.attributes.get(key).copied()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn binding(product_key: Option<&str>) -> DeviceBinding {
        DeviceBinding {
            did: "dev1".into(),
            product_name: None,
            mac: None,
            product_key: product_key.map(Into::into),
            dev_alias: Some("   ".into()),
        }
    }

    #[test]
    fn defaults_fill_missing_binding_fields() {
        let device = DeviceDescriptor::from_binding(binding(None), Attributes::new());
        assert_eq!(device.display_name, "AFIRE Fireplace");
        assert_eq!(device.mac_address, "unknown");
        assert_eq!(device.model, DeviceModel::Advance);
        assert!(device.alias.is_none(), "blank alias is dropped");
    }

    #[test]
    fn model_is_classified_from_product_key() {
        let device = DeviceDescriptor::from_binding(
            binding(Some("e2313fe07bca48fb82861d5f961993c5")),
            Attributes::new(),
        );
        assert_eq!(device.model, DeviceModel::Prestige);
    }

    #[test]
    fn model_names_round_trip_through_strings() {
        assert_eq!(DeviceModel::Prestige.to_string(), "PRESTIGE");
        assert_eq!(DeviceModel::from_str("ADVANCE").unwrap(), DeviceModel::Advance);
    }
}
