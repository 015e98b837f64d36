// ── Device view ──
//
// Read-only presentation helpers over one snapshot entry. Every
// consumer (CLI table, JSON output, automation adapters) goes through
// this instead of re-deriving names and on/off state from raw attrs.

use serde::Serialize;

use crate::catalog::{self, LevelControl, SwitchControl, keys};

use super::device::{DeviceDescriptor, DeviceModel};

const MANUFACTURER: &str = "AFIRE";

/// Identity block shown alongside every control of a device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceInfo {
    pub identifier: String,
    pub name: String,
    pub manufacturer: &'static str,
    pub model: DeviceModel,
}

#[derive(Debug, Clone, Copy)]
pub struct DeviceView<'a> {
    device: &'a DeviceDescriptor,
}

impl<'a> DeviceView<'a> {
    pub fn new(device: &'a DeviceDescriptor) -> Self {
        Self { device }
    }

    pub fn descriptor(&self) -> &'a DeviceDescriptor {
        self.device
    }

    pub fn id(&self) -> &'a str {
        &self.device.id
    }

    /// Alias when set, otherwise the product name. The bare vendor
    /// name `AFIRE` (any case) reads as `Fireplace`.
    pub fn display_name(&self) -> String {
        let name = self
            .device
            .alias
            .as_deref()
            .unwrap_or(&self.device.display_name);
        if name.eq_ignore_ascii_case(MANUFACTURER) {
            return "Fireplace".into();
        }
        name.to_owned()
    }

    pub fn device_info(&self) -> DeviceInfo {
        DeviceInfo {
            identifier: self.device.id.clone(),
            name: self.display_name(),
            manufacturer: MANUFACTURER,
            model: self.device.model,
        }
    }

    pub fn has_attribute(&self, key: &str) -> bool {
        self.device.attributes.contains_key(key)
    }

    /// Non-zero reads as on; a missing attribute reads as off.
    pub fn is_on(&self, key: &str) -> bool {
        self.device.attribute(key).is_some_and(|v| v != 0)
    }

    pub fn is_powered(&self) -> bool {
        self.is_on(keys::POWER)
    }

    pub fn level(&self, key: &str) -> Option<i64> {
        self.device.attribute(key)
    }

    /// Stable per-control identifier: `{did}_{key}`, lowercased.
    pub fn entity_id(&self, key: &str) -> String {
        format!("{}_{}", self.device.id, key).to_lowercase()
    }

    pub fn switches(&self) -> impl Iterator<Item = &'static SwitchControl> + '_ {
        catalog::SWITCHES
            .iter()
            .filter(|control| self.has_attribute(control.key))
    }

    pub fn levels(&self) -> impl Iterator<Item = &'static LevelControl> + '_ {
        catalog::LEVELS
            .iter()
            .filter(|control| self.has_attribute(control.key))
    }

    /// The RGB bank is exposed as a light only when the device reports it.
    pub fn has_rgb_light(&self) -> bool {
        self.has_attribute(keys::RGB_LEDS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use afire_api::Attributes;

    fn device(name: &str, alias: Option<&str>, attrs: &[(&str, i64)]) -> DeviceDescriptor {
        DeviceDescriptor {
            id: "AbC123".into(),
            display_name: name.into(),
            alias: alias.map(Into::into),
            mac_address: "unknown".into(),
            product_key: None,
            model: DeviceModel::Advance,
            attributes: attrs
                .iter()
                .map(|(k, v)| ((*k).to_owned(), *v))
                .collect::<Attributes>(),
        }
    }

    #[test]
    fn display_name_prefers_alias_then_rewrites_vendor_name() {
        let d = device("AFIRE", Some("Lounge"), &[]);
        assert_eq!(DeviceView::new(&d).display_name(), "Lounge");

        let d = device("AFIRE", None, &[]);
        assert_eq!(DeviceView::new(&d).display_name(), "Fireplace");

        let d = device("AFIRE Fireplace", None, &[]);
        assert_eq!(DeviceView::new(&d).display_name(), "AFIRE Fireplace");
    }

    #[test]
    fn vendor_name_rewrite_ignores_case_and_covers_alias() {
        let d = device("afire", None, &[]);
        assert_eq!(DeviceView::new(&d).display_name(), "Fireplace");

        let d = device("Living Room", Some("Afire"), &[]);
        assert_eq!(DeviceView::new(&d).display_name(), "Fireplace");
    }

    #[test]
    fn power_and_levels_read_from_attributes() {
        let d = device("AFIRE", None, &[("POWERSW", 1), ("FLAME", 3), ("LED_SW", 0)]);
        let view = DeviceView::new(&d);
        assert!(view.is_powered());
        assert!(!view.is_on("LED_SW"));
        assert!(!view.is_on("COLOR_SW"));
        assert_eq!(view.level("FLAME"), Some(3));
        assert_eq!(view.level("SPEED"), None);
    }

    #[test]
    fn controls_follow_reported_attributes() {
        let d = device("AFIRE", None, &[("POWERSW", 0), ("COLOR_SW", 0), ("FLAME", 1)]);
        let view = DeviceView::new(&d);
        let switches: Vec<_> = view.switches().map(|c| c.key).collect();
        let levels: Vec<_> = view.levels().map(|c| c.key).collect();
        assert_eq!(switches, ["POWERSW", "COLOR_SW"]);
        assert_eq!(levels, ["FLAME"]);
        assert!(view.has_rgb_light());
    }

    #[test]
    fn entity_ids_are_lowercase() {
        let d = device("AFIRE", None, &[]);
        let view = DeviceView::new(&d);
        assert_eq!(view.entity_id("POWERSW"), "abc123_powersw");
        assert_eq!(view.device_info().manufacturer, "AFIRE");
    }
}
