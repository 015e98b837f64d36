// ── Device catalog ──
//
// Static knowledge about fireplaces: which product keys map to which
// model, and how each attribute behaves when written.

use crate::model::DeviceModel;

/// Attribute keys understood by the fireplace firmware.
pub mod keys {
    pub const POWER: &str = "POWERSW";
    pub const RGB_LEDS: &str = "COLOR_SW";
    pub const AMBER_LEDS: &str = "LED_SW";
    pub const FLAME: &str = "FLAME";
    pub const SPEED: &str = "SPEED";
    pub const EFFECT_SMOOTH: &str = "KEY_SMOOTH";
    pub const EFFECT_FADE1: &str = "KEY_FADE1";
    pub const EFFECT_FADE2: &str = "KEY_FADE2";
}

/// Known product keys. Anything else is an [`DeviceModel::Advance`].
pub const PRODUCT_MODELS: &[(&str, DeviceModel)] =
    &[("e2313fe07bca48fb82861d5f961993c5", DeviceModel::Prestige)];

/// Resolve a vendor product key to a model.
pub fn classify_model(product_key: Option<&str>) -> DeviceModel {
    product_key
        .and_then(|key| {
            PRODUCT_MODELS
                .iter()
                .find(|(known, _)| *known == key)
                .map(|(_, model)| *model)
        })
        .unwrap_or(DeviceModel::Advance)
}

// ── Attribute classification ─────────────────────────────────────────

/// Inclusive integer range with a step, as declared by the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelRange {
    pub min: i64,
    pub max: i64,
    pub step: i64,
}

impl LevelRange {
    pub const FLAME: Self = Self {
        min: 0,
        max: 5,
        step: 1,
    };

    /// Clamp into range and snap down onto the step grid.
    pub fn clamp(self, value: i64) -> i64 {
        let clamped = value.clamp(self.min, self.max);
        if self.step <= 1 {
            return clamped;
        }
        self.min + (clamped - self.min) / self.step * self.step
    }
}

/// How the cloud interprets a write to an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeKind {
    /// Pulse signal: writing `0` flips the state, whatever the intent.
    /// Power and both LED banks. Allowed while the fireplace is off.
    Toggle,
    /// Pulse signal that fires a light effect. Also always `0`, but only
    /// accepted while the fireplace is on.
    Trigger,
    /// Numeric setting clamped to its range.
    Level(LevelRange),
    /// Persistent boolean written as `1`/`0` (palette colour keys and
    /// anything unknown).
    Switch,
}

impl AttributeKind {
    /// Whether a write is refused while the fireplace is powered off.
    pub fn requires_power(self) -> bool {
        !matches!(self, Self::Toggle)
    }

    pub fn is_pulse(self) -> bool {
        matches!(self, Self::Toggle | Self::Trigger)
    }
}

pub fn attribute_kind(key: &str) -> AttributeKind {
    match key {
        keys::POWER | keys::RGB_LEDS | keys::AMBER_LEDS => AttributeKind::Toggle,
        keys::EFFECT_SMOOTH | keys::EFFECT_FADE1 | keys::EFFECT_FADE2 => AttributeKind::Trigger,
        keys::FLAME | keys::SPEED => AttributeKind::Level(LevelRange::FLAME),
        _ => AttributeKind::Switch,
    }
}

// ── Controls offered to presentation layers ──────────────────────────

/// An on/off control backed by a toggle attribute.
#[derive(Debug, Clone, Copy)]
pub struct SwitchControl {
    pub key: &'static str,
    pub label: &'static str,
}

/// A numeric control backed by a level attribute.
#[derive(Debug, Clone, Copy)]
pub struct LevelControl {
    pub key: &'static str,
    pub label: &'static str,
    pub range: LevelRange,
}

pub const SWITCHES: &[SwitchControl] = &[
    SwitchControl {
        key: keys::POWER,
        label: "Power",
    },
    SwitchControl {
        key: keys::RGB_LEDS,
        label: "RGB LEDs",
    },
    SwitchControl {
        key: keys::AMBER_LEDS,
        label: "Amber LEDs",
    },
];

pub const LEVELS: &[LevelControl] = &[
    LevelControl {
        key: keys::FLAME,
        label: "Flame Height",
        range: LevelRange::FLAME,
    },
    LevelControl {
        key: keys::SPEED,
        label: "Flame Speed",
        range: LevelRange::FLAME,
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_product_key_maps_to_prestige() {
        for (key, model) in PRODUCT_MODELS {
            assert_eq!(classify_model(Some(key)), *model);
        }
    }

    #[test]
    fn unknown_or_missing_product_key_is_advance() {
        assert_eq!(classify_model(None), DeviceModel::Advance);
        assert_eq!(classify_model(Some("")), DeviceModel::Advance);
        assert_eq!(
            classify_model(Some("00000000000000000000000000000000")),
            DeviceModel::Advance
        );
    }

    #[test]
    fn toggles_are_exempt_from_power_guard() {
        for key in [keys::POWER, keys::RGB_LEDS, keys::AMBER_LEDS] {
            let kind = attribute_kind(key);
            assert_eq!(kind, AttributeKind::Toggle);
            assert!(!kind.requires_power());
            assert!(kind.is_pulse());
        }
    }

    #[test]
    fn effects_are_guarded_pulses() {
        let kind = attribute_kind(keys::EFFECT_FADE1);
        assert_eq!(kind, AttributeKind::Trigger);
        assert!(kind.requires_power());
        assert!(kind.is_pulse());
    }

    #[test]
    fn levels_and_colour_keys_are_guarded() {
        assert_eq!(
            attribute_kind(keys::FLAME),
            AttributeKind::Level(LevelRange::FLAME)
        );
        assert!(attribute_kind(keys::SPEED).requires_power());
        assert_eq!(attribute_kind("RED_KEY1"), AttributeKind::Switch);
        assert!(attribute_kind("RED_KEY1").requires_power());
    }

    #[test]
    fn level_range_clamps_and_snaps() {
        let range = LevelRange::FLAME;
        assert_eq!(range.clamp(-3), 0);
        assert_eq!(range.clamp(3), 3);
        assert_eq!(range.clamp(42), 5);

        let coarse = LevelRange {
            min: 0,
            max: 10,
            step: 4,
        };
        assert_eq!(coarse.clamp(7), 4);
        assert_eq!(coarse.clamp(10), 8);
    }
}
