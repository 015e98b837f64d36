// ── Command API ──
//
// Every write flows through a `CommandPlan`: one primary attribute write
// and at most one companion write, each already classified and carrying
// the exact value that goes on the wire. Pulse attributes always carry 0
// here, so no call site ever decides that on its own.

use afire_api::Attributes;

use crate::catalog::{AttributeKind, attribute_kind, keys};
use crate::error::CoreError;
use crate::palette::{Effect, PALETTE, Rgb, match_color};

/// What the caller asked for, before classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestedValue {
    /// On/off (or "activate") intent.
    Intent(bool),
    /// Numeric level.
    Level(i64),
}

impl From<bool> for RequestedValue {
    fn from(on: bool) -> Self {
        Self::Intent(on)
    }
}

impl From<i64> for RequestedValue {
    fn from(level: i64) -> Self {
        Self::Level(level)
    }
}

/// A single attribute write, classified and ready to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardedCommand {
    pub device_id: String,
    pub attribute: String,
    /// Value actually sent to the cloud.
    pub value: i64,
    pub kind: AttributeKind,
}

impl GuardedCommand {
    pub fn plan(
        device_id: impl Into<String>,
        attribute: impl Into<String>,
        requested: RequestedValue,
    ) -> Result<Self, CoreError> {
        let attribute = attribute.into();
        let kind = attribute_kind(&attribute);
        let value = match (kind, requested) {
            (AttributeKind::Toggle | AttributeKind::Trigger, _) => 0,
            (AttributeKind::Level(range), RequestedValue::Level(level)) => range.clamp(level),
            (AttributeKind::Level(range), RequestedValue::Intent(_)) => {
                return Err(CoreError::InvalidValue {
                    attribute,
                    message: format!("expected a level between {} and {}", range.min, range.max),
                });
            }
            (AttributeKind::Switch, RequestedValue::Intent(on)) => i64::from(on),
            (AttributeKind::Switch, RequestedValue::Level(level @ (0 | 1))) => level,
            (AttributeKind::Switch, RequestedValue::Level(level)) => {
                return Err(CoreError::InvalidValue {
                    attribute,
                    message: format!("expected on/off, got {level}"),
                });
            }
        };
        Ok(Self {
            device_id: device_id.into(),
            attribute,
            value,
            kind,
        })
    }

    pub fn requires_power(&self) -> bool {
        self.kind.requires_power()
    }

    /// Request body for this write.
    pub fn attributes(&self) -> Attributes {
        Attributes::from([(self.attribute.clone(), self.value)])
    }
}

/// Primary write plus an optional second, separate write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandPlan {
    pub primary: GuardedCommand,
    pub companion: Option<GuardedCommand>,
}

impl CommandPlan {
    pub fn single(primary: GuardedCommand) -> Self {
        Self {
            primary,
            companion: None,
        }
    }

    pub fn device_id(&self) -> &str {
        &self.primary.device_id
    }

    /// The first write that the power guard applies to, if any.
    pub fn guarded(&self) -> Option<&GuardedCommand> {
        self.writes().find(|write| write.requires_power())
    }

    pub fn requires_power(&self) -> bool {
        self.guarded().is_some()
    }

    pub fn writes(&self) -> impl Iterator<Item = &GuardedCommand> {
        std::iter::once(&self.primary).chain(self.companion.as_ref())
    }
}

/// High-level fireplace operations offered to consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Power(bool),
    RgbLeds(bool),
    AmberLeds(bool),
    FlameHeight(i64),
    FlameSpeed(i64),
    /// Switch the RGB bank to the palette entry nearest this colour.
    Color(Rgb),
    Effect(Effect),
    /// Pulse the RGB bank without selecting a colour or effect.
    LightOff,
}

impl Command {
    pub fn plan(self, device_id: &str) -> Result<CommandPlan, CoreError> {
        let write = |key: &str, value: RequestedValue| GuardedCommand::plan(device_id, key, value);
        let plan = match self {
            Self::Power(on) => CommandPlan::single(write(keys::POWER, on.into())?),
            Self::RgbLeds(on) => CommandPlan::single(write(keys::RGB_LEDS, on.into())?),
            Self::AmberLeds(on) => CommandPlan::single(write(keys::AMBER_LEDS, on.into())?),
            Self::FlameHeight(level) => CommandPlan::single(write(keys::FLAME, level.into())?),
            Self::FlameSpeed(level) => CommandPlan::single(write(keys::SPEED, level.into())?),
            Self::Color(rgb) => {
                let preset = match_color(rgb, PALETTE).ok_or_else(|| CoreError::InvalidValue {
                    attribute: keys::RGB_LEDS.into(),
                    message: "colour palette is empty".into(),
                })?;
                CommandPlan {
                    primary: write(keys::RGB_LEDS, true.into())?,
                    companion: Some(write(preset.device_key, true.into())?),
                }
            }
            Self::Effect(effect) => CommandPlan {
                primary: write(keys::RGB_LEDS, true.into())?,
                companion: Some(write(effect.device_key(), true.into())?),
            },
            Self::LightOff => CommandPlan::single(write(keys::RGB_LEDS, false.into())?),
        };
        Ok(plan)
    }
}

/// Writes acknowledged by the cloud for one command.
#[derive(Debug, Clone)]
pub struct CommandResult {
    pub device_id: String,
    pub sent: Vec<GuardedCommand>,
    /// Raw acknowledgement payload per write, in send order.
    pub acknowledgements: Vec<serde_json::Value>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sent(plan: &CommandPlan) -> Vec<(&str, i64)> {
        plan.writes()
            .map(|w| (w.attribute.as_str(), w.value))
            .collect()
    }

    #[test]
    fn toggles_always_send_zero() {
        for intent in [true, false] {
            let cmd = GuardedCommand::plan("dev", "COLOR_SW", intent.into()).unwrap();
            assert_eq!(cmd.value, 0);
            assert!(!cmd.requires_power());
        }
        let cmd = GuardedCommand::plan("dev", "POWERSW", RequestedValue::Level(1)).unwrap();
        assert_eq!(cmd.value, 0);
    }

    #[test]
    fn levels_are_clamped_and_guarded() {
        let cmd = GuardedCommand::plan("dev", "FLAME", 9_i64.into()).unwrap();
        assert_eq!(cmd.value, 5);
        assert!(cmd.requires_power());
        assert_eq!(GuardedCommand::plan("dev", "SPEED", RequestedValue::Level(-1)).unwrap().value, 0);
    }

    #[test]
    fn level_rejects_boolean_intent() {
        let err = GuardedCommand::plan("dev", "FLAME", true.into()).unwrap_err();
        assert!(matches!(err, CoreError::InvalidValue { .. }));
    }

    #[test]
    fn switches_send_intent_as_integer() {
        assert_eq!(GuardedCommand::plan("dev", "RED_KEY1", true.into()).unwrap().value, 1);
        assert_eq!(GuardedCommand::plan("dev", "RED_KEY1", false.into()).unwrap().value, 0);
        assert!(GuardedCommand::plan("dev", "RED_KEY1", 7_i64.into()).is_err());
    }

    #[test]
    fn colour_pulses_bank_then_selects_nearest_preset() {
        let plan = Command::Color(Rgb(198, 50, 38)).plan("dev").unwrap();
        assert_eq!(sent(&plan), [("COLOR_SW", 0), ("RED_KEY1", 1)]);
        assert!(plan.requires_power());
        assert_eq!(plan.guarded().unwrap().attribute, "RED_KEY1");
    }

    #[test]
    fn effect_pulses_bank_then_triggers_effect() {
        let plan = Command::Effect(Effect::Fade2).plan("dev").unwrap();
        assert_eq!(sent(&plan), [("COLOR_SW", 0), ("KEY_FADE2", 0)]);
        assert!(plan.requires_power());
    }

    #[test]
    fn power_and_light_off_are_unguarded_single_writes() {
        let plan = Command::Power(false).plan("dev").unwrap();
        assert_eq!(sent(&plan), [("POWERSW", 0)]);
        assert!(!plan.requires_power());

        let plan = Command::LightOff.plan("dev").unwrap();
        assert_eq!(sent(&plan), [("COLOR_SW", 0)]);
        assert!(!plan.requires_power());
    }

    #[test]
    fn request_body_holds_the_single_attribute() {
        let cmd = GuardedCommand::plan("dev", "FLAME", 3_i64.into()).unwrap();
        assert_eq!(cmd.attributes(), Attributes::from([("FLAME".to_owned(), 3)]));
    }
}
