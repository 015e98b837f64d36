// ── Colour palette and effects ──
//
// The RGB bank can only show fifteen preset colours. Arbitrary colours
// are mapped to the nearest preset by squared Euclidean distance.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use crate::catalog::keys;

/// An RGB triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub fn distance_squared(self, other: Self) -> u32 {
        let d = |a: u8, b: u8| {
            let diff = u32::from(a.abs_diff(b));
            diff * diff
        };
        d(self.0, other.0) + d(self.1, other.1) + d(self.2, other.2)
    }
}

impl From<(u8, u8, u8)> for Rgb {
    fn from((r, g, b): (u8, u8, u8)) -> Self {
        Self(r, g, b)
    }
}

/// A named palette entry and the attribute that selects it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorPreset {
    pub label: &'static str,
    pub device_key: &'static str,
    pub rgb: Rgb,
}

const fn preset(label: &'static str, device_key: &'static str, r: u8, g: u8, b: u8) -> ColorPreset {
    ColorPreset {
        label,
        device_key,
        rgb: Rgb(r, g, b),
    }
}

/// Device palette in definition order. Order breaks distance ties.
pub const PALETTE: &[ColorPreset] = &[
    preset("Red 1", "RED_KEY1", 198, 50, 38),
    preset("Red 2", "RED_KEY2", 232, 61, 42),
    preset("Red 3", "RED_KEY3", 232, 89, 21),
    preset("Red 4", "RED_KEY4", 232, 154, 41),
    preset("Red 5", "RED_KEY5", 249, 234, 37),
    preset("Green 1", "GREEN_KEY1", 99, 152, 74),
    preset("Green 2", "GREEN_KEY2", 168, 201, 65),
    preset("Green 3", "GREEN_KEY3", 144, 182, 164),
    preset("Green 4", "GREEN_KEY4", 125, 174, 190),
    preset("Green 5", "GREEN_KEY5", 90, 159, 218),
    preset("Blue 1", "BLUE_KEY1", 88, 85, 132),
    preset("Blue 2", "BLUE_KEY2", 108, 110, 173),
    preset("Blue 3", "BLUE_KEY3", 117, 78, 107),
    preset("Blue 4", "BLUE_KEY4", 168, 99, 122),
    preset("Blue 5", "BLUE_KEY5", 196, 103, 144),
];

/// Nearest palette entry to `rgb`; the first entry wins on ties.
/// Returns `None` only for an empty palette.
pub fn match_color(rgb: Rgb, palette: &[ColorPreset]) -> Option<&ColorPreset> {
    let mut best: Option<(&ColorPreset, u32)> = None;
    for entry in palette {
        let distance = rgb.distance_squared(entry.rgb);
        if best.is_none_or(|(_, d)| distance < d) {
            best = Some((entry, distance));
        }
    }
    best.map(|(entry, _)| entry)
}

/// Light effects offered by the RGB bank.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, Serialize, Deserialize,
)]
#[strum(ascii_case_insensitive)]
pub enum Effect {
    #[strum(to_string = "Smooth", serialize = "smooth")]
    Smooth,
    #[strum(to_string = "Fade 1", serialize = "fade1")]
    Fade1,
    #[strum(to_string = "Fade 2", serialize = "fade2")]
    Fade2,
}

impl Effect {
    pub fn device_key(self) -> &'static str {
        match self {
            Self::Smooth => keys::EFFECT_SMOOTH,
            Self::Fade1 => keys::EFFECT_FADE1,
            Self::Fade2 => keys::EFFECT_FADE2,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn exact_palette_colour_matches_itself() {
        let hit = match_color(Rgb(198, 50, 38), PALETTE).unwrap();
        assert_eq!(hit.label, "Red 1");
        assert_eq!(hit.device_key, "RED_KEY1");
        assert_eq!(hit.rgb.distance_squared(Rgb(198, 50, 38)), 0);
    }

    #[test]
    fn every_entry_is_its_own_nearest_match() {
        for entry in PALETTE {
            assert_eq!(match_color(entry.rgb, PALETTE).unwrap(), entry);
        }
    }

    #[test]
    fn nearest_entry_wins() {
        assert_eq!(match_color(Rgb(0, 0, 255), PALETTE).unwrap().label, "Blue 1");
        assert_eq!(match_color(Rgb(255, 255, 0), PALETTE).unwrap().label, "Red 5");
    }

    #[test]
    fn ties_resolve_to_first_in_definition_order() {
        let palette = [
            preset("Low", "LOW", 0, 0, 0),
            preset("High", "HIGH", 20, 0, 0),
        ];
        let hit = match_color(Rgb(10, 0, 0), &palette).unwrap();
        assert_eq!(hit.label, "Low");

        let reversed = [palette[1], palette[0]];
        assert_eq!(match_color(Rgb(10, 0, 0), &reversed).unwrap().label, "High");
    }

    #[test]
    fn empty_palette_has_no_match() {
        assert!(match_color(Rgb(1, 2, 3), &[]).is_none());
    }

    #[test]
    fn distance_does_not_overflow_at_extremes() {
        assert_eq!(Rgb(0, 0, 0).distance_squared(Rgb(255, 255, 255)), 3 * 255 * 255);
    }

    #[test]
    fn effects_parse_and_map_to_keys() {
        assert_eq!(Effect::from_str("fade1").unwrap(), Effect::Fade1);
        assert_eq!(Effect::from_str("SMOOTH").unwrap(), Effect::Smooth);
        assert_eq!(Effect::Fade2.to_string(), "Fade 2");
        let keys: Vec<_> = Effect::iter().map(Effect::device_key).collect();
        assert_eq!(keys, ["KEY_SMOOTH", "KEY_FADE1", "KEY_FADE2"]);
    }
}
