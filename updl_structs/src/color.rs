use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{FieldPath, first_defined, to_number};

/// Linear 0..1 color channels as the runtime material API expects them.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct Rgb {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Rgb {
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0);
    pub const BLACK: Self = Self::new(0.0, 0.0, 0.0);

    pub const fn new(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b }
    }

    pub fn from_bytes(r: u8, g: u8, b: u8) -> Self {
        Self::new(r as f64 / 255.0, g as f64 / 255.0, b as f64 / 255.0)
    }

    fn clamped(self) -> Self {
        Self::new(
            self.r.clamp(0.0, 1.0),
            self.g.clamp(0.0, 1.0),
            self.b.clamp(0.0, 1.0),
        )
    }

    /// Every channel multiplied by `factor`, kept inside 0..1.
    pub fn scaled(self, factor: f64) -> Self {
        Self::new(self.r * factor, self.g * factor, self.b * factor).clamped()
    }
}

impl Default for Rgb {
    fn default() -> Self {
        Self::WHITE
    }
}

/// Where a render-style bag keeps its color: explicit `color`, then the property bag's `color`,
/// then the property bag's `material.color`. Both `properties` and `props` name the bag and
/// either may sit under `inputs`.
pub const COLOR_SOURCE_PATHS: &[FieldPath] = &[
    &["color"],
    &["inputs", "color"],
    &["properties", "color"],
    &["props", "color"],
    &["inputs", "properties", "color"],
    &["inputs", "props", "color"],
    &["properties", "material", "color"],
    &["props", "material", "color"],
    &["inputs", "properties", "material", "color"],
    &["inputs", "props", "material", "color"],
];

static HEX_SHORT_OR_FULL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#([0-9a-fA-F]{3}|[0-9a-fA-F]{6})$").unwrap());
static HEX_WITH_ALPHA: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#([0-9a-fA-F]{8})$").unwrap());
static RGB_FUNCTIONAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^rgba?\(\s*(-?\d+(?:\.\d+)?)\s*,\s*(-?\d+(?:\.\d+)?)\s*,\s*(-?\d+(?:\.\d+)?)\s*(?:,\s*-?\d*(?:\.\d+)?\s*)?\)$",
    )
    .unwrap()
});

/// The raw color value a render-style bag carries, before normalization.
pub fn color_source(bag: &Value) -> Option<&Value> {
    first_defined(bag, COLOR_SOURCE_PATHS)
}

/// Picks the color source of `bag` and normalizes it; white when nothing usable is found.
pub fn resolve_color(bag: &Value) -> Rgb {
    normalize_color(color_source(bag))
}

/// Cases are tried in a fixed order and the first successful parse wins:
/// `#rgb`/`#rrggbb`, then `#rrggbbaa` or `rgb()`/`rgba()`, then an `{r,g,b}` object, then white.
pub fn normalize_color(raw: Option<&Value>) -> Rgb {
    let Some(raw) = raw else {
        return Rgb::WHITE;
    };
    if let Value::String(s) = raw {
        let s = s.trim();
        if let Some(rgb) = parse_hex_short_or_full(s) {
            return rgb;
        }
        if let Some(rgb) = parse_hex_with_alpha(s).or_else(|| parse_rgb_functional(s)) {
            return rgb;
        }
        return Rgb::WHITE;
    }
    parse_rgb_object(raw).unwrap_or(Rgb::WHITE)
}

fn parse_hex_short_or_full(s: &str) -> Option<Rgb> {
    let caps = HEX_SHORT_OR_FULL.captures(s)?;
    let digits = caps.get(1)?.as_str();
    if digits.len() == 3 {
        let mut channels = [0u8; 3];
        for (slot, c) in channels.iter_mut().zip(digits.chars()) {
            let v = c.to_digit(16)? as u8;
            *slot = v * 16 + v;
        }
        return Some(Rgb::from_bytes(channels[0], channels[1], channels[2]));
    }
    hex_pairs(digits)
}

fn parse_hex_with_alpha(s: &str) -> Option<Rgb> {
    let caps = HEX_WITH_ALPHA.captures(s)?;
    // alpha pair is dropped
    hex_pairs(&caps.get(1)?.as_str()[..6])
}

fn hex_pairs(digits: &str) -> Option<Rgb> {
    let r = u8::from_str_radix(&digits[0..2], 16).ok()?;
    let g = u8::from_str_radix(&digits[2..4], 16).ok()?;
    let b = u8::from_str_radix(&digits[4..6], 16).ok()?;
    Some(Rgb::from_bytes(r, g, b))
}

fn parse_rgb_functional(s: &str) -> Option<Rgb> {
    let lowered = s.to_ascii_lowercase();
    let caps = RGB_FUNCTIONAL.captures(&lowered)?;
    let channel = |i: usize| -> Option<f64> {
        let v: f64 = caps.get(i)?.as_str().parse().ok()?;
        Some(v.clamp(0.0, 255.0) / 255.0)
    };
    Some(Rgb::new(channel(1)?, channel(2)?, channel(3)?))
}

/// `{r,g,b}` with ambiguous scale: if any channel exceeds 1 the whole triple is read as 0..255.
fn parse_rgb_object(raw: &Value) -> Option<Rgb> {
    let map = raw.as_object()?;
    let r = map.get("r").and_then(to_number)?;
    let g = map.get("g").and_then(to_number)?;
    let b = map.get("b").and_then(to_number)?;
    let rgb = if r > 1.0 || g > 1.0 || b > 1.0 {
        Rgb::new(r / 255.0, g / 255.0, b / 255.0)
    } else {
        Rgb::new(r, g, b)
    };
    Some(rgb.clamped())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn close(a: Rgb, b: Rgb) -> bool {
        (a.r - b.r).abs() < 1e-6 && (a.g - b.g).abs() < 1e-6 && (a.b - b.b).abs() < 1e-6
    }

    fn in_unit_range(c: Rgb) -> bool {
        [c.r, c.g, c.b].iter().all(|v| (0.0..=1.0).contains(v))
    }

    #[test]
    fn every_supported_form_lands_in_unit_range() {
        let inputs = [
            json!("#abc"),
            json!("#aabbcc"),
            json!("#aabbccdd"),
            json!("rgb(10,20,30)"),
            json!("rgba(10,20,30,0.5)"),
            json!({ "r": 1, "g": 0.5, "b": 0 }),
            json!({ "r": 255, "g": 128, "b": 0 }),
        ];
        for raw in &inputs {
            let c = normalize_color(Some(raw));
            assert!(in_unit_range(c), "{raw} -> {c:?}");
            assert_ne!(c, Rgb::WHITE, "{raw} fell back to white");
        }
        assert_eq!(normalize_color(None), Rgb::WHITE);
        assert_eq!(normalize_color(Some(&Value::Null)), Rgb::WHITE);
    }

    #[test]
    fn short_hex_expands() {
        let c = normalize_color(Some(&json!("#abc")));
        assert!(close(c, Rgb::from_bytes(0xaa, 0xbb, 0xcc)));
        assert_eq!(c, normalize_color(Some(&json!("#aabbcc"))));
    }

    #[test]
    fn eight_digit_hex_drops_alpha() {
        let c = normalize_color(Some(&json!("#ff000080")));
        assert_eq!(c, Rgb::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn functional_forms_clamp_and_drop_alpha() {
        let c = normalize_color(Some(&json!("rgba(300, 0, 51, 0.5)")));
        assert!(close(c, Rgb::new(1.0, 0.0, 0.2)));
        let c = normalize_color(Some(&json!("RGB( 10 , 20 , 30 )")));
        assert!(close(c, Rgb::from_bytes(10, 20, 30)));
    }

    #[test]
    fn object_scale_is_detected() {
        let unit = normalize_color(Some(&json!({ "r": 1, "g": 0.5, "b": 0 })));
        assert_eq!(unit, Rgb::new(1.0, 0.5, 0.0));
        let bytes = normalize_color(Some(&json!({ "r": 255, "g": 128, "b": 0 })));
        assert!(close(bytes, Rgb::new(1.0, 128.0 / 255.0, 0.0)));
        let negative = normalize_color(Some(&json!({ "r": -1, "g": 0.5, "b": 0.25 })));
        assert_eq!(negative, Rgb::new(0.0, 0.5, 0.25));
    }

    #[test]
    fn unrecognized_values_are_white() {
        for raw in [
            json!("red"),
            json!("#abcd"),
            json!("#aabbccd"),
            json!("rgb(1,2)"),
            json!({ "r": 1, "g": 1 }),
            json!(42),
        ] {
            assert_eq!(normalize_color(Some(&raw)), Rgb::WHITE, "{raw}");
        }
    }

    #[test]
    fn source_priority() {
        let bag = json!({
            "color": "#00ff00",
            "properties": { "color": "#ff0000", "material": { "color": "#0000ff" } }
        });
        assert_eq!(resolve_color(&bag), Rgb::new(0.0, 1.0, 0.0));

        let bag = json!({ "props": { "color": "#ff0000", "material": { "color": "#0000ff" } } });
        assert_eq!(resolve_color(&bag), Rgb::new(1.0, 0.0, 0.0));

        let bag = json!({ "properties": { "material": { "color": "#0000ff" } } });
        assert_eq!(resolve_color(&bag), Rgb::new(0.0, 0.0, 1.0));

        assert_eq!(resolve_color(&json!({})), Rgb::WHITE);
    }

    #[test]
    fn source_is_forwarded_raw() {
        let bag = json!({ "inputs": { "color": "rgb(1,2,3)" } });
        assert_eq!(color_source(&bag), Some(&json!("rgb(1,2,3)")));
    }
}
