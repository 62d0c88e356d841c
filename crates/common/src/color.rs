use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Errors from color parsing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ColorError {
    #[error("unknown color name: {0}")]
    UnknownName(String),
    #[error("invalid hex color: {0}")]
    InvalidHex(String),
}

/// An 8-bit sRGB color. Parses from CSS color names or `#rrggbb`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// CSS names the scene uses, plus a few common ones for the panel.
const NAMED: &[(&str, Color)] = &[
    ("black", Color::rgb(0, 0, 0)),
    ("white", Color::WHITE),
    ("red", Color::RED),
    ("green", Color::GREEN),
    ("lime", Color::rgb(0, 255, 0)),
    ("blue", Color::BLUE),
    ("lightblue", Color::LIGHTBLUE),
    ("hotpink", Color::HOTPINK),
    ("pink", Color::rgb(255, 192, 203)),
    ("orange", Color::ORANGE),
    ("yellow", Color::rgb(255, 255, 0)),
    ("cyan", Color::rgb(0, 255, 255)),
    ("magenta", Color::rgb(255, 0, 255)),
    ("purple", Color::rgb(128, 0, 128)),
    ("gray", Color::rgb(128, 128, 128)),
];

impl Color {
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const RED: Color = Color::rgb(255, 0, 0);
    pub const GREEN: Color = Color::rgb(0, 128, 0);
    pub const BLUE: Color = Color::rgb(0, 0, 255);
    pub const HOTPINK: Color = Color::rgb(255, 105, 180);
    pub const ORANGE: Color = Color::rgb(255, 165, 0);
    /// Highlight used by hover-reactive materials.
    pub const LIGHTBLUE: Color = Color::rgb(173, 216, 230);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Look up a CSS color name (case-insensitive).
    pub fn named(name: &str) -> Option<Color> {
        let name = name.to_ascii_lowercase();
        NAMED.iter().find(|(n, _)| *n == name).map(|(_, c)| *c)
    }

    /// The CSS name of this color, if it has one in the table.
    pub fn name(&self) -> Option<&'static str> {
        NAMED.iter().find(|(_, c)| c == self).map(|(n, _)| *n)
    }

    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Channels as `0.0..=1.0` sRGB floats.
    pub fn to_srgb_f32(&self) -> [f32; 3] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
        ]
    }

    pub fn from_srgb_f32(rgb: [f32; 3]) -> Self {
        let q = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        Self::rgb(q(rgb[0]), q(rgb[1]), q(rgb[2]))
    }

    /// Linear-light RGBA for shading into an sRGB surface.
    pub fn to_linear_rgba(&self) -> [f32; 4] {
        let lin = |c: f32| {
            if c <= 0.04045 {
                c / 12.92
            } else {
                ((c + 0.055) / 1.055).powf(2.4)
            }
        };
        let [r, g, b] = self.to_srgb_f32();
        [lin(r), lin(g), lin(b), 1.0]
    }
}

impl FromStr for Color {
    type Err = ColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(hex) = s.strip_prefix('#') {
            if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
                return Err(ColorError::InvalidHex(s.to_string()));
            }
            let channel = |i: usize| {
                u8::from_str_radix(&hex[i..i + 2], 16)
                    .map_err(|_| ColorError::InvalidHex(s.to_string()))
            };
            return Ok(Color::rgb(channel(0)?, channel(2)?, channel(4)?));
        }
        Color::named(s).ok_or_else(|| ColorError::UnknownName(s.to_string()))
    }
}

impl TryFrom<String> for Color {
    type Error = ColorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(c: Color) -> Self {
        c.to_string()
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => f.write_str(&self.to_hex()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_scene_names() {
        for name in ["green", "hotpink", "orange", "red", "blue", "lightblue", "white"] {
            let c: Color = name.parse().unwrap();
            assert_eq!(c.to_string(), name);
        }
    }

    #[test]
    fn constants_match_css_names() {
        let pairs = [
            (Color::WHITE, "white"),
            (Color::RED, "red"),
            (Color::GREEN, "green"),
            (Color::BLUE, "blue"),
            (Color::LIGHTBLUE, "lightblue"),
            (Color::HOTPINK, "hotpink"),
            (Color::ORANGE, "orange"),
        ];
        for (color, name) in pairs {
            assert_eq!(Color::named(name), Some(color));
            assert_eq!(color.name(), Some(name));
        }
    }

    #[test]
    fn names_are_case_insensitive() {
        assert_eq!("HotPink".parse::<Color>().unwrap(), Color::rgb(255, 105, 180));
    }

    #[test]
    fn parses_hex() {
        let c: Color = "#1a2B3c".parse().unwrap();
        assert_eq!(c, Color::rgb(0x1a, 0x2b, 0x3c));
        assert_eq!(c.to_string(), "#1a2b3c");
    }

    #[test]
    fn hex_of_named_color_displays_name() {
        let c: Color = "#ffffff".parse().unwrap();
        assert_eq!(c.to_string(), "white");
    }

    #[test]
    fn rejects_garbage() {
        assert!(matches!(
            "chartreuse-ish".parse::<Color>(),
            Err(ColorError::UnknownName(_))
        ));
        assert!(matches!("#12345".parse::<Color>(), Err(ColorError::InvalidHex(_))));
        assert!(matches!("#zzzzzz".parse::<Color>(), Err(ColorError::InvalidHex(_))));
    }

    #[test]
    fn linear_conversion_endpoints() {
        assert_eq!(Color::rgb(0, 0, 0).to_linear_rgba(), [0.0, 0.0, 0.0, 1.0]);
        let w = Color::WHITE.to_linear_rgba();
        assert!((w[0] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn srgb_f32_round_trip_is_exact_for_u8() {
        let c = Color::rgb(12, 200, 255);
        assert_eq!(Color::from_srgb_f32(c.to_srgb_f32()), c);
    }

    #[test]
    fn serde_uses_string_form() {
        let json = serde_json::to_string(&Color::LIGHTBLUE).unwrap();
        assert_eq!(json, "\"lightblue\"");
        let back: Color = serde_json::from_str("\"#ff0000\"").unwrap();
        assert_eq!(back, Color::rgb(255, 0, 0));
    }
}
