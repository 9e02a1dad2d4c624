//! Color tokens shared by themes, charts and maps.
//!
//! Colors are written the way chart authors write them: `#RRGGBB`, `#RGB`, or a CSS
//! color name such as `"lightgrey"`. Internally they are plain 8-bit RGB triples that
//! convert losslessly into plotters' [`RGBColor`].

use std::fmt;
use std::str::FromStr;

use plotters::style::RGBColor;
use serde::{Deserialize, Serialize};

use crate::error::VizError;

/// An opaque 8-bit RGB color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Build from a `0xRRGGBB` literal.
    pub const fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xFF) as u8,
            g: ((hex >> 8) & 0xFF) as u8,
            b: (hex & 0xFF) as u8,
        }
    }

    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);
    pub const LIGHTGREY: Rgb = Rgb::new(211, 211, 211);

    /// Uppercase `#RRGGBB` form.
    pub fn to_hex(self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl From<Rgb> for RGBColor {
    fn from(c: Rgb) -> Self {
        RGBColor(c.r, c.g, c.b)
    }
}

impl From<rgb::RGB8> for Rgb {
    fn from(c: rgb::RGB8) -> Self {
        Rgb::new(c.r, c.g, c.b)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Rgb {
    type Err = VizError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let t = s.trim();
        if let Some(hex) = t.strip_prefix('#') {
            return parse_hex(hex).ok_or_else(|| VizError::Color(s.to_string()));
        }
        let key = t.to_ascii_lowercase();
        NAMED
            .iter()
            .find(|(name, _)| *name == key)
            .map(|(_, hex)| Rgb::from_hex(*hex))
            .ok_or_else(|| VizError::Color(s.to_string()))
    }
}

impl TryFrom<String> for Rgb {
    type Error = VizError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Rgb> for String {
    fn from(c: Rgb) -> Self {
        c.to_hex()
    }
}

fn parse_hex(hex: &str) -> Option<Rgb> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    match hex.len() {
        6 => u32::from_str_radix(hex, 16).ok().map(Rgb::from_hex),
        3 => {
            // #abc -> #aabbcc
            let mut it = hex.chars().map(|c| c.to_digit(16).unwrap_or(0) as u8 * 17);
            Some(Rgb::new(it.next()?, it.next()?, it.next()?))
        }
        _ => None,
    }
}

/// CSS color names accepted in options and config files.
const NAMED: &[(&str, u32)] = &[
    ("black", 0x000000),
    ("white", 0xFFFFFF),
    ("red", 0xFF0000),
    ("green", 0x008000),
    ("blue", 0x0000FF),
    ("yellow", 0xFFFF00),
    ("orange", 0xFFA500),
    ("purple", 0x800080),
    ("gray", 0x808080),
    ("grey", 0x808080),
    ("darkgray", 0xA9A9A9),
    ("darkgrey", 0xA9A9A9),
    ("lightgray", 0xD3D3D3),
    ("lightgrey", 0xD3D3D3),
    ("silver", 0xC0C0C0),
    ("gainsboro", 0xDCDCDC),
    ("whitesmoke", 0xF5F5F5),
    ("navy", 0x000080),
    ("teal", 0x008080),
    ("maroon", 0x800000),
    ("olive", 0x808000),
    ("steelblue", 0x4682B4),
    ("tomato", 0xFF6347),
    ("transparent", 0xFFFFFF),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex_forms() {
        assert_eq!("#2563EB".parse::<Rgb>().unwrap(), Rgb::new(0x25, 0x63, 0xEB));
        assert_eq!("#fff".parse::<Rgb>().unwrap(), Rgb::WHITE);
        assert!("#12345".parse::<Rgb>().is_err());
        assert!("#zzzzzz".parse::<Rgb>().is_err());
    }

    #[test]
    fn parses_names_case_insensitively() {
        assert_eq!("LightGrey".parse::<Rgb>().unwrap(), Rgb::LIGHTGREY);
        assert_eq!(" black ".parse::<Rgb>().unwrap(), Rgb::BLACK);
        assert!("not-a-color".parse::<Rgb>().is_err());
    }

    #[test]
    fn hex_display_is_uppercase() {
        assert_eq!(Rgb::from_hex(0x16a34a).to_string(), "#16A34A");
    }

    #[test]
    fn serde_uses_hex_strings() {
        let c: Rgb = serde_json::from_str("\"#DC2626\"").unwrap();
        assert_eq!(c, Rgb::from_hex(0xDC2626));
        assert_eq!(serde_json::to_string(&c).unwrap(), "\"#DC2626\"");
    }
}
