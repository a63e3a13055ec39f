//! RGB colors shared by the spreadsheet styles and the PDF renderer.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A 24-bit RGB color, stored as `0xRRGGBB`.
///
/// Parses `#RRGGBB`, `RRGGBB`, the short `#RGB` form and 8-digit ARGB
/// strings such as `FF4472C4` (the alpha byte is ignored).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb(u32);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0x000000);
    pub const WHITE: Rgb = Rgb(0xFFFFFF);

    pub const fn new(value: u32) -> Self {
        Self(value & 0xFF_FFFF)
    }

    pub const fn value(self) -> u32 {
        self.0
    }

    /// Red, green and blue as fractions in `0.0..=1.0`.
    pub fn components(self) -> (f32, f32, f32) {
        let r = ((self.0 >> 16) & 0xFF) as f32 / 255.0;
        let g = ((self.0 >> 8) & 0xFF) as f32 / 255.0;
        let b = (self.0 & 0xFF) as f32 / 255.0;
        (r, g, b)
    }
}

impl Default for Rgb {
    fn default() -> Self {
        Self::BLACK
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:06X}", self.0)
    }
}

impl FromStr for Rgb {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.trim().trim_start_matches('#');
        if !hex.is_ascii() {
            return Err(format!("Invalid color '{s}': not a hex value"));
        }
        let expanded;
        let digits = match hex.len() {
            3 => {
                expanded = hex.chars().flat_map(|c| [c, c]).collect::<String>();
                expanded.as_str()
            }
            6 => hex,
            8 => &hex[2..],
            _ => return Err(format!("Invalid color '{s}': expected #RGB, #RRGGBB or AARRGGBB")),
        };
        u32::from_str_radix(digits, 16)
            .map(Rgb::new)
            .map_err(|_| format!("Invalid color '{s}': not a hex value"))
    }
}

impl TryFrom<String> for Rgb {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Rgb> for String {
    fn from(value: Rgb) -> Self {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_forms() {
        assert_eq!("#4472C4".parse::<Rgb>().unwrap(), Rgb::new(0x4472C4));
        assert_eq!("4472c4".parse::<Rgb>().unwrap(), Rgb::new(0x4472C4));
        assert_eq!("FF4472C4".parse::<Rgb>().unwrap(), Rgb::new(0x4472C4));
        assert_eq!("#aaa".parse::<Rgb>().unwrap(), Rgb::new(0xAAAAAA));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("#12".parse::<Rgb>().is_err());
        assert!("#GGGGGG".parse::<Rgb>().is_err());
    }

    #[test]
    fn test_components_and_display() {
        let (r, g, b) = Rgb::WHITE.components();
        assert_eq!((r, g, b), (1.0, 1.0, 1.0));
        assert_eq!(Rgb::new(0x0A0B0C).to_string(), "#0A0B0C");
    }

    #[test]
    fn test_serde_as_string() {
        let json = serde_json::to_string(&Rgb::new(0x4472C4)).unwrap();
        assert_eq!(json, "\"#4472C4\"");
        let parsed: Rgb = serde_json::from_str("\"#ffffff\"").unwrap();
        assert_eq!(parsed, Rgb::WHITE);
    }
}
