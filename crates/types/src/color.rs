//! Hex color strings as used by the bar protocol.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::theme::ThemeError;

/// A `#RRGGBB` color, validated on construction
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct HexColor(String);

impl HexColor {
    pub fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self(format!("#{:02x}{:02x}{:02x}", r, g, b))
    }

    pub fn to_rgb8(&self) -> (u8, u8, u8) {
        // Validated in the constructor, so the slices are always 2 hex digits
        let channel = |i: usize| u8::from_str_radix(&self.0[i..i + 2], 16).unwrap_or(0);
        (channel(1), channel(3), channel(5))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for HexColor {
    type Err = ThemeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let valid = s.len() == 7
            && s.starts_with('#')
            && s[1..].chars().all(|c| c.is_ascii_hexdigit());
        if valid {
            Ok(Self(s.to_string()))
        } else {
            Err(ThemeError::InvalidColor(s.to_string()))
        }
    }
}

impl TryFrom<String> for HexColor {
    type Error = ThemeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<HexColor> for String {
    fn from(color: HexColor) -> Self {
        color.0
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid() {
        let color: HexColor = "#00Ff7a".parse().unwrap();
        assert_eq!(color.to_rgb8(), (0x00, 0xff, 0x7a));
        assert_eq!(color.as_str(), "#00Ff7a");
    }

    #[test]
    fn test_parse_invalid() {
        for bad in ["00ff7a", "#00ff7", "#00ff7ag", "#zzzzzz", "", "#"] {
            assert!(bad.parse::<HexColor>().is_err(), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn test_from_rgb8() {
        assert_eq!(HexColor::from_rgb8(255, 0, 16).as_str(), "#ff0010");
    }

    #[test]
    fn test_deserialize_rejects_malformed() {
        let result: Result<HexColor, _> = serde_json::from_str(r#""red""#);
        assert!(result.is_err());
    }
}
