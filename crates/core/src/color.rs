//! Colors used to paint the particle layer.
//!
//! [`Srgb`] is a plain 8-bit-quantizable color that serializes as `"#rrggbb"`.
//! [`Tint`] pairs a color with an alpha and renders to a CSS `rgba(...)`
//! string, which is what a 2-D canvas context expects as a fill style.

use crate::error::BackdropError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// sRGB color with components in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Srgb {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Srgb {
    /// Builds a color from 8-bit channels.
    pub fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self {
            r: r as f64 / 255.0,
            g: g as f64 / 255.0,
            b: b as f64 / 255.0,
        }
    }

    /// Parses `"#rrggbb"` or `"rrggbb"` (case insensitive).
    pub fn from_hex(hex: &str) -> Result<Self, BackdropError> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if digits.len() != 6 || !digits.is_ascii() {
            return Err(BackdropError::InvalidColor(format!(
                "expected 6 hex digits in {hex:?}"
            )));
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&digits[range], 16)
                .map_err(|e| BackdropError::InvalidColor(format!("{hex:?}: {e}")))
        };
        Ok(Self::from_rgb8(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }

    /// Quantizes to 8-bit channels, clamping out-of-range components.
    pub fn to_rgb8(self) -> [u8; 3] {
        let q = |c: f64| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        [q(self.r), q(self.g), q(self.b)]
    }

    /// Formats as `"#rrggbb"`.
    pub fn to_hex(self) -> String {
        let [r, g, b] = self.to_rgb8();
        format!("#{r:02x}{g:02x}{b:02x}")
    }
}

impl Serialize for Srgb {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Srgb {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Srgb::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// A translucent fill color.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tint {
    pub color: Srgb,
    pub alpha: f64,
}

impl Tint {
    pub const fn new(color: Srgb, alpha: f64) -> Self {
        Self { color, alpha }
    }

    /// CSS fill style, e.g. `rgba(125, 211, 252, 0.04)`.
    pub fn to_css(&self) -> String {
        let [r, g, b] = self.color.to_rgb8();
        format!("rgba({r}, {g}, {b}, {})", self.alpha.clamp(0.0, 1.0))
    }
}
