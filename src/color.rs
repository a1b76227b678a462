use std::fmt;
use std::str::FromStr;

use palette::{Hsl, IntoColor, Srgb};
use serde::{Serialize, Serializer};

use crate::{VectorizeError, VectorizeResult};

/// An opaque RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// Hue in degrees `[0, 360)`, saturation and lightness in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HslComponents {
    pub hue: f32,
    pub saturation: f32,
    pub lightness: f32,
}

impl Color {
    pub const BLACK: Color = Color::new(0, 0, 0);
    pub const WHITE: Color = Color::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn to_hex(self) -> String {
        rgb_to_hex(self)
    }

    /// Convert to HSL through `palette`.
    pub fn to_hsl(self) -> HslComponents {
        let rgb = Srgb::new(self.r, self.g, self.b).into_format::<f32>();
        let hsl: Hsl = rgb.into_color();
        HslComponents {
            hue: hsl.hue.into_positive_degrees(),
            saturation: hsl.saturation,
            lightness: hsl.lightness,
        }
    }

    /// ITU-R 601 luma, the weighting used for posterization.
    pub fn luma(self) -> u8 {
        let weighted = 299 * self.r as u32 + 587 * self.g as u32 + 114 * self.b as u32;
        (weighted / 1000) as u8
    }

    /// Euclidean distance in RGB space.
    pub fn distance(self, other: Color) -> f64 {
        let dr = self.r as f64 - other.r as f64;
        let dg = self.g as f64 - other.g as f64;
        let db = self.b as f64 - other.b as f64;
        (dr * dr + dg * dg + db * db).sqrt()
    }
}

impl From<[u8; 3]> for Color {
    fn from([r, g, b]: [u8; 3]) -> Self {
        Self::new(r, g, b)
    }
}

impl From<Color> for [u8; 3] {
    fn from(color: Color) -> Self {
        [color.r, color.g, color.b]
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl FromStr for Color {
    type Err = VectorizeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        hex_to_rgb(s)
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

/// Parse `#rgb`, `#rrggbb`, `rgb` or `rrggbb`.
pub fn hex_to_rgb(text: &str) -> VectorizeResult<Color> {
    let invalid = || VectorizeError::InvalidColorFormat(text.to_string());
    let digits = text.strip_prefix('#').unwrap_or(text);
    if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(invalid());
    }

    let expanded: String = match digits.len() {
        3 => digits.chars().flat_map(|c| [c, c]).collect(),
        6 => digits.to_string(),
        _ => return Err(invalid()),
    };

    let channel = |i: usize| u8::from_str_radix(&expanded[i..i + 2], 16).map_err(|_| invalid());
    Ok(Color::new(channel(0)?, channel(2)?, channel(4)?))
}

/// Lowercase `#rrggbb`.
pub fn rgb_to_hex(color: Color) -> String {
    color.to_string()
}

/// Blend `color` at `alpha` over a white canvas, truncating each channel.
pub fn composite_over_white(color: Color, alpha: f64) -> Color {
    let alpha = alpha.clamp(0.0, 1.0);
    let blend = |c: u8| (alpha * c as f64 + (1.0 - alpha) * 255.0) as u8;
    Color::new(blend(color.r), blend(color.g), blend(color.b))
}

/// Opacity of two translucent layers stacked on top of each other.
pub fn combine_opacity(a: f64, b: f64) -> f64 {
    1.0 - (1.0 - a) * (1.0 - b)
}
