use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::ops::{Add, AddAssign, Mul};
use std::str::FromStr;
use thiserror::Error;

pub fn hsv_to_rgb(h: f32, s: f32, v: f32) -> [f32; 3] {
    let c = v * s;
    let h_prime = (h.rem_euclid(1.0) * 6.0) % 6.0;
    let x = c * (1.0 - ((h_prime % 2.0) - 1.0).abs());
    let m = v - c;

    let (r, g, b) = match h_prime as i32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };

    [r + m, g + m, b + m]
}

/// HSL to RGB with all components in [0, 1]
pub fn hsl_to_rgb(h: f32, s: f32, l: f32) -> [f32; 3] {
    let v = l + s * l.min(1.0 - l);
    let sv = if v == 0.0 { 0.0 } else { 2.0 * (1.0 - l / v) };
    hsv_to_rgb(h, sv, v)
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorParseError {
    #[error("color '{0}' is empty")]
    Empty(String),
    #[error("color '{0}' is not a hex triplet or a known name")]
    Malformed(String),
}

/// Linear RGB color, components nominally in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const BLACK: Color = Color::new(0.0, 0.0, 0.0);
    pub const WHITE: Color = Color::new(1.0, 1.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// From a packed 0xRRGGBB value
    pub fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xff) as f32 / 255.0,
            g: ((hex >> 8) & 0xff) as f32 / 255.0,
            b: (hex & 0xff) as f32 / 255.0,
        }
    }

    pub fn from_hsl(h: f32, s: f32, l: f32) -> Self {
        let [r, g, b] = hsl_to_rgb(h, s, l);
        Self { r, g, b }
    }

    pub fn from_hsv(h: f32, s: f32, v: f32) -> Self {
        let [r, g, b] = hsv_to_rgb(h, s, v);
        Self { r, g, b }
    }

    pub fn to_hex(&self) -> u32 {
        let [r, g, b, _] = self.to_rgba8(1.0);
        ((r as u32) << 16) | ((g as u32) << 8) | b as u32
    }

    pub fn to_array(&self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }

    pub fn to_rgba8(&self, alpha: f32) -> [u8; 4] {
        let quantize = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        [quantize(self.r), quantize(self.g), quantize(self.b), quantize(alpha)]
    }

    /// Multiply every channel by `factor` (light intensity, shading)
    pub fn scaled(&self, factor: f32) -> Self {
        Self::new(self.r * factor, self.g * factor, self.b * factor)
    }

    pub fn lerp(&self, other: Color, t: f32) -> Self {
        Self::new(
            self.r + (other.r - self.r) * t,
            self.g + (other.g - self.g) * t,
            self.b + (other.b - self.b) * t,
        )
    }
}

impl From<[f32; 3]> for Color {
    fn from(rgb: [f32; 3]) -> Self {
        Self::new(rgb[0], rgb[1], rgb[2])
    }
}

impl Add for Color {
    type Output = Color;

    fn add(self, rhs: Color) -> Color {
        Color::new(self.r + rhs.r, self.g + rhs.g, self.b + rhs.b)
    }
}

impl AddAssign for Color {
    fn add_assign(&mut self, rhs: Color) {
        *self = *self + rhs;
    }
}

/// Component-wise product (surface color under a light color)
impl Mul for Color {
    type Output = Color;

    fn mul(self, rhs: Color) -> Color {
        Color::new(self.r * rhs.r, self.g * rhs.g, self.b * rhs.b)
    }
}

impl FromStr for Color {
    type Err = ColorParseError;

    /// Accepts `#rrggbb`, `#rgb`, `0xrrggbb` and a handful of CSS names
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(ColorParseError::Empty(s.to_string()));
        }

        let named = match trimmed.to_ascii_lowercase().as_str() {
            "white" => Some(0xffffff),
            "black" => Some(0x000000),
            "grey" | "gray" => Some(0x808080),
            "red" => Some(0xff0000),
            "green" => Some(0x008000),
            "blue" => Some(0x0000ff),
            "skyblue" => Some(0x87ceeb),
            _ => None,
        };
        if let Some(hex) = named {
            return Ok(Color::from_hex(hex));
        }

        let digits = trimmed
            .strip_prefix('#')
            .or_else(|| trimmed.strip_prefix("0x"))
            .ok_or_else(|| ColorParseError::Malformed(s.to_string()))?;

        let expanded: String = match digits.len() {
            6 => digits.to_string(),
            3 => digits.chars().flat_map(|c| [c, c]).collect(),
            _ => return Err(ColorParseError::Malformed(s.to_string())),
        };

        u32::from_str_radix(&expanded, 16)
            .map(Color::from_hex)
            .map_err(|_| ColorParseError::Malformed(s.to_string()))
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:06x}", self.to_hex())
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hsv_to_rgb_red() {
        let rgb = hsv_to_rgb(0.0, 1.0, 1.0);
        assert!((rgb[0] - 1.0).abs() < 0.01);
        assert!(rgb[1].abs() < 0.01);
        assert!(rgb[2].abs() < 0.01);
    }

    #[test]
    fn test_hsl_midpoint_is_saturated() {
        let c = Color::from_hsl(0.0, 1.0, 0.5);
        assert!((c.r - 1.0).abs() < 0.01);
        assert!(c.g.abs() < 0.01);
        assert!(c.b.abs() < 0.01);
    }

    #[test]
    fn test_hsl_zero_lightness_is_black() {
        let c = Color::from_hsl(0.95, 0.8, 0.0);
        assert_eq!(c.to_hex(), 0x000000);
    }

    #[test]
    fn test_parse_hex_forms() {
        assert_eq!("#37ff00".parse::<Color>().unwrap().to_hex(), 0x37ff00);
        assert_eq!("0x003049".parse::<Color>().unwrap().to_hex(), 0x003049);
        assert_eq!("#888".parse::<Color>().unwrap().to_hex(), 0x888888);
        assert_eq!("grey".parse::<Color>().unwrap().to_hex(), 0x808080);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!("".parse::<Color>(), Err(ColorParseError::Empty(_))));
        assert!(matches!("#12345".parse::<Color>(), Err(ColorParseError::Malformed(_))));
        assert!(matches!("#gggggg".parse::<Color>(), Err(ColorParseError::Malformed(_))));
    }

    #[test]
    fn test_display_is_lowercase_hex() {
        assert_eq!(Color::from_hex(0xCAF0F8).to_string(), "#caf0f8");
    }

    #[test]
    fn test_serde_as_string() {
        let json = serde_json::to_string(&Color::from_hex(0xff477e)).unwrap();
        assert_eq!(json, "\"#ff477e\"");
        let back: Color = serde_json::from_str(&json).unwrap();
        assert_eq!(back.to_hex(), 0xff477e);
    }
}
