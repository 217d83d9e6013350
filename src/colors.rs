//! Straight-alpha RGBA8 color.
//!
//! All rasters in the crate store [`Color`] values. Alpha is never
//! premultiplied: `a == 0` means "transparent, do not composite" and the RGB
//! channels of a transparent pixel carry no meaning.

use serde::Deserialize;

/// A single RGBA8 pixel with straight (non-premultiplied) alpha.
///
/// Deserializes from a hex string such as `"#a8d1d1"` or `"#00000000"`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);
pub const BLACK: Color = Color::rgb(0, 0, 0);
pub const WHITE: Color = Color::rgb(255, 255, 255);

impl Color {
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Fully opaque color.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r, g, b, 255)
    }

    /// Parses `#rrggbb`, `#rrggbbaa`, `0xrrggbb` or the bare hex digits.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex
            .trim()
            .trim_start_matches('#')
            .trim_start_matches("0x");
        let channel = |i: usize| u8::from_str_radix(digits.get(i..i + 2)?, 16).ok();
        match digits.len() {
            6 => Some(Self::rgb(channel(0)?, channel(2)?, channel(4)?)),
            8 => Some(Self::rgba(channel(0)?, channel(2)?, channel(4)?, channel(6)?)),
            _ => None,
        }
    }

    pub const fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    #[inline]
    pub fn is_transparent(self) -> bool {
        self.a == 0
    }

    #[inline]
    pub fn is_opaque(self) -> bool {
        self.a == 255
    }

    /// Linear interpolation of all four channels; `t` is clamped to [0, 1].
    #[inline]
    pub fn lerp(self, other: Color, t: f32) -> Color {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
        Color {
            r: mix(self.r, other.r),
            g: mix(self.g, other.g),
            b: mix(self.b, other.b),
            a: mix(self.a, other.a),
        }
    }

    /// Scales RGB by `intensity` (clamped to [0, 1]), keeping alpha.
    #[inline]
    pub fn modulate(self, intensity: f32) -> Color {
        let k = intensity.clamp(0.0, 1.0);
        let scale = |c: u8| (c as f32 * k).round() as u8;
        Color {
            r: scale(self.r),
            g: scale(self.g),
            b: scale(self.b),
            a: self.a,
        }
    }

    /// Porter-Duff "source over": `self` drawn on top of `dst`.
    #[inline]
    pub fn over(self, dst: Color) -> Color {
        if self.is_opaque() {
            return self;
        }
        if self.is_transparent() {
            return dst;
        }
        let sa = self.a as f32 / 255.0;
        let da = dst.a as f32 / 255.0;
        let out_a = sa + da * (1.0 - sa);
        if out_a <= 0.0 {
            return TRANSPARENT;
        }
        let blend = |s: u8, d: u8| {
            ((s as f32 * sa + d as f32 * da * (1.0 - sa)) / out_a).round() as u8
        };
        Color {
            r: blend(self.r, dst.r),
            g: blend(self.g, dst.g),
            b: blend(self.b, dst.b),
            a: (out_a * 255.0).round() as u8,
        }
    }
}

impl TryFrom<String> for Color {
    type Error = String;

    fn try_from(hex: String) -> Result<Self, Self::Error> {
        Color::from_hex(&hex).ok_or_else(|| format!("invalid hex color {hex:?}"))
    }
}

impl From<[u8; 4]> for Color {
    fn from([r, g, b, a]: [u8; 4]) -> Self {
        Self { r, g, b, a }
    }
}

impl From<Color> for [u8; 4] {
    fn from(c: Color) -> Self {
        [c.r, c.g, c.b, c.a]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_parsing() {
        assert_eq!(Color::from_hex("#fd8a8a"), Some(Color::rgb(0xfd, 0x8a, 0x8a)));
        assert_eq!(Color::from_hex("0xa8d1d1"), Some(Color::rgb(0xa8, 0xd1, 0xd1)));
        assert_eq!(
            Color::from_hex("11223344"),
            Some(Color::rgba(0x11, 0x22, 0x33, 0x44))
        );
        assert_eq!(Color::from_hex("#12"), None);
        assert_eq!(Color::from_hex("#zzzzzz"), None);
    }

    #[test]
    fn lerp_endpoints() {
        let a = Color::rgb(10, 20, 30);
        let b = Color::rgb(200, 100, 0);
        assert_eq!(a.lerp(b, 0.0), a);
        assert_eq!(a.lerp(b, 1.0), b);
        assert_eq!(a.lerp(b, 0.5), Color::rgb(105, 60, 15));
    }

    #[test]
    fn modulate_keeps_alpha() {
        let c = Color::rgba(200, 100, 50, 77).modulate(0.5);
        assert_eq!(c, Color::rgba(100, 50, 25, 77));
    }

    #[test]
    fn over_opaque_and_transparent() {
        let dst = Color::rgb(1, 2, 3);
        assert_eq!(WHITE.over(dst), WHITE);
        assert_eq!(TRANSPARENT.over(dst), dst);
        let half = Color::rgba(255, 0, 0, 128).over(BLACK);
        assert_eq!(half.a, 255);
        assert_eq!(half.r, 128);
    }
}
