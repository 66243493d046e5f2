//! Straight-alpha RGBA colors.

use ratatui::style::Color;

/// Opaque scene background (`#0D0D1A`).
pub const BACKGROUND: Rgba = Rgba::rgb(13, 13, 26);

/// A color with straight (non-premultiplied) alpha.
///
/// Channels are stored as `f32` in `0.0..=1.0` so the rasterizer can blend
/// without repeated conversions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub const TRANSPARENT: Rgba = Rgba::new(0.0, 0.0, 0.0, 0.0);
    pub const WHITE: Rgba = Rgba::new(1.0, 1.0, 1.0, 1.0);

    /// Construct from normalized channels.
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Construct an opaque color from 8-bit channels.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r, g, b, 1.0)
    }

    /// Construct from 8-bit channels and a normalized alpha, like CSS `rgba()`.
    pub const fn rgba(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self {
            r: r as f32 / 255.0,
            g: g as f32 / 255.0,
            b: b as f32 / 255.0,
            a,
        }
    }

    /// Same color with a different alpha, clamped to `0.0..=1.0`.
    pub fn with_alpha(self, a: f32) -> Self {
        Self {
            a: a.clamp(0.0, 1.0),
            ..self
        }
    }

    /// Linear interpolation between two colors in straight-alpha space.
    ///
    /// A fully transparent endpoint keeps the other endpoint's hue so that
    /// gradients fading to transparent do not darken towards black.
    pub fn lerp(self, other: Rgba, t: f32) -> Rgba {
        let t = t.clamp(0.0, 1.0);
        let (from, to) = match (self.a == 0.0, other.a == 0.0) {
            (true, false) => (other.with_alpha(0.0), other),
            (false, true) => (self, self.with_alpha(0.0)),
            _ => (self, other),
        };
        Rgba {
            r: from.r + (to.r - from.r) * t,
            g: from.g + (to.g - from.g) * t,
            b: from.b + (to.b - from.b) * t,
            a: from.a + (to.a - from.a) * t,
        }
    }

    /// Convert to 8-bit RGB, dropping alpha.
    pub fn to_rgb8(self) -> (u8, u8, u8) {
        let q = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        (q(self.r), q(self.g), q(self.b))
    }
}

impl From<Rgba> for Color {
    fn from(c: Rgba) -> Self {
        let (r, g, b) = c.to_rgb8();
        Color::Rgb(r, g, b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_background_is_opaque() {
        assert_eq!(BACKGROUND.a, 1.0);
        assert_eq!(BACKGROUND.to_rgb8(), (13, 13, 26));
    }

    #[test]
    fn test_lerp_to_transparent_keeps_hue() {
        let lavender = Rgba::rgba(200, 180, 255, 0.15);
        let mid = lavender.lerp(Rgba::TRANSPARENT, 0.5);
        assert_eq!(mid.to_rgb8(), lavender.to_rgb8());
        assert!((mid.a - 0.075).abs() < 1e-6);
    }

    #[test]
    fn test_with_alpha_clamps() {
        assert_eq!(Rgba::WHITE.with_alpha(1.7).a, 1.0);
        assert_eq!(Rgba::WHITE.with_alpha(-0.2).a, 0.0);
    }

    #[test]
    fn test_into_ratatui_color() {
        assert_eq!(Color::from(Rgba::rgb(1, 2, 3)), Color::Rgb(1, 2, 3));
    }
}
