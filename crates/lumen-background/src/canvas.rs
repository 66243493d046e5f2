//! The drawing interface the painter targets.

use lumen_core::{Rgba, Viewport};

use lyon::path::Path;
use crate::raster::SurfaceError;

/// How a fill is combined with what is already on the canvas.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Blend {
    /// Normal alpha compositing.
    #[default]
    SourceOver,
    /// Color channels add up and saturate (light accumulates).
    Additive,
}

/// Axis-aligned rectangle in surface coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle covering a whole viewport.
    pub fn from_viewport(viewport: Viewport) -> Self {
        Self::new(0.0, 0.0, viewport.width_f32(), viewport.height_f32())
    }

    /// Square of half-size `radius` centered on `(cx, cy)`.
    pub fn around(cx: f32, cy: f32, radius: f32) -> Self {
        Self::new(cx - radius, cy - radius, radius * 2.0, radius * 2.0)
    }
}

/// A color at a position along a gradient (`offset` in `0.0..=1.0`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorStop {
    pub offset: f32,
    pub color: Rgba,
}

/// Gradient geometry plus its color stops.
#[derive(Debug, Clone, PartialEq)]
pub enum Gradient {
    /// Varies along y only, from `y0` (offset 0) to `y1` (offset 1).
    Vertical { y0: f32, y1: f32, stops: Vec<ColorStop> },
    /// Varies with distance from `(cx, cy)`, reaching offset 1 at `radius`.
    Radial {
        cx: f32,
        cy: f32,
        radius: f32,
        stops: Vec<ColorStop>,
    },
}

impl Gradient {
    /// Vertical gradient between two colors.
    pub fn vertical(y0: f32, y1: f32, top: Rgba, bottom: Rgba) -> Self {
        Gradient::Vertical {
            y0,
            y1,
            stops: vec![
                ColorStop {
                    offset: 0.0,
                    color: top,
                },
                ColorStop {
                    offset: 1.0,
                    color: bottom,
                },
            ],
        }
    }

    /// Radial gradient with arbitrary stops.
    pub fn radial(cx: f32, cy: f32, radius: f32, stops: &[(f32, Rgba)]) -> Self {
        Gradient::Radial {
            cx,
            cy,
            radius,
            stops: stops
                .iter()
                .map(|&(offset, color)| ColorStop { offset, color })
                .collect(),
        }
    }

    fn stops(&self) -> &[ColorStop] {
        match self {
            Gradient::Vertical { stops, .. } | Gradient::Radial { stops, .. } => stops,
        }
    }

    /// Gradient offset at a point, clamped to `0.0..=1.0`.
    pub fn offset_at(&self, x: f32, y: f32) -> f32 {
        let t = match *self {
            Gradient::Vertical { y0, y1, .. } => {
                let span = y1 - y0;
                if span.abs() < f32::EPSILON {
                    0.0
                } else {
                    (y - y0) / span
                }
            }
            Gradient::Radial { cx, cy, radius, .. } => {
                if radius <= 0.0 {
                    1.0
                } else {
                    ((x - cx).powi(2) + (y - cy).powi(2)).sqrt() / radius
                }
            }
        };
        t.clamp(0.0, 1.0)
    }

    /// Color at an offset, interpolating between the surrounding stops.
    pub fn color_at_offset(&self, t: f32) -> Rgba {
        let stops = self.stops();
        let Some(first) = stops.first() else {
            return Rgba::TRANSPARENT;
        };
        if t <= first.offset {
            return first.color;
        }
        for pair in stops.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if t <= b.offset {
                let span = b.offset - a.offset;
                let local = if span > 0.0 { (t - a.offset) / span } else { 1.0 };
                return a.color.lerp(b.color, local);
            }
        }
        stops[stops.len() - 1].color
    }

    /// Color at a surface point.
    pub fn color_at(&self, x: f32, y: f32) -> Rgba {
        self.color_at_offset(self.offset_at(x, y))
    }

    /// Whether the last stop is fully transparent, so nothing is painted
    /// beyond the gradient's extent.
    pub fn fades_out(&self) -> bool {
        self.stops().last().is_none_or(|s| s.color.a == 0.0)
    }
}

/// A 2-D drawing target.
///
/// The painter issues one frame as a sequence of these calls; [`Surface`]
/// rasterizes them, and tests can record them.
///
/// [`Surface`]: crate::Surface
pub trait Canvas {
    /// Current size in pixels.
    fn size(&self) -> Viewport;

    /// Reallocate for a new viewport. Contents are discarded.
    fn resize(&mut self, viewport: Viewport) -> Result<(), SurfaceError>;

    /// Reset every pixel to fully transparent.
    fn clear(&mut self);

    /// Fill the whole canvas with a solid color.
    fn fill(&mut self, color: Rgba);

    /// Fill a path with a gradient, softened by a Gaussian blur with
    /// standard deviation `blur` (no blur when `blur <= 0`).
    fn fill_path(&mut self, path: &Path, paint: &Gradient, blur: f32);

    /// Fill a rectangle with a gradient.
    fn fill_rect(&mut self, rect: Rect, paint: &Gradient, blend: Blend);

    /// Fill an anti-aliased circle with a solid color.
    fn fill_circle(&mut self, cx: f32, cy: f32, radius: f32, color: Rgba);
}
