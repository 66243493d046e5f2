//! Software rasterizer backing [`Canvas`].
//!
//! Pixels are stored premultiplied so source-over and additive blending are
//! single multiply-adds. Paths are filled with a non-zero scanline
//! rasterizer using several sub-scanlines per row for vertical
//! anti-aliasing and exact span coverage horizontally.
//!
//! Blurred fills are rendered into an offscreen layer covering only the
//! path's bounds plus the blur's reach, optionally at reduced resolution
//! for large radii, blurred with three box passes per axis (a close
//! Gaussian approximation), then composited back with bilinear sampling.

use std::fmt;

use lumen_core::{Rgba, Viewport};
use lyon::math::{Point, point};
use lyon::path::Path;

use crate::canvas::{Blend, Canvas, Gradient, Rect};

/// Largest surface that will be allocated (pixels). At 16 bytes per pixel
/// this caps the pixel buffer at 256 MiB.
pub const MAX_PIXELS: u64 = 1 << 24;

/// Sub-scanlines sampled per pixel row.
const SUBSAMPLES: usize = 4;

/// Curve flattening tolerance in pixels.
const FLATTEN_TOLERANCE: f32 = 0.25;

/// Blur standard deviation handled per unit of layer downsampling.
const BLUR_SIGMA_PER_SCALE: f32 = 16.0;

/// Largest layer downsampling factor.
const MAX_LAYER_SCALE: u32 = 8;

/// Box passes used to approximate a Gaussian.
const BLUR_PASSES: usize = 3;

/// Premultiplied RGBA.
type Px = [f32; 4];

const CLEAR: Px = [0.0; 4];

fn premultiply(c: Rgba) -> Px {
    let a = c.a.clamp(0.0, 1.0);
    [c.r * a, c.g * a, c.b * a, a]
}

fn scale(p: Px, k: f32) -> Px {
    [p[0] * k, p[1] * k, p[2] * k, p[3] * k]
}

fn blend_px(dst: &mut Px, src: Px, blend: Blend) {
    match blend {
        Blend::SourceOver => {
            let inv = 1.0 - src[3];
            for i in 0..4 {
                dst[i] = src[i] + dst[i] * inv;
            }
        }
        Blend::Additive => {
            for i in 0..4 {
                dst[i] = (src[i] + dst[i]).min(1.0);
            }
        }
    }
}

/// Errors raised when a surface cannot be allocated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceError {
    /// The requested size exceeds [`MAX_PIXELS`].
    TooLarge { width: u32, height: u32 },
}

impl fmt::Display for SurfaceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SurfaceError::TooLarge { width, height } => {
                write!(f, "surface {width}x{height} exceeds {MAX_PIXELS} pixels")
            }
        }
    }
}

impl std::error::Error for SurfaceError {}

/// An RGBA pixel buffer implementing [`Canvas`].
#[derive(Debug, Clone, Default)]
pub struct Surface {
    width: u32,
    height: u32,
    pixels: Vec<Px>,
    /// Offscreen layer for blurred fills.
    layer: Vec<Px>,
    /// Scratch line for blur passes.
    line: Vec<Px>,
}

impl Surface {
    /// Allocate a transparent surface.
    pub fn new(width: u32, height: u32) -> Result<Self, SurfaceError> {
        let mut surface = Self::default();
        surface.resize(Viewport::new(width, height))?;
        Ok(surface)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Straight-alpha color of a pixel, transparent when out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Rgba {
        if x >= self.width || y >= self.height {
            return Rgba::TRANSPARENT;
        }
        let p = self.pixels[(y * self.width + x) as usize];
        if p[3] <= 0.0 {
            Rgba::TRANSPARENT
        } else {
            Rgba::new(p[0] / p[3], p[1] / p[3], p[2] / p[3], p[3])
        }
    }

    /// Average straight-alpha color over a pixel block, clipped to the
    /// surface. Used to downsample for presentation.
    pub fn average(&self, x0: u32, y0: u32, x1: u32, y1: u32) -> Rgba {
        let (x1, y1) = (x1.min(self.width), y1.min(self.height));
        if x0 >= x1 || y0 >= y1 {
            return Rgba::TRANSPARENT;
        }
        let mut sum = CLEAR;
        for y in y0..y1 {
            let row = (y * self.width) as usize;
            for p in &self.pixels[row + x0 as usize..row + x1 as usize] {
                for i in 0..4 {
                    sum[i] += p[i];
                }
            }
        }
        let n = ((x1 - x0) * (y1 - y0)) as f32;
        let a = sum[3] / n;
        if a <= 0.0 {
            Rgba::TRANSPARENT
        } else {
            Rgba::new(sum[0] / n / a, sum[1] / n / a, sum[2] / n / a, a)
        }
    }

    /// Rasterize polygons into `target` (a `width` x `height` buffer).
    /// Row `r` is shaded with the gradient at surface
    /// `y = shade_origin + (r + 0.5) * shade_scale`.
    fn fill_polygons(
        target: &mut [Px],
        width: u32,
        height: u32,
        polygons: &[Vec<Point>],
        paint: &Gradient,
        shade_origin: f32,
        shade_scale: f32,
    ) {
        if width == 0 || height == 0 {
            return;
        }
        let mut edges: Vec<(Point, Point)> = Vec::new();
        for poly in polygons {
            for (i, &a) in poly.iter().enumerate() {
                let b = poly[(i + 1) % poly.len()];
                if a.y != b.y {
                    edges.push((a, b));
                }
            }
        }
        if edges.is_empty() {
            return;
        }
        let (min_y, max_y) = edges.iter().fold((f32::MAX, f32::MIN), |(lo, hi), (a, b)| {
            (lo.min(a.y).min(b.y), hi.max(a.y).max(b.y))
        });
        let row_start = min_y.floor().max(0.0) as u32;
        let row_end = (max_y.ceil().max(0.0) as u32).min(height);

        let mut coverage = vec![0.0f32; width as usize];
        let mut crossings: Vec<(f32, i32)> = Vec::new();
        let weight = 1.0 / SUBSAMPLES as f32;

        for row in row_start..row_end {
            coverage.iter_mut().for_each(|c| *c = 0.0);
            let mut touched = false;

            for s in 0..SUBSAMPLES {
                let sy = row as f32 + (s as f32 + 0.5) * weight;
                crossings.clear();
                for &(a, b) in &edges {
                    let (top, bottom, dir) = if a.y < b.y { (a, b, 1) } else { (b, a, -1) };
                    if sy < top.y || sy >= bottom.y {
                        continue;
                    }
                    let t = (sy - top.y) / (bottom.y - top.y);
                    crossings.push((top.x + t * (bottom.x - top.x), dir));
                }
                if crossings.is_empty() {
                    continue;
                }
                crossings.sort_by(|l, r| l.0.total_cmp(&r.0));

                let mut winding = 0;
                for pair in crossings.windows(2) {
                    winding += pair[0].1;
                    if winding != 0 {
                        touched |= add_span(&mut coverage, pair[0].0, pair[1].0, weight);
                    }
                }
            }
            if !touched {
                continue;
            }

            let shade_y = shade_origin + (row as f32 + 0.5) * shade_scale;
            let color = premultiply(paint.color_at(0.0, shade_y));
            let base = (row * width) as usize;
            for (x, &c) in coverage.iter().enumerate() {
                if c > 0.0 {
                    blend_px(&mut target[base + x], scale(color, c.min(1.0)), Blend::SourceOver);
                }
            }
        }
    }

    /// Composite the offscreen layer (`lw` x `lh`, downsampled by
    /// `factor`, top-left at surface pixel `(ox, oy)`) onto the surface
    /// with bilinear sampling. Only the layer's footprint is visited.
    fn composite_layer(&mut self, origin: (u32, u32), lw: u32, lh: u32, factor: u32) {
        let (ox, oy) = origin;
        let x_end = (ox + lw * factor).min(self.width);
        let y_end = (oy + lh * factor).min(self.height);
        let inv = 1.0 / factor as f32;
        let mut row = std::mem::take(&mut self.line);

        for y in oy..y_end {
            let ly = ((y - oy) as f32 + 0.5) * inv - 0.5;
            if !lerp_layer_row(&self.layer, lw, lh, ly, &mut row) {
                continue;
            }
            let fetch = |i: f32| -> Px {
                if i < 0.0 || i >= lw as f32 {
                    CLEAR
                } else {
                    row[i as usize]
                }
            };
            let base = (y * self.width) as usize;
            for x in ox..x_end {
                let lx = ((x - ox) as f32 + 0.5) * inv - 0.5;
                let x0 = lx.floor();
                let fx = lx - x0;
                let (left, right) = (fetch(x0), fetch(x0 + 1.0));
                let mut src = CLEAR;
                for c in 0..4 {
                    src[c] = left[c] + (right[c] - left[c]) * fx;
                }
                if src[3] > 0.0 {
                    blend_px(&mut self.pixels[base + x as usize], src, Blend::SourceOver);
                }
            }
        }
        self.line = row;
    }
}

/// Interpolate layer row `ly` (fractional, transparent outside the layer)
/// into `out`. Returns whether any pixel is visible.
fn lerp_layer_row(layer: &[Px], lw: u32, lh: u32, ly: f32, out: &mut Vec<Px>) -> bool {
    let y0 = ly.floor();
    let fy = ly - y0;
    let fetch_row = |yi: f32| {
        if yi < 0.0 || yi >= lh as f32 {
            None
        } else {
            let start = (yi as u32 * lw) as usize;
            Some(&layer[start..start + lw as usize])
        }
    };
    let (top, bottom) = (fetch_row(y0), fetch_row(y0 + 1.0));
    out.clear();
    let mut visible = false;
    for i in 0..lw as usize {
        let t = top.map_or(CLEAR, |r| r[i]);
        let b = bottom.map_or(CLEAR, |r| r[i]);
        let mut p = CLEAR;
        for c in 0..4 {
            p[c] = t[c] + (b[c] - t[c]) * fy;
        }
        visible |= p[3] > 0.0;
        out.push(p);
    }
    visible
}

/// Add horizontal coverage `weight` over `[xa, xb)`; returns whether any
/// pixel was touched.
fn add_span(coverage: &mut [f32], xa: f32, xb: f32, weight: f32) -> bool {
    let w = coverage.len() as f32;
    let xa = xa.max(0.0);
    let xb = xb.min(w);
    if xb <= xa {
        return false;
    }
    let ia = xa.floor() as usize;
    let ib = xb.floor() as usize;
    if ia == ib {
        coverage[ia] += (xb - xa) * weight;
        return true;
    }
    coverage[ia] += (ia as f32 + 1.0 - xa) * weight;
    for c in &mut coverage[ia + 1..ib] {
        *c += weight;
    }
    if ib < coverage.len() {
        coverage[ib] += (xb - ib as f32) * weight;
    }
    true
}

/// Box widths for `passes` box blurs approximating a Gaussian of `sigma`.
fn box_radii(sigma: f32, passes: usize) -> Vec<usize> {
    let n = passes as f32;
    let ideal = (12.0 * sigma * sigma / n + 1.0).sqrt();
    let mut lower = ideal.floor() as i64;
    if lower % 2 == 0 {
        lower -= 1;
    }
    let lower = lower.max(1);
    let upper = lower + 2;
    let lw = lower as f32;
    let m = ((12.0 * sigma * sigma - n * lw * lw - 4.0 * n * lw - 3.0 * n) / (-4.0 * lw - 4.0))
        .round()
        .clamp(0.0, n) as usize;
    (0..passes)
        .map(|i| {
            let width = if i < m { lower } else { upper };
            ((width - 1) / 2) as usize
        })
        .collect()
}

/// One box-blur pass over a strided line, transparent beyond the ends.
fn box_blur_line(
    buf: &mut [Px],
    line: &mut Vec<Px>,
    start: usize,
    stride: usize,
    len: usize,
    r: usize,
) {
    if r == 0 || len == 0 {
        return;
    }
    line.clear();
    line.extend((0..len).map(|i| buf[start + i * stride]));
    let norm = 1.0 / (2 * r + 1) as f32;
    let mut acc = CLEAR;
    for p in line.iter().take(r.min(len)) {
        for c in 0..4 {
            acc[c] += p[c];
        }
    }
    for i in 0..len {
        if i + r < len {
            for c in 0..4 {
                acc[c] += line[i + r][c];
            }
        }
        if i > r {
            for c in 0..4 {
                acc[c] -= line[i - r - 1][c];
            }
        }
        buf[start + i * stride] = [
            (acc[0] * norm).max(0.0),
            (acc[1] * norm).max(0.0),
            (acc[2] * norm).max(0.0),
            (acc[3] * norm).clamp(0.0, 1.0),
        ];
    }
}

/// Separable Gaussian approximation over a `w` x `h` buffer.
fn gaussian_blur(buf: &mut [Px], line: &mut Vec<Px>, w: u32, h: u32, sigma: f32) {
    if sigma <= 0.0 || w == 0 || h == 0 {
        return;
    }
    let (w, h) = (w as usize, h as usize);
    for r in box_radii(sigma, BLUR_PASSES) {
        for y in 0..h {
            box_blur_line(buf, line, y * w, 1, w, r);
        }
        for x in 0..w {
            box_blur_line(buf, line, x, w, h, r);
        }
    }
}

impl Canvas for Surface {
    fn size(&self) -> Viewport {
        Viewport::new(self.width, self.height)
    }

    fn resize(&mut self, viewport: Viewport) -> Result<(), SurfaceError> {
        if viewport.area() > MAX_PIXELS {
            return Err(SurfaceError::TooLarge {
                width: viewport.width,
                height: viewport.height,
            });
        }
        self.width = viewport.width;
        self.height = viewport.height;
        self.pixels.clear();
        self.pixels.resize(viewport.area() as usize, CLEAR);
        self.layer.clear();
        Ok(())
    }

    fn clear(&mut self) {
        self.pixels.iter_mut().for_each(|p| *p = CLEAR);
    }

    fn fill(&mut self, color: Rgba) {
        let src = premultiply(color);
        for p in &mut self.pixels {
            blend_px(p, src, Blend::SourceOver);
        }
    }

    fn fill_path(&mut self, path: &Path, paint: &Gradient, blur: f32) {
        if self.width == 0 || self.height == 0 {
            return;
        }
        let polygons = crate::path::flatten(path, FLATTEN_TOLERANCE);
        if blur <= 0.0 {
            Self::fill_polygons(
                &mut self.pixels,
                self.width,
                self.height,
                &polygons,
                paint,
                0.0,
                1.0,
            );
            return;
        }
        let Some(bounds) = crate::path::bounds(&polygons) else {
            return;
        };

        let factor = ((blur / BLUR_SIGMA_PER_SCALE).floor() as u32).clamp(1, MAX_LAYER_SCALE);
        let inv = 1.0 / factor as f32;
        let sigma = blur * inv;
        let radii = box_radii(sigma, BLUR_PASSES);
        // Pad by the combined box reach, capped at three standard deviations.
        let reach = (radii.iter().sum::<usize>() + 1) as f32 * factor as f32;
        let pad = reach.min((3.0 * blur).ceil() + factor as f32);

        let x0 = (bounds.min.x - pad).floor().max(0.0) as u32;
        let y0 = (bounds.min.y - pad).floor().max(0.0) as u32;
        let x1 = ((bounds.max.x + pad).ceil().max(0.0) as u32).min(self.width);
        let y1 = ((bounds.max.y + pad).ceil().max(0.0) as u32).min(self.height);
        if x0 >= x1 || y0 >= y1 {
            return;
        }
        let lw = (x1 - x0).div_ceil(factor);
        let lh = (y1 - y0).div_ceil(factor);
        let scaled: Vec<Vec<Point>> = polygons
            .iter()
            .map(|poly| {
                poly.iter()
                    .map(|p| point((p.x - x0 as f32) * inv, (p.y - y0 as f32) * inv))
                    .collect()
            })
            .collect();

        self.layer.clear();
        self.layer.resize((lw * lh) as usize, CLEAR);
        Self::fill_polygons(
            &mut self.layer,
            lw,
            lh,
            &scaled,
            paint,
            y0 as f32,
            factor as f32,
        );
        gaussian_blur(&mut self.layer, &mut self.line, lw, lh, sigma);
        self.composite_layer((x0, y0), lw, lh, factor);
    }

    fn fill_rect(&mut self, rect: Rect, paint: &Gradient, blend: Blend) {
        let mut rect = rect;
        if paint.fades_out()
            && let Gradient::Radial { cx, cy, radius, .. } = *paint
        {
            // Beyond the radius the gradient is transparent.
            let x0 = rect.x.max(cx - radius);
            let y0 = rect.y.max(cy - radius);
            let x1 = (rect.x + rect.width).min(cx + radius);
            let y1 = (rect.y + rect.height).min(cy + radius);
            rect = Rect::new(x0, y0, x1 - x0, y1 - y0);
        }
        if rect.width <= 0.0 || rect.height <= 0.0 {
            return;
        }
        let x_start = rect.x.floor().max(0.0) as u32;
        let y_start = rect.y.floor().max(0.0) as u32;
        let x_end = ((rect.x + rect.width).ceil().max(0.0) as u32).min(self.width);
        let y_end = ((rect.y + rect.height).ceil().max(0.0) as u32).min(self.height);

        for y in y_start..y_end {
            let cy = y as f32 + 0.5;
            for x in x_start..x_end {
                let cx = x as f32 + 0.5;
                let src = premultiply(paint.color_at(cx, cy));
                if src[3] > 0.0 {
                    blend_px(&mut self.pixels[(y * self.width + x) as usize], src, blend);
                }
            }
        }
    }

    fn fill_circle(&mut self, cx: f32, cy: f32, radius: f32, color: Rgba) {
        if radius <= 0.0 || color.a <= 0.0 {
            return;
        }
        let reach = radius + 0.5;
        let x_start = (cx - reach).floor().max(0.0) as u32;
        let y_start = (cy - reach).floor().max(0.0) as u32;
        let x_end = ((cx + reach).ceil().max(0.0) as u32).min(self.width);
        let y_end = ((cy + reach).ceil().max(0.0) as u32).min(self.height);
        let src = premultiply(color);
        // Small circles cover less than one pixel even at their center.
        let peak = (std::f32::consts::PI * radius * radius).min(1.0);

        for y in y_start..y_end {
            for x in x_start..x_end {
                let d = ((x as f32 + 0.5 - cx).powi(2) + (y as f32 + 0.5 - cy).powi(2)).sqrt();
                let coverage = (radius + 0.5 - d).clamp(0.0, 1.0).min(peak);
                if coverage > 0.0 {
                    let idx = (y * self.width + x) as usize;
                    blend_px(&mut self.pixels[idx], scale(src, coverage), Blend::SourceOver);
                }
            }
        }
    }
}
