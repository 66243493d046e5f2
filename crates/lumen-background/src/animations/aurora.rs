//! Undulating aurora bands (stateful).
//!
//! The aurora silhouette is sampled by a handful of control points spread
//! evenly across the width. Each point bobs on its own sine wave and is
//! pulled by the pointer; the painter connects adjacent points with
//! midpoint quadratic curves and fills several offset, blurred layers.

use std::f32::consts::TAU;

use lumen_core::{Pointer, Rgba, Viewport};
use lyon::math::point;
use lyon::path::Path;

use crate::random::RandomSource;

/// Number of control points across the width.
pub const POINT_COUNT: usize = 6;

/// Rest height as a fraction of the viewport height.
pub const BASE_LEVEL: f32 = 0.4;

/// Radius within which the pointer pulls control points.
pub const POINTER_RADIUS: f32 = 300.0;

/// Displacement applied by the pointer at zero distance.
pub const POINTER_FORCE: f32 = 80.0;

/// Fraction of the remaining distance to the target covered each frame.
pub const EASING: f32 = 0.05;

/// State for a single aurora control point.
#[derive(Debug, Clone, PartialEq)]
pub struct AuroraPoint {
    /// Fixed horizontal position.
    pub x: f32,
    /// Current vertical position.
    pub y: f32,
    /// Rest vertical position.
    pub base_y: f32,
    pub phase: f32,
    pub amplitude: f32,
    /// Phase advance per frame.
    pub speed: f32,
}

impl AuroraPoint {
    /// Where the point is heading this frame: its wave height plus the
    /// pointer's pull.
    ///
    /// A pointer above the point lifts it with full force; a pointer below
    /// pushes it down at half force.
    pub fn target_y(&self, pointer: Pointer) -> f32 {
        let mut target = self.base_y + self.phase.sin() * self.amplitude;
        let dist = pointer.distance_to(self.x, self.y);
        if dist < POINTER_RADIUS {
            let force = (1.0 - dist / POINTER_RADIUS) * POINTER_FORCE;
            target += if pointer.y < self.y { -force } else { force * 0.5 };
        }
        target
    }

    /// Ease `y` toward `target` by [`EASING`].
    pub fn ease_toward(&mut self, target: f32) {
        self.y += (target - self.y) * EASING;
    }
}

/// Initialize control points for the given dimensions.
pub fn init_points<R: RandomSource + ?Sized>(
    viewport: Viewport,
    rng: &mut R,
) -> Vec<AuroraPoint> {
    let spacing = viewport.width_f32() / (POINT_COUNT - 1) as f32;
    let base_y = viewport.height_f32() * BASE_LEVEL;
    (0..POINT_COUNT)
        .map(|i| AuroraPoint {
            x: spacing * i as f32,
            y: base_y,
            base_y,
            phase: (i as f32 / POINT_COUNT as f32) * TAU,
            amplitude: rng.range(50.0, 80.0),
            speed: rng.range(0.01, 0.02),
        })
        .collect()
}

/// Advance every control point by one frame.
pub fn update_points(points: &mut [AuroraPoint], pointer: Pointer) {
    for point in points {
        point.phase += point.speed;
        let target = point.target_y(pointer);
        point.ease_toward(target);
    }
}

/// Visual configuration of one aurora layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AuroraLayer {
    /// Color at the top of the layer's gradient.
    pub color: Rgba,
    /// Vertical shift applied to every control point.
    pub offset_y: f32,
    /// Blur standard deviation in pixels.
    pub blur: f32,
}

/// Layers painted back to front.
pub const LAYERS: [AuroraLayer; 4] = [
    AuroraLayer {
        color: Rgba::rgba(200, 180, 255, 0.15),
        offset_y: 0.0,
        blur: 60.0,
    },
    AuroraLayer {
        color: Rgba::rgba(180, 160, 255, 0.12),
        offset_y: 30.0,
        blur: 80.0,
    },
    AuroraLayer {
        color: Rgba::rgba(160, 140, 255, 0.1),
        offset_y: 60.0,
        blur: 100.0,
    },
    AuroraLayer {
        color: Rgba::rgba(220, 200, 255, 0.08),
        offset_y: -30.0,
        blur: 120.0,
    },
];

/// Closed outline of one layer: from the bottom-left corner up to the
/// first point, along a smoothed curve through all points, then down the
/// right edge and back.
///
/// Each curve segment uses the data point as its control point and ends at
/// the midpoint to the next point, which keeps the outline smooth without
/// overshooting. Returns an empty path when there are no points.
pub fn layer_path(points: &[AuroraPoint], offset_y: f32, viewport: Viewport) -> Path {
    let (Some(first), Some(last)) = (points.first(), points.last()) else {
        return Path::new();
    };
    let width = viewport.width_f32();
    let height = viewport.height_f32();

    let mut builder = Path::builder();
    builder.begin(point(0.0, height));
    builder.line_to(point(0.0, first.y + offset_y));
    for pair in points.windows(2) {
        let a = point(pair[0].x, pair[0].y + offset_y);
        let b = point(pair[1].x, pair[1].y + offset_y);
        builder.quadratic_bezier_to(a, a.lerp(b, 0.5));
    }
    builder.line_to(point(width, last.y + offset_y));
    builder.line_to(point(width, height));
    builder.end(true);
    builder.build()
}
