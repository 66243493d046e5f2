//! Polygon extraction from lyon paths.
//!
//! Outlines are built with [`lyon::path::Path`]; the rasterizer only needs
//! them as closed polygons, which lyon's flattening iterator provides.

use lyon::math::{Box2D, Point};
use lyon::path::iterator::PathIterator;
use lyon::path::{Path, PathEvent};

/// Flatten `path` into closed polygons.
///
/// Curves are approximated by line segments deviating at most `tolerance`
/// pixels from the curve. Every sub-path is implicitly closed, which is what
/// filling requires anyway. Sub-paths enclosing no area are dropped.
pub fn flatten(path: &Path, tolerance: f32) -> Vec<Vec<Point>> {
    let mut polygons = Vec::new();
    let mut current = Vec::new();
    for event in path.iter().flattened(tolerance.max(0.01)) {
        match event {
            PathEvent::Begin { at } => {
                current.clear();
                current.push(at);
            }
            PathEvent::Line { to, .. }
            | PathEvent::Quadratic { to, .. }
            | PathEvent::Cubic { to, .. } => current.push(to),
            PathEvent::End { .. } => {
                if current.len() > 2 {
                    polygons.push(std::mem::take(&mut current));
                }
                current.clear();
            }
        }
    }
    polygons
}

/// Axis-aligned bounds of flattened polygons.
pub fn bounds(polygons: &[Vec<Point>]) -> Option<Box2D> {
    let mut points = polygons.iter().flatten();
    let first = *points.next()?;
    Some(points.fold(Box2D::new(first, first), |b, p| {
        Box2D::new(b.min.min(*p), b.max.max(*p))
    }))
}
