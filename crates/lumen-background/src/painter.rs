//! Frame compositing.

use lumen_core::{BACKGROUND, Pointer, Rgba, Viewport};

use crate::animations::aurora::{self, AuroraPoint};
use crate::animations::stars::Star;
use crate::canvas::{Blend, Canvas, Gradient, Rect};

/// Radius of the glow that follows the pointer.
pub const POINTER_GLOW_RADIUS: f32 = 200.0;

/// Tint of star halos.
const HALO_TINT: Rgba = Rgba::rgba(200, 180, 255, 1.0);

/// Paint one frame from already-updated state.
///
/// Order matters: background, aurora layers back to front, the additive
/// pointer glow, and finally the stars on top.
pub fn paint_frame<C: Canvas + ?Sized>(
    canvas: &mut C,
    viewport: Viewport,
    stars: &[Star],
    points: &[AuroraPoint],
    pointer: Pointer,
) {
    canvas.clear();
    canvas.fill(BACKGROUND);
    paint_aurora(canvas, viewport, points);
    paint_pointer_glow(canvas, viewport, pointer);
    paint_stars(canvas, stars);
}

fn paint_aurora<C: Canvas + ?Sized>(canvas: &mut C, viewport: Viewport, points: &[AuroraPoint]) {
    if points.is_empty() {
        return;
    }
    let height = viewport.height_f32();
    for layer in &aurora::LAYERS {
        let path = aurora::layer_path(points, layer.offset_y, viewport);
        let paint = Gradient::vertical(0.0, height, layer.color, Rgba::TRANSPARENT);
        canvas.fill_path(&path, &paint, layer.blur);
    }
}

fn paint_pointer_glow<C: Canvas + ?Sized>(canvas: &mut C, viewport: Viewport, pointer: Pointer) {
    let glow = Gradient::radial(
        pointer.x,
        pointer.y,
        POINTER_GLOW_RADIUS,
        &[
            (0.0, Rgba::rgba(200, 180, 255, 0.15)),
            (0.5, Rgba::rgba(180, 160, 255, 0.05)),
            (1.0, Rgba::TRANSPARENT),
        ],
    );
    canvas.fill_rect(Rect::from_viewport(viewport), &glow, Blend::Additive);
}

fn paint_stars<C: Canvas + ?Sized>(canvas: &mut C, stars: &[Star]) {
    for star in stars {
        canvas.fill_circle(star.x, star.y, star.size, Rgba::WHITE.with_alpha(star.opacity));

        if star.has_halo() {
            let radius = star.halo_radius();
            let halo = Gradient::radial(
                star.x,
                star.y,
                radius,
                &[
                    (0.0, HALO_TINT.with_alpha(star.glow_opacity * 0.5)),
                    (1.0, Rgba::TRANSPARENT),
                ],
            );
            canvas.fill_rect(Rect::around(star.x, star.y, radius), &halo, Blend::SourceOver);
        }
    }
}
