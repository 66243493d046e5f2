//! Terminal presentation of a [`Surface`].
//!
//! Each terminal cell shows two vertically stacked pixel blocks through the
//! upper half block glyph: the top block becomes the foreground color and
//! the bottom block the background color.

use lumen_core::{BACKGROUND, Pointer, Rgba, Viewport};
use ratatui::{buffer::Buffer, layout::Rect, style::Color, widgets::Widget};

use crate::raster::Surface;

/// Glyph whose upper half is foreground and lower half background.
const UPPER_HALF: &str = "▀";

/// Maps terminal cells to surface pixels.
///
/// One cell spans `cell_pixels` surface pixels horizontally and twice that
/// vertically (two half-cell blocks), so blocks stay square for typical
/// terminal fonts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellMapping {
    cell_pixels: u32,
}

impl CellMapping {
    pub fn new(cell_pixels: u32) -> Self {
        Self {
            cell_pixels: cell_pixels.max(1),
        }
    }

    pub fn cell_pixels(&self) -> u32 {
        self.cell_pixels
    }

    /// Surface size needed to cover `columns` x `rows` cells.
    pub fn viewport(&self, columns: u16, rows: u16) -> Viewport {
        Viewport::new(
            columns as u32 * self.cell_pixels,
            rows as u32 * 2 * self.cell_pixels,
        )
    }

    /// Pointer position at the center of a cell.
    pub fn pointer(&self, column: u16, row: u16) -> Pointer {
        let px = self.cell_pixels as f32;
        Pointer::new(
            column as f32 * px + px / 2.0,
            row as f32 * 2.0 * px + px,
        )
    }
}

/// Widget drawing a surface into a ratatui buffer with half blocks.
#[derive(Debug, Clone, Copy)]
pub struct HalfBlockView<'a> {
    surface: &'a Surface,
    mapping: CellMapping,
}

impl<'a> HalfBlockView<'a> {
    pub fn new(surface: &'a Surface, mapping: CellMapping) -> Self {
        Self { surface, mapping }
    }

    /// Average color of one half-cell block, composited over the scene
    /// background so partially covered blocks stay visible.
    fn block_color(&self, column: u16, half_row: u32) -> Color {
        let px = self.mapping.cell_pixels;
        let x0 = column as u32 * px;
        let y0 = half_row * px;
        let c = self.surface.average(x0, y0, x0 + px, y0 + px);
        Color::from(over_background(c))
    }
}

fn over_background(c: Rgba) -> Rgba {
    let inv = 1.0 - c.a;
    Rgba::new(
        c.r * c.a + BACKGROUND.r * inv,
        c.g * c.a + BACKGROUND.g * inv,
        c.b * c.a + BACKGROUND.b * inv,
        1.0,
    )
}

impl Widget for HalfBlockView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        for row in 0..area.height {
            for column in 0..area.width {
                let top = self.block_color(column, row as u32 * 2);
                let bottom = self.block_color(column, row as u32 * 2 + 1);
                if let Some(cell) = buf.cell_mut((area.x + column, area.y + row)) {
                    cell.set_symbol(UPPER_HALF).set_fg(top).set_bg(bottom);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::Canvas;

    #[test]
    fn test_viewport_mapping() {
        let mapping = CellMapping::new(8);
        assert_eq!(mapping.viewport(200, 50), Viewport::new(1600, 800));
        assert_eq!(mapping.viewport(0, 0), Viewport::new(0, 0));
    }

    #[test]
    fn test_pointer_mapping() {
        let mapping = CellMapping::new(8);
        assert_eq!(mapping.pointer(0, 0), Pointer::new(4.0, 8.0));
        assert_eq!(mapping.pointer(10, 3), Pointer::new(84.0, 56.0));
    }

    #[test]
    fn test_zero_cell_pixels_is_clamped() {
        assert_eq!(CellMapping::new(0).cell_pixels(), 1);
    }

    #[test]
    fn test_render_half_blocks() {
        let mapping = CellMapping::new(2);
        let mut surface = Surface::new(4, 8).unwrap();
        surface.fill(Rgba::rgb(255, 0, 0));
        // Paint the bottom half of the first cell's area white.
        surface.fill_circle(1.0, 3.0, 0.9, Rgba::WHITE);

        let area = Rect::new(0, 0, 2, 2);
        let mut buf = Buffer::empty(area);
        HalfBlockView::new(&surface, mapping).render(area, &mut buf);

        let cell = &buf[(1, 1)];
        assert_eq!(cell.symbol(), UPPER_HALF);
        assert_eq!(cell.fg, Color::Rgb(255, 0, 0));
        assert_eq!(cell.bg, Color::Rgb(255, 0, 0));

        let lit = &buf[(0, 0)];
        assert_eq!(lit.fg, Color::Rgb(255, 0, 0));
        assert_ne!(lit.bg, Color::Rgb(255, 0, 0));
    }

    #[test]
    fn test_transparent_surface_shows_background() {
        let surface = Surface::new(2, 4).unwrap();
        let area = Rect::new(0, 0, 1, 1);
        let mut buf = Buffer::empty(area);
        HalfBlockView::new(&surface, CellMapping::new(2)).render(area, &mut buf);
        assert_eq!(buf[(0, 0)].fg, Color::from(BACKGROUND));
    }
}
