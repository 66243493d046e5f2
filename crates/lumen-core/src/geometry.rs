//! Viewport and pointer coordinates.

/// Size of the drawing surface in pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    /// Construct a new viewport.
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Total pixel count, widened so large viewports cannot overflow.
    pub const fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Whether either dimension is zero.
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn width_f32(&self) -> f32 {
        self.width as f32
    }

    pub fn height_f32(&self) -> f32 {
        self.height as f32
    }
}

/// Last known pointer position in viewport coordinates.
///
/// Defaults to the origin until the first pointer move is observed.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Pointer {
    pub x: f32,
    pub y: f32,
}

impl Pointer {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance from the pointer to `(x, y)`.
    pub fn distance_to(&self, x: f32, y: f32) -> f32 {
        let dx = self.x - x;
        let dy = self.y - y;
        (dx * dx + dy * dy).sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_viewport_area() {
        assert_eq!(Viewport::new(1600, 900).area(), 1_440_000);
        assert_eq!(Viewport::new(u32::MAX, 2).area(), u32::MAX as u64 * 2);
        assert!(Viewport::new(0, 900).is_empty());
        assert!(!Viewport::new(1, 1).is_empty());
    }

    #[test]
    fn test_pointer_defaults_to_origin() {
        assert_eq!(Pointer::default(), Pointer::new(0.0, 0.0));
    }

    #[test]
    fn test_pointer_distance() {
        let p = Pointer::new(3.0, 4.0);
        assert!((p.distance_to(0.0, 0.0) - 5.0).abs() < 1e-6);
        assert_eq!(p.distance_to(3.0, 4.0), 0.0);
    }
}
