//! Drifting, twinkling star field (stateful).

use std::f32::consts::TAU;

use lumen_core::{Pointer, Viewport};

use crate::random::RandomSource;

/// Viewport pixels per star.
pub const PIXELS_PER_STAR: u64 = 8000;

/// How far past the left edge a star travels before wrapping.
pub const WRAP_MARGIN: f32 = 10.0;

/// Radius within which the pointer brightens stars.
pub const POINTER_RADIUS: f32 = 150.0;

/// Opacity added by the pointer at zero distance.
pub const POINTER_BOOST: f32 = 0.5;

/// Stars larger than this get a halo.
pub const HALO_MIN_SIZE: f32 = 1.5;

/// State for a single star.
#[derive(Debug, Clone, PartialEq)]
pub struct Star {
    pub x: f32,
    pub y: f32,
    /// Radius in pixels.
    pub size: f32,
    /// Leftward drift per frame.
    pub speed: f32,
    /// Opacity before twinkle and pointer effects.
    pub base_opacity: f32,
    pub twinkle_phase: f32,
    pub twinkle_speed: f32,
    /// Current twinkle level in `0.0..=1.0`.
    pub twinkle: f32,
    /// Twinkle-modulated opacity without the pointer boost.
    pub glow_opacity: f32,
    /// Opacity the star is drawn with, in `0.0..=1.0`.
    pub opacity: f32,
}

impl Star {
    /// Whether this star is drawn with a halo.
    pub fn has_halo(&self) -> bool {
        self.size > HALO_MIN_SIZE
    }

    /// Radius of the halo gradient.
    pub fn halo_radius(&self) -> f32 {
        self.size * (2.0 + self.twinkle) * 2.0
    }

    /// Recompute twinkle and opacity from the current phase and pointer.
    fn refresh_brightness(&mut self, pointer: Pointer) {
        self.twinkle = twinkle_level(self.twinkle_phase);
        self.glow_opacity = self.base_opacity * (0.5 + self.twinkle * 0.5);
        let boost = pointer_boost(pointer.distance_to(self.x, self.y));
        self.opacity = (self.glow_opacity + boost).clamp(0.0, 1.0);
    }
}

/// Number of stars for a viewport.
pub fn star_count(viewport: Viewport) -> usize {
    (viewport.area() / PIXELS_PER_STAR) as usize
}

/// Map a twinkle phase to a level in `0.0..=1.0`.
pub fn twinkle_level(phase: f32) -> f32 {
    phase.sin() * 0.5 + 0.5
}

/// Opacity boost for a star at `distance` from the pointer.
pub fn pointer_boost(distance: f32) -> f32 {
    if distance < POINTER_RADIUS {
        (1.0 - distance / POINTER_RADIUS) * POINTER_BOOST
    } else {
        0.0
    }
}

/// Initialize the star field for the given dimensions.
pub fn init_stars<R: RandomSource + ?Sized>(viewport: Viewport, rng: &mut R) -> Vec<Star> {
    let width = viewport.width_f32();
    let height = viewport.height_f32();
    (0..star_count(viewport))
        .map(|_| {
            let mut star = Star {
                x: rng.range(0.0, width),
                y: rng.range(0.0, height),
                size: rng.range(0.5, 2.5),
                speed: rng.range(0.1, 0.4),
                base_opacity: rng.range(0.2, 1.0),
                twinkle_speed: rng.range(0.01, 0.03),
                twinkle_phase: rng.range(0.0, TAU),
                twinkle: 0.0,
                glow_opacity: 0.0,
                opacity: 0.0,
            };
            star.refresh_brightness(Pointer::default());
            star
        })
        .collect()
}

/// Advance every star by one frame.
pub fn update_stars<R: RandomSource + ?Sized>(
    stars: &mut [Star],
    viewport: Viewport,
    pointer: Pointer,
    rng: &mut R,
) {
    let width = viewport.width_f32();
    let height = viewport.height_f32();

    for star in stars {
        star.x -= star.speed;
        if star.x < -WRAP_MARGIN {
            star.x = width + WRAP_MARGIN;
            star.y = rng.range(0.0, height);
        }
        star.twinkle_phase += star.twinkle_speed;
        star.refresh_brightness(pointer);
    }
}
