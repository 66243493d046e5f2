//! Animated aurora background rendering for lumen.
//!
//! This crate simulates a leftward-drifting, twinkling star field and a row
//! of pointer-reactive aurora control points, then paints both onto a
//! [`Canvas`]. [`Surface`] is the built-in software canvas, and
//! [`HalfBlockView`] presents a surface in a terminal through ratatui.
//!
//! [`BackgroundState`] ties the pieces together: it owns the simulation,
//! the canvas, and the single pending frame request, and stops drawing
//! entirely once [`BackgroundState::stop`] has been called.

pub mod animations;
mod canvas;
mod painter;
mod path;
mod present;
mod random;
mod raster;
mod scheduler;
mod state;

pub use canvas::{Blend, Canvas, ColorStop, Gradient, Rect};
pub use lyon::path::Path;
pub use painter::paint_frame;
pub use present::{CellMapping, HalfBlockView};
pub use random::RandomSource;
pub use raster::{MAX_PIXELS, Surface, SurfaceError};
pub use scheduler::{FrameHandle, FrameScheduler};
pub use state::{BackgroundState, HostEvent, Lifecycle};
