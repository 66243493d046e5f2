//! Core types shared by the lumen crates.

mod color;
mod geometry;

pub use color::{BACKGROUND, Rgba};
pub use geometry::{Pointer, Viewport};
