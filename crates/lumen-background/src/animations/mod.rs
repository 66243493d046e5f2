//! Stateful background animations.

pub mod aurora;
pub mod stars;
