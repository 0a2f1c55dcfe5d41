//! Coordinate space markers.
//!
//! Scene annotations arrive in pixels; training examples store boxes as
//! fractions of the camera frame. These zero-sized types keep the two apart.

use std::fmt;

/// Absolute pixel positions in the rendered frame, origin top-left.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pixel {}

/// Positions divided by the camera frame size, nominally within `0.0..=1.0`.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub enum Normalized {}

impl fmt::Debug for Pixel {
    fn fmt(&self, _: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {}
    }
}

impl fmt::Debug for Normalized {
    fn fmt(&self, _: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {}
    }
}
