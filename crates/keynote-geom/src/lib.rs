//! Planar geometry helpers for viewport containment tests.
//!
//! Everything here is pure and allocation-free; the containment test is the
//! hot inner loop of sheet processing (markers × viewports).

mod bounds;
mod polygon;

pub use bounds::BoundingBox;
pub use polygon::{centroid, point_in_polygon};

/// A point in shared model space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}
