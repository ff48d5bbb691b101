//! 3D ray for picking
//!
//! Used to turn a screen-space pointer into a point on a horizontal plane,
//! which is how a user drags a target around.

use crate::vector::Vec3;

/// Below this vertical direction component a ray counts as parallel to a
/// horizontal plane
const PARALLEL_EPSILON: f32 = 1e-5;

/// 3D ray
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray {
    /// Ray origin point
    pub origin: Vec3,
    /// Ray direction (normalized)
    pub direction: Vec3,
}

impl Ray {
    /// Create a new ray with normalized direction
    #[inline]
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    /// Create a ray from two points
    #[inline]
    pub fn from_points(start: Vec3, end: Vec3) -> Self {
        Self::new(start, end - start)
    }

    /// Get a point at distance t along the ray
    #[inline]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Intersect with the horizontal plane at height `plane_y`.
    ///
    /// Returns `None` when the ray runs parallel to the plane or the plane is
    /// behind the origin.
    pub fn intersect_horizontal_plane(&self, plane_y: f32) -> Option<Vec3> {
        if self.direction.y.abs() < PARALLEL_EPSILON {
            return None;
        }

        let t = (plane_y - self.origin.y) / self.direction.y;
        if t < 0.0 {
            return None;
        }

        // snap exactly onto the plane to avoid drift
        Some(self.at(t).with_y(plane_y))
    }
}
