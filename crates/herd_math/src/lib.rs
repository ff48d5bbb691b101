//! # herd_math - Steering Math
//!
//! Small, allocation-free math primitives for the steering core.
//! Every operation that would divide by a length is guarded so degenerate
//! inputs produce zero instead of NaN.

pub mod ray;
pub mod vector;

pub use ray::*;
pub use vector::*;

/// Common math constants
pub mod consts {
    pub const PI: f32 = core::f32::consts::PI;
    pub const TAU: f32 = PI * 2.0;
    /// Squared length below which a vector is treated as zero for normalization
    pub const NORMALIZE_EPSILON_SQ: f32 = 1e-10;
}

/// Interpolate between two angles (radians) along the shortest arc.
///
/// `lerp_angle(a, b, 1.0)` lands on an angle equivalent to `b`, never on the
/// long way round.
#[inline]
pub fn lerp_angle(from: f32, to: f32, t: f32) -> f32 {
    let difference = (to - from) % consts::TAU;
    let distance = (2.0 * difference) % consts::TAU - difference;
    from + distance * t
}

/// Wrap an angle into `[-PI, PI)`
#[inline]
pub fn wrap_angle(angle: f32) -> f32 {
    (angle + consts::PI).rem_euclid(consts::TAU) - consts::PI
}

pub mod prelude {
    pub use crate::ray::Ray;
    pub use crate::vector::Vec3;
    pub use crate::{lerp_angle, wrap_angle};
}
