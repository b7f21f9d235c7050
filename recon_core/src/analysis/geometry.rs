//! Scene coordinates.
//!
//! The scene is a local plane in meters: `x` points east, `y` points north,
//! `z` is height above the road. Headings are compass bearings in degrees
//! (0° = north / +y, 90° = east / +x).

use serde::{Deserialize, Serialize};
use std::ops::{Add, Sub};

use crate::units::Degrees;

/// A point on the scene plan, optionally with height.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SpatialPoint {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub z: f64,
}

impl SpatialPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y, z: 0.0 }
    }

    pub fn with_height(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Horizontal (plan) distance, ignoring height.
    pub fn distance_to(&self, other: &SpatialPoint) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    /// Plan midpoint; height is averaged too.
    pub fn midpoint(&self, other: &SpatialPoint) -> SpatialPoint {
        SpatialPoint::with_height(
            (self.x + other.x) / 2.0,
            (self.y + other.y) / 2.0,
            (self.z + other.z) / 2.0,
        )
    }

    pub fn scale(&self, factor: f64) -> SpatialPoint {
        SpatialPoint::with_height(self.x * factor, self.y * factor, self.z * factor)
    }

    /// Move `distance` meters along a compass heading (height unchanged).
    pub fn offset_along(&self, heading: Degrees, distance: f64) -> SpatialPoint {
        let (ux, uy) = heading_unit(heading);
        SpatialPoint::with_height(self.x + ux * distance, self.y + uy * distance, self.z)
    }

    /// Linear interpolation, `t` = 0 at `self`, 1 at `other`.
    pub fn lerp(&self, other: &SpatialPoint, t: f64) -> SpatialPoint {
        *self + (*other - *self).scale(t)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl Add for SpatialPoint {
    type Output = SpatialPoint;
    fn add(self, rhs: SpatialPoint) -> SpatialPoint {
        SpatialPoint::with_height(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for SpatialPoint {
    type Output = SpatialPoint;
    fn sub(self, rhs: SpatialPoint) -> SpatialPoint {
        SpatialPoint::with_height(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

/// Unit plan vector `(east, north)` for a compass heading.
pub fn heading_unit(heading: Degrees) -> (f64, f64) {
    let theta = heading.to_radians();
    (theta.sin(), theta.cos())
}

/// A timed sample along a trajectory.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrajectorySample {
    /// Seconds relative to impact (negative before, positive after)
    pub t: f64,
    pub position: SpatialPoint,
    pub speed_kmh: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heading_convention() {
        let (ex, ny) = heading_unit(Degrees(0.0));
        assert!(ex.abs() < 1e-12 && (ny - 1.0).abs() < 1e-12);

        let (ex, ny) = heading_unit(Degrees(90.0));
        assert!((ex - 1.0).abs() < 1e-12 && ny.abs() < 1e-12);
    }

    #[test]
    fn test_offset_and_distance() {
        let origin = SpatialPoint::new(1.0, 1.0);
        let moved = origin.offset_along(Degrees(180.0), 5.0);
        assert!((moved.y + 4.0).abs() < 1e-9);
        assert!((origin.distance_to(&moved) - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_lerp_and_midpoint() {
        let a = SpatialPoint::new(0.0, 0.0);
        let b = SpatialPoint::with_height(10.0, 4.0, 2.0);
        assert_eq!(a.lerp(&b, 0.5), a.midpoint(&b));
        assert_eq!(a.lerp(&b, 1.0), b);
    }

    #[test]
    fn test_height_defaults_to_zero() {
        let p: SpatialPoint = serde_json::from_str(r#"{ "x": 3.0, "y": 4.0 }"#).unwrap();
        assert_eq!(p.z, 0.0);
    }
}
