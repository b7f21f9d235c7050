//! # Unit Types
//!
//! Type-safe wrappers for the SI units used in accident reconstruction.
//! These provide compile-time safety against unit confusion (the classic
//! km/h vs m/s slip) while remaining lightweight (just f64 wrappers).
//!
//! ## Design Philosophy
//!
//! We use simple newtype wrappers rather than a full units library because:
//! - Reconstruction uses a small, fixed set of units
//! - We want JSON serialization to be clean (just numbers)
//! - Minimal runtime overhead
//!
//! ## Units
//!
//! - Length: meters (m)
//! - Time: seconds (s)
//! - Mass: kilograms (kg)
//! - Speed: kilometers per hour (km/h) for reporting, meters per second (m/s) for physics
//! - Energy: joules (J), kilojoules (kJ)
//! - Angle: degrees
//! - Area: square meters (m²)
//!
//! ## Example
//!
//! ```rust
//! use recon_core::units::{KilometersPerHour, MetersPerSecond};
//!
//! let speed = KilometersPerHour(72.0);
//! let si: MetersPerSecond = speed.into();
//! assert!((si.0 - 20.0).abs() < 1e-9);
//! ```

use serde::{Deserialize, Serialize};
use std::ops::{Add, Div, Mul, Sub};

/// km/h per m/s
pub const KMH_PER_MS: f64 = 3.6;

// ============================================================================
// Length / Time / Mass
// ============================================================================

/// Length in meters
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Meters(pub f64);

/// Time in seconds
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Seconds(pub f64);

/// Mass in kilograms
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Kilograms(pub f64);

// ============================================================================
// Speed
// ============================================================================

/// Speed in kilometers per hour
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KilometersPerHour(pub f64);

/// Speed in meters per second
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetersPerSecond(pub f64);

impl From<KilometersPerHour> for MetersPerSecond {
    fn from(kmh: KilometersPerHour) -> Self {
        MetersPerSecond(kmh.0 / KMH_PER_MS)
    }
}

/// Distance covered at constant speed
impl Mul<Seconds> for MetersPerSecond {
    type Output = Meters;
    fn mul(self, rhs: Seconds) -> Meters {
        Meters(self.0 * rhs.0)
    }
}

impl From<MetersPerSecond> for KilometersPerHour {
    fn from(ms: MetersPerSecond) -> Self {
        KilometersPerHour(ms.0 * KMH_PER_MS)
    }
}

// ============================================================================
// Energy
// ============================================================================

/// Energy in joules
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Joules(pub f64);

/// Energy in kilojoules
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Kilojoules(pub f64);

impl From<Joules> for Kilojoules {
    fn from(j: Joules) -> Self {
        Kilojoules(j.0 / 1000.0)
    }
}

/// Specific energy (J/kg)
impl Div<Kilograms> for Joules {
    type Output = f64;
    fn div(self, rhs: Kilograms) -> f64 {
        self.0 / rhs.0
    }
}

impl From<Kilojoules> for Joules {
    fn from(kj: Kilojoules) -> Self {
        Joules(kj.0 * 1000.0)
    }
}

// ============================================================================
// Angle / Area
// ============================================================================

/// Angle in degrees
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Degrees(pub f64);

impl Degrees {
    /// Convert to radians
    pub fn to_radians(self) -> f64 {
        self.0.to_radians()
    }
}

/// Area in square meters
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SquareMeters(pub f64);

// ============================================================================
// Unit tags for reported quantities
// ============================================================================

/// Unit tag attached to every reported [`Quantity`](crate::calculations::Quantity).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Unit {
    Meters,
    Seconds,
    Kilograms,
    KilometersPerHour,
    MetersPerSecond,
    Joules,
    Kilojoules,
    JoulesPerKilogram,
    Degrees,
    SquareMeters,
    Percent,
    /// Dimensionless (friction coefficient, confidence)
    Ratio,
}

impl Unit {
    /// Display symbol
    pub fn symbol(&self) -> &'static str {
        match self {
            Unit::Meters => "m",
            Unit::Seconds => "s",
            Unit::Kilograms => "kg",
            Unit::KilometersPerHour => "km/h",
            Unit::MetersPerSecond => "m/s",
            Unit::Joules => "J",
            Unit::Kilojoules => "kJ",
            Unit::JoulesPerKilogram => "J/kg",
            Unit::Degrees => "°",
            Unit::SquareMeters => "m²",
            Unit::Percent => "%",
            Unit::Ratio => "",
        }
    }
}

impl std::fmt::Display for Unit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

// ============================================================================
// Arithmetic Implementations (macro to reduce boilerplate)
// ============================================================================

macro_rules! impl_arithmetic {
    ($type:ty) => {
        impl Add for $type {
            type Output = Self;
            fn add(self, rhs: Self) -> Self::Output {
                Self(self.0 + rhs.0)
            }
        }

        impl Sub for $type {
            type Output = Self;
            fn sub(self, rhs: Self) -> Self::Output {
                Self(self.0 - rhs.0)
            }
        }

        impl Mul<f64> for $type {
            type Output = Self;
            fn mul(self, rhs: f64) -> Self::Output {
                Self(self.0 * rhs)
            }
        }

        impl Div<f64> for $type {
            type Output = Self;
            fn div(self, rhs: f64) -> Self::Output {
                Self(self.0 / rhs)
            }
        }

        impl $type {
            /// Get the raw f64 value
            pub fn value(self) -> f64 {
                self.0
            }

            /// Create from raw f64 value
            pub fn new(value: f64) -> Self {
                Self(value)
            }
        }
    };
}

impl_arithmetic!(Meters);
impl_arithmetic!(Seconds);
impl_arithmetic!(Kilograms);
impl_arithmetic!(KilometersPerHour);
impl_arithmetic!(MetersPerSecond);
impl_arithmetic!(Joules);
impl_arithmetic!(Kilojoules);
impl_arithmetic!(Degrees);
impl_arithmetic!(SquareMeters);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kmh_to_ms() {
        let ms: MetersPerSecond = KilometersPerHour(36.0).into();
        assert!((ms.0 - 10.0).abs() < 1e-12);

        let back: KilometersPerHour = ms.into();
        assert!((back.0 - 36.0).abs() < 1e-12);
    }

    #[test]
    fn test_joules_to_kilojoules() {
        let kj: Kilojoules = Joules(166_666.7).into();
        assert!((kj.0 - 166.6667).abs() < 1e-9);
    }

    #[test]
    fn test_arithmetic() {
        let a = Meters(10.0);
        let b = Meters(5.0);
        assert_eq!((a + b).0, 15.0);
        assert_eq!((a - b).0, 5.0);
        assert_eq!((a * 2.0).0, 20.0);
        assert_eq!((a / 2.0).0, 5.0);
    }

    #[test]
    fn test_mixed_unit_products() {
        let d: Meters = MetersPerSecond(20.0) * Seconds(1.5);
        assert!((d.value() - 30.0).abs() < 1e-12);

        let per_kg = Joules(120_000.0) / Kilograms(1200.0);
        assert!((per_kg - 100.0).abs() < 1e-12);
    }

    #[test]
    fn test_unit_symbols() {
        assert_eq!(Unit::KilometersPerHour.symbol(), "km/h");
        assert_eq!(Unit::Kilojoules.to_string(), "kJ");
    }

    #[test]
    fn test_serialization() {
        let d = Meters(25.0);
        let json = serde_json::to_string(&d).unwrap();
        assert_eq!(json, "25.0");

        let roundtrip: Meters = serde_json::from_str(&json).unwrap();
        assert_eq!(d, roundtrip);

        let unit_json = serde_json::to_string(&Unit::KilometersPerHour).unwrap();
        assert_eq!(unit_json, "\"kilometers_per_hour\"");
    }
}
