//! # Speed from Post-Collision Drag
//!
//! A vehicle knocked out of directional control slides, rotates and gouges
//! to rest. Its effective drag factor is far less predictable than a braking
//! μ, so the speed is evaluated over a band of drag factors and the
//! uncertainty follows from that spread rather than from a fixed percentage.
//!
//! ## Example
//!
//! ```rust
//! use recon_core::calculations::drag_speed::{calculate, DragSpeedInput};
//!
//! let result = calculate(&DragSpeedInput::new(12.0)).unwrap();
//! assert!(result.speed_min_kmh <= result.speed_mean_kmh);
//! assert!(result.speed_mean_kmh <= result.speed_max_kmh);
//! ```

use serde::{Deserialize, Serialize};

use super::{CalculationKind, CalculationResult, ErrorBand};
use crate::errors::{require_positive, CalcError, CalcResult};
use crate::formulas::{slide_speed, Formula};
use crate::units::{KilometersPerHour, MetersPerSecond, Unit};

/// Default drag-factor band (mean, min, max)
pub const DEFAULT_DRAG_MU: DragFriction = DragFriction {
    mean: 0.65,
    min: 0.50,
    max: 0.80,
};

/// A drag-factor band.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DragFriction {
    pub mean: f64,
    pub min: f64,
    pub max: f64,
}

impl Default for DragFriction {
    fn default() -> Self {
        DEFAULT_DRAG_MU
    }
}

impl DragFriction {
    /// Validate that every value is in (0, 1] and min ≤ mean ≤ max.
    pub fn validate(&self) -> CalcResult<()> {
        for (field, value) in [("mu_min", self.min), ("mu_mean", self.mean), ("mu_max", self.max)] {
            if !(value > 0.0 && value <= 1.0) {
                return Err(CalcError::invalid_input(
                    field,
                    value.to_string(),
                    "Drag factor must be in (0, 1]",
                ));
            }
        }
        if self.min > self.mean || self.mean > self.max {
            return Err(CalcError::invalid_input(
                "mu",
                format!("{}/{}/{}", self.min, self.mean, self.max),
                "Drag factors must satisfy min <= mean <= max",
            ));
        }
        Ok(())
    }
}

/// Input parameters for a drag-speed estimate.
///
/// ## JSON Example
///
/// ```json
/// { "distance_m": 12.0, "friction": { "mean": 0.65, "min": 0.5, "max": 0.8 } }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DragSpeedInput {
    /// Drag length in meters
    pub distance_m: f64,
    /// Drag-factor band; defaults to 0.65 / 0.50 / 0.80
    #[serde(default)]
    pub friction: DragFriction,
}

impl DragSpeedInput {
    pub fn new(distance_m: f64) -> Self {
        Self {
            distance_m,
            friction: DragFriction::default(),
        }
    }

    pub fn with_friction(mut self, mean: f64, min: f64, max: f64) -> Self {
        self.friction = DragFriction { mean, min, max };
        self
    }

    /// Validate input parameters.
    pub fn validate(&self) -> CalcResult<()> {
        require_positive("distance_m", self.distance_m)?;
        self.friction.validate()
    }
}

/// Results from a drag-speed estimate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DragSpeedResult {
    pub distance_m: f64,
    pub friction: DragFriction,
    pub speed_mean_kmh: f64,
    pub speed_min_kmh: f64,
    pub speed_max_kmh: f64,
    pub speed_mean_ms: f64,
    /// Asymmetric band derived from the min/max speeds
    pub band: ErrorBand,
}

fn speed_kmh(mu: f64, distance_m: f64) -> f64 {
    KilometersPerHour::from(MetersPerSecond(slide_speed(mu, distance_m))).value()
}

/// Calculate the speed band at the start of a post-collision drag.
pub fn calculate(input: &DragSpeedInput) -> CalcResult<DragSpeedResult> {
    input.validate()?;

    let mu = input.friction;
    let speed_mean_kmh = speed_kmh(mu.mean, input.distance_m);
    let speed_min_kmh = speed_kmh(mu.min, input.distance_m);
    let speed_max_kmh = speed_kmh(mu.max, input.distance_m);

    Ok(DragSpeedResult {
        distance_m: input.distance_m,
        friction: mu,
        speed_mean_kmh,
        speed_min_kmh,
        speed_max_kmh,
        speed_mean_ms: slide_speed(mu.mean, input.distance_m),
        band: ErrorBand::from_range(speed_mean_kmh, speed_min_kmh, speed_max_kmh, Unit::KilometersPerHour),
    })
}

impl From<&DragSpeedResult> for CalculationResult {
    fn from(result: &DragSpeedResult) -> Self {
        CalculationResult::new(CalculationKind::DragSpeed, Formula::DragSpeed)
            .with_output("speed_mean_kmh", result.speed_mean_kmh, Unit::KilometersPerHour)
            .with_output("speed_min_kmh", result.speed_min_kmh, Unit::KilometersPerHour)
            .with_output("speed_max_kmh", result.speed_max_kmh, Unit::KilometersPerHour)
            .with_output("distance_m", result.distance_m, Unit::Meters)
            .with_band(result.band)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let result = calculate(&DragSpeedInput::new(10.0)).unwrap();
        assert_eq!(result.friction, DEFAULT_DRAG_MU);
        // √(2 · 0.65 · 9.81 · 10) = 11.29 m/s = 40.65 km/h
        assert!((result.speed_mean_kmh - 40.65).abs() < 0.05);
    }

    #[test]
    fn test_ordering_holds_for_any_distance() {
        for d in [0.1, 1.0, 7.5, 30.0, 120.0] {
            let r = calculate(&DragSpeedInput::new(d)).unwrap();
            assert!(r.speed_min_kmh <= r.speed_mean_kmh);
            assert!(r.speed_mean_kmh <= r.speed_max_kmh);
        }
    }

    #[test]
    fn test_band_is_derived_from_spread() {
        let r = calculate(&DragSpeedInput::new(20.0)).unwrap();
        // √(0.5/0.65) and √(0.8/0.65) give -12.3% / +10.9%
        assert!((r.band.minus_percent - 12.29).abs() < 0.05);
        assert!((r.band.plus_percent - 10.94).abs() < 0.05);
        assert!(!r.band.is_symmetric());
        assert_eq!(r.band.min, r.speed_min_kmh);
        assert_eq!(r.band.max, r.speed_max_kmh);
    }

    #[test]
    fn test_custom_friction() {
        let r = calculate(&DragSpeedInput::new(20.0).with_friction(0.4, 0.4, 0.4)).unwrap();
        assert_eq!(r.speed_min_kmh, r.speed_max_kmh);
        assert!(r.band.minus_percent.abs() < 1e-9);
    }

    #[test]
    fn test_invalid_inputs() {
        assert!(calculate(&DragSpeedInput::new(0.0)).is_err());
        assert!(calculate(&DragSpeedInput::new(-1.0)).is_err());
        assert!(calculate(&DragSpeedInput::new(5.0).with_friction(0.5, 0.6, 0.8)).is_err());
        assert!(calculate(&DragSpeedInput::new(5.0).with_friction(0.65, 0.5, 1.2)).is_err());
    }

    #[test]
    fn test_friction_defaults_when_omitted_from_json() {
        let input: DragSpeedInput = serde_json::from_str(r#"{ "distance_m": 8.0 }"#).unwrap();
        assert_eq!(input.friction, DEFAULT_DRAG_MU);
    }
}
