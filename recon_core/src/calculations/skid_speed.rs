//! # Speed from Skid Marks
//!
//! Estimates the speed of a vehicle at the start of a braking skid that ends
//! at rest, from the skid length and the tire/road friction coefficient.
//!
//! ## Assumptions
//!
//! - The vehicle skids to rest (no impact during the skid)
//! - Level road surface
//! - Uniform friction along the skid
//! - A fixed ±10% band covers tire, suspension and surface variance that μ
//!   alone does not capture
//!
//! ## Example
//!
//! ```rust
//! use recon_core::calculations::skid_speed::{calculate, SkidSpeedInput};
//!
//! let input = SkidSpeedInput::new(25.0, "asphalt", "dry");
//! let result = calculate(&input).unwrap();
//!
//! assert_eq!(result.mu, 0.70);
//! assert!((result.speed_kmh - 66.7).abs() < 0.1);
//! ```

use serde::{Deserialize, Serialize};

use super::{CalculationKind, CalculationResult, ErrorBand};
use crate::errors::{require_positive, CalcResult};
use crate::formulas::{slide_speed, Formula};
use crate::reference::FrictionCoefficient;
use crate::units::{KilometersPerHour, MetersPerSecond, Unit};

/// Fixed uncertainty applied to skid-speed estimates (±%)
pub const SKID_SPEED_BAND_PERCENT: f64 = 10.0;

/// Input parameters for a skid-speed estimate.
///
/// ## JSON Example
///
/// ```json
/// { "distance_m": 25.0, "surface": "asphalt", "condition": "dry" }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkidSpeedInput {
    /// Skid length in meters
    pub distance_m: f64,
    /// Surface key or alias ("asphalt", "asfalto", "mud", ...)
    pub surface: String,
    /// Condition key or alias ("dry", "wet", "seco", ...)
    pub condition: String,
}

impl SkidSpeedInput {
    pub fn new(distance_m: f64, surface: impl Into<String>, condition: impl Into<String>) -> Self {
        Self {
            distance_m,
            surface: surface.into(),
            condition: condition.into(),
        }
    }

    /// Validate input parameters.
    pub fn validate(&self) -> CalcResult<()> {
        require_positive("distance_m", self.distance_m)
    }
}

/// Results from a skid-speed estimate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkidSpeedResult {
    /// Resolved friction coefficient
    pub friction: FrictionCoefficient,
    /// μ used (copied from `friction` for convenience)
    pub mu: f64,
    pub distance_m: f64,
    pub speed_ms: f64,
    pub speed_kmh: f64,
    /// ±10% band on the km/h figure
    pub band: ErrorBand,
}

/// Calculate the speed at the start of a skid.
///
/// # Returns
///
/// * `Ok(SkidSpeedResult)` - Speed in m/s and km/h with a ±10% band
/// * `Err(CalcError::InvalidInput)` - If the distance is not positive
/// * `Err(CalcError::UnknownSurface | UnknownCondition)` - If μ cannot be resolved
pub fn calculate(input: &SkidSpeedInput) -> CalcResult<SkidSpeedResult> {
    input.validate()?;

    let friction = FrictionCoefficient::lookup(&input.surface, &input.condition)?;
    let speed = MetersPerSecond(slide_speed(friction.mu, input.distance_m));
    let speed_kmh: KilometersPerHour = speed.into();

    Ok(SkidSpeedResult {
        mu: friction.mu,
        friction,
        distance_m: input.distance_m,
        speed_ms: speed.value(),
        speed_kmh: speed_kmh.value(),
        band: ErrorBand::symmetric(speed_kmh.value(), SKID_SPEED_BAND_PERCENT, Unit::KilometersPerHour),
    })
}

impl From<&SkidSpeedResult> for CalculationResult {
    fn from(result: &SkidSpeedResult) -> Self {
        CalculationResult::new(CalculationKind::SkidSpeed, Formula::SkidSpeed)
            .with_output("speed_kmh", result.speed_kmh, Unit::KilometersPerHour)
            .with_output("speed_ms", result.speed_ms, Unit::MetersPerSecond)
            .with_output("mu", result.mu, Unit::Ratio)
            .with_output("distance_m", result.distance_m, Unit::Meters)
            .with_band(result.band)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::CalcError;

    #[test]
    fn test_asphalt_dry_25m() {
        let result = calculate(&SkidSpeedInput::new(25.0, "asphalt", "dry")).unwrap();
        assert_eq!(result.mu, 0.70);
        // √(2 · 0.70 · 9.81 · 25) = 18.53 m/s = 66.7 km/h
        assert!((result.speed_ms - 18.53).abs() < 0.01);
        assert!((result.speed_kmh - 66.7).abs() < 0.1);
        // Within 2% of the commonly quoted 65.6 km/h figure
        assert!((result.speed_kmh - 65.6).abs() / 65.6 < 0.02);
        assert!((result.band.min - result.speed_kmh * 0.9).abs() < 1e-9);
        assert!((result.band.max - result.speed_kmh * 1.1).abs() < 1e-9);
    }

    #[test]
    fn test_monotonic_in_distance() {
        use crate::reference::friction;

        for surface in friction::surface_keys() {
            for condition in friction::conditions() {
                let mut previous = 0.0;
                for d in [0.5, 1.0, 5.0, 10.0, 25.0, 60.0] {
                    let v = calculate(&SkidSpeedInput::new(d, surface, condition.key)).unwrap().speed_kmh;
                    assert!(v > previous, "{surface}/{}: {v} <= {previous}", condition.key);
                    previous = v;
                }
            }
        }
    }

    #[test]
    fn test_speed_vanishes_only_in_the_limit() {
        let tiny = calculate(&SkidSpeedInput::new(1e-9, "asphalt", "dry")).unwrap();
        assert!(tiny.speed_kmh > 0.0);
        assert!(tiny.speed_kmh < 0.01);
    }

    #[test]
    fn test_invalid_distance() {
        for d in [0.0, -3.0] {
            let err = calculate(&SkidSpeedInput::new(d, "asphalt", "dry")).unwrap_err();
            assert_eq!(err.error_code(), "INVALID_INPUT");
        }
    }

    #[test]
    fn test_unknown_surface() {
        let err = calculate(&SkidSpeedInput::new(10.0, "sand dunes", "dry")).unwrap_err();
        assert!(matches!(err, CalcError::UnknownSurface { .. }));
    }

    #[test]
    fn test_surface_only_fallback() {
        let result = calculate(&SkidSpeedInput::new(10.0, "ice", "wet")).unwrap();
        assert_eq!(result.mu, 0.10);
    }

    #[test]
    fn test_summary() {
        let result = calculate(&SkidSpeedInput::new(25.0, "asfalto", "seco")).unwrap();
        let summary = CalculationResult::from(&result);
        assert_eq!(summary.kind, CalculationKind::SkidSpeed);
        assert_eq!(summary.formula, Formula::SkidSpeed);
        assert_eq!(summary.output("speed_kmh"), Some(result.speed_kmh));
        assert!(summary.error_band.unwrap().is_symmetric());
    }
}
