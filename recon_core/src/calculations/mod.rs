//! # Reconstruction Calculations
//!
//! This module contains the five formula calculators. Each calculation
//! follows the pattern:
//!
//! - `*Input` - Input parameters (JSON-serializable)
//! - `*Result` - Typed calculation results (JSON-serializable)
//! - `calculate(input) -> Result<*Result, CalcError>` - Pure calculation function
//! - `CalculationResult::from(&*Result)` - Uniform summary for reports and dispatch
//!
//! ## Available Calculations
//!
//! - [`skid_speed`] - Speed from a braking skid
//! - [`drag_speed`] - Speed band from a post-collision drag
//! - [`kinetic_energy`] - Kinetic energy and free-fall equivalent
//! - [`reaction_time`] - Reaction distance and total stopping distance
//! - [`damage_speed`] - Energy-equivalent damage speed for two vehicles
//!
//! The geometric analyzers in [`crate::analysis`] produce the same
//! [`CalculationResult`] summary.

pub mod damage_speed;
pub mod drag_speed;
pub mod kinetic_energy;
pub mod reaction_time;
pub mod skid_speed;

use serde::{Deserialize, Serialize};

use crate::formulas::Formula;
use crate::units::Unit;

// Re-export commonly used types
pub use damage_speed::{
    pre_impact_speed, DamageSpeedInput, DamageSpeedResult, PreImpactSpeedResult, TravelDirection, VehicleMotion,
};
pub use drag_speed::{DragFriction, DragSpeedInput, DragSpeedResult, DEFAULT_DRAG_MU};
pub use kinetic_energy::{KineticEnergyInput, KineticEnergyResult};
pub use reaction_time::{ReactionSource, ReactionTimeInput, ReactionTimeResult, StoppingDistance};
pub use skid_speed::{SkidSpeedInput, SkidSpeedResult};

/// Which calculator or analyzer produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalculationKind {
    SkidSpeed,
    DragSpeed,
    KineticEnergy,
    ReactionTime,
    DamageSpeed,
    PreImpactSpeed,
    ImpactPoint,
    PreImpactTrajectory,
    PostImpactTrajectory,
    Interception,
    SightLine,
    SightDistance,
    SightTriangle,
}

impl CalculationKind {
    /// Display name
    pub fn display_name(&self) -> &'static str {
        match self {
            CalculationKind::SkidSpeed => "Speed from Skid Marks",
            CalculationKind::DragSpeed => "Speed from Drag",
            CalculationKind::KineticEnergy => "Kinetic Energy",
            CalculationKind::ReactionTime => "Reaction Distance",
            CalculationKind::DamageSpeed => "Damage Speed (EES)",
            CalculationKind::PreImpactSpeed => "Pre-Impact Speed",
            CalculationKind::ImpactPoint => "Impact Point",
            CalculationKind::PreImpactTrajectory => "Pre-Impact Trajectory",
            CalculationKind::PostImpactTrajectory => "Post-Impact Trajectory",
            CalculationKind::Interception => "Interception",
            CalculationKind::SightLine => "Sight Line",
            CalculationKind::SightDistance => "Minimum Sight Distance",
            CalculationKind::SightTriangle => "Sight Triangle",
        }
    }
}

impl std::fmt::Display for CalculationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// A named numeric output with its unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quantity {
    /// Machine-readable name (e.g., "speed_kmh")
    pub name: String,
    pub value: f64,
    pub unit: Unit,
}

impl Quantity {
    pub fn new(name: impl Into<String>, value: f64, unit: Unit) -> Self {
        Self {
            name: name.into(),
            value,
            unit,
        }
    }
}

/// Uncertainty band around a primary output.
///
/// Carries both the absolute range and the percentage deviations, which
/// differ when the band is asymmetric (drag speed).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ErrorBand {
    pub min: f64,
    pub max: f64,
    /// Percentage below the nominal value
    pub minus_percent: f64,
    /// Percentage above the nominal value
    pub plus_percent: f64,
    pub unit: Unit,
}

impl ErrorBand {
    /// Symmetric ±percent band around `nominal`.
    pub fn symmetric(nominal: f64, percent: f64, unit: Unit) -> Self {
        let delta = nominal * percent / 100.0;
        Self {
            min: nominal - delta,
            max: nominal + delta,
            minus_percent: percent,
            plus_percent: percent,
            unit,
        }
    }

    /// Band from an explicit range; percentages are derived from the spread.
    pub fn from_range(nominal: f64, min: f64, max: f64, unit: Unit) -> Self {
        let (minus_percent, plus_percent) = if nominal > 0.0 {
            ((nominal - min) / nominal * 100.0, (max - nominal) / nominal * 100.0)
        } else {
            (0.0, 0.0)
        };
        Self {
            min,
            max,
            minus_percent,
            plus_percent,
            unit,
        }
    }

    /// True when the percentages match on both sides (within 0.01%).
    pub fn is_symmetric(&self) -> bool {
        (self.minus_percent - self.plus_percent).abs() < 0.01
    }
}

/// Non-fatal evidence warnings reported alongside a result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "flag", rename_all = "snake_case")]
pub enum EvidenceFlag {
    /// Damage locations that cannot plausibly belong to the same collision
    IncompatibleDamage {
        first: String,
        second: String,
        note: String,
    },
    /// Measured displacement diverges from the theoretical run-out
    Inconsistent {
        measured_m: f64,
        theoretical_m: f64,
        tolerance_m: f64,
    },
}

impl EvidenceFlag {
    /// Short code for programmatic handling
    pub fn code(&self) -> &'static str {
        match self {
            EvidenceFlag::IncompatibleDamage { .. } => "INCOMPATIBLE_EVIDENCE",
            EvidenceFlag::Inconsistent { .. } => "INCONSISTENT",
        }
    }

    /// Human-readable description for reports
    pub fn describe(&self) -> String {
        match self {
            EvidenceFlag::IncompatibleDamage { first, second, note } => {
                format!("Incompatible damage pair ({} / {}): {} - review", first, second, note)
            }
            EvidenceFlag::Inconsistent {
                measured_m,
                theoretical_m,
                tolerance_m,
            } => format!(
                "Measured displacement {:.2} m differs from theoretical {:.2} m by more than {:.1} m \
                 (slope, rotation or obstacles not modeled)",
                measured_m, theoretical_m, tolerance_m
            ),
        }
    }
}

/// Uniform summary of any calculation, suitable for embedding in a report.
///
/// ## JSON Example
///
/// ```json
/// {
///   "kind": "skid_speed",
///   "outputs": [
///     { "name": "speed_kmh", "value": 66.7, "unit": "kilometers_per_hour" }
///   ],
///   "error_band": { "min": 60.0, "max": 73.4, "minus_percent": 10.0, "plus_percent": 10.0, "unit": "kilometers_per_hour" },
///   "formula": "skid_speed",
///   "citations": ["Speed from Skid Marks: v = sqrt(2 * mu * g * d) (Fricke, ...)"],
///   "flags": []
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationResult {
    pub kind: CalculationKind,
    /// Primary numeric outputs, most important first
    pub outputs: Vec<Quantity>,
    pub error_band: Option<ErrorBand>,
    /// Formula that produced the primary output
    pub formula: Formula,
    /// Citation strings for every formula involved
    pub citations: Vec<String>,
    #[serde(default)]
    pub flags: Vec<EvidenceFlag>,
}

impl CalculationResult {
    /// Start a result for `kind` computed by `formula` (its citation is added).
    pub fn new(kind: CalculationKind, formula: Formula) -> Self {
        Self {
            kind,
            outputs: Vec::new(),
            error_band: None,
            formula,
            citations: vec![formula.citation()],
            flags: Vec::new(),
        }
    }

    pub fn with_output(mut self, name: impl Into<String>, value: f64, unit: Unit) -> Self {
        self.outputs.push(Quantity::new(name, value, unit));
        self
    }

    pub fn with_band(mut self, band: ErrorBand) -> Self {
        self.error_band = Some(band);
        self
    }

    /// Cite a supporting formula (deduplicated).
    pub fn citing(mut self, formula: Formula) -> Self {
        let citation = formula.citation();
        if !self.citations.contains(&citation) {
            self.citations.push(citation);
        }
        self
    }

    pub fn with_flag(mut self, flag: EvidenceFlag) -> Self {
        self.flags.push(flag);
        self
    }

    /// Look up an output value by name.
    pub fn output(&self, name: &str) -> Option<f64> {
        self.outputs.iter().find(|q| q.name == name).map(|q| q.value)
    }

    /// True when any evidence flag was raised.
    pub fn needs_review(&self) -> bool {
        !self.flags.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symmetric_band() {
        let band = ErrorBand::symmetric(100.0, 10.0, Unit::KilometersPerHour);
        assert_eq!(band.min, 90.0);
        assert_eq!(band.max, 110.0);
        assert!(band.is_symmetric());
    }

    #[test]
    fn test_band_from_range_is_asymmetric() {
        let band = ErrorBand::from_range(100.0, 80.0, 130.0, Unit::KilometersPerHour);
        assert!((band.minus_percent - 20.0).abs() < 1e-9);
        assert!((band.plus_percent - 30.0).abs() < 1e-9);
        assert!(!band.is_symmetric());
    }

    #[test]
    fn test_result_builder() {
        let result = CalculationResult::new(CalculationKind::KineticEnergy, Formula::KineticEnergy)
            .with_output("energy_j", 1000.0, Unit::Joules)
            .citing(Formula::FreeFallHeight)
            .citing(Formula::FreeFallHeight);

        assert_eq!(result.output("energy_j"), Some(1000.0));
        assert_eq!(result.output("missing"), None);
        assert_eq!(result.citations.len(), 2);
        assert!(!result.needs_review());
    }

    #[test]
    fn test_flag_codes() {
        let flag = EvidenceFlag::Inconsistent {
            measured_m: 10.0,
            theoretical_m: 5.0,
            tolerance_m: 2.0,
        };
        assert_eq!(flag.code(), "INCONSISTENT");
        assert!(flag.describe().contains("10.00 m"));
    }

    #[test]
    fn test_serialization() {
        let result = CalculationResult::new(CalculationKind::SkidSpeed, Formula::SkidSpeed)
            .with_output("speed_kmh", 66.7, Unit::KilometersPerHour)
            .with_band(ErrorBand::symmetric(66.7, 10.0, Unit::KilometersPerHour));
        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains("\"kind\":\"skid_speed\""));
        let roundtrip: CalculationResult = serde_json::from_str(&json).unwrap();
        assert_eq!(roundtrip.kind, CalculationKind::SkidSpeed);
        assert_eq!(roundtrip.formula, Formula::SkidSpeed);
        assert!((roundtrip.output("speed_kmh").unwrap() - 66.7).abs() < 1e-9);
        assert!(roundtrip.error_band.is_some());
    }
}
