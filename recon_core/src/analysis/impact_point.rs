//! # Impact Point Estimation
//!
//! Two independent estimators, chosen by the evidence available:
//!
//! - [`from_ground_marks`] - confidence-weighted centroid of tire marks,
//!   scuffs and fluid spills
//! - [`from_damage`] - back-projection of both vehicles from their rest
//!   positions along the heading implied by their damage
//!
//! ## Example
//!
//! ```rust
//! use recon_core::analysis::impact_point::{from_ground_marks, GroundMark, MarkKind};
//! use recon_core::analysis::SpatialPoint;
//!
//! let marks = [
//!     GroundMark::new(MarkKind::DragOrigin, SpatialPoint::new(10.0, 5.0)),
//!     GroundMark::new(MarkKind::FluidSpill, SpatialPoint::new(12.0, 5.0)),
//! ];
//! let estimate = from_ground_marks(&marks).unwrap();
//! assert!(estimate.point.x > 10.0 && estimate.point.x < 12.0);
//! ```

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::geometry::SpatialPoint;
use crate::calculations::{CalculationKind, CalculationResult, EvidenceFlag};
use crate::errors::{CalcError, CalcResult};
use crate::formulas::Formula;
use crate::units::{Degrees, Unit};

// ============================================================================
// Ground marks
// ============================================================================

/// Kind of ground mark left at or near the point of impact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkKind {
    /// Start of a post-impact drag or gouge
    DragOrigin,
    /// Tire scuff
    Scuff,
    /// Coolant, oil or fuel spill
    FluidSpill,
}

impl MarkKind {
    /// Fixed confidence weight of this kind of mark.
    pub fn confidence(&self) -> f64 {
        match self {
            MarkKind::DragOrigin => 0.9,
            MarkKind::Scuff => 0.7,
            MarkKind::FluidSpill => 0.85,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GroundMark {
    pub kind: MarkKind,
    pub position: SpatialPoint,
}

impl GroundMark {
    pub fn new(kind: MarkKind, position: SpatialPoint) -> Self {
        Self { kind, position }
    }
}

// ============================================================================
// Damage
// ============================================================================

/// Where on the vehicle the damage is concentrated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DamageLocation {
    Front,
    FrontRight,
    Right,
    Rear,
    Left,
    FrontLeft,
    Roof,
}

impl DamageLocation {
    /// Assumed post-impact heading for damage at this location.
    pub fn heading(&self) -> Degrees {
        Degrees(match self {
            DamageLocation::Front => 0.0,
            DamageLocation::FrontRight => 45.0,
            DamageLocation::Right => 90.0,
            DamageLocation::Rear => 180.0,
            DamageLocation::Left => 270.0,
            DamageLocation::FrontLeft => 315.0,
            DamageLocation::Roof => 0.0,
        })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DamageLocation::Front => "front",
            DamageLocation::FrontRight => "front_right",
            DamageLocation::Right => "right",
            DamageLocation::Rear => "rear",
            DamageLocation::Left => "left",
            DamageLocation::FrontLeft => "front_left",
            DamageLocation::Roof => "roof",
        }
    }
}

/// Severity of the damage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DamageSeverity {
    Low,
    Medium,
    High,
    VeryHigh,
}

impl DamageSeverity {
    /// Assumed post-impact displacement (m).
    pub fn displacement_m(&self) -> f64 {
        match self {
            DamageSeverity::Low => 2.0,
            DamageSeverity::Medium => 5.0,
            DamageSeverity::High => 10.0,
            DamageSeverity::VeryHigh => 15.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DamageDescriptor {
    pub location: DamageLocation,
    pub severity: DamageSeverity,
}

/// One vehicle's damage and final rest position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VehicleDamage {
    pub damage: DamageDescriptor,
    pub rest_position: SpatialPoint,
}

impl VehicleDamage {
    pub fn new(location: DamageLocation, severity: DamageSeverity, rest_position: SpatialPoint) -> Self {
        Self {
            damage: DamageDescriptor { location, severity },
            rest_position,
        }
    }

    /// Position at impact, back-projected from rest.
    pub fn origin(&self) -> SpatialPoint {
        self.rest_position
            .offset_along(self.damage.location.heading(), -self.damage.severity.displacement_m())
    }
}

/// Whether two damage locations can belong to the same two-vehicle impact.
///
/// Returns the reason when the pair is implausible.
pub fn incompatibility(first: DamageLocation, second: DamageLocation) -> Option<&'static str> {
    use DamageLocation::*;
    match (first, second) {
        (Roof, _) | (_, Roof) => Some("roof damage indicates a rollover, not a two-vehicle impact"),
        (Rear, Rear) => Some("two rear impacts cannot face each other"),
        _ => None,
    }
}

// ============================================================================
// Estimate
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EstimationMethod {
    GroundMarks,
    DamageProjection,
}

/// Estimated impact point with its uncertainty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImpactPointEstimate {
    pub point: SpatialPoint,
    /// Uncertainty along x (m)
    pub uncertainty_x_m: f64,
    /// Uncertainty along y (m)
    pub uncertainty_y_m: f64,
    /// Combined plan uncertainty radius (m)
    pub uncertainty_m: f64,
    /// Mean mark confidence; not defined for damage projection
    pub confidence: Option<f64>,
    pub method: EstimationMethod,
    pub flags: Vec<EvidenceFlag>,
}

/// Estimate the impact point as the confidence-weighted centroid of the marks.
///
/// Uncertainty is the population standard deviation of the mark positions
/// along each axis; confidence is the mean weight.
///
/// # Returns
///
/// * `Err(CalcError::MissingField)` - no marks supplied
/// * `Err(CalcError::InvalidInput)` - a mark has non-finite coordinates
pub fn from_ground_marks(marks: &[GroundMark]) -> CalcResult<ImpactPointEstimate> {
    if marks.is_empty() {
        return Err(CalcError::missing_field("marks"));
    }
    if let Some(bad) = marks.iter().find(|m| !m.position.is_finite()) {
        return Err(CalcError::invalid_input(
            "marks",
            format!("{:?}", bad.position),
            "Mark coordinates must be finite",
        ));
    }

    let n = marks.len() as f64;
    let total_weight: f64 = marks.iter().map(|m| m.kind.confidence()).sum();
    let weighted = marks
        .iter()
        .fold(SpatialPoint::default(), |acc, m| acc + m.position.scale(m.kind.confidence()));
    let point = weighted.scale(1.0 / total_weight);

    let mean_x = marks.iter().map(|m| m.position.x).sum::<f64>() / n;
    let mean_y = marks.iter().map(|m| m.position.y).sum::<f64>() / n;
    let uncertainty_x_m = (marks.iter().map(|m| (m.position.x - mean_x).powi(2)).sum::<f64>() / n).sqrt();
    let uncertainty_y_m = (marks.iter().map(|m| (m.position.y - mean_y).powi(2)).sum::<f64>() / n).sqrt();

    debug!(marks = marks.len(), x = point.x, y = point.y, "impact point from ground marks");

    Ok(ImpactPointEstimate {
        point,
        uncertainty_x_m,
        uncertainty_y_m,
        uncertainty_m: uncertainty_x_m.hypot(uncertainty_y_m),
        confidence: Some(total_weight / n),
        method: EstimationMethod::GroundMarks,
        flags: Vec::new(),
    })
}

/// Estimate the impact point from both vehicles' damage and rest positions.
///
/// Each vehicle is projected back from rest along its damage heading by the
/// displacement implied by its severity; the impact point is the midpoint of
/// the two origins and the uncertainty is half their separation. An
/// implausible damage pair is flagged, not rejected.
pub fn from_damage(first: &VehicleDamage, second: &VehicleDamage) -> CalcResult<ImpactPointEstimate> {
    for (field, vehicle) in [("first.rest_position", first), ("second.rest_position", second)] {
        if !vehicle.rest_position.is_finite() {
            return Err(CalcError::invalid_input(
                field,
                format!("{:?}", vehicle.rest_position),
                "Rest position must be finite",
            ));
        }
    }

    let origin_a = first.origin();
    let origin_b = second.origin();
    let point = origin_a.midpoint(&origin_b);

    let mut flags = Vec::new();
    if let Some(note) = incompatibility(first.damage.location, second.damage.location) {
        debug!(
            first = first.damage.location.as_str(),
            second = second.damage.location.as_str(),
            "incompatible damage pair"
        );
        flags.push(EvidenceFlag::IncompatibleDamage {
            first: first.damage.location.as_str().to_string(),
            second: second.damage.location.as_str().to_string(),
            note: note.to_string(),
        });
    }

    Ok(ImpactPointEstimate {
        point,
        uncertainty_x_m: (origin_a.x - origin_b.x).abs() / 2.0,
        uncertainty_y_m: (origin_a.y - origin_b.y).abs() / 2.0,
        uncertainty_m: origin_a.distance_to(&origin_b) / 2.0,
        confidence: None,
        method: EstimationMethod::DamageProjection,
        flags,
    })
}

impl From<&ImpactPointEstimate> for CalculationResult {
    fn from(estimate: &ImpactPointEstimate) -> Self {
        let formula = match estimate.method {
            EstimationMethod::GroundMarks => Formula::WeightedCentroid,
            EstimationMethod::DamageProjection => Formula::DamageBackProjection,
        };
        let mut result = CalculationResult::new(CalculationKind::ImpactPoint, formula)
            .with_output("impact_x_m", estimate.point.x, Unit::Meters)
            .with_output("impact_y_m", estimate.point.y, Unit::Meters)
            .with_output("uncertainty_m", estimate.uncertainty_m, Unit::Meters);
        if let Some(confidence) = estimate.confidence {
            result = result.with_output("confidence", confidence, Unit::Ratio);
        }
        estimate.flags.iter().cloned().fold(result, CalculationResult::with_flag)
    }
}
