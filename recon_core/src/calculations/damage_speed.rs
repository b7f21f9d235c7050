//! # Damage Speed (Energy-Equivalent Speed)
//!
//! Kinetic energy of two colliding vehicles and the closing speed used as a
//! damage-severity proxy. The companion [`pre_impact_speed`] combines that
//! damage speed with an independently estimated drag speed to give an
//! estimate of the speed just before impact.
//!
//! ## Known Simplification
//!
//! The closing speed is v₁ + v₂ for vehicles travelling in the same
//! direction and |v₁ − v₂| for opposite directions, with no mass or
//! momentum weighting. Reports should present it as an approximation.
//!
//! ## Example
//!
//! ```rust
//! use recon_core::calculations::damage_speed::{calculate, DamageSpeedInput, TravelDirection, VehicleMotion};
//!
//! let input = DamageSpeedInput {
//!     first: VehicleMotion { mass_kg: 1200.0, speed_kmh: 50.0 },
//!     second: VehicleMotion { mass_kg: 1500.0, speed_kmh: 30.0 },
//!     direction: TravelDirection::Opposite,
//! };
//! let result = calculate(&input).unwrap();
//! assert_eq!(result.damage_speed_kmh, 20.0);
//! ```

use serde::{Deserialize, Serialize};

use super::drag_speed::DragSpeedResult;
use super::kinetic_energy::{self, KineticEnergyInput, KineticEnergyResult};
use super::{CalculationKind, CalculationResult, ErrorBand};
use crate::errors::{require_non_negative, CalcResult};
use crate::formulas::{combine_speeds, damage_speed, Formula};
use crate::units::Unit;

/// Relative travel direction of the two vehicles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TravelDirection {
    #[default]
    Same,
    Opposite,
}

impl TravelDirection {
    pub fn is_same(&self) -> bool {
        matches!(self, TravelDirection::Same)
    }
}

/// Mass and speed of one vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VehicleMotion {
    pub mass_kg: f64,
    pub speed_kmh: f64,
}

impl From<VehicleMotion> for KineticEnergyInput {
    fn from(motion: VehicleMotion) -> Self {
        KineticEnergyInput {
            mass_kg: motion.mass_kg,
            speed_kmh: motion.speed_kmh,
        }
    }
}

/// Input parameters for a damage-speed calculation.
///
/// ## JSON Example
///
/// ```json
/// {
///   "first": { "mass_kg": 1200.0, "speed_kmh": 50.0 },
///   "second": { "mass_kg": 1500.0, "speed_kmh": 30.0 },
///   "direction": "opposite"
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DamageSpeedInput {
    pub first: VehicleMotion,
    pub second: VehicleMotion,
    #[serde(default)]
    pub direction: TravelDirection,
}

/// Results from a damage-speed calculation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DamageSpeedResult {
    pub first: KineticEnergyResult,
    pub second: KineticEnergyResult,
    pub direction: TravelDirection,
    pub damage_speed_kmh: f64,
    /// Sum of both vehicles' kinetic energy (kJ)
    pub total_energy_kj: f64,
}

/// Calculate per-vehicle energy and the damage speed.
pub fn calculate(input: &DamageSpeedInput) -> CalcResult<DamageSpeedResult> {
    let first = kinetic_energy::calculate(&input.first.into())?;
    let second = kinetic_energy::calculate(&input.second.into())?;

    Ok(DamageSpeedResult {
        first,
        second,
        direction: input.direction,
        damage_speed_kmh: damage_speed(first.speed_kmh, second.speed_kmh, input.direction.is_same()),
        total_energy_kj: first.energy_kj + second.energy_kj,
    })
}

/// Damage speed combined with a drag speed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PreImpactSpeedResult {
    pub damage_speed_kmh: f64,
    pub drag_speed_kmh: f64,
    pub pre_impact_speed_kmh: f64,
    /// Band carried over from the drag-speed friction spread
    pub band: ErrorBand,
}

/// Combine a damage speed with a drag-speed estimate:
/// v_total = √(v_damage² + v_drag²), evaluated at the drag band's mean,
/// min and max.
pub fn pre_impact_speed(damage_speed_kmh: f64, drag: &DragSpeedResult) -> CalcResult<PreImpactSpeedResult> {
    require_non_negative("damage_speed_kmh", damage_speed_kmh)?;

    let pre_impact_speed_kmh = combine_speeds(damage_speed_kmh, drag.speed_mean_kmh);
    Ok(PreImpactSpeedResult {
        damage_speed_kmh,
        drag_speed_kmh: drag.speed_mean_kmh,
        pre_impact_speed_kmh,
        band: ErrorBand::from_range(
            pre_impact_speed_kmh,
            combine_speeds(damage_speed_kmh, drag.speed_min_kmh),
            combine_speeds(damage_speed_kmh, drag.speed_max_kmh),
            Unit::KilometersPerHour,
        ),
    })
}

impl From<&DamageSpeedResult> for CalculationResult {
    fn from(result: &DamageSpeedResult) -> Self {
        CalculationResult::new(CalculationKind::DamageSpeed, Formula::DamageSpeed)
            .citing(Formula::KineticEnergy)
            .with_output("damage_speed_kmh", result.damage_speed_kmh, Unit::KilometersPerHour)
            .with_output("energy_first_kj", result.first.energy_kj, Unit::Kilojoules)
            .with_output("energy_second_kj", result.second.energy_kj, Unit::Kilojoules)
            .with_output("total_energy_kj", result.total_energy_kj, Unit::Kilojoules)
            .with_output("mass_first_kg", result.first.mass_kg, Unit::Kilograms)
            .with_output("mass_second_kg", result.second.mass_kg, Unit::Kilograms)
    }
}

impl From<&PreImpactSpeedResult> for CalculationResult {
    fn from(result: &PreImpactSpeedResult) -> Self {
        CalculationResult::new(CalculationKind::PreImpactSpeed, Formula::VectorSpeedCombination)
            .citing(Formula::DamageSpeed)
            .citing(Formula::DragSpeed)
            .with_output("pre_impact_speed_kmh", result.pre_impact_speed_kmh, Unit::KilometersPerHour)
            .with_output("damage_speed_kmh", result.damage_speed_kmh, Unit::KilometersPerHour)
            .with_output("drag_speed_kmh", result.drag_speed_kmh, Unit::KilometersPerHour)
            .with_band(result.band)
    }
}
