//! # Kinetic Energy
//!
//! Translational kinetic energy of a vehicle, with an "equivalent free-fall
//! height" that gives a lay reader an intuitive sense of severity.
//!
//! ## Example
//!
//! ```rust
//! use recon_core::calculations::kinetic_energy::{calculate, KineticEnergyInput};
//!
//! let result = calculate(&KineticEnergyInput { mass_kg: 1200.0, speed_kmh: 60.0 }).unwrap();
//! assert!((result.energy_kj - 166.7).abs() < 0.1);
//! ```

use serde::{Deserialize, Serialize};

use super::{CalculationKind, CalculationResult};
use crate::errors::{require_non_negative, require_positive, CalcResult};
use crate::formulas::{free_fall_height, kinetic_energy, Formula};
use crate::units::{Joules, Kilograms, KilometersPerHour, Kilojoules, MetersPerSecond, Unit};

/// Input parameters for a kinetic-energy calculation.
///
/// ## JSON Example
///
/// ```json
/// { "mass_kg": 1200.0, "speed_kmh": 60.0 }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KineticEnergyInput {
    /// Vehicle mass in kilograms (> 0)
    pub mass_kg: f64,
    /// Speed in km/h (≥ 0)
    pub speed_kmh: f64,
}

impl KineticEnergyInput {
    /// Validate input parameters.
    pub fn validate(&self) -> CalcResult<()> {
        require_positive("mass_kg", self.mass_kg)?;
        require_non_negative("speed_kmh", self.speed_kmh)
    }
}

/// Results from a kinetic-energy calculation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KineticEnergyResult {
    pub mass_kg: f64,
    pub speed_kmh: f64,
    pub energy_j: f64,
    pub energy_kj: f64,
    pub energy_per_kg: f64,
    /// Height of a free fall producing the same energy per kilogram (m)
    pub free_fall_height_m: f64,
}

/// Calculate kinetic energy.
pub fn calculate(input: &KineticEnergyInput) -> CalcResult<KineticEnergyResult> {
    input.validate()?;

    let speed: MetersPerSecond = KilometersPerHour(input.speed_kmh).into();
    let energy = Joules(kinetic_energy(input.mass_kg, speed.value()));
    let energy_kj: Kilojoules = energy.into();
    let energy_per_kg = energy / Kilograms(input.mass_kg);

    Ok(KineticEnergyResult {
        mass_kg: input.mass_kg,
        speed_kmh: input.speed_kmh,
        energy_j: energy.value(),
        energy_kj: energy_kj.value(),
        energy_per_kg,
        free_fall_height_m: free_fall_height(energy_per_kg),
    })
}

impl From<&KineticEnergyResult> for CalculationResult {
    fn from(result: &KineticEnergyResult) -> Self {
        CalculationResult::new(CalculationKind::KineticEnergy, Formula::KineticEnergy)
            .citing(Formula::FreeFallHeight)
            .with_output("energy_kj", result.energy_kj, Unit::Kilojoules)
            .with_output("energy_j", result.energy_j, Unit::Joules)
            .with_output("energy_per_kg", result.energy_per_kg, Unit::JoulesPerKilogram)
            .with_output("free_fall_height_m", result.free_fall_height_m, Unit::Meters)
            .with_output("mass_kg", result.mass_kg, Unit::Kilograms)
            .with_output("speed_kmh", result.speed_kmh, Unit::KilometersPerHour)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn energy(mass_kg: f64, speed_kmh: f64) -> KineticEnergyResult {
        calculate(&KineticEnergyInput { mass_kg, speed_kmh }).unwrap()
    }

    #[test]
    fn test_1200kg_scenarios() {
        let slow = energy(1200.0, 60.0);
        assert!((slow.energy_kj - 166.7).abs() < 0.05);

        let fast = energy(1200.0, 120.0);
        assert!((fast.energy_kj - 666.7).abs() < 0.05);
    }

    #[test]
    fn test_scales_with_speed_squared() {
        for (m, v) in [(800.0, 30.0), (1200.0, 60.0), (15_000.0, 85.0)] {
            let base = energy(m, v).energy_j;
            let doubled = energy(m, 2.0 * v).energy_j;
            assert!((doubled - 4.0 * base).abs() < 1e-6 * doubled);
        }
    }

    #[test]
    fn test_free_fall_height() {
        // 60 km/h ≈ 14.2 m fall
        let r = energy(1200.0, 60.0);
        assert!((r.free_fall_height_m - 14.16).abs() < 0.01);
        assert!((r.energy_per_kg - r.energy_j / 1200.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_speed_is_valid() {
        let r = energy(1000.0, 0.0);
        assert_eq!(r.energy_j, 0.0);
        assert_eq!(r.free_fall_height_m, 0.0);
    }

    #[test]
    fn test_summary_reports_mass() {
        let summary = CalculationResult::from(&energy(1200.0, 60.0));
        assert_eq!(summary.output("mass_kg"), Some(1200.0));
        let mass = summary.outputs.iter().find(|q| q.name == "mass_kg").unwrap();
        assert_eq!(mass.unit, Unit::Kilograms);
    }

    #[test]
    fn test_invalid_inputs() {
        assert!(calculate(&KineticEnergyInput { mass_kg: 0.0, speed_kmh: 50.0 }).is_err());
        assert!(calculate(&KineticEnergyInput { mass_kg: 1000.0, speed_kmh: -1.0 }).is_err());
    }
}
