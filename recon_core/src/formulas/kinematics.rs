//! # Kinematics and Energy Formulas
//!
//! Closed-form relations used by the speed, energy and reaction calculators
//! and by the trajectory analyzer. All functions work in SI units
//! (meters, seconds, kilograms, m/s); conversion to km/h happens at the
//! calculator boundary.
//!
//! ## Notation
//!
//! - `μ` = tire/road friction coefficient (dimensionless)
//! - `g` = gravitational acceleration, 9.81 m/s²
//! - `d` = slide, drag or braking distance (m)
//! - `v` = speed (m/s)
//! - `m` = vehicle mass (kg)
//! - `t` = time (s)
//!
//! ## References
//!
//! - Fricke, "Traffic Accident Reconstruction" (1990), ch. 62 and 66
//! - Brach & Brach, "Vehicle Accident Analysis and Reconstruction Methods", 2nd ed.

use crate::units::{MetersPerSecond, Seconds};

/// Standard gravitational acceleration (m/s²)
pub const GRAVITY_MS2: f64 = 9.81;

/// Speed at the start of a uniform friction slide that ends at rest.
///
/// # Formula
/// - v = √(2·μ·g·d)
#[inline]
pub fn slide_speed(mu: f64, distance_m: f64) -> f64 {
    (2.0 * mu * GRAVITY_MS2 * distance_m).sqrt()
}

/// Distance needed to stop from speed `v` at constant deceleration μ·g.
///
/// # Formula
/// - d = v² / (2·μ·g)
#[inline]
pub fn braking_distance(speed_ms: f64, mu: f64) -> f64 {
    speed_ms.powi(2) / (2.0 * mu * GRAVITY_MS2)
}

/// Time needed to stop from speed `v` at constant deceleration μ·g.
///
/// # Formula
/// - t = v / (μ·g)
#[inline]
pub fn braking_time(speed_ms: f64, mu: f64) -> f64 {
    speed_ms / (mu * GRAVITY_MS2)
}

/// Distance covered after time `t` under constant deceleration `a`,
/// clamped at the stopping point.
///
/// # Formula
/// - s(t) = v·t − ½·a·t², for t ≤ v/a
#[inline]
pub fn decelerated_distance(speed_ms: f64, deceleration_ms2: f64, t: f64) -> f64 {
    if deceleration_ms2 <= 0.0 {
        return speed_ms * t;
    }
    let t_stop = speed_ms / deceleration_ms2;
    let t = t.min(t_stop);
    speed_ms * t - 0.5 * deceleration_ms2 * t * t
}

/// Translational kinetic energy.
///
/// # Formula
/// - Ec = ½·m·v²
#[inline]
pub fn kinetic_energy(mass_kg: f64, speed_ms: f64) -> f64 {
    0.5 * mass_kg * speed_ms.powi(2)
}

/// Height of a free fall that produces the same energy per kilogram.
///
/// # Formula
/// - h = (Ec/m) / g
#[inline]
pub fn free_fall_height(energy_per_kg: f64) -> f64 {
    energy_per_kg / GRAVITY_MS2
}

/// Distance travelled at constant speed during the reaction time.
///
/// # Formula
/// - d_r = v·t_r
#[inline]
pub fn reaction_distance(speed_ms: f64, reaction_time_s: f64) -> f64 {
    (MetersPerSecond(speed_ms) * Seconds(reaction_time_s)).value()
}

/// Closing speed used as the damage-speed proxy.
///
/// # Formulas
/// - same direction: v₁ + v₂
/// - opposite directions: |v₁ − v₂|
///
/// No mass weighting is applied.
#[inline]
pub fn damage_speed(v1: f64, v2: f64, same_direction: bool) -> f64 {
    if same_direction {
        v1 + v2
    } else {
        (v1 - v2).abs()
    }
}

/// Vector magnitude of two orthogonal speed components.
///
/// # Formula
/// - v = √(v_a² + v_b²)
#[inline]
pub fn combine_speeds(a: f64, b: f64) -> f64 {
    a.hypot(b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slide_speed() {
        // √(2 · 0.7 · 9.81 · 25) = 18.53 m/s
        let v = slide_speed(0.7, 25.0);
        assert!((v - 18.529).abs() < 0.01);
    }

    #[test]
    fn test_slide_and_braking_are_inverse() {
        let v = slide_speed(0.55, 40.0);
        assert!((braking_distance(v, 0.55) - 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_decelerated_distance_clamps_at_stop() {
        let v = 20.0;
        let a = 0.7 * GRAVITY_MS2;
        let full = braking_distance(v, 0.7);
        assert!((decelerated_distance(v, a, 100.0) - full).abs() < 1e-9);
        assert!(decelerated_distance(v, a, 0.5) < full);
        assert_eq!(decelerated_distance(v, 0.0, 2.0), 40.0);
    }

    #[test]
    fn test_kinetic_energy() {
        // 1200 kg at 60 km/h
        let e = kinetic_energy(1200.0, 60.0 / 3.6);
        assert!((e - 166_666.67).abs() < 0.1);
    }

    #[test]
    fn test_damage_speed() {
        assert_eq!(damage_speed(50.0, 30.0, true), 80.0);
        assert_eq!(damage_speed(30.0, 50.0, false), 20.0);
    }

    #[test]
    fn test_combine_speeds() {
        assert!((combine_speeds(30.0, 40.0) - 50.0).abs() < 1e-12);
    }
}
