//! # Trajectory Analysis
//!
//! Reconstructs vehicle paths on either side of the impact.
//!
//! - [`pre_impact`]: uniform-velocity back-projection from the impact point,
//!   used to reason about where the vehicle was when the hazard appeared.
//! - [`post_impact`]: checks the measured impact-to-rest displacement
//!   against the theoretical run-out v²/(2μg) and samples a linearly
//!   decelerating path between the two points.
//!
//! ## Example
//!
//! ```rust
//! use recon_core::analysis::trajectory::{pre_impact, PreImpactInput};
//! use recon_core::analysis::SpatialPoint;
//! use recon_core::units::Degrees;
//!
//! let input = PreImpactInput::new(SpatialPoint::new(0.0, 0.0), 72.0, Degrees(0.0), 2.0);
//! let path = pre_impact(&input).unwrap();
//! assert_eq!(path.samples.len(), 5); // -2.0, -1.5, -1.0, -0.5, 0.0
//! assert!((path.samples[0].position.y + 40.0).abs() < 1e-9);
//! ```

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::geometry::{SpatialPoint, TrajectorySample};
use crate::calculations::{CalculationKind, CalculationResult, EvidenceFlag};
use crate::errors::{require_non_negative, require_positive, CalcError, CalcResult};
use crate::formulas::{braking_distance, braking_time, decelerated_distance, Formula, GRAVITY_MS2};
use crate::units::{Degrees, KilometersPerHour, MetersPerSecond, Unit};

/// Default sampling interval (s)
pub const DEFAULT_TIME_STEP_S: f64 = 0.5;

/// Allowed gap between measured and theoretical run-out before flagging (m)
pub const INCONSISTENCY_TOLERANCE_M: f64 = 2.0;

/// Upper bound on samples per trajectory
const MAX_SAMPLES: usize = 10_000;

fn default_time_step() -> f64 {
    DEFAULT_TIME_STEP_S
}

/// Sample times 0, step, 2·step, ... up to and including `end`.
fn sample_times(end: f64, step: f64) -> CalcResult<Vec<f64>> {
    require_positive("time_step_s", step)?;
    let steps = (end / step).ceil() as usize;
    if steps >= MAX_SAMPLES {
        return Err(CalcError::invalid_input(
            "time_step_s",
            step.to_string(),
            format!("Time step too small for a {:.1} s window", end),
        ));
    }
    let mut times: Vec<f64> = (0..=steps).map(|i| (i as f64 * step).min(end)).collect();
    times.dedup_by(|later, earlier| (*later - *earlier).abs() < 1e-9);
    Ok(times)
}

// ============================================================================
// Pre-impact
// ============================================================================

/// Input for a pre-impact back-projection.
///
/// ## JSON Example
///
/// ```json
/// { "impact_point": { "x": 0.0, "y": 0.0 }, "speed_kmh": 72.0, "heading": 0.0, "duration_s": 2.0 }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreImpactInput {
    pub impact_point: SpatialPoint,
    /// Approach speed (km/h)
    pub speed_kmh: f64,
    /// Approach heading (compass bearing of travel)
    pub heading: Degrees,
    /// Window before impact to reconstruct (s)
    pub duration_s: f64,
    #[serde(default = "default_time_step")]
    pub time_step_s: f64,
}

impl PreImpactInput {
    pub fn new(impact_point: SpatialPoint, speed_kmh: f64, heading: Degrees, duration_s: f64) -> Self {
        Self {
            impact_point,
            speed_kmh,
            heading,
            duration_s,
            time_step_s: DEFAULT_TIME_STEP_S,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreImpactTrajectory {
    /// Samples in time order, ending at the impact (t = 0)
    pub samples: Vec<TrajectorySample>,
    /// Distance covered over the window (m)
    pub distance_m: f64,
    pub duration_s: f64,
}

/// Back-project the approach path at constant velocity.
pub fn pre_impact(input: &PreImpactInput) -> CalcResult<PreImpactTrajectory> {
    require_non_negative("speed_kmh", input.speed_kmh)?;
    require_positive("duration_s", input.duration_s)?;

    let speed: MetersPerSecond = KilometersPerHour(input.speed_kmh).into();
    let samples: Vec<TrajectorySample> = sample_times(input.duration_s, input.time_step_s)?
        .into_iter()
        .rev()
        .map(|elapsed| TrajectorySample {
            t: -elapsed,
            position: input
                .impact_point
                .offset_along(input.heading, -speed.value() * elapsed),
            speed_kmh: input.speed_kmh,
        })
        .collect();

    debug!(samples = samples.len(), "pre-impact back-projection");

    Ok(PreImpactTrajectory {
        samples,
        distance_m: speed.value() * input.duration_s,
        duration_s: input.duration_s,
    })
}

impl From<&PreImpactTrajectory> for CalculationResult {
    fn from(path: &PreImpactTrajectory) -> Self {
        CalculationResult::new(CalculationKind::PreImpactTrajectory, Formula::UniformBackProjection)
            .with_output("distance_m", path.distance_m, Unit::Meters)
            .with_output("duration_s", path.duration_s, Unit::Seconds)
    }
}

// ============================================================================
// Post-impact
// ============================================================================

/// Input for a post-impact run-out check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostImpactInput {
    pub impact_point: SpatialPoint,
    pub rest_point: SpatialPoint,
    /// Speed just after impact (km/h)
    pub speed_kmh: f64,
    /// Friction / drag factor during the run-out
    pub mu: f64,
    #[serde(default = "default_time_step")]
    pub time_step_s: f64,
}

impl PostImpactInput {
    pub fn new(impact_point: SpatialPoint, rest_point: SpatialPoint, speed_kmh: f64, mu: f64) -> Self {
        Self {
            impact_point,
            rest_point,
            speed_kmh,
            mu,
            time_step_s: DEFAULT_TIME_STEP_S,
        }
    }

    pub fn validate(&self) -> CalcResult<()> {
        require_positive("speed_kmh", self.speed_kmh)?;
        if !(self.mu > 0.0 && self.mu <= 1.0) {
            return Err(CalcError::invalid_input(
                "mu",
                self.mu.to_string(),
                "Friction coefficient must be in (0, 1]",
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostImpactTrajectory {
    pub measured_distance_m: f64,
    pub theoretical_distance_m: f64,
    /// measured − theoretical (m)
    pub difference_m: f64,
    pub stop_time_s: f64,
    pub consistent: bool,
    pub flags: Vec<EvidenceFlag>,
    /// Samples from impact (t = 0) to rest
    pub samples: Vec<TrajectorySample>,
}

/// Compare the measured run-out with v²/(2μg) and sample the path.
pub fn post_impact(input: &PostImpactInput) -> CalcResult<PostImpactTrajectory> {
    input.validate()?;

    let speed: MetersPerSecond = KilometersPerHour(input.speed_kmh).into();
    let deceleration = input.mu * GRAVITY_MS2;
    let theoretical_distance_m = braking_distance(speed.value(), input.mu);
    let stop_time_s = braking_time(speed.value(), input.mu);
    let measured_distance_m = input.impact_point.distance_to(&input.rest_point);
    let difference_m = measured_distance_m - theoretical_distance_m;

    let consistent = difference_m.abs() <= INCONSISTENCY_TOLERANCE_M;
    let mut flags = Vec::new();
    if !consistent {
        debug!(measured_distance_m, theoretical_distance_m, "post-impact run-out inconsistent");
        flags.push(EvidenceFlag::Inconsistent {
            measured_m: measured_distance_m,
            theoretical_m: theoretical_distance_m,
            tolerance_m: INCONSISTENCY_TOLERANCE_M,
        });
    }

    let samples = sample_times(stop_time_s, input.time_step_s)?
        .into_iter()
        .map(|t| {
            let travelled = decelerated_distance(speed.value(), deceleration, t);
            let remaining_speed = (speed.value() - deceleration * t).max(0.0);
            TrajectorySample {
                t,
                position: input
                    .impact_point
                    .lerp(&input.rest_point, travelled / theoretical_distance_m),
                speed_kmh: KilometersPerHour::from(MetersPerSecond(remaining_speed)).value(),
            }
        })
        .collect();

    Ok(PostImpactTrajectory {
        measured_distance_m,
        theoretical_distance_m,
        difference_m,
        stop_time_s,
        consistent,
        flags,
        samples,
    })
}

impl From<&PostImpactTrajectory> for CalculationResult {
    fn from(path: &PostImpactTrajectory) -> Self {
        let result = CalculationResult::new(CalculationKind::PostImpactTrajectory, Formula::PostImpactDeceleration)
            .citing(Formula::BrakingDistance)
            .with_output("theoretical_distance_m", path.theoretical_distance_m, Unit::Meters)
            .with_output("measured_distance_m", path.measured_distance_m, Unit::Meters)
            .with_output("difference_m", path.difference_m, Unit::Meters)
            .with_output("stop_time_s", path.stop_time_s, Unit::Seconds);
        path.flags.iter().cloned().fold(result, CalculationResult::with_flag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pre_impact_samples() {
        let input = PreImpactInput::new(SpatialPoint::new(10.0, 10.0), 36.0, Degrees(90.0), 1.2);
        let path = pre_impact(&input).unwrap();

        // 0, 0.5, 1.0, 1.2 reversed
        assert_eq!(path.samples.len(), 4);
        assert!((path.samples[0].t + 1.2).abs() < 1e-9);
        assert_eq!(path.samples.last().unwrap().t, 0.0);
        // 10 m/s heading east: 12 m west of impact
        assert!((path.samples[0].position.x + 2.0).abs() < 1e-9);
        assert!((path.distance_m - 12.0).abs() < 1e-9);
    }

    #[test]
    fn test_pre_impact_rejects_bad_window() {
        let mut input = PreImpactInput::new(SpatialPoint::default(), 50.0, Degrees(0.0), 0.0);
        assert!(pre_impact(&input).is_err());
        input.duration_s = 2.0;
        input.time_step_s = 0.0;
        assert!(pre_impact(&input).is_err());
    }

    #[test]
    fn test_post_impact_consistent() {
        // 36 km/h, μ = 0.5: 10² / (2 · 0.5 · 9.81) = 10.19 m
        let input = PostImpactInput::new(SpatialPoint::new(0.0, 0.0), SpatialPoint::new(0.0, 11.0), 36.0, 0.5);
        let path = post_impact(&input).unwrap();

        assert!((path.theoretical_distance_m - 10.19).abs() < 0.01);
        assert!(path.consistent);
        assert!(path.flags.is_empty());

        let first = path.samples.first().unwrap();
        let last = path.samples.last().unwrap();
        assert_eq!(first.position, input.impact_point);
        assert!((last.position.y - 11.0).abs() < 1e-9);
        assert!(last.speed_kmh.abs() < 1e-9);
    }

    #[test]
    fn test_post_impact_inconsistent() {
        let input = PostImpactInput::new(SpatialPoint::new(0.0, 0.0), SpatialPoint::new(20.0, 0.0), 36.0, 0.5);
        let path = post_impact(&input).unwrap();
        assert!(!path.consistent);
        assert_eq!(path.flags[0].code(), "INCONSISTENT");
        assert!(CalculationResult::from(&path).needs_review());
    }

    #[test]
    fn test_post_impact_speeds_decrease() {
        let input = PostImpactInput::new(SpatialPoint::new(0.0, 0.0), SpatialPoint::new(15.0, 0.0), 50.0, 0.7);
        let path = post_impact(&input).unwrap();
        for pair in path.samples.windows(2) {
            assert!(pair[1].speed_kmh <= pair[0].speed_kmh);
            assert!(pair[1].position.x >= pair[0].position.x);
        }
    }

    #[test]
    fn test_post_impact_validation() {
        let base = PostImpactInput::new(SpatialPoint::default(), SpatialPoint::new(5.0, 0.0), 40.0, 0.7);
        assert!(post_impact(&PostImpactInput { mu: 0.0, ..base.clone() }).is_err());
        assert!(post_impact(&PostImpactInput { mu: 1.5, ..base.clone() }).is_err());
        assert!(post_impact(&PostImpactInput { speed_kmh: 0.0, ..base }).is_err());
    }
}
