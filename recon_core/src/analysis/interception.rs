//! # Interception Analysis
//!
//! Could the maneuvering vehicle (turning, crossing, pulling out) have
//! cleared the conflict zone before the approaching vehicle arrived?
//!
//! ## Formulas
//!
//! - t_clear = t_reaction + d_clear / v_maneuver
//! - t_arrive = d_approach / v_approach
//! - margin = t_arrive − t_clear
//!
//! | Margin        | Outcome   |
//! |---------------|-----------|
//! | > 2 s         | SAFE      |
//! | (0, 2] s      | RISKY     |
//! | ≤ 0 s         | COLLISION |
//!
//! ## Example
//!
//! ```rust
//! use recon_core::analysis::interception::{analyze, ApproachingVehicle, InterceptionInput, InterceptionOutcome, ManeuveringVehicle};
//!
//! let input = InterceptionInput {
//!     maneuvering: ManeuveringVehicle { speed_kmh: 18.0, reaction_time_s: 1.0, distance_to_clear_m: 10.0 },
//!     approaching: ApproachingVehicle { speed_kmh: 72.0, distance_m: 100.0 },
//! };
//! let result = analyze(&input).unwrap();
//! assert_eq!(result.outcome, InterceptionOutcome::Risky); // 5.0 − 3.0 = 2.0 s
//! ```

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calculations::{CalculationKind, CalculationResult};
use crate::errors::{require_non_negative, require_positive, CalcError, CalcResult};
use crate::formulas::Formula;
use crate::units::{KilometersPerHour, MetersPerSecond, Unit};

/// Margin above which the crossing is considered safe (s)
pub const SAFE_MARGIN_S: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ManeuveringVehicle {
    pub speed_kmh: f64,
    pub reaction_time_s: f64,
    /// Distance needed to leave the conflict zone (m)
    pub distance_to_clear_m: f64,
}

impl ManeuveringVehicle {
    pub fn validate(&self) -> CalcResult<()> {
        require_positive("maneuvering.speed_kmh", self.speed_kmh)?;
        require_non_negative("maneuvering.reaction_time_s", self.reaction_time_s)?;
        require_positive("maneuvering.distance_to_clear_m", self.distance_to_clear_m)
    }

    /// Time to clear the conflict zone (s).
    pub fn clearing_time_s(&self) -> f64 {
        let speed: MetersPerSecond = KilometersPerHour(self.speed_kmh).into();
        self.reaction_time_s + self.distance_to_clear_m / speed.value()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ApproachingVehicle {
    pub speed_kmh: f64,
    /// Initial distance to the conflict zone (m)
    pub distance_m: f64,
}

impl ApproachingVehicle {
    pub fn validate(&self) -> CalcResult<()> {
        require_positive("approaching.speed_kmh", self.speed_kmh)?;
        require_positive("approaching.distance_m", self.distance_m)
    }

    /// Time to reach the conflict zone (s).
    pub fn arrival_time_s(&self) -> f64 {
        let speed: MetersPerSecond = KilometersPerHour(self.speed_kmh).into();
        self.distance_m / speed.value()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InterceptionInput {
    pub maneuvering: ManeuveringVehicle,
    pub approaching: ApproachingVehicle,
}

/// Classification of the safety margin, ordered from best to worst.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InterceptionOutcome {
    Safe,
    Risky,
    Collision,
}

impl InterceptionOutcome {
    pub fn classify(margin_s: f64) -> Self {
        if margin_s > SAFE_MARGIN_S {
            InterceptionOutcome::Safe
        } else if margin_s > 0.0 {
            InterceptionOutcome::Risky
        } else {
            InterceptionOutcome::Collision
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            InterceptionOutcome::Safe => "SAFE",
            InterceptionOutcome::Risky => "RISKY",
            InterceptionOutcome::Collision => "COLLISION",
        }
    }
}

impl std::fmt::Display for InterceptionOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InterceptionResult {
    pub clearing_time_s: f64,
    pub arrival_time_s: f64,
    /// arrival − clearing (s)
    pub margin_s: f64,
    pub outcome: InterceptionOutcome,
}

/// Compute the safety margin and classify it.
pub fn analyze(input: &InterceptionInput) -> CalcResult<InterceptionResult> {
    input.maneuvering.validate()?;
    input.approaching.validate()?;

    let clearing_time_s = input.maneuvering.clearing_time_s();
    let arrival_time_s = input.approaching.arrival_time_s();
    let margin_s = arrival_time_s - clearing_time_s;

    Ok(InterceptionResult {
        clearing_time_s,
        arrival_time_s,
        margin_s,
        outcome: InterceptionOutcome::classify(margin_s),
    })
}

/// Highest approach speed (km/h) that still leaves `margin_s` seconds:
/// v = d_approach / (t_clear + margin).
pub fn max_safe_speed(maneuvering: &ManeuveringVehicle, approach_distance_m: f64, margin_s: f64) -> CalcResult<f64> {
    maneuvering.validate()?;
    require_positive("approaching.distance_m", approach_distance_m)?;

    let window = maneuvering.clearing_time_s() + margin_s;
    if window <= 0.0 {
        return Err(CalcError::invalid_input(
            "margin_s",
            margin_s.to_string(),
            "Margin must leave a positive time window after clearing",
        ));
    }
    Ok(KilometersPerHour::from(MetersPerSecond(approach_distance_m / window)).value())
}

/// One candidate speed in a scan.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScanPoint {
    pub speed_kmh: f64,
    pub margin_s: f64,
    pub outcome: InterceptionOutcome,
}

/// Result of scanning candidate approach speeds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeedScan {
    /// Candidates in ascending speed order
    pub points: Vec<ScanPoint>,
    /// Adjacent candidates between which the outcome becomes COLLISION
    pub collision_boundary_kmh: Option<(f64, f64)>,
    /// Exact speed at which the margin reaches zero
    pub critical_speed_kmh: f64,
}

/// Evaluate each candidate approach speed and locate where the outcome
/// flips to COLLISION.
///
/// Only adjacent pairs of the supplied list are compared; `None` means the
/// flip is not bracketed by the candidates.
pub fn scan(input: &InterceptionInput, candidate_speeds_kmh: &[f64]) -> CalcResult<SpeedScan> {
    if candidate_speeds_kmh.is_empty() {
        return Err(CalcError::missing_field("candidate_speeds_kmh"));
    }

    let mut speeds = candidate_speeds_kmh.to_vec();
    speeds.sort_by(|a, b| a.total_cmp(b));

    let points = speeds
        .iter()
        .map(|&speed_kmh| {
            let approaching = ApproachingVehicle {
                speed_kmh,
                ..input.approaching
            };
            analyze(&InterceptionInput {
                maneuvering: input.maneuvering,
                approaching,
            })
            .map(|r| ScanPoint {
                speed_kmh,
                margin_s: r.margin_s,
                outcome: r.outcome,
            })
        })
        .collect::<CalcResult<Vec<_>>>()?;

    let collision_boundary_kmh = points
        .windows(2)
        .find(|pair| {
            pair[0].outcome != InterceptionOutcome::Collision && pair[1].outcome == InterceptionOutcome::Collision
        })
        .map(|pair| (pair[0].speed_kmh, pair[1].speed_kmh));

    let critical_speed_kmh = max_safe_speed(&input.maneuvering, input.approaching.distance_m, 0.0)?;
    debug!(candidates = points.len(), ?collision_boundary_kmh, critical_speed_kmh, "interception scan");

    Ok(SpeedScan {
        points,
        collision_boundary_kmh,
        critical_speed_kmh,
    })
}

impl From<&InterceptionResult> for CalculationResult {
    fn from(result: &InterceptionResult) -> Self {
        CalculationResult::new(CalculationKind::Interception, Formula::InterceptionMargin)
            .with_output("margin_s", result.margin_s, Unit::Seconds)
            .with_output("clearing_time_s", result.clearing_time_s, Unit::Seconds)
            .with_output("arrival_time_s", result.arrival_time_s, Unit::Seconds)
    }
}

impl From<&SpeedScan> for CalculationResult {
    fn from(scan: &SpeedScan) -> Self {
        CalculationResult::new(CalculationKind::Interception, Formula::InterceptionInverseSpeed)
            .citing(Formula::InterceptionMargin)
            .with_output("critical_speed_kmh", scan.critical_speed_kmh, Unit::KilometersPerHour)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(approach_kmh: f64) -> InterceptionInput {
        InterceptionInput {
            maneuvering: ManeuveringVehicle {
                speed_kmh: 18.0,
                reaction_time_s: 1.0,
                distance_to_clear_m: 10.0,
            },
            approaching: ApproachingVehicle {
                speed_kmh: approach_kmh,
                distance_m: 100.0,
            },
        }
    }

    #[test]
    fn test_classification_thresholds() {
        assert_eq!(InterceptionOutcome::classify(2.01), InterceptionOutcome::Safe);
        assert_eq!(InterceptionOutcome::classify(2.0), InterceptionOutcome::Risky);
        assert_eq!(InterceptionOutcome::classify(0.01), InterceptionOutcome::Risky);
        assert_eq!(InterceptionOutcome::classify(0.0), InterceptionOutcome::Collision);
        assert_eq!(InterceptionOutcome::classify(-3.0), InterceptionOutcome::Collision);
    }

    #[test]
    fn test_times() {
        // clear: 1 + 10/5 = 3 s; arrive at 36 km/h: 100/10 = 10 s
        let r = analyze(&input(36.0)).unwrap();
        assert!((r.clearing_time_s - 3.0).abs() < 1e-9);
        assert!((r.arrival_time_s - 10.0).abs() < 1e-9);
        assert_eq!(r.outcome, InterceptionOutcome::Safe);
    }

    #[test]
    fn test_outcome_monotone_in_speed() {
        let mut previous = InterceptionOutcome::Safe;
        for v in (10..=300).step_by(5) {
            let outcome = analyze(&input(v as f64)).unwrap().outcome;
            assert!(outcome >= previous, "{v} km/h improved to {outcome}");
            previous = outcome;
        }
        assert_eq!(previous, InterceptionOutcome::Collision);
    }

    #[test]
    fn test_max_safe_speed_inverts_margin() {
        let maneuvering = input(0.0).maneuvering;
        let v = max_safe_speed(&maneuvering, 100.0, 2.0).unwrap();
        // 100 / (3 + 2) = 20 m/s
        assert!((v - 72.0).abs() < 1e-9);
        let r = analyze(&input(v)).unwrap();
        assert!((r.margin_s - 2.0).abs() < 1e-9);

        assert!(max_safe_speed(&maneuvering, 100.0, -5.0).is_err());
    }

    #[test]
    fn test_scan_brackets_the_flip() {
        // Critical speed: 100 / 3 m/s = 120 km/h
        let scan = scan(&input(0.0), &[150.0, 60.0, 90.0, 110.0, 130.0]).unwrap();
        assert_eq!(scan.points[0].speed_kmh, 60.0);
        assert_eq!(scan.collision_boundary_kmh, Some((110.0, 130.0)));
        assert!((scan.critical_speed_kmh - 120.0).abs() < 1e-9);
    }

    #[test]
    fn test_scan_without_flip() {
        let scan = scan(&input(0.0), &[30.0, 40.0]).unwrap();
        assert!(scan.collision_boundary_kmh.is_none());
        assert!(super::scan(&input(0.0), &[]).is_err());
    }

    #[test]
    fn test_invalid_inputs() {
        assert!(analyze(&input(0.0)).is_err());
        let mut bad = input(50.0);
        bad.maneuvering.distance_to_clear_m = 0.0;
        assert!(analyze(&bad).is_err());
    }

    #[test]
    fn test_outcome_serializes_upper_case() {
        let json = serde_json::to_string(&InterceptionOutcome::Collision).unwrap();
        assert_eq!(json, "\"COLLISION\"");
    }
}
