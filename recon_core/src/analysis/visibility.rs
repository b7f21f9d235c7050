//! # Visibility Analysis
//!
//! Sight-line obstruction between an observer and a target, minimum sight
//! distance for a given speed, and the intersection sight triangle.
//!
//! ## Sight-line test
//!
//! Each obstacle is projected onto the observer-target segment in plan:
//!
//! - t = (O − A)·(B − A) / |B − A|², discarded when t ∉ [0, 1]
//! - discarded when its perpendicular offset from the line exceeds half its width
//! - blocks when taller than the sight line at t: h_A + t·(h_B − h_A)
//!
//! Heights are taken from the `z` coordinate of observer and target (eye
//! height and target height above the road).

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::geometry::SpatialPoint;
use crate::calculations::{CalculationKind, CalculationResult};
use crate::errors::{require_non_negative, require_positive, CalcError, CalcResult};
use crate::formulas::{braking_distance, braking_time, reaction_distance, Formula};
use crate::units::{KilometersPerHour, MetersPerSecond, SquareMeters, Unit};

/// Multiplier applied to the minimum sight distance
pub const SIGHT_DISTANCE_SAFETY_FACTOR: f64 = 1.25;

// ============================================================================
// Sight line
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    /// Plan position of the obstacle's center
    pub position: SpatialPoint,
    pub height_m: f64,
    pub width_m: f64,
    #[serde(default)]
    pub label: Option<String>,
}

impl Obstacle {
    pub fn new(position: SpatialPoint, height_m: f64, width_m: f64) -> Self {
        Self {
            position,
            height_m,
            width_m,
            label: None,
        }
    }

    pub fn labeled(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SightLineInput {
    /// Observer position; `z` is eye height
    pub observer: SpatialPoint,
    /// Target position; `z` is the height of the point to be seen
    pub target: SpatialPoint,
    #[serde(default)]
    pub obstacles: Vec<Obstacle>,
}

/// An obstacle that lies across the sight line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObstacleAssessment {
    /// Index into the input obstacle list
    pub index: usize,
    pub label: Option<String>,
    /// Projection parameter along the line (0 = observer, 1 = target)
    pub t: f64,
    /// Distance from the observer along the line (m)
    pub distance_from_observer_m: f64,
    pub offset_m: f64,
    /// Sight-line height at the obstacle (m)
    pub line_height_m: f64,
    pub obstacle_height_m: f64,
    pub blocks: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SightLineResult {
    pub distance_m: f64,
    /// Elevation angle from observer to target (degrees, positive upward)
    pub elevation_angle_deg: f64,
    /// Obstacles that lie across the line, nearest first
    pub crossing: Vec<ObstacleAssessment>,
    /// Obstacles discarded as off the line
    pub discarded: usize,
    pub blocked: bool,
}

impl SightLineResult {
    pub fn blocking(&self) -> impl Iterator<Item = &ObstacleAssessment> {
        self.crossing.iter().filter(|o| o.blocks)
    }
}

/// Decide whether any obstacle blocks the line between observer and target.
pub fn analyze_sight_line(input: &SightLineInput) -> CalcResult<SightLineResult> {
    let a = input.observer;
    let b = input.target;
    let distance_m = a.distance_to(&b);
    if !(distance_m > 0.0) {
        return Err(CalcError::invalid_input(
            "target",
            format!("{:?}", b),
            "Observer and target must be at different plan positions",
        ));
    }
    for (i, obstacle) in input.obstacles.iter().enumerate() {
        require_non_negative(&format!("obstacles[{}].height_m", i), obstacle.height_m)?;
        require_non_negative(&format!("obstacles[{}].width_m", i), obstacle.width_m)?;
    }

    let elevation_angle_deg = (b.z - a.z).atan2(distance_m).to_degrees();
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let length_sq = dx * dx + dy * dy;

    let mut crossing = Vec::new();
    let mut discarded = 0;
    for (index, obstacle) in input.obstacles.iter().enumerate() {
        let (ox, oy) = (obstacle.position.x - a.x, obstacle.position.y - a.y);
        let t = (ox * dx + oy * dy) / length_sq;
        let offset_m = (ox - t * dx).hypot(oy - t * dy);

        if !(0.0..=1.0).contains(&t) || offset_m > obstacle.width_m / 2.0 {
            discarded += 1;
            continue;
        }

        let line_height_m = a.z + t * (b.z - a.z);
        crossing.push(ObstacleAssessment {
            index,
            label: obstacle.label.clone(),
            t,
            distance_from_observer_m: t * distance_m,
            offset_m,
            line_height_m,
            obstacle_height_m: obstacle.height_m,
            blocks: obstacle.height_m > line_height_m,
        });
    }
    crossing.sort_by(|x, y| x.t.total_cmp(&y.t));

    let blocked = crossing.iter().any(|o| o.blocks);
    debug!(crossing = crossing.len(), discarded, blocked, "sight line analyzed");

    Ok(SightLineResult {
        distance_m,
        elevation_angle_deg,
        crossing,
        discarded,
        blocked,
    })
}

impl From<&SightLineResult> for CalculationResult {
    fn from(result: &SightLineResult) -> Self {
        CalculationResult::new(CalculationKind::SightLine, Formula::SightLineBlockage)
            .with_output("distance_m", result.distance_m, Unit::Meters)
            .with_output("elevation_angle_deg", result.elevation_angle_deg, Unit::Degrees)
            .with_output("blocking_obstacles", result.blocking().count() as f64, Unit::Ratio)
    }
}

// ============================================================================
// Minimum sight distance
// ============================================================================

/// How the braking phase is described.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BrakingPhase {
    /// Braking time in seconds
    Time(f64),
    /// Friction coefficient; braking time is v / (μ·g)
    Friction(f64),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SightDistanceResult {
    pub speed_kmh: f64,
    pub reaction_distance_m: f64,
    pub braking_time_s: f64,
    /// Half of v·t_b
    pub braking_component_m: f64,
    /// Full stop distance when μ was supplied
    pub full_braking_distance_m: Option<f64>,
    /// 1.25 · (reaction + braking component)
    pub required_m: f64,
}

/// Minimum sight distance: 1.25 · (v·t_r + v·t_b / 2).
pub fn minimum_sight_distance(
    speed_kmh: f64,
    reaction_time_s: f64,
    braking: BrakingPhase,
) -> CalcResult<SightDistanceResult> {
    require_non_negative("speed_kmh", speed_kmh)?;
    require_non_negative("reaction_time_s", reaction_time_s)?;

    let speed: MetersPerSecond = KilometersPerHour(speed_kmh).into();
    let (braking_time_s, full_braking_distance_m) = match braking {
        BrakingPhase::Time(t) => {
            require_non_negative("braking_time_s", t)?;
            (t, None)
        }
        BrakingPhase::Friction(mu) => {
            require_positive("mu", mu)?;
            (braking_time(speed.value(), mu), Some(braking_distance(speed.value(), mu)))
        }
    };

    let reaction_distance_m = reaction_distance(speed.value(), reaction_time_s);
    let braking_component_m = speed.value() * braking_time_s / 2.0;

    Ok(SightDistanceResult {
        speed_kmh,
        reaction_distance_m,
        braking_time_s,
        braking_component_m,
        full_braking_distance_m,
        required_m: SIGHT_DISTANCE_SAFETY_FACTOR * (reaction_distance_m + braking_component_m),
    })
}

impl From<&SightDistanceResult> for CalculationResult {
    fn from(result: &SightDistanceResult) -> Self {
        let summary = CalculationResult::new(CalculationKind::SightDistance, Formula::MinimumSightDistance)
            .citing(Formula::ReactionDistance)
            .with_output("required_m", result.required_m, Unit::Meters)
            .with_output("reaction_distance_m", result.reaction_distance_m, Unit::Meters)
            .with_output("braking_component_m", result.braking_component_m, Unit::Meters);
        match result.full_braking_distance_m {
            Some(d) => summary
                .citing(Formula::BrakingDistance)
                .with_output("full_braking_distance_m", d, Unit::Meters),
            None => summary,
        }
    }
}

// ============================================================================
// Sight triangle
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SightTriangleResult {
    /// Leg along the first approach (m)
    pub first_leg_m: f64,
    /// Leg along the second approach (m)
    pub second_leg_m: f64,
    pub area: SquareMeters,
}

/// Clear area needed at a right-angle intersection: ½·(v₁·t)·(v₂·t).
pub fn sight_triangle(first_speed_kmh: f64, second_speed_kmh: f64, crossing_time_s: f64) -> CalcResult<SightTriangleResult> {
    require_non_negative("first_speed_kmh", first_speed_kmh)?;
    require_non_negative("second_speed_kmh", second_speed_kmh)?;
    require_positive("crossing_time_s", crossing_time_s)?;

    let first_leg_m = MetersPerSecond::from(KilometersPerHour(first_speed_kmh)).value() * crossing_time_s;
    let second_leg_m = MetersPerSecond::from(KilometersPerHour(second_speed_kmh)).value() * crossing_time_s;

    Ok(SightTriangleResult {
        first_leg_m,
        second_leg_m,
        area: SquareMeters(0.5 * first_leg_m * second_leg_m),
    })
}

impl From<&SightTriangleResult> for CalculationResult {
    fn from(result: &SightTriangleResult) -> Self {
        CalculationResult::new(CalculationKind::SightTriangle, Formula::SightTriangle)
            .with_output("area_m2", result.area.value(), Unit::SquareMeters)
            .with_output("first_leg_m", result.first_leg_m, Unit::Meters)
            .with_output("second_leg_m", result.second_leg_m, Unit::Meters)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(obstacles: Vec<Obstacle>) -> SightLineInput {
        SightLineInput {
            observer: SpatialPoint::with_height(0.0, 0.0, 1.2),
            target: SpatialPoint::with_height(100.0, 0.0, 1.2),
            obstacles,
        }
    }

    #[test]
    fn test_clear_line() {
        let r = analyze_sight_line(&line(vec![])).unwrap();
        assert!(!r.blocked);
        assert!((r.distance_m - 100.0).abs() < 1e-9);
        assert!(r.elevation_angle_deg.abs() < 1e-12);
    }

    #[test]
    fn test_tall_obstacle_blocks() {
        let r = analyze_sight_line(&line(vec![Obstacle::new(SpatialPoint::new(40.0, 0.5), 2.5, 2.0).labeled("truck")]))
            .unwrap();
        assert!(r.blocked);
        let hit = r.blocking().next().unwrap();
        assert_eq!(hit.label.as_deref(), Some("truck"));
        assert!((hit.t - 0.4).abs() < 1e-9);
        assert!((hit.offset_m - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_short_obstacle_does_not_block() {
        let r = analyze_sight_line(&line(vec![Obstacle::new(SpatialPoint::new(40.0, 0.0), 0.8, 1.0)])).unwrap();
        assert!(!r.blocked);
        assert_eq!(r.crossing.len(), 1);
    }

    #[test]
    fn test_off_line_obstacles_discarded() {
        let r = analyze_sight_line(&line(vec![
            Obstacle::new(SpatialPoint::new(-5.0, 0.0), 5.0, 2.0),  // behind observer
            Obstacle::new(SpatialPoint::new(120.0, 0.0), 5.0, 2.0), // beyond target
            Obstacle::new(SpatialPoint::new(50.0, 3.0), 5.0, 2.0),  // too far aside
        ]))
        .unwrap();
        assert_eq!(r.discarded, 3);
        assert!(!r.blocked);
    }

    #[test]
    fn test_sloped_line_height() {
        let input = SightLineInput {
            observer: SpatialPoint::with_height(0.0, 0.0, 1.0),
            target: SpatialPoint::with_height(0.0, 50.0, 3.0),
            obstacles: vec![Obstacle::new(SpatialPoint::new(0.0, 25.0), 1.9, 1.0)],
        };
        let r = analyze_sight_line(&input).unwrap();
        assert!((r.crossing[0].line_height_m - 2.0).abs() < 1e-9);
        assert!(!r.blocked);
        assert!(r.elevation_angle_deg > 0.0);
    }

    #[test]
    fn test_coincident_points_rejected() {
        let input = SightLineInput {
            observer: SpatialPoint::with_height(1.0, 1.0, 1.2),
            target: SpatialPoint::with_height(1.0, 1.0, 3.0),
            obstacles: vec![],
        };
        assert!(analyze_sight_line(&input).is_err());
    }

    #[test]
    fn test_minimum_sight_distance() {
        // 72 km/h = 20 m/s: 1.25 · (20·1.5 + 20·2/2) = 62.5 m
        let r = minimum_sight_distance(72.0, 1.5, BrakingPhase::Time(2.0)).unwrap();
        assert!((r.required_m - 62.5).abs() < 1e-9);
        assert!(r.full_braking_distance_m.is_none());
    }

    #[test]
    fn test_minimum_sight_distance_from_friction() {
        let r = minimum_sight_distance(72.0, 1.0, BrakingPhase::Friction(0.7)).unwrap();
        assert!((r.braking_time_s - 20.0 / (0.7 * 9.81)).abs() < 1e-9);
        assert!((r.full_braking_distance_m.unwrap() - 400.0 / (2.0 * 0.7 * 9.81)).abs() < 1e-9);
        assert_eq!(CalculationResult::from(&r).citations.len(), 3);
    }

    #[test]
    fn test_sight_triangle() {
        // 36 and 54 km/h over 2 s: legs 20 and 30 m
        let r = sight_triangle(36.0, 54.0, 2.0).unwrap();
        assert!((r.first_leg_m - 20.0).abs() < 1e-9);
        assert!((r.second_leg_m - 30.0).abs() < 1e-9);
        assert!((r.area.value() - 300.0).abs() < 1e-9);
        assert!(sight_triangle(36.0, 54.0, 0.0).is_err());
    }
}
