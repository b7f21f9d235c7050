//! # Geometric and Composite Analyzers
//!
//! Analyzers that work on scene geometry rather than a single formula.
//! Each returns a typed result that converts into the uniform
//! [`CalculationResult`](crate::calculations::CalculationResult) summary.
//!
//! - [`impact_point`] - impact location from ground marks or damage
//! - [`trajectory`] - pre-impact back-projection and post-impact run-out check
//! - [`interception`] - safety margin for a crossing or turning maneuver
//! - [`visibility`] - sight-line obstruction, sight distance, sight triangle

pub mod geometry;
pub mod impact_point;
pub mod interception;
pub mod trajectory;
pub mod visibility;

pub use geometry::{heading_unit, SpatialPoint, TrajectorySample};
pub use impact_point::{
    DamageDescriptor, DamageLocation, DamageSeverity, GroundMark, ImpactPointEstimate, MarkKind, VehicleDamage,
};
pub use interception::{
    ApproachingVehicle, InterceptionInput, InterceptionOutcome, InterceptionResult, ManeuveringVehicle, SpeedScan,
};
pub use trajectory::{PostImpactInput, PostImpactTrajectory, PreImpactInput, PreImpactTrajectory};
pub use visibility::{BrakingPhase, Obstacle, SightDistanceResult, SightLineInput, SightLineResult, SightTriangleResult};
