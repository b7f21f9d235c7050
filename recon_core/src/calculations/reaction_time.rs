//! # Reaction Distance and Stopping Distance
//!
//! Distance travelled during the driver's perception-reaction time, either
//! from an explicit time or from a driver-condition profile. When a braking
//! distance is known (from a skid calculation or a measurement), the result
//! also carries the total stopping distance and each leg's share.
//!
//! ## Example
//!
//! ```rust
//! use recon_core::calculations::reaction_time::{calculate, ReactionSource, ReactionTimeInput};
//!
//! let input = ReactionTimeInput {
//!     speed_kmh: 72.0,
//!     reaction: ReactionSource::Condition("tired".to_string()),
//!     braking_distance_m: Some(30.0),
//! };
//! let result = calculate(&input).unwrap();
//!
//! assert_eq!(result.reaction_distance_m, 40.0); // 20 m/s · 2.0 s
//! let stopping = result.stopping.unwrap();
//! assert_eq!(stopping.total_m, 70.0);
//! ```

use serde::{Deserialize, Serialize};

use super::{CalculationKind, CalculationResult};
use crate::errors::{require_non_negative, require_positive, CalcResult};
use crate::formulas::{reaction_distance, Formula};
use crate::reference::ReactionTimeProfile;
use crate::units::{KilometersPerHour, MetersPerSecond, Unit};

/// Where the reaction time comes from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReactionSource {
    /// Explicit reaction time in seconds
    Seconds(f64),
    /// Driver-condition tag resolved through the reaction-time table
    Condition(String),
}

impl ReactionSource {
    /// Resolve to seconds, plus the profile tag when one was used.
    pub fn resolve(&self) -> CalcResult<(f64, Option<String>)> {
        match self {
            ReactionSource::Seconds(t) => {
                require_positive("reaction_time_s", *t)?;
                Ok((*t, None))
            }
            ReactionSource::Condition(tag) => {
                let profile = ReactionTimeProfile::lookup(tag)?;
                Ok((profile.seconds, Some(profile.tag)))
            }
        }
    }
}

/// Input parameters for a reaction-distance calculation.
///
/// ## JSON Example
///
/// ```json
/// { "speed_kmh": 72.0, "reaction": { "condition": "distracted" }, "braking_distance_m": 30.0 }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReactionTimeInput {
    /// Speed in km/h (≥ 0)
    pub speed_kmh: f64,
    pub reaction: ReactionSource,
    /// Externally supplied braking distance in meters
    #[serde(default)]
    pub braking_distance_m: Option<f64>,
}

impl ReactionTimeInput {
    /// Validate input parameters.
    pub fn validate(&self) -> CalcResult<()> {
        require_non_negative("speed_kmh", self.speed_kmh)?;
        if let Some(braking) = self.braking_distance_m {
            require_non_negative("braking_distance_m", braking)?;
        }
        Ok(())
    }
}

/// Reaction leg plus braking leg.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StoppingDistance {
    pub reaction_m: f64,
    pub braking_m: f64,
    pub total_m: f64,
    /// Share of the total spent reacting (%)
    pub reaction_share_percent: f64,
    /// Share of the total spent braking (%)
    pub braking_share_percent: f64,
}

impl StoppingDistance {
    /// Combine the two legs. Shares are both 0 when the total is 0.
    pub fn new(reaction_m: f64, braking_m: f64) -> Self {
        let total_m = reaction_m + braking_m;
        let (reaction_share_percent, braking_share_percent) = if total_m > 0.0 {
            let reaction_share = reaction_m / total_m * 100.0;
            (reaction_share, 100.0 - reaction_share)
        } else {
            (0.0, 0.0)
        };
        Self {
            reaction_m,
            braking_m,
            total_m,
            reaction_share_percent,
            braking_share_percent,
        }
    }
}

/// Results from a reaction-distance calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReactionTimeResult {
    pub speed_kmh: f64,
    pub reaction_time_s: f64,
    /// Profile tag when the time came from the table
    pub driver_condition: Option<String>,
    pub reaction_distance_m: f64,
    /// Present when a braking distance was supplied
    pub stopping: Option<StoppingDistance>,
}

/// Calculate reaction distance (and stopping distance when braking is known).
///
/// # Returns
///
/// * `Err(CalcError::InvalidInput)` - non-positive explicit time, negative speed or braking distance
/// * `Err(CalcError::UnknownCondition)` - unknown driver-condition tag (valid tags enumerated)
pub fn calculate(input: &ReactionTimeInput) -> CalcResult<ReactionTimeResult> {
    input.validate()?;

    let (reaction_time_s, driver_condition) = input.reaction.resolve()?;
    let speed: MetersPerSecond = KilometersPerHour(input.speed_kmh).into();
    let reaction_distance_m = reaction_distance(speed.value(), reaction_time_s);

    Ok(ReactionTimeResult {
        speed_kmh: input.speed_kmh,
        reaction_time_s,
        driver_condition,
        reaction_distance_m,
        stopping: input
            .braking_distance_m
            .map(|braking| StoppingDistance::new(reaction_distance_m, braking)),
    })
}

impl From<&ReactionTimeResult> for CalculationResult {
    fn from(result: &ReactionTimeResult) -> Self {
        let mut summary = CalculationResult::new(CalculationKind::ReactionTime, Formula::ReactionDistance)
            .with_output("reaction_distance_m", result.reaction_distance_m, Unit::Meters)
            .with_output("reaction_time_s", result.reaction_time_s, Unit::Seconds)
            .with_output("speed_kmh", result.speed_kmh, Unit::KilometersPerHour);
        if let Some(stopping) = result.stopping {
            summary = summary
                .citing(Formula::StoppingDistance)
                .with_output("braking_distance_m", stopping.braking_m, Unit::Meters)
                .with_output("total_stopping_distance_m", stopping.total_m, Unit::Meters)
                .with_output("reaction_share_percent", stopping.reaction_share_percent, Unit::Percent)
                .with_output("braking_share_percent", stopping.braking_share_percent, Unit::Percent);
        }
        summary
    }
}
