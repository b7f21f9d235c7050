//! # Reconstruction Formulas
//!
//! All closed-form physics used by the calculators lives here, in one place,
//! so it can be audited against the literature.
//!
//! ## Modules
//!
//! - [`kinematics`] - slide speed, braking, energy, reaction distance
//! - [`registry`] - formula metadata, citations and usage tracking
//!
//! ## Conventions
//!
//! - SI units throughout (m, s, kg, m/s); km/h only at reporting boundaries
//! - Headings are compass bearings in degrees: 0° = +y (north), 90° = +x (east)

pub mod kinematics;
pub mod registry;

pub use kinematics::{
    braking_distance,
    braking_time,
    combine_speeds,
    damage_speed,
    decelerated_distance,
    free_fall_height,
    kinetic_energy,
    reaction_distance,
    slide_speed,
    GRAVITY_MS2,
};

pub use registry::{
    Formula,
    FormulaCategory,
    FormulaMetadata,
    FormulaTracker,
    FormulaUsage,
    LiteratureReference,
    Variable,
    ALL_FORMULAS,
    generate_formulas_markdown,
};
