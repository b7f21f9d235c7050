//! # Formula Registry
//!
//! Central registry of every formula the engine applies. Each formula has
//! metadata including a literature reference, a plain-text rendering and
//! variable definitions, so a forensic report can cite exactly what was
//! computed.
//!
//! ## Usage
//!
//! ```rust
//! use recon_core::formulas::registry::{Formula, FormulaTracker};
//!
//! let mut tracker = FormulaTracker::new();
//! tracker.record(Formula::SkidSpeed, "Vehicle A skid");
//!
//! let meta = Formula::SkidSpeed.metadata();
//! assert_eq!(meta.formula_plain, "v = sqrt(2 * mu * g * d)");
//! assert!(!tracker.citations().is_empty());
//! ```

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

// ============================================================================
// Literature References
// ============================================================================

/// Reference to the published source of a formula.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum LiteratureReference {
    /// Fricke, Traffic Accident Reconstruction (Northwestern University Traffic Institute, 1990)
    Fricke { chapter: u8 },
    /// Brach & Brach, Vehicle Accident Analysis and Reconstruction Methods
    Brach { edition: u8, chapter: u8 },
    /// AASHTO, A Policy on Geometric Design of Highways and Streets
    Aashto {
        year: u16,
        section: &'static str,
    },
    /// Olson & Farber, Forensic Aspects of Driver Perception and Response
    OlsonFarber { edition: u8 },
    /// Fundamental mechanics (no specific reference needed)
    Mechanics,
}

impl LiteratureReference {
    /// Full citation string for reports
    pub fn citation(&self) -> String {
        match self {
            LiteratureReference::Fricke { chapter } => {
                format!("Fricke, Traffic Accident Reconstruction (1990), ch. {}", chapter)
            }
            LiteratureReference::Brach { edition, chapter } => {
                format!(
                    "Brach & Brach, Vehicle Accident Analysis and Reconstruction Methods, {}ed, ch. {}",
                    edition, chapter
                )
            }
            LiteratureReference::Aashto { year, section } => {
                format!("AASHTO Green Book {}, Section {}", year, section)
            }
            LiteratureReference::OlsonFarber { edition } => {
                format!("Olson & Farber, Forensic Aspects of Driver Perception and Response, {}ed", edition)
            }
            LiteratureReference::Mechanics => "Fundamental Mechanics".to_string(),
        }
    }

    /// Short form for inline references
    pub fn short_form(&self) -> &'static str {
        match self {
            LiteratureReference::Fricke { .. } => "Fricke",
            LiteratureReference::Brach { .. } => "Brach",
            LiteratureReference::Aashto { .. } => "AASHTO",
            LiteratureReference::OlsonFarber { .. } => "Olson & Farber",
            LiteratureReference::Mechanics => "Mechanics",
        }
    }
}

// ============================================================================
// Formula Categories
// ============================================================================

/// Categories for grouping formulas in the audit document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FormulaCategory {
    /// Speed from friction evidence
    Speed,
    /// Kinetic energy and damage
    Energy,
    /// Reaction and stopping
    TimeDistance,
    /// Impact point and trajectories
    Geometry,
    /// Interception timing
    Interception,
    /// Sight lines and sight distance
    Visibility,
}

impl FormulaCategory {
    /// Display name for the category
    pub fn display_name(&self) -> &'static str {
        match self {
            FormulaCategory::Speed => "Speed",
            FormulaCategory::Energy => "Energy",
            FormulaCategory::TimeDistance => "Reaction & Stopping",
            FormulaCategory::Geometry => "Impact Geometry",
            FormulaCategory::Interception => "Interception",
            FormulaCategory::Visibility => "Visibility",
        }
    }

    /// Sort order in the audit document (lower = earlier)
    pub fn sort_order(&self) -> u8 {
        match self {
            FormulaCategory::Speed => 1,
            FormulaCategory::Energy => 2,
            FormulaCategory::TimeDistance => 3,
            FormulaCategory::Geometry => 4,
            FormulaCategory::Interception => 5,
            FormulaCategory::Visibility => 6,
        }
    }
}

// ============================================================================
// Variable Definition
// ============================================================================

/// Definition of a variable used in a formula.
#[derive(Debug, Clone)]
pub struct Variable {
    pub symbol: &'static str,
    pub description: &'static str,
    pub units: &'static str,
}

impl Variable {
    pub const fn new(symbol: &'static str, description: &'static str, units: &'static str) -> Self {
        Self { symbol, description, units }
    }
}

// ============================================================================
// Formula Metadata
// ============================================================================

/// Complete metadata for a reconstruction formula.
#[derive(Debug, Clone)]
pub struct FormulaMetadata {
    /// Human-readable name
    pub name: &'static str,
    /// What the formula computes
    pub description: &'static str,
    /// Plain-text rendering
    pub formula_plain: &'static str,
    /// Published source
    pub reference: LiteratureReference,
    /// Variable definitions
    pub variables: Vec<Variable>,
    /// Assumptions or limitations
    pub assumptions: Vec<&'static str>,
    /// Grouping for the audit document
    pub category: FormulaCategory,
    /// Source module where the implementation lives
    pub source_module: &'static str,
    /// Function implementing the formula
    pub source_function: &'static str,
}

// ============================================================================
// Formula Enum
// ============================================================================

/// Every formula applied by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum Formula {
    /// v = √(2μgd) from a braking skid
    SkidSpeed,
    /// v = √(2μgd) over a μ band for a post-collision drag
    DragSpeed,
    /// d = v²/(2μg)
    BrakingDistance,
    /// Ec = ½mv²
    KineticEnergy,
    /// h = (Ec/m)/g
    FreeFallHeight,
    /// d_r = v·t_r
    ReactionDistance,
    /// d_total = d_r + d_b
    StoppingDistance,
    /// v_damage = v₁ ± v₂
    DamageSpeed,
    /// v = √(v_damage² + v_drag²)
    VectorSpeedCombination,
    /// Confidence-weighted centroid of ground marks
    WeightedCentroid,
    /// Back-projection from rest positions along damage headings
    DamageBackProjection,
    /// Uniform-velocity back-projection before impact
    UniformBackProjection,
    /// Post-impact deceleration check against measured displacement
    PostImpactDeceleration,
    /// Clearing time vs arrival time margin
    InterceptionMargin,
    /// Maximum approach speed for a required margin
    InterceptionInverseSpeed,
    /// Sight-line blockage by projected obstacles
    SightLineBlockage,
    /// AASHTO-style minimum sight distance
    MinimumSightDistance,
    /// Intersection sight-triangle area
    SightTriangle,
}

impl Formula {
    /// Get the full metadata for this formula
    pub fn metadata(&self) -> FormulaMetadata {
        match self {
            Formula::SkidSpeed => FormulaMetadata {
                name: "Speed from Skid Marks",
                description: "Initial speed of a vehicle braking to rest over a measured skid",
                formula_plain: "v = sqrt(2 * mu * g * d)",
                reference: LiteratureReference::Fricke { chapter: 62 },
                variables: vec![
                    Variable::new("v", "Speed at start of skid", "m/s"),
                    Variable::new("mu", "Tire/road friction coefficient", "-"),
                    Variable::new("g", "Gravitational acceleration (9.81)", "m/s^2"),
                    Variable::new("d", "Skid length", "m"),
                ],
                assumptions: vec![
                    "Vehicle skids to rest",
                    "Level surface",
                    "Uniform friction along the skid",
                ],
                category: FormulaCategory::Speed,
                source_module: "calculations/skid_speed.rs",
                source_function: "calculate",
            },
            Formula::DragSpeed => FormulaMetadata {
                name: "Speed from Post-Collision Drag",
                description: "Speed of an uncontrolled vehicle sliding to rest, over a friction band",
                formula_plain: "v_i = sqrt(2 * mu_i * g * d), mu_i in {mu_min, mu_mean, mu_max}",
                reference: LiteratureReference::Brach { edition: 2, chapter: 3 },
                variables: vec![
                    Variable::new("v_i", "Speed at start of drag for mu_i", "m/s"),
                    Variable::new("mu_i", "Drag factor (min, mean, max)", "-"),
                    Variable::new("d", "Drag length", "m"),
                ],
                assumptions: vec!["Vehicle out of directional control", "Drag factor band covers rotation and gouging"],
                category: FormulaCategory::Speed,
                source_module: "calculations/drag_speed.rs",
                source_function: "calculate",
            },
            Formula::BrakingDistance => FormulaMetadata {
                name: "Braking Distance",
                description: "Distance to stop at constant deceleration mu*g",
                formula_plain: "d = v^2 / (2 * mu * g)",
                reference: LiteratureReference::Fricke { chapter: 62 },
                variables: vec![
                    Variable::new("d", "Braking distance", "m"),
                    Variable::new("v", "Initial speed", "m/s"),
                    Variable::new("mu", "Friction coefficient", "-"),
                ],
                assumptions: vec!["Constant deceleration"],
                category: FormulaCategory::TimeDistance,
                source_module: "formulas/kinematics.rs",
                source_function: "braking_distance",
            },
            Formula::KineticEnergy => FormulaMetadata {
                name: "Kinetic Energy",
                description: "Translational kinetic energy of a vehicle",
                formula_plain: "Ec = 0.5 * m * v^2",
                reference: LiteratureReference::Mechanics,
                variables: vec![
                    Variable::new("Ec", "Kinetic energy", "J"),
                    Variable::new("m", "Vehicle mass", "kg"),
                    Variable::new("v", "Speed", "m/s"),
                ],
                assumptions: vec!["Rotational energy neglected"],
                category: FormulaCategory::Energy,
                source_module: "formulas/kinematics.rs",
                source_function: "kinetic_energy",
            },
            Formula::FreeFallHeight => FormulaMetadata {
                name: "Equivalent Free-Fall Height",
                description: "Height of a fall producing the same energy per kilogram",
                formula_plain: "h = (Ec / m) / g",
                reference: LiteratureReference::Mechanics,
                variables: vec![
                    Variable::new("h", "Equivalent fall height", "m"),
                    Variable::new("Ec/m", "Energy per kilogram", "J/kg"),
                ],
                assumptions: vec!["Severity proxy only"],
                category: FormulaCategory::Energy,
                source_module: "formulas/kinematics.rs",
                source_function: "free_fall_height",
            },
            Formula::ReactionDistance => FormulaMetadata {
                name: "Reaction Distance",
                description: "Distance travelled before the driver begins to respond",
                formula_plain: "d_r = v * t_r",
                reference: LiteratureReference::OlsonFarber { edition: 2 },
                variables: vec![
                    Variable::new("d_r", "Reaction distance", "m"),
                    Variable::new("v", "Speed", "m/s"),
                    Variable::new("t_r", "Perception-reaction time", "s"),
                ],
                assumptions: vec!["Constant speed during reaction"],
                category: FormulaCategory::TimeDistance,
                source_module: "formulas/kinematics.rs",
                source_function: "reaction_distance",
            },
            Formula::StoppingDistance => FormulaMetadata {
                name: "Total Stopping Distance",
                description: "Reaction distance plus braking distance",
                formula_plain: "d_total = d_r + d_b",
                reference: LiteratureReference::Aashto { year: 2018, section: "3.2.2" },
                variables: vec![
                    Variable::new("d_total", "Total stopping distance", "m"),
                    Variable::new("d_b", "Braking distance", "m"),
                ],
                assumptions: vec![],
                category: FormulaCategory::TimeDistance,
                source_module: "calculations/reaction_time.rs",
                source_function: "StoppingDistance::new",
            },
            Formula::DamageSpeed => FormulaMetadata {
                name: "Damage Speed",
                description: "Closing speed used as an energy-equivalent damage proxy",
                formula_plain: "v_damage = v1 + v2 (same direction), |v1 - v2| (opposite)",
                reference: LiteratureReference::Brach { edition: 2, chapter: 8 },
                variables: vec![
                    Variable::new("v1", "Vehicle 1 speed", "km/h"),
                    Variable::new("v2", "Vehicle 2 speed", "km/h"),
                ],
                assumptions: vec!["No mass weighting; known physical simplification"],
                category: FormulaCategory::Energy,
                source_module: "formulas/kinematics.rs",
                source_function: "damage_speed",
            },
            Formula::VectorSpeedCombination => FormulaMetadata {
                name: "Pre-Impact Speed Combination",
                description: "Combines damage speed and post-impact drag speed",
                formula_plain: "v_total = sqrt(v_damage^2 + v_drag^2)",
                reference: LiteratureReference::Fricke { chapter: 66 },
                variables: vec![
                    Variable::new("v_damage", "Damage speed", "km/h"),
                    Variable::new("v_drag", "Drag speed", "km/h"),
                ],
                assumptions: vec!["Components treated as orthogonal"],
                category: FormulaCategory::Energy,
                source_module: "formulas/kinematics.rs",
                source_function: "combine_speeds",
            },
            Formula::WeightedCentroid => FormulaMetadata {
                name: "Weighted Mark Centroid",
                description: "Impact point as the confidence-weighted centroid of ground marks",
                formula_plain: "P = sum(w_i * p_i) / sum(w_i)",
                reference: LiteratureReference::Fricke { chapter: 52 },
                variables: vec![
                    Variable::new("p_i", "Mark position", "m"),
                    Variable::new("w_i", "Mark confidence (0.9 drag, 0.85 fluid, 0.7 scuff)", "-"),
                ],
                assumptions: vec!["Marks originate at the point of maximum engagement"],
                category: FormulaCategory::Geometry,
                source_module: "analysis/impact_point.rs",
                source_function: "from_ground_marks",
            },
            Formula::DamageBackProjection => FormulaMetadata {
                name: "Damage Back-Projection",
                description: "Impact point from rest positions projected back along damage headings",
                formula_plain: "O_k = R_k - s_k * u(theta_k); P = (O_1 + O_2) / 2",
                reference: LiteratureReference::Brach { edition: 2, chapter: 7 },
                variables: vec![
                    Variable::new("R_k", "Rest position", "m"),
                    Variable::new("s_k", "Displacement by severity (2/5/10/15)", "m"),
                    Variable::new("theta_k", "Heading from damage location", "deg"),
                ],
                assumptions: vec!["Straight-line post-impact travel"],
                category: FormulaCategory::Geometry,
                source_module: "analysis/impact_point.rs",
                source_function: "from_damage",
            },
            Formula::UniformBackProjection => FormulaMetadata {
                name: "Uniform Back-Projection",
                description: "Positions before impact at constant approach velocity",
                formula_plain: "p(t) = P - v * t * u(theta)",
                reference: LiteratureReference::Mechanics,
                variables: vec![
                    Variable::new("t", "Time before impact", "s"),
                    Variable::new("theta", "Approach heading", "deg"),
                ],
                assumptions: vec!["Constant speed and heading"],
                category: FormulaCategory::Geometry,
                source_module: "analysis/trajectory.rs",
                source_function: "pre_impact",
            },
            Formula::PostImpactDeceleration => FormulaMetadata {
                name: "Post-Impact Deceleration Check",
                description: "Theoretical run-out compared with measured displacement",
                formula_plain: "d_theory = v^2 / (2 * mu * g); flag if |d_measured - d_theory| > 2 m",
                reference: LiteratureReference::Fricke { chapter: 66 },
                variables: vec![
                    Variable::new("d_measured", "Impact to rest distance", "m"),
                    Variable::new("d_theory", "Theoretical stopping distance", "m"),
                ],
                assumptions: vec!["Level surface", "No secondary impacts"],
                category: FormulaCategory::Geometry,
                source_module: "analysis/trajectory.rs",
                source_function: "post_impact",
            },
            Formula::InterceptionMargin => FormulaMetadata {
                name: "Interception Margin",
                description: "Time the approaching vehicle needs minus the time to clear",
                formula_plain: "margin = d_a / v_a - (t_r + d_c / v_m)",
                reference: LiteratureReference::Fricke { chapter: 72 },
                variables: vec![
                    Variable::new("d_a", "Approaching vehicle distance", "m"),
                    Variable::new("v_a", "Approaching vehicle speed", "m/s"),
                    Variable::new("d_c", "Distance to clear the conflict zone", "m"),
                    Variable::new("v_m", "Maneuvering vehicle speed", "m/s"),
                ],
                assumptions: vec!["Constant speeds", "SAFE > 2 s, RISKY in (0, 2], COLLISION <= 0"],
                category: FormulaCategory::Interception,
                source_module: "analysis/interception.rs",
                source_function: "analyze",
            },
            Formula::InterceptionInverseSpeed => FormulaMetadata {
                name: "Maximum Safe Approach Speed",
                description: "Highest approach speed that preserves a required margin",
                formula_plain: "v_max = d_a / (t_clear + margin)",
                reference: LiteratureReference::Fricke { chapter: 72 },
                variables: vec![Variable::new("t_clear", "Clearing time", "s")],
                assumptions: vec!["Constant speeds"],
                category: FormulaCategory::Interception,
                source_module: "analysis/interception.rs",
                source_function: "max_safe_speed",
            },
            Formula::SightLineBlockage => FormulaMetadata {
                name: "Sight-Line Blockage",
                description: "Obstacle projected onto the observer-target line blocks if taller than the line",
                formula_plain: "t = (O - A).(B - A) / |B - A|^2; blocked if h_o > h_A + t * (h_B - h_A)",
                reference: LiteratureReference::Aashto { year: 2018, section: "9.5" },
                variables: vec![
                    Variable::new("t", "Projection parameter along the sight line", "-"),
                    Variable::new("h_o", "Obstacle height", "m"),
                ],
                assumptions: vec!["Flat terrain between observer and target"],
                category: FormulaCategory::Visibility,
                source_module: "analysis/visibility.rs",
                source_function: "analyze_sight_line",
            },
            Formula::MinimumSightDistance => FormulaMetadata {
                name: "Minimum Sight Distance",
                description: "Reaction distance plus half the braking-time distance, with 25% margin",
                formula_plain: "SD = 1.25 * (v * t_r + v * t_b / 2)",
                reference: LiteratureReference::Aashto { year: 2018, section: "3.2.2" },
                variables: vec![
                    Variable::new("t_b", "Braking time", "s"),
                    Variable::new("t_r", "Reaction time", "s"),
                ],
                assumptions: vec!["Uniform deceleration during braking"],
                category: FormulaCategory::Visibility,
                source_module: "analysis/visibility.rs",
                source_function: "minimum_sight_distance",
            },
            Formula::SightTriangle => FormulaMetadata {
                name: "Intersection Sight Triangle",
                description: "Clear area required for mutual visibility at an intersection",
                formula_plain: "A = 0.5 * (v1 * t) * (v2 * t)",
                reference: LiteratureReference::Aashto { year: 2018, section: "9.5.3" },
                variables: vec![
                    Variable::new("v1, v2", "Approach speeds", "m/s"),
                    Variable::new("t", "Crossing time", "s"),
                ],
                assumptions: vec!["Right-angle intersection"],
                category: FormulaCategory::Visibility,
                source_module: "analysis/visibility.rs",
                source_function: "sight_triangle",
            },
        }
    }

    /// Citation string for this formula
    pub fn citation(&self) -> String {
        let meta = self.metadata();
        format!("{}: {} ({})", meta.name, meta.formula_plain, meta.reference.citation())
    }

    /// All formulas in a category
    pub fn in_category(category: FormulaCategory) -> Vec<Formula> {
        ALL_FORMULAS
            .iter()
            .copied()
            .filter(|f| f.metadata().category == category)
            .collect()
    }

    /// All categories, in document order
    pub fn all_categories() -> Vec<FormulaCategory> {
        let mut categories = vec![
            FormulaCategory::Speed,
            FormulaCategory::Energy,
            FormulaCategory::TimeDistance,
            FormulaCategory::Geometry,
            FormulaCategory::Interception,
            FormulaCategory::Visibility,
        ];
        categories.sort_by_key(|c| c.sort_order());
        categories
    }
}

/// All formulas, for iteration
pub static ALL_FORMULAS: &[Formula] = &[
    Formula::SkidSpeed,
    Formula::DragSpeed,
    Formula::BrakingDistance,
    Formula::KineticEnergy,
    Formula::FreeFallHeight,
    Formula::ReactionDistance,
    Formula::StoppingDistance,
    Formula::DamageSpeed,
    Formula::VectorSpeedCombination,
    Formula::WeightedCentroid,
    Formula::DamageBackProjection,
    Formula::UniformBackProjection,
    Formula::PostImpactDeceleration,
    Formula::InterceptionMargin,
    Formula::InterceptionInverseSpeed,
    Formula::SightLineBlockage,
    Formula::MinimumSightDistance,
    Formula::SightTriangle,
];

// ============================================================================
// Usage Tracking
// ============================================================================

/// One application of a formula.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormulaUsage {
    pub formula: Formula,
    /// Where it was applied (e.g., "Vehicle A skid")
    pub context: String,
}

/// Records which formulas a report relies on.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FormulaTracker {
    usages: Vec<FormulaUsage>,
}

impl FormulaTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a formula application
    pub fn record(&mut self, formula: Formula, context: impl Into<String>) {
        self.usages.push(FormulaUsage {
            formula,
            context: context.into(),
        });
    }

    pub fn usages(&self) -> &[FormulaUsage] {
        &self.usages
    }

    /// Distinct formulas in first-use order
    pub fn unique_formulas(&self) -> Vec<Formula> {
        let mut seen = Vec::new();
        for usage in &self.usages {
            if !seen.contains(&usage.formula) {
                seen.push(usage.formula);
            }
        }
        seen
    }

    /// Usages grouped by formula
    pub fn by_formula(&self) -> HashMap<Formula, Vec<&FormulaUsage>> {
        let mut map: HashMap<Formula, Vec<&FormulaUsage>> = HashMap::new();
        for usage in &self.usages {
            map.entry(usage.formula).or_default().push(usage);
        }
        map
    }

    /// Distinct citation strings, in first-use order
    pub fn citations(&self) -> Vec<String> {
        self.unique_formulas().iter().map(Formula::citation).collect()
    }

    /// Merge another tracker into this one
    pub fn merge(&mut self, other: FormulaTracker) {
        self.usages.extend(other.usages);
    }
}

// ============================================================================
// Markdown Generation for FORMULAS.md
// ============================================================================

/// Generate the FORMULAS.md audit document.
///
/// # Example
///
/// ```rust
/// use recon_core::formulas::registry::generate_formulas_markdown;
///
/// let markdown = generate_formulas_markdown();
/// assert!(markdown.contains("Recon Formulas Reference"));
/// assert!(markdown.contains("Speed from Skid Marks"));
/// ```
pub fn generate_formulas_markdown() -> String {
    let mut output = String::with_capacity(16_000);

    output.push_str(
        r#"# Recon Formulas Reference

> **Auto-generated from source code. Do not edit manually.**
>
> Regenerate with: `cargo run --bin gen-formulas`

Every formula applied by the reconstruction engine, with its source and
assumptions. Units are SI; speeds are reported in km/h.

---

"#,
    );

    for category in Formula::all_categories() {
        let formulas = Formula::in_category(category);
        if formulas.is_empty() {
            continue;
        }

        output.push_str(&format!("## {}\n\n", category.display_name()));

        for formula in formulas {
            let meta = formula.metadata();
            output.push_str(&format!("### {}\n\n", meta.name));
            output.push_str(&format!("{}\n\n", meta.description));
            output.push_str(&format!("**Formula:** `{}`\n\n", meta.formula_plain));

            if !meta.variables.is_empty() {
                output.push_str("| Symbol | Description | Units |\n");
                output.push_str("|--------|-------------|-------|\n");
                for var in &meta.variables {
                    output.push_str(&format!("| {} | {} | {} |\n", var.symbol, var.description, var.units));
                }
                output.push('\n');
            }

            if !meta.assumptions.is_empty() {
                output.push_str("**Assumptions:**\n");
                for assumption in &meta.assumptions {
                    output.push_str(&format!("- {}\n", assumption));
                }
                output.push('\n');
            }

            output.push_str(&format!("**Reference:** {}\n\n", meta.reference.citation()));
            output.push_str(&format!(
                "**Source:** `{}` → `{}()`\n\n---\n\n",
                meta.source_module, meta.source_function
            ));
        }
    }

    output
}
