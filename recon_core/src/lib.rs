//! # recon_core - Traffic-Accident Reconstruction Engine
//!
//! `recon_core` is the computational heart of Recon, providing the forensic
//! physics behind accident reports with a clean, LLM-friendly API. All inputs
//! and outputs are JSON-serializable, so results can be handed to an
//! assistant, a report renderer or a record store without adaptation.
//!
//! ## Design Philosophy
//!
//! - **Stateless**: Pure functions that take input and return results
//! - **JSON-First**: All types implement Serialize/Deserialize
//! - **Rich Errors**: Structured error types, not just strings
//! - **Citable**: Every result names the formula and literature it used
//!
//! ## Quick Start
//!
//! ```rust
//! use recon_core::{dispatch, DispatchOutcome};
//!
//! // Free text in, typed calculation out
//! match dispatch("A marca tem 25 metros em asfalto seco").unwrap() {
//!     DispatchOutcome::Calculated(calc) => {
//!         println!("{}", calc.interpretation);
//!         let json = serde_json::to_string_pretty(&calc.result).unwrap();
//!         assert!(json.contains("speed_kmh"));
//!     }
//!     other => panic!("unexpected outcome: {:?}", other),
//! }
//! ```
//!
//! ## Modules
//!
//! - [`reference`] - Friction and reaction-time tables
//! - [`calculations`] - Formula calculators (skid, drag, energy, reaction, damage)
//! - [`analysis`] - Impact point, trajectories, interception, visibility
//! - [`formulas`] - Closed-form physics and the citable formula registry
//! - [`dispatch`] - Free-text (pt-BR) query routing
//! - [`report`] - Serializable bundle of calculations for one case
//! - [`settings`] - Engine defaults
//! - [`units`] - Type-safe unit wrappers
//! - [`errors`] - Structured error types

pub mod analysis;
pub mod calculations;
pub mod dispatch;
pub mod errors;
pub mod formulas;
pub mod reference;
pub mod report;
pub mod settings;
pub mod units;

// Re-export commonly used types at crate root for convenience
pub use calculations::{CalculationKind, CalculationResult, EvidenceFlag};
pub use dispatch::{dispatch, DispatchOutcome, DispatchedCalculation, RequestDispatcher};
pub use errors::{CalcError, CalcResult};
pub use formulas::{Formula, FormulaTracker};
pub use report::{ReportBundle, ReportEntry, ReportMetadata};
pub use settings::EngineSettings;
