//! # Report Bundle
//!
//! Plain, serializable container that groups the calculations behind one
//! forensic report. The core never stores it: the caller hands the JSON to
//! whatever record store or renderer it uses.
//!
//! ## Structure
//!
//! ```text
//! ReportBundle
//! ├── meta: ReportMetadata (version, case number, examiner, timestamps)
//! ├── settings: EngineSettings (defaults the calculations ran with)
//! └── entries: HashMap<Uuid, ReportEntry>
//! ```
//!
//! ## Example
//!
//! ```rust
//! use recon_core::dispatch::{DispatchOutcome, RequestDispatcher};
//! use recon_core::report::ReportBundle;
//!
//! let mut report = ReportBundle::new("Perita A. Souza", "BO 1234/2025", "IC-SP");
//! if let DispatchOutcome::Calculated(calc) = RequestDispatcher::default()
//!     .dispatch("marca de 25 metros em asfalto seco")
//!     .unwrap()
//! {
//!     report.add_dispatched("Veículo 1 - frenagem", &calc);
//! }
//! assert_eq!(report.entry_count(), 1);
//! ```

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::calculations::CalculationResult;
use crate::dispatch::DispatchedCalculation;
use crate::errors::CalcResult;
use crate::formulas::FormulaTracker;
use crate::settings::EngineSettings;

/// Current bundle schema version
pub const SCHEMA_VERSION: &str = "0.1.0";

/// Calculations behind one report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportBundle {
    pub meta: ReportMetadata,

    /// Settings the calculations were produced with
    pub settings: EngineSettings,

    /// All entries, keyed by UUID
    pub entries: HashMap<Uuid, ReportEntry>,
}

impl ReportBundle {
    /// Create an empty bundle.
    ///
    /// # Arguments
    ///
    /// * `examiner` - Responsible forensic examiner
    /// * `case_number` - Police report / case number
    /// * `agency` - Issuing agency
    pub fn new(examiner: impl Into<String>, case_number: impl Into<String>, agency: impl Into<String>) -> Self {
        let now = Utc::now();
        ReportBundle {
            meta: ReportMetadata {
                version: SCHEMA_VERSION.to_string(),
                examiner: examiner.into(),
                case_number: case_number.into(),
                agency: agency.into(),
                created: now,
                modified: now,
            },
            settings: EngineSettings::default(),
            entries: HashMap::new(),
        }
    }

    pub fn with_settings(mut self, settings: EngineSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Add an entry; returns its UUID.
    pub fn add_entry(&mut self, entry: ReportEntry) -> Uuid {
        let id = Uuid::new_v4();
        self.entries.insert(id, entry);
        self.touch();
        id
    }

    /// Add the primary result of a dispatched query.
    pub fn add_dispatched(&mut self, label: impl Into<String>, calc: &DispatchedCalculation) -> Uuid {
        self.add_entry(ReportEntry {
            label: label.into(),
            query: Some(calc.request.text.clone()),
            result: calc.result.clone(),
            supporting: calc.supporting.clone(),
            interpretation: Some(calc.interpretation.clone()),
            added: Utc::now(),
        })
    }

    pub fn remove_entry(&mut self, id: &Uuid) -> Option<ReportEntry> {
        let entry = self.entries.remove(id);
        if entry.is_some() {
            self.touch();
        }
        entry
    }

    pub fn get_entry(&self, id: &Uuid) -> Option<&ReportEntry> {
        self.entries.get(id)
    }

    /// Update the modified timestamp.
    pub fn touch(&mut self) {
        self.meta.modified = Utc::now();
    }

    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    /// Entries in the order they were added.
    pub fn ordered_entries(&self) -> Vec<(&Uuid, &ReportEntry)> {
        let mut entries: Vec<_> = self.entries.iter().collect();
        entries.sort_by(|(id_a, a), (id_b, b)| a.added.cmp(&b.added).then_with(|| id_a.cmp(id_b)));
        entries
    }

    /// Every formula used, labelled by entry, for the report's methodology section.
    pub fn formula_usage(&self) -> FormulaTracker {
        let mut tracker = FormulaTracker::new();
        for (_, entry) in self.ordered_entries() {
            tracker.merge(entry.formula_usage());
        }
        tracker
    }

    /// True when any entry carries an evidence flag.
    pub fn needs_review(&self) -> bool {
        self.entries.values().any(|e| e.result.needs_review())
    }

    pub fn to_json(&self) -> CalcResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> CalcResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Bundle header.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// Schema version
    pub version: String,

    pub examiner: String,

    pub case_number: String,

    pub agency: String,

    pub created: DateTime<Utc>,

    pub modified: DateTime<Utc>,
}

/// One calculation in a report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportEntry {
    /// Short label shown in the report ("Veículo 1 - frenagem")
    pub label: String,
    /// Originating free-text query, if any
    pub query: Option<String>,
    pub result: CalculationResult,
    #[serde(default)]
    pub supporting: Vec<CalculationResult>,
    pub interpretation: Option<String>,
    pub added: DateTime<Utc>,
}

impl ReportEntry {
    /// Formulas behind this entry, primary result first.
    pub fn formula_usage(&self) -> FormulaTracker {
        let mut tracker = FormulaTracker::new();
        tracker.record(self.result.formula, self.label.clone());
        for supporting in &self.supporting {
            tracker.record(supporting.formula, self.label.clone());
        }
        tracker
    }

    /// Entry for a result computed directly, without a query.
    pub fn from_result(label: impl Into<String>, result: CalculationResult) -> Self {
        ReportEntry {
            label: label.into(),
            query: None,
            result,
            supporting: Vec::new(),
            interpretation: None,
            added: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::impact_point::{from_damage, DamageLocation, DamageSeverity, VehicleDamage};
    use crate::analysis::SpatialPoint;
    use crate::calculations::kinetic_energy::{self, KineticEnergyInput};
    use crate::dispatch::{dispatch, DispatchOutcome};
    use crate::formulas::Formula;

    fn energy_entry() -> ReportEntry {
        let result = kinetic_energy::calculate(&KineticEnergyInput {
            mass_kg: 1200.0,
            speed_kmh: 60.0,
        })
        .unwrap();
        ReportEntry::from_result("Energia V1", CalculationResult::from(&result))
    }

    #[test]
    fn test_bundle_creation() {
        let report = ReportBundle::new("Perito", "BO 1/2025", "IC");
        assert_eq!(report.meta.examiner, "Perito");
        assert_eq!(report.meta.version, SCHEMA_VERSION);
        assert_eq!(report.entry_count(), 0);
    }

    #[test]
    fn test_add_remove_entry() {
        let mut report = ReportBundle::new("Perito", "BO 1/2025", "IC");
        let id = report.add_entry(energy_entry());
        assert!(report.get_entry(&id).is_some());
        assert!(report.remove_entry(&id).is_some());
        assert!(report.remove_entry(&id).is_none());
        assert_eq!(report.entry_count(), 0);
    }

    #[test]
    fn test_dispatched_entry_and_formula_usage() {
        let mut report = ReportBundle::new("Perito", "BO 1/2025", "IC");
        let text = "dano: 1200 kg a 50 km/h e 1500 kg a 30 km/h, arrasto de 10 metros";
        let DispatchOutcome::Calculated(calc) = dispatch(text).unwrap() else {
            panic!("expected a calculation");
        };
        report.add_dispatched("Colisão", &calc);

        let tracker = report.formula_usage();
        assert_eq!(
            tracker.unique_formulas(),
            vec![Formula::VectorSpeedCombination, Formula::DamageSpeed, Formula::DragSpeed]
        );
    }

    #[test]
    fn test_formula_usage_merges_entries() {
        let mut report = ReportBundle::new("Perito", "BO 1/2025", "IC");
        let mut first = energy_entry();
        first.label = "Energia V1".to_string();
        let mut second = energy_entry();
        second.label = "Energia V2".to_string();
        second.added = first.added + chrono::Duration::seconds(1);
        report.add_entry(first);
        report.add_entry(second);

        let tracker = report.formula_usage();
        assert_eq!(tracker.unique_formulas(), vec![Formula::KineticEnergy]);
        let contexts: Vec<_> = tracker.usages().iter().map(|u| u.context.as_str()).collect();
        assert_eq!(contexts, vec!["Energia V1", "Energia V2"]);
    }

    #[test]
    fn test_needs_review() {
        let mut report = ReportBundle::new("Perito", "BO 1/2025", "IC");
        report.add_entry(energy_entry());
        assert!(!report.needs_review());

        let a = VehicleDamage::new(DamageLocation::Roof, DamageSeverity::Low, SpatialPoint::new(0.0, 0.0));
        let b = VehicleDamage::new(DamageLocation::Front, DamageSeverity::Low, SpatialPoint::new(3.0, 0.0));
        let estimate = from_damage(&a, &b).unwrap();
        report.add_entry(ReportEntry::from_result("Ponto de impacto", CalculationResult::from(&estimate)));
        assert!(report.needs_review());
    }

    #[test]
    fn test_json_roundtrip() {
        let mut report = ReportBundle::new("Perita", "BO 42/2025", "IC-SP");
        let id = report.add_entry(energy_entry());

        let json = report.to_json().unwrap();
        assert!(json.contains("BO 42/2025"));

        let roundtrip = ReportBundle::from_json(&json).unwrap();
        assert_eq!(roundtrip.meta.case_number, "BO 42/2025");
        assert_eq!(roundtrip.get_entry(&id).unwrap().label, "Energia V1");
        assert!(ReportBundle::from_json("{}").is_err());
    }
}
