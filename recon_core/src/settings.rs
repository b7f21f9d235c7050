//! # Engine Settings
//!
//! Defaults the dispatcher falls back on when a query leaves something
//! unsaid, plus the elaboration timeout.
//!
//! Every field has a default, so a settings file only needs the values
//! it changes:
//!
//! ```rust
//! use recon_core::settings::EngineSettings;
//!
//! let settings = EngineSettings::from_json(r#"{ "default_condition": "wet" }"#).unwrap();
//! assert_eq!(settings.default_condition, "wet");
//! assert_eq!(settings.default_surface, "asphalt");
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::calculations::DragFriction;
use crate::errors::{CalcError, CalcResult};
use crate::reference::{friction, ReactionTimeProfile};

/// Dispatcher and engine defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Surface assumed when a query names none
    pub default_surface: String,

    /// Condition assumed when a query names none
    pub default_condition: String,

    /// Driver state assumed for reaction-time queries without one
    pub default_driver_state: String,

    /// Drag-factor band for drag-speed queries
    pub drag_friction: DragFriction,

    /// Upper bound on the external elaboration call (ms)
    pub elaboration_timeout_ms: u64,

    /// Append formula citations to the deterministic explanation
    pub attach_citations: bool,
}

impl Default for EngineSettings {
    fn default() -> Self {
        EngineSettings {
            default_surface: "asphalt".to_string(),
            default_condition: "dry".to_string(),
            default_driver_state: "normal".to_string(),
            drag_friction: DragFriction::default(),
            elaboration_timeout_ms: 3_000,
            attach_citations: true,
        }
    }
}

impl EngineSettings {
    /// Parse settings from (possibly partial) JSON and validate them.
    pub fn from_json(json: &str) -> CalcResult<Self> {
        let settings: EngineSettings =
            serde_json::from_str(json).map_err(|e| CalcError::serialization(format!("settings: {}", e)))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Check that every default resolves against the reference tables.
    pub fn validate(&self) -> CalcResult<()> {
        friction::FrictionCoefficient::lookup(&self.default_surface, &self.default_condition)?;
        ReactionTimeProfile::lookup(&self.default_driver_state)?;
        self.drag_friction.validate()?;
        if self.elaboration_timeout_ms == 0 {
            return Err(CalcError::invalid_input(
                "elaboration_timeout_ms",
                "0",
                "Timeout must be at least 1 ms",
            ));
        }
        Ok(())
    }

    pub fn elaboration_timeout(&self) -> Duration {
        Duration::from_millis(self.elaboration_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let settings = EngineSettings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.elaboration_timeout(), Duration::from_secs(3));
    }

    #[test]
    fn test_partial_json() {
        let settings = EngineSettings::from_json(r#"{ "elaboration_timeout_ms": 250, "attach_citations": false }"#).unwrap();
        assert_eq!(settings.elaboration_timeout_ms, 250);
        assert!(!settings.attach_citations);
        assert_eq!(settings.default_driver_state, "normal");
    }

    #[test]
    fn test_aliases_accepted() {
        let settings = EngineSettings::from_json(r#"{ "default_surface": "concreto", "default_condition": "molhado" }"#);
        assert!(settings.is_ok());
    }

    #[test]
    fn test_invalid_settings() {
        let err = EngineSettings::from_json("{ not json").unwrap_err();
        assert_eq!(err.error_code(), "SERIALIZATION_ERROR");

        let err = EngineSettings::from_json(r#"{ "default_surface": "sand" }"#).unwrap_err();
        assert_eq!(err.error_code(), "UNKNOWN_SURFACE");

        assert!(EngineSettings::from_json(r#"{ "elaboration_timeout_ms": 0 }"#).is_err());
        assert!(EngineSettings::from_json(r#"{ "drag_friction": { "mean": 0.9, "min": 0.5, "max": 0.8 } }"#).is_err());
    }

    #[test]
    fn test_roundtrip() {
        let settings = EngineSettings::default();
        let json = serde_json::to_string_pretty(&settings).unwrap();
        let roundtrip = EngineSettings::from_json(&json).unwrap();
        assert_eq!(roundtrip.default_surface, settings.default_surface);
        assert_eq!(roundtrip.drag_friction.mean, settings.drag_friction.mean);
    }
}
