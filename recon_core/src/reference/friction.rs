//! Friction coefficient table (surface × condition).
//!
//! Keys are `"<surface>_<condition>"` for surfaces whose grip depends on
//! moisture, and `"<surface>"` alone for intrinsically wet or loose surfaces
//! (mud, snow, ice). Callers may use canonical keys or any alias from
//! `data/friction.toml` ("asfalto", "molhado", ...).

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{friction_data, normalize_term, ConditionRecord, SurfaceRecord};
use crate::errors::{CalcError, CalcResult};

/// One way of turning a (surface, condition) request into a table key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrictionLookup {
    /// `"<surface>_<condition>"`
    SurfaceCondition,
    /// `"<surface>"`, for surfaces with a single coefficient
    SurfaceOnly,
}

impl FrictionLookup {
    /// Compose the table key for this strategy.
    pub fn key(&self, surface: &str, condition: &str) -> String {
        match self {
            FrictionLookup::SurfaceCondition => format!("{}_{}", surface, condition),
            FrictionLookup::SurfaceOnly => surface.to_string(),
        }
    }
}

/// Strategies tried in order; the first key present in the table wins.
pub const FRICTION_LOOKUP_ORDER: [FrictionLookup; 2] =
    [FrictionLookup::SurfaceCondition, FrictionLookup::SurfaceOnly];

/// A resolved friction coefficient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrictionCoefficient {
    /// Canonical surface key (e.g., "asphalt")
    pub surface: String,
    /// Canonical condition key as requested (e.g., "dry")
    pub condition: String,
    /// Table key that matched (e.g., "asphalt_dry" or "mud")
    pub key: String,
    /// Coefficient of friction μ, in (0, 1]
    pub mu: f64,
    /// Strategy that produced the match
    pub matched_by: FrictionLookup,
}

impl FrictionCoefficient {
    /// Look up μ for a surface and condition.
    ///
    /// Walks [`FRICTION_LOOKUP_ORDER`]. Fails with `UnknownSurface` when the
    /// surface is not in the table, or `UnknownCondition` when the surface is
    /// known but has no entry for the condition and no surface-only value.
    ///
    /// # Example
    ///
    /// ```rust
    /// use recon_core::reference::{FrictionCoefficient, FrictionLookup};
    ///
    /// let mu = FrictionCoefficient::lookup("mud", "wet").unwrap();
    /// assert_eq!(mu.key, "mud");
    /// assert_eq!(mu.matched_by, FrictionLookup::SurfaceOnly);
    /// ```
    pub fn lookup(surface: &str, condition: &str) -> CalcResult<Self> {
        let surface_key = canonical_surface(surface);
        let condition_key = canonical_condition(condition);

        for strategy in FRICTION_LOOKUP_ORDER {
            let key = strategy.key(&surface_key, &condition_key);
            if let Some(mu) = coefficient(&key) {
                if strategy != FrictionLookup::SurfaceCondition {
                    debug!(%key, surface = %surface_key, condition = %condition_key, "friction lookup fell back");
                }
                return Ok(FrictionCoefficient {
                    surface: surface_key,
                    condition: condition_key,
                    key,
                    mu,
                    matched_by: strategy,
                });
            }
        }

        if surface_record(&surface_key).is_some() {
            Err(CalcError::unknown_condition(
                "friction",
                condition,
                conditions_for(&surface_key),
            ))
        } else {
            Err(CalcError::unknown_surface(surface, surface_keys()))
        }
    }
}

/// Raw table access by composed key.
pub fn coefficient(key: &str) -> Option<f64> {
    friction_data::COEFFICIENTS
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, mu)| *mu)
}

/// All declared surfaces, in table order.
pub fn surfaces() -> &'static [SurfaceRecord] {
    friction_data::SURFACES
}

/// All declared conditions, in table order.
pub fn conditions() -> &'static [ConditionRecord] {
    friction_data::CONDITIONS
}

/// Canonical surface keys, in table order.
pub fn surface_keys() -> Vec<&'static str> {
    surfaces().iter().map(|s| s.key).collect()
}

/// Condition keys with a specific coefficient for this surface.
fn conditions_for(surface_key: &str) -> Vec<&'static str> {
    conditions()
        .iter()
        .filter(|c| coefficient(&format!("{}_{}", surface_key, c.key)).is_some())
        .map(|c| c.key)
        .collect()
}

fn surface_record(key: &str) -> Option<&'static SurfaceRecord> {
    surfaces().iter().find(|s| s.key == key)
}

/// Resolve a surface name or alias to its canonical key.
///
/// Unknown names come back normalized so the lookup can still report them.
pub fn canonical_surface(raw: &str) -> String {
    let term = normalize_term(raw);
    surfaces()
        .iter()
        .find(|s| s.key == term || s.aliases.iter().any(|a| *a == term))
        .map(|s| s.key.to_string())
        .unwrap_or(term)
}

/// Resolve a condition name or alias to its canonical key.
pub fn canonical_condition(raw: &str) -> String {
    let term = normalize_term(raw);
    conditions()
        .iter()
        .find(|c| c.key == term || c.aliases.iter().any(|a| *a == term))
        .map(|c| c.key.to_string())
        .unwrap_or(term)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_key() {
        let mu = FrictionCoefficient::lookup("asphalt", "dry").unwrap();
        assert_eq!(mu.mu, 0.70);
        assert_eq!(mu.key, "asphalt_dry");
        assert_eq!(mu.matched_by, FrictionLookup::SurfaceCondition);
    }

    #[test]
    fn test_aliases() {
        let mu = FrictionCoefficient::lookup("Asfalto", "molhado").unwrap();
        assert_eq!(mu.surface, "asphalt");
        assert_eq!(mu.condition, "wet");
        assert_eq!(mu.mu, 0.50);

        let mu = FrictionCoefficient::lookup("paralelepípedo", "seco").unwrap();
        assert_eq!(mu.surface, "cobblestone");
    }

    #[test]
    fn test_surface_only_fallback() {
        for (surface, expected) in [("mud", 0.30), ("snow", 0.20), ("ice", 0.10)] {
            let mu = FrictionCoefficient::lookup(surface, "wet").unwrap();
            assert_eq!(mu.mu, expected);
            assert_eq!(mu.matched_by, FrictionLookup::SurfaceOnly);

            let mu = FrictionCoefficient::lookup(surface, "dry").unwrap();
            assert_eq!(mu.mu, expected);
        }
    }

    #[test]
    fn test_unknown_surface_enumerates_valid() {
        let err = FrictionCoefficient::lookup("lava", "dry").unwrap_err();
        match err {
            CalcError::UnknownSurface { surface, valid } => {
                assert_eq!(surface, "lava");
                assert!(valid.contains(&"asphalt".to_string()));
                assert!(valid.contains(&"ice".to_string()));
            }
            other => panic!("expected UnknownSurface, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_condition_for_known_surface() {
        let err = FrictionCoefficient::lookup("asphalt", "oily").unwrap_err();
        match err {
            CalcError::UnknownCondition { valid, .. } => {
                assert_eq!(valid, vec!["dry".to_string(), "wet".to_string()]);
            }
            other => panic!("expected UnknownCondition, got {other:?}"),
        }
    }

    #[test]
    fn test_strategy_keys() {
        assert_eq!(FrictionLookup::SurfaceCondition.key("asphalt", "wet"), "asphalt_wet");
        assert_eq!(FrictionLookup::SurfaceOnly.key("asphalt", "wet"), "asphalt");
    }

    #[test]
    fn test_wet_never_grips_better_than_dry() {
        for surface in surfaces() {
            let dry = coefficient(&format!("{}_dry", surface.key));
            let wet = coefficient(&format!("{}_wet", surface.key));
            if let (Some(dry), Some(wet)) = (dry, wet) {
                assert!(wet <= dry, "{}: wet {} > dry {}", surface.key, wet, dry);
            }
        }
    }
}
