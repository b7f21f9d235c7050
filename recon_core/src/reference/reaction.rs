//! Perception-reaction time by driver condition.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{normalize_term, reaction_data, ProfileRecord};
use crate::errors::{CalcError, CalcResult};

/// One way of matching a driver-condition request against the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReactionLookup {
    /// Canonical tag ("alert", "normal", ...)
    Tag,
    /// Any alias listed for the profile ("cansado", "celular", ...)
    Alias,
}

impl ReactionLookup {
    fn matches(&self, record: &ProfileRecord, term: &str) -> bool {
        match self {
            ReactionLookup::Tag => record.tag == term,
            ReactionLookup::Alias => record.aliases.iter().any(|a| *a == term),
        }
    }
}

/// Strategies tried in order.
pub const REACTION_LOOKUP_ORDER: [ReactionLookup; 2] = [ReactionLookup::Tag, ReactionLookup::Alias];

/// A driver reaction-time profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReactionTimeProfile {
    /// Canonical tag
    pub tag: String,
    /// Display name
    pub name: String,
    /// Perception-reaction time in seconds
    pub seconds: f64,
}

impl ReactionTimeProfile {
    /// Look up the reaction time for a driver condition tag or alias.
    ///
    /// Unknown tags fail with `UnknownCondition`, enumerating the valid tags.
    pub fn lookup(condition: &str) -> CalcResult<Self> {
        let term = normalize_term(condition);
        for strategy in REACTION_LOOKUP_ORDER {
            if let Some(record) = reaction_data::PROFILES.iter().find(|p| strategy.matches(p, &term)) {
                if strategy != ReactionLookup::Tag {
                    debug!(requested = %term, tag = record.tag, "reaction profile matched by alias");
                }
                return Ok(Self::from(record));
            }
        }
        Err(CalcError::unknown_condition("reaction_time", condition, tags()))
    }

    /// All profiles, ordered from fastest to slowest reaction.
    pub fn all() -> Vec<Self> {
        reaction_data::PROFILES.iter().map(Self::from).collect()
    }
}

impl From<&ProfileRecord> for ReactionTimeProfile {
    fn from(record: &ProfileRecord) -> Self {
        ReactionTimeProfile {
            tag: record.tag.to_string(),
            name: record.name.to_string(),
            seconds: record.seconds,
        }
    }
}

/// Canonical driver-condition tags, fastest first.
pub fn tags() -> Vec<&'static str> {
    reaction_data::PROFILES.iter().map(|p| p.tag).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_by_tag() {
        let profile = ReactionTimeProfile::lookup("normal").unwrap();
        assert_eq!(profile.seconds, 1.0);
    }

    #[test]
    fn test_lookup_by_alias() {
        let profile = ReactionTimeProfile::lookup("Alcoolizado").unwrap();
        assert_eq!(profile.tag, "impaired");
        assert_eq!(profile.seconds, 2.5);
    }

    #[test]
    fn test_monotonic_with_impairment() {
        let profiles = ReactionTimeProfile::all();
        let tags: Vec<&str> = profiles.iter().map(|p| p.tag.as_str()).collect();
        assert_eq!(tags, vec!["alert", "normal", "distracted", "tired", "impaired"]);
        for pair in profiles.windows(2) {
            assert!(pair[0].seconds < pair[1].seconds);
        }
    }

    #[test]
    fn test_unknown_tag_enumerates_valid() {
        let err = ReactionTimeProfile::lookup("sleepwalking").unwrap_err();
        assert_eq!(err.error_code(), "UNKNOWN_CONDITION");
        assert!(err.to_string().contains("alert, normal, distracted, tired, impaired"));
    }
}
