//! Calculation-family selection.
//!
//! Families are chosen by an ordered table of keyword rules evaluated
//! against accent-folded, lowercased text. The first rule that matches
//! wins, so more specific families (damage, drag) sit above the generic
//! braking-speed rule, which also excludes their keywords outright.

use serde::{Deserialize, Serialize};
use tracing::debug;

/// A family of calculations the dispatcher can route to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CalculationFamily {
    BrakingSpeed,
    DragSpeed,
    KineticEnergy,
    ReactionTime,
    DamageSpeed,
}

impl CalculationFamily {
    pub fn as_str(&self) -> &'static str {
        match self {
            CalculationFamily::BrakingSpeed => "braking-speed",
            CalculationFamily::DragSpeed => "drag-speed",
            CalculationFamily::KineticEnergy => "kinetic-energy",
            CalculationFamily::ReactionTime => "reaction-time",
            CalculationFamily::DamageSpeed => "damage-speed",
        }
    }
}

impl std::fmt::Display for CalculationFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Keyword rule for one family.
///
/// Keywords match whole words. A trailing `*` marks a stem that matches
/// any word starting with it ("marca*" matches "marcas"); keywords with
/// spaces match a run of consecutive words.
#[derive(Debug, Clone, Copy)]
pub struct FamilyRule {
    pub family: CalculationFamily,
    /// At least one must be present
    pub any_of: &'static [&'static str],
    /// None may be present
    pub none_of: &'static [&'static str],
}

impl FamilyRule {
    pub fn matches(&self, folded: &str) -> bool {
        self.any_of.iter().any(|kw| has_keyword(folded, kw)) && !self.none_of.iter().any(|kw| has_keyword(folded, kw))
    }
}

/// Family rules in priority order.
pub const FAMILY_RULES: &[FamilyRule] = &[
    FamilyRule {
        family: CalculationFamily::DamageSpeed,
        any_of: &["dano*", "deformac*", "ees"],
        none_of: &[],
    },
    FamilyRule {
        family: CalculationFamily::DragSpeed,
        any_of: &["arrast*"],
        none_of: &[],
    },
    FamilyRule {
        family: CalculationFamily::KineticEnergy,
        any_of: &["energia", "cinetica"],
        none_of: &[],
    },
    FamilyRule {
        family: CalculationFamily::ReactionTime,
        any_of: &["reacao", "reacoes", "reagi*", "parada*"],
        none_of: &[],
    },
    FamilyRule {
        family: CalculationFamily::BrakingSpeed,
        any_of: &["frenagem", "frear", "freou", "marca*", "velocidade*", "derrap*", "skid*"],
        none_of: &["dano*", "arrast*", "deformac*"],
    },
];

/// Pick the family for already-folded text, or `None` when no rule applies.
pub fn select_family(folded: &str) -> Option<CalculationFamily> {
    let family = FAMILY_RULES.iter().find(|rule| rule.matches(folded)).map(|rule| rule.family);
    debug!(?family, "family rule selection");
    family
}

/// Whole-word match; a trailing `*` lets the last word match as a prefix.
pub(crate) fn has_keyword(folded: &str, keyword: &str) -> bool {
    let (pattern, stem) = match keyword.strip_suffix('*') {
        Some(stem) => (stem, true),
        None => (keyword, false),
    };
    let wanted: Vec<&str> = pattern.split(' ').filter(|w| !w.is_empty()).collect();
    let Some(last) = wanted.len().checked_sub(1) else {
        return false;
    };
    let text: Vec<&str> = words(folded).collect();
    text.windows(wanted.len()).any(|window| {
        window.iter().zip(&wanted).enumerate().all(|(i, (word, kw))| {
            if stem && i == last {
                word.starts_with(*kw)
            } else {
                word == kw
            }
        })
    })
}

pub(crate) fn words(folded: &str) -> impl Iterator<Item = &str> {
    folded.split(|c: char| !c.is_alphanumeric()).filter(|w| !w.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn family(text: &str) -> Option<CalculationFamily> {
        select_family(&crate::reference::normalize_term(text))
    }

    #[test]
    fn test_braking_keywords() {
        assert_eq!(family("A marca tem 25 metros"), Some(CalculationFamily::BrakingSpeed));
        assert_eq!(family("qual a velocidade do carro?"), Some(CalculationFamily::BrakingSpeed));
        assert_eq!(family("o veículo derrapou"), Some(CalculationFamily::BrakingSpeed));
    }

    #[test]
    fn test_velocity_with_damage_is_not_braking() {
        assert_eq!(
            family("velocidade a partir do dano no veículo"),
            Some(CalculationFamily::DamageSpeed)
        );
        assert_eq!(family("velocidade de arrasto de 12 m"), Some(CalculationFamily::DragSpeed));
    }

    #[test]
    fn test_braking_rule_excludes_on_its_own() {
        let braking = FAMILY_RULES
            .iter()
            .find(|r| r.family == CalculationFamily::BrakingSpeed)
            .unwrap();
        assert!(braking.matches("velocidade do carro"));
        assert!(!braking.matches("velocidade pelo dano"));
        assert!(!braking.matches("velocidade de arrasto"));
    }

    #[test]
    fn test_accents_are_folded() {
        assert_eq!(family("tempo de reação"), Some(CalculationFamily::ReactionTime));
        assert_eq!(family("tempo de reacao"), Some(CalculationFamily::ReactionTime));
        assert_eq!(family("ENERGIA CINÉTICA"), Some(CalculationFamily::KineticEnergy));
        assert_eq!(family("deformação frontal"), Some(CalculationFamily::DamageSpeed));
    }

    #[test]
    fn test_priority_order() {
        // Energy outranks braking when both appear
        assert_eq!(family("energia na velocidade de 60 km/h"), Some(CalculationFamily::KineticEnergy));
        // Reaction outranks braking
        assert_eq!(family("distância de parada a 80 km/h"), Some(CalculationFamily::ReactionTime));
    }

    #[test]
    fn test_not_a_calculation() {
        assert_eq!(family("bom dia, tudo bem?"), None);
        assert_eq!(family(""), None);
        // "ees" must be a whole word prefix, not a suffix
        assert_eq!(family("os dentes"), None);
    }

    #[test]
    fn test_phrase_keyword() {
        assert!(has_keyword("chao batido molhado", "chao batido"));
        assert!(!has_keyword("chao de terra", "chao batido"));
        // Phrases respect word boundaries too
        assert!(!has_keyword("nao de frentes", "de frente"));
    }

    #[test]
    fn test_exact_words_and_stems() {
        assert!(has_keyword("o carro mudou de faixa", "mudou"));
        assert!(!has_keyword("o carro mudou de faixa", "mud"));
        assert!(!has_keyword("secao transversal", "seca"));
        assert!(has_keyword("marcas de pneu", "marca*"));
        assert!(!has_keyword("desmarcado", "marca*"));
        assert!(!has_keyword("qualquer texto", ""));
    }
}
