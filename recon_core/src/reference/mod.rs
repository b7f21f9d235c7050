//! # Reference Tables
//!
//! Static lookup tables consulted by every calculator:
//!
//! - [`friction`] - tire/road friction coefficient by (surface, condition)
//! - [`reaction`] - perception-reaction time by driver condition
//!
//! Table contents live in `recon_core/data/*.toml` and are compiled into the
//! binary by `build.rs`, so they are read-only for the life of the process and
//! safe to consult from any number of threads.
//!
//! Each table resolves a request by walking an explicit, ordered list of
//! lookup strategies. Adding a surface or a driver condition only touches the
//! TOML file.
//!
//! ## Example
//!
//! ```rust
//! use recon_core::reference::{FrictionCoefficient, ReactionTimeProfile};
//!
//! let mu = FrictionCoefficient::lookup("asfalto", "seco").unwrap();
//! assert_eq!(mu.mu, 0.70);
//!
//! let profile = ReactionTimeProfile::lookup("distracted").unwrap();
//! assert_eq!(profile.seconds, 1.5);
//! ```

pub mod friction;
pub mod reaction;

pub use friction::{FrictionCoefficient, FrictionLookup, FRICTION_LOOKUP_ORDER};
pub use reaction::{ReactionLookup, ReactionTimeProfile, REACTION_LOOKUP_ORDER};

/// A friction surface as declared in `data/friction.toml`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceRecord {
    pub key: &'static str,
    pub name: &'static str,
    pub aliases: &'static [&'static str],
}

/// A surface condition as declared in `data/friction.toml`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConditionRecord {
    pub key: &'static str,
    pub name: &'static str,
    pub aliases: &'static [&'static str],
}

/// A driver reaction profile as declared in `data/reaction_times.toml`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProfileRecord {
    pub tag: &'static str,
    pub name: &'static str,
    pub aliases: &'static [&'static str],
    pub seconds: f64,
}

mod generated {
    include!(concat!(env!("OUT_DIR"), "/reference_data.rs"));
}

pub(crate) use generated::{friction_data, reaction_data};

/// Normalize a free-form term for table matching.
///
/// Lowercases, strips Portuguese diacritics, and collapses runs of
/// whitespace, `_` and `-` into a single space.
pub fn normalize_term(raw: &str) -> String {
    let folded: String = raw.chars().map(fold_char).collect::<String>().to_lowercase();
    folded
        .split(|c: char| c.is_whitespace() || c == '_' || c == '-')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Strip diacritics from a single character (Latin-1 subset used in pt-BR).
pub(crate) fn fold_char(c: char) -> char {
    match c {
        'á' | 'à' | 'â' | 'ã' | 'ä' => 'a',
        'Á' | 'À' | 'Â' | 'Ã' | 'Ä' => 'A',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'É' | 'È' | 'Ê' | 'Ë' => 'E',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'Í' | 'Ì' | 'Î' | 'Ï' => 'I',
        'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
        'Ó' | 'Ò' | 'Ô' | 'Õ' | 'Ö' => 'O',
        'ú' | 'ù' | 'û' | 'ü' => 'u',
        'Ú' | 'Ù' | 'Û' | 'Ü' => 'U',
        'ç' => 'c',
        'Ç' => 'C',
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_term() {
        assert_eq!(normalize_term("  Asfalto  "), "asfalto");
        assert_eq!(normalize_term("Paralelepípedo"), "paralelepipedo");
        assert_eq!(normalize_term("chão_batido"), "chao batido");
        assert_eq!(normalize_term("REAÇÃO"), "reacao");
    }

    #[test]
    fn test_generated_tables_are_populated() {
        assert!(!friction_data::SURFACES.is_empty());
        assert!(!friction_data::CONDITIONS.is_empty());
        assert!(!friction_data::COEFFICIENTS.is_empty());
        assert_eq!(reaction_data::PROFILES.len(), 5);
    }

    #[test]
    fn test_all_coefficients_in_range() {
        for (key, mu) in friction_data::COEFFICIENTS {
            assert!(*mu > 0.0 && *mu <= 1.0, "{key} out of range: {mu}");
        }
    }
}
