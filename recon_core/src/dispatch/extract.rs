//! Parameter extraction from free text.
//!
//! Numbers follow Brazilian Portuguese conventions: a comma is the decimal
//! separator and dots group thousands ("1.200,5"). A dot followed by
//! anything other than exactly three digits is read as a decimal point, so
//! "12.5 metros" still parses as 12.5.
//!
//! All matching runs on text already passed through
//! [`normalize_term`](crate::reference::normalize_term).

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::rules::has_keyword;
use crate::calculations::TravelDirection;
use crate::reference::reaction_data;

const NUMBER: &str = r"\b(?P<num>\d{1,3}(?:\.\d{3})+(?:,\d+)?|\d+(?:[.,]\d+)?)";

static DISTANCE_RE: Lazy<Regex> = Lazy::new(|| unit_regex(r"(?:metros?|mts?|m)\b"));
static MASS_RE: Lazy<Regex> =
    Lazy::new(|| unit_regex(r"(?P<unit>kg|quilos?|kilos?|quilogramas?|toneladas?)\b"));
static SPEED_RE: Lazy<Regex> =
    Lazy::new(|| unit_regex(r"(?:km/h|kmh|km/hora|km por hora|quilometros por hora)"));
static SECONDS_RE: Lazy<Regex> = Lazy::new(|| unit_regex(r"(?:segundos?|seg|s)\b"));
static THOUSANDS_RE: Lazy<Regex> = Lazy::new(|| compile(r"^\d{1,3}(?:\.\d{3})+$"));

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("extraction pattern is a valid regex")
}

fn unit_regex(unit: &str) -> Regex {
    compile(&format!(r"{}\s*{}", NUMBER, unit))
}

/// Parse a pt-BR formatted number.
pub fn parse_number(raw: &str) -> Option<f64> {
    let cleaned = if raw.contains(',') {
        raw.replace('.', "").replace(',', ".")
    } else if THOUSANDS_RE.is_match(raw) {
        raw.replace('.', "")
    } else {
        raw.to_string()
    };
    cleaned.parse().ok()
}

fn numbers_with(re: &Regex, folded: &str, mut accept: impl FnMut(&Captures) -> Option<f64>) -> Vec<f64> {
    re.captures_iter(folded).filter_map(|caps| accept(&caps)).collect()
}

/// Surface keywords, most specific first. See [`has_keyword`] for the
/// whole-word and `*` stem syntax.
const SURFACE_KEYWORDS: &[(&[&str], &str)] = &[
    (&["paralelepiped*", "calcament*", "cobblestone*"], "cobblestone"),
    (&["concreto", "concrete"], "concrete"),
    (&["cascalho", "brita", "gravel"], "gravel"),
    (&["chao batido", "terra", "dirt"], "dirt"),
    (&["lama", "lamacent*", "barro", "barrent*", "mud", "muddy"], "mud"),
    (&["gelo", "ice"], "ice"),
    (&["neve", "snow"], "snow"),
    (&["asfalt*", "asphalt"], "asphalt"),
];

/// Condition keywords, checked after the surface.
const CONDITION_KEYWORDS: &[(&[&str], &str)] = &[
    (&["molhad*", "umid*", "chuva*", "chovendo", "wet"], "wet"),
    (&["seco", "seca", "dry"], "dry"),
];

/// Surfaces that imply a wet condition when none is stated.
const INTRINSICALLY_WET: &[&str] = &["mud", "ice", "snow"];

const OPPOSITE_KEYWORDS: &[&str] = &["contrari*", "opost*", "frente a frente", "frontal", "de frente"];
const SAME_KEYWORDS: &[&str] = &["mesmo sentido", "mesma direcao", "traseira", "engavetamento"];

/// Parameters extracted from one query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractedParameters {
    /// Distances in meters, in order of appearance
    pub distances_m: Vec<f64>,
    /// Masses in kilograms (tonnes converted)
    pub masses_kg: Vec<f64>,
    /// Speeds in km/h
    pub speeds_kmh: Vec<f64>,
    /// Explicit reaction time (s)
    pub reaction_time_s: Option<f64>,
    /// Canonical surface key
    pub surface: Option<String>,
    /// Canonical condition key
    pub condition: Option<String>,
    /// Canonical driver-state tag
    pub driver_state: Option<String>,
    pub direction: Option<TravelDirection>,
}

impl ExtractedParameters {
    pub fn distance_m(&self) -> Option<f64> {
        self.distances_m.first().copied()
    }

    pub fn mass_kg(&self) -> Option<f64> {
        self.masses_kg.first().copied()
    }

    pub fn speed_kmh(&self) -> Option<f64> {
        self.speeds_kmh.first().copied()
    }
}

/// Extract every recognizable parameter from folded text.
pub fn extract(folded: &str) -> ExtractedParameters {
    let distances_m = numbers_with(&DISTANCE_RE, folded, |caps| {
        let whole = caps.get(0)?;
        // "m/s" is a speed, not a distance
        if folded[whole.end()..].starts_with('/') {
            return None;
        }
        parse_number(&caps["num"])
    });

    let masses_kg = numbers_with(&MASS_RE, folded, |caps| {
        let value = parse_number(&caps["num"])?;
        let factor = if caps["unit"].starts_with("tonelada") { 1000.0 } else { 1.0 };
        Some(value * factor)
    });

    let speeds_kmh = numbers_with(&SPEED_RE, folded, |caps| parse_number(&caps["num"]));
    let reaction_time_s = numbers_with(&SECONDS_RE, folded, |caps| parse_number(&caps["num"]))
        .first()
        .copied();

    let surface = first_keyword(folded, SURFACE_KEYWORDS).map(str::to_string);
    let condition = first_keyword(folded, CONDITION_KEYWORDS)
        .or_else(|| {
            surface
                .as_deref()
                .filter(|s| INTRINSICALLY_WET.contains(s))
                .map(|_| "wet")
        })
        .map(str::to_string);

    let params = ExtractedParameters {
        distances_m,
        masses_kg,
        speeds_kmh,
        reaction_time_s,
        surface,
        condition,
        driver_state: driver_state(folded),
        direction: direction(folded),
    };
    debug!(?params, "extracted parameters");
    params
}

fn first_keyword(folded: &str, table: &[(&[&str], &'static str)]) -> Option<&'static str> {
    table
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|kw| has_keyword(folded, kw)))
        .map(|(_, key)| *key)
}

/// Most impaired profile whose tag or alias appears in the text.
fn driver_state(folded: &str) -> Option<String> {
    reaction_data::PROFILES
        .iter()
        .rev()
        .find(|p| {
            std::iter::once(&p.tag)
                .chain(p.aliases.iter())
                .any(|alias| super::rules::words(folded).any(|w| w == *alias))
        })
        .map(|p| p.tag.to_string())
}

fn direction(folded: &str) -> Option<TravelDirection> {
    if OPPOSITE_KEYWORDS.iter().any(|kw| has_keyword(folded, kw)) {
        Some(TravelDirection::Opposite)
    } else if SAME_KEYWORDS.iter().any(|kw| has_keyword(folded, kw)) {
        Some(TravelDirection::Same)
    } else {
        None
    }
}
