//! Deterministic explanations (pt-BR).
//!
//! Every sentence here is a fixed template filled with computed values, so
//! the same query always produces the same text.

use super::rules::CalculationFamily;
use crate::calculations::{
    DamageSpeedResult, DragSpeedResult, KineticEnergyResult, PreImpactSpeedResult, ReactionTimeResult,
    SkidSpeedResult, TravelDirection,
};
use crate::reference::{friction, ReactionTimeProfile};

/// Re-prompt shown when a family's required parameters are missing.
pub fn prompt(family: CalculationFamily) -> &'static str {
    match family {
        CalculationFamily::BrakingSpeed => {
            "Para calcular a velocidade pela marca de frenagem, informe o comprimento da marca em metros \
             e, se possível, o tipo de pavimento (asfalto, concreto, terra...) e a condição (seco ou molhado)."
        }
        CalculationFamily::DragSpeed => {
            "Para calcular a velocidade pelo arrasto, informe a distância percorrida após a colisão, em metros."
        }
        CalculationFamily::KineticEnergy => {
            "Para calcular a energia cinética, informe a massa do veículo (kg) e a velocidade (km/h)."
        }
        CalculationFamily::ReactionTime => {
            "Para calcular a distância de reação, informe a velocidade (km/h) e o tempo de reação em segundos \
             ou o estado do condutor (alerta, normal, distraído, cansado, alcoolizado)."
        }
        CalculationFamily::DamageSpeed => {
            "Para calcular a velocidade de dano (EES), informe a massa (kg) e a velocidade (km/h) dos dois \
             veículos e se trafegavam no mesmo sentido ou em sentidos contrários."
        }
    }
}

/// Format with a decimal comma.
pub(crate) fn br(value: f64, decimals: usize) -> String {
    format!("{:.*}", decimals, value).replace('.', ",")
}

fn surface_name(key: &str) -> String {
    friction::surfaces()
        .iter()
        .find(|s| s.key == key)
        .map(|s| s.name.to_lowercase())
        .unwrap_or_else(|| key.to_string())
}

fn condition_name(key: &str) -> String {
    friction::conditions()
        .iter()
        .find(|c| c.key == key)
        .map(|c| c.name.to_lowercase())
        .unwrap_or_else(|| key.to_string())
}

pub fn skid(result: &SkidSpeedResult) -> String {
    format!(
        "Com uma marca de frenagem de {} m em {} {} (μ = {}), a velocidade estimada no início da frenagem \
         é de {} km/h ({} m/s), com faixa de {} a {} km/h (±10%).",
        br(result.distance_m, 1),
        surface_name(&result.friction.surface),
        condition_name(&result.friction.condition),
        br(result.mu, 2),
        br(result.speed_kmh, 1),
        br(result.speed_ms, 2),
        br(result.band.min, 1),
        br(result.band.max, 1),
    )
}

pub fn drag(result: &DragSpeedResult) -> String {
    format!(
        "Para um arrasto pós-colisão de {} m, a velocidade estimada é de {} km/h (μ médio {}), \
         variando de {} km/h (μ {}) a {} km/h (μ {}), ou -{}% / +{}%.",
        br(result.distance_m, 1),
        br(result.speed_mean_kmh, 1),
        br(result.friction.mean, 2),
        br(result.speed_min_kmh, 1),
        br(result.friction.min, 2),
        br(result.speed_max_kmh, 1),
        br(result.friction.max, 2),
        br(result.band.minus_percent, 1),
        br(result.band.plus_percent, 1),
    )
}

pub fn energy(result: &KineticEnergyResult) -> String {
    format!(
        "Um veículo de {} kg a {} km/h possui energia cinética de {} kJ ({} J/kg), \
         equivalente a uma queda livre de {} m de altura.",
        br(result.mass_kg, 0),
        br(result.speed_kmh, 1),
        br(result.energy_kj, 1),
        br(result.energy_per_kg, 1),
        br(result.free_fall_height_m, 1),
    )
}

pub fn reaction(result: &ReactionTimeResult) -> String {
    let source = match &result.driver_condition {
        Some(tag) => {
            let name = ReactionTimeProfile::lookup(tag)
                .map(|p| p.name.to_lowercase())
                .unwrap_or_else(|_| tag.clone());
            format!("tempo de reação de {} s (condutor {})", br(result.reaction_time_s, 2), name)
        }
        None => format!("tempo de reação de {} s", br(result.reaction_time_s, 2)),
    };
    let mut text = format!(
        "A {} km/h, com {}, o veículo percorre {} m antes de iniciar a frenagem.",
        br(result.speed_kmh, 1),
        source,
        br(result.reaction_distance_m, 1),
    );
    if let Some(stopping) = result.stopping {
        text.push_str(&format!(
            " Somando {} m de frenagem, a distância total de parada é de {} m \
             ({}% reação, {}% frenagem).",
            br(stopping.braking_m, 1),
            br(stopping.total_m, 1),
            br(stopping.reaction_share_percent, 0),
            br(stopping.braking_share_percent, 0),
        ));
    }
    text
}

pub fn damage(result: &DamageSpeedResult) -> String {
    let direction = match result.direction {
        TravelDirection::Same => "no mesmo sentido",
        TravelDirection::Opposite => "em sentidos contrários",
    };
    format!(
        "Veículo 1: {} kg a {} km/h ({} kJ). Veículo 2: {} kg a {} km/h ({} kJ). \
         Trafegando {}, a velocidade de dano é de {} km/h. \
         Esta é uma aproximação sem ponderação por massa.",
        br(result.first.mass_kg, 0),
        br(result.first.speed_kmh, 1),
        br(result.first.energy_kj, 1),
        br(result.second.mass_kg, 0),
        br(result.second.speed_kmh, 1),
        br(result.second.energy_kj, 1),
        direction,
        br(result.damage_speed_kmh, 1),
    )
}

pub fn pre_impact(damage_result: &DamageSpeedResult, combined: &PreImpactSpeedResult) -> String {
    format!(
        "{} Combinando com a velocidade de arrasto de {} km/h, a velocidade estimada antes do impacto \
         é de {} km/h (faixa de {} a {} km/h).",
        damage(damage_result),
        br(combined.drag_speed_kmh, 1),
        br(combined.pre_impact_speed_kmh, 1),
        br(combined.band.min, 1),
        br(combined.band.max, 1),
    )
}

/// Append formula citations and report excerpts, when present.
pub fn with_references(mut text: String, citations: &[String], excerpts: &[String]) -> String {
    if !citations.is_empty() {
        text.push_str("\n\nFórmulas utilizadas:");
        for citation in citations {
            text.push_str("\n- ");
            text.push_str(citation);
        }
    }
    if !excerpts.is_empty() {
        text.push_str("\n\nTrechos de laudos de referência:");
        for excerpt in excerpts {
            text.push_str("\n- ");
            text.push_str(excerpt);
        }
    }
    text
}
