//! # Natural-Language Dispatch
//!
//! Turns a free-text query (pt-BR) into a calculation:
//!
//! 1. Fold accents and case ([`normalize_term`])
//! 2. Select a family from the ordered rule table ([`rules`])
//! 3. Extract numbers and keywords ([`extract`])
//! 4. Either re-prompt for missing parameters or run the calculator
//! 5. Attach a deterministic explanation ([`explain`]) and, optionally,
//!    excerpts and an external elaboration ([`elaboration`])
//!
//! ## Example
//!
//! ```rust
//! use recon_core::dispatch::{DispatchOutcome, RequestDispatcher};
//!
//! let dispatcher = RequestDispatcher::default();
//! match dispatcher.dispatch("A marca tem 25 metros em asfalto seco").unwrap() {
//!     DispatchOutcome::Calculated(calc) => {
//!         assert!(calc.result.output("speed_kmh").unwrap() > 60.0);
//!     }
//!     other => panic!("unexpected outcome: {:?}", other),
//! }
//! ```

pub mod elaboration;
pub mod explain;
pub mod extract;
pub mod rules;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calculations::{
    damage_speed, drag_speed, kinetic_energy, reaction_time, skid_speed, CalculationResult, DamageSpeedInput,
    DragSpeedInput, KineticEnergyInput, ReactionSource, ReactionTimeInput, SkidSpeedInput, VehicleMotion,
};
use crate::errors::{CalcError, CalcResult};
use crate::reference::normalize_term;
use crate::settings::EngineSettings;

pub use elaboration::{elaborate_with_timeout, ElaborationContext, Elaborator, ExcerptSource};
pub use extract::{extract, parse_number, ExtractedParameters};
pub use rules::{select_family, CalculationFamily, FamilyRule, FAMILY_RULES};

/// A parsed query. Built per call and never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationRequest {
    /// Original text
    pub text: String,
    pub family: Option<CalculationFamily>,
    pub parameters: ExtractedParameters,
}

/// A successful dispatch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispatchedCalculation {
    pub request: CalculationRequest,
    /// Primary result
    pub result: CalculationResult,
    /// Intermediate results the primary one was built from
    #[serde(default)]
    pub supporting: Vec<CalculationResult>,
    /// Deterministic explanation
    pub interpretation: String,
    /// External elaboration, when one was produced in time
    pub elaboration: Option<String>,
}

/// What a query turned into.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DispatchOutcome {
    Calculated(DispatchedCalculation),
    /// A calculation was requested but required values are absent
    MissingParameters {
        family: CalculationFamily,
        missing: Vec<String>,
        prompt: String,
    },
    /// No calculation family matched; route the text elsewhere
    NotACalculation,
}

impl DispatchOutcome {
    pub fn family(&self) -> Option<CalculationFamily> {
        match self {
            DispatchOutcome::Calculated(calc) => calc.request.family,
            DispatchOutcome::MissingParameters { family, .. } => Some(*family),
            DispatchOutcome::NotACalculation => None,
        }
    }
}

/// Everything a family computed, before packaging.
struct Computed {
    result: CalculationResult,
    supporting: Vec<CalculationResult>,
    interpretation: String,
}

/// Routes free-text queries to calculators.
///
/// Stateless apart from its configuration; share one instance freely
/// across threads.
pub struct RequestDispatcher {
    settings: EngineSettings,
    elaborator: Option<Arc<dyn Elaborator>>,
    excerpts: Option<Arc<dyn ExcerptSource>>,
}

impl Default for RequestDispatcher {
    fn default() -> Self {
        RequestDispatcher::new(EngineSettings::default())
    }
}

impl RequestDispatcher {
    pub fn new(settings: EngineSettings) -> Self {
        RequestDispatcher {
            settings,
            elaborator: None,
            excerpts: None,
        }
    }

    pub fn with_elaborator(mut self, elaborator: Arc<dyn Elaborator>) -> Self {
        self.elaborator = Some(elaborator);
        self
    }

    pub fn with_excerpts(mut self, excerpts: Arc<dyn ExcerptSource>) -> Self {
        self.excerpts = Some(excerpts);
        self
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Parse without calculating.
    pub fn parse(&self, text: &str) -> CalculationRequest {
        let folded = normalize_term(text);
        CalculationRequest {
            text: text.to_string(),
            family: select_family(&folded),
            parameters: extract(&folded),
        }
    }

    /// Parse and, when possible, calculate.
    ///
    /// Non-calculation text yields `NotACalculation`; missing values yield
    /// `MissingParameters`. Calculator failures (e.g. an unknown surface in
    /// the settings) come back as `Err`.
    pub fn dispatch(&self, text: &str) -> CalcResult<DispatchOutcome> {
        let request = self.parse(text);
        let Some(family) = request.family else {
            debug!("no calculation family matched");
            return Ok(DispatchOutcome::NotACalculation);
        };

        let missing = missing_parameters(family, &request.parameters);
        if !missing.is_empty() {
            debug!(%family, ?missing, "missing parameters");
            return Ok(DispatchOutcome::MissingParameters {
                family,
                missing: missing.into_iter().map(str::to_string).collect(),
                prompt: explain::prompt(family).to_string(),
            });
        }

        let computed = self.compute(family, &request.parameters)?;

        let citations = if self.settings.attach_citations {
            computed.result.citations.clone()
        } else {
            Vec::new()
        };
        let excerpts = self
            .excerpts
            .as_ref()
            .map(|source| source.excerpts(family, &computed.result))
            .unwrap_or_default();
        let interpretation = explain::with_references(computed.interpretation, &citations, &excerpts);

        let elaboration = self.elaborator.as_ref().and_then(|elaborator| {
            let context = ElaborationContext {
                query: request.text.clone(),
                family,
                result: computed.result.clone(),
                interpretation: interpretation.clone(),
            };
            elaborate_with_timeout(elaborator, context, self.settings.elaboration_timeout())
        });

        Ok(DispatchOutcome::Calculated(DispatchedCalculation {
            request,
            result: computed.result,
            supporting: computed.supporting,
            interpretation,
            elaboration,
        }))
    }

    fn compute(&self, family: CalculationFamily, params: &ExtractedParameters) -> CalcResult<Computed> {
        let settings = &self.settings;
        match family {
            CalculationFamily::BrakingSpeed => {
                let input = SkidSpeedInput::new(
                    nth(&params.distances_m, 0, "distance_m")?,
                    params.surface.as_deref().unwrap_or(&settings.default_surface),
                    params.condition.as_deref().unwrap_or(&settings.default_condition),
                );
                let result = skid_speed::calculate(&input)?;
                Ok(Computed {
                    result: CalculationResult::from(&result),
                    supporting: Vec::new(),
                    interpretation: explain::skid(&result),
                })
            }
            CalculationFamily::DragSpeed => {
                let result = drag_speed::calculate(&DragSpeedInput {
                    distance_m: nth(&params.distances_m, 0, "distance_m")?,
                    friction: settings.drag_friction,
                })?;
                Ok(Computed {
                    result: CalculationResult::from(&result),
                    supporting: Vec::new(),
                    interpretation: explain::drag(&result),
                })
            }
            CalculationFamily::KineticEnergy => {
                let result = kinetic_energy::calculate(&KineticEnergyInput {
                    mass_kg: nth(&params.masses_kg, 0, "mass_kg")?,
                    speed_kmh: nth(&params.speeds_kmh, 0, "speed_kmh")?,
                })?;
                Ok(Computed {
                    result: CalculationResult::from(&result),
                    supporting: Vec::new(),
                    interpretation: explain::energy(&result),
                })
            }
            CalculationFamily::ReactionTime => {
                let reaction = match (params.reaction_time_s, &params.driver_state) {
                    (Some(seconds), _) => ReactionSource::Seconds(seconds),
                    (None, Some(state)) => ReactionSource::Condition(state.clone()),
                    (None, None) => ReactionSource::Condition(settings.default_driver_state.clone()),
                };
                let result = reaction_time::calculate(&ReactionTimeInput {
                    speed_kmh: nth(&params.speeds_kmh, 0, "speed_kmh")?,
                    reaction,
                    braking_distance_m: params.distance_m(),
                })?;
                Ok(Computed {
                    result: CalculationResult::from(&result),
                    supporting: Vec::new(),
                    interpretation: explain::reaction(&result),
                })
            }
            CalculationFamily::DamageSpeed => {
                let input = DamageSpeedInput {
                    first: VehicleMotion {
                        mass_kg: nth(&params.masses_kg, 0, "mass_kg")?,
                        speed_kmh: nth(&params.speeds_kmh, 0, "speed_kmh")?,
                    },
                    second: VehicleMotion {
                        mass_kg: nth(&params.masses_kg, 1, "mass_kg")?,
                        speed_kmh: nth(&params.speeds_kmh, 1, "speed_kmh")?,
                    },
                    direction: params.direction.unwrap_or_default(),
                };
                let damage = damage_speed::calculate(&input)?;
                let damage_summary = CalculationResult::from(&damage);

                match params.distance_m() {
                    Some(distance_m) => {
                        let drag = drag_speed::calculate(&DragSpeedInput {
                            distance_m,
                            friction: settings.drag_friction,
                        })?;
                        let combined = damage_speed::pre_impact_speed(damage.damage_speed_kmh, &drag)?;
                        Ok(Computed {
                            result: CalculationResult::from(&combined),
                            supporting: vec![damage_summary, CalculationResult::from(&drag)],
                            interpretation: explain::pre_impact(&damage, &combined),
                        })
                    }
                    None => Ok(Computed {
                        result: damage_summary,
                        supporting: Vec::new(),
                        interpretation: explain::damage(&damage),
                    }),
                }
            }
        }
    }
}

fn nth(values: &[f64], index: usize, field: &str) -> CalcResult<f64> {
    values.get(index).copied().ok_or_else(|| CalcError::missing_field(field))
}

/// Names of the values a family needs but the query lacks.
fn missing_parameters(family: CalculationFamily, params: &ExtractedParameters) -> Vec<&'static str> {
    let mut missing = Vec::new();
    match family {
        CalculationFamily::BrakingSpeed | CalculationFamily::DragSpeed => {
            if params.distances_m.is_empty() {
                missing.push("distance_m");
            }
        }
        CalculationFamily::KineticEnergy => {
            if params.masses_kg.is_empty() {
                missing.push("mass_kg");
            }
            if params.speeds_kmh.is_empty() {
                missing.push("speed_kmh");
            }
        }
        CalculationFamily::ReactionTime => {
            if params.speeds_kmh.is_empty() {
                missing.push("speed_kmh");
            }
        }
        CalculationFamily::DamageSpeed => {
            if params.masses_kg.len() < 2 {
                missing.push("mass_kg (two vehicles)");
            }
            if params.speeds_kmh.len() < 2 {
                missing.push("speed_kmh (two vehicles)");
            }
        }
    }
    missing
}

/// Dispatch with default settings and no collaborators.
pub fn dispatch(text: &str) -> CalcResult<DispatchOutcome> {
    RequestDispatcher::default().dispatch(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculations::CalculationKind;
    use std::time::Duration;

    fn calculated(outcome: DispatchOutcome) -> DispatchedCalculation {
        match outcome {
            DispatchOutcome::Calculated(calc) => calc,
            other => panic!("expected Calculated, got {:?}", other),
        }
    }

    #[test]
    fn test_braking_scenario() {
        let calc = calculated(dispatch("A marca tem 25 metros em asfalto seco").unwrap());
        assert_eq!(calc.request.family, Some(CalculationFamily::BrakingSpeed));
        assert_eq!(calc.request.parameters.distance_m(), Some(25.0));
        assert_eq!(calc.request.parameters.surface.as_deref(), Some("asphalt"));
        assert_eq!(calc.request.parameters.condition.as_deref(), Some("dry"));
        assert_eq!(calc.result.kind, CalculationKind::SkidSpeed);
        assert!((calc.result.output("speed_kmh").unwrap() - 65.6).abs() / 65.6 < 0.02);
        assert!(calc.interpretation.contains("Fórmulas utilizadas"));
        assert!(calc.elaboration.is_none());
    }

    #[test]
    fn test_energy_without_values_reprompts() {
        match dispatch("quero calcular energia").unwrap() {
            DispatchOutcome::MissingParameters { family, missing, prompt } => {
                assert_eq!(family, CalculationFamily::KineticEnergy);
                assert_eq!(missing, vec!["mass_kg", "speed_kmh"]);
                assert_eq!(prompt, explain::prompt(CalculationFamily::KineticEnergy));
            }
            other => panic!("expected MissingParameters, got {:?}", other),
        }
    }

    #[test]
    fn test_not_a_calculation() {
        assert_eq!(dispatch("bom dia").unwrap(), DispatchOutcome::NotACalculation);
    }

    #[test]
    fn test_energy_calculation() {
        let calc = calculated(dispatch("energia cinética de um carro de 1.200 kg a 60 km/h").unwrap());
        assert!((calc.result.output("energy_kj").unwrap() - 166.7).abs() < 0.05);
    }

    #[test]
    fn test_drag_uses_settings_band() {
        let mut settings = EngineSettings::default();
        settings.drag_friction = crate::calculations::DragFriction {
            mean: 0.5,
            min: 0.5,
            max: 0.5,
        };
        let calc = calculated(RequestDispatcher::new(settings).dispatch("arrastou 12 metros").unwrap());
        assert_eq!(calc.result.kind, CalculationKind::DragSpeed);
        assert_eq!(calc.result.output("speed_min_kmh"), calc.result.output("speed_max_kmh"));
    }

    #[test]
    fn test_mud_falls_back_to_surface_only() {
        let calc = calculated(dispatch("marca de frenagem de 10 metros na lama").unwrap());
        assert!(calc.interpretation.contains("lama"));
        assert!((calc.result.output("mu").unwrap() - 0.30).abs() < 1e-9);
    }

    #[test]
    fn test_narrative_words_do_not_change_surface() {
        let calc = calculated(dispatch("o carro mudou de faixa e deixou marca de 20 metros no asfalto seco").unwrap());
        assert_eq!(calc.request.parameters.surface.as_deref(), Some("asphalt"));
        assert!((calc.result.output("mu").unwrap() - 0.70).abs() < 1e-9);
        assert!((calc.result.output("speed_kmh").unwrap() - 59.66).abs() < 0.05);
    }

    #[test]
    fn test_reaction_with_driver_state_and_braking() {
        let calc =
            calculated(dispatch("tempo de reação de motorista cansado a 72 km/h com frenagem de 30 metros").unwrap());
        assert_eq!(calc.result.kind, CalculationKind::ReactionTime);
        assert!((calc.result.output("reaction_distance_m").unwrap() - 40.0).abs() < 1e-9);
        assert!((calc.result.output("total_stopping_distance_m").unwrap() - 70.0).abs() < 1e-9);
    }

    #[test]
    fn test_reaction_explicit_seconds() {
        let calc = calculated(dispatch("reação de 1,5 segundos a 36 km/h").unwrap());
        assert!((calc.result.output("reaction_distance_m").unwrap() - 15.0).abs() < 1e-9);
    }

    #[test]
    fn test_damage_speed_and_pre_impact() {
        let text = "velocidade de dano: veículo 1 com 1200 kg a 50 km/h e veículo 2 com 1500 kg a 30 km/h, sentido contrário";
        let calc = calculated(dispatch(text).unwrap());
        assert_eq!(calc.result.kind, CalculationKind::DamageSpeed);
        assert_eq!(calc.result.output("damage_speed_kmh"), Some(20.0));

        let with_drag = format!("{}, arrasto de 10 metros", text);
        let calc = calculated(dispatch(&with_drag).unwrap());
        assert_eq!(calc.result.kind, CalculationKind::PreImpactSpeed);
        assert_eq!(calc.supporting.len(), 2);
        assert!(calc.result.output("pre_impact_speed_kmh").unwrap() > 20.0);
    }

    #[test]
    fn test_damage_needs_two_vehicles() {
        let outcome = dispatch("dano em um carro de 1200 kg a 50 km/h").unwrap();
        assert_eq!(outcome.family(), Some(CalculationFamily::DamageSpeed));
        assert!(matches!(outcome, DispatchOutcome::MissingParameters { .. }));
    }

    #[test]
    fn test_calculator_errors_propagate() {
        let mut settings = EngineSettings::default();
        settings.default_surface = "moon dust".to_string();
        let err = RequestDispatcher::new(settings)
            .dispatch("marca de 20 metros")
            .unwrap_err();
        assert_eq!(err.error_code(), "UNKNOWN_SURFACE");
    }

    #[test]
    fn test_citations_can_be_disabled() {
        let settings = EngineSettings {
            attach_citations: false,
            ..EngineSettings::default()
        };
        let calc = calculated(
            RequestDispatcher::new(settings)
                .dispatch("marca de 20 metros em concreto")
                .unwrap(),
        );
        assert!(!calc.interpretation.contains("Fórmulas"));
        assert!(!calc.result.citations.is_empty());
    }

    struct Echo;
    impl Elaborator for Echo {
        fn elaborate(&self, context: &ElaborationContext) -> Option<String> {
            Some(format!("Contexto adicional para {}", context.family))
        }
    }

    struct Hangs;
    impl Elaborator for Hangs {
        fn elaborate(&self, _: &ElaborationContext) -> Option<String> {
            std::thread::sleep(Duration::from_millis(500));
            Some("tarde demais".to_string())
        }
    }

    struct Reports;
    impl ExcerptSource for Reports {
        fn excerpts(&self, _: CalculationFamily, _: &CalculationResult) -> Vec<String> {
            vec!["Laudo 041/2022: marca de 31 m em asfalto seco".to_string()]
        }
    }

    #[test]
    fn test_elaboration_appended() {
        let dispatcher = RequestDispatcher::default().with_elaborator(Arc::new(Echo));
        let calc = calculated(dispatcher.dispatch("marca de 25 metros").unwrap());
        assert_eq!(calc.elaboration.as_deref(), Some("Contexto adicional para braking-speed"));
    }

    #[test]
    fn test_elaboration_timeout_keeps_result() {
        let settings = EngineSettings {
            elaboration_timeout_ms: 20,
            ..EngineSettings::default()
        };
        let baseline = calculated(dispatch("marca de 25 metros").unwrap());
        let calc = calculated(
            RequestDispatcher::new(settings)
                .with_elaborator(Arc::new(Hangs))
                .dispatch("marca de 25 metros")
                .unwrap(),
        );
        assert!(calc.elaboration.is_none());
        assert_eq!(calc.result, baseline.result);
    }

    #[test]
    fn test_excerpts_listed_verbatim() {
        let dispatcher = RequestDispatcher::default().with_excerpts(Arc::new(Reports));
        let calc = calculated(dispatcher.dispatch("marca de 25 metros").unwrap());
        assert!(calc.interpretation.contains("Laudo 041/2022: marca de 31 m em asfalto seco"));
    }

    #[test]
    fn test_outcome_serialization() {
        let json = serde_json::to_string(&dispatch("quero calcular energia").unwrap()).unwrap();
        assert!(json.contains("\"outcome\":\"missing_parameters\""));
        assert!(json.contains("\"family\":\"kinetic-energy\""));
    }
}
