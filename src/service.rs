/// Request handling for the predict and simulate operations.
///
/// `FloodRiskService` owns the configuration, the optional trained models
/// and the noise sources. Both models are optional: without a scenario
/// model every factor starts at the neutral score, and without a risk model
/// the simulation uses the closed-form formula and no importance report is
/// produced.

use std::sync::Mutex;

use crate::api::{EchoedFeatures, PredictRequest, PredictResponse, SimulateRequest, SimulateResponse};
use crate::assessment;
use crate::config::ServiceConfig;
use crate::importance::FeatureImportance;
use crate::logging::{self, Component};
use crate::model::{round2, FactorScores, Result, SimulationFeatures};
use crate::narrative;
use crate::noise::GaussianNoise;
use crate::risk_model::{self, EnvironmentalRiskModel, TrainedRiskModel, TrainingRecord};
use crate::scaler::FeatureScaler;
use crate::scenario::{FactorPredictor, HashingEncoder, ScenarioFactorModel, TrainingReport};
use crate::simulation::{SimulationEngine, SimulationOutcome};

pub struct FloodRiskService {
    config: ServiceConfig,
    scaler: FeatureScaler,
    risk_model: Option<Box<dyn EnvironmentalRiskModel>>,
    scenario_model: Option<Box<dyn FactorPredictor>>,
    simulation_noise: Mutex<GaussianNoise>,
    assessment_noise: Mutex<GaussianNoise>,
}

impl FloodRiskService {
    /// A service with no trained models.
    pub fn new(config: ServiceConfig) -> Self {
        let simulation_noise = GaussianNoise::new(config.simulation.noise_std, config.simulation.seed);
        let assessment_noise = GaussianNoise::new(config.assessment.noise_std, config.assessment.seed);
        Self {
            config,
            scaler: FeatureScaler::fallback(),
            risk_model: None,
            scenario_model: None,
            simulation_noise: Mutex::new(simulation_noise),
            assessment_noise: Mutex::new(assessment_noise),
        }
    }

    /// Builds the service and, when enabled, trains the scenario model on
    /// the built-in corpus.
    pub fn from_config(config: ServiceConfig) -> Result<(Self, Option<TrainingReport>)> {
        let settings = config.scenario_model.clone();
        let service = Self::new(config);
        if !settings.enabled {
            logging::info(Component::Service, None, "Scenario model disabled; factors default to neutral");
            return Ok((service, None));
        }

        let encoder = Box::new(HashingEncoder::new(settings.embedding_dimension));
        let (model, report) =
            ScenarioFactorModel::train(encoder, settings.boosting, settings.cv_folds, settings.seed)?;
        Ok((service.with_scenario_model(Box::new(model)), Some(report)))
    }

    pub fn with_scenario_model(mut self, model: Box<dyn FactorPredictor>) -> Self {
        self.scenario_model = Some(model);
        self
    }

    /// Installs a risk model together with the scaler its features were
    /// standardised with.
    pub fn with_risk_model(mut self, model: Box<dyn EnvironmentalRiskModel>, scaler: FeatureScaler) -> Self {
        self.risk_model = Some(model);
        self.scaler = scaler;
        self
    }

    /// Fits the scaler and a boosted risk model on labelled records.
    pub fn train_risk_model(self, records: &[TrainingRecord]) -> Result<Self> {
        let scaler = risk_model::fit_scaler(records)?;
        let model = TrainedRiskModel::train(records, self.config.risk_model.boosting)?;
        Ok(self.with_risk_model(Box::new(model), scaler))
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    pub fn has_scenario_model(&self) -> bool {
        self.scenario_model.is_some()
    }

    pub fn has_risk_model(&self) -> bool {
        self.risk_model.is_some()
    }

    fn importance(&self, scenario: Option<&FactorScores>) -> Option<FeatureImportance> {
        self.risk_model
            .as_ref()
            .map(|m| FeatureImportance::from_model(m.feature_importances(), scenario))
    }

    fn run_simulation(&self, features: &SimulationFeatures, years: usize) -> Result<SimulationOutcome> {
        let engine = SimulationEngine::new(
            &self.scaler,
            self.risk_model.as_deref(),
            self.config.simulation.max_years,
        );
        let mut noise = self
            .simulation_noise
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        engine.simulate_and_narrate(features, years, &mut noise)
    }

    /// Instant risk assessment of the current conditions.
    pub fn predict(&self, request: &PredictRequest) -> PredictResponse {
        let assessment = {
            let mut noise = self
                .assessment_noise
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            assessment::assess(&request.conditions(), &mut noise)
        };
        logging::debug(
            Component::Assessment,
            None,
            &format!("Assessed risk score {:.2} ({:?})", assessment.score, assessment.level),
        );
        assessment.into()
    }

    /// Long-term simulation, driven by the scenario text when a scenario
    /// model is available.
    pub fn simulate(&self, request: &SimulateRequest) -> Result<SimulateResponse> {
        let years = request.years.unwrap_or(self.config.simulation.default_years);
        let conditions = request.conditions();
        let fallback = SimulationFeatures {
            conditions,
            factors: FactorScores::neutral(),
        };

        // Bad horizons are the caller's error on either path
        SimulationEngine::new(&self.scaler, None, self.config.simulation.max_years)
            .validate(&fallback, years)?;

        if let Some(predictor) = self.scenario_model.as_ref() {
            match predictor.predict_factors(&request.scenario) {
                Ok(scores) => {
                    logging::info(
                        Component::Service,
                        Some("simulate"),
                        &format!("Scenario scored; simulating {} years", years),
                    );
                    let features = SimulationFeatures {
                        conditions,
                        factors: scores,
                    };
                    let outcome = self.run_simulation(&features, years)?;
                    let importance = self.importance(Some(&scores));
                    let narrative =
                        narrative::enrich_with_scenario(&outcome.narrative, &scores, importance.as_ref());
                    return Ok(build_response(
                        outcome,
                        narrative,
                        years,
                        EchoedFeatures::Environmental(conditions),
                        Some(scores),
                        importance,
                    ));
                }
                Err(err) => {
                    logging::log_failure(Component::Service, Some("simulate"), "Scenario scoring", &err);
                }
            }
        }

        logging::info(
            Component::Service,
            Some("simulate"),
            &format!("Simulating {} years with neutral factors", years),
        );
        let outcome = self.run_simulation(&fallback, years)?;
        let importance = self.importance(None);
        let narrative = narrative::enrich_without_scenario(&outcome.narrative, importance.as_ref());
        Ok(build_response(
            outcome,
            narrative,
            years,
            EchoedFeatures::Full(fallback),
            None,
            importance,
        ))
    }
}

fn build_response(
    outcome: SimulationOutcome,
    narrative: String,
    years: usize,
    features: EchoedFeatures,
    scenario_factors: Option<FactorScores>,
    feature_importance: Option<FeatureImportance>,
) -> SimulateResponse {
    SimulateResponse {
        risks: outcome.risks.iter().map(|r| round2(*r)).collect(),
        years: (0..years).collect(),
        narrative,
        features,
        scenario_factors,
        feature_trajectories: outcome.trajectories.rounded(),
        feature_importance,
    }
}
