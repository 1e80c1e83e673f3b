/// Service configuration loaded from TOML.
///
/// Every section and field is optional; anything missing takes the compiled
/// default, so an empty file is a valid configuration.
///
/// ```toml
/// [logging]
/// level = "info"
/// file = "floodrisk.log"
///
/// [simulation]
/// default_years = 20
/// noise_std = 0.1
///
/// [scenario_model.boosting]
/// n_estimators = 100
/// learning_rate = 0.05
/// ```

use std::path::Path;

use serde::{Deserialize, Deserializer};

use crate::logging::LogLevel;
use crate::model::{FloodRiskError, Result};
use crate::regressor::BoostingParams;
use crate::risk_model::DEFAULT_RISK_PARAMS;
use crate::scenario::encoder::DEFAULT_DIMENSION;

/// A `[*.boosting]` table. Keys left out keep the enclosing section's
/// defaults rather than the regressor's.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct BoostingTable {
    n_estimators: Option<usize>,
    learning_rate: Option<f64>,
    max_depth: Option<usize>,
    min_samples_split: Option<usize>,
}

impl BoostingTable {
    fn merge_onto(self, base: BoostingParams) -> BoostingParams {
        BoostingParams {
            n_estimators: self.n_estimators.unwrap_or(base.n_estimators),
            learning_rate: self.learning_rate.unwrap_or(base.learning_rate),
            max_depth: self.max_depth.unwrap_or(base.max_depth),
            min_samples_split: self.min_samples_split.unwrap_or(base.min_samples_split),
        }
    }
}

/// Boosting defaults for the scenario model.
pub const SCENARIO_BOOSTING: BoostingParams = BoostingParams {
    n_estimators: 100,
    learning_rate: 0.05,
    max_depth: 3,
    min_samples_split: 3,
};

fn scenario_boosting<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<BoostingParams, D::Error> {
    Ok(BoostingTable::deserialize(deserializer)?.merge_onto(SCENARIO_BOOSTING))
}

fn risk_boosting<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<BoostingParams, D::Error> {
    Ok(BoostingTable::deserialize(deserializer)?.merge_onto(DEFAULT_RISK_PARAMS))
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: LogLevel,
    /// Optional file that receives a copy of every log line.
    pub file: Option<String>,
    pub timestamps: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            file: None,
            timestamps: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Horizon used when a request omits `years`.
    pub default_years: usize,
    pub max_years: usize,
    /// Standard deviation of the yearly noise on the closed-form risk.
    pub noise_std: f64,
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            default_years: 20,
            max_years: 100,
            noise_std: 0.1,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AssessmentConfig {
    pub noise_std: f64,
    pub seed: Option<u64>,
}

impl Default for AssessmentConfig {
    fn default() -> Self {
        Self {
            noise_std: 5.0,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ScenarioModelConfig {
    /// Train the scenario model at startup.
    pub enabled: bool,
    pub embedding_dimension: usize,
    /// Folds for the cross-validation report; `None` skips it.
    pub cv_folds: Option<usize>,
    pub seed: u64,
    #[serde(deserialize_with = "scenario_boosting")]
    pub boosting: BoostingParams,
}

impl Default for ScenarioModelConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            embedding_dimension: DEFAULT_DIMENSION,
            cv_folds: Some(5),
            seed: 42,
            boosting: SCENARIO_BOOSTING,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RiskModelConfig {
    #[serde(deserialize_with = "risk_boosting")]
    pub boosting: BoostingParams,
}

impl Default for RiskModelConfig {
    fn default() -> Self {
        Self {
            boosting: DEFAULT_RISK_PARAMS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub logging: LoggingConfig,
    pub simulation: SimulationConfig,
    pub assessment: AssessmentConfig,
    pub scenario_model: ScenarioModelConfig,
    pub risk_model: RiskModelConfig,
}

impl ServiceConfig {
    /// Reads and validates a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            FloodRiskError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_toml(&text)
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        let config: ServiceConfig =
            toml::from_str(text).map_err(|e| FloodRiskError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let sim = &self.simulation;
        if sim.max_years == 0 {
            return Err(FloodRiskError::Config("simulation.max_years must be at least 1".to_string()));
        }
        if sim.default_years == 0 || sim.default_years > sim.max_years {
            return Err(FloodRiskError::Config(format!(
                "simulation.default_years must be between 1 and {}",
                sim.max_years
            )));
        }
        check_noise("simulation.noise_std", sim.noise_std)?;
        check_noise("assessment.noise_std", self.assessment.noise_std)?;

        let scenario = &self.scenario_model;
        if scenario.embedding_dimension == 0 {
            return Err(FloodRiskError::Config(
                "scenario_model.embedding_dimension must be at least 1".to_string(),
            ));
        }
        if let Some(folds) = scenario.cv_folds {
            if folds < 2 {
                return Err(FloodRiskError::Config(format!(
                    "scenario_model.cv_folds must be at least 2, got {}",
                    folds
                )));
            }
        }
        scenario
            .boosting
            .validate()
            .map_err(|e| FloodRiskError::Config(format!("scenario_model.boosting: {}", e)))?;
        self.risk_model
            .boosting
            .validate()
            .map_err(|e| FloodRiskError::Config(format!("risk_model.boosting: {}", e)))?;
        Ok(())
    }
}

fn check_noise(field: &str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(FloodRiskError::Config(format!(
            "{} must be a non-negative number, got {}",
            field, value
        )))
    }
}
