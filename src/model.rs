/// Core data types for the flood risk estimator.
///
/// This module defines the shared domain model imported by all other modules:
/// the five latent risk factors, environmental conditions, the simulation
/// feature vector, and the crate-wide error type. It contains no I/O.

use serde::ser::{Serialize, SerializeMap, Serializer};
use std::fmt;

// ---------------------------------------------------------------------------
// Factors
// ---------------------------------------------------------------------------

/// One of the five latent drivers of long-term flood risk, scored 1–10.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Factor {
    ClimateChange,
    Urbanization,
    Deforestation,
    DrainageSystems,
    DamsQuality,
}

impl Factor {
    /// Simulation order. `FactorScores` and the simulation state vector are
    /// laid out in this order.
    pub const ALL: [Factor; 5] = [
        Factor::ClimateChange,
        Factor::Urbanization,
        Factor::Deforestation,
        Factor::DrainageSystems,
        Factor::DamsQuality,
    ];

    /// Label order used by the scenario model's training corpus and by the
    /// scenario factor map in responses.
    pub const SCENARIO_ORDER: [Factor; 5] = [
        Factor::Urbanization,
        Factor::Deforestation,
        Factor::ClimateChange,
        Factor::DrainageSystems,
        Factor::DamsQuality,
    ];

    /// Position of this factor in `Factor::ALL`.
    pub fn index(self) -> usize {
        match self {
            Factor::ClimateChange => 0,
            Factor::Urbanization => 1,
            Factor::Deforestation => 2,
            Factor::DrainageSystems => 3,
            Factor::DamsQuality => 4,
        }
    }

    /// Wire name, e.g. `"ClimateChange"`.
    pub fn name(self) -> &'static str {
        match self {
            Factor::ClimateChange => "ClimateChange",
            Factor::Urbanization => "Urbanization",
            Factor::Deforestation => "Deforestation",
            Factor::DrainageSystems => "DrainageSystems",
            Factor::DamsQuality => "DamsQuality",
        }
    }

    /// Phrase used when the factor appears in a narrative.
    pub fn display_phrase(self) -> &'static str {
        match self {
            Factor::ClimateChange => "climate change impacts",
            Factor::Urbanization => "urban development",
            Factor::Deforestation => "deforestation",
            Factor::DrainageSystems => "drainage infrastructure",
            Factor::DamsQuality => "dam and levee systems",
        }
    }

    /// Infrastructure degrades over time unless maintained; the other
    /// factors drift upward.
    pub fn is_infrastructure(self) -> bool {
        matches!(self, Factor::DrainageSystems | Factor::DamsQuality)
    }

    pub fn from_name(name: &str) -> Option<Factor> {
        Factor::ALL.into_iter().find(|f| f.name() == name)
    }
}

impl fmt::Display for Factor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Default score assigned to every factor when no scenario model is
/// available.
pub const NEUTRAL_FACTOR_SCORE: f64 = 5.0;

/// A score for each of the five factors, stored in simulation order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FactorScores([f64; 5]);

impl FactorScores {
    pub fn new(values: [f64; 5]) -> Self {
        Self(values)
    }

    /// Every factor at the neutral midpoint (5.0).
    pub fn neutral() -> Self {
        Self([NEUTRAL_FACTOR_SCORE; 5])
    }

    /// Builds scores from values listed in `Factor::SCENARIO_ORDER`.
    pub fn from_scenario_order(values: [f64; 5]) -> Self {
        let mut scores = [0.0; 5];
        for (factor, value) in Factor::SCENARIO_ORDER.iter().zip(values) {
            scores[factor.index()] = value;
        }
        Self(scores)
    }

    pub fn get(&self, factor: Factor) -> f64 {
        self.0[factor.index()]
    }

    /// Scores in simulation order.
    pub fn as_array(&self) -> [f64; 5] {
        self.0
    }

    /// `(factor, score)` pairs in scenario-model order.
    pub fn scenario_ordered(&self) -> impl Iterator<Item = (Factor, f64)> + '_ {
        Factor::SCENARIO_ORDER.into_iter().map(|f| (f, self.get(f)))
    }
}

impl Serialize for FactorScores {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(5))?;
        for (factor, value) in self.scenario_ordered() {
            map.serialize_entry(factor.name(), &value)?;
        }
        map.end()
    }
}

// ---------------------------------------------------------------------------
// Environmental conditions
// ---------------------------------------------------------------------------

/// Raw sensor-style conditions on their natural scales.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct EnvironmentalConditions {
    #[serde(rename = "Rainfall")]
    pub rainfall_mm: f64,
    #[serde(rename = "WaterLevel")]
    pub water_level_m: f64,
    #[serde(rename = "Humidity")]
    pub humidity_pct: f64,
    #[serde(rename = "Temperature")]
    pub temperature_c: f64,
}

/// Display names for the four environmental features, in feature order.
pub const ENVIRONMENTAL_FEATURE_NAMES: [&str; 4] =
    ["Rainfall", "Water Level", "Humidity", "Temperature"];

impl EnvironmentalConditions {
    pub fn new(rainfall_mm: f64, water_level_m: f64, humidity_pct: f64, temperature_c: f64) -> Self {
        Self {
            rainfall_mm,
            water_level_m,
            humidity_pct,
            temperature_c,
        }
    }

    /// Features in model order: rainfall, water level, humidity, temperature.
    pub fn as_array(&self) -> [f64; 4] {
        [
            self.rainfall_mm,
            self.water_level_m,
            self.humidity_pct,
            self.temperature_c,
        ]
    }

    pub fn from_array(values: [f64; 4]) -> Self {
        Self::new(values[0], values[1], values[2], values[3])
    }
}

/// The full nine-value feature vector fed to the simulation engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationFeatures {
    pub conditions: EnvironmentalConditions,
    pub factors: FactorScores,
}

impl Serialize for SimulationFeatures {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(9))?;
        map.serialize_entry("Rainfall", &self.conditions.rainfall_mm)?;
        map.serialize_entry("WaterLevel", &self.conditions.water_level_m)?;
        map.serialize_entry("Humidity", &self.conditions.humidity_pct)?;
        map.serialize_entry("Temperature", &self.conditions.temperature_c)?;
        for factor in Factor::ALL {
            map.serialize_entry(factor.name(), &self.factors.get(factor))?;
        }
        map.end()
    }
}

/// Rounds to two decimal places, the precision used in every response.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

// ---------------------------------------------------------------------------
// Risk levels
// ---------------------------------------------------------------------------

/// Coarse risk classification for an instant assessment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can arise while training models, running simulations or
/// handling requests.
#[derive(Debug, thiserror::Error)]
pub enum FloodRiskError {
    /// A request or argument was outside its accepted domain.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    /// A model could not be fitted to the supplied samples.
    #[error("Training error: {0}")]
    Training(String),
    /// A fitted model could not produce a prediction.
    #[error("Prediction error: {0}")]
    Prediction(String),
    /// The configuration file was unreadable or inconsistent.
    #[error("Config error: {0}")]
    Config(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, FloodRiskError>;

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factor_indices_match_simulation_order() {
        for (i, factor) in Factor::ALL.iter().enumerate() {
            assert_eq!(factor.index(), i, "{} is out of order", factor);
        }
    }

    #[test]
    fn test_scenario_order_is_a_permutation_of_all_factors() {
        let mut seen: Vec<_> = Factor::SCENARIO_ORDER.to_vec();
        seen.sort();
        let mut all = Factor::ALL.to_vec();
        all.sort();
        assert_eq!(seen, all);
    }

    #[test]
    fn test_from_name_round_trips_every_factor() {
        for factor in Factor::ALL {
            assert_eq!(Factor::from_name(factor.name()), Some(factor));
        }
        assert_eq!(Factor::from_name("Rainfall"), None);
    }

    #[test]
    fn test_only_drainage_and_dams_are_infrastructure() {
        let infra: Vec<_> = Factor::ALL
            .into_iter()
            .filter(|f| f.is_infrastructure())
            .collect();
        assert_eq!(infra, vec![Factor::DrainageSystems, Factor::DamsQuality]);
    }

    #[test]
    fn test_from_scenario_order_places_values_by_factor() {
        // Urbanization, Deforestation, ClimateChange, DrainageSystems, DamsQuality
        let scores = FactorScores::from_scenario_order([9.0, 8.0, 6.0, 2.0, 4.0]);
        assert_eq!(scores.get(Factor::Urbanization), 9.0);
        assert_eq!(scores.get(Factor::Deforestation), 8.0);
        assert_eq!(scores.get(Factor::ClimateChange), 6.0);
        assert_eq!(scores.get(Factor::DrainageSystems), 2.0);
        assert_eq!(scores.get(Factor::DamsQuality), 4.0);
        assert_eq!(scores.as_array(), [6.0, 9.0, 8.0, 2.0, 4.0]);
    }

    #[test]
    fn test_factor_scores_serialize_as_named_map() {
        let json = serde_json::to_value(FactorScores::neutral()).unwrap();
        let obj = json.as_object().expect("factor scores should serialize as an object");
        assert_eq!(obj.len(), 5);
        assert_eq!(obj["DamsQuality"], 5.0);
    }

    #[test]
    fn test_simulation_features_serialize_all_nine_values() {
        let features = SimulationFeatures {
            conditions: EnvironmentalConditions::new(50.0, 2.0, 60.0, 20.0),
            factors: FactorScores::neutral(),
        };
        let json = serde_json::to_value(features).unwrap();
        assert_eq!(json.as_object().unwrap().len(), 9);
        assert_eq!(json["WaterLevel"], 2.0);
        assert_eq!(json["ClimateChange"], 5.0);
    }

    #[test]
    fn test_environmental_conditions_serialize_with_feature_keys() {
        let json = serde_json::to_value(EnvironmentalConditions::new(50.0, 2.0, 60.0, 20.0)).unwrap();
        assert_eq!(json["Rainfall"], 50.0);
        assert_eq!(json["WaterLevel"], 2.0);
        assert_eq!(json.as_object().unwrap().len(), 4);
    }

    #[test]
    fn test_error_display_includes_context() {
        let err = FloodRiskError::InvalidInput("years must be positive".into());
        assert_eq!(err.to_string(), "Invalid input: years must be positive");
    }
}
