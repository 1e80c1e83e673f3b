/// Request and response bodies for the predict and simulate operations.
///
/// Requests use camelCase keys. Numeric fields accept either JSON numbers or
/// numeric strings (`"12.5"`), since form-driven clients often send the
/// latter. Missing fields take the documented defaults.

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};

use crate::assessment::{Assessment, FactorContributions};
use crate::importance::{self, FeatureImportance};
use crate::model::{EnvironmentalConditions, FactorScores, RiskLevel, SimulationFeatures};
use crate::simulation::Trajectories;

// ---------------------------------------------------------------------------
// Lenient numbers
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Number(f64),
    Text(String),
}

impl NumberOrText {
    fn into_f64<E: de::Error>(self) -> Result<f64, E> {
        match self {
            NumberOrText::Number(n) => Ok(n),
            NumberOrText::Text(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| E::custom(format!("expected a number, got {:?}", s))),
        }
    }
}

fn lenient_f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    NumberOrText::deserialize(deserializer)?.into_f64()
}

/// Whole years; fractional values are truncated.
fn lenient_years<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<usize>, D::Error> {
    let value: Option<NumberOrText> = Option::deserialize(deserializer)?;
    let Some(value) = value else {
        return Ok(None);
    };
    let years = value.into_f64::<D::Error>()?;
    if !years.is_finite() || years < 0.0 {
        return Err(de::Error::custom(format!(
            "years must be a non-negative whole number, got {}",
            years
        )));
    }
    Ok(Some(years.trunc() as usize))
}

// ---------------------------------------------------------------------------
// Predict
// ---------------------------------------------------------------------------

/// Current conditions to assess. Every field defaults to 0.
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PredictRequest {
    #[serde(deserialize_with = "lenient_f64")]
    pub rainfall: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub water_level: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub humidity: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub temperature: f64,
}

impl PredictRequest {
    pub fn conditions(&self) -> EnvironmentalConditions {
        EnvironmentalConditions::new(self.rainfall, self.water_level, self.humidity, self.temperature)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictResponse {
    pub level: RiskLevel,
    pub message: String,
    pub probability: f64,
    pub factor_scores: FactorContributions,
    pub total_score: f64,
}

impl From<Assessment> for PredictResponse {
    fn from(a: Assessment) -> Self {
        Self {
            level: a.level,
            message: a.message.to_string(),
            probability: a.score,
            factor_scores: a.contributions,
            total_score: a.score,
        }
    }
}

// ---------------------------------------------------------------------------
// Simulate
// ---------------------------------------------------------------------------

/// Long-term simulation request.
///
/// `years` stays `None` when omitted so the service can apply its
/// configured default horizon.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SimulateRequest {
    #[serde(deserialize_with = "lenient_f64")]
    pub rainfall: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub water_level: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub humidity: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub temperature: f64,
    pub scenario: String,
    #[serde(deserialize_with = "lenient_years")]
    pub years: Option<usize>,
}

impl Default for SimulateRequest {
    fn default() -> Self {
        Self {
            rainfall: 50.0,
            water_level: 2.0,
            humidity: 60.0,
            temperature: 20.0,
            scenario: String::new(),
            years: None,
        }
    }
}

impl SimulateRequest {
    pub fn conditions(&self) -> EnvironmentalConditions {
        EnvironmentalConditions::new(self.rainfall, self.water_level, self.humidity, self.temperature)
    }
}

/// Input features echoed back in a simulation response. The scenario path
/// reports only the environmental values; the fallback path reports all
/// nine simulation inputs.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum EchoedFeatures {
    Environmental(EnvironmentalConditions),
    Full(SimulationFeatures),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulateResponse {
    pub risks: Vec<f64>,
    pub years: Vec<usize>,
    pub narrative: String,
    pub features: EchoedFeatures,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scenario_factors: Option<FactorScores>,
    pub feature_trajectories: Trajectories,
    #[serde(serialize_with = "importance::serialize_optional")]
    pub feature_importance: Option<FeatureImportance>,
}
