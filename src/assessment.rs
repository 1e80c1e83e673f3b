/// Instant flood risk assessment from current conditions.
///
/// Each feature is normalised against a nominal full-scale value and
/// combined with fixed weights into a base risk. The score is the base risk
/// as a percentage plus a small random perturbation, and is classified into
/// low / medium / high bands.

use crate::model::{EnvironmentalConditions, RiskLevel};
use crate::noise::GaussianNoise;

/// Weights of rainfall, water level, humidity and temperature.
pub const FEATURE_WEIGHTS: [f64; 4] = [0.4, 0.3, 0.2, 0.1];

pub const HIGH_RISK_SCORE: f64 = 70.0;
pub const MEDIUM_RISK_SCORE: f64 = 40.0;

/// Share reported for every feature when the base risk is zero.
const EQUAL_SHARE: f64 = 25.0;

/// Conditions mapped onto roughly [0, 1].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizedConditions {
    pub rainfall: f64,
    pub water_level: f64,
    pub humidity: f64,
    pub temperature: f64,
}

impl NormalizedConditions {
    /// Rainfall saturates at 200 mm and water level at 10 m. Temperature
    /// maps -10 °C..40 °C onto 0..1.
    pub fn from_conditions(c: &EnvironmentalConditions) -> Self {
        Self {
            rainfall: (c.rainfall_mm / 200.0).min(1.0),
            water_level: (c.water_level_m / 10.0).min(1.0),
            humidity: c.humidity_pct / 100.0,
            temperature: (c.temperature_c + 10.0) / 50.0,
        }
    }

    /// Weighted terms in feature order.
    pub fn weighted_terms(&self) -> [f64; 4] {
        [
            self.rainfall * FEATURE_WEIGHTS[0],
            self.water_level * FEATURE_WEIGHTS[1],
            self.humidity * FEATURE_WEIGHTS[2],
            self.temperature * FEATURE_WEIGHTS[3],
        ]
    }

    pub fn base_risk(&self) -> f64 {
        self.weighted_terms().iter().sum()
    }
}

/// Percentage of the base risk contributed by each feature.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FactorContributions {
    pub rainfall: f64,
    pub water_level: f64,
    pub humidity: f64,
    pub temperature: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Assessment {
    pub level: RiskLevel,
    pub message: &'static str,
    /// Risk score on a 0–100 scale.
    pub score: f64,
    pub contributions: FactorContributions,
}

/// Band and advisory message for a 0–100 score.
pub fn classify(score: f64) -> (RiskLevel, &'static str) {
    if score >= HIGH_RISK_SCORE {
        (
            RiskLevel::High,
            "High flood risk detected! Consider evacuation or emergency preparations.",
        )
    } else if score >= MEDIUM_RISK_SCORE {
        (RiskLevel::Medium, "Medium flood risk detected. Monitor conditions closely.")
    } else {
        (RiskLevel::Low, "Low flood risk. Normal precautions advised.")
    }
}

pub fn contributions(normalized: &NormalizedConditions) -> FactorContributions {
    let base = normalized.base_risk();
    if base <= 0.0 {
        return FactorContributions {
            rainfall: EQUAL_SHARE,
            water_level: EQUAL_SHARE,
            humidity: EQUAL_SHARE,
            temperature: EQUAL_SHARE,
        };
    }
    let [r, w, h, t] = normalized.weighted_terms();
    FactorContributions {
        rainfall: r / base * 100.0,
        water_level: w / base * 100.0,
        humidity: h / base * 100.0,
        temperature: t / base * 100.0,
    }
}

/// Scores the conditions. The score is clamped to [0, 100].
pub fn assess(conditions: &EnvironmentalConditions, noise: &mut GaussianNoise) -> Assessment {
    let normalized = NormalizedConditions::from_conditions(conditions);
    let score = (normalized.base_risk() * 100.0 + noise.sample()).clamp(0.0, 100.0);
    let (level, message) = classify(score);
    Assessment {
        level,
        message,
        score,
        contributions: contributions(&normalized),
    }
}
