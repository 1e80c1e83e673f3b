/// Feature importance report attached to simulation responses.
///
/// Splits attribution between the environmental features, as learned by
/// the trained risk model, and the climate factors. The report only exists
/// when a trained risk model is available.

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

use crate::model::{round2, Factor, FactorScores, ENVIRONMENTAL_FEATURE_NAMES};

/// Fixed climate factor weights reported when no scenario scores exist.
pub const DEFAULT_CLIMATE_WEIGHTS: [(Factor, f64); 5] = [
    (Factor::ClimateChange, 25.0),
    (Factor::Urbanization, 25.0),
    (Factor::Deforestation, 20.0),
    (Factor::DrainageSystems, 15.0),
    (Factor::DamsQuality, 15.0),
];

/// Ordered name → value pairs serialised as a JSON object.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedValues(Vec<(&'static str, f64)>);

impl NamedValues {
    pub fn get(&self, name: &str) -> Option<f64> {
        self.0.iter().find(|(n, _)| *n == name).map(|(_, v)| *v)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for NamedValues {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, value) in &self.0 {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImportanceGroup {
    pub value: f64,
    pub factors: NamedValues,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureImportance {
    #[serde(rename = "Environmental")]
    pub environmental: ImportanceGroup,
    #[serde(rename = "Climate")]
    pub climate: ImportanceGroup,
}

impl FeatureImportance {
    /// Builds the report from the risk model's importances.
    ///
    /// Environmental percentages are each feature's share of the total
    /// (0 when the model never split). The climate group carries the
    /// scenario scores when available, otherwise the default weights.
    pub fn from_model(importances: [f64; 4], scenario: Option<&FactorScores>) -> Self {
        let total: f64 = importances.iter().sum();
        let env_factors = ENVIRONMENTAL_FEATURE_NAMES
            .iter()
            .zip(importances)
            .map(|(name, imp)| {
                let pct = if total > 0.0 { imp / total * 100.0 } else { 0.0 };
                (*name, round2(pct))
            })
            .collect();

        let climate_factors = match scenario {
            Some(scores) => Factor::ALL
                .into_iter()
                .map(|f| (f.name(), round2(scores.get(f))))
                .collect(),
            None => DEFAULT_CLIMATE_WEIGHTS
                .into_iter()
                .map(|(f, w)| (f.name(), w))
                .collect(),
        };

        Self {
            environmental: ImportanceGroup {
                value: round2(total * 100.0),
                factors: NamedValues(env_factors),
            },
            climate: ImportanceGroup {
                value: round2((1.0 - total) * 100.0),
                factors: NamedValues(climate_factors),
            },
        }
    }

    pub fn rainfall_pct(&self) -> f64 {
        self.environmental.factors.get("Rainfall").unwrap_or(0.0)
    }

    pub fn water_level_pct(&self) -> f64 {
        self.environmental.factors.get("Water Level").unwrap_or(0.0)
    }
}

/// Serialises `None` as an empty JSON object.
pub fn serialize_optional<S: Serializer>(
    value: &Option<FeatureImportance>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match value {
        Some(report) => report.serialize(serializer),
        None => serializer.serialize_map(Some(0))?.end(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environmental_shares_are_percentages_of_total() {
        let report = FeatureImportance::from_model([0.5, 0.3, 0.1, 0.1], None);
        assert_eq!(report.rainfall_pct(), 50.0);
        assert_eq!(report.water_level_pct(), 30.0);
        assert_eq!(report.environmental.value, 100.0);
        assert_eq!(report.climate.value, 0.0);
    }

    #[test]
    fn test_fallback_uses_default_climate_weights() {
        let report = FeatureImportance::from_model([0.25; 4], None);
        assert_eq!(report.climate.factors.get("ClimateChange"), Some(25.0));
        assert_eq!(report.climate.factors.get("DamsQuality"), Some(15.0));
        let total: f64 = DEFAULT_CLIMATE_WEIGHTS.iter().map(|(_, w)| w).sum();
        assert_eq!(total, 100.0);
    }

    #[test]
    fn test_scenario_scores_replace_default_weights() {
        let scores = FactorScores::from_scenario_order([9.0, 8.0, 6.456, 2.0, 4.0]);
        let report = FeatureImportance::from_model([0.25; 4], Some(&scores));
        assert_eq!(report.climate.factors.get("ClimateChange"), Some(6.46));
        assert_eq!(report.climate.factors.get("Urbanization"), Some(9.0));
    }

    #[test]
    fn test_all_zero_importances_do_not_divide_by_zero() {
        let report = FeatureImportance::from_model([0.0; 4], None);
        assert_eq!(report.rainfall_pct(), 0.0);
        assert_eq!(report.climate.value, 100.0);
    }

    #[test]
    fn test_json_shape_matches_response_contract() {
        let report = FeatureImportance::from_model([0.4, 0.3, 0.2, 0.1], None);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["Environmental"]["factors"]["Water Level"], 30.0);
        assert_eq!(json["Climate"]["factors"]["Deforestation"], 20.0);
    }

    #[test]
    fn test_missing_report_serializes_as_empty_object() {
        let mut buf = Vec::new();
        let mut ser = serde_json::Serializer::new(&mut buf);
        serialize_optional(&None, &mut ser).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "{}");
    }
}
