/// Environmental risk regressor.
///
/// Maps the four raw environmental features (rainfall, water level,
/// humidity, temperature) to a scalar flood risk. The simulation engine and
/// the importance report only depend on the `EnvironmentalRiskModel` trait;
/// `TrainedRiskModel` is the boosted-tree implementation fitted from
/// in-memory training records.

use crate::logging::{self, Component};
use crate::model::{EnvironmentalConditions, FloodRiskError, Result, ENVIRONMENTAL_FEATURE_NAMES};
use crate::regressor::{BoostingParams, GradientBoostingRegressor};
use crate::scaler::FeatureScaler;

/// Hyperparameters used when nothing else is configured.
pub const DEFAULT_RISK_PARAMS: BoostingParams = BoostingParams {
    n_estimators: 100,
    learning_rate: 0.1,
    max_depth: 4,
    min_samples_split: 2,
};

/// Predicts a scalar risk from original-scale environmental features.
pub trait EnvironmentalRiskModel: Send + Sync {
    fn predict_risk(&self, features: [f64; 4]) -> Result<f64>;

    /// Relative importance of rainfall, water level, humidity and
    /// temperature, in that order.
    fn feature_importances(&self) -> [f64; 4];
}

// ---------------------------------------------------------------------------
// Training records
// ---------------------------------------------------------------------------

/// One labelled observation: the conditions plus the per-assessor risk
/// labels recorded for them. The regression target is the label mean.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingRecord {
    pub conditions: EnvironmentalConditions,
    pub labels: Vec<f64>,
}

impl TrainingRecord {
    pub fn new(conditions: EnvironmentalConditions, labels: Vec<f64>) -> Self {
        Self { conditions, labels }
    }

    pub fn target(&self) -> Result<f64> {
        if self.labels.is_empty() {
            return Err(FloodRiskError::Training(
                "training record has no risk labels".to_string(),
            ));
        }
        Ok(self.labels.iter().sum::<f64>() / self.labels.len() as f64)
    }
}

// ---------------------------------------------------------------------------
// Trained model
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct TrainedRiskModel {
    regressor: GradientBoostingRegressor,
}

impl TrainedRiskModel {
    pub fn train(records: &[TrainingRecord], params: BoostingParams) -> Result<Self> {
        let x: Vec<Vec<f64>> = records
            .iter()
            .map(|r| r.conditions.as_array().to_vec())
            .collect();
        let y = records
            .iter()
            .map(TrainingRecord::target)
            .collect::<Result<Vec<f64>>>()?;

        let regressor = GradientBoostingRegressor::fit(params, &x, &y)?;
        let model = Self { regressor };

        logging::log_training_summary(Component::RiskModel, records.len(), 1, None);
        for (name, importance) in ENVIRONMENTAL_FEATURE_NAMES.iter().zip(model.feature_importances()) {
            logging::info(
                Component::RiskModel,
                None,
                &format!("Feature {}: {:.4}", name, importance),
            );
        }
        Ok(model)
    }
}

impl EnvironmentalRiskModel for TrainedRiskModel {
    fn predict_risk(&self, features: [f64; 4]) -> Result<f64> {
        self.regressor.predict(&features)
    }

    fn feature_importances(&self) -> [f64; 4] {
        let mut out = [0.0; 4];
        for (o, v) in out.iter_mut().zip(self.regressor.feature_importances()) {
            *o = v;
        }
        out
    }
}

/// Fits a standard scaler on the conditions of the training records.
pub fn fit_scaler(records: &[TrainingRecord]) -> Result<FeatureScaler> {
    let samples: Vec<[f64; 4]> = records.iter().map(|r| r.conditions.as_array()).collect();
    FeatureScaler::fit(&samples)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(rain: f64, water: f64, labels: &[f64]) -> TrainingRecord {
        TrainingRecord::new(EnvironmentalConditions::new(rain, water, 70.0, 20.0), labels.to_vec())
    }

    #[test]
    fn test_target_is_the_label_mean() {
        assert_eq!(record(10.0, 1.0, &[1.0, 2.0, 3.0, 4.0, 5.0]).target().unwrap(), 3.0);
    }

    #[test]
    fn test_empty_labels_are_rejected() {
        let err = TrainedRiskModel::train(&[record(10.0, 1.0, &[])], DEFAULT_RISK_PARAMS).unwrap_err();
        assert!(matches!(err, FloodRiskError::Training(_)));
    }

    #[test]
    fn test_no_records_is_a_training_error() {
        assert!(TrainedRiskModel::train(&[], DEFAULT_RISK_PARAMS).is_err());
    }

    #[test]
    fn test_rainfall_driven_target_ranks_rainfall_first() {
        let records: Vec<TrainingRecord> = (0..40)
            .map(|i| {
                let rain = i as f64 * 5.0;
                let risk = if rain > 100.0 { 8.0 } else { 2.0 };
                record(rain, 1.5, &[risk, risk])
            })
            .collect();
        let model = TrainedRiskModel::train(&records, DEFAULT_RISK_PARAMS).unwrap();
        let imp = model.feature_importances();
        assert!(imp[0] > 0.99, "rainfall should carry all importance, got {:?}", imp);

        let wet = model.predict_risk([180.0, 1.5, 70.0, 20.0]).unwrap();
        let dry = model.predict_risk([20.0, 1.5, 70.0, 20.0]).unwrap();
        assert!(wet > 7.5 && dry < 2.5, "wet {} dry {}", wet, dry);
    }

    #[test]
    fn test_fit_scaler_uses_record_conditions() {
        let scaler = fit_scaler(&[record(0.0, 1.0, &[1.0]), record(100.0, 3.0, &[1.0])]).unwrap();
        assert!(scaler.is_fitted());
        let t = scaler.transform([50.0, 2.0, 70.0, 20.0]);
        assert!(t[0].abs() < 1e-9 && t[1].abs() < 1e-9);
    }
}
