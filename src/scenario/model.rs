/// Scenario factor regressor.
///
/// Maps a free-text scenario description to a 1–10 score for each of the
/// five factors: the text is embedded by a `ScenarioEncoder`, each label
/// column is min-max scaled to [0, 1], and one boosted ensemble is fitted
/// per factor. Predictions are unscaled, clipped to [1, 10] and rounded to
/// two decimals.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::corpus::{LabelledScenario, TRAINING_SCENARIOS};
use super::encoder::ScenarioEncoder;
use crate::logging::{self, Component};
use crate::model::{round2, Factor, FactorScores, FloodRiskError, Result};
use crate::regressor::validation::kfold_mse;
use crate::regressor::{BoostingParams, GradientBoostingRegressor};

/// Lowest and highest admissible factor scores.
pub const SCORE_RANGE: (f64, f64) = (1.0, 10.0);

/// Anything that can turn scenario text into factor scores.
pub trait FactorPredictor: Send + Sync {
    fn predict_factors(&self, text: &str) -> Result<FactorScores>;
}

// ---------------------------------------------------------------------------
// Training report
// ---------------------------------------------------------------------------

/// Held-out error for one output dimension, on the [0, 1] scaled labels.
#[derive(Debug, Clone, Serialize)]
pub struct FactorMse {
    pub factor: &'static str,
    pub mse: f64,
}

/// Summary of a training run.
#[derive(Debug, Clone, Serialize)]
pub struct TrainingReport {
    pub samples: usize,
    pub embedding_dimension: usize,
    /// Empty when cross-validation was skipped.
    pub cv_mse: Vec<FactorMse>,
    pub mean_cv_mse: Option<f64>,
    pub trained_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Label scaling
// ---------------------------------------------------------------------------

/// Per-column min-max scaling of the label matrix.
#[derive(Debug, Clone)]
struct LabelScaler {
    min: [f64; 5],
    range: [f64; 5],
}

impl LabelScaler {
    fn fit(labels: &[[f64; 5]]) -> Self {
        let mut min = [f64::INFINITY; 5];
        let mut max = [f64::NEG_INFINITY; 5];
        for row in labels {
            for j in 0..5 {
                min[j] = min[j].min(row[j]);
                max[j] = max[j].max(row[j]);
            }
        }
        let mut range = [1.0; 5];
        for j in 0..5 {
            let r = max[j] - min[j];
            if r > 0.0 {
                range[j] = r;
            }
        }
        Self { min, range }
    }

    fn transform(&self, column: usize, value: f64) -> f64 {
        (value - self.min[column]) / self.range[column]
    }

    fn inverse(&self, column: usize, value: f64) -> f64 {
        value * self.range[column] + self.min[column]
    }
}

// ---------------------------------------------------------------------------
// Model
// ---------------------------------------------------------------------------

pub struct ScenarioFactorModel {
    encoder: Box<dyn ScenarioEncoder>,
    /// One regressor per factor, in `Factor::SCENARIO_ORDER`.
    regressors: Vec<GradientBoostingRegressor>,
    label_scaler: LabelScaler,
}

impl ScenarioFactorModel {
    /// Trains on the built-in corpus.
    ///
    /// When `cv_folds` is given, shuffled K-fold cross-validation is run per
    /// factor before the final fit and its errors are logged and reported.
    pub fn train(
        encoder: Box<dyn ScenarioEncoder>,
        params: BoostingParams,
        cv_folds: Option<usize>,
        seed: u64,
    ) -> Result<(Self, TrainingReport)> {
        Self::train_on(encoder, TRAINING_SCENARIOS, params, cv_folds, seed)
    }

    pub fn train_on(
        encoder: Box<dyn ScenarioEncoder>,
        corpus: &[LabelledScenario],
        params: BoostingParams,
        cv_folds: Option<usize>,
        seed: u64,
    ) -> Result<(Self, TrainingReport)> {
        if corpus.is_empty() {
            return Err(FloodRiskError::Training("scenario corpus is empty".to_string()));
        }
        logging::info(
            Component::Scenario,
            None,
            &format!("Training scenario model with {} examples", corpus.len()),
        );

        let x: Vec<Vec<f64>> = corpus.iter().map(|s| encoder.encode(s.text)).collect();
        let labels: Vec<[f64; 5]> = corpus.iter().map(|s| s.labels).collect();
        let label_scaler = LabelScaler::fit(&labels);

        let columns: Vec<Vec<f64>> = (0..5)
            .map(|j| labels.iter().map(|row| label_scaler.transform(j, row[j])).collect())
            .collect();

        let mut cv_mse = Vec::new();
        if let Some(folds) = cv_folds {
            for (factor, column) in Factor::SCENARIO_ORDER.iter().zip(&columns) {
                let mse = kfold_mse(params, &x, column, folds, seed)?;
                cv_mse.push(FactorMse {
                    factor: factor.name(),
                    mse,
                });
            }
            let by_dimension: Vec<String> = cv_mse.iter().map(|m| format!("{:.4}", m.mse)).collect();
            logging::info(
                Component::Scenario,
                None,
                &format!("Cross-validation MSE by dimension: [{}]", by_dimension.join(", ")),
            );
        }
        let mean_cv_mse = if cv_mse.is_empty() {
            None
        } else {
            Some(cv_mse.iter().map(|m| m.mse).sum::<f64>() / cv_mse.len() as f64)
        };

        let regressors = columns
            .iter()
            .map(|column| GradientBoostingRegressor::fit(params, &x, column))
            .collect::<Result<Vec<_>>>()?;

        logging::log_training_summary(Component::Scenario, corpus.len(), regressors.len(), mean_cv_mse);

        let report = TrainingReport {
            samples: corpus.len(),
            embedding_dimension: encoder.dimension(),
            cv_mse,
            mean_cv_mse,
            trained_at: Utc::now(),
        };
        Ok((
            Self {
                encoder,
                regressors,
                label_scaler,
            },
            report,
        ))
    }
}

impl FactorPredictor for ScenarioFactorModel {
    fn predict_factors(&self, text: &str) -> Result<FactorScores> {
        let embedding = self.encoder.encode(text);
        let mut values = [0.0; 5];
        for (j, regressor) in self.regressors.iter().enumerate() {
            let scaled = regressor.predict(&embedding)?;
            let score = self.label_scaler.inverse(j, scaled).clamp(SCORE_RANGE.0, SCORE_RANGE.1);
            values[j] = round2(score);
        }
        Ok(FactorScores::from_scenario_order(values))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::encoder::HashingEncoder;

    fn quick_params() -> BoostingParams {
        BoostingParams {
            n_estimators: 30,
            learning_rate: 0.1,
            max_depth: 3,
            min_samples_split: 3,
        }
    }

    #[test]
    fn test_label_scaler_round_trips() {
        let scaler = LabelScaler::fit(&[[1.0, 2.0, 3.0, 4.0, 5.0], [9.0, 2.0, 7.0, 8.0, 10.0]]);
        assert_eq!(scaler.transform(0, 9.0), 1.0);
        assert_eq!(scaler.transform(0, 1.0), 0.0);
        // constant column keeps a unit range
        assert_eq!(scaler.transform(1, 2.0), 0.0);
        assert_eq!(scaler.inverse(2, scaler.transform(2, 5.0)), 5.0);
    }

    #[test]
    fn test_predictions_are_clipped_and_rounded() {
        let (model, _) =
            ScenarioFactorModel::train(Box::new(HashingEncoder::new(64)), quick_params(), None, 42).unwrap();
        let scores = model
            .predict_factors("Sudden glacial outburst after record heat")
            .unwrap();
        for factor in Factor::ALL {
            let v = scores.get(factor);
            assert!((1.0..=10.0).contains(&v), "{} out of range: {}", factor, v);
            assert!(((v * 100.0).round() - v * 100.0).abs() < 1e-6, "{} not rounded: {}", factor, v);
        }
    }

    #[test]
    fn test_fit_beats_the_mean_predictor_on_training_scenarios() {
        let (model, _) =
            ScenarioFactorModel::train(Box::new(HashingEncoder::default()), quick_params(), None, 42).unwrap();

        let mut model_sse = 0.0;
        let mut mean_sse = 0.0;
        for col in 0..5 {
            let factor = Factor::SCENARIO_ORDER[col];
            let mean = TRAINING_SCENARIOS.iter().map(|s| s.labels[col]).sum::<f64>()
                / TRAINING_SCENARIOS.len() as f64;
            for s in TRAINING_SCENARIOS {
                let predicted = model.predict_factors(s.text).unwrap().get(factor);
                model_sse += (predicted - s.labels[col]).powi(2);
                mean_sse += (mean - s.labels[col]).powi(2);
            }
        }
        assert!(
            model_sse < mean_sse,
            "boosted fit ({:.2}) should beat the constant mean ({:.2})",
            model_sse,
            mean_sse
        );
    }

    #[test]
    fn test_cross_validation_report_covers_every_factor() {
        let (_, report) =
            ScenarioFactorModel::train(Box::new(HashingEncoder::new(64)), quick_params(), Some(5), 42).unwrap();
        assert_eq!(report.samples, TRAINING_SCENARIOS.len());
        assert_eq!(report.embedding_dimension, 64);
        assert_eq!(report.cv_mse.len(), 5);
        assert_eq!(report.cv_mse[0].factor, "Urbanization");
        let mean = report.mean_cv_mse.expect("mean should be present when CV ran");
        assert!(mean.is_finite() && mean >= 0.0);
    }

    #[test]
    fn test_empty_corpus_is_rejected() {
        let result = ScenarioFactorModel::train_on(Box::new(HashingEncoder::new(8)), &[], quick_params(), None, 0);
        assert!(matches!(result, Err(FloodRiskError::Training(_))));
    }
}
