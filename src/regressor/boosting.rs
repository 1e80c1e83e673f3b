/// Least-squares gradient boosting.
///
/// Stage 0 predicts the target mean. Each following stage fits a
/// `RegressionTree` to the current residuals and contributes
/// `learning_rate * tree(x)` to the running prediction.

use super::check_training_data;
use super::tree::RegressionTree;
use crate::model::{FloodRiskError, Result};

/// Hyperparameters of a boosted ensemble.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoostingParams {
    pub n_estimators: usize,
    pub learning_rate: f64,
    pub max_depth: usize,
    pub min_samples_split: usize,
}

impl Default for BoostingParams {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            learning_rate: 0.1,
            max_depth: 3,
            min_samples_split: 2,
        }
    }
}

impl BoostingParams {
    pub fn validate(&self) -> Result<()> {
        if self.n_estimators == 0 {
            return Err(FloodRiskError::Config("n_estimators must be at least 1".to_string()));
        }
        if !(self.learning_rate > 0.0 && self.learning_rate.is_finite()) {
            return Err(FloodRiskError::Config(format!(
                "learning_rate must be positive, got {}",
                self.learning_rate
            )));
        }
        if self.max_depth == 0 {
            return Err(FloodRiskError::Config("max_depth must be at least 1".to_string()));
        }
        if self.min_samples_split < 2 {
            return Err(FloodRiskError::Config("min_samples_split must be at least 2".to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct GradientBoostingRegressor {
    params: BoostingParams,
    init: f64,
    trees: Vec<RegressionTree>,
    n_features: usize,
}

impl GradientBoostingRegressor {
    pub fn fit(params: BoostingParams, x: &[Vec<f64>], y: &[f64]) -> Result<Self> {
        params.validate()?;
        let n_features = check_training_data(x, y)?;

        let init = y.iter().sum::<f64>() / y.len() as f64;
        let mut current = vec![init; y.len()];
        let mut trees = Vec::with_capacity(params.n_estimators);

        for _ in 0..params.n_estimators {
            let residuals: Vec<f64> = y.iter().zip(&current).map(|(t, p)| t - p).collect();
            let tree = RegressionTree::fit(
                x,
                &residuals,
                (0..x.len()).collect(),
                params.max_depth,
                params.min_samples_split,
            );
            for (p, row) in current.iter_mut().zip(x) {
                *p += params.learning_rate * tree.predict(row);
            }
            trees.push(tree);
        }

        Ok(Self {
            params,
            init,
            trees,
            n_features,
        })
    }

    pub fn predict(&self, row: &[f64]) -> Result<f64> {
        if row.len() != self.n_features {
            return Err(FloodRiskError::Prediction(format!(
                "expected {} features, got {}",
                self.n_features,
                row.len()
            )));
        }
        Ok(self.init
            + self
                .trees
                .iter()
                .map(|t| self.params.learning_rate * t.predict(row))
                .sum::<f64>())
    }

    /// Impurity-based importances, normalised to sum to 1. All zeros when
    /// no tree ever split.
    pub fn feature_importances(&self) -> Vec<f64> {
        let mut totals = vec![0.0; self.n_features];
        for tree in &self.trees {
            for (t, d) in totals.iter_mut().zip(tree.impurity_decrease()) {
                *t += d;
            }
        }
        let sum: f64 = totals.iter().sum();
        if sum > 0.0 {
            totals.iter_mut().for_each(|t| *t /= sum);
        }
        totals
    }
}
