/// Gradient-boosted regression trees.
///
/// Both learned components of the estimator are built from this module:
/// the environmental risk regressor (four features → scalar risk) and the
/// scenario factor regressor (text embedding → one score per factor).
///
/// Submodules:
/// - `tree`: a single CART regression tree with squared-error splits.
/// - `boosting`: the additive ensemble and its hyperparameters.
/// - `validation`: shuffled K-fold cross-validation.

pub mod boosting;
pub mod tree;
pub mod validation;

pub use boosting::{BoostingParams, GradientBoostingRegressor};

use crate::model::{FloodRiskError, Result};

/// Checks that `x` is a non-empty rectangular matrix with one target per
/// row, and returns its column count.
pub(crate) fn check_training_data(x: &[Vec<f64>], y: &[f64]) -> Result<usize> {
    if x.is_empty() {
        return Err(FloodRiskError::Training("no training samples".to_string()));
    }
    if x.len() != y.len() {
        return Err(FloodRiskError::Training(format!(
            "{} feature rows but {} targets",
            x.len(),
            y.len()
        )));
    }
    let n_features = x[0].len();
    if n_features == 0 {
        return Err(FloodRiskError::Training("samples have no features".to_string()));
    }
    if let Some(i) = x.iter().position(|row| row.len() != n_features) {
        return Err(FloodRiskError::Training(format!(
            "row {} has {} features, expected {}",
            i,
            x[i].len(),
            n_features
        )));
    }
    if x.iter().flatten().chain(y).any(|v| !v.is_finite()) {
        return Err(FloodRiskError::Training("training data contains non-finite values".to_string()));
    }
    Ok(n_features)
}
