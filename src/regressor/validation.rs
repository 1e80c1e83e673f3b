/// Shuffled K-fold cross-validation.
///
/// Fold assignment follows the usual convention: indices are shuffled once
/// with a seeded RNG, then cut into `folds` contiguous chunks where the first
/// `n % folds` chunks hold one extra sample.

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use super::boosting::{BoostingParams, GradientBoostingRegressor};
use super::check_training_data;
use crate::model::{FloodRiskError, Result};

/// `(train, test)` index sets for each fold.
pub fn kfold_splits(n_samples: usize, folds: usize, seed: u64) -> Result<Vec<(Vec<usize>, Vec<usize>)>> {
    if folds < 2 {
        return Err(FloodRiskError::InvalidInput(format!(
            "cross-validation needs at least 2 folds, got {}",
            folds
        )));
    }
    if n_samples < folds {
        return Err(FloodRiskError::InvalidInput(format!(
            "cannot split {} samples into {} folds",
            n_samples, folds
        )));
    }

    let mut indices: Vec<usize> = (0..n_samples).collect();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let base = n_samples / folds;
    let extra = n_samples % folds;
    let mut splits = Vec::with_capacity(folds);
    let mut start = 0;
    for fold in 0..folds {
        let size = base + usize::from(fold < extra);
        let test = indices[start..start + size].to_vec();
        let train = indices[..start]
            .iter()
            .chain(&indices[start + size..])
            .copied()
            .collect();
        splits.push((train, test));
        start += size;
    }
    Ok(splits)
}

/// Mean over folds of the held-out mean squared error.
pub fn kfold_mse(
    params: BoostingParams,
    x: &[Vec<f64>],
    y: &[f64],
    folds: usize,
    seed: u64,
) -> Result<f64> {
    check_training_data(x, y)?;
    let splits = kfold_splits(x.len(), folds, seed)?;

    let mut fold_mse = Vec::with_capacity(splits.len());
    for (train, test) in splits {
        let train_x: Vec<Vec<f64>> = train.iter().map(|&i| x[i].clone()).collect();
        let train_y: Vec<f64> = train.iter().map(|&i| y[i]).collect();
        let model = GradientBoostingRegressor::fit(params, &train_x, &train_y)?;

        let mut sse = 0.0;
        for &i in &test {
            sse += (model.predict(&x[i])? - y[i]).powi(2);
        }
        fold_mse.push(sse / test.len() as f64);
    }
    Ok(fold_mse.iter().sum::<f64>() / fold_mse.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_splits_partition_every_index_exactly_once() {
        let splits = kfold_splits(23, 5, 42).unwrap();
        assert_eq!(splits.len(), 5);
        let mut seen: Vec<usize> = splits.iter().flat_map(|(_, test)| test.clone()).collect();
        seen.sort();
        assert_eq!(seen, (0..23).collect::<Vec<_>>());
        for (train, test) in &splits {
            assert_eq!(train.len() + test.len(), 23);
            assert!(test.iter().all(|i| !train.contains(i)));
        }
    }

    #[test]
    fn test_first_folds_take_the_remainder() {
        let sizes: Vec<usize> = kfold_splits(23, 5, 1)
            .unwrap()
            .iter()
            .map(|(_, t)| t.len())
            .collect();
        assert_eq!(sizes, vec![5, 5, 5, 4, 4]);
    }

    #[test]
    fn test_same_seed_gives_same_splits() {
        assert_eq!(kfold_splits(12, 3, 7).unwrap(), kfold_splits(12, 3, 7).unwrap());
    }

    #[test]
    fn test_too_few_samples_or_folds_is_rejected() {
        assert!(kfold_splits(3, 5, 0).is_err());
        assert!(kfold_splits(10, 1, 0).is_err());
    }

    #[test]
    fn test_kfold_mse_is_small_for_a_learnable_target() {
        // Two well separated clusters: 0..9 map to 0, 20..29 map to 1.
        let x: Vec<Vec<f64>> = (0..40)
            .map(|i| {
                let v = (i % 20) as f64;
                vec![if v >= 10.0 { v + 10.0 } else { v }]
            })
            .collect();
        let y: Vec<f64> = (0..40).map(|i| if i % 20 < 10 { 0.0 } else { 1.0 }).collect();
        let mse = kfold_mse(BoostingParams::default(), &x, &y, 5, 42).unwrap();
        assert!(mse < 0.05, "mse {} too large for a separable step", mse);
    }
}
