/// Standardisation of the four environmental features.
///
/// When training samples are available the scaler learns per-column mean
/// and population standard deviation. Without samples it falls back to
/// dividing by a fixed nominal range per feature.

use crate::model::{FloodRiskError, Result};

/// Nominal full-scale values used when no samples were fitted:
/// rainfall 200 mm, water level 10 m, humidity 100 %, temperature 40 °C.
pub const FALLBACK_DIVISORS: [f64; 4] = [200.0, 10.0, 100.0, 40.0];

#[derive(Debug, Clone, PartialEq)]
pub enum FeatureScaler {
    /// Fitted `(mean, std)` per column.
    Standard { mean: [f64; 4], scale: [f64; 4] },
    /// Divide by `FALLBACK_DIVISORS`.
    Fallback,
}

impl FeatureScaler {
    pub fn fallback() -> Self {
        FeatureScaler::Fallback
    }

    /// Fits mean and population standard deviation per column. A column
    /// with zero spread gets a scale of 1 so it passes through centred.
    pub fn fit(samples: &[[f64; 4]]) -> Result<Self> {
        if samples.is_empty() {
            return Err(FloodRiskError::Training(
                "cannot fit feature scaler on zero samples".to_string(),
            ));
        }
        let n = samples.len() as f64;
        let mut mean = [0.0; 4];
        for row in samples {
            for (m, v) in mean.iter_mut().zip(row) {
                *m += v;
            }
        }
        mean.iter_mut().for_each(|m| *m /= n);

        let mut scale = [0.0; 4];
        for row in samples {
            for j in 0..4 {
                scale[j] += (row[j] - mean[j]).powi(2);
            }
        }
        for s in scale.iter_mut() {
            *s = (*s / n).sqrt();
            if *s == 0.0 {
                *s = 1.0;
            }
        }
        Ok(FeatureScaler::Standard { mean, scale })
    }

    pub fn is_fitted(&self) -> bool {
        matches!(self, FeatureScaler::Standard { .. })
    }

    pub fn transform(&self, x: [f64; 4]) -> [f64; 4] {
        let mut out = [0.0; 4];
        for j in 0..4 {
            out[j] = match self {
                FeatureScaler::Standard { mean, scale } => (x[j] - mean[j]) / scale[j],
                FeatureScaler::Fallback => x[j] / FALLBACK_DIVISORS[j],
            };
        }
        out
    }

    pub fn inverse_transform(&self, x: [f64; 4]) -> [f64; 4] {
        let mut out = [0.0; 4];
        for j in 0..4 {
            out[j] = match self {
                FeatureScaler::Standard { mean, scale } => x[j] * scale[j] + mean[j],
                FeatureScaler::Fallback => x[j] * FALLBACK_DIVISORS[j],
            };
        }
        out
    }
}

impl Default for FeatureScaler {
    fn default() -> Self {
        FeatureScaler::Fallback
    }
}
