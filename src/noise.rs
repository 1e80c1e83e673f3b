/// Seedable Gaussian noise.
///
/// Both the instant assessment and the closed-form simulation add a small
/// normally distributed perturbation to represent unmodelled variability.
/// Samples come from a ChaCha stream so a fixed seed reproduces a run
/// exactly.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};

#[derive(Debug, Clone)]
pub struct GaussianNoise {
    rng: ChaCha8Rng,
    /// `None` when the deviation is zero.
    normal: Option<Normal<f64>>,
}

impl GaussianNoise {
    /// Seeded when `seed` is given, otherwise drawn from OS entropy.
    /// Negative or non-finite deviations are treated as zero.
    pub fn new(std_dev: f64, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        let normal = if std_dev.is_finite() && std_dev > 0.0 {
            Normal::new(0.0, std_dev).ok()
        } else {
            None
        };
        Self { rng, normal }
    }

    /// A source that always returns 0.
    pub fn silent() -> Self {
        Self::new(0.0, Some(0))
    }

    pub fn std_dev(&self) -> f64 {
        self.normal.map_or(0.0, |n| n.std_dev())
    }

    /// One draw from N(0, std_dev²).
    pub fn sample(&mut self) -> f64 {
        match &self.normal {
            Some(normal) => normal.sample(&mut self.rng),
            None => 0.0,
        }
    }
}
