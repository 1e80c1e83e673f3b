/// Scenario text encoders.
///
/// The factor regressor only needs a fixed-length numeric vector per
/// scenario description. `ScenarioEncoder` is the seam where a heavier
/// language-model embedding can be plugged in; `HashingEncoder` is the
/// built-in, dependency-free default.

/// Turns free text into a fixed-length feature vector.
pub trait ScenarioEncoder: Send + Sync {
    /// Length of every vector returned by `encode`.
    fn dimension(&self) -> usize;

    fn encode(&self, text: &str) -> Vec<f64>;
}

/// Default embedding width for `HashingEncoder`.
pub const DEFAULT_DIMENSION: usize = 256;

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// Signed feature hashing of unigrams and bigrams, L2-normalised.
///
/// Tokens are lowercase alphanumeric runs. Each unigram and each adjacent
/// pair is hashed with FNV-1a; the low bits pick a bucket and one high bit
/// picks the sign, so collisions tend to cancel rather than accumulate.
#[derive(Debug, Clone)]
pub struct HashingEncoder {
    dimension: usize,
}

impl HashingEncoder {
    /// `dimension` is clamped to at least 1.
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension: dimension.max(1),
        }
    }

    fn add_feature(&self, vector: &mut [f64], feature: &str) {
        let hash = fnv1a(feature.as_bytes());
        let bucket = (hash % self.dimension as u64) as usize;
        let sign = if hash >> 63 == 0 { 1.0 } else { -1.0 };
        vector[bucket] += sign;
    }
}

impl Default for HashingEncoder {
    fn default() -> Self {
        Self::new(DEFAULT_DIMENSION)
    }
}

impl ScenarioEncoder for HashingEncoder {
    fn dimension(&self) -> usize {
        self.dimension
    }

    fn encode(&self, text: &str) -> Vec<f64> {
        let mut vector = vec![0.0; self.dimension];
        let tokens = tokenize(text);

        for token in &tokens {
            self.add_feature(&mut vector, token);
        }
        for pair in tokens.windows(2) {
            self.add_feature(&mut vector, &format!("{} {}", pair[0], pair[1]));
        }

        let norm = vector.iter().map(|v| v * v).sum::<f64>().sqrt();
        if norm > 0.0 {
            vector.iter_mut().for_each(|v| *v /= norm);
        }
        vector
    }
}

/// Lowercase alphanumeric runs; everything else separates tokens.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect()
}

fn fnv1a(bytes: &[u8]) -> u64 {
    bytes.iter().fold(FNV_OFFSET, |hash, &b| {
        (hash ^ u64::from(b)).wrapping_mul(FNV_PRIME)
    })
}
