/// Scenario text → factor scores.
///
/// Submodules:
/// - `encoder`: the `ScenarioEncoder` seam and the default hashing encoder.
/// - `corpus`: the labelled scenarios the model is trained on.
/// - `model`: the multi-output boosted regressor and `FactorPredictor`.

pub mod corpus;
pub mod encoder;
pub mod model;

pub use encoder::{HashingEncoder, ScenarioEncoder};
pub use model::{FactorPredictor, ScenarioFactorModel, TrainingReport};
