//! LSTM close price forecaster.
//!
//! Pipeline: OHLCV feature frame → min-max scaling → sliding windows →
//! background training → iterative rollout with feature carry-forward.

pub mod features;
pub mod forecaster;
pub mod lstm;
pub mod normalizer;
pub mod optimizer;
pub mod sequences;
pub mod trainer;

pub use features::FeatureFrame;
pub use forecaster::{roll_forward, FeatureWeight, Forecast, Forecaster, PreparedData};
pub use lstm::{EpochReport, LstmRegressor};
pub use normalizer::{FeatureScaler, NormalizationBounds};
pub use optimizer::{Adam, Moments};
pub use sequences::build_sequences;
pub use trainer::{TrainedModel, TrainingEvent, TrainingHandle, TrainingTask};
