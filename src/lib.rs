pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod models;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliArgs;
pub use config::PredictorConfig;

pub use core::{
    artifact::ModelArtifact,
    contract::{FeatureContract, FeatureKind, FeatureSpec},
    predictor::PredictorFacade,
};
pub use domain::model::{FeatureRow, FeatureValue, ParameterMapping};
pub use domain::ports::Regressor;
pub use utils::error::{InferenceError, PredictorError, Result};
