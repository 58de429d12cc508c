pub mod artifact;
pub mod contract;
pub mod predictor;
