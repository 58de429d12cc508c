use crate::core::artifact::ModelArtifact;
use crate::core::contract::FeatureContract;
use crate::domain::model::{FeatureRow, ParameterMapping};
use crate::domain::ports::Regressor;
use crate::utils::error::{InferenceError, PredictorError, Result};
use std::path::Path;

/// Owns a loaded model and serves single predictions from loosely shaped input.
///
/// A value of this type only exists once the model has loaded; a failed
/// [`PredictorFacade::initialize`] yields an error and no facade. Share it
/// across request handlers by reference or `Arc`.
#[derive(Debug)]
pub struct PredictorFacade<M: Regressor = ModelArtifact> {
    contract: FeatureContract,
    model: M,
}

impl PredictorFacade<ModelArtifact> {
    /// 載入模型並使用預設的鋼材硬度特徵契約
    pub fn initialize<P: AsRef<Path>>(artifact_location: P) -> Result<Self> {
        Self::initialize_with_contract(artifact_location, FeatureContract::steel_hardness())
    }

    pub fn initialize_with_contract<P: AsRef<Path>>(
        artifact_location: P,
        contract: FeatureContract,
    ) -> Result<Self> {
        let model = ModelArtifact::load(artifact_location)?;
        Ok(Self::from_model(contract, model))
    }
}

impl<M: Regressor> PredictorFacade<M> {
    pub fn from_model(contract: FeatureContract, model: M) -> Self {
        Self { contract, model }
    }

    pub fn contract(&self) -> &FeatureContract {
        &self.contract
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    /// Checks that every contracted feature is present and builds a row in
    /// contract order. Keys the contract does not know are dropped.
    pub fn prepare(&self, parameters: &ParameterMapping) -> Result<FeatureRow> {
        let missing = self.contract.missing_from(parameters);
        if !missing.is_empty() {
            return Err(PredictorError::MissingFeatures(missing));
        }

        let columns = self.contract.required_fields().to_vec();
        let values = columns
            .iter()
            .filter_map(|name| parameters.get(name).cloned())
            .collect();
        Ok(FeatureRow::new(columns, values))
    }

    pub fn predict(&self, parameters: &ParameterMapping) -> Result<f64> {
        let row = self.prepare(parameters)?;

        let output = self
            .model
            .predict(std::slice::from_ref(&row))
            .map_err(PredictorError::PredictionFailed)?;

        let value = output
            .first()
            .copied()
            .ok_or(PredictorError::PredictionFailed(InferenceError::EmptyOutput))?;
        tracing::debug!(prediction = value, "Prediction served");
        Ok(value)
    }

    /// Each mapping is predicted on its own; one bad row does not affect the others.
    pub fn predict_batch(&self, batch: &[ParameterMapping]) -> Vec<Result<f64>> {
        batch.iter().map(|parameters| self.predict(parameters)).collect()
    }
}
