use crate::domain::model::FeatureRow;
use crate::domain::ports::Regressor;
use crate::models::{LinearModel, TreeEnsemble};
use crate::utils::error::{InferenceError, PredictorError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const SUPPORTED_FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ModelSpec {
    Linear(LinearModel),
    TreeEnsemble(TreeEnsemble),
}

/// A fitted model as stored on disk (JSON).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub format_version: u32,
    /// What the model predicts, e.g. `hardness_hrc`.
    #[serde(default)]
    pub target: Option<String>,
    pub model: ModelSpec,
}

impl ModelArtifact {
    /// 從檔案載入模型；檔案不存在或無法讀取時回傳 ArtifactNotFound
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let shown = path.display().to_string();

        let bytes = std::fs::read(path).map_err(|source| PredictorError::ArtifactNotFound {
            path: shown.clone(),
            source,
        })?;

        let artifact = Self::from_json_slice(&bytes, &shown)?;
        tracing::debug!(path = %shown, target = ?artifact.target, "Model loaded");
        Ok(artifact)
    }

    /// Parses and structurally checks an artifact. `origin` only labels errors.
    pub fn from_json_str(content: &str, origin: &str) -> Result<Self> {
        Self::from_json_slice(content.as_bytes(), origin)
    }

    fn from_json_slice(bytes: &[u8], origin: &str) -> Result<Self> {
        let artifact: ModelArtifact =
            serde_json::from_slice(bytes).map_err(|e| PredictorError::ArtifactCorrupt {
                path: origin.to_string(),
                reason: e.to_string(),
            })?;

        artifact
            .check()
            .map_err(|reason| PredictorError::ArtifactCorrupt {
                path: origin.to_string(),
                reason,
            })?;
        Ok(artifact)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Column names the model was fitted on, in order.
    pub fn feature_names(&self) -> Vec<String> {
        match &self.model {
            ModelSpec::Linear(m) => m.feature_names(),
            ModelSpec::TreeEnsemble(m) => m.feature_names.clone(),
        }
    }

    fn check(&self) -> std::result::Result<(), String> {
        if self.format_version != SUPPORTED_FORMAT_VERSION {
            return Err(format!(
                "unsupported format_version {} (expected {})",
                self.format_version, SUPPORTED_FORMAT_VERSION
            ));
        }
        match &self.model {
            ModelSpec::Linear(m) => m.check(),
            ModelSpec::TreeEnsemble(m) => m.check(),
        }
    }
}

impl Regressor for ModelArtifact {
    fn predict(&self, rows: &[FeatureRow]) -> std::result::Result<Vec<f64>, InferenceError> {
        match &self.model {
            ModelSpec::Linear(m) => m.predict(rows),
            ModelSpec::TreeEnsemble(m) => m.predict(rows),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const LINEAR: &str = r#"{
        "format_version": 1,
        "target": "hardness_hrc",
        "model": {
            "type": "linear",
            "intercept": 20.0,
            "terms": [
                {"name": "C_wt%", "kind": "numeric", "coefficient": 30.0},
                {"name": "Quench_Medium", "kind": "categorical", "levels": {"Water": 5.0, "Oil": 2.0}}
            ]
        }
    }"#;

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(LINEAR.as_bytes()).unwrap();

        let artifact = ModelArtifact::load(file.path()).unwrap();
        assert_eq!(artifact.target.as_deref(), Some("hardness_hrc"));
        assert_eq!(artifact.feature_names(), vec!["C_wt%", "Quench_Medium"]);
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let err = ModelArtifact::load("definitely/not/here.json").unwrap_err();
        assert!(matches!(err, PredictorError::ArtifactNotFound { .. }));
    }

    #[test]
    fn test_garbage_is_corrupt() {
        let err = ModelArtifact::from_json_str("\u{80}pickle", "model.pkl").unwrap_err();
        assert!(matches!(err, PredictorError::ArtifactCorrupt { .. }));

        let err = ModelArtifact::from_json_str(r#"{"format_version": 1, "model": {"type": "svm"}}"#, "m.json")
            .unwrap_err();
        assert!(matches!(err, PredictorError::ArtifactCorrupt { .. }));
    }

    #[test]
    fn test_binary_file_is_corrupt_not_missing() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(&[0x80, 0x04, 0x95, 0xff, 0x00]).unwrap();

        let err = ModelArtifact::load(file.path()).unwrap_err();
        assert!(matches!(err, PredictorError::ArtifactCorrupt { .. }));
    }

    #[test]
    fn test_unsupported_version_is_corrupt() {
        let content = LINEAR.replace("\"format_version\": 1", "\"format_version\": 7");
        match ModelArtifact::from_json_str(&content, "m.json") {
            Err(PredictorError::ArtifactCorrupt { reason, .. }) => {
                assert!(reason.contains("format_version 7"))
            }
            other => panic!("expected ArtifactCorrupt, got {:?}", other),
        }
    }

    #[test]
    fn test_json_roundtrip_keeps_model() {
        let artifact = ModelArtifact::from_json_str(LINEAR, "m.json").unwrap();
        let again = ModelArtifact::from_json_str(&artifact.to_json_string().unwrap(), "m.json").unwrap();
        assert_eq!(artifact, again);
    }
}
