use crate::core::contract::{FeatureContract, FeatureSpec};
use crate::utils::error::{PredictorError, Result};
use crate::utils::validation::{
    validate_non_empty_string, validate_path, validate_range, validate_unique_names, Validate,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_MODEL_PATH: &str = "steel_hardness_predictor.json";
pub const DEFAULT_LABEL: &str = "Predicted Hardness (HRC)";
pub const DEFAULT_PRECISION: usize = 2;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictorConfig {
    pub model: ModelConfig,
    pub contract: Option<ContractConfig>,
    pub output: Option<OutputConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContractConfig {
    pub fields: Vec<ContractFieldConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContractFieldConfig {
    pub name: String,
    /// continuous | bounded | categorical
    pub kind: String,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub precision: Option<usize>,
    pub label: Option<String>,
}

impl Default for PredictorConfig {
    fn default() -> Self {
        Self {
            model: ModelConfig {
                path: DEFAULT_MODEL_PATH.to_string(),
            },
            contract: None,
            output: None,
        }
    }
}

impl ContractFieldConfig {
    fn to_spec(&self) -> Result<FeatureSpec> {
        let field = format!("contract.fields.{}", self.name);
        match self.kind.as_str() {
            "continuous" => Ok(FeatureSpec::continuous(&self.name)),
            "categorical" => Ok(FeatureSpec::categorical(&self.name)),
            "bounded" => match (self.min, self.max) {
                (Some(min), Some(max)) if min.is_finite() && max.is_finite() && min <= max => {
                    Ok(FeatureSpec::bounded(&self.name, min, max))
                }
                (Some(min), Some(max)) => Err(PredictorError::InvalidConfigValueError {
                    field,
                    value: format!("[{}, {}]", min, max),
                    reason: "min must be finite and not greater than max".to_string(),
                }),
                _ => Err(PredictorError::InvalidConfigValueError {
                    field,
                    value: self.kind.clone(),
                    reason: "bounded fields need both min and max".to_string(),
                }),
            },
            other => Err(PredictorError::InvalidConfigValueError {
                field,
                value: other.to_string(),
                reason: "Valid kinds: continuous, bounded, categorical".to_string(),
            }),
        }
    }
}

impl PredictorConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(PredictorError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| PredictorError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${MODEL_DIR})
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| PredictorError::ConfigError {
            message: format!("env substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        validate_path("model.path", &self.model.path)?;

        if let Some(contract) = &self.contract {
            validate_unique_names(
                "contract.fields",
                contract.fields.iter().map(|f| f.name.as_str()),
            )?;
            self.feature_contract()?;
        }

        if let Some(output) = &self.output {
            if let Some(precision) = output.precision {
                validate_range("output.precision", precision, 0, 10)?;
            }
            if let Some(label) = &output.label {
                validate_non_empty_string("output.label", label)?;
            }
        }

        Ok(())
    }

    pub fn model_path(&self) -> &str {
        &self.model.path
    }

    /// 未設定 [contract] 時使用預設鋼材契約
    pub fn feature_contract(&self) -> Result<FeatureContract> {
        match &self.contract {
            None => Ok(FeatureContract::steel_hardness()),
            Some(contract) => {
                let specs = contract
                    .fields
                    .iter()
                    .map(ContractFieldConfig::to_spec)
                    .collect::<Result<Vec<_>>>()?;
                FeatureContract::new(specs)
            }
        }
    }

    pub fn precision(&self) -> usize {
        self.output
            .as_ref()
            .and_then(|o| o.precision)
            .unwrap_or(DEFAULT_PRECISION)
    }

    pub fn label(&self) -> &str {
        self.output
            .as_ref()
            .and_then(|o| o.label.as_deref())
            .unwrap_or(DEFAULT_LABEL)
    }
}

impl Validate for PredictorConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::contract::FeatureKind;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_minimal_config_uses_defaults() {
        let config = PredictorConfig::from_toml_str(
            r#"
[model]
path = "models/steel.json"
"#,
        )
        .unwrap();

        assert_eq!(config.model_path(), "models/steel.json");
        assert_eq!(config.precision(), 2);
        assert_eq!(config.label(), "Predicted Hardness (HRC)");
        assert_eq!(config.feature_contract().unwrap().len(), 12);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_custom_contract() {
        let config = PredictorConfig::from_toml_str(
            r#"
[model]
path = "m.json"

[contract]
fields = [
    { name = "C_wt%", kind = "bounded", min = 0.0, max = 2.0 },
    { name = "Austenitize_Temp_C", kind = "continuous" },
    { name = "Quench_Medium", kind = "categorical" },
]

[output]
precision = 1
label = "HRC"
"#,
        )
        .unwrap();

        let contract = config.feature_contract().unwrap();
        assert_eq!(
            contract.required_fields(),
            ["C_wt%", "Austenitize_Temp_C", "Quench_Medium"]
        );
        assert_eq!(
            contract.get("C_wt%").map(|f| &f.kind),
            Some(&FeatureKind::Bounded { min: 0.0, max: 2.0 })
        );
        assert_eq!(config.precision(), 1);
        assert_eq!(config.label(), "HRC");
    }

    #[test]
    fn test_invalid_contract_fails_validation() {
        let unknown_kind = PredictorConfig::from_toml_str(
            r#"
[model]
path = "m.json"

[contract]
fields = [{ name = "C_wt%", kind = "ordinal" }]
"#,
        )
        .unwrap();
        assert!(unknown_kind.validate().is_err());

        let missing_bounds = PredictorConfig::from_toml_str(
            r#"
[model]
path = "m.json"

[contract]
fields = [{ name = "C_wt%", kind = "bounded", min = 0.0 }]
"#,
        )
        .unwrap();
        assert!(missing_bounds.validate().is_err());

        let duplicate = PredictorConfig::from_toml_str(
            r#"
[model]
path = "m.json"

[contract]
fields = [{ name = "C_wt%", kind = "continuous" }, { name = "C_wt%", kind = "continuous" }]
"#,
        )
        .unwrap();
        assert!(duplicate.validate().is_err());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("HARDNESS_TEST_MODEL_DIR", "/opt/models");

        let config = PredictorConfig::from_toml_str(
            r#"
[model]
path = "${HARDNESS_TEST_MODEL_DIR}/steel.json"
"#,
        )
        .unwrap();
        assert_eq!(config.model_path(), "/opt/models/steel.json");

        std::env::remove_var("HARDNESS_TEST_MODEL_DIR");
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[model]\npath = \"file-model.json\"\n")
            .unwrap();

        let config = PredictorConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.model_path(), "file-model.json");
    }

    #[test]
    fn test_malformed_toml_is_config_error() {
        let err = PredictorConfig::from_toml_str("[model\npath = 1").unwrap_err();
        assert!(matches!(err, PredictorError::ConfigError { .. }));
    }
}
