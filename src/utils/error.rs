use thiserror::Error;

/// 模型推論失敗的原因（由 `Regressor` 實作回報）
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InferenceError {
    #[error("Expected {expected} features per row, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    #[error("Feature names do not match those seen at fit time: expected {expected:?}, got {actual:?}")]
    FeatureNamesMismatch {
        expected: Vec<String>,
        actual: Vec<String>,
    },

    #[error("Feature '{feature}' must be numeric")]
    ExpectedNumeric { feature: String },

    #[error("Feature '{feature}' must be a category label")]
    ExpectedCategory { feature: String },

    #[error("Unseen category '{level}' for feature '{feature}'")]
    UnseenCategory { feature: String, level: String },

    #[error("Model produced a non-finite value: {value}")]
    NonFiniteOutput { value: f64 },

    #[error("Model returned no output for the input row")]
    EmptyOutput,

    #[error("{message}")]
    Other { message: String },
}

#[derive(Error, Debug)]
pub enum PredictorError {
    #[error("Model file not found at path: {path}")]
    ArtifactNotFound {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Model file at {path} could not be loaded: {reason}")]
    ArtifactCorrupt { path: String, reason: String },

    #[error("Missing features in input: {0:?}")]
    MissingFeatures(Vec<String>),

    #[error("Prediction failed: {0}")]
    PredictionFailed(#[source] InferenceError),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for {field}: '{value}' ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Invalid input: {message}")]
    InvalidInputError { message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Artifact,
    Input,
    Inference,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl PredictorError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            PredictorError::ArtifactNotFound { .. } | PredictorError::ArtifactCorrupt { .. } => {
                ErrorCategory::Artifact
            }
            PredictorError::MissingFeatures(_) | PredictorError::InvalidInputError { .. } => {
                ErrorCategory::Input
            }
            PredictorError::PredictionFailed(_) => ErrorCategory::Inference,
            PredictorError::ConfigError { .. } | PredictorError::InvalidConfigValueError { .. } => {
                ErrorCategory::Configuration
            }
            PredictorError::IoError(_)
            | PredictorError::SerializationError(_)
            | PredictorError::CsvError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Input => ErrorSeverity::Medium,
            ErrorCategory::Inference | ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::Artifact | ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    /// 呼叫端修正輸入後可重試
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            PredictorError::MissingFeatures(_)
                | PredictorError::PredictionFailed(_)
                | PredictorError::InvalidInputError { .. }
        )
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            PredictorError::ArtifactNotFound { path, .. } => format!(
                "Check that '{}' exists relative to the working directory, or pass --model",
                path
            ),
            PredictorError::ArtifactCorrupt { .. } => {
                "Re-export the model artifact; the file is not a valid model".to_string()
            }
            PredictorError::MissingFeatures(names) => {
                format!("Supply values for: {}", names.join(", "))
            }
            PredictorError::PredictionFailed(InferenceError::UnseenCategory { feature, .. }) => {
                format!("Use a category the model was trained on for '{}'", feature)
            }
            PredictorError::PredictionFailed(_) => {
                "Check the input values against the feature contract (--print-contract)".to_string()
            }
            PredictorError::ConfigError { .. } | PredictorError::InvalidConfigValueError { .. } => {
                "Fix the configuration file and try again".to_string()
            }
            PredictorError::InvalidInputError { .. } => {
                "Use NAME=VALUE pairs or a JSON object of feature values".to_string()
            }
            PredictorError::IoError(_) => "Check file paths and permissions".to_string(),
            PredictorError::SerializationError(_) => "Check the JSON syntax of the input".to_string(),
            PredictorError::CsvError(_) => {
                "Check that the CSV file has a header row naming the features".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            PredictorError::ArtifactNotFound { path, .. } => {
                format!("Model file not found: {}", path)
            }
            PredictorError::ArtifactCorrupt { path, .. } => {
                format!("Model file is damaged or in an unknown format: {}", path)
            }
            PredictorError::MissingFeatures(names) => {
                format!("Some parameters are missing: {}", names.join(", "))
            }
            PredictorError::PredictionFailed(cause) => {
                format!("The model could not make a prediction: {}", cause)
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PredictorError>;
