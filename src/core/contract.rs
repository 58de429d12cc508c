use crate::domain::model::{FeatureValue, ParameterMapping};
use crate::utils::error::{PredictorError, Result};
use crate::utils::validation::validate_unique_names;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FeatureKind {
    Continuous,
    Bounded { min: f64, max: f64 },
    Categorical,
}

impl fmt::Display for FeatureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureKind::Continuous => write!(f, "continuous"),
            FeatureKind::Bounded { min, max } => write!(f, "bounded [{}, {}]", min, max),
            FeatureKind::Categorical => write!(f, "categorical"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureSpec {
    pub name: String,
    #[serde(flatten)]
    pub kind: FeatureKind,
}

impl FeatureSpec {
    pub fn continuous(name: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: FeatureKind::Continuous,
        }
    }

    pub fn bounded(name: &str, min: f64, max: f64) -> Self {
        Self {
            name: name.to_string(),
            kind: FeatureKind::Bounded { min, max },
        }
    }

    pub fn categorical(name: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: FeatureKind::Categorical,
        }
    }
}

/// A bounded field whose supplied value lies outside its declared range.
#[derive(Debug, Clone, PartialEq)]
pub struct RangeViolation {
    pub field: String,
    pub value: f64,
    pub min: f64,
    pub max: f64,
}

impl fmt::Display for RangeViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} = {} is outside [{}, {}]",
            self.field, self.value, self.min, self.max
        )
    }
}

/// The fixed, ordered list of features a model expects.
///
/// Order is set at construction and never changes; rows handed to a model
/// are built in exactly this order.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureContract {
    fields: Vec<FeatureSpec>,
    names: Vec<String>,
}

impl FeatureContract {
    pub fn new(fields: Vec<FeatureSpec>) -> Result<Self> {
        if fields.is_empty() {
            return Err(PredictorError::ConfigError {
                message: "Feature contract must list at least one field".to_string(),
            });
        }
        validate_unique_names("contract.fields", fields.iter().map(|f| f.name.as_str()))?;

        let names = fields.iter().map(|f| f.name.clone()).collect();
        Ok(Self { fields, names })
    }

    /// 鋼材硬度模型的 12 個輸入特徵
    pub fn steel_hardness() -> Self {
        let fields = vec![
            FeatureSpec::bounded("C_wt%", 0.0, 100.0),
            FeatureSpec::bounded("Mn_wt%", 0.0, 100.0),
            FeatureSpec::bounded("Si_wt%", 0.0, 100.0),
            FeatureSpec::bounded("Cr_wt%", 0.0, 100.0),
            FeatureSpec::bounded("Ni_wt%", 0.0, 100.0),
            FeatureSpec::bounded("Mo_wt%", 0.0, 100.0),
            FeatureSpec::continuous("Austenitize_Temp_C"),
            FeatureSpec::continuous("Hold_Time_min"),
            FeatureSpec::categorical("Quench_Medium"),
            FeatureSpec::continuous("Temper_Temp_C"),
            FeatureSpec::continuous("Temper_Time_min"),
            FeatureSpec::continuous("Cooling_Rate_Proxy"),
        ];
        let names = fields.iter().map(|f| f.name.clone()).collect();
        Self { fields, names }
    }

    pub fn required_fields(&self) -> &[String] {
        &self.names
    }

    pub fn fields(&self) -> &[FeatureSpec] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&FeatureSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Required names absent from `mapping`, in contract order.
    pub fn missing_from(&self, mapping: &ParameterMapping) -> Vec<String> {
        self.names
            .iter()
            .filter(|name| !mapping.contains_key(name.as_str()))
            .cloned()
            .collect()
    }

    pub fn out_of_range(&self, mapping: &ParameterMapping) -> Vec<RangeViolation> {
        self.fields
            .iter()
            .filter_map(|spec| match (&spec.kind, mapping.get(&spec.name)) {
                (FeatureKind::Bounded { min, max }, Some(FeatureValue::Number(value)))
                    if value < min || value > max =>
                {
                    Some(RangeViolation {
                        field: spec.name.clone(),
                        value: *value,
                        min: *min,
                        max: *max,
                    })
                }
                _ => None,
            })
            .collect()
    }
}

impl Default for FeatureContract {
    fn default() -> Self {
        Self::steel_hardness()
    }
}
