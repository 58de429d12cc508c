use crate::domain::model::{FeatureRow, FeatureValue};
use crate::domain::ports::Regressor;
use crate::utils::error::InferenceError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TermEncoding {
    Numeric { coefficient: f64 },
    /// One-hot encoded: each known level carries its own offset.
    Categorical { levels: BTreeMap<String, f64> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearTerm {
    pub name: String,
    #[serde(flatten)]
    pub encoding: TermEncoding,
}

/// `y = intercept + sum(term contributions)`, terms in fit-time column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    pub intercept: f64,
    pub terms: Vec<LinearTerm>,
}

impl LinearModel {
    pub fn feature_names(&self) -> Vec<String> {
        self.terms.iter().map(|t| t.name.clone()).collect()
    }

    pub(crate) fn check(&self) -> Result<(), String> {
        if self.terms.is_empty() {
            return Err("linear model has no terms".to_string());
        }
        if !self.intercept.is_finite() {
            return Err("linear model intercept is not finite".to_string());
        }

        let mut seen = HashSet::new();
        for term in &self.terms {
            if !seen.insert(term.name.as_str()) {
                return Err(format!("duplicate term '{}'", term.name));
            }
            match &term.encoding {
                TermEncoding::Numeric { coefficient } if !coefficient.is_finite() => {
                    return Err(format!("coefficient for '{}' is not finite", term.name));
                }
                TermEncoding::Categorical { levels } if levels.is_empty() => {
                    return Err(format!("categorical term '{}' has no levels", term.name));
                }
                TermEncoding::Categorical { levels } if levels.values().any(|v| !v.is_finite()) => {
                    return Err(format!("categorical term '{}' has a non-finite level", term.name));
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn predict_row(&self, row: &FeatureRow) -> Result<f64, InferenceError> {
        if row.len() != self.terms.len() {
            return Err(InferenceError::ShapeMismatch {
                expected: self.terms.len(),
                actual: row.len(),
            });
        }
        if self
            .terms
            .iter()
            .zip(row.columns())
            .any(|(term, column)| &term.name != column)
        {
            return Err(InferenceError::FeatureNamesMismatch {
                expected: self.feature_names(),
                actual: row.columns().to_vec(),
            });
        }

        let mut total = self.intercept;
        for (term, value) in self.terms.iter().zip(row.values()) {
            total += match (&term.encoding, value) {
                (TermEncoding::Numeric { coefficient }, FeatureValue::Number(x)) => coefficient * x,
                (TermEncoding::Numeric { .. }, FeatureValue::Text(_)) => {
                    return Err(InferenceError::ExpectedNumeric {
                        feature: term.name.clone(),
                    })
                }
                (TermEncoding::Categorical { levels }, FeatureValue::Text(level)) => {
                    *levels
                        .get(level)
                        .ok_or_else(|| InferenceError::UnseenCategory {
                            feature: term.name.clone(),
                            level: level.clone(),
                        })?
                }
                (TermEncoding::Categorical { .. }, FeatureValue::Number(_)) => {
                    return Err(InferenceError::ExpectedCategory {
                        feature: term.name.clone(),
                    })
                }
            };
        }

        if !total.is_finite() {
            return Err(InferenceError::NonFiniteOutput { value: total });
        }
        Ok(total)
    }
}

impl Regressor for LinearModel {
    fn predict(&self, rows: &[FeatureRow]) -> Result<Vec<f64>, InferenceError> {
        rows.iter().map(|row| self.predict_row(row)).collect()
    }
}
