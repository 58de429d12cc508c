use crate::domain::model::{FeatureRow, FeatureValue};
use crate::domain::ports::Regressor;
use crate::utils::error::InferenceError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Node {
    /// `value <= threshold` goes left.
    NumericSplit {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    /// Membership in `levels` goes left.
    CategorySplit {
        feature: usize,
        levels: Vec<String>,
        left: usize,
        right: usize,
    },
    Leaf {
        value: f64,
    },
}

/// Flat node array; node 0 is the root and children always sit after their parent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tree {
    pub nodes: Vec<Node>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Aggregation {
    /// Random forest style.
    #[default]
    Mean,
    /// Gradient boosting style.
    Sum,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeEnsemble {
    pub feature_names: Vec<String>,
    #[serde(default)]
    pub aggregation: Aggregation,
    #[serde(default)]
    pub base_score: f64,
    /// Levels seen at fit time, per categorical feature name.
    #[serde(default)]
    pub categories: BTreeMap<String, Vec<String>>,
    pub trees: Vec<Tree>,
}

impl Tree {
    fn check(&self, n_features: usize) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("tree has no nodes".to_string());
        }

        let n_nodes = self.nodes.len();
        for (idx, node) in self.nodes.iter().enumerate() {
            let (feature, left, right) = match node {
                Node::Leaf { value } => {
                    if !value.is_finite() {
                        return Err(format!("leaf {} has a non-finite value", idx));
                    }
                    continue;
                }
                Node::NumericSplit {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    if !threshold.is_finite() {
                        return Err(format!("node {} has a non-finite threshold", idx));
                    }
                    (*feature, *left, *right)
                }
                Node::CategorySplit {
                    feature,
                    levels,
                    left,
                    right,
                } => {
                    if levels.is_empty() {
                        return Err(format!("node {} splits on an empty level set", idx));
                    }
                    (*feature, *left, *right)
                }
            };

            if feature >= n_features {
                return Err(format!(
                    "node {} splits on feature {} but the model has {} features",
                    idx, feature, n_features
                ));
            }
            for child in [left, right] {
                if child <= idx || child >= n_nodes {
                    return Err(format!("node {} has invalid child index {}", idx, child));
                }
            }
        }

        // children sit after their parent, so one forward pass marks everything reachable
        let mut reachable = vec![false; n_nodes];
        reachable[0] = true;
        for (idx, node) in self.nodes.iter().enumerate() {
            if !reachable[idx] {
                return Err(format!("node {} is unreachable from the root", idx));
            }
            match node {
                Node::NumericSplit { left, right, .. } | Node::CategorySplit { left, right, .. } => {
                    reachable[*left] = true;
                    reachable[*right] = true;
                }
                Node::Leaf { .. } => {}
            }
        }
        Ok(())
    }

    fn evaluate(&self, names: &[String], values: &[FeatureValue]) -> Result<f64, InferenceError> {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                Node::Leaf { value } => return Ok(*value),
                Node::NumericSplit {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    let x = values[*feature]
                        .as_f64()
                        .ok_or_else(|| InferenceError::ExpectedNumeric {
                            feature: names[*feature].clone(),
                        })?;
                    idx = if x <= *threshold { *left } else { *right };
                }
                Node::CategorySplit {
                    feature,
                    levels,
                    left,
                    right,
                } => {
                    let level = values[*feature]
                        .as_str()
                        .ok_or_else(|| InferenceError::ExpectedCategory {
                            feature: names[*feature].clone(),
                        })?;
                    idx = if levels.iter().any(|l| l == level) {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }
}

impl TreeEnsemble {
    pub(crate) fn check(&self) -> Result<(), String> {
        if self.feature_names.is_empty() {
            return Err("tree ensemble has no feature names".to_string());
        }
        if self.trees.is_empty() {
            return Err("tree ensemble has no trees".to_string());
        }
        if !self.base_score.is_finite() {
            return Err("base_score is not finite".to_string());
        }
        if let Some(unknown) = self
            .categories
            .keys()
            .find(|name| !self.feature_names.contains(*name))
        {
            return Err(format!("categories listed for unknown feature '{}'", unknown));
        }
        for (i, tree) in self.trees.iter().enumerate() {
            tree.check(self.feature_names.len())
                .map_err(|reason| format!("tree {}: {}", i, reason))?;
        }
        Ok(())
    }

    fn predict_row(&self, row: &FeatureRow) -> Result<f64, InferenceError> {
        if row.len() != self.feature_names.len() {
            return Err(InferenceError::ShapeMismatch {
                expected: self.feature_names.len(),
                actual: row.len(),
            });
        }
        if row.columns() != self.feature_names.as_slice() {
            return Err(InferenceError::FeatureNamesMismatch {
                expected: self.feature_names.clone(),
                actual: row.columns().to_vec(),
            });
        }

        for (name, known) in &self.categories {
            if let Some(FeatureValue::Text(level)) = row.get(name) {
                if !known.contains(level) {
                    return Err(InferenceError::UnseenCategory {
                        feature: name.clone(),
                        level: level.clone(),
                    });
                }
            }
        }

        let mut total = 0.0;
        for tree in &self.trees {
            total += tree.evaluate(&self.feature_names, row.values())?;
        }
        let raw = match self.aggregation {
            Aggregation::Mean => total / self.trees.len() as f64,
            Aggregation::Sum => total,
        };
        let value = self.base_score + raw;

        if !value.is_finite() {
            return Err(InferenceError::NonFiniteOutput { value });
        }
        Ok(value)
    }
}

impl Regressor for TreeEnsemble {
    fn predict(&self, rows: &[FeatureRow]) -> Result<Vec<f64>, InferenceError> {
        // ensembles built in code never went through artifact loading
        self.check().map_err(|reason| InferenceError::Other {
            message: format!("invalid tree ensemble: {}", reason),
        })?;
        rows.iter().map(|row| self.predict_row(row)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names() -> Vec<String> {
        vec!["Temper_Temp_C".to_string(), "Quench_Medium".to_string()]
    }

    fn ensemble(aggregation: Aggregation) -> TreeEnsemble {
        TreeEnsemble {
            feature_names: names(),
            aggregation,
            base_score: 0.0,
            categories: BTreeMap::from([(
                "Quench_Medium".to_string(),
                vec!["Water".to_string(), "Oil".to_string()],
            )]),
            trees: vec![
                Tree {
                    nodes: vec![
                        Node::NumericSplit {
                            feature: 0,
                            threshold: 400.0,
                            left: 1,
                            right: 2,
                        },
                        Node::Leaf { value: 55.0 },
                        Node::Leaf { value: 35.0 },
                    ],
                },
                Tree {
                    nodes: vec![
                        Node::CategorySplit {
                            feature: 1,
                            levels: vec!["Water".to_string()],
                            left: 1,
                            right: 2,
                        },
                        Node::Leaf { value: 50.0 },
                        Node::Leaf { value: 40.0 },
                    ],
                },
            ],
        }
    }

    fn row(temper: f64, quench: &str) -> FeatureRow {
        FeatureRow::new(names(), vec![temper.into(), quench.into()])
    }

    #[test]
    fn test_mean_and_sum_aggregation() {
        let mean = ensemble(Aggregation::Mean)
            .predict(&[row(200.0, "Water"), row(600.0, "Oil")])
            .unwrap();
        assert_eq!(mean, vec![52.5, 37.5]);

        let sum = ensemble(Aggregation::Sum)
            .predict(&[row(200.0, "Water")])
            .unwrap();
        assert_eq!(sum, vec![105.0]);
    }

    #[test]
    fn test_unseen_category_fails() {
        let err = ensemble(Aggregation::Mean)
            .predict(&[row(200.0, "Brine")])
            .unwrap_err();
        assert!(matches!(err, InferenceError::UnseenCategory { .. }));
    }

    #[test]
    fn test_numeric_split_on_text_fails() {
        let bad = FeatureRow::new(names(), vec!["hot".into(), "Water".into()]);
        assert_eq!(
            ensemble(Aggregation::Mean).predict(&[bad]),
            Err(InferenceError::ExpectedNumeric {
                feature: "Temper_Temp_C".to_string()
            })
        );
    }

    #[test]
    fn test_check_rejects_backward_children_and_bad_features() {
        assert!(ensemble(Aggregation::Mean).check().is_ok());

        let mut cyclic = ensemble(Aggregation::Mean);
        cyclic.trees[0].nodes[0] = Node::NumericSplit {
            feature: 0,
            threshold: 1.0,
            left: 0,
            right: 2,
        };
        assert!(cyclic.check().is_err());

        let mut out_of_range = ensemble(Aggregation::Mean);
        out_of_range.trees[1].nodes[0] = Node::CategorySplit {
            feature: 5,
            levels: vec!["Oil".to_string()],
            left: 1,
            right: 2,
        };
        assert!(out_of_range.check().unwrap_err().contains("feature 5"));

        let mut no_trees = ensemble(Aggregation::Mean);
        no_trees.trees.clear();
        assert!(no_trees.check().is_err());
    }

    #[test]
    fn test_check_rejects_unreachable_nodes_and_empty_levels() {
        let mut orphan = ensemble(Aggregation::Mean);
        orphan.trees[0].nodes = vec![
            Node::NumericSplit {
                feature: 0,
                threshold: 400.0,
                left: 1,
                right: 3,
            },
            Node::Leaf { value: 55.0 },
            Node::Leaf { value: 99.0 },
            Node::Leaf { value: 35.0 },
        ];
        assert!(orphan.check().unwrap_err().contains("node 2 is unreachable"));

        let mut empty_levels = ensemble(Aggregation::Mean);
        empty_levels.trees[1].nodes[0] = Node::CategorySplit {
            feature: 1,
            levels: vec![],
            left: 1,
            right: 2,
        };
        assert!(empty_levels.check().unwrap_err().contains("empty level set"));
    }

    #[test]
    fn test_unchecked_ensemble_fails_instead_of_panicking() {
        let bad: TreeEnsemble = serde_json::from_str(
            r#"{
                "feature_names": ["Temper_Temp_C"],
                "trees": [{"nodes": [
                    {"type": "numeric_split", "feature": 3, "threshold": 400.0, "left": 1, "right": 2},
                    {"type": "leaf", "value": 55.0},
                    {"type": "leaf", "value": 35.0}
                ]}]
            }"#,
        )
        .unwrap();
        let row = FeatureRow::new(vec!["Temper_Temp_C".to_string()], vec![200.0.into()]);

        match bad.predict(&[row]) {
            Err(InferenceError::Other { message }) => assert!(message.contains("feature 3")),
            other => panic!("expected InferenceError::Other, got {:?}", other),
        }
    }

    #[test]
    fn test_facade_wraps_unchecked_ensemble_failure() {
        use crate::core::contract::{FeatureContract, FeatureSpec};
        use crate::core::predictor::PredictorFacade;
        use crate::domain::model::ParameterMapping;
        use crate::utils::error::PredictorError;

        let mut bad = ensemble(Aggregation::Mean);
        bad.trees[0].nodes[0] = Node::NumericSplit {
            feature: 7,
            threshold: 400.0,
            left: 1,
            right: 2,
        };
        let contract = FeatureContract::new(vec![
            FeatureSpec::continuous("Temper_Temp_C"),
            FeatureSpec::categorical("Quench_Medium"),
        ])
        .unwrap();
        let facade = PredictorFacade::from_model(contract, bad);
        let parameters = ParameterMapping::from([
            ("Temper_Temp_C".to_string(), 200.0.into()),
            ("Quench_Medium".to_string(), "Water".into()),
        ]);

        assert!(matches!(
            facade.predict(&parameters),
            Err(PredictorError::PredictionFailed(InferenceError::Other { .. }))
        ));
    }
}
