//! Averaged ensembles of binary regression trees.
//!
//! Trees are stored as flat node arrays with the root at index 0. A split
//! sends a row left when `x[feature] <= threshold`; a missing (NaN) feature
//! fails the comparison and goes right.

use crate::base::Predictor;
use crate::errors::PredictError;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: f64,
    },
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegressionTree {
    nodes: Vec<TreeNode>,
}

impl RegressionTree {
    pub fn new(nodes: Vec<TreeNode>) -> Self {
        RegressionTree { nodes }
    }

    fn validate(&self, num_features: usize) -> Result<(), PredictError> {
        if self.nodes.is_empty() {
            return Err(PredictError::ModelDecodeError {
                msg: "tree has no nodes".to_string(),
            });
        }
        for (pos, node) in self.nodes.iter().enumerate() {
            if let TreeNode::Split {
                feature,
                left,
                right,
                ..
            } = node
            {
                if *feature >= num_features {
                    return Err(PredictError::ModelDecodeError {
                        msg: format!(
                            "node {} splits on feature {} of {}",
                            pos, feature, num_features
                        ),
                    });
                }
                // children after parents rules out cycles
                for child in [*left, *right] {
                    if child <= pos || child >= self.nodes.len() {
                        return Err(PredictError::ModelDecodeError {
                            msg: format!("node {} has invalid child {}", pos, child),
                        });
                    }
                }
            }
        }
        Ok(())
    }

    fn evaluate(&self, row: &[f64]) -> f64 {
        let mut pos = 0;
        loop {
            match &self.nodes[pos] {
                TreeNode::Leaf { value } => return *value,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    pos = if row[*feature] <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegressionForest {
    #[serde(default = "default_forest_name")]
    name: String,
    num_features: usize,
    trees: Vec<RegressionTree>,
}

fn default_forest_name() -> String {
    "forest".to_string()
}

impl RegressionForest {
    pub fn new(num_features: usize, trees: Vec<RegressionTree>) -> Result<Self, PredictError> {
        let forest = RegressionForest {
            name: default_forest_name(),
            num_features,
            trees,
        };
        forest.validate()?;
        Ok(forest)
    }

    pub(crate) fn validate(&self) -> Result<(), PredictError> {
        if self.trees.is_empty() {
            return Err(PredictError::ModelDecodeError {
                msg: "forest has no trees".to_string(),
            });
        }
        self.trees
            .iter()
            .try_for_each(|tree| tree.validate(self.num_features))
    }
}

impl Predictor for RegressionForest {
    fn name(&self) -> &str {
        &self.name
    }

    fn num_features(&self) -> usize {
        self.num_features
    }

    fn predict(&self, features: &[Vec<f64>]) -> Result<Vec<f64>, PredictError> {
        features
            .iter()
            .map(|row| {
                if row.len() != self.num_features {
                    return Err(PredictError::FeatureCountMismatch {
                        expected: self.num_features,
                        actual: row.len(),
                    });
                }
                let total: f64 = self.trees.iter().map(|tree| tree.evaluate(row)).sum();
                Ok(total / self.trees.len() as f64)
            })
            .collect()
    }
}
