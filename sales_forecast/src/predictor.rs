//! Prediction models consumed by the forecast runner

use crate::error::{ForecastError, Result};
use crate::features::{FeatureRow, FEATURE_COUNT, FEATURE_NAMES};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// A trained model mapping feature rows to raw sales quantities
///
/// Implementations must return exactly one value per input row, in input order.
/// The runner verifies this and treats any disagreement as a prediction mismatch.
pub trait Predictor: Send + Sync {
    /// Predict one raw value per row
    fn predict(&self, rows: &[FeatureRow]) -> Result<Vec<f64>>;

    /// Name of the model
    fn name(&self) -> &str {
        "predictor"
    }
}

impl<F> Predictor for F
where
    F: Fn(&[FeatureRow]) -> Result<Vec<f64>> + Send + Sync,
{
    fn predict(&self, rows: &[FeatureRow]) -> Result<Vec<f64>> {
        self(rows)
    }
}

/// A node of a regression tree (internal split or leaf)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeNode {
    /// Feature index to compare (internal nodes)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature: Option<usize>,
    /// Split threshold; rows with `x <= threshold` go left
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold: Option<f64>,
    /// Index of the left child
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left: Option<usize>,
    /// Index of the right child
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right: Option<usize>,
    /// Output value (leaves)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
}

impl TreeNode {
    /// Create a leaf node
    pub fn leaf(value: f64) -> Self {
        Self {
            feature: None,
            threshold: None,
            left: None,
            right: None,
            value: Some(value),
        }
    }

    /// Create an internal split node
    pub fn split(feature: usize, threshold: f64, left: usize, right: usize) -> Self {
        Self {
            feature: Some(feature),
            threshold: Some(threshold),
            left: Some(left),
            right: Some(right),
            value: None,
        }
    }
}

/// A single regression tree, root at index 0
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionTree {
    pub nodes: Vec<TreeNode>,
}

impl RegressionTree {
    /// Check that the tree can be walked from the root to a leaf for any input
    fn validate(&self, tree_idx: usize) -> Result<()> {
        if self.nodes.is_empty() {
            return Err(ForecastError::ModelError(format!(
                "Tree {} has no nodes",
                tree_idx
            )));
        }

        for (idx, node) in self.nodes.iter().enumerate() {
            if node.value.is_some() {
                continue;
            }

            let (feature, threshold, left, right) =
                match (node.feature, node.threshold, node.left, node.right) {
                    (Some(f), Some(t), Some(l), Some(r)) => (f, t, l, r),
                    _ => {
                        return Err(ForecastError::ModelError(format!(
                            "Tree {} node {} is neither a leaf nor a complete split",
                            tree_idx, idx
                        )))
                    }
                };

            if feature >= FEATURE_COUNT {
                return Err(ForecastError::ModelError(format!(
                    "Tree {} node {} uses feature {} but only {} features exist",
                    tree_idx, idx, feature, FEATURE_COUNT
                )));
            }
            if !threshold.is_finite() {
                return Err(ForecastError::ModelError(format!(
                    "Tree {} node {} has a non-finite threshold",
                    tree_idx, idx
                )));
            }
            // Children must point forward so that traversal always terminates.
            for child in [left, right] {
                if child <= idx || child >= self.nodes.len() {
                    return Err(ForecastError::ModelError(format!(
                        "Tree {} node {} has invalid child index {}",
                        tree_idx, idx, child
                    )));
                }
            }
        }

        Ok(())
    }

    /// Walk the tree for one feature vector
    fn evaluate(&self, features: &[f64; FEATURE_COUNT]) -> f64 {
        let mut idx = 0usize;
        loop {
            let node = &self.nodes[idx];
            if let Some(value) = node.value {
                return value;
            }
            // validate() guarantees a complete split here
            let feature = node.feature.unwrap_or_default();
            let threshold = node.threshold.unwrap_or_default();
            idx = if features[feature] <= threshold {
                node.left.unwrap_or_default()
            } else {
                node.right.unwrap_or_default()
            };
        }
    }
}

/// Random-forest style regressor: the prediction is the mean of all tree outputs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionForest {
    /// Feature names recorded at export time, checked against the builder's order
    #[serde(default)]
    pub feature_names: Option<Vec<String>>,
    /// Trees in the ensemble
    pub trees: Vec<RegressionTree>,
    #[serde(skip, default = "default_forest_name")]
    name: String,
}

fn default_forest_name() -> String {
    "Regression Forest".to_string()
}

impl RegressionForest {
    /// Build a forest from trees, validating their structure
    pub fn new(trees: Vec<RegressionTree>) -> Result<Self> {
        let forest = Self {
            feature_names: None,
            trees,
            name: default_forest_name(),
        };
        forest.validate()?;
        Ok(forest)
    }

    /// Load a forest exported as JSON
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            ForecastError::ModelError(format!(
                "Cannot open model artifact {}: {}",
                path.display(),
                e
            ))
        })?;
        let forest: Self = serde_json::from_reader(BufReader::new(file)).map_err(|e| {
            ForecastError::ModelError(format!(
                "Cannot parse model artifact {}: {}",
                path.display(),
                e
            ))
        })?;
        forest.validate()?;

        tracing::info!(
            path = %path.display(),
            trees = forest.trees.len(),
            "loaded regression forest"
        );
        Ok(forest)
    }

    /// Parse a forest from a JSON string
    pub fn from_json_str(json: &str) -> Result<Self> {
        let forest: Self = serde_json::from_str(json)
            .map_err(|e| ForecastError::ModelError(format!("Cannot parse model: {}", e)))?;
        forest.validate()?;
        Ok(forest)
    }

    /// Number of trees in the ensemble
    pub fn len(&self) -> usize {
        self.trees.len()
    }

    /// Whether the ensemble has no trees
    pub fn is_empty(&self) -> bool {
        self.trees.is_empty()
    }

    fn validate(&self) -> Result<()> {
        if self.trees.is_empty() {
            return Err(ForecastError::ModelError(
                "Model contains no trees".to_string(),
            ));
        }

        if let Some(names) = &self.feature_names {
            if names.iter().map(String::as_str).ne(FEATURE_NAMES.iter().copied()) {
                return Err(ForecastError::ModelError(format!(
                    "Model was trained on features {:?}, expected {:?}",
                    names, FEATURE_NAMES
                )));
            }
        }

        for (idx, tree) in self.trees.iter().enumerate() {
            tree.validate(idx)?;
        }
        Ok(())
    }
}

impl Predictor for RegressionForest {
    fn predict(&self, rows: &[FeatureRow]) -> Result<Vec<f64>> {
        let n_trees = self.trees.len() as f64;
        Ok(rows
            .iter()
            .map(|row| {
                let features = row.values();
                let sum: f64 = self.trees.iter().map(|t| t.evaluate(&features)).sum();
                sum / n_trees
            })
            .collect())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weekend_tree() -> RegressionTree {
        // dayofweek <= 4.5 ? 10 : 20
        RegressionTree {
            nodes: vec![
                TreeNode::split(2, 4.5, 1, 2),
                TreeNode::leaf(10.0),
                TreeNode::leaf(20.0),
            ],
        }
    }

    #[test]
    fn test_backward_child_rejected() {
        let tree = RegressionTree {
            nodes: vec![TreeNode::split(0, 1.0, 0, 1), TreeNode::leaf(1.0)],
        };
        assert!(matches!(
            RegressionForest::new(vec![tree]),
            Err(ForecastError::ModelError(_))
        ));
    }

    #[test]
    fn test_evaluate_walks_to_leaf() {
        let tree = weekend_tree();
        assert_eq!(tree.evaluate(&[1.0, 1.0, 0.0]), 10.0);
        assert_eq!(tree.evaluate(&[1.0, 1.0, 6.0]), 20.0);
    }
}
