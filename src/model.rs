//! Emission model boundary.
//!
//! The driver treats the model as a black box mapping one [`Reading`] to a
//! scalar prediction. Two concrete model families can be loaded from a JSON
//! artifact:
//!
//! - **linear**: `intercept + Σ coefficient · feature`
//! - **oblivious_trees**: a gradient-boosted ensemble of symmetric trees,
//!   every level of a tree shares one `(feature, border)` split
//!
//! ```json
//! {
//!   "model_type": "oblivious_trees",
//!   "bias": 120.0,
//!   "trees": [
//!     { "splits": [{ "feature": "load", "border": 75.0 }], "leaf_values": [-4.0, 6.5] }
//!   ]
//! }
//! ```

use crate::error::ModelError;
use crate::reading::{Reading, FEATURE_COUNT, FEATURE_NAMES};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Deepest tree accepted from an artifact
pub const MAX_TREE_DEPTH: usize = 16;

/// Default artifact location, relative to the working directory
pub const DEFAULT_MODEL_PATH: &str = "models/ghg_emissions.json";

/// A regression model predicting an emission level from a reading
pub trait EmissionModel {
    /// Predict the emission level for one reading
    fn predict(&self, reading: &Reading) -> Result<f64, ModelError>;

    /// Short human-readable name for logs
    fn name(&self) -> &str {
        "emission-model"
    }
}

impl<M: EmissionModel + ?Sized> EmissionModel for &M {
    fn predict(&self, reading: &Reading) -> Result<f64, ModelError> {
        (**self).predict(reading)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

impl<M: EmissionModel + ?Sized> EmissionModel for Box<M> {
    fn predict(&self, reading: &Reading) -> Result<f64, ModelError> {
        (**self).predict(reading)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

fn finite(value: f64) -> Result<f64, ModelError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ModelError::NonFinitePrediction(value))
    }
}

fn resolve_feature(name: &str) -> Result<usize, ModelError> {
    Reading::feature_index(name).ok_or_else(|| ModelError::UnknownFeature(name.to_string()))
}

/// On-disk model description, tagged by `model_type`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "model_type", rename_all = "snake_case")]
pub enum ModelArtifact {
    Linear {
        intercept: f64,
        coefficients: BTreeMap<String, f64>,
    },
    ObliviousTrees {
        #[serde(default)]
        bias: f64,
        trees: Vec<TreeSpec>,
    },
}

/// One symmetric tree as stored in an artifact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeSpec {
    /// Level splits, shallowest first
    pub splits: Vec<SplitSpec>,
    /// `2^depth` leaf values
    pub leaf_values: Vec<f64>,
}

/// A single `feature > border` test
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitSpec {
    pub feature: String,
    pub border: f64,
}

impl ModelArtifact {
    /// Parse an artifact from JSON text
    pub fn from_json(json: &str) -> Result<Self, ModelError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Validate the artifact and build an evaluable model
    pub fn compile(self) -> Result<LoadedModel, ModelError> {
        match self {
            ModelArtifact::Linear {
                intercept,
                coefficients,
            } => Ok(LoadedModel::Linear(LinearModel::new(intercept, &coefficients)?)),
            ModelArtifact::ObliviousTrees { bias, trees } => {
                Ok(LoadedModel::Trees(TreeEnsemble::new(bias, &trees)?))
            }
        }
    }
}

/// Read, parse and validate a model artifact
pub fn load_model<P: AsRef<Path>>(path: P) -> Result<LoadedModel, ModelError> {
    let content = fs::read_to_string(path.as_ref())?;
    let model = ModelArtifact::from_json(&content)?.compile()?;
    tracing::info!(
        path = %path.as_ref().display(),
        model = model.name(),
        "Loaded emission model"
    );
    Ok(model)
}

/// Linear regression over the reading features
#[derive(Debug, Clone, PartialEq)]
pub struct LinearModel {
    intercept: f64,
    weights: [f64; FEATURE_COUNT],
}

impl LinearModel {
    /// Build from named coefficients; every feature must be present
    pub fn new(intercept: f64, coefficients: &BTreeMap<String, f64>) -> Result<Self, ModelError> {
        for name in coefficients.keys() {
            resolve_feature(name)?;
        }

        let mut weights = [0.0; FEATURE_COUNT];
        for (i, name) in FEATURE_NAMES.iter().enumerate() {
            weights[i] = *coefficients
                .get(*name)
                .ok_or_else(|| ModelError::MissingFeature(name.to_string()))?;
        }

        Ok(Self { intercept, weights })
    }

    /// Build from weights already in feature order
    pub fn from_weights(intercept: f64, weights: [f64; FEATURE_COUNT]) -> Self {
        Self { intercept, weights }
    }
}

impl EmissionModel for LinearModel {
    fn predict(&self, reading: &Reading) -> Result<f64, ModelError> {
        let features = reading.features();
        let dot: f64 = self
            .weights
            .iter()
            .zip(features.iter())
            .map(|(w, x)| w * x)
            .sum();
        finite(self.intercept + dot)
    }

    fn name(&self) -> &str {
        "linear"
    }
}

#[derive(Debug, Clone, PartialEq)]
struct ObliviousTree {
    /// `(feature index, border)` per level
    splits: Vec<(usize, f64)>,
    leaf_values: Vec<f64>,
}

impl ObliviousTree {
    fn leaf_index(&self, features: &[f64; FEATURE_COUNT]) -> usize {
        self.splits
            .iter()
            .enumerate()
            .fold(0, |index, (level, &(feature, border))| {
                if features[feature] > border {
                    index | (1 << level)
                } else {
                    index
                }
            })
    }
}

/// Ensemble of oblivious decision trees
#[derive(Debug, Clone, PartialEq)]
pub struct TreeEnsemble {
    bias: f64,
    trees: Vec<ObliviousTree>,
}

impl TreeEnsemble {
    /// Build and validate an ensemble from artifact trees
    pub fn new(bias: f64, specs: &[TreeSpec]) -> Result<Self, ModelError> {
        let mut trees = Vec::with_capacity(specs.len());

        for (index, spec) in specs.iter().enumerate() {
            let depth = spec.splits.len();
            if depth > MAX_TREE_DEPTH {
                return Err(ModelError::InvalidTree {
                    index,
                    reason: format!("depth {} exceeds maximum {}", depth, MAX_TREE_DEPTH),
                });
            }
            let expected = 1usize << depth;
            if spec.leaf_values.len() != expected {
                return Err(ModelError::InvalidTree {
                    index,
                    reason: format!(
                        "expected {} leaf values for depth {}, found {}",
                        expected,
                        depth,
                        spec.leaf_values.len()
                    ),
                });
            }

            let splits = spec
                .splits
                .iter()
                .map(|s| Ok((resolve_feature(&s.feature)?, s.border)))
                .collect::<Result<Vec<_>, ModelError>>()?;

            trees.push(ObliviousTree {
                splits,
                leaf_values: spec.leaf_values.clone(),
            });
        }

        Ok(Self { bias, trees })
    }

    /// Number of trees
    pub fn tree_count(&self) -> usize {
        self.trees.len()
    }
}

impl EmissionModel for TreeEnsemble {
    fn predict(&self, reading: &Reading) -> Result<f64, ModelError> {
        let features = reading.features();
        let sum: f64 = self
            .trees
            .iter()
            .map(|t| t.leaf_values[t.leaf_index(&features)])
            .sum();
        finite(self.bias + sum)
    }

    fn name(&self) -> &str {
        "oblivious_trees"
    }
}

/// Any model that can be loaded from an artifact
#[derive(Debug, Clone, PartialEq)]
pub enum LoadedModel {
    Linear(LinearModel),
    Trees(TreeEnsemble),
}

impl EmissionModel for LoadedModel {
    fn predict(&self, reading: &Reading) -> Result<f64, ModelError> {
        match self {
            LoadedModel::Linear(m) => m.predict(reading),
            LoadedModel::Trees(m) => m.predict(reading),
        }
    }

    fn name(&self) -> &str {
        match self {
            LoadedModel::Linear(m) => m.name(),
            LoadedModel::Trees(m) => m.name(),
        }
    }
}
