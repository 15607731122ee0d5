//! Demand scoring
//!
//! The ranking run only needs something that maps a feature row to a
//! predicted sales figure. [`Scorer`] is that capability; [`DemandScorer`] is
//! the learned feed-forward network (one ReLU hidden layer) and
//! [`LinearScorer`] a plain weighted sum.
//!
//! Network parameters are read from a JSON document keyed like a state dict:
//!
//! ```json
//! {
//!   "fc1.weight": [[...], ...],   // hidden_size rows of input_size values
//!   "fc1.bias":   [...],          // hidden_size values
//!   "fc2.weight": [[...]],        // one row of hidden_size values
//!   "fc2.bias":   [0.0]
//! }
//! ```

use std::fmt::Debug;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::util::{safe_create_file, safe_read_to_string};
use crate::error::{Error, Result};
use crate::models::FeatureMatrix;

/// Hidden layer width used when none is configured
pub const DEFAULT_HIDDEN_SIZE: usize = 64;

/// Maps feature rows to predicted sales
pub trait Scorer: Debug + Send + Sync {
    /// Number of features expected per row
    fn input_size(&self) -> usize;

    /// Score a single row of exactly [`Scorer::input_size`] values
    fn score_row(&self, row: &[f64]) -> f64;

    /// Score every row of a feature matrix
    ///
    /// # Errors
    /// Returns [`Error::ModelLoad`] if the matrix width differs from the
    /// scorer's input size
    fn score(&self, features: &FeatureMatrix) -> Result<Vec<f64>> {
        if features.num_columns() != self.input_size() {
            return Err(Error::ModelLoad(format!(
                "Scorer expects {} features but the feature matrix has {} ({})",
                self.input_size(),
                features.num_columns(),
                features.columns().join(", ")
            )));
        }
        Ok(features.rows().map(|row| self.score_row(row)).collect())
    }
}

/// Serialized network parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelParameters {
    /// Hidden layer weights, one row per hidden unit
    #[serde(rename = "fc1.weight")]
    pub hidden_weight: Vec<Vec<f64>>,
    /// Hidden layer bias
    #[serde(rename = "fc1.bias")]
    pub hidden_bias: Vec<f64>,
    /// Output layer weights, a single row
    #[serde(rename = "fc2.weight")]
    pub output_weight: Vec<Vec<f64>>,
    /// Output layer bias, a single value
    #[serde(rename = "fc2.bias")]
    pub output_bias: Vec<f64>,
}

impl ModelParameters {
    /// Read parameters from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let content = safe_read_to_string(path, "loading model parameters")
            .map_err(|e| Error::ModelLoad(e.to_string()))?;
        serde_json::from_str(&content).map_err(|e| {
            Error::ModelLoad(format!(
                "Malformed model parameters in {}: {e}",
                path.display()
            ))
        })
    }

    /// Write parameters as JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        let file = safe_create_file(path, "saving model parameters")?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }
}

/// One-hidden-layer regression network, inference only
#[derive(Debug, Clone, PartialEq)]
pub struct DemandScorer {
    input_size: usize,
    hidden_size: usize,
    /// Row-major `hidden_size x input_size`
    hidden_weight: Vec<f64>,
    hidden_bias: Vec<f64>,
    output_weight: Vec<f64>,
    output_bias: f64,
}

impl DemandScorer {
    /// Build a scorer from parameters, checking every shape
    ///
    /// # Errors
    /// Returns [`Error::ModelLoad`] if the parameters are inconsistent with
    /// each other or with `hidden_size`
    pub fn from_parameters(parameters: ModelParameters, hidden_size: usize) -> Result<Self> {
        let shape_error = |message: String| Err(Error::ModelLoad(message));

        if hidden_size == 0 {
            return shape_error("Hidden layer size must be positive".to_string());
        }
        if parameters.hidden_weight.len() != hidden_size {
            return shape_error(format!(
                "fc1.weight has {} rows, expected hidden size {hidden_size}",
                parameters.hidden_weight.len()
            ));
        }
        if parameters.hidden_bias.len() != hidden_size {
            return shape_error(format!(
                "fc1.bias has {} values, expected {hidden_size}",
                parameters.hidden_bias.len()
            ));
        }

        let input_size = parameters.hidden_weight[0].len();
        if input_size == 0 {
            return shape_error("fc1.weight rows are empty".to_string());
        }
        if let Some(row) = parameters
            .hidden_weight
            .iter()
            .position(|weights| weights.len() != input_size)
        {
            return shape_error(format!(
                "fc1.weight row {row} has {} values, expected {input_size}",
                parameters.hidden_weight[row].len()
            ));
        }

        let [output_weight] = <[Vec<f64>; 1]>::try_from(parameters.output_weight).map_err(|rows| {
            Error::ModelLoad(format!("fc2.weight has {} rows, expected 1", rows.len()))
        })?;
        if output_weight.len() != hidden_size {
            return shape_error(format!(
                "fc2.weight has {} values, expected {hidden_size}",
                output_weight.len()
            ));
        }
        let [output_bias] = <[f64; 1]>::try_from(parameters.output_bias.as_slice()).map_err(|_| {
            Error::ModelLoad(format!(
                "fc2.bias has {} values, expected 1",
                parameters.output_bias.len()
            ))
        })?;

        Ok(Self {
            input_size,
            hidden_size,
            hidden_weight: parameters.hidden_weight.concat(),
            hidden_bias: parameters.hidden_bias,
            output_weight,
            output_bias,
        })
    }

    /// Load a scorer from a parameter file
    pub fn load(path: &Path, hidden_size: usize) -> Result<Self> {
        let parameters = ModelParameters::load(path)?;
        let scorer = Self::from_parameters(parameters, hidden_size)?;
        log::info!(
            "Loaded demand scorer from {} ({} inputs, {} hidden units)",
            path.display(),
            scorer.input_size,
            scorer.hidden_size
        );
        Ok(scorer)
    }

    /// Width of the hidden layer
    #[must_use]
    pub const fn hidden_size(&self) -> usize {
        self.hidden_size
    }

    /// Parameters in their serialized layout
    #[must_use]
    pub fn parameters(&self) -> ModelParameters {
        ModelParameters {
            hidden_weight: self
                .hidden_weight
                .chunks(self.input_size)
                .map(<[f64]>::to_vec)
                .collect(),
            hidden_bias: self.hidden_bias.clone(),
            output_weight: vec![self.output_weight.clone()],
            output_bias: vec![self.output_bias],
        }
    }
}

impl Scorer for DemandScorer {
    fn input_size(&self) -> usize {
        self.input_size
    }

    fn score_row(&self, row: &[f64]) -> f64 {
        let hidden = self
            .hidden_weight
            .chunks_exact(self.input_size)
            .zip(&self.hidden_bias)
            .map(|(weights, bias)| relu(dot(weights, row) + bias));

        hidden
            .zip(&self.output_weight)
            .map(|(activation, weight)| activation * weight)
            .sum::<f64>()
            + self.output_bias
    }
}

/// Weighted sum of the features plus a bias
#[derive(Debug, Clone, PartialEq)]
pub struct LinearScorer {
    weights: Vec<f64>,
    bias: f64,
}

impl LinearScorer {
    /// Create a linear scorer
    #[must_use]
    pub const fn new(weights: Vec<f64>, bias: f64) -> Self {
        Self { weights, bias }
    }
}

impl Scorer for LinearScorer {
    fn input_size(&self) -> usize {
        self.weights.len()
    }

    fn score_row(&self, row: &[f64]) -> f64 {
        dot(&self.weights, row) + self.bias
    }
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

const fn relu(x: f64) -> f64 {
    if x > 0.0 { x } else { 0.0 }
}
