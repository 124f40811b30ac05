//! Evaluation configuration

use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Standard 11-point recall levels, 0.0 to 1.0 in steps of 0.1
pub const ELEVEN_POINT_RECALL_LEVELS: [f64; 11] =
    [0.0, 0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7, 0.8, 0.9, 1.0];

/// Which measures to snapshot per query and how to report them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluationConfig {
    /// F-measure weight (1.0 weighs precision and recall equally)
    pub beta: f64,
    /// Recall levels at which precision is sampled
    pub recall_levels: Vec<f64>,
    /// Cutoffs at which precision is sampled
    pub cutoffs: Vec<usize>,
    /// Decimal places of reported summaries
    pub report_precision: u32,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            beta: 1.0,
            recall_levels: ELEVEN_POINT_RECALL_LEVELS.to_vec(),
            cutoffs: vec![1, 5, 10],
            report_precision: 4,
        }
    }
}

impl EvaluationConfig {
    /// Set the F-measure weight
    #[must_use]
    pub fn with_beta(mut self, beta: f64) -> Self {
        self.beta = beta;
        self
    }

    /// Set the recall levels
    #[must_use]
    pub fn with_recall_levels(mut self, levels: impl Into<Vec<f64>>) -> Self {
        self.recall_levels = levels.into();
        self
    }

    /// Set the precision cutoffs
    #[must_use]
    pub fn with_cutoffs(mut self, cutoffs: impl Into<Vec<usize>>) -> Self {
        self.cutoffs = cutoffs.into();
        self
    }

    /// Set the decimal places of reported summaries
    #[must_use]
    pub fn with_report_precision(mut self, precision: u32) -> Self {
        self.report_precision = precision;
        self
    }

    /// Reject a negative or non-numeric beta and recall levels that are
    /// outside `[0, 1]` or repeated
    pub fn validate(&self) -> Result<()> {
        if self.beta.is_nan() || self.beta < 0.0 {
            return Err(Error::InvalidArgument(format!(
                "beta must be non-negative, is {}",
                self.beta
            )));
        }
        if let Some(level) = self
            .recall_levels
            .iter()
            .find(|level| !(0.0..=1.0).contains(*level))
        {
            return Err(Error::InvalidArgument(format!(
                "recall level must be within [0, 1], is {level}"
            )));
        }
        for (i, level) in self.recall_levels.iter().enumerate() {
            if self.recall_levels[..i].contains(level) {
                return Err(Error::InvalidArgument(format!(
                    "recall level {level} listed more than once"
                )));
            }
        }
        Ok(())
    }
}
