//! Per-column descriptive statistics.

use crate::stats;
use crate::utils::observed;
use serde::{Deserialize, Serialize};

/// Descriptive statistics of a numeric column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericSummary {
    /// Observed (non-missing) cells.
    pub count: usize,
    /// Missing cells, counting NaN and infinite cells as missing.
    pub missing: usize,
    pub mean: Option<f64>,
    /// Sample standard deviation.
    pub std: Option<f64>,
    pub min: Option<f64>,
    /// First quartile.
    pub q1: Option<f64>,
    pub median: Option<f64>,
    /// Third quartile.
    pub q3: Option<f64>,
    pub max: Option<f64>,
}

impl NumericSummary {
    pub fn compute(values: &[Option<f64>]) -> Self {
        let present = stats::sorted(&observed(values));
        Self {
            count: present.len(),
            missing: values.len() - present.len(),
            mean: stats::mean(&present),
            std: stats::std_dev(&present),
            min: present.first().copied(),
            q1: stats::quantile_sorted(&present, 0.25),
            median: stats::quantile_sorted(&present, 0.5),
            q3: stats::quantile_sorted(&present, 0.75),
            max: present.last().copied(),
        }
    }

    /// Interquartile range.
    pub fn iqr(&self) -> Option<f64> {
        Some(self.q3? - self.q1?)
    }
}
