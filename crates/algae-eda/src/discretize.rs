//! Quantile discretization of numeric columns.
//!
//! [`quantile_bins`] cuts a numeric column at its sample quantiles. Intervals
//! are right-closed, `(a, b]`, except the lowest one which is `[a, b]` so the
//! minimum lands in a bin. The result is a derived view used for faceting
//! and grouping; nothing is written back to the dataset.

use crate::config::ConfigValidationError;
use crate::error::{AnalysisError, Result};
use crate::stats;
use crate::utils::observed;
use serde::{Deserialize, Serialize};

/// Bin assignment of a numeric column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Discretized {
    /// Interval boundaries, strictly increasing.
    pub breaks: Vec<f64>,
    /// One label per interval, e.g. `[1.2,3.4]` then `(3.4,5.6]`.
    pub labels: Vec<String>,
    /// Interval index of each input value; `None` for missing values.
    pub codes: Vec<Option<usize>>,
}

impl Discretized {
    /// Number of intervals.
    pub fn bin_count(&self) -> usize {
        self.labels.len()
    }

    /// Label of the interval holding `row`.
    pub fn label(&self, row: usize) -> Option<&str> {
        self.codes
            .get(row)
            .copied()
            .flatten()
            .map(|c| self.labels[c].as_str())
    }

    /// Number of values in each interval.
    pub fn counts(&self) -> Vec<usize> {
        let mut counts = vec![0; self.labels.len()];
        for code in self.codes.iter().flatten() {
            counts[*code] += 1;
        }
        counts
    }
}

/// Check a list of quantile probabilities: at least two, all in `[0, 1]`,
/// strictly increasing.
pub(crate) fn validate_probs(probs: &[f64]) -> std::result::Result<(), ConfigValidationError> {
    if probs.len() < 2 {
        return Err(ConfigValidationError::InvalidQuantileProbs(format!(
            "at least two cut points are required, got {}",
            probs.len()
        )));
    }
    if let Some(p) = probs.iter().find(|p| !(0.0..=1.0).contains(*p)) {
        return Err(ConfigValidationError::InvalidQuantileProbs(format!(
            "{} is outside [0, 1]",
            p
        )));
    }
    if probs.windows(2).any(|w| w[0] >= w[1]) {
        return Err(ConfigValidationError::InvalidQuantileProbs(
            "cut points must be strictly increasing".to_string(),
        ));
    }
    Ok(())
}

/// Cut `values` at their sample quantiles `probs`.
///
/// # Errors
///
/// `InvalidArgument` for bad probabilities or when two breaks coincide
/// (too many tied values for the requested resolution), `InsufficientData`
/// when no value is observed.
pub fn quantile_bins(values: &[Option<f64>], probs: &[f64]) -> Result<Discretized> {
    validate_probs(probs).map_err(|e| AnalysisError::invalid_argument(e.to_string()))?;

    let present = stats::sorted(&observed(values));
    if present.is_empty() {
        return Err(AnalysisError::InsufficientData(
            "no observed values to discretize".to_string(),
        ));
    }

    let breaks: Vec<f64> = probs
        .iter()
        .filter_map(|p| stats::quantile_sorted(&present, *p))
        .collect();
    if let Some(w) = breaks.windows(2).find(|w| w[0] >= w[1]) {
        return Err(AnalysisError::invalid_argument(format!(
            "quantile breaks are not unique ({} appears twice); use fewer probabilities",
            format_break(w[0])
        )));
    }

    let labels = (0..breaks.len() - 1)
        .map(|i| {
            let open = if i == 0 { '[' } else { '(' };
            format!(
                "{}{},{}]",
                open,
                format_break(breaks[i]),
                format_break(breaks[i + 1])
            )
        })
        .collect();

    let codes = values
        .iter()
        .map(|v| v.filter(|v| v.is_finite()).and_then(|v| bin_of(&breaks, v)))
        .collect();

    Ok(Discretized {
        breaks,
        labels,
        codes,
    })
}

/// Interval of `v`: `(b[i], b[i+1]]`, with the lowest interval closed.
pub(crate) fn bin_of(breaks: &[f64], v: f64) -> Option<usize> {
    let first = *breaks.first()?;
    let last = *breaks.last()?;
    if v < first || v > last {
        return None;
    }
    if v == first {
        return Some(0);
    }
    // the first break at or above v closes its interval
    breaks
        .iter()
        .position(|b| v <= *b)
        .map(|p| p.saturating_sub(1))
}

/// Format a break with three significant digits.
fn format_break(x: f64) -> String {
    if x == 0.0 || !x.is_finite() {
        return format!("{}", x);
    }
    let magnitude = x.abs().log10().floor() as i32;
    let decimals = (2 - magnitude).max(0) as usize;
    let rounded = if magnitude >= 2 {
        let factor = 10f64.powi(magnitude - 2);
        (x / factor).round() * factor
    } else {
        let scale = 10f64.powi(2 - magnitude);
        (x * scale).round() / scale
    };
    let text = format!("{:.*}", decimals, rounded);
    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        text
    }
}
