//! Pairwise Pearson correlations over complete observations.

use crate::dataset::Dataset;
use crate::error::{AnalysisError, Result};
use crate::stats;
use serde::{Deserialize, Serialize};

/// Symmetric correlation matrix of numeric columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationMatrix {
    /// Column names, in row/column order of `values`.
    pub columns: Vec<String>,
    /// `values[i][j]` is the correlation of `columns[i]` and `columns[j]`;
    /// `None` where a column is constant over the complete rows.
    pub values: Vec<Vec<Option<f64>>>,
    /// Rows used (no missing cell among `columns`).
    pub observations: usize,
}

impl CorrelationMatrix {
    /// Correlations of the given numeric columns.
    ///
    /// Only rows without any missing cell among `columns` are used.
    pub fn compute(dataset: &Dataset, columns: &[&str]) -> Result<Self> {
        if columns.len() < 2 {
            return Err(AnalysisError::invalid_argument(
                "a correlation matrix needs at least two columns",
            ));
        }
        let cells: Vec<Vec<Option<f64>>> = columns
            .iter()
            .map(|c| dataset.numeric_values(c))
            .collect::<Result<_>>()?;

        let complete: Vec<usize> = (0..dataset.height())
            .filter(|row| cells.iter().all(|col| col[*row].is_some_and(f64::is_finite)))
            .collect();
        if complete.len() < 2 {
            return Err(AnalysisError::InsufficientData(format!(
                "{} complete row(s) across {:?}; at least 2 are required",
                complete.len(),
                columns
            )));
        }

        let series: Vec<Vec<f64>> = cells
            .iter()
            .map(|col| complete.iter().filter_map(|row| col[*row]).collect())
            .collect();

        let n = columns.len();
        let mut values = vec![vec![None; n]; n];
        for i in 0..n {
            for j in i..n {
                let r = if i == j {
                    stats::std_dev(&series[i]).filter(|s| *s > 0.0).map(|_| 1.0)
                } else {
                    stats::pearson(&series[i], &series[j])
                };
                values[i][j] = r;
                values[j][i] = r;
            }
        }

        Ok(Self {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            values,
            observations: complete.len(),
        })
    }

    /// Correlation between two named columns.
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.columns.iter().position(|c| c == a)?;
        let j = self.columns.iter().position(|c| c == b)?;
        self.values[i][j]
    }

    /// Column pairs whose absolute correlation is at least `threshold`,
    /// strongest first.
    pub fn strong_pairs(&self, threshold: f64) -> Vec<(String, String, f64)> {
        let mut pairs = Vec::new();
        for i in 0..self.columns.len() {
            for j in (i + 1)..self.columns.len() {
                if let Some(r) = self.values[i][j]
                    && r.abs() >= threshold
                {
                    pairs.push((self.columns[i].clone(), self.columns[j].clone(), r));
                }
            }
        }
        pairs.sort_by(|a, b| b.2.abs().total_cmp(&a.2.abs()));
        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;

    fn dataset() -> Dataset {
        Dataset::from_frame(
            df![
                "oPO4" => [Some(1.0), Some(2.0), Some(3.0), Some(4.0), None],
                "PO4" => [Some(2.0), Some(4.0), Some(6.0), Some(8.0), Some(100.0)],
                "NO3" => [Some(4.0), Some(3.0), Some(2.0), Some(1.0), Some(0.0)],
                "flat" => [Some(1.0), Some(1.0), Some(1.0), Some(1.0), Some(1.0)],
            ]
            .unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn test_complete_observations_only() {
        let m = CorrelationMatrix::compute(&dataset(), &["oPO4", "PO4", "NO3"]).unwrap();
        assert_eq!(m.observations, 4);
        assert!((m.get("oPO4", "PO4").unwrap() - 1.0).abs() < 1e-12);
        assert!((m.get("PO4", "NO3").unwrap() + 1.0).abs() < 1e-12);
        assert_eq!(m.get("NO3", "NO3"), Some(1.0));
    }

    #[test]
    fn test_constant_column_has_no_correlation() {
        let m = CorrelationMatrix::compute(&dataset(), &["PO4", "flat"]).unwrap();
        assert_eq!(m.get("PO4", "flat"), None);
        assert_eq!(m.get("flat", "flat"), None);
    }

    #[test]
    fn test_strong_pairs() {
        let m = CorrelationMatrix::compute(&dataset(), &["oPO4", "PO4", "NO3"]).unwrap();
        let pairs = m.strong_pairs(0.9);
        assert_eq!(pairs.len(), 3);
        assert!(pairs.iter().all(|(_, _, r)| r.abs() >= 0.9));
    }

    #[test]
    fn test_insufficient_rows() {
        let ds = Dataset::from_frame(
            df![
                "x" => [Some(1.0), None],
                "y" => [Some(1.0), Some(2.0)],
            ]
            .unwrap(),
        )
        .unwrap();
        let err = CorrelationMatrix::compute(&ds, &["x", "y"]).unwrap_err();
        assert_eq!(err.error_code(), "INSUFFICIENT_DATA");
    }

    #[test]
    fn test_requires_two_columns() {
        assert!(
            CorrelationMatrix::compute(&dataset(), &["PO4"])
                .unwrap_err()
                .is_invalid_argument()
        );
    }
}
