//! Mean, median and mode imputation.

use crate::dataset::{ColumnKind, Dataset};
use crate::error::{AnalysisError, Result};
use crate::factor::Factor;
use crate::stats;
use crate::utils::{fill_numeric_nulls, fill_string_nulls, observed};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Statistic used to fill a numeric column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CentralValue {
    Mean,
    Median,
}

impl std::fmt::Display for CentralValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CentralValue::Mean => f.write_str("mean"),
            CentralValue::Median => f.write_str("median"),
        }
    }
}

/// A dataset with one numeric column filled.
#[derive(Debug, Clone)]
pub struct Imputed {
    /// The new dataset.
    pub dataset: Dataset,
    /// Column that was filled.
    pub column: String,
    /// Statistic used.
    pub method: CentralValue,
    /// Value written into every missing cell.
    pub fill_value: f64,
    /// Number of cells filled.
    pub filled: usize,
}

impl Imputed {
    /// Human-readable description of the step.
    pub fn describe(&self) -> String {
        format!(
            "Filled {} missing value(s) in '{}' with {}: {:.4}",
            self.filled, self.column, self.method, self.fill_value
        )
    }
}

/// Statistical imputation methods for filling missing values.
pub struct StatisticalImputer;

impl StatisticalImputer {
    /// Fill the missing cells of a numeric column with its mean or median.
    ///
    /// # Errors
    ///
    /// `ColumnNotFound`, `NotNumeric`, or `NoValidValues` when every cell of
    /// the column is missing.
    pub fn impute_column(dataset: &Dataset, column: &str, method: CentralValue) -> Result<Imputed> {
        let values = dataset.numeric_values(column)?;
        let present = observed(&values);
        let fill_value = match method {
            CentralValue::Mean => stats::mean(&present),
            CentralValue::Median => stats::median(&present),
        }
        .ok_or_else(|| AnalysisError::NoValidValues(column.to_string()))?;

        let filled = values.iter().filter(|v| v.is_none()).count();
        let series = fill_numeric_nulls(dataset.series(column)?, fill_value)?;
        debug!("Filling {} cells of '{}' with {} {}", filled, column, method, fill_value);

        Ok(Imputed {
            dataset: dataset.with_column(series)?,
            column: column.to_string(),
            method,
            fill_value,
            filled,
        })
    }

    /// Shorthand for [`StatisticalImputer::impute_column`] with the mean.
    pub fn apply_numeric_mean(dataset: &Dataset, column: &str) -> Result<Imputed> {
        Self::impute_column(dataset, column, CentralValue::Mean)
    }

    /// Shorthand for [`StatisticalImputer::impute_column`] with the median.
    pub fn apply_numeric_median(dataset: &Dataset, column: &str) -> Result<Imputed> {
        Self::impute_column(dataset, column, CentralValue::Median)
    }

    /// Most frequent level of a categorical column. Ties go to the
    /// alphabetically first level.
    pub fn mode(dataset: &Dataset, column: &str) -> Result<String> {
        let factor = Factor::from_dataset(dataset, column)?;
        factor
            .frequencies()
            .into_iter()
            .filter(|c| c.count > 0)
            // levels are alphabetical, so the first maximum wins ties
            .fold(None, |best: Option<(String, usize)>, c| match best {
                Some((_, n)) if n >= c.count => best,
                _ => Some((c.level, c.count)),
            })
            .map(|(level, _)| level)
            .ok_or_else(|| AnalysisError::NoValidValues(column.to_string()))
    }

    /// Fill every numeric column with its median and every categorical
    /// column with its mode.
    ///
    /// Columns with no observed value are left as they are and reported in
    /// the returned steps.
    pub fn central_imputation(dataset: &Dataset) -> Result<(Dataset, Vec<String>)> {
        let mut current = dataset.clone();
        let mut steps = Vec::new();

        for column in dataset.column_names() {
            let missing = dataset.series(column)?.null_count();
            if missing == 0 {
                continue;
            }
            match dataset.kind(column) {
                Some(ColumnKind::Numeric) => {
                    match Self::impute_column(&current, column, CentralValue::Median) {
                        Ok(imputed) => {
                            steps.push(imputed.describe());
                            current = imputed.dataset;
                        }
                        Err(AnalysisError::NoValidValues(_)) => {
                            steps.push(format!("Left '{}' unfilled: no observed values", column));
                        }
                        Err(e) => return Err(e),
                    }
                }
                Some(ColumnKind::Categorical) => match Self::mode(&current, column) {
                    Ok(level) => {
                        let series = fill_string_nulls(current.series(column)?, &level)?;
                        current = current.with_column(series)?;
                        steps.push(format!(
                            "Filled {} missing value(s) in '{}' with mode: '{}'",
                            missing, column, level
                        ));
                    }
                    Err(AnalysisError::NoValidValues(_)) => {
                        steps.push(format!("Left '{}' unfilled: no observed values", column));
                    }
                    Err(e) => return Err(e),
                },
                _ => steps.push(format!("Left '{}' unfilled: unsupported column type", column)),
            }
        }

        Ok((current, steps))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;

    fn dataset() -> Dataset {
        Dataset::from_frame(
            df![
                "season" => [Some("winter"), Some("spring"), None, Some("winter"), Some("spring")],
                "mxPH" => [Some(8.0), None, Some(7.0), Some(9.0), None],
                "Chla" => [Some(1.0), Some(2.0), Some(30.0), None, Some(3.0)],
                "a1" => [0.0, 1.4, 3.3, 3.1, 9.2],
            ]
            .unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn test_mean_imputation() {
        let ds = dataset();
        let imputed = StatisticalImputer::apply_numeric_mean(&ds, "mxPH").unwrap();

        assert_eq!(imputed.fill_value, 8.0);
        assert_eq!(imputed.filled, 2);
        assert_eq!(
            imputed.dataset.numeric_values("mxPH").unwrap(),
            vec![Some(8.0), Some(8.0), Some(7.0), Some(9.0), Some(8.0)]
        );
        assert!(imputed.describe().contains("mean"));
    }

    #[test]
    fn test_median_imputation_resists_skew() {
        let ds = dataset();
        let imputed = StatisticalImputer::apply_numeric_median(&ds, "Chla").unwrap();
        // median of [1, 2, 3, 30]
        assert_eq!(imputed.fill_value, 2.5);
        assert_eq!(imputed.dataset.numeric_values("Chla").unwrap()[3], Some(2.5));
    }

    #[test]
    fn test_source_dataset_preserved() {
        let ds = dataset();
        let _ = StatisticalImputer::apply_numeric_mean(&ds, "mxPH").unwrap();
        assert_eq!(ds.series("mxPH").unwrap().null_count(), 2);
    }

    #[test]
    fn test_no_missing_values_is_a_no_op() {
        let ds = dataset();
        let imputed = StatisticalImputer::apply_numeric_mean(&ds, "a1").unwrap();
        assert_eq!(imputed.filled, 0);
        assert_eq!(
            imputed.dataset.numeric_values("a1").unwrap(),
            ds.numeric_values("a1").unwrap()
        );
    }

    #[test]
    fn test_errors() {
        let ds = dataset();
        assert!(matches!(
            StatisticalImputer::apply_numeric_mean(&ds, "season"),
            Err(AnalysisError::NotNumeric(_))
        ));
        assert!(matches!(
            StatisticalImputer::apply_numeric_mean(&ds, "NH4"),
            Err(AnalysisError::ColumnNotFound(_))
        ));

        let empty = Dataset::from_frame(df!["x" => [Option::<f64>::None, None]].unwrap()).unwrap();
        assert!(matches!(
            StatisticalImputer::apply_numeric_median(&empty, "x"),
            Err(AnalysisError::NoValidValues(_))
        ));
    }

    #[test]
    fn test_mode_tie_breaks_alphabetically() {
        let ds = dataset();
        // spring and winter both appear twice
        assert_eq!(StatisticalImputer::mode(&ds, "season").unwrap(), "spring");
    }

    #[test]
    fn test_central_imputation() {
        let ds = dataset();
        let (filled, steps) = StatisticalImputer::central_imputation(&ds).unwrap();

        assert_eq!(filled.missing_cells(), 0);
        assert_eq!(steps.len(), 3);
        assert_eq!(filled.numeric_values("mxPH").unwrap()[1], Some(8.0));
        assert_eq!(
            filled.categorical_values("season").unwrap()[2].as_deref(),
            Some("spring")
        );
        assert_eq!(ds.missing_cells(), 4);
    }
}
