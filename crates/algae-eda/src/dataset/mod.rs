//! The dataset value type.
//!
//! [`Dataset`] wraps a polars [`DataFrame`] and never exposes mutable
//! access to it. Every transformation (imputation, row filtering) returns a
//! new `Dataset`, so the original table is always preserved. Cloning is cheap:
//! polars columns are reference counted.

mod loader;
pub mod schema;

pub use loader::{AlgaeBundle, EVAL_PREDICTORS_FILE, EVAL_TARGETS_FILE, MISSING_MARKERS, TRAINING_FILE};
pub use schema::{AlgaeTable, Category, FlowSpeed, RiverSize, Season};

use crate::error::{AnalysisError, Result};
use crate::utils::{DtypeCategory, get_dtype_category, series_to_f64, series_to_strings};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::{debug, warn};

/// How a column is treated by the analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    /// Finite set of text labels.
    Categorical,
    /// Real-valued, possibly missing.
    Numeric,
    /// Anything else (booleans, dates); carried along untouched.
    Other,
}

/// An immutable table of water samples.
#[derive(Debug, Clone)]
pub struct Dataset {
    frame: DataFrame,
    kinds: Vec<(String, ColumnKind)>,
}

static_assertions::assert_impl_all!(Dataset: Send, Sync);

impl Dataset {
    /// Wrap an arbitrary frame.
    ///
    /// Numeric columns are normalized to `Float64`; string and categorical
    /// columns become [`ColumnKind::Categorical`] with `String` dtype. A
    /// string column with no observed cell is numeric unless it is one of
    /// the algae categorical columns.
    pub fn from_frame(frame: DataFrame) -> Result<Self> {
        let mut frame = frame;
        let mut kinds = Vec::with_capacity(frame.width());
        let names: Vec<String> = frame
            .get_column_names()
            .into_iter()
            .map(|s| s.to_string())
            .collect();

        for name in names {
            let series = frame.column(&name)?.as_materialized_series().clone();
            let kind = match get_dtype_category(series.dtype()) {
                DtypeCategory::Numeric => {
                    if series.dtype() != &DataType::Float64 {
                        frame.replace(&name, series.cast(&DataType::Float64)?)?;
                    }
                    ColumnKind::Numeric
                }
                // an all-missing CSV column parses as String
                DtypeCategory::String
                    if series.dtype() == &DataType::String
                        && !schema::CATEGORICAL_COLUMNS.contains(&name.as_str())
                        && !series.is_empty()
                        && series.null_count() == series.len() =>
                {
                    frame.replace(&name, series.cast(&DataType::Float64)?)?;
                    ColumnKind::Numeric
                }
                DtypeCategory::String => {
                    if series.dtype() != &DataType::String {
                        frame.replace(&name, series.cast(&DataType::String)?)?;
                    }
                    ColumnKind::Categorical
                }
                DtypeCategory::Other => ColumnKind::Other,
            };
            kinds.push((name, kind));
        }

        Ok(Self { frame, kinds })
    }

    /// Wrap a frame holding one of the algae tables.
    ///
    /// Checks that the expected columns are present, canonicalizes the
    /// categorical labels (`"Winter"` becomes `"winter"`), rejects labels
    /// outside the level sets and coerces the measurement columns to numbers.
    pub fn algae(frame: DataFrame, table: AlgaeTable) -> Result<Self> {
        let mut frame = frame;
        let present: Vec<String> = frame
            .get_column_names()
            .into_iter()
            .map(|s| s.to_string())
            .collect();

        for expected in table.expected_columns() {
            if !present.iter().any(|c| c == expected) {
                return Err(AnalysisError::ColumnNotFound(expected.to_string()));
            }
        }

        for column in table.expected_columns() {
            let series = frame.column(column)?.as_materialized_series().clone();
            if schema::CATEGORICAL_COLUMNS.contains(&column) {
                let canonical = canonical_levels(column, &series_to_strings(&series)?)?;
                frame.replace(column, Series::new(column.into(), canonical))?;
            } else if series.dtype() != &DataType::Float64 {
                let before = series.null_count();
                let cast = series.cast(&DataType::Float64)?;
                if cast.null_count() > before {
                    warn!(
                        "Column '{}': {} unparseable cells treated as missing",
                        column,
                        cast.null_count() - before
                    );
                }
                frame.replace(column, cast)?;
            }
        }

        debug!("Validated {:?} table with shape {:?}", table, frame.shape());
        Self::from_frame(frame)
    }

    /// The underlying frame (read-only).
    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    /// Unwrap into the underlying frame.
    pub fn into_frame(self) -> DataFrame {
        self.frame
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.frame.height()
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.frame.width()
    }

    /// `(rows, columns)`.
    pub fn shape(&self) -> (usize, usize) {
        self.frame.shape()
    }

    /// Column names in table order.
    pub fn column_names(&self) -> Vec<&str> {
        self.kinds.iter().map(|(n, _)| n.as_str()).collect()
    }

    /// Kind of a column, `None` if absent.
    pub fn kind(&self, column: &str) -> Option<ColumnKind> {
        self.kinds
            .iter()
            .find(|(n, _)| n == column)
            .map(|(_, k)| *k)
    }

    /// Names of the numeric columns, in table order.
    pub fn numeric_columns(&self) -> Vec<&str> {
        self.columns_of_kind(ColumnKind::Numeric)
    }

    /// Names of the categorical columns, in table order.
    pub fn categorical_columns(&self) -> Vec<&str> {
        self.columns_of_kind(ColumnKind::Categorical)
    }

    fn columns_of_kind(&self, kind: ColumnKind) -> Vec<&str> {
        self.kinds
            .iter()
            .filter(|(_, k)| *k == kind)
            .map(|(n, _)| n.as_str())
            .collect()
    }

    /// Borrow a column as a series.
    pub fn series(&self, column: &str) -> Result<&Series> {
        self.frame
            .column(column)
            .map(|c| c.as_materialized_series())
            .map_err(|_| AnalysisError::ColumnNotFound(column.to_string()))
    }

    /// Cells of a numeric column.
    pub fn numeric_values(&self, column: &str) -> Result<Vec<Option<f64>>> {
        match self.kind(column) {
            None => Err(AnalysisError::ColumnNotFound(column.to_string())),
            Some(ColumnKind::Numeric) => Ok(series_to_f64(self.series(column)?)?),
            Some(_) => Err(AnalysisError::NotNumeric(column.to_string())),
        }
    }

    /// Cells of a categorical column.
    pub fn categorical_values(&self, column: &str) -> Result<Vec<Option<String>>> {
        match self.kind(column) {
            None => Err(AnalysisError::ColumnNotFound(column.to_string())),
            Some(ColumnKind::Categorical) => Ok(series_to_strings(self.series(column)?)?),
            Some(_) => Err(AnalysisError::NotCategorical(column.to_string())),
        }
    }

    /// Total number of missing cells.
    pub fn missing_cells(&self) -> usize {
        self.frame.get_columns().iter().map(|c| c.null_count()).sum()
    }

    /// A new dataset with one column replaced. The column keeps its kind.
    pub(crate) fn with_column(&self, series: Series) -> Result<Self> {
        let name = series.name().to_string();
        if self.kind(&name).is_none() {
            return Err(AnalysisError::ColumnNotFound(name));
        }
        let mut frame = self.frame.clone();
        frame.replace(&name, series)?;
        Ok(Self {
            frame,
            kinds: self.kinds.clone(),
        })
    }

    /// A new dataset holding the rows where `keep` is true, in order.
    pub fn select_rows(&self, keep: &[bool]) -> Result<Self> {
        if keep.len() != self.height() {
            return Err(AnalysisError::invalid_argument(format!(
                "row mask has {} entries for {} rows",
                keep.len(),
                self.height()
            )));
        }
        let mask = BooleanChunked::from_slice("mask".into(), keep);
        Ok(Self {
            frame: self.frame.filter(&mask)?,
            kinds: self.kinds.clone(),
        })
    }
}

fn canonical_levels(column: &str, values: &[Option<String>]) -> Result<Vec<Option<&'static str>>> {
    values
        .iter()
        .map(|cell| match cell {
            None => Ok(None),
            Some(v) => canonical_label(column, v).map(Some),
        })
        .collect()
}

fn canonical_label(column: &str, value: &str) -> Result<&'static str> {
    match column {
        c if c == Season::COLUMN => Season::from_str(value).map(Category::as_str),
        c if c == RiverSize::COLUMN => RiverSize::from_str(value).map(Category::as_str),
        c if c == FlowSpeed::COLUMN => FlowSpeed::from_str(value).map(Category::as_str),
        other => Err(AnalysisError::NotCategorical(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn training_frame() -> DataFrame {
        df![
            "season" => ["Winter", "spring", "autumn"],
            "size" => ["small", "small", "large"],
            "speed" => ["medium", "high", "low"],
            "mxPH" => [Some(8.0), Some(8.35), None],
            "mnO2" => [Some(9.8), Some(8.0), Some(11.4)],
            "Cl" => [Some(60.8), Some(57.75), None],
            "NO3" => [6.238, 1.288, 5.33],
            "NH4" => [578.0, 370.0, 346.667],
            "oPO4" => [105.0, 428.75, 125.667],
            "PO4" => [170.0, 558.75, 187.057],
            "Chla" => [Some(50.0), Some(1.3), None],
            "a1" => [0.0, 1.4, 3.3],
            "a2" => [0.0, 7.6, 53.6],
            "a3" => [0.0, 4.8, 1.9],
            "a4" => [0i64, 2, 0],
            "a5" => [34.2, 6.7, 0.0],
            "a6" => [8.3, 0.0, 0.0],
            "a7" => [0.0, 2.1, 9.7],
        ]
        .unwrap()
    }

    #[test]
    fn test_from_frame_infers_kinds() {
        let frame = df![
            "site" => ["a", "b"],
            "value" => [1i32, 2],
            "flag" => [true, false],
        ]
        .unwrap();
        let ds = Dataset::from_frame(frame).unwrap();

        assert_eq!(ds.kind("site"), Some(ColumnKind::Categorical));
        assert_eq!(ds.kind("value"), Some(ColumnKind::Numeric));
        assert_eq!(ds.kind("flag"), Some(ColumnKind::Other));
        assert_eq!(ds.series("value").unwrap().dtype(), &DataType::Float64);
    }

    #[test]
    fn test_algae_canonicalizes_levels() {
        let ds = Dataset::algae(training_frame(), AlgaeTable::Training).unwrap();
        let seasons = ds.categorical_values("season").unwrap();
        assert_eq!(seasons[0].as_deref(), Some("winter"));
        assert_eq!(ds.numeric_columns().len(), 15);
        assert_eq!(ds.categorical_columns(), vec!["season", "size", "speed"]);
        assert_eq!(ds.series("a4").unwrap().dtype(), &DataType::Float64);
    }

    #[test]
    fn test_algae_rejects_unknown_level() {
        let mut frame = training_frame();
        frame
            .replace("size", Series::new("size".into(), ["small", "huge", "large"]))
            .unwrap();
        let err = Dataset::algae(frame, AlgaeTable::Training).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_CATEGORY");
    }

    #[test]
    fn test_algae_missing_column() {
        let frame = training_frame().drop("Chla").unwrap();
        let err = Dataset::algae(frame, AlgaeTable::Training).unwrap_err();
        assert!(matches!(err, AnalysisError::ColumnNotFound(c) if c == "Chla"));
    }

    #[test]
    fn test_value_accessors_check_kind() {
        let ds = Dataset::algae(training_frame(), AlgaeTable::Training).unwrap();
        assert_eq!(
            ds.numeric_values("mxPH").unwrap(),
            vec![Some(8.0), Some(8.35), None]
        );
        assert!(matches!(
            ds.numeric_values("season"),
            Err(AnalysisError::NotNumeric(_))
        ));
        assert!(matches!(
            ds.categorical_values("mxPH"),
            Err(AnalysisError::NotCategorical(_))
        ));
        assert!(matches!(
            ds.numeric_values("pH"),
            Err(AnalysisError::ColumnNotFound(_))
        ));
    }

    #[test]
    fn test_with_column_leaves_original_untouched() {
        let ds = Dataset::algae(training_frame(), AlgaeTable::Training).unwrap();
        let replacement = Series::new("mxPH".into(), [1.0, 2.0, 3.0]);
        let changed = ds.with_column(replacement).unwrap();

        assert_eq!(changed.numeric_values("mxPH").unwrap()[2], Some(3.0));
        assert_eq!(ds.numeric_values("mxPH").unwrap()[2], None);
    }

    #[test]
    fn test_select_rows() {
        let ds = Dataset::algae(training_frame(), AlgaeTable::Training).unwrap();
        let kept = ds.select_rows(&[true, false, true]).unwrap();
        assert_eq!(kept.height(), 2);
        assert_eq!(
            kept.categorical_values("season").unwrap(),
            vec![Some("winter".to_string()), Some("autumn".to_string())]
        );
        assert!(ds.select_rows(&[true]).unwrap_err().is_invalid_argument());
    }

    #[test]
    fn test_missing_cells() {
        let ds = Dataset::algae(training_frame(), AlgaeTable::Training).unwrap();
        assert_eq!(ds.missing_cells(), 3);
    }
}
