//! Data profiling module for dataset analysis.
//!
//! This module provides the descriptive side of the workflow:
//! - Per-column statistics for numeric columns
//! - Frequency tables for categorical columns, in display order
//! - Correlations between numeric columns over complete observations

mod correlation;
mod statistics;

pub use correlation::CorrelationMatrix;
pub use statistics::NumericSummary;

use crate::dataset::{ColumnKind, Dataset};
use crate::error::Result;
use crate::factor::{Factor, LevelCount};
use crate::missing;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Frequency table of a categorical column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoricalSummary {
    /// Level counts, in display order.
    pub levels: Vec<LevelCount>,
    /// Missing cells.
    pub missing: usize,
}

/// Summary of one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ColumnSummary {
    Numeric {
        name: String,
        #[serde(flatten)]
        stats: NumericSummary,
    },
    Categorical {
        name: String,
        #[serde(flatten)]
        table: CategoricalSummary,
    },
}

impl ColumnSummary {
    pub fn name(&self) -> &str {
        match self {
            ColumnSummary::Numeric { name, .. } | ColumnSummary::Categorical { name, .. } => name,
        }
    }

    pub fn missing(&self) -> usize {
        match self {
            ColumnSummary::Numeric { stats, .. } => stats.missing,
            ColumnSummary::Categorical { table, .. } => table.missing,
        }
    }
}

/// Descriptive summary of a whole dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetSummary {
    pub rows: usize,
    pub columns: usize,
    /// Missing cells over the whole table.
    pub missing_cells: usize,
    /// Rows without any missing cell.
    pub complete_rows: usize,
    /// One entry per column, in table order.
    pub column_summaries: Vec<ColumnSummary>,
}

impl DatasetSummary {
    /// Summary of a named column.
    pub fn column(&self, name: &str) -> Option<&ColumnSummary> {
        self.column_summaries.iter().find(|c| c.name() == name)
    }
}

/// Data profiler for analyzing dataset structure and characteristics.
pub struct DataProfiler;

impl DataProfiler {
    /// Summarize every numeric and categorical column of a dataset.
    ///
    /// Columns of any other type are skipped.
    pub fn summarize(dataset: &Dataset) -> Result<DatasetSummary> {
        let mut column_summaries = Vec::new();

        for name in dataset.column_names() {
            match dataset.kind(name) {
                Some(ColumnKind::Numeric) => {
                    let stats = NumericSummary::compute(&dataset.numeric_values(name)?);
                    column_summaries.push(ColumnSummary::Numeric {
                        name: name.to_string(),
                        stats,
                    });
                }
                Some(ColumnKind::Categorical) => {
                    let table = Self::frequency_table(dataset, name, None)?;
                    column_summaries.push(ColumnSummary::Categorical {
                        name: name.to_string(),
                        table,
                    });
                }
                _ => debug!("Skipping column '{}' with unsupported type", name),
            }
        }

        let complete_rows = missing::complete_cases(dataset)?
            .into_iter()
            .filter(|c| *c)
            .count();

        Ok(DatasetSummary {
            rows: dataset.height(),
            columns: dataset.width(),
            missing_cells: dataset.missing_cells(),
            complete_rows,
            column_summaries,
        })
    }

    /// Frequency table of a categorical column.
    ///
    /// With `order`, levels are listed in that order; otherwise the column's
    /// display order is used when it has one, else alphabetical order.
    pub fn frequency_table(
        dataset: &Dataset,
        column: &str,
        order: Option<&[&str]>,
    ) -> Result<CategoricalSummary> {
        let factor = match order {
            Some(order) => Factor::from_dataset(dataset, column)?.reorder(order)?,
            None => Factor::display_ordered(dataset, column)?,
        };
        Ok(CategoricalSummary {
            levels: factor.frequencies(),
            missing: factor.missing(),
        })
    }

    /// Pearson correlations of numeric columns over complete observations.
    pub fn correlation_matrix(dataset: &Dataset, columns: &[&str]) -> Result<CorrelationMatrix> {
        CorrelationMatrix::compute(dataset, columns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;
    use pretty_assertions::assert_eq;

    fn dataset() -> Dataset {
        Dataset::from_frame(
            df![
                "size" => [Some("large"), Some("small"), Some("medium"), None, Some("small")],
                "mxPH" => [Some(8.0), Some(8.2), None, Some(7.4), Some(8.4)],
                "a1" => [0.0, 1.4, 3.3, 3.1, 9.2],
            ]
            .unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn test_summarize_shape() {
        let summary = DataProfiler::summarize(&dataset()).unwrap();
        assert_eq!(summary.rows, 5);
        assert_eq!(summary.columns, 3);
        assert_eq!(summary.missing_cells, 2);
        assert_eq!(summary.complete_rows, 3);
        assert_eq!(summary.column_summaries.len(), 3);
    }

    #[test]
    fn test_summarize_numeric_column() {
        let summary = DataProfiler::summarize(&dataset()).unwrap();
        match summary.column("mxPH").unwrap() {
            ColumnSummary::Numeric { stats, .. } => {
                assert_eq!(stats.count, 4);
                assert_eq!(stats.missing, 1);
                assert_eq!(stats.min, Some(7.4));
                assert_eq!(stats.max, Some(8.4));
            }
            other => panic!("expected numeric summary, got {:?}", other),
        }
    }

    #[test]
    fn test_summarize_categorical_in_display_order() {
        let summary = DataProfiler::summarize(&dataset()).unwrap();
        match summary.column("size").unwrap() {
            ColumnSummary::Categorical { table, .. } => {
                let levels: Vec<&str> = table.levels.iter().map(|l| l.level.as_str()).collect();
                assert_eq!(levels, vec!["small", "medium", "large"]);
                assert_eq!(table.levels[0].count, 2);
                assert_eq!(table.missing, 1);
            }
            other => panic!("expected categorical summary, got {:?}", other),
        }
    }

    #[test]
    fn test_frequency_table_with_explicit_order() {
        let table =
            DataProfiler::frequency_table(&dataset(), "size", Some(&["large", "medium", "small"]))
                .unwrap();
        let counts: Vec<usize> = table.levels.iter().map(|l| l.count).collect();
        assert_eq!(counts, vec![1, 1, 2]);
    }

    #[test]
    fn test_summary_serializes_with_kind_tag() {
        let summary = DataProfiler::summarize(&dataset()).unwrap();
        let json = serde_json::to_value(&summary).unwrap();
        let first = &json["column_summaries"][0];
        assert_eq!(first["kind"], "categorical");
        assert_eq!(first["name"], "size");
        assert_eq!(json["column_summaries"][1]["count"], 4);
    }
}
