//! Missing-value row filtering.
//!
//! A row's missingness ratio is the number of absent cells divided by the
//! row length. [`filter_sparse_rows`] flags every row whose ratio is at or
//! above a threshold `prop` and returns either the table without those rows
//! or their 0-based positions.
//!
//! The threshold is inclusive: at `prop = 0` every row is flagged, complete
//! rows included; at `prop = 1` only rows with every cell absent are flagged.
//!
//! The filter works on anything implementing [`RowMissingness`]: polars
//! frames, [`Dataset`]s and row-major `Vec<Vec<Option<T>>>` tables.

use crate::dataset::Dataset;
use crate::error::{AnalysisError, Result};
use polars::prelude::*;
use tracing::debug;

/// Access to per-row missing-cell counts of a table.
pub trait RowMissingness: Sized {
    /// Number of rows.
    fn row_count(&self) -> usize;

    /// Number of cells in every row. Fails when rows differ in length.
    fn row_width(&self) -> Result<usize>;

    /// Count of absent cells in each row, in row order.
    fn missing_per_row(&self) -> Result<Vec<usize>>;

    /// A new table holding the rows where `keep` is true, in order.
    fn keep_rows(&self, keep: &[bool]) -> Result<Self>;
}

/// Output form of [`filter_sparse_rows`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterMode {
    /// Return the table without the flagged rows.
    Filtered,
    /// Return the 0-based positions of the flagged rows.
    Indices,
}

/// Result of [`filter_sparse_rows`].
#[derive(Debug, Clone, PartialEq)]
pub enum FilterOutcome<T> {
    Filtered(T),
    Indices(Vec<usize>),
}

impl<T> FilterOutcome<T> {
    /// The filtered table, if this outcome holds one.
    pub fn into_filtered(self) -> Option<T> {
        match self {
            FilterOutcome::Filtered(t) => Some(t),
            FilterOutcome::Indices(_) => None,
        }
    }

    /// The flagged indices, if this outcome holds them.
    pub fn into_indices(self) -> Option<Vec<usize>> {
        match self {
            FilterOutcome::Filtered(_) => None,
            FilterOutcome::Indices(i) => Some(i),
        }
    }
}

/// Fraction of absent cells in a single row.
pub fn missing_ratio<T>(row: &[Option<T>]) -> Result<f64> {
    if row.is_empty() {
        return Err(AnalysisError::invalid_argument(
            "cannot compute the missing ratio of a row with zero columns",
        ));
    }
    let missing = row.iter().filter(|c| c.is_none()).count();
    Ok(missing as f64 / row.len() as f64)
}

fn validate_prop(prop: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&prop) {
        return Err(AnalysisError::invalid_argument(format!(
            "prop must be within [0, 1], got {}",
            prop
        )));
    }
    Ok(())
}

/// Flag rows whose missingness ratio is `>= prop`.
///
/// `prop` is validated before the table is touched.
pub fn flag_sparse_rows<T: RowMissingness>(table: &T, prop: f64) -> Result<Vec<bool>> {
    validate_prop(prop)?;

    if table.row_count() == 0 {
        return Ok(Vec::new());
    }
    let width = table.row_width()?;
    if width == 0 {
        return Err(AnalysisError::invalid_argument(
            "rows have zero columns; the missing ratio is undefined",
        ));
    }

    let flags: Vec<bool> = table
        .missing_per_row()?
        .into_iter()
        .map(|missing| missing as f64 / width as f64 >= prop)
        .collect();

    debug!(
        "Flagged {} of {} rows at prop = {}",
        flags.iter().filter(|f| **f).count(),
        flags.len(),
        prop
    );
    Ok(flags)
}

/// Remove, or locate, rows that are too sparse to keep.
///
/// # Errors
///
/// [`AnalysisError::InvalidArgument`] when `prop` is outside `[0, 1]` (NaN
/// included), when rows have zero columns, or when rows differ in length.
///
/// # Example
///
/// ```rust,ignore
/// use algae_eda::missing::{filter_sparse_rows, FilterMode};
///
/// let flagged = filter_sparse_rows(&dataset, 0.2, FilterMode::Indices)?
///     .into_indices()
///     .unwrap_or_default();
/// ```
pub fn filter_sparse_rows<T: RowMissingness>(
    table: &T,
    prop: f64,
    mode: FilterMode,
) -> Result<FilterOutcome<T>> {
    let flags = flag_sparse_rows(table, prop)?;
    match mode {
        FilterMode::Indices => Ok(FilterOutcome::Indices(positions(&flags))),
        FilterMode::Filtered => {
            let keep: Vec<bool> = flags.iter().map(|f| !f).collect();
            Ok(FilterOutcome::Filtered(table.keep_rows(&keep)?))
        }
    }
}

/// Shorthand for [`filter_sparse_rows`] in [`FilterMode::Indices`].
pub fn sparse_row_indices<T: RowMissingness>(table: &T, prop: f64) -> Result<Vec<usize>> {
    Ok(positions(&flag_sparse_rows(table, prop)?))
}

/// Shorthand for [`filter_sparse_rows`] in [`FilterMode::Filtered`].
pub fn drop_sparse_rows<T: RowMissingness>(table: &T, prop: f64) -> Result<T> {
    let keep: Vec<bool> = flag_sparse_rows(table, prop)?
        .into_iter()
        .map(|f| !f)
        .collect();
    table.keep_rows(&keep)
}

/// `true` for every row without any absent cell.
pub fn complete_cases<T: RowMissingness>(table: &T) -> Result<Vec<bool>> {
    Ok(table
        .missing_per_row()?
        .into_iter()
        .map(|m| m == 0)
        .collect())
}

/// 0-based positions of rows with at least one absent cell.
pub fn rows_with_missing<T: RowMissingness>(table: &T) -> Result<Vec<usize>> {
    let incomplete: Vec<bool> = complete_cases(table)?.into_iter().map(|c| !c).collect();
    Ok(positions(&incomplete))
}

/// Row deletion: keep only complete rows.
pub fn drop_incomplete_rows<T: RowMissingness>(table: &T) -> Result<T> {
    table.keep_rows(&complete_cases(table)?)
}

fn positions(flags: &[bool]) -> Vec<usize> {
    flags
        .iter()
        .enumerate()
        .filter(|(_, f)| **f)
        .map(|(i, _)| i)
        .collect()
}

// =============================================================================
// Table implementations
// =============================================================================

impl RowMissingness for DataFrame {
    fn row_count(&self) -> usize {
        self.height()
    }

    fn row_width(&self) -> Result<usize> {
        Ok(self.width())
    }

    fn missing_per_row(&self) -> Result<Vec<usize>> {
        let mut counts = vec![0usize; self.height()];
        for col in self.get_columns() {
            if col.null_count() == 0 {
                continue;
            }
            let nulls = col.as_materialized_series().is_null();
            for (count, is_null) in counts.iter_mut().zip(&nulls) {
                if is_null.unwrap_or(false) {
                    *count += 1;
                }
            }
        }
        Ok(counts)
    }

    fn keep_rows(&self, keep: &[bool]) -> Result<Self> {
        let mask = BooleanChunked::from_slice("mask".into(), keep);
        Ok(self.filter(&mask)?)
    }
}

impl RowMissingness for Dataset {
    fn row_count(&self) -> usize {
        self.height()
    }

    fn row_width(&self) -> Result<usize> {
        Ok(self.width())
    }

    fn missing_per_row(&self) -> Result<Vec<usize>> {
        self.frame().missing_per_row()
    }

    fn keep_rows(&self, keep: &[bool]) -> Result<Self> {
        self.select_rows(keep)
    }
}

impl<T: Clone> RowMissingness for Vec<Vec<Option<T>>> {
    fn row_count(&self) -> usize {
        self.len()
    }

    fn row_width(&self) -> Result<usize> {
        let width = self.first().map(Vec::len).unwrap_or(0);
        if let Some((i, row)) = self.iter().enumerate().find(|(_, r)| r.len() != width) {
            return Err(AnalysisError::invalid_argument(format!(
                "row {} has {} cells, expected {}",
                i,
                row.len(),
                width
            )));
        }
        Ok(width)
    }

    fn missing_per_row(&self) -> Result<Vec<usize>> {
        Ok(self
            .iter()
            .map(|row| row.iter().filter(|c| c.is_none()).count())
            .collect())
    }

    fn keep_rows(&self, keep: &[bool]) -> Result<Self> {
        if keep.len() != self.len() {
            return Err(AnalysisError::invalid_argument(format!(
                "row mask has {} entries for {} rows",
                keep.len(),
                self.len()
            )));
        }
        Ok(self
            .iter()
            .zip(keep)
            .filter(|(_, k)| **k)
            .map(|(row, _)| row.clone())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    type Rows = Vec<Vec<Option<f64>>>;

    /// 4 x 4 table with [0, 1, 2, 4] missing cells per row.
    fn staircase() -> Rows {
        vec![
            vec![Some(1.0), Some(2.0), Some(3.0), Some(4.0)],
            vec![Some(1.0), None, Some(3.0), Some(4.0)],
            vec![None, Some(2.0), None, Some(4.0)],
            vec![None, None, None, None],
        ]
    }

    /// Wraps a row table and counts how often it is scanned.
    #[derive(Debug)]
    struct CountingTable {
        rows: Rows,
        scans: Cell<usize>,
    }

    impl CountingTable {
        fn new(rows: Rows) -> Self {
            Self {
                rows,
                scans: Cell::new(0),
            }
        }
    }

    impl RowMissingness for CountingTable {
        fn row_count(&self) -> usize {
            self.rows.len()
        }

        fn row_width(&self) -> Result<usize> {
            self.scans.set(self.scans.get() + 1);
            self.rows.row_width()
        }

        fn missing_per_row(&self) -> Result<Vec<usize>> {
            self.scans.set(self.scans.get() + 1);
            self.rows.missing_per_row()
        }

        fn keep_rows(&self, keep: &[bool]) -> Result<Self> {
            Ok(Self::new(self.rows.keep_rows(keep)?))
        }
    }

    #[test]
    fn test_staircase_at_half() {
        let table = staircase();
        let indices = sparse_row_indices(&table, 0.5).unwrap();
        assert_eq!(indices, vec![2, 3]);

        let filtered = drop_sparse_rows(&table, 0.5).unwrap();
        assert_eq!(filtered, table[..2].to_vec());
    }

    #[test]
    fn test_out_of_range_prop_fails_before_scanning() {
        for prop in [-0.1, 1.000001, 2.0, f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let table = CountingTable::new(staircase());
            for mode in [FilterMode::Filtered, FilterMode::Indices] {
                let err = filter_sparse_rows(&table, prop, mode).unwrap_err();
                assert!(err.is_invalid_argument(), "prop = {}", prop);
            }
            assert_eq!(table.scans.get(), 0, "prop = {} scanned the table", prop);
        }
    }

    #[test]
    fn test_valid_prop_scans() {
        let table = CountingTable::new(staircase());
        filter_sparse_rows(&table, 0.5, FilterMode::Indices).unwrap();
        assert!(table.scans.get() > 0);
    }

    #[test]
    fn test_prop_zero_flags_every_row() {
        let complete: Rows = vec![vec![Some(1.0), Some(2.0)], vec![Some(3.0), Some(4.0)]];
        assert_eq!(sparse_row_indices(&complete, 0.0).unwrap(), vec![0, 1]);
        assert!(drop_sparse_rows(&complete, 0.0).unwrap().is_empty());
    }

    #[test]
    fn test_prop_one_flags_only_empty_rows() {
        let rows: Rows = vec![
            vec![Some(1.0), None, None, None, None],
            vec![None, None, None, None, None],
        ];
        assert_eq!(sparse_row_indices(&rows, 1.0).unwrap(), vec![1]);
    }

    #[test]
    fn test_threshold_is_inclusive() {
        // one of three cells missing: ratio 1/3
        let rows: Rows = vec![vec![None, Some(1.0), Some(2.0)]];
        let ratio = missing_ratio(&rows[0]).unwrap();
        assert_eq!(sparse_row_indices(&rows, ratio).unwrap(), vec![0]);
        assert!(sparse_row_indices(&rows, 0.34).unwrap().is_empty());
    }

    #[test]
    fn test_outputs_are_complements() {
        let table = staircase();
        for prop in [0.0, 0.1, 0.25, 0.3, 0.5, 0.75, 0.9, 1.0] {
            let indices = sparse_row_indices(&table, prop).unwrap();
            let filtered = drop_sparse_rows(&table, prop).unwrap();
            assert_eq!(indices.len() + filtered.len(), table.len(), "prop = {}", prop);

            let kept: Vec<usize> = (0..table.len()).filter(|i| !indices.contains(i)).collect();
            let expected: Rows = kept.iter().map(|i| table[*i].clone()).collect();
            assert_eq!(filtered, expected, "prop = {}", prop);
        }
    }

    #[test]
    fn test_idempotent_at_same_or_looser_threshold() {
        let table = staircase();
        let once = drop_sparse_rows(&table, 0.25).unwrap();
        assert_eq!(drop_sparse_rows(&once, 0.25).unwrap(), once);
        assert_eq!(drop_sparse_rows(&once, 0.8).unwrap(), once);
    }

    #[test]
    fn test_indices_ascending_without_duplicates() {
        let indices = sparse_row_indices(&staircase(), 0.2).unwrap();
        assert_eq!(indices, vec![1, 2, 3]);
        assert!(indices.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_zero_column_rows_rejected() {
        let rows: Vec<Vec<Option<f64>>> = vec![vec![], vec![]];
        let err = sparse_row_indices(&rows, 0.5).unwrap_err();
        assert!(err.is_invalid_argument());

        let err = missing_ratio::<f64>(&[]).unwrap_err();
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn test_empty_table() {
        let rows: Rows = Vec::new();
        assert!(sparse_row_indices(&rows, 0.5).unwrap().is_empty());
        assert!(drop_sparse_rows(&rows, 0.5).unwrap().is_empty());
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let rows: Rows = vec![vec![Some(1.0), None], vec![Some(1.0)]];
        assert!(sparse_row_indices(&rows, 0.5).unwrap_err().is_invalid_argument());
    }

    #[test]
    fn test_input_not_mutated() {
        let table = staircase();
        let snapshot = table.clone();
        let _ = drop_sparse_rows(&table, 0.1).unwrap();
        assert_eq!(table, snapshot);
    }

    #[test]
    fn test_complete_cases_and_row_deletion() {
        let table = staircase();
        assert_eq!(
            complete_cases(&table).unwrap(),
            vec![true, false, false, false]
        );
        assert_eq!(rows_with_missing(&table).unwrap(), vec![1, 2, 3]);
        assert_eq!(drop_incomplete_rows(&table).unwrap(), vec![table[0].clone()]);
    }

    #[test]
    fn test_dataframe_staircase() {
        let df = df![
            "a" => [Some(1.0), Some(1.0), None, None],
            "b" => [Some(2.0), None, Some(2.0), None],
            "c" => [Some("x"), Some("y"), None, None],
            "d" => [Some(4i32), Some(4), Some(4), None],
        ]
        .unwrap();

        assert_eq!(df.missing_per_row().unwrap(), vec![0, 1, 2, 4]);

        let indices = filter_sparse_rows(&df, 0.5, FilterMode::Indices)
            .unwrap()
            .into_indices();
        assert_eq!(indices, Some(vec![2, 3]));

        let filtered = filter_sparse_rows(&df, 0.5, FilterMode::Filtered)
            .unwrap()
            .into_filtered()
            .unwrap();
        assert_eq!(filtered.height(), 2);
        assert!(filtered.equals_missing(&df.head(Some(2))));
    }

    #[test]
    fn test_dataframe_without_columns() {
        let df = DataFrame::empty();
        assert!(sparse_row_indices(&df, 0.5).unwrap().is_empty());
    }
}
