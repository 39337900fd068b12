//! Box and violin plots, plain or grouped by a categorical column.

use super::distribution::{DensityCurve, density};
use crate::dataset::Dataset;
use crate::error::{AnalysisError, Result};
use crate::factor::Factor;
use crate::stats;
use crate::utils::observed;
use serde::{Deserialize, Serialize};

/// Tukey box plot statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxStats {
    pub lower_whisker: f64,
    pub lower_hinge: f64,
    pub median: f64,
    pub upper_hinge: f64,
    pub upper_whisker: f64,
    /// Values beyond the whiskers, sorted.
    pub outliers: Vec<f64>,
    /// Observed values.
    pub n: usize,
}

/// Box plot of one level of a grouping column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupBox {
    pub level: String,
    /// `None` when the level has no observed value.
    pub stats: Option<BoxStats>,
}

/// Violin of one level of a grouping column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupViolin {
    pub level: String,
    pub n: usize,
    /// `None` with fewer than two observed values.
    pub density: Option<DensityCurve>,
    pub median: Option<f64>,
}

/// Box plots of a numeric column per level of a categorical column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupedBox {
    pub value_column: String,
    pub group_column: String,
    /// One entry per level, in display order.
    pub groups: Vec<GroupBox>,
}

/// Violin plots of a numeric column per level of a categorical column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupedViolin {
    pub value_column: String,
    pub group_column: String,
    pub groups: Vec<GroupViolin>,
}

/// Box plot statistics of a numeric column.
///
/// Hinges come from the five-number summary. Whiskers reach the most
/// extreme values within `coef` interquartile ranges of the hinges; a
/// `coef` of zero extends them to the extremes.
pub fn box_stats(values: &[Option<f64>], coef: f64) -> Result<BoxStats> {
    if !coef.is_finite() || coef < 0.0 {
        return Err(AnalysisError::invalid_argument(format!(
            "box plot coefficient must be a non-negative number, got {}",
            coef
        )));
    }
    let present = stats::sorted(&observed(values));
    let Some([min, lower_hinge, median, upper_hinge, max]) = stats::fivenum(&present) else {
        return Err(AnalysisError::InsufficientData(
            "no observed values to plot".to_string(),
        ));
    };

    let (low_fence, high_fence) = if coef == 0.0 {
        (min, max)
    } else {
        let reach = coef * (upper_hinge - lower_hinge);
        (lower_hinge - reach, upper_hinge + reach)
    };
    let inside = |v: &&f64| **v >= low_fence && **v <= high_fence;

    let lower_whisker = present.iter().find(inside).copied().unwrap_or(lower_hinge);
    let upper_whisker = present.iter().rev().find(inside).copied().unwrap_or(upper_hinge);
    let outliers = present
        .iter()
        .filter(|v| **v < low_fence || **v > high_fence)
        .copied()
        .collect();

    Ok(BoxStats {
        lower_whisker,
        lower_hinge,
        median,
        upper_hinge,
        upper_whisker,
        outliers,
        n: present.len(),
    })
}

/// Values of `value_column` split by the levels of `group_column`.
fn split_by_level(
    dataset: &Dataset,
    value_column: &str,
    group_column: &str,
) -> Result<Vec<(String, Vec<Option<f64>>)>> {
    let values = dataset.numeric_values(value_column)?;
    let factor = Factor::display_ordered(dataset, group_column)?;
    Ok(factor
        .groups()
        .into_iter()
        .map(|(level, rows)| (level, rows.iter().map(|r| values[*r]).collect()))
        .collect())
}

/// Box plots of `value_column` per level of `group_column`.
pub fn grouped_box(
    dataset: &Dataset,
    value_column: &str,
    group_column: &str,
    coef: f64,
) -> Result<GroupedBox> {
    let groups = split_by_level(dataset, value_column, group_column)?
        .into_iter()
        .map(|(level, values)| {
            let stats = match box_stats(&values, coef) {
                Ok(stats) => Some(stats),
                Err(AnalysisError::InsufficientData(_)) => None,
                Err(e) => return Err(e),
            };
            Ok(GroupBox { level, stats })
        })
        .collect::<Result<_>>()?;

    Ok(GroupedBox {
        value_column: value_column.to_string(),
        group_column: group_column.to_string(),
        groups,
    })
}

/// Violin plots (density plus median) of `value_column` per level of
/// `group_column`.
pub fn grouped_violin(
    dataset: &Dataset,
    value_column: &str,
    group_column: &str,
    points: usize,
) -> Result<GroupedViolin> {
    let groups = split_by_level(dataset, value_column, group_column)?
        .into_iter()
        .map(|(level, values)| {
            let present = observed(&values);
            let density = match density(&values, points) {
                Ok(curve) => Some(curve),
                Err(AnalysisError::InsufficientData(_)) => None,
                Err(e) => return Err(e),
            };
            Ok(GroupViolin {
                level,
                n: present.len(),
                density,
                median: stats::median(&present),
            })
        })
        .collect::<Result<_>>()?;

    Ok(GroupedViolin {
        value_column: value_column.to_string(),
        group_column: group_column.to_string(),
        groups,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;
    use pretty_assertions::assert_eq;

    fn values(xs: &[f64]) -> Vec<Option<f64>> {
        xs.iter().copied().map(Some).collect()
    }

    #[test]
    fn test_box_stats_with_outlier() {
        let b = box_stats(&values(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 100.0]), 1.5).unwrap();
        assert_eq!(b.lower_hinge, 3.0);
        assert_eq!(b.median, 5.0);
        assert_eq!(b.upper_hinge, 7.0);
        assert_eq!(b.lower_whisker, 1.0);
        assert_eq!(b.upper_whisker, 8.0);
        assert_eq!(b.outliers, vec![100.0]);
        assert_eq!(b.n, 9);
    }

    #[test]
    fn test_box_stats_zero_coef_reaches_extremes() {
        let b = box_stats(&values(&[1.0, 2.0, 3.0, 4.0, 100.0]), 0.0).unwrap();
        assert_eq!(b.upper_whisker, 100.0);
        assert!(b.outliers.is_empty());
    }

    #[test]
    fn test_box_stats_errors() {
        assert!(box_stats(&values(&[1.0]), -1.0).unwrap_err().is_invalid_argument());
        assert!(box_stats(&[None], 1.5).is_err());
    }

    fn dataset() -> Dataset {
        Dataset::from_frame(
            df![
                "size" => [Some("large"), Some("small"), Some("small"), Some("large"), None, Some("small")],
                "a1" => [Some(1.0), Some(40.0), Some(30.0), Some(3.0), Some(9.0), None],
            ]
            .unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn test_grouped_box_display_order() {
        let g = grouped_box(&dataset(), "a1", "size", 1.5).unwrap();
        let levels: Vec<&str> = g.groups.iter().map(|g| g.level.as_str()).collect();
        // medium is unobserved but keeps its place in the display order
        assert_eq!(levels, vec!["small", "medium", "large"]);
        assert_eq!(g.groups[0].stats.as_ref().unwrap().n, 2);
        assert!(g.groups[1].stats.is_none());
        assert_eq!(g.groups[2].stats.as_ref().unwrap().median, 2.0);
    }

    #[test]
    fn test_grouped_violin() {
        let v = grouped_violin(&dataset(), "a1", "size", 32).unwrap();
        assert_eq!(v.groups.len(), 3);
        assert_eq!(v.groups[0].n, 2);
        assert_eq!(v.groups[0].median, Some(35.0));
        assert_eq!(v.groups[0].density.as_ref().unwrap().x.len(), 32);
        assert!(v.groups[1].density.is_none());
    }

    #[test]
    fn test_grouped_requires_categorical_group() {
        let err = grouped_box(&dataset(), "a1", "a1", 1.5).unwrap_err();
        assert_eq!(err.error_code(), "NOT_CATEGORICAL");
    }
}
