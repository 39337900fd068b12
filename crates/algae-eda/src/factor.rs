//! Categorical columns with an explicit level order.
//!
//! A [`Factor`] is a derived view of a categorical column: a list of levels
//! plus one level code per row. Levels start out in alphabetical order;
//! [`Factor::reorder`] imposes a display order (small < medium < large rather
//! than large < medium < small). Neither operation touches the dataset the
//! factor came from.

use crate::dataset::Dataset;
use crate::dataset::schema::display_order_for;
use crate::error::{AnalysisError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::debug;

/// Level codes of a categorical column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Factor {
    name: String,
    levels: Vec<String>,
    codes: Vec<Option<u32>>,
}

/// One row of a frequency table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelCount {
    pub level: String,
    pub count: usize,
}

impl Factor {
    /// Build a factor with alphabetically ordered levels.
    pub fn from_values(name: impl Into<String>, values: &[Option<String>]) -> Self {
        let levels: Vec<String> = values
            .iter()
            .flatten()
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let codes = values
            .iter()
            .map(|v| {
                v.as_ref()
                    .and_then(|v| levels.iter().position(|l| l == v))
                    .map(|p| p as u32)
            })
            .collect();
        Self {
            name: name.into(),
            levels,
            codes,
        }
    }

    /// Build a factor from a categorical column of a dataset.
    pub fn from_dataset(dataset: &Dataset, column: &str) -> Result<Self> {
        Ok(Self::from_values(column, &dataset.categorical_values(column)?))
    }

    /// Like [`Factor::from_dataset`], but uses the column's natural display
    /// order when it has one (season, size, speed).
    ///
    /// Columns whose labels fall outside the known level set (a generic CSV
    /// with `Winter` rather than `winter`) keep alphabetical order.
    pub fn display_ordered(dataset: &Dataset, column: &str) -> Result<Self> {
        let factor = Self::from_dataset(dataset, column)?;
        let Some(order) = display_order_for(column) else {
            return Ok(factor);
        };
        if factor.levels.iter().all(|l| order.contains(&l.as_str())) {
            factor.reorder(&order)
        } else {
            debug!(
                "Column '{}' has levels outside {:?}, keeping alphabetical order",
                column, order
            );
            Ok(factor)
        }
    }

    /// Impose an explicit level order.
    ///
    /// Every observed level must appear in `order`. Levels in `order` that
    /// are never observed are kept and get a zero count.
    pub fn reorder(&self, order: &[&str]) -> Result<Self> {
        let mut seen = BTreeSet::new();
        if let Some(dup) = order.iter().find(|l| !seen.insert(**l)) {
            return Err(AnalysisError::invalid_argument(format!(
                "level '{}' appears more than once in the requested order",
                dup
            )));
        }
        if let Some(missing) = self
            .levels
            .iter()
            .find(|l| !order.contains(&l.as_str()))
        {
            return Err(AnalysisError::invalid_argument(format!(
                "observed level '{}' of '{}' is missing from the requested order",
                missing, self.name
            )));
        }

        let remap: Vec<u32> = self
            .levels
            .iter()
            .map(|l| order.iter().position(|o| *o == l.as_str()).unwrap_or_default() as u32)
            .collect();

        Ok(Self {
            name: self.name.clone(),
            levels: order.iter().map(|l| l.to_string()).collect(),
            codes: self
                .codes
                .iter()
                .map(|c| c.map(|c| remap[c as usize]))
                .collect(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Levels in their current order.
    pub fn levels(&self) -> &[String] {
        &self.levels
    }

    /// Per-row level codes (indices into [`Factor::levels`]).
    pub fn codes(&self) -> &[Option<u32>] {
        &self.codes
    }

    /// Level label of a row, `None` if missing.
    pub fn label(&self, row: usize) -> Option<&str> {
        self.codes
            .get(row)
            .copied()
            .flatten()
            .map(|c| self.levels[c as usize].as_str())
    }

    /// Number of missing cells.
    pub fn missing(&self) -> usize {
        self.codes.iter().filter(|c| c.is_none()).count()
    }

    /// Count of each level, in level order.
    pub fn frequencies(&self) -> Vec<LevelCount> {
        let mut counts = vec![0usize; self.levels.len()];
        for code in self.codes.iter().flatten() {
            counts[*code as usize] += 1;
        }
        self.levels
            .iter()
            .zip(counts)
            .map(|(level, count)| LevelCount {
                level: level.clone(),
                count,
            })
            .collect()
    }

    /// Row positions belonging to each level, in level order.
    pub fn groups(&self) -> Vec<(String, Vec<usize>)> {
        let mut groups: Vec<(String, Vec<usize>)> =
            self.levels.iter().map(|l| (l.clone(), Vec::new())).collect();
        for (row, code) in self.codes.iter().enumerate() {
            if let Some(c) = code {
                groups[*c as usize].1.push(row);
            }
        }
        groups
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sizes() -> Vec<Option<String>> {
        ["small", "large", "medium", "small"]
            .iter()
            .map(|s| Some(s.to_string()))
            .chain(std::iter::once(None))
            .collect()
    }

    #[test]
    fn test_levels_default_alphabetical() {
        let f = Factor::from_values("size", &sizes());
        assert_eq!(f.levels(), ["large", "medium", "small"]);
        assert_eq!(f.codes(), &[Some(2), Some(0), Some(1), Some(2), None]);
        assert_eq!(f.missing(), 1);
    }

    #[test]
    fn test_reorder_keeps_row_labels() {
        let f = Factor::from_values("size", &sizes());
        let ordered = f.reorder(&["small", "medium", "large"]).unwrap();

        assert_eq!(ordered.levels(), ["small", "medium", "large"]);
        for row in 0..5 {
            assert_eq!(ordered.label(row), f.label(row));
        }
        let counts: Vec<usize> = ordered.frequencies().iter().map(|c| c.count).collect();
        assert_eq!(counts, vec![2, 1, 1]);
        // the source factor is unchanged
        assert_eq!(f.levels(), ["large", "medium", "small"]);
    }

    #[test]
    fn test_reorder_allows_unobserved_levels() {
        let f = Factor::from_values("speed", &[Some("low".to_string())]);
        let ordered = f.reorder(&["low", "medium", "high"]).unwrap();
        let counts: Vec<usize> = ordered.frequencies().iter().map(|c| c.count).collect();
        assert_eq!(counts, vec![1, 0, 0]);
    }

    #[test]
    fn test_reorder_rejects_incomplete_order() {
        let f = Factor::from_values("size", &sizes());
        let err = f.reorder(&["small", "large"]).unwrap_err();
        assert!(err.is_invalid_argument());
        assert!(err.to_string().contains("medium"));
    }

    #[test]
    fn test_reorder_rejects_duplicates() {
        let f = Factor::from_values("size", &sizes());
        assert!(f.reorder(&["small", "small", "medium", "large"]).is_err());
    }

    #[test]
    fn test_groups() {
        let f = Factor::from_values("size", &sizes())
            .reorder(&["small", "medium", "large"])
            .unwrap();
        let groups = f.groups();
        assert_eq!(groups[0], ("small".to_string(), vec![0, 3]));
        assert_eq!(groups[2], ("large".to_string(), vec![1]));
    }

    #[test]
    fn test_display_ordered_uses_natural_order() {
        let ds = Dataset::from_csv_str("season\nwinter\nspring\nautumn\n").unwrap();
        let f = Factor::display_ordered(&ds, "season").unwrap();
        assert_eq!(f.levels(), ["spring", "summer", "autumn", "winter"]);
    }

    #[test]
    fn test_display_ordered_unknown_labels_stay_alphabetical() {
        let ds = Dataset::from_csv_str("season,mxPH\nWinter,8.0\nspring,NA\n").unwrap();
        let f = Factor::display_ordered(&ds, "season").unwrap();
        assert_eq!(f.levels(), ["Winter", "spring"]);
        assert_eq!(f.label(0), Some("Winter"));
    }
}
