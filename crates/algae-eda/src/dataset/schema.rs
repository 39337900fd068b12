//! Column layout and categorical level sets of the algae dataset.

use crate::error::{AnalysisError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Categorical sample attributes.
pub const CATEGORICAL_COLUMNS: [&str; 3] = ["season", "size", "speed"];

/// Chemical parameters measured on each water sample.
pub const CHEMICAL_COLUMNS: [&str; 8] = ["mxPH", "mnO2", "Cl", "NO3", "NH4", "oPO4", "PO4", "Chla"];

/// Abundance of the seven algae species.
pub const TARGET_COLUMNS: [&str; 7] = ["a1", "a2", "a3", "a4", "a5", "a6", "a7"];

/// Which of the three bundled tables a frame represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlgaeTable {
    /// Predictors and targets combined.
    Training,
    /// Predictors only.
    EvalPredictors,
    /// Targets only.
    EvalTargets,
}

impl AlgaeTable {
    /// Columns the table must contain, in canonical order.
    pub fn expected_columns(self) -> Vec<&'static str> {
        match self {
            AlgaeTable::Training => CATEGORICAL_COLUMNS
                .iter()
                .chain(CHEMICAL_COLUMNS.iter())
                .chain(TARGET_COLUMNS.iter())
                .copied()
                .collect(),
            AlgaeTable::EvalPredictors => CATEGORICAL_COLUMNS
                .iter()
                .chain(CHEMICAL_COLUMNS.iter())
                .copied()
                .collect(),
            AlgaeTable::EvalTargets => TARGET_COLUMNS.to_vec(),
        }
    }
}

/// A categorical attribute with a fixed level set and a natural display order.
pub trait Category: Sized + Copy + 'static + FromStr<Err = AnalysisError> {
    /// Column holding this attribute.
    const COLUMN: &'static str;
    /// Every level, in display order.
    const LEVELS: &'static [Self];

    fn as_str(self) -> &'static str;

    /// Level labels in display order.
    fn display_order() -> Vec<&'static str> {
        Self::LEVELS.iter().map(|l| l.as_str()).collect()
    }
}

fn parse_level<C: Category>(value: &str) -> Result<C> {
    let needle = value.trim();
    C::LEVELS
        .iter()
        .copied()
        .find(|l| l.as_str().eq_ignore_ascii_case(needle))
        .ok_or_else(|| AnalysisError::InvalidCategory {
            column: C::COLUMN.to_string(),
            value: value.to_string(),
            expected: C::display_order().join(", "),
        })
}

macro_rules! category_enum {
    ($name:ident, $column:literal, [$($variant:ident => $label:literal),+ $(,)?]) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(rename_all = "lowercase")]
        pub enum $name {
            $($variant),+
        }

        impl Category for $name {
            const COLUMN: &'static str = $column;
            const LEVELS: &'static [Self] = &[$($name::$variant),+];

            fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }
        }

        impl FromStr for $name {
            type Err = AnalysisError;

            fn from_str(s: &str) -> Result<Self> {
                parse_level(s)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

category_enum!(Season, "season", [
    Spring => "spring",
    Summer => "summer",
    Autumn => "autumn",
    Winter => "winter",
]);

category_enum!(RiverSize, "size", [
    Small => "small",
    Medium => "medium",
    Large => "large",
]);

category_enum!(FlowSpeed, "speed", [
    Low => "low",
    Medium => "medium",
    High => "high",
]);

/// Display order for a known categorical column, `None` for other columns.
pub fn display_order_for(column: &str) -> Option<Vec<&'static str>> {
    match column {
        c if c == Season::COLUMN => Some(Season::display_order()),
        c if c == RiverSize::COLUMN => Some(RiverSize::display_order()),
        c if c == FlowSpeed::COLUMN => Some(FlowSpeed::display_order()),
        _ => None,
    }
}
