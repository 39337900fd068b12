//! Scatter and strip plots faceted by a discretized numeric column.

use crate::dataset::{ColumnKind, Dataset};
use crate::discretize::quantile_bins;
use crate::error::{AnalysisError, Result};
use crate::factor::Factor;
use serde::{Deserialize, Serialize};

/// Vertical position of a point: a number, or a level for strip plots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AxisValue {
    Number(f64),
    Level(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScatterPoint {
    /// Row of the point in the source dataset.
    pub row: usize,
    pub x: f64,
    pub y: AxisValue,
}

/// Points of one facet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Facet {
    /// Interval label of the facet, e.g. `(7.1,9.8]`.
    pub label: String,
    pub points: Vec<ScatterPoint>,
}

/// Scatter plot split into panels by the quantile interval of a third
/// column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacetedScatter {
    pub x: String,
    pub y: String,
    pub facet: String,
    pub facets: Vec<Facet>,
    /// Rows left out because `x`, `y` or `facet` is missing.
    pub dropped: usize,
}

/// Points of `x` against `y`, one panel per quantile interval of `facet`.
///
/// `x` and `facet` must be numeric; `y` may be numeric or categorical (a
/// strip plot, levels in display order). The intervals are computed for
/// this plot only and are not added to the dataset.
pub fn faceted_scatter(
    dataset: &Dataset,
    x: &str,
    y: &str,
    facet: &str,
    probs: &[f64],
) -> Result<FacetedScatter> {
    let xs = dataset.numeric_values(x)?;
    let bins = quantile_bins(&dataset.numeric_values(facet)?, probs)
        .map_err(|e| e.with_context(format!("Failed to discretize '{}'", facet)))?;
    let ys: Vec<Option<AxisValue>> = match dataset.kind(y) {
        Some(ColumnKind::Numeric) => dataset
            .numeric_values(y)?
            .into_iter()
            .map(|v| v.map(AxisValue::Number))
            .collect(),
        Some(ColumnKind::Categorical) => {
            let factor = Factor::display_ordered(dataset, y)?;
            (0..dataset.height())
                .map(|row| factor.label(row).map(|l| AxisValue::Level(l.to_string())))
                .collect()
        }
        Some(ColumnKind::Other) => return Err(AnalysisError::NotNumeric(y.to_string())),
        None => return Err(AnalysisError::ColumnNotFound(y.to_string())),
    };

    let mut facets: Vec<Facet> = bins
        .labels
        .iter()
        .map(|label| Facet {
            label: label.clone(),
            points: Vec::new(),
        })
        .collect();
    let mut dropped = 0;

    for (row, ((xv, yv), code)) in xs.into_iter().zip(ys).zip(&bins.codes).enumerate() {
        match (xv.filter(|v| v.is_finite()), yv, code) {
            (Some(x), Some(y), Some(code)) => {
                facets[*code].points.push(ScatterPoint { row, x, y });
            }
            _ => dropped += 1,
        }
    }

    Ok(FacetedScatter {
        x: x.to_string(),
        y: y.to_string(),
        facet: facet.to_string(),
        facets,
        dropped,
    })
}
