//! Plot-ready data.
//!
//! Every function here computes what a plot needs (bins, curves, quantiles,
//! whiskers, panels) and returns it as a serializable value. Drawing is left
//! to whatever consumes the JSON.

mod boxplot;
mod distribution;
mod scatter;

pub use boxplot::{
    BoxStats, GroupBox, GroupViolin, GroupedBox, GroupedViolin, box_stats, grouped_box,
    grouped_violin,
};
pub use distribution::{
    DensityCurve, Histogram, IndexPlot, QqPlot, ReferenceLine, density, histogram, index_plot,
    qq_normal,
};
pub use scatter::{AxisValue, Facet, FacetedScatter, ScatterPoint, faceted_scatter};

use crate::config::AnalysisConfig;
use crate::dataset::Dataset;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// All single-column plots of a numeric column, optionally grouped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnPlots {
    pub column: String,
    pub histogram: Histogram,
    pub qq: QqPlot,
    pub boxplot: BoxStats,
    pub index: IndexPlot,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grouped_box: Option<GroupedBox>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grouped_violin: Option<GroupedViolin>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub faceted_scatter: Option<FacetedScatter>,
}

impl ColumnPlots {
    /// Compute the plots of `column` with the resolution set in `config`.
    ///
    /// With `group`, box and violin plots per level of that categorical
    /// column are added.
    pub fn build(
        dataset: &Dataset,
        column: &str,
        group: Option<&str>,
        config: &AnalysisConfig,
    ) -> Result<Self> {
        let values = dataset.numeric_values(column)?;
        debug!("Building plots for '{}' ({} rows)", column, values.len());

        let mut histogram = histogram(&values, config.histogram_bins)?;
        if histogram.rug.len() >= 2 {
            histogram = histogram.with_density(config.density_points)?;
        }

        let (grouped_box, grouped_violin) = match group {
            Some(group) => (
                Some(grouped_box(dataset, column, group, config.boxplot_coef)?),
                Some(grouped_violin(dataset, column, group, config.density_points)?),
            ),
            None => (None, None),
        };

        Ok(Self {
            column: column.to_string(),
            histogram,
            qq: qq_normal(&values)?,
            boxplot: box_stats(&values, config.boxplot_coef)?,
            index: index_plot(&values)?,
            grouped_box,
            grouped_violin,
            faceted_scatter: None,
        })
    }

    /// Add a scatter of this column against `y`, one panel per interval of
    /// `facet` cut at `config.quantile_probs`.
    pub fn with_faceted_scatter(
        mut self,
        dataset: &Dataset,
        y: &str,
        facet: &str,
        config: &AnalysisConfig,
    ) -> Result<Self> {
        self.faceted_scatter = Some(faceted_scatter(
            dataset,
            &self.column,
            y,
            facet,
            &config.quantile_probs,
        )?);
        Ok(self)
    }
}
