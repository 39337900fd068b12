//! Distribution plots of a single numeric column.

use crate::discretize::bin_of;
use crate::error::{AnalysisError, Result};
use crate::stats;
use crate::utils::observed;
use serde::{Deserialize, Serialize};

/// Equal-width histogram with rug marks and an optional density curve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Histogram {
    /// Bin boundaries; `edges.len() == counts.len() + 1`.
    pub edges: Vec<f64>,
    pub counts: Vec<usize>,
    /// Count divided by `n * width`, so the bars integrate to one.
    pub densities: Vec<f64>,
    /// Observed values, sorted.
    pub rug: Vec<f64>,
    /// Missing values left out.
    pub missing: usize,
    pub density: Option<DensityCurve>,
}

impl Histogram {
    /// Attach a gaussian kernel density curve of the same values.
    pub fn with_density(mut self, points: usize) -> Result<Self> {
        self.density = Some(density_of(&self.rug, points)?);
        Ok(self)
    }

    pub fn bin_width(&self) -> f64 {
        match (self.edges.first(), self.edges.get(1)) {
            (Some(a), Some(b)) => b - a,
            _ => 0.0,
        }
    }
}

/// Kernel density estimate on an evenly spaced grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DensityCurve {
    pub bandwidth: f64,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

/// Normal Q-Q plot data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QqPlot {
    /// Standard normal quantiles at the plotting positions.
    pub theoretical: Vec<f64>,
    /// Observed values, sorted.
    pub sample: Vec<f64>,
    /// Reference line through the first and third quartiles.
    pub line: ReferenceLine,
}

/// A straight line `y = intercept + slope * x`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReferenceLine {
    pub intercept: f64,
    pub slope: f64,
}

/// Values against their row position, with horizontal reference levels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexPlot {
    /// `(row, value)` for every observed value.
    pub points: Vec<(usize, f64)>,
    pub mean: f64,
    /// `mean - sd` and `mean + sd`; `None` with a single value.
    pub sd_band: Option<(f64, f64)>,
    pub median: f64,
}

/// Histogram of a numeric column.
///
/// Bins split `[min, max]` into equal widths, are right-closed and the
/// lowest bin is closed. Without `bins` the count follows Sturges' rule.
/// A constant column gets a unit-wide range centred on its value.
pub fn histogram(values: &[Option<f64>], bins: Option<usize>) -> Result<Histogram> {
    if bins == Some(0) {
        return Err(AnalysisError::invalid_argument(
            "a histogram needs at least one bin",
        ));
    }
    let rug = stats::sorted(&observed(values));
    let (Some(&lo), Some(&hi)) = (rug.first(), rug.last()) else {
        return Err(AnalysisError::InsufficientData(
            "no observed values to plot".to_string(),
        ));
    };
    let n = rug.len();
    let k = bins.unwrap_or_else(|| stats::sturges_bins(n));
    let (lo, hi) = if lo == hi { (lo - 0.5, hi + 0.5) } else { (lo, hi) };
    let width = (hi - lo) / k as f64;

    let mut edges: Vec<f64> = (0..k).map(|i| lo + i as f64 * width).collect();
    edges.push(hi);

    let mut counts = vec![0usize; k];
    for v in &rug {
        if let Some(bin) = bin_of(&edges, *v) {
            counts[bin] += 1;
        }
    }
    let densities = counts
        .iter()
        .map(|c| *c as f64 / (n as f64 * width))
        .collect();

    Ok(Histogram {
        edges,
        counts,
        densities,
        missing: values.len() - n,
        rug,
        density: None,
    })
}

/// Gaussian kernel density estimate of a numeric column.
///
/// The bandwidth follows Silverman's rule of thumb; the grid of `points`
/// positions runs from three bandwidths below the minimum to three above
/// the maximum.
pub fn density(values: &[Option<f64>], points: usize) -> Result<DensityCurve> {
    density_of(&observed(values), points)
}

fn density_of(present: &[f64], points: usize) -> Result<DensityCurve> {
    if points < 2 {
        return Err(AnalysisError::invalid_argument(format!(
            "a density curve needs at least 2 points, got {}",
            points
        )));
    }
    let bandwidth = stats::silverman_bandwidth(present).ok_or_else(|| {
        AnalysisError::InsufficientData(format!(
            "a density estimate needs at least 2 observed values, got {}",
            present.len()
        ))
    })?;
    let sorted = stats::sorted(present);
    let (Some(&lo), Some(&hi)) = (sorted.first(), sorted.last()) else {
        return Err(AnalysisError::InsufficientData(
            "no observed values to plot".to_string(),
        ));
    };
    let from = lo - 3.0 * bandwidth;
    let to = hi + 3.0 * bandwidth;
    let step = (to - from) / (points - 1) as f64;

    let x: Vec<f64> = (0..points).map(|i| from + i as f64 * step).collect();
    let y = x
        .iter()
        .map(|x| stats::gaussian_kde(&sorted, bandwidth, *x))
        .collect();

    Ok(DensityCurve { bandwidth, x, y })
}

/// Normal Q-Q plot data of a numeric column.
pub fn qq_normal(values: &[Option<f64>]) -> Result<QqPlot> {
    let sample = stats::sorted(&observed(values));
    let n = sample.len();
    if n == 0 {
        return Err(AnalysisError::InsufficientData(
            "no observed values to plot".to_string(),
        ));
    }

    let a = if n <= 10 { 3.0 / 8.0 } else { 0.5 };
    let theoretical = (1..=n)
        .map(|i| stats::qnorm((i as f64 - a) / (n as f64 + 1.0 - 2.0 * a)))
        .collect();

    let (x1, x3) = (stats::qnorm(0.25), stats::qnorm(0.75));
    let y1 = stats::quantile_sorted(&sample, 0.25).unwrap_or(sample[0]);
    let y3 = stats::quantile_sorted(&sample, 0.75).unwrap_or(sample[0]);
    let slope = (y3 - y1) / (x3 - x1);

    Ok(QqPlot {
        theoretical,
        sample,
        line: ReferenceLine {
            intercept: y1 - slope * x1,
            slope,
        },
    })
}

/// Values against their row index with mean, mean ± sd and median levels.
///
/// Missing rows are skipped but keep their index, so gaps stay visible.
pub fn index_plot(values: &[Option<f64>]) -> Result<IndexPlot> {
    let points: Vec<(usize, f64)> = values
        .iter()
        .enumerate()
        .filter_map(|(i, v)| v.filter(|v| v.is_finite()).map(|v| (i, v)))
        .collect();
    let present: Vec<f64> = points.iter().map(|(_, v)| *v).collect();

    let (Some(mean), Some(median)) = (stats::mean(&present), stats::median(&present)) else {
        return Err(AnalysisError::InsufficientData(
            "no observed values to plot".to_string(),
        ));
    };
    let sd_band = stats::std_dev(&present).map(|sd| (mean - sd, mean + sd));

    Ok(IndexPlot {
        points,
        mean,
        sd_band,
        median,
    })
}
