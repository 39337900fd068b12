//! Configuration for the analysis workflow.
//!
//! This module provides configuration options using the builder pattern,
//! mirroring the knobs of the exploratory workflow: the sparse-row threshold,
//! plot resolution, quantile cut points and which columns get imputed.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default cut points for quantile discretization (quartiles).
pub const DEFAULT_QUANTILE_PROBS: [f64; 5] = [0.0, 0.25, 0.5, 0.75, 1.0];

/// Configuration for the analysis workflow.
///
/// Use [`AnalysisConfig::builder()`] to create a new configuration
/// with fluent API.
///
/// # Example
///
/// ```rust,ignore
/// use algae_eda::config::AnalysisConfig;
///
/// let config = AnalysisConfig::builder()
///     .missing_row_threshold(0.2)
///     .density_points(256)
///     .build()?;
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Rows whose fraction of missing cells is at or above this value are
    /// flagged as too sparse to keep (0.0 - 1.0).
    /// Default: 0.2 (20%)
    pub missing_row_threshold: f64,

    /// Number of histogram bins. `None` selects Sturges' rule.
    /// Default: None
    pub histogram_bins: Option<usize>,

    /// Number of grid points for kernel density curves.
    /// Default: 512
    pub density_points: usize,

    /// Probabilities used as cut points for quantile discretization.
    /// Default: [0.0, 0.25, 0.5, 0.75, 1.0]
    pub quantile_probs: Vec<f64>,

    /// Whisker length for box plots, as a multiple of the IQR.
    /// Default: 1.5
    pub boxplot_coef: f64,

    /// Numeric columns filled with their mean in the workflow report.
    /// Default: ["mxPH"]
    pub impute_mean_columns: Vec<String>,

    /// Numeric columns filled with their median in the workflow report.
    /// Default: ["Chla"]
    pub impute_median_columns: Vec<String>,

    /// Output directory for written reports.
    /// Default: "output"
    pub output_dir: PathBuf,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            missing_row_threshold: 0.2,
            histogram_bins: None,
            density_points: 512,
            quantile_probs: DEFAULT_QUANTILE_PROBS.to_vec(),
            boxplot_coef: 1.5,
            impute_mean_columns: vec!["mxPH".to_string()],
            impute_median_columns: vec!["Chla".to_string()],
            output_dir: PathBuf::from("output"),
        }
    }
}

impl AnalysisConfig {
    /// Create a new configuration builder.
    pub fn builder() -> AnalysisConfigBuilder {
        AnalysisConfigBuilder::default()
    }

    /// Load and validate a configuration from a JSON file.
    ///
    /// Missing fields fall back to their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: AnalysisConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if !(0.0..=1.0).contains(&self.missing_row_threshold) {
            return Err(ConfigValidationError::InvalidThreshold {
                field: "missing_row_threshold".to_string(),
                value: self.missing_row_threshold,
            });
        }

        if self.histogram_bins == Some(0) {
            return Err(ConfigValidationError::InvalidHistogramBins);
        }

        if self.density_points < 2 {
            return Err(ConfigValidationError::InvalidDensityPoints(
                self.density_points,
            ));
        }

        crate::discretize::validate_probs(&self.quantile_probs)?;

        if !self.boxplot_coef.is_finite() || self.boxplot_coef < 0.0 {
            return Err(ConfigValidationError::InvalidBoxplotCoef(self.boxplot_coef));
        }

        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid threshold for '{field}': {value} (must be between 0.0 and 1.0)")]
    InvalidThreshold { field: String, value: f64 },

    #[error("Invalid histogram bins: must be at least 1")]
    InvalidHistogramBins,

    #[error("Invalid density points: {0} (must be at least 2)")]
    InvalidDensityPoints(usize),

    #[error("Invalid quantile cut points: {0}")]
    InvalidQuantileProbs(String),

    #[error("Invalid box plot coefficient: {0} (must be a non-negative number)")]
    InvalidBoxplotCoef(f64),
}

/// Builder for [`AnalysisConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct AnalysisConfigBuilder {
    missing_row_threshold: Option<f64>,
    histogram_bins: Option<usize>,
    density_points: Option<usize>,
    quantile_probs: Option<Vec<f64>>,
    boxplot_coef: Option<f64>,
    impute_mean_columns: Option<Vec<String>>,
    impute_median_columns: Option<Vec<String>>,
    output_dir: Option<PathBuf>,
}

impl AnalysisConfigBuilder {
    /// Set the sparse-row threshold.
    ///
    /// # Arguments
    /// * `threshold` - Value between 0.0 and 1.0 (e.g., 0.2 = 20% of cells missing)
    pub fn missing_row_threshold(mut self, threshold: f64) -> Self {
        self.missing_row_threshold = Some(threshold);
        self
    }

    /// Set a fixed number of histogram bins.
    pub fn histogram_bins(mut self, bins: usize) -> Self {
        self.histogram_bins = Some(bins);
        self
    }

    /// Set the number of grid points for density curves.
    pub fn density_points(mut self, points: usize) -> Self {
        self.density_points = Some(points);
        self
    }

    /// Set the quantile cut points used for discretization.
    pub fn quantile_probs(mut self, probs: impl Into<Vec<f64>>) -> Self {
        self.quantile_probs = Some(probs.into());
        self
    }

    /// Set the box plot whisker coefficient.
    pub fn boxplot_coef(mut self, coef: f64) -> Self {
        self.boxplot_coef = Some(coef);
        self
    }

    /// Set the columns filled with their mean.
    pub fn impute_mean_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.impute_mean_columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    /// Set the columns filled with their median.
    pub fn impute_median_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.impute_median_columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    /// Set the output directory for reports.
    pub fn output_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(path.into());
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `AnalysisConfig` or an error if validation fails.
    pub fn build(self) -> Result<AnalysisConfig, ConfigValidationError> {
        let defaults = AnalysisConfig::default();
        let config = AnalysisConfig {
            missing_row_threshold: self
                .missing_row_threshold
                .unwrap_or(defaults.missing_row_threshold),
            histogram_bins: self.histogram_bins.or(defaults.histogram_bins),
            density_points: self.density_points.unwrap_or(defaults.density_points),
            quantile_probs: self.quantile_probs.unwrap_or(defaults.quantile_probs),
            boxplot_coef: self.boxplot_coef.unwrap_or(defaults.boxplot_coef),
            impute_mean_columns: self
                .impute_mean_columns
                .unwrap_or(defaults.impute_mean_columns),
            impute_median_columns: self
                .impute_median_columns
                .unwrap_or(defaults.impute_median_columns),
            output_dir: self.output_dir.unwrap_or(defaults.output_dir),
        };

        config.validate()?;
        Ok(config)
    }
}
