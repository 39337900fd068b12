//! Algae Bloom Exploratory Analysis Library
//!
//! Exploratory data analysis of river water-quality samples and the algae
//! frequencies measured alongside them, built with Rust and Polars.
//!
//! # Overview
//!
//! - **Loading**: the training, evaluation-predictor and evaluation-target
//!   tables, with `NA` and `XXXXXXX` read as missing
//! - **Missing-Value Row Filter**: flag or drop rows whose share of missing
//!   cells reaches a threshold
//! - **Imputation**: mean, median and mode filling that never touches the
//!   source table
//! - **Profiling**: descriptive statistics, frequency tables, correlations
//! - **Plot Data**: histograms, densities, Q-Q, box/violin and faceted
//!   scatter plots as serializable values
//! - **Reporting**: the whole workflow collected into one JSON report
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use algae_eda::{AlgaeBundle, FilterMode, filter_sparse_rows};
//!
//! let bundle = AlgaeBundle::load_dir("data/")?;
//!
//! // Rows with at least 20% of their cells missing
//! let flagged = filter_sparse_rows(&bundle.training, 0.2, FilterMode::Indices)?
//!     .into_indices()
//!     .unwrap_or_default();
//! println!("Sparse rows: {:?}", flagged);
//!
//! // The same table without them
//! let cleaned = algae_eda::drop_sparse_rows(&bundle.training, 0.2)?;
//! println!("Kept {} of {} rows", cleaned.height(), bundle.training.height());
//! ```
//!
//! # Configuration
//!
//! Use [`AnalysisConfig`] to tune the analysis:
//!
//! ```rust,ignore
//! use algae_eda::AnalysisConfig;
//!
//! let config = AnalysisConfig::builder()
//!     .missing_row_threshold(0.2)         // Flag rows with >=20% missing
//!     .histogram_bins(12)                 // Instead of Sturges' rule
//!     .quantile_probs([0.0, 0.5, 1.0])    // Facet by halves
//!     .impute_median_columns(["Chla", "NH4"])
//!     .build()?;
//! ```
//!
//! # Immutability
//!
//! A [`Dataset`] is never modified in place. Filtering and imputation return
//! new datasets; level reordering ([`Factor`]) and binning ([`Discretized`])
//! return derived views.

pub mod config;
pub mod dataset;
pub mod discretize;
pub mod error;
pub mod factor;
pub mod imputers;
pub mod missing;
pub mod plots;
pub mod profiler;
pub mod reporting;
pub mod stats;
pub mod utils;

// Re-exports for convenient access
pub use config::{AnalysisConfig, AnalysisConfigBuilder, ConfigValidationError};
pub use dataset::{
    AlgaeBundle, AlgaeTable, Category, ColumnKind, Dataset, FlowSpeed, MISSING_MARKERS, RiverSize,
    Season,
};
pub use discretize::{Discretized, quantile_bins};
pub use error::{AnalysisError, Result as AnalysisResult, ResultExt};
pub use factor::{Factor, LevelCount};
pub use imputers::{CentralValue, Imputed, StatisticalImputer};
pub use missing::{
    FilterMode, FilterOutcome, RowMissingness, complete_cases, drop_incomplete_rows,
    drop_sparse_rows, filter_sparse_rows, flag_sparse_rows, missing_ratio, rows_with_missing,
    sparse_row_indices,
};
pub use plots::ColumnPlots;
pub use profiler::{
    CategoricalSummary, ColumnSummary, CorrelationMatrix, DataProfiler, DatasetSummary,
    NumericSummary,
};
pub use reporting::{AnalysisReport, ReportWriter};
