use crate::config::AnalysisConfig;
use crate::dataset::{AlgaeBundle, Dataset};
use crate::error::{AnalysisError, Result, ResultExt};
use crate::imputers::{CentralValue, StatisticalImputer};
use crate::missing;
use crate::profiler::{CorrelationMatrix, DataProfiler, DatasetSummary};
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

// ============================================================================
// Report Types
// ============================================================================

/// Full exploratory analysis of the training table.
///
/// Use this for both JSON output (`--json`) and file writing
/// (`--emit-report`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// Timestamp when the report was generated
    pub generated_at: String,
    /// Where the data came from, if known
    pub source: Option<String>,
    /// Shape of the analysed table (rows, columns)
    pub shape: (usize, usize),
    /// Shapes of every table that was loaded
    pub tables: Vec<TableShape>,
    /// Descriptive statistics and frequency tables
    pub summary: DatasetSummary,
    /// Correlations of the numeric columns, if enough complete rows exist
    pub correlations: Option<CorrelationMatrix>,
    /// Effect of each missing-value strategy
    pub missing_values: MissingStrategyComparison,
    /// Non-fatal problems met while building the report
    pub warnings: Vec<String>,
}

/// Shape of one loaded table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableShape {
    pub name: String,
    pub rows: usize,
    pub columns: usize,
    pub missing_cells: usize,
}

/// What each way of handling missing values would do to the table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MissingStrategyComparison {
    /// Missing cells in the table
    pub missing_cells: usize,
    /// Rows with at least one missing cell
    pub incomplete_rows: Vec<usize>,
    /// Rows left after dropping every incomplete row
    pub rows_after_deletion: usize,
    /// Threshold used by the sparse-row filter
    pub threshold: f64,
    /// Rows whose missing ratio is at or above `threshold`
    pub sparse_rows: Vec<usize>,
    /// Rows left after the sparse-row filter
    pub rows_after_filter: usize,
    /// Fill values for the configured columns
    pub imputations: Vec<ImputationPreview>,
}

/// Fill value a statistic would write into a column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImputationPreview {
    pub column: String,
    pub method: CentralValue,
    pub fill_value: f64,
    /// Missing cells that would be filled
    pub filled: usize,
}

// ============================================================================
// Report Construction
// ============================================================================

impl AnalysisReport {
    /// Run the exploratory workflow on a single table.
    pub fn build(dataset: &Dataset, config: &AnalysisConfig) -> Result<Self> {
        config.validate()?;
        let mut warnings = Vec::new();

        debug!("Summarizing {:?} table", dataset.shape());
        let summary = DataProfiler::summarize(dataset).context("Failed to summarize dataset")?;

        let numeric = dataset.numeric_columns();
        let correlations = if numeric.len() >= 2 {
            match DataProfiler::correlation_matrix(dataset, &numeric) {
                Ok(matrix) => Some(matrix),
                Err(AnalysisError::InsufficientData(msg)) => {
                    warn!("Skipping correlations: {}", msg);
                    warnings.push(format!("Correlations skipped: {}", msg));
                    None
                }
                Err(e) => return Err(e),
            }
        } else {
            None
        };

        let missing_values = compare_missing_strategies(dataset, config, &mut warnings)?;

        Ok(Self {
            generated_at: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            source: None,
            shape: dataset.shape(),
            tables: vec![TableShape::of("dataset", dataset)],
            summary,
            correlations,
            missing_values,
            warnings,
        })
    }

    /// Run the workflow on the training table of a bundle and record the
    /// shapes of the evaluation tables.
    pub fn from_bundle(bundle: &AlgaeBundle, config: &AnalysisConfig) -> Result<Self> {
        let mut report = Self::build(&bundle.training, config)?;
        report.source = Some(bundle.source_dir.display().to_string());

        report.tables = vec![TableShape::of("training", &bundle.training)];
        if let Some(predictors) = &bundle.eval_predictors {
            report.tables.push(TableShape::of("eval_predictors", predictors));
        }
        if let Some(targets) = &bundle.eval_targets {
            report.tables.push(TableShape::of("eval_targets", targets));
        }
        Ok(report)
    }

    /// Set the data source shown in the report.
    pub fn with_source(mut self, source: impl AsRef<Path>) -> Self {
        self.source = Some(source.as_ref().display().to_string());
        self
    }
}

impl TableShape {
    fn of(name: &str, dataset: &Dataset) -> Self {
        Self {
            name: name.to_string(),
            rows: dataset.height(),
            columns: dataset.width(),
            missing_cells: dataset.missing_cells(),
        }
    }
}

fn compare_missing_strategies(
    dataset: &Dataset,
    config: &AnalysisConfig,
    warnings: &mut Vec<String>,
) -> Result<MissingStrategyComparison> {
    let incomplete_rows = missing::rows_with_missing(dataset)?;
    let sparse_rows = missing::sparse_row_indices(dataset, config.missing_row_threshold)?;

    let requested = config
        .impute_mean_columns
        .iter()
        .map(|c| (c, CentralValue::Mean))
        .chain(
            config
                .impute_median_columns
                .iter()
                .map(|c| (c, CentralValue::Median)),
        );

    let mut imputations = Vec::new();
    for (column, method) in requested {
        match StatisticalImputer::impute_column(dataset, column, method) {
            Ok(imputed) => imputations.push(ImputationPreview {
                column: imputed.column,
                method,
                fill_value: imputed.fill_value,
                filled: imputed.filled,
            }),
            Err(e @ (AnalysisError::ColumnNotFound(_)
            | AnalysisError::NotNumeric(_)
            | AnalysisError::NoValidValues(_))) => {
                warn!("Skipping {} imputation of '{}': {}", method, column, e);
                warnings.push(format!("{} imputation of '{}' skipped: {}", method, column, e));
            }
            Err(e) => return Err(e),
        }
    }

    Ok(MissingStrategyComparison {
        missing_cells: dataset.missing_cells(),
        rows_after_deletion: dataset.height() - incomplete_rows.len(),
        incomplete_rows,
        threshold: config.missing_row_threshold,
        rows_after_filter: dataset.height() - sparse_rows.len(),
        sparse_rows,
        imputations,
    })
}

// ============================================================================
// Report Output
// ============================================================================

/// Writes reports into an output directory.
pub struct ReportWriter {
    output_dir: PathBuf,
}

impl Default for ReportWriter {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("output"),
        }
    }
}

impl ReportWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Writer for the output directory named in `config`.
    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self::new(config.output_dir.clone())
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Write a report to a JSON file.
    ///
    /// The report is written to the output directory with the specified base name.
    /// For example, if `report_base_name` is "analysis", the file will be
    /// "analysis_report.json".
    pub fn write_report_to_file(
        &self,
        report: &AnalysisReport,
        report_base_name: &str,
    ) -> Result<PathBuf> {
        fs::create_dir_all(&self.output_dir)
            .map_err(AnalysisError::from)
            .context(format!("Failed to create {}", self.output_dir.display()))?;

        let report_path = self
            .output_dir
            .join(format!("{}_report.json", report_base_name));
        let mut file = File::create(&report_path)?;
        file.write_all(serde_json::to_string_pretty(report)?.as_bytes())?;

        info!("Report saved: {}", report_path.display());

        Ok(report_path)
    }
}
