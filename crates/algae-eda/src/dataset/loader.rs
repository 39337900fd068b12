//! Loading the algae tables from CSV files.

use super::{AlgaeTable, Dataset};
use crate::error::{AnalysisError, Result, ResultExt};
use polars::io::csv::read::CsvReadOptions;
use polars::prelude::*;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Cell contents read as missing.
pub const MISSING_MARKERS: [&str; 2] = ["NA", "XXXXXXX"];

/// Training table: predictors and targets.
pub const TRAINING_FILE: &str = "analysis.csv";
/// Evaluation predictors.
pub const EVAL_PREDICTORS_FILE: &str = "eval_predictors.csv";
/// Evaluation targets, row-aligned with the predictors.
pub const EVAL_TARGETS_FILE: &str = "eval_targets.csv";

fn read_options() -> CsvReadOptions {
    let null_values = NullValues::AllColumns(MISSING_MARKERS.iter().map(|m| (*m).into()).collect());
    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(1000))
        .with_parse_options(
            CsvParseOptions::default()
                .with_quote_char(Some(b'"'))
                .with_null_values(Some(null_values)),
        )
}

fn read_frame(path: &Path) -> Result<DataFrame> {
    if !path.exists() {
        return Err(AnalysisError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("{} not found", path.display()),
        )));
    }
    read_options()
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()
        .context(format!("reading {}", path.display()))
}

impl Dataset {
    /// Load any CSV file; column kinds are inferred from the parsed dtypes.
    pub fn from_csv(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let frame = read_frame(path)?;
        debug!("Loaded {} with shape {:?}", path.display(), frame.shape());
        Self::from_frame(frame)
    }

    /// Load one of the algae tables from a CSV file.
    pub fn algae_from_csv(path: impl AsRef<Path>, table: AlgaeTable) -> Result<Self> {
        let path = path.as_ref();
        let frame = read_frame(path)?;
        Self::algae(frame, table).context(format!("validating {}", path.display()))
    }

    /// Parse CSV text held in memory.
    pub fn from_csv_str(content: &str) -> Result<Self> {
        let frame = read_options()
            .into_reader_with_file_handle(Cursor::new(content.to_string()))
            .finish()?;
        Self::from_frame(frame)
    }
}

/// The three related algae tables.
#[derive(Debug, Clone)]
pub struct AlgaeBundle {
    /// Directory the tables were read from.
    pub source_dir: PathBuf,
    /// Training table with predictors and targets.
    pub training: Dataset,
    /// Evaluation predictors, if present.
    pub eval_predictors: Option<Dataset>,
    /// Evaluation targets, if present.
    pub eval_targets: Option<Dataset>,
}

impl AlgaeBundle {
    /// Load the bundle from a directory.
    ///
    /// The training table is required. The evaluation tables are optional
    /// but must come as a pair with equal row counts.
    pub fn load_dir(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        info!("Loading algae tables from {}", dir.display());

        let training = Dataset::algae_from_csv(dir.join(TRAINING_FILE), AlgaeTable::Training)?;

        let predictors_path = dir.join(EVAL_PREDICTORS_FILE);
        let targets_path = dir.join(EVAL_TARGETS_FILE);
        let (eval_predictors, eval_targets) = match (predictors_path.exists(), targets_path.exists()) {
            (false, false) => (None, None),
            (true, true) => {
                let predictors = Dataset::algae_from_csv(&predictors_path, AlgaeTable::EvalPredictors)?;
                let targets = Dataset::algae_from_csv(&targets_path, AlgaeTable::EvalTargets)?;
                if predictors.height() != targets.height() {
                    return Err(AnalysisError::invalid_argument(format!(
                        "evaluation tables are not aligned: {} predictor rows, {} target rows",
                        predictors.height(),
                        targets.height()
                    )));
                }
                (Some(predictors), Some(targets))
            }
            (true, false) => {
                return Err(AnalysisError::invalid_argument(format!(
                    "{} present without {}",
                    EVAL_PREDICTORS_FILE, EVAL_TARGETS_FILE
                )));
            }
            (false, true) => {
                return Err(AnalysisError::invalid_argument(format!(
                    "{} present without {}",
                    EVAL_TARGETS_FILE, EVAL_PREDICTORS_FILE
                )));
            }
        };

        info!(
            "Training table: {} rows x {} columns{}",
            training.height(),
            training.width(),
            eval_predictors
                .as_ref()
                .map(|p| format!(", evaluation rows: {}", p.height()))
                .unwrap_or_default()
        );

        Ok(Self {
            source_dir: dir.to_path_buf(),
            training,
            eval_predictors,
            eval_targets,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::ColumnKind;

    #[test]
    fn test_from_csv_str_reads_missing_markers() {
        let csv = "site,depth,NH4\nA,1.5,XXXXXXX\nB,NA,12.0\nC,2.0,3.5\n";
        let ds = Dataset::from_csv_str(csv).unwrap();

        assert_eq!(ds.shape(), (3, 3));
        assert_eq!(ds.kind("site"), Some(ColumnKind::Categorical));
        assert_eq!(
            ds.numeric_values("NH4").unwrap(),
            vec![None, Some(12.0), Some(3.5)]
        );
        assert_eq!(ds.numeric_values("depth").unwrap()[1], None);
    }

    #[test]
    fn test_all_missing_column_is_numeric() {
        let ds = Dataset::from_csv_str("x,y\n1,NA\n2,NA\n").unwrap();
        assert_eq!(ds.kind("y"), Some(ColumnKind::Numeric));
        assert_eq!(ds.numeric_values("y").unwrap(), vec![None, None]);

        let err = crate::imputers::StatisticalImputer::apply_numeric_mean(&ds, "y").unwrap_err();
        assert_eq!(err.error_code(), "NO_VALID_VALUES");
    }

    #[test]
    fn test_all_missing_season_stays_categorical() {
        let ds = Dataset::from_csv_str("season,x\nNA,1\nNA,2\n").unwrap();
        assert_eq!(ds.kind("season"), Some(ColumnKind::Categorical));
    }

    #[test]
    fn test_from_csv_missing_file() {
        let err = Dataset::from_csv("/definitely/not/here.csv").unwrap_err();
        assert_eq!(err.error_code(), "IO_ERROR");
    }
}
