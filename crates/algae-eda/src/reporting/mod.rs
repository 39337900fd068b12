//! Report generation module.
//!
//! [`AnalysisReport`] collects the whole exploratory workflow in one
//! serializable value, suitable for:
//! - JSON output to stdout (`--json` CLI flag)
//! - JSON file output (`--emit-report` CLI flag)
//! - Programmatic access in library mode
//!
//! # Example
//!
//! ```rust,ignore
//! use algae_eda::{AlgaeBundle, AnalysisConfig, AnalysisReport, ReportWriter};
//!
//! let bundle = AlgaeBundle::load_dir("data/")?;
//! let config = AnalysisConfig::default();
//! let report = AnalysisReport::from_bundle(&bundle, &config)?;
//!
//! // Print as JSON
//! println!("{}", serde_json::to_string_pretty(&report)?);
//!
//! // Or write to file
//! ReportWriter::from_config(&config).write_report_to_file(&report, "analysis")?;
//! ```

mod generator;

pub use generator::{
    AnalysisReport, ImputationPreview, MissingStrategyComparison, ReportWriter, TableShape,
};
