//! Imputation of missing values.
//!
//! Every imputer takes a [`Dataset`](crate::dataset::Dataset) by reference
//! and returns a new one; the source table is never changed.

mod statistical;

pub use statistical::{CentralValue, Imputed, StatisticalImputer};
