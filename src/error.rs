//! Error types for loading scheme inputs and writing reports
//!
//! The simulation itself never fails; only the file boundary does.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchemeError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unknown commission type: {0} (expected PerPeriodRate or FixedTotal)")]
    UnknownCommissionType(String),

    #[error("no schemes found in {}", .0.display())]
    EmptyInput(PathBuf),
}

pub type Result<T> = std::result::Result<T, SchemeError>;
