//! Error taxonomy for the analysis core.
//!
//! Only fatal conditions live here. Degenerate data (a one-row corpus, no
//! valid dates, no posts) is not an error and yields empty/zero outputs.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalysisError {
    /// The tabular source is missing or has no usable title/text columns.
    #[error("ingestion failed: {0}")]
    Ingestion(#[from] IngestionError),

    /// An accessor was called before any analysis ran.
    #[error("No analysis found. Run /analyze first.")]
    NoAnalysis,

    /// The sentiment lexicon resource could not be initialized.
    #[error("sentiment analyzer unavailable: {0}")]
    Sentiment(String),
}

#[derive(Debug, Error)]
pub enum IngestionError {
    #[error("CSV file does not exist: {}", .0.display())]
    MissingSource(PathBuf),

    #[error("CSV must contain title and text-compatible columns.")]
    MissingColumns,

    #[error("unreadable CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T, E = AnalysisError> = std::result::Result<T, E>;
