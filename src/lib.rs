// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod api;
pub mod bot;
pub mod config;
pub mod digest;
pub mod error;
pub mod ingest;
pub mod metrics;
pub mod preprocess;
pub mod risk;
pub mod sentiment;
pub mod service;
pub mod temporal;

// Signal extraction (lexicons, TF-IDF, narrative repetition)
pub mod analyze;

// ---- Re-exports for stable public API ----
pub use crate::api::router;
pub use crate::error::{AnalysisError, IngestionError};
pub use crate::service::{AnalysisResult, AnalysisService, AnalyzeRequest, DISCLAIMER};
