// src/ingest/types.rs
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A row as read from the tabular source, before normalization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRow {
    pub title: String,
    pub text: String,
    pub date: Option<String>,
}

impl RawRow {
    pub fn new(title: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            text: text.into(),
            date: None,
        }
    }

    pub fn dated(mut self, date: impl Into<String>) -> Self {
        self.date = Some(date.into());
        self
    }
}

/// Normalized article: `analysis_text` is never empty and unique per corpus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub title: String,
    pub text: String,
    pub analysis_text: String,
    /// Raw date cell, kept until the whole corpus is loaded.
    #[serde(skip)]
    pub raw_date: Option<String>,
    /// Leniently parsed date; `None` when absent or unparsable.
    pub date: Option<NaiveDateTime>,
}
