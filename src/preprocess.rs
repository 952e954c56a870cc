//! # Text Cleaner
//! Strips URLs, mentions, hashtags, emoji and punctuation, then case-folds
//! and collapses whitespace. Original fields are carried through untouched.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::ingest::types::Record;

static RE_URL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)https?://\S+|www\.\S+").expect("url regex"));
static RE_MENTION: Lazy<Regex> = Lazy::new(|| Regex::new(r"@\w+").expect("mention regex"));
static RE_HASHTAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"#\w+").expect("hashtag regex"));
static RE_EMOJI: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[\x{1F600}-\x{1F64F}\x{1F300}-\x{1F5FF}\x{1F680}-\x{1F6FF}\x{1F1E0}-\x{1F1FF}]+")
        .expect("emoji regex")
});
static RE_SPECIAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-zA-Z0-9\s]").expect("special char regex"));
static RE_WS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("whitespace regex"));

/// A record after cleaning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleanedRecord {
    #[serde(flatten)]
    pub record: Record,
    pub cleaned_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tokens: Option<Vec<String>>,
}

pub fn clean_text(input: &str) -> String {
    let s = RE_URL.replace_all(input, " ");
    let s = RE_MENTION.replace_all(&s, " ");
    let s = RE_HASHTAG.replace_all(&s, " ");
    let s = RE_EMOJI.replace_all(&s, " ");
    let s = RE_SPECIAL.replace_all(&s, " ");
    let s = s.to_lowercase();
    RE_WS.replace_all(&s, " ").trim().to_string()
}

/// Whitespace split of already-cleaned text.
pub fn tokenize(cleaned: &str) -> Vec<String> {
    cleaned.split_whitespace().map(str::to_string).collect()
}

pub fn preprocess(records: &[Record], with_tokens: bool) -> Vec<CleanedRecord> {
    records
        .iter()
        .map(|r| {
            let cleaned_text = clean_text(&r.analysis_text);
            let tokens = with_tokens.then(|| tokenize(&cleaned_text));
            CleanedRecord {
                record: r.clone(),
                cleaned_text,
                tokens,
            }
        })
        .collect()
}
