// src/ingest/columns.rs
use std::collections::HashMap;

pub const TITLE_COLUMN_CANDIDATES: &[&str] = &["title", "headline"];
pub const TEXT_COLUMN_CANDIDATES: &[&str] = &["text", "content", "article"];
pub const DATE_COLUMN_CANDIDATES: &[&str] = &["date", "published_at", "publish_date", "timestamp"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedColumns {
    pub title: usize,
    pub text: usize,
    pub date: Option<usize>,
}

/// Case-insensitive lookup; the first candidate present wins.
/// Headers that collide after lowercasing resolve to the last one.
pub fn resolve_column<'a, I>(headers: I, candidates: &[&str]) -> Option<usize>
where
    I: IntoIterator<Item = &'a str>,
{
    let lowered: HashMap<String, usize> = headers
        .into_iter()
        .enumerate()
        .map(|(i, h)| (h.trim().to_lowercase(), i))
        .collect();
    candidates.iter().find_map(|c| lowered.get(*c).copied())
}

/// `None` when no title+text-compatible pair exists.
pub fn resolve_columns<'a, I>(headers: I) -> Option<ResolvedColumns>
where
    I: IntoIterator<Item = &'a str>,
{
    let headers: Vec<&str> = headers.into_iter().collect();
    let title = resolve_column(headers.iter().copied(), TITLE_COLUMN_CANDIDATES)?;
    let text = resolve_column(headers.iter().copied(), TEXT_COLUMN_CANDIDATES)?;
    let date = resolve_column(headers.iter().copied(), DATE_COLUMN_CANDIDATES);
    Some(ResolvedColumns { title, text, date })
}
