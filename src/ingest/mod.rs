// src/ingest/mod.rs
pub mod columns;
pub mod dates;
pub mod types;

use crate::error::IngestionError;
use crate::ingest::columns::{resolve_columns, ResolvedColumns};
use crate::ingest::types::{RawRow, Record};
use metrics::{counter, describe_counter};
use once_cell::sync::{Lazy, OnceCell};
use regex::Regex;
use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

static RE_WS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("whitespace regex"));

/// Cell values the CSV layer treats as missing (read back as empty strings).
const NA_VALUES: &[&str] = &[
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// One-time metrics registration (so series show up on /metrics).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("ingest_rows_total", "Rows read from tabular sources.");
        describe_counter!(
            "ingest_dropped_empty_total",
            "Rows dropped because title+text was empty."
        );
        describe_counter!(
            "ingest_duplicates_total",
            "Rows dropped as exact analysis_text duplicates."
        );
    });
}

/// Concatenate title and text, collapse whitespace, trim.
pub fn build_analysis_text(title: &str, text: &str) -> String {
    let joined = format!("{title} {text}");
    RE_WS.replace_all(&joined, " ").trim().to_string()
}

fn fill_missing(cell: Option<&str>) -> String {
    match cell {
        Some(v) if !NA_VALUES.contains(&v) => v.to_string(),
        _ => String::new(),
    }
}

/// Normalize one chunk of raw rows; rows with empty analysis text are dropped.
pub fn process_chunk(rows: Vec<RawRow>) -> Vec<Record> {
    rows.into_iter()
        .filter_map(|row| {
            let analysis_text = build_analysis_text(&row.title, &row.text);
            if analysis_text.is_empty() {
                return None;
            }
            Some(Record {
                title: row.title,
                text: row.text,
                analysis_text,
                raw_date: row.date,
                date: None,
            })
        })
        .collect()
}

/// Keep the first occurrence of each exact `analysis_text`.
/// Returns the kept rows and the number removed.
pub fn dedup_records(records: Vec<Record>) -> (Vec<Record>, usize) {
    let mut seen: HashSet<String> = HashSet::with_capacity(records.len());
    let mut keep = Vec::with_capacity(records.len());
    let mut removed = 0usize;
    for r in records {
        if !seen.insert(r.analysis_text.clone()) {
            removed += 1;
            continue;
        }
        keep.push(r);
    }
    (keep, removed)
}

/// Final corpus-level pass: dedup, then parse dates leniently.
pub fn finalize(records: Vec<Record>) -> Vec<Record> {
    ensure_metrics_described();
    let (mut kept, removed) = dedup_records(records);
    counter!("ingest_duplicates_total").increment(removed as u64);
    for r in kept.iter_mut() {
        r.date = r.raw_date.as_deref().and_then(dates::parse_lenient_local);
    }
    debug!(kept = kept.len(), duplicates = removed, "ingest finalized");
    kept
}

/// Normalize an already-loaded table (no chunking needed).
pub fn normalize_rows(rows: Vec<RawRow>) -> Vec<Record> {
    ensure_metrics_described();
    let total = rows.len();
    let processed = process_chunk(rows);
    counter!("ingest_rows_total").increment(total as u64);
    counter!("ingest_dropped_empty_total").increment((total - processed.len()) as u64);
    finalize(processed)
}

/// Load and normalize a CSV dataset from disk.
///
/// `chunk_size` of `None`/`Some(0)` reads everything before processing;
/// otherwise rows are processed in bounded chunks and concatenated.
pub fn load_dataset<P: AsRef<Path>>(
    path: P,
    chunk_size: Option<usize>,
) -> Result<Vec<Record>, IngestionError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(IngestionError::MissingSource(path.to_path_buf()));
    }
    let file = File::open(path)?;
    info!(path = %path.display(), "loading dataset");
    load_from_reader(file, chunk_size)
}

pub fn load_from_reader<R: Read>(
    reader: R,
    chunk_size: Option<usize>,
) -> Result<Vec<Record>, IngestionError> {
    ensure_metrics_described();

    let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers = rdr.headers()?.clone();
    let cols = resolve_columns(headers.iter()).ok_or(IngestionError::MissingColumns)?;

    let chunk = chunk_size.filter(|&c| c > 0).unwrap_or(usize::MAX);
    let mut out: Vec<Record> = Vec::new();
    let mut buf: Vec<RawRow> = Vec::new();
    let mut total = 0usize;
    let mut chunks = 0usize;

    for rec in rdr.records() {
        let rec = rec?;
        buf.push(raw_row(&rec, &cols));
        total += 1;
        if buf.len() >= chunk {
            out.extend(process_chunk(std::mem::take(&mut buf)));
            chunks += 1;
        }
    }
    if !buf.is_empty() {
        out.extend(process_chunk(buf));
        chunks += 1;
    }

    counter!("ingest_rows_total").increment(total as u64);
    counter!("ingest_dropped_empty_total").increment((total - out.len()) as u64);
    info!(rows = total, non_empty = out.len(), chunks, "dataset read");

    Ok(finalize(out))
}

fn raw_row(rec: &csv::StringRecord, cols: &ResolvedColumns) -> RawRow {
    RawRow {
        title: fill_missing(rec.get(cols.title)),
        text: fill_missing(rec.get(cols.text)),
        date: cols.date.map(|i| fill_missing(rec.get(i))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn analysis_text_collapses_ws() {
        assert_eq!(
            build_analysis_text("  Big\tnews ", "\n more  here "),
            "Big news more here"
        );
        assert_eq!(build_analysis_text("", "   "), "");
    }

    #[test]
    fn empty_rows_are_dropped() {
        let rows = vec![
            RawRow::new("", ""),
            RawRow::new("Title", ""),
            RawRow::new(" ", "\t"),
        ];
        let out = process_chunk(rows);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].analysis_text, "Title");
    }

    #[test]
    fn na_markers_read_as_empty() {
        assert_eq!(fill_missing(Some("NA")), "");
        assert_eq!(fill_missing(Some("null")), "");
        assert_eq!(fill_missing(None), "");
        assert_eq!(fill_missing(Some("Nancy")), "Nancy");
    }

    #[test]
    fn dedup_keeps_first_and_is_idempotent() {
        let rows = vec![
            RawRow::new("A", "one").dated("2020-01-01"),
            RawRow::new("A", "one").dated("2020-02-02"),
            RawRow::new("B", "two"),
        ];
        let once = normalize_rows(rows);
        assert_eq!(once.len(), 2);
        assert_eq!(once[0].raw_date.as_deref(), Some("2020-01-01"));

        let (twice, removed) = dedup_records(once.clone());
        assert_eq!(twice.len(), once.len());
        assert_eq!(removed, 0);
    }

    #[test]
    fn chunked_and_whole_reads_agree() {
        let csv = "Headline,Content,Date\n\
                   a,x,2021-01-01\n\
                   b,y,not a date\n\
                   a,x,2021-01-02\n\
                   ,,\n\
                   c,z,\n";
        let whole = load_from_reader(csv.as_bytes(), None).unwrap();
        let chunked = load_from_reader(csv.as_bytes(), Some(2)).unwrap();
        assert_eq!(whole, chunked);
        assert_eq!(whole.len(), 3);
        assert!(whole[0].date.is_some());
        assert!(whole[1].date.is_none());
    }
}
