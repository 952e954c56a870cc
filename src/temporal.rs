//! # Temporal Trend Detector
//! Per-day aggregation with z-score spike flags.
//!
//! Days are compared against the population (divisor N) mean/std of
//! `|avg_sentiment|` and of `repeated_narratives`. A zero std gives z = 0.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

use crate::config::TrendConfig;

/// Absorbs floating error so an analytically exact boundary z still flags.
const Z_TOLERANCE: f64 = 1e-9;

/// Minimal per-record view the detector needs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendInput {
    pub day: Option<NaiveDate>,
    pub sentiment_compound: f64,
    pub narrative_repetition_flag: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemporalBucket {
    pub date: NaiveDate,
    pub article_count: usize,
    pub avg_sentiment: f64,
    pub repeated_narratives: usize,
    pub sentiment_spike: bool,
    pub narrative_spike: bool,
}

#[derive(Default)]
struct DayAcc {
    count: usize,
    sentiment_sum: f64,
    repeated: usize,
}

pub fn is_spike(z: f64, threshold: f64) -> bool {
    z >= threshold - Z_TOLERANCE
}

/// z-scores against the population mean/std; all zeros when std is 0.
pub fn z_scores(values: &[f64]) -> Vec<f64> {
    if values.is_empty() {
        return Vec::new();
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    let std = var.sqrt();
    if std > 0.0 {
        values.iter().map(|v| (v - mean) / std).collect()
    } else {
        vec![0.0; values.len()]
    }
}

fn round4(x: f64) -> f64 {
    (x * 10_000.0).round() / 10_000.0
}

/// Chronological day buckets; empty when no row carries a valid date.
pub fn detect_trends<I>(rows: I, cfg: &TrendConfig) -> Vec<TemporalBucket>
where
    I: IntoIterator<Item = TrendInput>,
{
    let mut days: BTreeMap<NaiveDate, DayAcc> = BTreeMap::new();
    for r in rows {
        let Some(day) = r.day else { continue };
        let acc = days.entry(day).or_default();
        acc.count += 1;
        acc.sentiment_sum += r.sentiment_compound;
        if r.narrative_repetition_flag {
            acc.repeated += 1;
        }
    }
    if days.is_empty() {
        return Vec::new();
    }

    let avg: Vec<f64> = days
        .values()
        .map(|a| a.sentiment_sum / a.count as f64)
        .collect();
    let sentiment_abs: Vec<f64> = avg.iter().map(|v| v.abs()).collect();
    let repeated: Vec<f64> = days.values().map(|a| a.repeated as f64).collect();
    let sentiment_z = z_scores(&sentiment_abs);
    let repetition_z = z_scores(&repeated);

    debug!(days = days.len(), "temporal trends computed");

    days.into_iter()
        .enumerate()
        .map(|(i, (date, acc))| TemporalBucket {
            date,
            article_count: acc.count,
            avg_sentiment: round4(avg[i]),
            repeated_narratives: acc.repeated,
            sentiment_spike: is_spike(sentiment_z[i], cfg.spike_z),
            narrative_spike: is_spike(repetition_z[i], cfg.spike_z),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(2024, 3, day)
    }

    fn row(day: Option<NaiveDate>, s: f64, rep: bool) -> TrendInput {
        TrendInput {
            day,
            sentiment_compound: s,
            narrative_repetition_flag: rep,
        }
    }

    #[test]
    fn no_dates_no_buckets() {
        let out = detect_trends(vec![row(None, -0.5, true)], &TrendConfig::default());
        assert!(out.is_empty());
    }

    #[test]
    fn groups_sorts_and_averages() {
        let rows = vec![
            row(d(3), 0.2, false),
            row(d(1), -0.5, true),
            row(d(1), 0.1, true),
            row(None, 0.9, true),
        ];
        let out = detect_trends(rows, &TrendConfig::default());
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].date, d(1).unwrap());
        assert_eq!(out[0].article_count, 2);
        assert_eq!(out[0].repeated_narratives, 2);
        assert!((out[0].avg_sentiment + 0.2).abs() < 1e-12);
        assert_eq!(out[1].article_count, 1);
    }

    #[test]
    fn constant_series_never_spikes() {
        let rows = (1..=5).map(|i| row(d(i), -0.3, true));
        let out = detect_trends(rows, &TrendConfig::default());
        assert!(out.iter().all(|b| !b.sentiment_spike && !b.narrative_spike));
    }

    #[test]
    fn exact_boundary_z_is_a_spike() {
        // 13 days, 4 with one repeated narrative: z(high) = (9/13) / (6/13) = 1.5
        let rows: Vec<TrendInput> = (1..=13).map(|i| row(d(i), 0.0, i <= 4)).collect();
        let out = detect_trends(rows, &TrendConfig::default());
        let flagged: Vec<bool> = out.iter().map(|b| b.narrative_spike).collect();
        assert_eq!(flagged.iter().filter(|f| **f).count(), 4);
        assert!(flagged[..4].iter().all(|f| *f));
        assert!(is_spike(1.5, 1.5));
        assert!(!is_spike(1.49, 1.5));
    }

    #[test]
    fn population_std_is_used() {
        // population std of [0, 2] is 1 → z = [-1, 1]
        let z = z_scores(&[0.0, 2.0]);
        assert_eq!(z, vec![-1.0, 1.0]);
    }
}
