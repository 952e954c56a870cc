// src/service.rs
//! Orchestrates one analysis run and serves read-only views of the latest
//! result.
//!
//! Every `analyze*` call builds a fresh `AnalysisResult`, hands it back to
//! the caller and swaps it into the last-result slot under a write lock.
//! Readers clone the `Arc`, so a concurrent run never tears a view.

use chrono::{DateTime, Utc};
use metrics::{counter, describe_counter, describe_gauge, gauge};
use once_cell::sync::OnceCell;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

use crate::analyze::{extract_signals, KeywordFrequency, SignalLexicons, SignalSet};
use crate::bot::{run_bot_detection, BotDetectionResult, ExternalItem};
use crate::config::{AnalysisConfig, NarrativeConfig};
use crate::digest::anon_hash;
use crate::error::{AnalysisError, Result};
use crate::ingest::{self, types::RawRow, types::Record};
use crate::preprocess::{preprocess, CleanedRecord};
use crate::risk::{assess, RiskAssessment, RiskLabel};
use crate::sentiment::{SentimentAnalyzer, SentimentLabel};
use crate::temporal::{detect_trends, TemporalBucket, TrendInput};

pub const DISCLAIMER: &str = "AI-based narrative risk analysis, not absolute truth verification.";
pub const DEFAULT_HIGH_RISK_LIMIT: usize = 20;

fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("analysis_runs_total", "Completed analysis runs.");
        describe_counter!("analysis_records_total", "Records scored across all runs.");
        describe_counter!("bot_detection_runs_total", "Coordinated-behavior detection runs.");
        describe_gauge!(
            "bot_probability_gauge",
            "Mean bot probability of the top accounts in the last detection run."
        );
    });
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzeRequest {
    #[serde(alias = "path")]
    pub csv_path: PathBuf,
    pub tokenize: bool,
    /// Falls back to the configured threshold when absent.
    pub similarity_threshold: Option<f64>,
    #[serde(alias = "chunksize")]
    pub chunk_size: Option<usize>,
    /// Only bounds the record list returned over HTTP.
    pub record_limit: Option<usize>,
}

impl AnalyzeRequest {
    pub fn for_path(path: impl Into<PathBuf>) -> Self {
        Self {
            csv_path: path.into(),
            ..Self::default()
        }
    }
}

/// One fully scored row.
#[derive(Debug, Clone, Serialize)]
pub struct AnnotatedRecord {
    #[serde(flatten)]
    pub cleaned: CleanedRecord,
    #[serde(flatten)]
    pub signals: SignalSet,
    #[serde(flatten)]
    pub risk: RiskAssessment,
}

impl AnnotatedRecord {
    pub fn record(&self) -> &Record {
        &self.cleaned.record
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisMeta {
    pub total_records: usize,
    pub tokenization_enabled: bool,
    pub similarity_threshold: f64,
    pub has_temporal_data: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RiskCount {
    pub category: RiskLabel,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusCount {
    pub name: &'static str,
    pub value: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SentimentCount {
    pub sentiment: SentimentLabel,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HighRiskRecord {
    pub title: String,
    pub text: String,
    pub sentiment_label: SentimentLabel,
    pub risk_label: RiskLabel,
    pub risk_score: f64,
    pub suspicious_keywords: Vec<String>,
    pub explanation: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisResult {
    pub records: Vec<AnnotatedRecord>,
    pub keyword_frequency: Vec<KeywordFrequency>,
    pub temporal_trends: Vec<TemporalBucket>,
    pub meta: AnalysisMeta,
}

impl AnalysisResult {
    /// All rows, or the first `limit` when `limit > 0`.
    pub fn processed_records(&self, limit: Option<usize>) -> &[AnnotatedRecord] {
        match limit {
            Some(n) if n > 0 => &self.records[..n.min(self.records.len())],
            _ => &self.records,
        }
    }

    /// Count per risk label present, ordered by label name.
    pub fn risk_summary(&self) -> Vec<RiskCount> {
        let mut counts: Vec<RiskCount> = Vec::new();
        for r in &self.records {
            match counts.iter_mut().find(|c| c.category == r.risk.risk_label) {
                Some(c) => c.count += 1,
                None => counts.push(RiskCount {
                    category: r.risk.risk_label,
                    count: 1,
                }),
            }
        }
        counts.sort_by_key(|c| c.category);
        counts
    }

    /// Fake / Suspicious / Real counts, most frequent first.
    pub fn status_summary(&self) -> Vec<StatusCount> {
        let mut counts: Vec<StatusCount> = Vec::new();
        for r in &self.records {
            let name = r.risk.risk_label.status();
            match counts.iter_mut().find(|c| c.name == name) {
                Some(c) => c.value += 1,
                None => counts.push(StatusCount { name, value: 1 }),
            }
        }
        counts.sort_by(|a, b| b.value.cmp(&a.value));
        counts
    }

    pub fn sentiment_summary(&self) -> Vec<SentimentCount> {
        let mut counts: Vec<SentimentCount> = Vec::new();
        for r in &self.records {
            let label = r.signals.sentiment.label;
            match counts.iter_mut().find(|c| c.sentiment == label) {
                Some(c) => c.count += 1,
                None => counts.push(SentimentCount {
                    sentiment: label,
                    count: 1,
                }),
            }
        }
        counts.sort_by_key(|c| c.sentiment);
        counts
    }

    /// High Risk rows by descending score.
    pub fn high_risk_records(&self, limit: usize) -> Vec<HighRiskRecord> {
        let mut high: Vec<&AnnotatedRecord> = self
            .records
            .iter()
            .filter(|r| r.risk.risk_label == RiskLabel::High)
            .collect();
        high.sort_by(|a, b| b.risk.risk_score.total_cmp(&a.risk.risk_score));
        high.into_iter()
            .take(limit)
            .map(|r| HighRiskRecord {
                title: r.record().title.clone(),
                text: r.record().text.clone(),
                sentiment_label: r.signals.sentiment.label,
                risk_label: r.risk.risk_label,
                risk_score: r.risk.risk_score,
                suspicious_keywords: r.signals.suspicious_keywords.clone(),
                explanation: r.risk.explanation.clone(),
            })
            .collect()
    }

    /// Corpus keyword totals, most frequent first (stable on lexicon order).
    pub fn keyword_trends(&self) -> Vec<KeywordFrequency> {
        let mut out = self.keyword_frequency.clone();
        out.sort_by(|a, b| b.frequency.cmp(&a.frequency));
        out
    }

    pub fn temporal_trends(&self) -> &[TemporalBucket] {
        &self.temporal_trends
    }
}

pub struct AnalysisService {
    config: AnalysisConfig,
    analyzer: OnceCell<Arc<SentimentAnalyzer>>,
    last: RwLock<Option<Arc<AnalysisResult>>>,
}

impl AnalysisService {
    pub fn new(config: AnalysisConfig) -> Self {
        ensure_metrics_described();
        Self {
            config,
            analyzer: OnceCell::new(),
            last: RwLock::new(None),
        }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Sentiment analyzer, built on first use and then shared.
    pub fn analyzer(&self) -> Result<Arc<SentimentAnalyzer>> {
        self.analyzer
            .get_or_try_init(|| {
                let analyzer = match &self.config.sentiment.lexicon_path {
                    Some(path) => SentimentAnalyzer::from_path(path)?,
                    None => SentimentAnalyzer::embedded()?,
                };
                info!(words = analyzer.lexicon_len(), "sentiment lexicon loaded");
                Ok::<_, AnalysisError>(Arc::new(analyzer))
            })
            .cloned()
    }

    /// Load a CSV dataset and score it.
    pub fn analyze(&self, req: &AnalyzeRequest) -> Result<Arc<AnalysisResult>> {
        let chunk = req.chunk_size.unwrap_or(self.config.ingest.chunk_size);
        let records = ingest::load_dataset(&req.csv_path, Some(chunk))?;
        self.run(records, req)
    }

    /// Score an already-loaded table. `req.csv_path` is ignored.
    pub fn analyze_records(
        &self,
        rows: Vec<RawRow>,
        req: &AnalyzeRequest,
    ) -> Result<Arc<AnalysisResult>> {
        self.run(ingest::normalize_rows(rows), req)
    }

    fn run(&self, records: Vec<Record>, req: &AnalyzeRequest) -> Result<Arc<AnalysisResult>> {
        let analyzer = self.analyzer()?;
        let narrative = NarrativeConfig {
            similarity_threshold: req
                .similarity_threshold
                .filter(|t| t.is_finite())
                .map(|t| t.clamp(0.0, 1.0))
                .unwrap_or(self.config.narrative.similarity_threshold),
            ..self.config.narrative.clone()
        };
        let lexicons = SignalLexicons::from_config(&self.config.lexicons);

        let cleaned = preprocess(&records, req.tokenize);
        let out = extract_signals(&cleaned, &analyzer, &lexicons, &narrative);
        let risk = assess(&out.signals, &self.config.risk);

        let temporal_trends = detect_trends(
            cleaned
                .iter()
                .zip(&out.signals)
                .map(|(c, s)| TrendInput {
                    day: c.record.date.map(|d| d.date()),
                    sentiment_compound: s.sentiment.compound,
                    narrative_repetition_flag: s.narrative.narrative_repetition_flag,
                }),
            &self.config.trends,
        );

        let records: Vec<AnnotatedRecord> = cleaned
            .into_iter()
            .zip(out.signals)
            .zip(risk)
            .map(|((cleaned, signals), risk)| AnnotatedRecord {
                cleaned,
                signals,
                risk,
            })
            .collect();

        if let Some(top) = records
            .iter()
            .max_by(|a, b| a.risk.risk_score.total_cmp(&b.risk.risk_score))
        {
            debug!(
                id = %anon_hash(&top.record().analysis_text),
                score = top.risk.risk_score,
                "highest risk record"
            );
        }

        let meta = AnalysisMeta {
            total_records: records.len(),
            tokenization_enabled: req.tokenize,
            similarity_threshold: narrative.similarity_threshold,
            has_temporal_data: !temporal_trends.is_empty(),
        };
        let high = records
            .iter()
            .filter(|r| r.risk.risk_label == RiskLabel::High)
            .count();
        info!(
            records = meta.total_records,
            high_risk = high,
            trend_days = temporal_trends.len(),
            "analysis complete"
        );
        counter!("analysis_runs_total").increment(1);
        counter!("analysis_records_total").increment(meta.total_records as u64);

        let result = Arc::new(AnalysisResult {
            records,
            keyword_frequency: out.keyword_frequency,
            temporal_trends,
            meta,
        });
        *self.last.write() = Some(Arc::clone(&result));
        Ok(result)
    }

    /// Latest result, or `NoAnalysis` before the first run.
    pub fn last_result(&self) -> Result<Arc<AnalysisResult>> {
        self.last.read().clone().ok_or(AnalysisError::NoAnalysis)
    }

    pub fn detect_bots(&self, items: &[ExternalItem], topic: Option<&str>) -> BotDetectionResult {
        self.detect_bots_at(items, topic, Utc::now())
    }

    pub fn detect_bots_at(
        &self,
        items: &[ExternalItem],
        topic: Option<&str>,
        now: DateTime<Utc>,
    ) -> BotDetectionResult {
        let topic = topic
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(self.config.bot.default_topic.as_str());
        let result = run_bot_detection(items, topic, &self.config.bot, now);
        counter!("bot_detection_runs_total").increment(1);
        gauge!("bot_probability_gauge").set(result.bot_probability_gauge);
        info!(
            accounts = result.accounts.len(),
            suspicious = result.suspicious_posts.len(),
            gauge = result.bot_probability_gauge,
            "bot detection complete"
        );
        result
    }
}

impl Default for AnalysisService {
    fn default() -> Self {
        Self::new(AnalysisConfig::default())
    }
}
