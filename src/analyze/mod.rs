// src/analyze/mod.rs
//! Signal extraction: sentiment, two lexicon scores, keyword highlights and
//! narrative repetition, fused per record into a `SignalSet`.

pub mod lexicon;
pub mod narrative;
pub mod stopwords;
pub mod vectorizer;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{LexiconConfig, NarrativeConfig};
use crate::preprocess::CleanedRecord;
use crate::sentiment::{SentimentAnalyzer, SentimentScore};

pub use lexicon::{CompiledLexicon, KeywordFrequency, Lexicon, LexiconScores, WeightedTerm};
pub use narrative::{detect_repetition, NarrativeScore};

/// All per-record signals feeding the risk aggregator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalSet {
    #[serde(flatten)]
    pub sentiment: SentimentScore,
    pub keyword_suspicion_score: f64,
    pub emotional_intensity_score: f64,
    #[serde(flatten)]
    pub narrative: NarrativeScore,
    pub suspicious_keywords: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct SignalOutput {
    pub signals: Vec<SignalSet>,
    /// Corpus-wide totals for the suspicious-keyword lexicon.
    pub keyword_frequency: Vec<KeywordFrequency>,
}

/// The two weighted tables, compiled once per analysis.
#[derive(Debug, Clone)]
pub struct SignalLexicons {
    pub suspicious: CompiledLexicon,
    pub emotional: CompiledLexicon,
}

impl SignalLexicons {
    pub fn from_config(cfg: &LexiconConfig) -> Self {
        Self {
            suspicious: cfg.suspicious().compile(),
            emotional: cfg.emotional().compile(),
        }
    }
}

impl Default for SignalLexicons {
    fn default() -> Self {
        Self::from_config(&LexiconConfig::default())
    }
}

pub fn extract_signals(
    records: &[CleanedRecord],
    analyzer: &SentimentAnalyzer,
    lexicons: &SignalLexicons,
    narrative_cfg: &NarrativeConfig,
) -> SignalOutput {
    let texts: Vec<&str> = records.iter().map(|r| r.cleaned_text.as_str()).collect();

    let sentiment = analyzer.analyze_all(&texts);
    let keyword = lexicons.suspicious.score_all(&texts);
    let emotion = lexicons.emotional.score_all(&texts);
    let highlights = lexicons.suspicious.highlights(&texts);
    let narrative = detect_repetition(&texts, narrative_cfg);

    debug!(
        rows = texts.len(),
        repeated = narrative.iter().filter(|n| n.narrative_repetition_flag).count(),
        "signals extracted"
    );

    let signals = sentiment
        .into_iter()
        .zip(keyword.scores)
        .zip(emotion.scores)
        .zip(narrative)
        .zip(highlights)
        .map(|((((s, k), e), n), h)| SignalSet {
            sentiment: s,
            keyword_suspicion_score: k,
            emotional_intensity_score: e,
            narrative: n,
            suspicious_keywords: h,
        })
        .collect();

    SignalOutput {
        signals,
        keyword_frequency: keyword.frequency,
    }
}
