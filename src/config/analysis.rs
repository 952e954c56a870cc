// src/config/analysis.rs
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::{env, fs};

use crate::analyze::lexicon::{Lexicon, WeightedTerm};

pub const DEFAULT_ANALYSIS_CONFIG_PATH: &str = "config/analysis.toml";
pub const ENV_ANALYSIS_CONFIG_PATH: &str = "ANALYSIS_CONFIG_PATH";

/// Top-level tuning knobs for the scoring pipeline and the behavior detector.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub ingest: IngestConfig,
    pub narrative: NarrativeConfig,
    pub risk: RiskConfig,
    pub trends: TrendConfig,
    pub bot: BotConfig,
    pub sentiment: SentimentConfig,
    pub lexicons: LexiconConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// Rows per chunk; 0 reads the whole file at once.
    pub chunk_size: usize,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self { chunk_size: 50_000 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NarrativeConfig {
    pub similarity_threshold: f64,
    pub neighbors: usize,
    pub max_features: usize,
}

impl Default for NarrativeConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: 0.82,
            neighbors: 6,
            max_features: 25_000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskConfig {
    /// A component at or above this value is named in the explanation.
    pub component_threshold: f64,
    pub low_edge: f64,
    pub medium_edge: f64,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            component_threshold: 35.0,
            low_edge: 35.0,
            medium_edge: 70.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrendConfig {
    pub spike_z: f64,
}

impl Default for TrendConfig {
    fn default() -> Self {
        Self { spike_z: 1.5 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    pub seed: u64,
    pub synthetic_size: usize,
    pub max_seed_posts: usize,
    pub default_topic: String,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            synthetic_size: 36,
            max_seed_posts: 12,
            default_topic: "general misinformation".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SentimentConfig {
    /// Optional JSON valence lexicon replacing the embedded one.
    pub lexicon_path: Option<PathBuf>,
}

/// Optional overrides for the two weighted-term tables (order preserved).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LexiconConfig {
    pub suspicious: Option<Vec<WeightedTerm>>,
    pub emotional: Option<Vec<WeightedTerm>>,
}

impl LexiconConfig {
    pub fn suspicious(&self) -> Lexicon {
        match &self.suspicious {
            Some(terms) => Lexicon::new(terms.clone()),
            None => Lexicon::suspicious_keywords(),
        }
    }

    pub fn emotional(&self) -> Lexicon {
        match &self.emotional {
            Some(terms) => Lexicon::new(terms.clone()),
            None => Lexicon::emotional_intensity(),
        }
    }
}

impl AnalysisConfig {
    /// Load from an explicit TOML file and sanitize the values.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path)
            .with_context(|| format!("reading analysis config from {}", path.display()))?;
        Self::from_toml_str(&data)
            .with_context(|| format!("parsing analysis config {}", path.display()))
    }

    pub fn from_toml_str(s: &str) -> Result<Self> {
        let cfg: AnalysisConfig = toml::from_str(s)?;
        Ok(cfg.sanitized())
    }

    /// Env var first, then `config/analysis.toml`, then built-in defaults.
    /// A path named by the env var must exist.
    pub fn load_default() -> Result<Self> {
        if let Ok(p) = env::var(ENV_ANALYSIS_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if pb.exists() {
                return Self::load_from_file(&pb);
            }
            return Err(anyhow!(
                "{ENV_ANALYSIS_CONFIG_PATH} points to non-existent path"
            ));
        }
        let fallback = PathBuf::from(DEFAULT_ANALYSIS_CONFIG_PATH);
        if fallback.exists() {
            return Self::load_from_file(&fallback);
        }
        Ok(Self::default())
    }

    fn sanitized(mut self) -> Self {
        let defaults = NarrativeConfig::default();
        if !self.narrative.similarity_threshold.is_finite() {
            self.narrative.similarity_threshold = defaults.similarity_threshold;
        }
        self.narrative.similarity_threshold = self.narrative.similarity_threshold.clamp(0.0, 1.0);
        self.narrative.neighbors = self.narrative.neighbors.max(1);
        if self.narrative.max_features == 0 {
            self.narrative.max_features = defaults.max_features;
        }
        if self.risk.low_edge > self.risk.medium_edge {
            std::mem::swap(&mut self.risk.low_edge, &mut self.risk.medium_edge);
        }
        if self.bot.default_topic.trim().is_empty() {
            self.bot.default_topic = BotConfig::default().default_topic;
        }
        self
    }
}
