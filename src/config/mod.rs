// src/config/mod.rs
pub mod analysis;

pub use analysis::{
    AnalysisConfig, BotConfig, IngestConfig, LexiconConfig, NarrativeConfig, RiskConfig,
    SentimentConfig, TrendConfig, DEFAULT_ANALYSIS_CONFIG_PATH, ENV_ANALYSIS_CONFIG_PATH,
};
