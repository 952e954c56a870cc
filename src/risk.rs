//! # Risk Aggregator
//! Normalizes four raw signals to 0–100 and fuses them into one explainable
//! score per record.
//!
//! - sentiment: only negative polarity contributes, `max(-compound, 0) * 100`
//! - keyword / emotion: divided by the corpus maximum (0 when that max is ≤ 0)
//! - narrative: similarity clamped to [0, 1], times 100
//!
//! `risk_score` is the mean of the four, rounded to 2 decimals; the label
//! uses right-inclusive bins (-1, low] / (low, medium] / (medium, 100].

use serde::{Deserialize, Serialize};

use crate::analyze::SignalSet;
use crate::config::RiskConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RiskLabel {
    #[serde(rename = "High Risk")]
    High,
    #[serde(rename = "Low Risk")]
    Low,
    #[serde(rename = "Medium Risk")]
    Medium,
}

impl RiskLabel {
    pub fn from_score(score: f64, cfg: &RiskConfig) -> Self {
        if score <= cfg.low_edge {
            RiskLabel::Low
        } else if score <= cfg.medium_edge {
            RiskLabel::Medium
        } else {
            RiskLabel::High
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLabel::Low => "Low Risk",
            RiskLabel::Medium => "Medium Risk",
            RiskLabel::High => "High Risk",
        }
    }

    /// Coarse status wording used by summary views.
    pub fn status(&self) -> &'static str {
        match self {
            RiskLabel::Low => "Real",
            RiskLabel::Medium => "Suspicious",
            RiskLabel::High => "Fake",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub sentiment_component: f64,
    pub keyword_component: f64,
    pub emotion_component: f64,
    pub narrative_component: f64,
    pub risk_score: f64,
    pub risk_label: RiskLabel,
    pub explanation: String,
}

pub fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

fn normalize_to_100(value: f64, max: f64) -> f64 {
    if max <= 0.0 {
        0.0
    } else {
        (value / max) * 100.0
    }
}

fn corpus_max(values: impl Iterator<Item = f64>) -> f64 {
    values.fold(0.0f64, f64::max)
}

pub fn assess(signals: &[SignalSet], cfg: &RiskConfig) -> Vec<RiskAssessment> {
    let keyword_max = corpus_max(signals.iter().map(|s| s.keyword_suspicion_score));
    let emotion_max = corpus_max(signals.iter().map(|s| s.emotional_intensity_score));

    signals
        .iter()
        .map(|s| {
            let sentiment_component = (-s.sentiment.compound).max(0.0) * 100.0;
            let keyword_component = normalize_to_100(s.keyword_suspicion_score, keyword_max);
            let emotion_component = normalize_to_100(s.emotional_intensity_score, emotion_max);
            let narrative_component = s.narrative.max_narrative_similarity.clamp(0.0, 1.0) * 100.0;

            let risk_score = round2(
                (sentiment_component + keyword_component + emotion_component + narrative_component)
                    / 4.0,
            );

            let mut a = RiskAssessment {
                sentiment_component,
                keyword_component,
                emotion_component,
                narrative_component,
                risk_score,
                risk_label: RiskLabel::from_score(risk_score, cfg),
                explanation: String::new(),
            };
            a.explanation = explain(&a, cfg.component_threshold);
            a
        })
        .collect()
}

/// Names every component at or above `threshold`, in fixed order.
pub fn explain(a: &RiskAssessment, threshold: f64) -> String {
    let mut factors = Vec::new();
    if a.sentiment_component >= threshold {
        factors.push(format!(
            "high negative sentiment impact ({:.1})",
            a.sentiment_component
        ));
    }
    if a.keyword_component >= threshold {
        factors.push(format!(
            "elevated suspicious keyword signal ({:.1})",
            a.keyword_component
        ));
    }
    if a.emotion_component >= threshold {
        factors.push(format!(
            "strong emotional intensity markers ({:.1})",
            a.emotion_component
        ));
    }
    if a.narrative_component >= threshold {
        factors.push(format!(
            "narrative repetition similarity ({:.1})",
            a.narrative_component
        ));
    }
    if factors.is_empty() {
        factors.push("no dominant high-risk indicator detected".to_string());
    }
    format!("Risk driven by {}.", factors.join("; "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyze::NarrativeScore;
    use crate::sentiment::{SentimentLabel, SentimentScore};

    fn sig(compound: f64, kw: f64, emo: f64, sim: f64) -> SignalSet {
        SignalSet {
            sentiment: SentimentScore {
                compound,
                label: SentimentLabel::from_compound(compound),
                intensity: compound.abs(),
            },
            keyword_suspicion_score: kw,
            emotional_intensity_score: emo,
            narrative: NarrativeScore {
                max_narrative_similarity: sim,
                narrative_repetition_flag: sim >= 0.82,
            },
            suspicious_keywords: vec![],
        }
    }

    #[test]
    fn label_edges_are_right_inclusive() {
        let cfg = RiskConfig::default();
        assert_eq!(RiskLabel::from_score(0.0, &cfg), RiskLabel::Low);
        assert_eq!(RiskLabel::from_score(35.00, &cfg), RiskLabel::Low);
        assert_eq!(RiskLabel::from_score(35.01, &cfg), RiskLabel::Medium);
        assert_eq!(RiskLabel::from_score(70.00, &cfg), RiskLabel::Medium);
        assert_eq!(RiskLabel::from_score(70.01, &cfg), RiskLabel::High);
        assert_eq!(RiskLabel::from_score(100.0, &cfg), RiskLabel::High);
    }

    #[test]
    fn components_and_mean() {
        let cfg = RiskConfig::default();
        let out = assess(
            &[sig(-0.5, 3.2, 0.0, 0.9), sig(0.8, 1.6, 0.0, 1.3)],
            &cfg,
        );
        let a = &out[0];
        assert_eq!(a.sentiment_component, 50.0);
        assert_eq!(a.keyword_component, 100.0);
        assert_eq!(a.emotion_component, 0.0);
        assert!((a.narrative_component - 90.0).abs() < 1e-9);
        assert_eq!(a.risk_score, 60.0);
        assert_eq!(a.risk_label, RiskLabel::Medium);

        let b = &out[1];
        assert_eq!(b.sentiment_component, 0.0);
        assert_eq!(b.keyword_component, 50.0);
        assert_eq!(b.narrative_component, 100.0);
        assert_eq!(b.risk_score, 37.5);

        for r in &out {
            for c in [
                r.sentiment_component,
                r.keyword_component,
                r.emotion_component,
                r.narrative_component,
            ] {
                assert!((0.0..=100.0).contains(&c));
            }
            let mean = (r.sentiment_component
                + r.keyword_component
                + r.emotion_component
                + r.narrative_component)
                / 4.0;
            assert_eq!(r.risk_score, round2(mean));
        }
    }

    #[test]
    fn explanation_lists_dominant_components_in_order() {
        let cfg = RiskConfig::default();
        let out = assess(&[sig(-0.5, 3.2, 0.0, 0.9)], &cfg);
        assert_eq!(
            out[0].explanation,
            "Risk driven by high negative sentiment impact (50.0); \
             elevated suspicious keyword signal (100.0); \
             narrative repetition similarity (90.0)."
        );

        let calm = assess(&[sig(0.3, 0.0, 0.0, 0.1)], &cfg);
        assert_eq!(
            calm[0].explanation,
            "Risk driven by no dominant high-risk indicator detected."
        );
        assert_eq!(calm[0].risk_label, RiskLabel::Low);
    }
}
