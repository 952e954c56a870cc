//! # Sentiment Analyzer
//! Lexicon/rule-based polarity scoring producing a compound score in [-1, 1].
//!
//! Word valences come from a JSON lexicon (embedded by default, optionally
//! replaced by a file). Rules on top of the raw valences:
//! - boosters/dampeners in the 3 preceding tokens shift magnitude,
//! - a negator in the 3 preceding tokens flips and damps the valence,
//! - a contrastive "but" halves what precedes it and amplifies what follows.
//!
//! The analyzer is immutable once built; callers construct it once and share it.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use crate::error::AnalysisError;

const EMBEDDED_LEXICON: &str = include_str!("../sentiment_lexicon.json");

/// Normalization constant for the compound score.
const ALPHA: f64 = 15.0;
const BOOST_INCREMENT: f64 = 0.293;
const NEGATION_SCALAR: f64 = -0.74;
const BUT_BEFORE: f64 = 0.5;
const BUT_AFTER: f64 = 1.5;
/// Decay of a booster's effect at distance 1, 2 and 3 tokens.
const BOOST_DECAY: [f64; 3] = [1.0, 0.95, 0.9];

pub const POSITIVE_THRESHOLD: f64 = 0.25;
pub const NEGATIVE_THRESHOLD: f64 = -0.25;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SentimentLabel {
    Negative,
    Neutral,
    Positive,
}

impl SentimentLabel {
    pub fn from_compound(compound: f64) -> Self {
        if compound >= POSITIVE_THRESHOLD {
            SentimentLabel::Positive
        } else if compound <= NEGATIVE_THRESHOLD {
            SentimentLabel::Negative
        } else {
            SentimentLabel::Neutral
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SentimentLabel::Positive => "Positive",
            SentimentLabel::Neutral => "Neutral",
            SentimentLabel::Negative => "Negative",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SentimentScore {
    #[serde(rename = "sentiment_compound")]
    pub compound: f64,
    #[serde(rename = "sentiment_label")]
    pub label: SentimentLabel,
    #[serde(rename = "sentiment_intensity")]
    pub intensity: f64,
}

#[derive(Debug, Clone)]
pub struct SentimentAnalyzer {
    lexicon: HashMap<String, f64>,
}

impl SentimentAnalyzer {
    /// Analyzer backed by the lexicon compiled into the binary.
    pub fn embedded() -> Result<Self, AnalysisError> {
        Self::from_json_str(EMBEDDED_LEXICON)
    }

    pub fn from_json_str(raw: &str) -> Result<Self, AnalysisError> {
        let lexicon: HashMap<String, f64> = serde_json::from_str(raw)
            .map_err(|e| AnalysisError::Sentiment(format!("invalid lexicon: {e}")))?;
        Ok(Self { lexicon })
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, AnalysisError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            AnalysisError::Sentiment(format!("reading lexicon {}: {e}", path.display()))
        })?;
        Self::from_json_str(&raw)
    }

    pub fn lexicon_len(&self) -> usize {
        self.lexicon.len()
    }

    #[inline]
    fn valence(&self, w: &str) -> f64 {
        self.lexicon.get(w).copied().unwrap_or(0.0)
    }

    /// Compound polarity in [-1, 1], rounded to 4 decimals.
    pub fn compound(&self, text: &str) -> f64 {
        let tokens: Vec<String> = tokenize(text).collect();
        let but_at = tokens.iter().position(|t| t == "but");

        let mut sum = 0.0f64;
        for i in 0..tokens.len() {
            let base = self.valence(&tokens[i]);
            if base == 0.0 {
                continue;
            }
            let mut v = base;

            for (k, decay) in BOOST_DECAY.iter().enumerate() {
                let dist = k + 1;
                if i < dist {
                    break;
                }
                if let Some(scalar) = booster_scalar(&tokens[i - dist]) {
                    let directed = if v < 0.0 { -scalar } else { scalar };
                    v += directed * decay;
                }
            }

            if (1..=3).any(|k| i >= k && is_negator(&tokens, i - k)) {
                v *= NEGATION_SCALAR;
            }

            if let Some(b) = but_at {
                if i < b {
                    v *= BUT_BEFORE;
                } else if i > b {
                    v *= BUT_AFTER;
                }
            }

            sum += v;
        }

        round4(normalize(sum))
    }

    pub fn analyze(&self, text: &str) -> SentimentScore {
        let compound = self.compound(text);
        SentimentScore {
            compound,
            label: SentimentLabel::from_compound(compound),
            intensity: compound.abs(),
        }
    }

    /// Score a column of texts.
    pub fn analyze_all<S: AsRef<str>>(&self, texts: &[S]) -> Vec<SentimentScore> {
        texts.iter().map(|t| self.analyze(t.as_ref())).collect()
    }
}

fn normalize(score: f64) -> f64 {
    if score == 0.0 {
        return 0.0;
    }
    (score / (score * score + ALPHA).sqrt()).clamp(-1.0, 1.0)
}

fn round4(x: f64) -> f64 {
    (x * 10_000.0).round() / 10_000.0
}

/// Alphanumeric lower-case tokens.
fn tokenize(s: &str) -> impl Iterator<Item = String> + '_ {
    s.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
}

fn booster_scalar(tok: &str) -> Option<f64> {
    match tok {
        "absolutely" | "amazingly" | "completely" | "deeply" | "enormously" | "entirely"
        | "especially" | "exceptionally" | "extremely" | "greatly" | "highly" | "hugely"
        | "incredibly" | "intensely" | "majorly" | "most" | "particularly" | "purely"
        | "really" | "remarkably" | "so" | "substantially" | "thoroughly" | "totally"
        | "tremendously" | "truly" | "utterly" | "very" => Some(BOOST_INCREMENT),
        "almost" | "barely" | "hardly" | "less" | "little" | "marginally" | "occasionally"
        | "partly" | "scarcely" | "slightly" | "somewhat" => Some(-BOOST_INCREMENT),
        _ => None,
    }
}

/// Negators, including contractions split by cleaning ("don t" → "don", "t").
fn is_negator(tokens: &[String], idx: usize) -> bool {
    let tok = tokens[idx].as_str();
    if matches!(
        tok,
        "not"
            | "no"
            | "never"
            | "none"
            | "nobody"
            | "nothing"
            | "neither"
            | "nor"
            | "nowhere"
            | "cannot"
            | "without"
            | "isnt"
            | "wasnt"
            | "arent"
            | "dont"
            | "doesnt"
            | "didnt"
            | "wont"
            | "cant"
            | "shouldnt"
            | "wouldnt"
            | "couldnt"
    ) {
        return true;
    }
    tok == "t"
        && idx > 0
        && matches!(
            tokens[idx - 1].as_str(),
            "don"
                | "doesn"
                | "didn"
                | "isn"
                | "wasn"
                | "weren"
                | "aren"
                | "won"
                | "can"
                | "couldn"
                | "shouldn"
                | "wouldn"
                | "hasn"
                | "haven"
                | "ain"
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyzer() -> SentimentAnalyzer {
        SentimentAnalyzer::embedded().unwrap()
    }

    #[test]
    fn embedded_lexicon_loads() {
        assert!(analyzer().lexicon_len() > 100);
    }

    #[test]
    fn polarity_and_bounds() {
        let a = analyzer();
        let pos = a.compound("a great and wonderful success");
        let neg = a.compound("a terrible disaster full of fear and panic");
        assert!(pos > 0.25, "{pos}");
        assert!(neg < -0.25, "{neg}");
        assert!((-1.0..=1.0).contains(&pos));
        assert!((-1.0..=1.0).contains(&neg));
        assert_eq!(a.compound("the committee met on tuesday"), 0.0);
        assert_eq!(a.compound(""), 0.0);
    }

    #[test]
    fn negation_flips_sign() {
        let a = analyzer();
        assert!(a.compound("good") > 0.0);
        assert!(a.compound("not good") < 0.0);
        assert!(a.compound("don t like it") < 0.0);
    }

    #[test]
    fn boosters_increase_magnitude() {
        let a = analyzer();
        assert!(a.compound("very bad") < a.compound("bad"));
        assert!(a.compound("slightly bad") > a.compound("bad"));
    }

    #[test]
    fn but_shifts_weight_to_second_clause() {
        let a = analyzer();
        assert!(a.compound("the plan is good but the outcome is terrible") < 0.0);
    }

    #[test]
    fn labels_use_inclusive_edges() {
        assert_eq!(SentimentLabel::from_compound(0.25), SentimentLabel::Positive);
        assert_eq!(SentimentLabel::from_compound(0.2499), SentimentLabel::Neutral);
        assert_eq!(SentimentLabel::from_compound(-0.25), SentimentLabel::Negative);
        let s = analyzer().analyze("terrible");
        assert_eq!(s.intensity, s.compound.abs());
    }

    #[test]
    fn bad_lexicon_is_an_error() {
        assert!(matches!(
            SentimentAnalyzer::from_json_str("[1,2"),
            Err(AnalysisError::Sentiment(_))
        ));
    }
}
