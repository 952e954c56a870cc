//! Weighted-term lexicon scoring.
//!
//! Each term is matched case-insensitively on word boundaries (never as a
//! substring). A row's score is the sum of `count(term) * weight`; corpus-wide
//! counts per term are returned alongside for keyword-frequency reporting.

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightedTerm {
    pub term: String,
    pub weight: f64,
}

impl WeightedTerm {
    pub fn new(term: impl Into<String>, weight: f64) -> Self {
        Self {
            term: term.into(),
            weight,
        }
    }
}

/// Ordered term → weight table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Lexicon {
    terms: Vec<WeightedTerm>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordFrequency {
    pub keyword: String,
    pub frequency: u64,
}

/// Output of scoring one text column against one lexicon.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LexiconScores {
    pub scores: Vec<f64>,
    /// Corpus totals per term, in lexicon order.
    pub frequency: Vec<KeywordFrequency>,
}

impl Lexicon {
    pub fn new(terms: Vec<WeightedTerm>) -> Self {
        Self { terms }
    }

    pub fn from_pairs(pairs: &[(&str, f64)]) -> Self {
        Self::new(pairs.iter().map(|(t, w)| WeightedTerm::new(*t, *w)).collect())
    }

    /// Sensational wording typical of clickbait and misinformation.
    pub fn suspicious_keywords() -> Self {
        Self::from_pairs(&[
            ("breaking", 1.4),
            ("shocking", 1.8),
            ("urgent", 1.6),
            ("secret", 1.3),
            ("viral", 1.2),
            ("exposed", 1.5),
            ("panic", 1.9),
            ("alert", 1.4),
        ])
    }

    /// Fear- and alarm-laden vocabulary.
    pub fn emotional_intensity() -> Self {
        Self::from_pairs(&[
            ("fear", 1.6),
            ("panic", 2.0),
            ("chaos", 1.7),
            ("disaster", 1.6),
            ("threat", 1.5),
            ("urgent", 1.4),
            ("alarming", 1.7),
            ("crisis", 1.8),
            ("catastrophic", 2.0),
            ("shocking", 1.5),
        ])
    }

    pub fn terms(&self) -> &[WeightedTerm] {
        &self.terms
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn compile(&self) -> CompiledLexicon {
        let matchers = self
            .terms
            .iter()
            .filter_map(|t| {
                let pattern = format!(r"(?i)\b{}\b", regex::escape(&t.term));
                match Regex::new(&pattern) {
                    Ok(re) => Some((t.clone(), re)),
                    Err(e) => {
                        warn!(term = %t.term, error = %e, "skipping uncompilable lexicon term");
                        None
                    }
                }
            })
            .collect();
        CompiledLexicon { matchers }
    }
}

/// Lexicon with one word-boundary regex per term.
#[derive(Debug, Clone)]
pub struct CompiledLexicon {
    matchers: Vec<(WeightedTerm, Regex)>,
}

impl CompiledLexicon {
    /// Per-term occurrence counts for one text, in lexicon order.
    pub fn counts(&self, text: &str) -> Vec<u64> {
        self.matchers
            .iter()
            .map(|(_, re)| re.find_iter(text).count() as u64)
            .collect()
    }

    pub fn score(&self, text: &str) -> f64 {
        self.counts(text)
            .iter()
            .zip(&self.matchers)
            .map(|(c, (t, _))| *c as f64 * t.weight)
            .sum()
    }

    /// Distinct lexicon terms present in `text`, in lexicon order.
    pub fn present_terms(&self, text: &str) -> Vec<String> {
        self.matchers
            .iter()
            .filter(|(_, re)| re.is_match(text))
            .map(|(t, _)| t.term.clone())
            .collect()
    }

    /// Score a text column and accumulate corpus-wide term totals.
    pub fn score_all<S: AsRef<str>>(&self, texts: &[S]) -> LexiconScores {
        let mut totals = vec![0u64; self.matchers.len()];
        let mut scores = Vec::with_capacity(texts.len());

        for text in texts {
            let counts = self.counts(text.as_ref());
            let mut row = 0.0f64;
            for (i, c) in counts.iter().enumerate() {
                totals[i] += c;
                row += *c as f64 * self.matchers[i].0.weight;
            }
            scores.push(row);
        }

        let frequency = self
            .matchers
            .iter()
            .zip(totals)
            .map(|((t, _), n)| KeywordFrequency {
                keyword: t.term.clone(),
                frequency: n,
            })
            .collect();

        LexiconScores { scores, frequency }
    }

    pub fn highlights<S: AsRef<str>>(&self, texts: &[S]) -> Vec<Vec<String>> {
        texts.iter().map(|t| self.present_terms(t.as_ref())).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weighted_sum_of_whole_word_hits() {
        let lex = Lexicon::from_pairs(&[("breaking", 1.4), ("shocking", 1.8)]).compile();
        let s = lex.score("BREAKING: shocking leak");
        assert!((s - 3.2).abs() < 1e-9, "{s}");
    }

    #[test]
    fn substrings_do_not_count() {
        let lex = Lexicon::from_pairs(&[("alert", 1.0), ("panic", 2.0)]).compile();
        assert_eq!(lex.score("alerts panicked alerting"), 0.0);
        assert_eq!(lex.score("panic panic alert"), 5.0);
    }

    #[test]
    fn corpus_totals_follow_lexicon_order() {
        let lex = Lexicon::suspicious_keywords().compile();
        let out = lex.score_all(&["breaking urgent news", "urgent urgent", "nothing here"]);
        assert_eq!(out.scores.len(), 3);
        assert_eq!(out.scores[2], 0.0);
        assert_eq!(out.frequency[0].keyword, "breaking");
        assert_eq!(out.frequency[0].frequency, 1);
        assert_eq!(out.frequency[2].keyword, "urgent");
        assert_eq!(out.frequency[2].frequency, 3);
    }

    #[test]
    fn highlights_are_distinct() {
        let lex = Lexicon::suspicious_keywords().compile();
        assert_eq!(
            lex.present_terms("panic secret panic"),
            vec!["secret".to_string(), "panic".to_string()]
        );
        assert!(lex.present_terms("calm day").is_empty());
    }

    #[test]
    fn empty_lexicon_scores_zero() {
        let lex = Lexicon::default().compile();
        let out = lex.score_all(&["anything"]);
        assert_eq!(out.scores, vec![0.0]);
        assert!(out.frequency.is_empty());
    }
}
