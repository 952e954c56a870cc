//! TF-IDF vectorizer over unigrams and bigrams.
//!
//! - tokens: runs of 2+ word characters, lower-cased
//! - stop words are removed before bigrams are formed
//! - vocabulary capped at `max_features` terms by corpus frequency
//!   (ties broken alphabetically)
//! - idf = ln((1 + n) / (1 + df)) + 1, rows L2-normalized

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{BTreeMap, HashMap, HashSet};

use super::stopwords::is_stop_word;

static RE_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\w\w+\b").expect("token regex"));

/// Sparse row: `(term index, weight)` sorted by index.
pub type SparseVector = Vec<(usize, f64)>;

#[derive(Debug, Clone)]
pub struct TfidfVectorizer {
    pub max_features: usize,
}

/// Fitted corpus: one L2-normalized sparse row per document.
#[derive(Debug, Clone)]
pub struct TfidfMatrix {
    pub rows: Vec<SparseVector>,
    pub vocabulary_size: usize,
}

impl TfidfVectorizer {
    pub fn new(max_features: usize) -> Self {
        Self {
            max_features: max_features.max(1),
        }
    }

    pub fn analyze(text: &str) -> Vec<String> {
        let lowered = text.to_lowercase();
        let words: Vec<&str> = RE_TOKEN
            .find_iter(&lowered)
            .map(|m| m.as_str())
            .filter(|w| !is_stop_word(w))
            .collect();

        let mut terms: Vec<String> = words.iter().map(|w| w.to_string()).collect();
        terms.extend(words.windows(2).map(|p| format!("{} {}", p[0], p[1])));
        terms
    }

    pub fn fit_transform<S: AsRef<str>>(&self, docs: &[S]) -> TfidfMatrix {
        let analyzed: Vec<Vec<String>> = docs.iter().map(|d| Self::analyze(d.as_ref())).collect();

        // corpus term frequency and document frequency
        let mut tf_total: BTreeMap<&str, u64> = BTreeMap::new();
        let mut df: HashMap<&str, u64> = HashMap::new();
        for terms in &analyzed {
            let mut seen: HashSet<&str> = HashSet::new();
            for t in terms {
                *tf_total.entry(t.as_str()).or_insert(0) += 1;
                if seen.insert(t.as_str()) {
                    *df.entry(t.as_str()).or_insert(0) += 1;
                }
            }
        }

        // BTreeMap iteration is alphabetical; stable sort keeps that for ties
        let mut ranked: Vec<(&str, u64)> = tf_total.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked.truncate(self.max_features);
        let mut kept: Vec<&str> = ranked.into_iter().map(|(t, _)| t).collect();
        kept.sort_unstable();

        let index: HashMap<&str, usize> = kept.iter().enumerate().map(|(i, t)| (*t, i)).collect();
        let n = docs.len() as f64;
        let idf: Vec<f64> = kept
            .iter()
            .map(|t| {
                let d = df.get(t).copied().unwrap_or(0) as f64;
                ((1.0 + n) / (1.0 + d)).ln() + 1.0
            })
            .collect();

        let rows = analyzed
            .iter()
            .map(|terms| {
                let mut counts: BTreeMap<usize, f64> = BTreeMap::new();
                for t in terms {
                    if let Some(&i) = index.get(t.as_str()) {
                        *counts.entry(i).or_insert(0.0) += 1.0;
                    }
                }
                let mut row: SparseVector =
                    counts.into_iter().map(|(i, c)| (i, c * idf[i])).collect();
                l2_normalize(&mut row);
                row
            })
            .collect();

        TfidfMatrix {
            rows,
            vocabulary_size: kept.len(),
        }
    }
}

fn l2_normalize(row: &mut SparseVector) {
    let norm = row.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
    if norm > 0.0 {
        for (_, w) in row.iter_mut() {
            *w /= norm;
        }
    }
}

impl TfidfMatrix {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cosine similarity of `row` against every row (zero rows score 0).
    pub fn similarities_from(&self, row: usize, postings: &[Vec<(usize, f64)>]) -> Vec<f64> {
        let mut acc = vec![0.0f64; self.rows.len()];
        for &(term, w) in &self.rows[row] {
            for &(other, wo) in &postings[term] {
                acc[other] += w * wo;
            }
        }
        acc
    }

    /// Inverted index: term → `(row, weight)`.
    pub fn postings(&self) -> Vec<Vec<(usize, f64)>> {
        let mut out: Vec<Vec<(usize, f64)>> = vec![Vec::new(); self.vocabulary_size];
        for (r, row) in self.rows.iter().enumerate() {
            for &(t, w) in row {
                out[t].push((r, w));
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn analyzer_drops_stop_words_before_bigrams() {
        let terms = TfidfVectorizer::analyze("The vote was rigged by a few");
        assert_eq!(terms, vec!["vote", "rigged", "vote rigged"]);
    }

    #[test]
    fn single_char_tokens_are_ignored() {
        assert!(TfidfVectorizer::analyze("a b c x").is_empty());
    }

    #[test]
    fn rows_are_unit_length() {
        let m = TfidfVectorizer::new(100).fit_transform(&["cats chase mice", "dogs chase cats"]);
        for row in &m.rows {
            let n: f64 = row.iter().map(|(_, w)| w * w).sum();
            assert!((n - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn vocabulary_is_capped() {
        let m = TfidfVectorizer::new(2).fit_transform(&["alpha beta gamma", "alpha beta"]);
        assert_eq!(m.vocabulary_size, 2);
    }

    #[test]
    fn identical_docs_have_unit_similarity() {
        let m = TfidfVectorizer::new(100)
            .fit_transform(&["election fraud claims spread", "election fraud claims spread", "weather"]);
        let p = m.postings();
        let sims = m.similarities_from(0, &p);
        assert!((sims[1] - 1.0).abs() < 1e-9);
        assert_eq!(sims[2], 0.0);
    }
}
