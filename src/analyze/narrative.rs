//! Narrative-repetition detection: near-duplicate text across the corpus.
//!
//! Every row is compared to its k nearest neighbours under cosine distance
//! (k = max(2, min(neighbors, corpus size))). The row itself is excluded
//! from its own neighbour set; the best remaining similarity becomes
//! `max_narrative_similarity`.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::vectorizer::TfidfVectorizer;
use crate::config::NarrativeConfig;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct NarrativeScore {
    pub max_narrative_similarity: f64,
    pub narrative_repetition_flag: bool,
}

pub fn detect_repetition<S: AsRef<str>>(texts: &[S], cfg: &NarrativeConfig) -> Vec<NarrativeScore> {
    let n = texts.len();
    if n < 2 {
        return vec![NarrativeScore::default(); n];
    }

    let matrix = TfidfVectorizer::new(cfg.max_features).fit_transform(texts);
    let postings = matrix.postings();
    let k = cfg.neighbors.min(n).max(2);
    debug!(
        rows = n,
        vocabulary = matrix.vocabulary_size,
        k,
        "narrative similarity search"
    );

    (0..n)
        .map(|i| {
            let sims = matrix.similarities_from(i, &postings);
            let best = best_neighbor_similarity(i, &sims, k);
            NarrativeScore {
                max_narrative_similarity: best,
                narrative_repetition_flag: best >= cfg.similarity_threshold,
            }
        })
        .collect()
}

/// Highest similarity among the `k` nearest rows to `row`, excluding `row`.
/// Neighbours are ordered by distance, then by row index.
pub fn best_neighbor_similarity(row: usize, sims: &[f64], k: usize) -> f64 {
    let mut neighbors: Vec<(f64, usize)> = sims
        .iter()
        .enumerate()
        .map(|(j, s)| ((1.0 - s).clamp(0.0, 2.0), j))
        .collect();
    neighbors.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));

    neighbors
        .into_iter()
        .take(k)
        .filter(|&(_, j)| j != row)
        .map(|(d, _)| 1.0 - d)
        .fold(None, |best: Option<f64>, s| Some(best.map_or(s, |b| b.max(s))))
        .unwrap_or(0.0)
}
