// src/bot/signals.rs
//! Per-account behavior signals, each in [0, 1].

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

use super::types::{BotClass, Post, SignalScores};
use crate::risk::round2;

pub const COORDINATED_KEYWORDS: [&str; 8] = [
    "urgent", "breaking", "exposed", "leak", "panic", "rigged", "coverup", "threat",
];

pub const NEGATIVE_WORDS: [&str; 10] = [
    "panic", "threat", "chaos", "crisis", "fear", "attack", "danger", "collapse", "rigged",
    "corrupt",
];

pub const W_FREQUENCY: f64 = 0.32;
pub const W_SIMILARITY: f64 = 0.28;
pub const W_ENGAGEMENT: f64 = 0.22;
pub const W_SENTIMENT: f64 = 0.18;

/// Negative-word ratio at which a post counts toward the sentiment cluster.
pub const CLUSTER_RATIO: f64 = 0.08;
/// Negative-word ratio that makes a single post suspicious.
pub const SUSPICIOUS_RATIO: f64 = 0.12;
pub const POSTS_PER_30M_CEILING: f64 = 6.0;
pub const DUPLICATE_NAME_MIN: usize = 5;
pub const NEW_ACCOUNT_DAYS: f64 = 7.0;
pub const HIGH_EDGE: f64 = 70.0;
pub const MEDIUM_EDGE: f64 = 40.0;

static WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[a-zA-Z']+").expect("word regex"));

/// Clamp to [0, 1]; non-finite values collapse to 0.
pub fn unit(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

pub fn words(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    WORD_RE
        .find_iter(&lower)
        .map(|m| m.as_str().to_string())
        .collect()
}

pub fn negative_ratio(text: &str) -> f64 {
    let tokens = words(text);
    if tokens.is_empty() {
        return 0.0;
    }
    let hits = tokens
        .iter()
        .filter(|t| NEGATIVE_WORDS.contains(&t.as_str()))
        .count();
    hits as f64 / tokens.len() as f64
}

pub fn jaccard(a: &str, b: &str) -> f64 {
    let a: HashSet<String> = words(a).into_iter().collect();
    let b: HashSet<String> = words(b).into_iter().collect();
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let inter = a.intersection(&b).count();
    let union = a.union(&b).count();
    inter as f64 / union as f64
}

/// Coordinated keywords occurring (as substrings) in `text`, in list order.
pub fn keywords_in(text: &str) -> Vec<&'static str> {
    let lower = text.to_lowercase();
    COORDINATED_KEYWORDS
        .iter()
        .copied()
        .filter(|k| lower.contains(k))
        .collect()
}

/// Population mean/std of post engagement; a zero std is replaced by 1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngagementStats {
    pub mean: f64,
    pub std: f64,
}

impl EngagementStats {
    pub fn from_posts(posts: &[Post]) -> Self {
        let n = posts.len().max(1) as f64;
        let mean = posts.iter().map(|p| p.engagement() as f64).sum::<f64>() / n;
        let var = posts
            .iter()
            .map(|p| (p.engagement() as f64 - mean).powi(2))
            .sum::<f64>()
            / n;
        let std = if var > 0.0 { var.sqrt() } else { 1.0 };
        Self { mean, std }
    }

    pub fn z(&self, post: &Post) -> f64 {
        (post.engagement() as f64 - self.mean) / self.std
    }

    pub fn is_outlier(&self, post: &Post) -> bool {
        post.engagement() as f64 > self.mean + self.std
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AccountSignals {
    pub frequency: f64,
    pub text_similarity: f64,
    pub engagement_spike: f64,
    pub sentiment_cluster: f64,
    pub duplicate_usernames: f64,
    pub new_account: f64,
    pub keyword_burst: f64,
}

impl AccountSignals {
    /// `posts` must be one account's posts, sorted by time and non-empty.
    /// `name_count` is how often the account name occurs in the whole set.
    pub fn compute(
        posts: &[&Post],
        name_count: usize,
        stats: &EngagementStats,
        now: DateTime<Utc>,
    ) -> Self {
        let (Some(first), Some(last)) = (posts.first(), posts.last()) else {
            return Self::default();
        };
        let n = posts.len() as f64;

        let span_minutes =
            ((last.posted_at - first.posted_at).num_milliseconds() as f64 / 60_000.0).max(1.0);
        let frequency = unit((n / span_minutes) * 30.0 / POSTS_PER_30M_CEILING);

        let mut pair_sum = 0.0;
        let mut pairs = 0usize;
        for (i, left) in posts.iter().enumerate() {
            for right in &posts[i + 1..] {
                pair_sum += jaccard(&left.text, &right.text);
                pairs += 1;
            }
        }
        let text_similarity = unit(pair_sum / pairs.max(1) as f64);

        let spike_sum: f64 = posts.iter().map(|p| stats.z(p).max(0.0)).sum();
        let engagement_spike = unit(spike_sum / n / 3.0);

        let clustered = posts
            .iter()
            .filter(|p| negative_ratio(&p.text) >= CLUSTER_RATIO)
            .count();
        let sentiment_cluster = unit(clustered as f64 / n);

        let duplicate_usernames = if name_count >= DUPLICATE_NAME_MIN { 1.0 } else { 0.0 };

        let newest_age_days = posts
            .iter()
            .map(|p| (now - p.account_created_at).num_seconds() as f64 / 86_400.0)
            .fold(f64::INFINITY, f64::min);
        let new_account = if newest_age_days <= NEW_ACCOUNT_DAYS { 1.0 } else { 0.0 };

        let hits: usize = posts.iter().map(|p| keywords_in(&p.text).len()).sum();
        let keyword_burst = unit(hits as f64 / posts.len().max(3) as f64);

        Self {
            frequency,
            text_similarity,
            engagement_spike,
            sentiment_cluster,
            duplicate_usernames,
            new_account,
            keyword_burst,
        }
    }

    /// Weighted sum scaled to 0–100. Username and account-age signals are
    /// reported but carry no weight.
    pub fn bot_probability(&self) -> f64 {
        let s = W_FREQUENCY * self.frequency
            + W_SIMILARITY * self.text_similarity
            + W_ENGAGEMENT * self.engagement_spike
            + W_SENTIMENT * self.sentiment_cluster;
        round2(unit(s) * 100.0)
    }

    pub fn scores(&self) -> SignalScores {
        SignalScores {
            frequency: round2(self.frequency * 100.0),
            text_similarity: round2(self.text_similarity * 100.0),
            engagement_spike: round2(self.engagement_spike * 100.0),
            sentiment_cluster: round2(self.sentiment_cluster * 100.0),
            duplicate_usernames: round2(self.duplicate_usernames * 100.0),
            new_account: round2(self.new_account * 100.0),
            keyword_burst: round2(self.keyword_burst * 100.0),
        }
    }

    pub fn explanation(&self) -> String {
        format!(
            "Frequency {:.1}, similarity {:.1}, engagement spike {:.1}, sentiment cluster {:.1}.",
            self.frequency * 100.0,
            self.text_similarity * 100.0,
            self.engagement_spike * 100.0,
            self.sentiment_cluster * 100.0
        )
    }
}

pub fn classify(bot_probability: f64) -> BotClass {
    if bot_probability >= HIGH_EDGE {
        BotClass::High
    } else if bot_probability >= MEDIUM_EDGE {
        BotClass::Medium
    } else {
        BotClass::Low
    }
}
