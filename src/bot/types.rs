// src/bot/types.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// An external news item as handed over by the fetch layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExternalItem {
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(deserialize_with = "null_as_default")]
    pub content: String,
    /// Source (publisher) name.
    #[serde(deserialize_with = "null_as_default")]
    pub source: String,
    #[serde(alias = "publishedAt")]
    pub published_at: Option<String>,
    pub url: Option<String>,
}

/// Fetchers pass missing text fields through as `null`.
fn null_as_default<'de, D>(d: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(d).map(Option::unwrap_or_default)
}

/// A (real or synthetic) social post. Created once, never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub post_id: String,
    pub account: String,
    pub text: String,
    pub posted_at: DateTime<Utc>,
    pub account_created_at: DateTime<Utc>,
    pub likes: u64,
    pub shares: u64,
    pub retweets: u64,
    pub source: String,
}

impl Post {
    pub fn engagement(&self) -> u64 {
        self.likes + self.shares + self.retweets
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BotClass {
    #[serde(rename = "Low Bot Risk")]
    Low,
    #[serde(rename = "Medium Bot Suspicion")]
    Medium,
    #[serde(rename = "High Bot Probability")]
    High,
}

impl BotClass {
    pub const ALL: [BotClass; 3] = [BotClass::Low, BotClass::Medium, BotClass::High];

    pub fn as_str(&self) -> &'static str {
        match self {
            BotClass::Low => "Low Bot Risk",
            BotClass::Medium => "Medium Bot Suspicion",
            BotClass::High => "High Bot Probability",
        }
    }
}

/// Signal scores on a 0–100 scale, as reported to consumers.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignalScores {
    pub frequency: f64,
    pub text_similarity: f64,
    pub engagement_spike: f64,
    pub sentiment_cluster: f64,
    pub duplicate_usernames: f64,
    pub new_account: f64,
    pub keyword_burst: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountProfile {
    pub account: String,
    pub post_count: usize,
    pub bot_probability: f64,
    pub classification: BotClass,
    pub signals: SignalScores,
    pub explanation: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCount {
    pub category: BotClass,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineBucket {
    pub timestamp: DateTime<Utc>,
    pub count: usize,
    pub burst: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeatmapCell {
    pub keyword: String,
    pub bucket: DateTime<Utc>,
    pub intensity: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Engagement {
    pub likes: u64,
    pub shares: u64,
    pub retweets: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuspiciousPost {
    pub post_id: String,
    pub account: String,
    pub text: String,
    pub source: String,
    pub posted_at: DateTime<Utc>,
    pub engagement: Engagement,
    pub badges: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalDefinitions {
    pub frequency: String,
    pub text_similarity: String,
    pub engagement_spike: String,
    pub sentiment_cluster: String,
    pub duplicate_or_new_accounts: String,
    pub keyword_burst: String,
}

impl Default for SignalDefinitions {
    fn default() -> Self {
        Self {
            frequency: "High posting volume in short windows.".into(),
            text_similarity: "Repeated or highly similar content across posts.".into(),
            engagement_spike: "Unusual jump in likes, shares, or retweets.".into(),
            sentiment_cluster: "Cluster of strongly negative sentiment posts.".into(),
            duplicate_or_new_accounts: "Repeated usernames and very recent account creation."
                .into(),
            keyword_burst: "Coordinated bursts around the same disinformation keywords.".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BotDetectionResult {
    pub topic: String,
    pub generated_at: DateTime<Utc>,
    pub dataset_size: usize,
    pub bot_probability_gauge: f64,
    pub risk_distribution: Vec<CategoryCount>,
    pub timeline_bursts: Vec<TimelineBucket>,
    pub keyword_heatmap: Vec<HeatmapCell>,
    pub suspicious_posts: Vec<SuspiciousPost>,
    pub accounts: Vec<AccountProfile>,
    pub signal_definitions: SignalDefinitions,
}

impl BotDetectionResult {
    /// Zero-filled result for an empty post set.
    pub fn empty(topic: &str, now: DateTime<Utc>) -> Self {
        Self {
            topic: topic.to_string(),
            generated_at: now,
            dataset_size: 0,
            bot_probability_gauge: 0.0,
            risk_distribution: BotClass::ALL
                .iter()
                .map(|c| CategoryCount {
                    category: *c,
                    count: 0,
                })
                .collect(),
            timeline_bursts: Vec::new(),
            keyword_heatmap: Vec::new(),
            suspicious_posts: Vec::new(),
            accounts: Vec::new(),
            signal_definitions: SignalDefinitions::default(),
        }
    }
}
