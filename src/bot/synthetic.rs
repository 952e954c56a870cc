// src/bot/synthetic.rs
//! Builds the post set the behavior detector runs on: external items mapped
//! to pseudo-posts, plus a seeded batch of synthetic coordinated posts.

use chrono::{DateTime, Duration, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::types::{ExternalItem, Post};
use crate::digest::short_digest;
use crate::ingest::dates::parse_lenient;

const BOT_ACCOUNTS: [&str; 6] = [
    "news_update247",
    "truth_watch_01",
    "citizen_alert_now",
    "dailybuzzflash",
    "news_update247",
    "trend_signal_x",
];

const BURST_SIZE: usize = 12;
const BURST_SPACING_MINUTES: i64 = 25;
const SPIKE_EVERY: usize = 7;
const SPIKED_ENGAGEMENT: (u64, u64, u64) = (950, 510, 430);
const HASHTAG_SUFFIX: &str = " #breaking #urgent";

fn templates(topic: &str) -> [String; 4] {
    [
        format!("URGENT: {topic} leak just exposed by insiders. Share now before deletion."),
        format!(
            "Breaking thread: hidden truth about {topic} is being suppressed by mainstream media."
        ),
        format!("Citizens alert! {topic} evidence confirms a coordinated coverup."),
        format!("Act now. {topic} crisis update reveals a serious threat to public safety."),
    ]
}

fn prefix(text: &str, chars: usize) -> String {
    text.chars().take(chars).collect()
}

fn post_id(key: &str) -> String {
    short_digest(key, 8)
}

fn parse_published(raw: Option<&str>) -> Option<DateTime<Utc>> {
    parse_lenient(raw?).map(|naive| naive.and_utc())
}

fn account_slug(source: &str, index: usize) -> String {
    let name = source.trim();
    let name = if name.is_empty() { "news-source" } else { name };
    format!("{}_{}", name.to_lowercase().replace(' ', "_"), index % 4)
}

fn item_text(item: &ExternalItem) -> String {
    let text = [&item.title, &item.description, &item.content]
        .into_iter()
        .filter(|p| !p.is_empty())
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(" ");
    let text = text.trim();
    if text.is_empty() {
        "No content".to_string()
    } else {
        text.to_string()
    }
}

/// Deterministic mapping of external items to posts. Unparsable timestamps
/// fall back to `now - 3*index` minutes.
pub fn news_to_posts(items: &[ExternalItem], now: DateTime<Utc>) -> Vec<Post> {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let posted_at = parse_published(item.published_at.as_deref())
                .unwrap_or_else(|| now - Duration::minutes(3 * i as i64));
            let text = item_text(item);
            Post {
                post_id: post_id(&format!("news:{i}:{}", prefix(&text, 80))),
                account: account_slug(&item.source, i),
                account_created_at: posted_at - Duration::days(180 + (i % 45) as i64),
                posted_at,
                likes: 40 + ((i * 7) % 200) as u64,
                shares: 15 + ((i * 5) % 80) as u64,
                retweets: 8 + ((i * 3) % 60) as u64,
                source: "news".to_string(),
                text,
            }
        })
        .collect()
}

/// Parameters for one synthetic batch.
#[derive(Debug, Clone)]
pub struct SyntheticParams<'a> {
    pub topic: &'a str,
    pub size: usize,
    pub seed: u64,
    pub max_seed_posts: usize,
    pub now: DateTime<Utc>,
}

/// Seeded coordinated posts plus up to `max_seed_posts` mapped items,
/// sorted by `posted_at` (stable).
pub fn generate_coordinated(seed_posts: &[Post], p: &SyntheticParams<'_>) -> Vec<Post> {
    let mut rng = StdRng::seed_from_u64(p.seed);
    let pool = templates(p.topic);
    let mut posts = Vec::with_capacity(p.size + seed_posts.len().min(p.max_seed_posts));

    for i in 0..p.size {
        let account = BOT_ACCOUNTS[i % BOT_ACCOUNTS.len()];
        let template = &pool[i % pool.len()];
        let suffix = if i % 3 == 0 { HASHTAG_SUFFIX } else { "" };
        let text = format!("{template} {suffix}").trim().to_string();

        // draw order matters for reproducibility: offset, age, engagement
        let burst_group = (i / BURST_SIZE) as i64;
        let seconds_offset = (i % BURST_SIZE) as i64 * rng.random_range(4..=18i64);
        let posted_at = p.now
            - Duration::minutes(burst_group * BURST_SPACING_MINUTES)
            - Duration::seconds(seconds_offset);

        let age_days = rng.random_range(0..=4i64);
        let age_hours = rng.random_range(0..=18i64);
        let account_created_at = p.now - Duration::days(age_days) - Duration::hours(age_hours);

        let (likes, shares, retweets) = if i % SPIKE_EVERY == 0 {
            SPIKED_ENGAGEMENT
        } else {
            (
                rng.random_range(120..=420u64),
                rng.random_range(80..=260u64),
                rng.random_range(70..=230u64),
            )
        };

        posts.push(Post {
            post_id: post_id(&format!("synthetic:{i}:{account}:{}", prefix(&text, 50))),
            account: account.to_string(),
            text,
            posted_at,
            account_created_at,
            likes,
            shares,
            retweets,
            source: "synthetic-demo".to_string(),
        });
    }

    posts.extend(seed_posts.iter().take(p.max_seed_posts).cloned());
    posts.sort_by_key(|post| post.posted_at);
    posts
}
