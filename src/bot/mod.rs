// src/bot/mod.rs
//! Coordinated-behavior detector.
//!
//! External items are mapped to pseudo-posts and mixed with a seeded batch of
//! synthetic coordinated posts. Posts are grouped by account; each account
//! gets seven signals, a bot probability and a class. Aggregate views
//! (timeline bursts, keyword heatmap, gauge) are computed over all posts.

pub mod signals;
pub mod synthetic;
pub mod types;

use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info};

use crate::config::BotConfig;
use crate::risk::round2;
use signals::{classify, keywords_in, negative_ratio, AccountSignals, EngagementStats};
use signals::{COORDINATED_KEYWORDS, SUSPICIOUS_RATIO};

pub use synthetic::{generate_coordinated, news_to_posts, SyntheticParams};
pub use types::{
    AccountProfile, BotClass, BotDetectionResult, CategoryCount, Engagement, ExternalItem,
    HeatmapCell, Post, SignalDefinitions, SignalScores, SuspiciousPost, TimelineBucket,
};

pub const BUCKET_SECONDS: i64 = 600;
pub const BURST_FLOOR: usize = 4;
pub const BURST_SHARE: f64 = 0.1;
pub const HEATMAP_BUCKETS: usize = 6;
pub const GAUGE_ACCOUNTS: usize = 6;
pub const MAX_SUSPICIOUS_POSTS: usize = 18;

/// Floor a timestamp to its 10-minute window.
pub fn bucket_of(ts: DateTime<Utc>) -> DateTime<Utc> {
    let secs = ts.timestamp();
    DateTime::from_timestamp(secs - secs.rem_euclid(BUCKET_SECONDS), 0).unwrap_or(ts)
}

/// Full run: map items, synthesize, detect. `now` and the seed in `cfg`
/// fully determine the synthetic part.
pub fn run_bot_detection(
    items: &[ExternalItem],
    topic: &str,
    cfg: &BotConfig,
    now: DateTime<Utc>,
) -> BotDetectionResult {
    let mapped = news_to_posts(items, now);
    let posts = generate_coordinated(
        &mapped,
        &SyntheticParams {
            topic,
            size: cfg.synthetic_size,
            seed: cfg.seed,
            max_seed_posts: cfg.max_seed_posts,
            now,
        },
    );
    info!(
        items = items.len(),
        posts = posts.len(),
        seed = cfg.seed,
        "bot detection input prepared"
    );
    detect(&posts, topic, now)
}

/// Scores an already-built, time-sorted post set.
pub fn detect(posts: &[Post], topic: &str, now: DateTime<Utc>) -> BotDetectionResult {
    if posts.is_empty() {
        return BotDetectionResult::empty(topic, now);
    }

    // accounts keep first-seen order
    let mut order: Vec<&str> = Vec::new();
    let mut by_account: HashMap<&str, Vec<&Post>> = HashMap::new();
    let mut timeline: BTreeMap<DateTime<Utc>, usize> = BTreeMap::new();
    let mut bucket_seen: Vec<DateTime<Utc>> = Vec::new();
    let mut heat: HashMap<(DateTime<Utc>, &'static str), usize> = HashMap::new();

    for post in posts {
        let entry = by_account.entry(post.account.as_str()).or_insert_with(|| {
            order.push(post.account.as_str());
            Vec::new()
        });
        entry.push(post);

        let bucket = bucket_of(post.posted_at);
        let count = timeline.entry(bucket).or_insert(0);
        if *count == 0 {
            bucket_seen.push(bucket);
        }
        *count += 1;
        for kw in keywords_in(&post.text) {
            *heat.entry((bucket, kw)).or_insert(0) += 1;
        }
    }

    let stats = EngagementStats::from_posts(posts);
    let mut accounts = Vec::with_capacity(order.len());
    let mut suspicious = Vec::new();

    for name in &order {
        let mut account_posts = by_account.remove(name).unwrap_or_default();
        account_posts.sort_by_key(|p| p.posted_at);
        let name_count = account_posts.len();

        let signals = AccountSignals::compute(&account_posts, name_count, &stats, now);
        let bot_probability = signals.bot_probability();
        let classification = classify(bot_probability);

        for post in &account_posts {
            if let Some(s) = suspicious_post(post, classification, &stats) {
                suspicious.push(s);
            }
        }

        accounts.push(AccountProfile {
            account: name.to_string(),
            post_count: account_posts.len(),
            bot_probability,
            classification,
            signals: signals.scores(),
            explanation: signals.explanation(),
        });
    }

    accounts.sort_by(|a, b| b.bot_probability.total_cmp(&a.bot_probability));
    suspicious.sort_by(|a, b| b.posted_at.cmp(&a.posted_at));
    suspicious.truncate(MAX_SUSPICIOUS_POSTS);

    let risk_distribution = BotClass::ALL
        .iter()
        .map(|c| CategoryCount {
            category: *c,
            count: accounts.iter().filter(|a| a.classification == *c).count(),
        })
        .collect();

    let burst_min = BURST_FLOOR.max((posts.len() as f64 * BURST_SHARE) as usize);
    let timeline_bursts = timeline
        .iter()
        .map(|(ts, count)| TimelineBucket {
            timestamp: *ts,
            count: *count,
            burst: *count >= burst_min,
        })
        .collect();

    // busiest first; ties keep the order buckets first appeared in
    let mut top = bucket_seen;
    top.sort_by(|a, b| timeline[b].cmp(&timeline[a]));
    top.truncate(HEATMAP_BUCKETS);
    let (top, heat) = (&top, &heat);
    let keyword_heatmap = COORDINATED_KEYWORDS
        .iter()
        .flat_map(|kw| {
            top.iter().map(move |bucket| HeatmapCell {
                keyword: kw.to_string(),
                bucket: *bucket,
                intensity: heat.get(&(*bucket, *kw)).copied().unwrap_or(0),
            })
        })
        .collect();

    let gauge_n = accounts.len().min(GAUGE_ACCOUNTS).max(1);
    let bot_probability_gauge = round2(
        accounts
            .iter()
            .take(GAUGE_ACCOUNTS)
            .map(|a| a.bot_probability)
            .sum::<f64>()
            / gauge_n as f64,
    );

    debug!(
        accounts = accounts.len(),
        suspicious = suspicious.len(),
        buckets = timeline.len(),
        gauge = bot_probability_gauge,
        "bot detection scored"
    );

    BotDetectionResult {
        topic: topic.to_string(),
        generated_at: now,
        dataset_size: posts.len(),
        bot_probability_gauge,
        risk_distribution,
        timeline_bursts,
        keyword_heatmap,
        suspicious_posts: suspicious,
        accounts,
        signal_definitions: SignalDefinitions::default(),
    }
}

fn suspicious_post(
    post: &Post,
    classification: BotClass,
    stats: &EngagementStats,
) -> Option<SuspiciousPost> {
    let ratio = negative_ratio(&post.text);
    let keyword_count = keywords_in(&post.text).len();
    let flagged = classification != BotClass::Low
        || ratio >= SUSPICIOUS_RATIO
        || keyword_count >= 2
        || stats.is_outlier(post);
    if !flagged {
        return None;
    }
    let badges = vec![
        classification.as_str().to_string(),
        if keyword_count >= 2 { "Keyword Burst" } else { "Pattern Match" }.to_string(),
        if ratio >= SUSPICIOUS_RATIO { "Negative Cluster" } else { "Engagement Spike" }.to_string(),
    ];
    Some(SuspiciousPost {
        post_id: post.post_id.clone(),
        account: post.account.clone(),
        text: post.text.clone(),
        source: post.source.clone(),
        posted_at: post.posted_at,
        engagement: Engagement {
            likes: post.likes,
            shares: post.shares,
            retweets: post.retweets,
        },
        badges,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    fn cfg() -> BotConfig {
        BotConfig::default()
    }

    #[test]
    fn buckets_floor_to_ten_minutes() {
        let ts = Utc.with_ymd_and_hms(2024, 5, 1, 12, 37, 45).unwrap();
        assert_eq!(bucket_of(ts), Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap());
    }

    #[test]
    fn empty_post_set_is_zero_filled() {
        let out = detect(&[], "x", now());
        assert_eq!(out.bot_probability_gauge, 0.0);
        assert_eq!(out.dataset_size, 0);
        assert_eq!(out.risk_distribution.len(), 3);
        assert!(out.risk_distribution.iter().all(|c| c.count == 0));
        assert!(out.accounts.is_empty() && out.suspicious_posts.is_empty());
        assert!(out.timeline_bursts.is_empty() && out.keyword_heatmap.is_empty());

        let none = run_bot_detection(
            &[],
            "x",
            &BotConfig {
                synthetic_size: 0,
                ..cfg()
            },
            now(),
        );
        assert_eq!(none, out);
    }

    #[test]
    fn fixed_seed_is_reproducible() {
        let a = run_bot_detection(&[], "elections", &cfg(), now());
        let b = run_bot_detection(&[], "elections", &cfg(), now());
        assert_eq!(a, b);
        assert_eq!(a.dataset_size, 36);
        // five distinct synthetic account names
        assert_eq!(a.accounts.len(), 5);
        let total: usize = a.risk_distribution.iter().map(|c| c.count).sum();
        assert_eq!(total, a.accounts.len());
    }

    #[test]
    fn synthetic_accounts_report_new_and_duplicate_signals() {
        let out = run_bot_detection(&[], "elections", &cfg(), now());
        let repeated = out
            .accounts
            .iter()
            .find(|a| a.account == "news_update247")
            .unwrap();
        assert_eq!(repeated.post_count, 12);
        assert_eq!(repeated.signals.duplicate_usernames, 100.0);
        assert!(out.accounts.iter().all(|a| a.signals.new_account == 100.0));
    }

    #[test]
    fn accounts_sorted_and_gauge_is_top_mean() {
        let out = run_bot_detection(&[], "elections", &cfg(), now());
        assert!(out
            .accounts
            .windows(2)
            .all(|w| w[0].bot_probability >= w[1].bot_probability));
        let top: Vec<f64> = out.accounts.iter().take(6).map(|a| a.bot_probability).collect();
        let expected = round2(top.iter().sum::<f64>() / top.len() as f64);
        assert_eq!(out.bot_probability_gauge, expected);
    }

    #[test]
    fn suspicious_posts_capped_and_descending() {
        let items: Vec<ExternalItem> = (0..12)
            .map(|i| ExternalItem {
                title: format!("Rigged panic threat story {i}"),
                source: "Wire Service".into(),
                published_at: Some(
                    (now() - Duration::hours(i)).to_rfc3339(),
                ),
                ..Default::default()
            })
            .collect();
        let out = run_bot_detection(&items, "elections", &cfg(), now());
        assert_eq!(out.dataset_size, 48);
        assert!(out.suspicious_posts.len() <= MAX_SUSPICIOUS_POSTS);
        assert!(out
            .suspicious_posts
            .windows(2)
            .all(|w| w[0].posted_at >= w[1].posted_at));
        for p in &out.suspicious_posts {
            assert_eq!(p.badges.len(), 3);
        }
    }

    #[test]
    fn timeline_and_heatmap_shape() {
        let out = run_bot_detection(&[], "elections", &cfg(), now());
        assert_eq!(out.timeline_bursts.iter().map(|b| b.count).sum::<usize>(), 36);
        assert!(out
            .timeline_bursts
            .windows(2)
            .all(|w| w[0].timestamp < w[1].timestamp));
        for b in &out.timeline_bursts {
            assert_eq!(b.burst, b.count >= 4);
        }
        let buckets = out.timeline_bursts.len().min(HEATMAP_BUCKETS);
        assert_eq!(out.keyword_heatmap.len(), COORDINATED_KEYWORDS.len() * buckets);
        // keyword-major order
        assert!(out.keyword_heatmap[..buckets]
            .iter()
            .all(|c| c.keyword == "urgent"));
    }

    #[test]
    fn single_post_account_in_mixed_set() {
        let mut posts = generate_coordinated(
            &[],
            &SyntheticParams {
                topic: "t",
                size: 12,
                seed: 1,
                max_seed_posts: 0,
                now: now(),
            },
        );
        posts.push(Post {
            post_id: "lone".into(),
            account: "lone_reader".into(),
            text: "lovely garden photos".into(),
            posted_at: now() - Duration::days(1),
            account_created_at: now() - Duration::days(900),
            likes: 1,
            shares: 0,
            retweets: 0,
            source: "news".into(),
        });
        posts.sort_by_key(|p| p.posted_at);
        let out = detect(&posts, "t", now());
        let lone = out.accounts.iter().find(|a| a.account == "lone_reader").unwrap();
        assert_eq!(lone.post_count, 1);
        assert_eq!(lone.signals.text_similarity, 0.0);
        assert_eq!(lone.signals.frequency, 100.0);
        assert_eq!(lone.signals.new_account, 0.0);
        assert!(out.accounts.iter().all(|a| a.post_count > 0));
    }
}
