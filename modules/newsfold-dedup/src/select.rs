//! Representative selection: pick the article that should stand for a
//! cluster in the final output. Pure scoring, no I/O, no mutation.

use chrono::{DateTime, Duration, Utc};
use newsfold_common::Article;

/// Curated per-source trust weights. Unlisted sources get
/// [`DEFAULT_SOURCE_WEIGHT`]. Matched case-insensitively on the trimmed
/// source name.
const SOURCE_WEIGHTS: &[(&str, f64)] = &[
    ("reuters", 9.0),
    ("associated press", 9.0),
    ("ap", 9.0),
    ("afp", 8.0),
    ("bbc", 8.0),
    ("bloomberg", 8.0),
    ("yonhap", 8.0),
    ("the new york times", 8.0),
    ("the guardian", 7.0),
    ("cnn", 7.0),
    ("al jazeera", 7.0),
    ("npr", 7.0),
];

const DEFAULT_SOURCE_WEIGHT: f64 = 5.0;

/// Content depth caps at 2000 chars so pathologically long articles don't
/// dominate.
const CONTENT_DEPTH_CAP: usize = 2000;

fn source_weight(source: &str) -> f64 {
    let normalized = source.trim().to_lowercase();
    SOURCE_WEIGHTS
        .iter()
        .find(|(name, _)| *name == normalized)
        .map(|(_, weight)| *weight)
        .unwrap_or(DEFAULT_SOURCE_WEIGHT)
}

/// Multi-factor quality score: content depth + source trust + media presence
/// + recency + summary presence.
pub fn score_article(article: &Article, now: DateTime<Utc>) -> f64 {
    let mut score = 0.0;

    // Content depth: up to 20 points.
    let content_len = article
        .content_length
        .unwrap_or_else(|| article.content.as_deref().map_or(0, |c| c.chars().count()));
    score += content_len.min(CONTENT_DEPTH_CAP) as f64 * 0.01;

    // Source reliability: 40–90 points.
    score += source_weight(&article.source) * 10.0;

    // Media bonus.
    if article.has_image() {
        score += 20.0;
    }

    // Recency: strongly favor the freshest report of a breaking story.
    let age = now.signed_duration_since(article.created_at);
    score += if age <= Duration::hours(2) {
        30.0
    } else if age <= Duration::hours(4) {
        20.0
    } else if age <= Duration::hours(6) {
        10.0
    } else {
        0.0
    };

    // Non-trivial summary.
    if article
        .summary
        .as_deref()
        .is_some_and(|s| s.chars().count() > 50)
    {
        score += 10.0;
    }

    score
}

/// Pick the highest-scoring member. Ties keep the earliest member in
/// original cluster order (strictly-greater replacement, no sort), so the
/// choice is deterministic.
pub fn select_best_from_cluster(members: &[Article], now: DateTime<Utc>) -> Option<&Article> {
    if members.len() <= 1 {
        return members.first();
    }

    let mut best: Option<(&Article, f64)> = None;
    for article in members {
        let score = score_article(article, now);
        match best {
            Some((_, best_score)) if score <= best_score => {}
            _ => best = Some((article, score)),
        }
    }
    best.map(|(article, _)| article)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::article;

    fn now() -> DateTime<Utc> {
        Utc::now()
    }

    #[test]
    fn unlisted_sources_get_default_weight() {
        assert_eq!(source_weight("some blog"), 5.0);
        assert_eq!(source_weight("Reuters"), 9.0);
        assert_eq!(source_weight("  BBC  "), 8.0);
    }

    #[test]
    fn content_depth_caps_at_twenty_points() {
        let now = now();
        let mut short = article("a", "wire");
        short.content_length = Some(1000);
        let mut long = article("b", "wire");
        long.content_length = Some(50_000);

        // Both stale so recency contributes 0.
        short.created_at = now - Duration::hours(12);
        long.created_at = now - Duration::hours(12);

        assert_eq!(score_article(&short, now), 50.0 + 10.0);
        assert_eq!(score_article(&long, now), 50.0 + 20.0);
    }

    #[test]
    fn content_length_falls_back_to_content_field() {
        let now = now();
        let mut a = article("a", "wire");
        a.created_at = now - Duration::hours(12);
        a.content = Some("x".repeat(500));
        assert_eq!(score_article(&a, now), 50.0 + 5.0);
    }

    #[test]
    fn recency_tiers() {
        let now = now();
        let mut a = article("a", "wire");
        a.created_at = now - Duration::minutes(30);
        assert_eq!(score_article(&a, now), 50.0 + 30.0);
        a.created_at = now - Duration::hours(3);
        assert_eq!(score_article(&a, now), 50.0 + 20.0);
        a.created_at = now - Duration::hours(5);
        assert_eq!(score_article(&a, now), 50.0 + 10.0);
        a.created_at = now - Duration::hours(7);
        assert_eq!(score_article(&a, now), 50.0);
    }

    #[test]
    fn summary_bonus_requires_substance() {
        let now = now();
        let mut a = article("a", "wire");
        a.created_at = now - Duration::hours(12);
        a.summary = Some("short".to_string());
        assert_eq!(score_article(&a, now), 50.0);
        a.summary = Some("s".repeat(51));
        assert_eq!(score_article(&a, now), 60.0);
    }

    #[test]
    fn image_bonus_applies() {
        let now = now();
        let mut a = article("a", "wire");
        a.created_at = now - Duration::hours(12);
        a.image_url = Some("https://cdn.example.com/photo.jpg".to_string());
        assert_eq!(score_article(&a, now), 70.0);
    }

    #[test]
    fn richer_article_wins_cluster() {
        let now = now();
        let mut thin = article("thin", "some blog");
        thin.created_at = now - Duration::hours(12);

        let mut rich = article("rich", "reuters");
        rich.created_at = now - Duration::hours(1);
        rich.content_length = Some(1800);
        rich.image_url = Some("https://cdn.example.com/photo.jpg".to_string());
        rich.summary = Some("a".repeat(80));

        let members = vec![thin, rich];
        let best = select_best_from_cluster(&members, now).unwrap();
        assert_eq!(best.id, "rich");
    }

    #[test]
    fn singleton_returns_sole_member() {
        let members = vec![article("only", "wire")];
        let best = select_best_from_cluster(&members, now()).unwrap();
        assert_eq!(best.id, "only");
    }

    #[test]
    fn empty_cluster_returns_none() {
        assert!(select_best_from_cluster(&[], now()).is_none());
    }

    #[test]
    fn equal_scores_keep_original_order() {
        let now = now();
        let mut members = Vec::new();
        for id in ["m1", "m2", "m3", "m4"] {
            let mut a = article(id, "wire");
            a.created_at = now - Duration::hours(12);
            members.push(a);
        }
        let best = select_best_from_cluster(&members, now).unwrap();
        assert_eq!(best.id, "m1");
    }
}
