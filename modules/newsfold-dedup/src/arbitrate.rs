//! Borderline-pair arbitration.
//!
//! Pairs whose similarity is too high to ignore but below the clustering
//! cutoff get a binary same-story judgment from an LLM. A failed judgment
//! resolves to "different" — missed duplicates are cheaper than wrongly
//! merged stories.

use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;
use tracing::{info, warn};

use ai_client::claude::Claude;
use newsfold_common::{Article, NewsfoldError, StoryCluster};

use crate::similarity::cosine_similarity;

// ---------------------------------------------------------------------------
// StoryArbitrator
// ---------------------------------------------------------------------------

#[async_trait]
pub trait StoryArbitrator: Send + Sync {
    /// Binary same-story judgment for two articles. Errs only on genuine
    /// transport/availability failures — the caller treats those as
    /// "different", never as fatal.
    async fn is_same_story(&self, a: &Article, b: &Article) -> Result<bool>;
}

#[derive(Debug, Deserialize, JsonSchema)]
struct SameStoryVerdict {
    /// Whether the two articles report the same real-world story
    is_same_story: bool,
}

const ARBITRATION_SYSTEM: &str = "You are checking whether two news articles report the \
    same real-world story. They may use different wording, emphasis, or languages but \
    refer to the same underlying event.";

/// Claude-backed arbitrator.
pub struct ClaudeArbitrator {
    client: Claude,
}

impl ClaudeArbitrator {
    pub fn new(api_key: &str, model: &str) -> Self {
        Self {
            client: Claude::new(api_key, model),
        }
    }
}

#[async_trait]
impl StoryArbitrator for ClaudeArbitrator {
    async fn is_same_story(&self, a: &Article, b: &Article) -> Result<bool> {
        let user = format!(
            "Article A: {}\n\nArticle B: {}",
            article_excerpt(a),
            article_excerpt(b)
        );
        let verdict: SameStoryVerdict = self.client.extract(ARBITRATION_SYSTEM, user).await?;
        Ok(verdict.is_same_story)
    }
}

/// Max content bytes shown to the arbitrator when no summary exists.
const EXCERPT_BYTES: usize = 400;

fn article_excerpt(article: &Article) -> String {
    let body = match article.summary.as_deref().filter(|s| !s.trim().is_empty()) {
        Some(summary) => summary,
        None => {
            let content = article.content.as_deref().unwrap_or("");
            if content.len() <= EXCERPT_BYTES {
                content
            } else {
                let mut end = EXCERPT_BYTES;
                while !content.is_char_boundary(end) {
                    end -= 1;
                }
                &content[..end]
            }
        }
    };
    format!("{} — {}", article.title, body)
}

// ---------------------------------------------------------------------------
// Borderline pair discovery
// ---------------------------------------------------------------------------

/// An unordered article-index pair in the borderline similarity band.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BorderlinePair {
    pub a: usize,
    pub b: usize,
    pub similarity: f64,
}

/// All pairs `(i, j)`, `i < j`, with similarity in `[floor, ceiling)`,
/// in ascending index order.
pub fn find_borderline_pairs(
    embeddings: &[Vec<f32>],
    floor: f64,
    ceiling: f64,
) -> Result<Vec<BorderlinePair>, NewsfoldError> {
    let mut pairs = Vec::new();
    for i in 0..embeddings.len() {
        for j in (i + 1)..embeddings.len() {
            let similarity = cosine_similarity(&embeddings[i], &embeddings[j])?;
            if similarity >= floor && similarity < ceiling {
                pairs.push(BorderlinePair {
                    a: i,
                    b: j,
                    similarity,
                });
            }
        }
    }
    Ok(pairs)
}

// ---------------------------------------------------------------------------
// Verify and merge
// ---------------------------------------------------------------------------

/// Ask the arbitrator about the first `max_arbitrations` borderline pairs (in
/// discovery order — a cost cap, not a relevance ranking) and merge clusters
/// confirmed as the same story.
///
/// Pairs already sharing a cluster are skipped, which also makes re-processing
/// the same pair a no-op. Per-pair arbitration failures resolve to
/// "different" and never propagate.
pub async fn verify_and_merge(
    clusters: Vec<StoryCluster>,
    pairs: &[BorderlinePair],
    articles: &[Article],
    arbitrator: &dyn StoryArbitrator,
    max_arbitrations: usize,
) -> Vec<StoryCluster> {
    let mut slots: Vec<Option<StoryCluster>> = clusters.into_iter().map(Some).collect();

    // article id → index into slots
    let mut membership: HashMap<String, usize> = HashMap::new();
    for (idx, slot) in slots.iter().enumerate() {
        if let Some(cluster) = slot {
            for article in &cluster.articles {
                membership.insert(article.id.clone(), idx);
            }
        }
    }

    for pair in pairs.iter().take(max_arbitrations) {
        let article_a = &articles[pair.a];
        let article_b = &articles[pair.b];
        let (Some(&slot_a), Some(&slot_b)) = (
            membership.get(&article_a.id),
            membership.get(&article_b.id),
        ) else {
            continue;
        };
        if slot_a == slot_b {
            continue;
        }

        let same = match arbitrator.is_same_story(article_a, article_b).await {
            Ok(verdict) => verdict,
            Err(e) => {
                warn!(
                    error = %e,
                    a = article_a.id,
                    b = article_b.id,
                    similarity = pair.similarity,
                    "Arbitration failed, treating pair as different stories"
                );
                false
            }
        };
        if !same {
            continue;
        }

        let Some(absorbed) = slots[slot_b].take() else {
            continue;
        };
        for article in &absorbed.articles {
            membership.insert(article.id.clone(), slot_a);
        }
        if let Some(surviving) = slots[slot_a].as_mut() {
            info!(
                surviving = surviving.id,
                absorbed = absorbed.id,
                similarity = pair.similarity,
                "Arbitrator confirmed same story, merging clusters"
            );
            // average_similarity carried forward — diagnostics only.
            surviving.articles.extend(absorbed.articles);
        }
    }

    slots.into_iter().flatten().collect()
}
