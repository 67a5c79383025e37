//! Embedding provider: text normalization, cache lookup, batched embedding.
//!
//! One embedding call per batch — only cache misses are sent to the external
//! service, and results are stitched back in input order. Cache writes happen
//! on a detached task so they can never block or fail the main path.

use std::collections::HashMap;
use std::sync::Arc;

use sha2::{Digest, Sha256};
use tokio::sync::mpsc;
use tracing::warn;

use newsfold_common::{Article, NewsfoldError};

use crate::cache::{CacheEntry, EmbeddingCache};
use crate::embedder::TextEmbedder;

/// An article id paired with its vector and the exact normalized text that
/// was embedded (the cache-key material).
#[derive(Debug, Clone)]
pub struct EmbeddedArticle {
    pub id: String,
    pub text: String,
    pub vector: Vec<f32>,
}

// ---------------------------------------------------------------------------
// Text normalization
// ---------------------------------------------------------------------------

/// Max content bytes folded into the embed text when no summary exists; the
/// slice backs off to the nearest char boundary.
const CONTENT_EXCERPT_BYTES: usize = 500;

/// Normalized embed text: title + (summary, or leading content excerpt),
/// lowercased, whitespace collapsed, trimmed.
pub fn normalize_embed_text(article: &Article) -> String {
    let body = match article.summary.as_deref().filter(|s| !s.trim().is_empty()) {
        Some(summary) => summary,
        None => truncate_to_boundary(
            article.content.as_deref().unwrap_or(""),
            CONTENT_EXCERPT_BYTES,
        ),
    };
    format!("{} {}", article.title, body)
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Cache key: hex SHA-256 of the normalized embed text.
pub fn embed_key(normalized_text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(normalized_text.as_bytes());
    hex::encode(hasher.finalize())
}

fn truncate_to_boundary(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

// ---------------------------------------------------------------------------
// EmbeddingProvider
// ---------------------------------------------------------------------------

pub struct EmbeddingProvider {
    embedder: Arc<dyn TextEmbedder>,
    cache: Arc<dyn EmbeddingCache>,
    /// Side channel for detached cache-write failures, so the fire-and-forget
    /// pattern stays observable in tests and metrics.
    cache_errors: Option<mpsc::UnboundedSender<NewsfoldError>>,
}

impl EmbeddingProvider {
    pub fn new(embedder: Arc<dyn TextEmbedder>, cache: Arc<dyn EmbeddingCache>) -> Self {
        Self {
            embedder,
            cache,
            cache_errors: None,
        }
    }

    pub fn with_cache_error_channel(mut self, tx: mpsc::UnboundedSender<NewsfoldError>) -> Self {
        self.cache_errors = Some(tx);
        self
    }

    /// Embed one batch of articles. One result per input, in input order.
    ///
    /// A cache read failure downgrades to "everything is a miss". An embedder
    /// failure is fatal for the batch — partial vectors would silently
    /// corrupt clustering downstream.
    pub async fn embed_articles(
        &self,
        articles: &[Article],
    ) -> Result<Vec<EmbeddedArticle>, NewsfoldError> {
        if articles.is_empty() {
            return Ok(Vec::new());
        }

        let texts: Vec<String> = articles.iter().map(normalize_embed_text).collect();
        let keys: Vec<String> = texts.iter().map(|t| embed_key(t)).collect();

        let cached = match self.cache.get(&keys).await {
            Ok(found) => found,
            Err(e) => {
                warn!(error = %e, "Embedding cache read failed, treating batch as uncached");
                HashMap::new()
            }
        };

        let mut vectors: Vec<Option<Vec<f32>>> =
            keys.iter().map(|k| cached.get(k).cloned()).collect();
        let miss_indices: Vec<usize> = vectors
            .iter()
            .enumerate()
            .filter(|(_, v)| v.is_none())
            .map(|(i, _)| i)
            .collect();

        if !miss_indices.is_empty() {
            let miss_texts: Vec<String> =
                miss_indices.iter().map(|&i| texts[i].clone()).collect();
            let fresh = self
                .embedder
                .embed_batch(miss_texts)
                .await
                .map_err(|e| NewsfoldError::Embedding(e.to_string()))?;
            if fresh.len() != miss_indices.len() {
                return Err(NewsfoldError::Embedding(format!(
                    "expected {} vectors, got {}",
                    miss_indices.len(),
                    fresh.len()
                )));
            }

            let mut entries = Vec::with_capacity(fresh.len());
            for (&i, vector) in miss_indices.iter().zip(fresh.into_iter()) {
                entries.push(CacheEntry {
                    key: keys[i].clone(),
                    vector: vector.clone(),
                });
                vectors[i] = Some(vector);
            }
            self.spawn_cache_write(entries);
        }

        let mut embedded = Vec::with_capacity(articles.len());
        for ((article, text), vector) in articles.iter().zip(texts).zip(vectors) {
            let Some(vector) = vector else {
                return Err(NewsfoldError::Embedding(format!(
                    "no vector produced for article {}",
                    article.id
                )));
            };
            embedded.push(EmbeddedArticle {
                id: article.id.clone(),
                text,
                vector,
            });
        }
        Ok(embedded)
    }

    /// Detached cache write. Failures are logged and reported on the side
    /// channel; the main embedding path never waits on this.
    fn spawn_cache_write(&self, entries: Vec<CacheEntry>) {
        let cache = Arc::clone(&self.cache);
        let errors = self.cache_errors.clone();
        tokio::spawn(async move {
            if let Err(e) = cache.put(entries).await {
                warn!(error = %e, "Embedding cache write failed");
                if let Some(tx) = errors {
                    let _ = tx.send(NewsfoldError::Cache(e.to_string()));
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FailingCache, FixedEmbedder};
    use chrono::Utc;

    fn article(id: &str, title: &str, summary: Option<&str>, content: Option<&str>) -> Article {
        Article {
            id: id.to_string(),
            title: title.to_string(),
            summary: summary.map(str::to_string),
            content: content.map(str::to_string),
            source: "wire".to_string(),
            category: None,
            image_url: None,
            content_length: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn normalization_prefers_summary_over_content() {
        let a = article("a", "Big Fire", Some("A warehouse burned"), Some("ignored body"));
        assert_eq!(normalize_embed_text(&a), "big fire a warehouse burned");
    }

    #[test]
    fn normalization_falls_back_to_content_excerpt() {
        let a = article("a", "Big Fire", None, Some("Flames engulfed the site"));
        assert_eq!(normalize_embed_text(&a), "big fire flames engulfed the site");
    }

    #[test]
    fn normalization_ignores_blank_summary() {
        let a = article("a", "Big Fire", Some("   "), Some("Flames"));
        assert_eq!(normalize_embed_text(&a), "big fire flames");
    }

    #[test]
    fn normalization_collapses_whitespace() {
        let a = article("a", "  Big\t\tFire  ", Some("two   alarm\nblaze"), None);
        assert_eq!(normalize_embed_text(&a), "big fire two alarm blaze");
    }

    #[test]
    fn content_excerpt_respects_char_boundaries() {
        // Multibyte text long enough to cross the excerpt limit.
        let long = "서울에서 큰 화재가 발생했습니다 ".repeat(40);
        let a = article("a", "속보", None, Some(&long));
        // Must not panic on a mid-character slice.
        let text = normalize_embed_text(&a);
        assert!(text.starts_with("속보"));
    }

    #[test]
    fn embed_key_is_stable_and_distinct() {
        let k1 = embed_key("big fire a warehouse burned");
        let k2 = embed_key("big fire a warehouse burned");
        let k3 = embed_key("different text");
        assert_eq!(k1, k2);
        assert_ne!(k1, k3);
        assert_eq!(k1.len(), 64);
    }

    #[tokio::test]
    async fn cache_failure_downgrades_to_miss_and_reports_write_errors() {
        let a = article("a", "Big Fire", Some("A warehouse burned"), None);
        let embedder = FixedEmbedder::new().on_article(&a, vec![1.0, 0.0]);
        let (tx, mut rx) = mpsc::unbounded_channel();

        let provider = EmbeddingProvider::new(Arc::new(embedder), Arc::new(FailingCache))
            .with_cache_error_channel(tx);

        // Failed cache read is a miss, not an error: the batch still embeds.
        let embedded = provider
            .embed_articles(std::slice::from_ref(&a))
            .await
            .unwrap();
        assert_eq!(embedded.len(), 1);
        assert_eq!(embedded[0].vector, vec![1.0, 0.0]);

        // The detached write's failure lands on the side channel.
        let err = rx.recv().await.expect("cache write error");
        assert!(matches!(err, NewsfoldError::Cache(_)));
    }
}
