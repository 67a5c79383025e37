//! Deduplication orchestrator.
//!
//! Sequences embed → cluster → arbitrate → select over one batch and
//! assembles run stats. Fail-safe: if any stage errors, the run degrades to
//! passing every article through as its own story rather than dropping
//! anything. Only per-pair arbitration failures are absorbed below this
//! level; a total embedding failure lands here.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use newsfold_common::{
    Article, Config, DedupConfig, DedupResult, DedupStats, NewsfoldError, StoryCluster,
};

use crate::arbitrate::{find_borderline_pairs, verify_and_merge, ClaudeArbitrator, StoryArbitrator};
use crate::cache::InMemoryCache;
use crate::cluster::cluster_by_similarity;
use crate::embedder::Embedder;
use crate::provider::EmbeddingProvider;
use crate::select::select_best_from_cluster;

pub struct StoryDeduper {
    provider: EmbeddingProvider,
    arbitrator: Arc<dyn StoryArbitrator>,
    config: DedupConfig,
}

impl StoryDeduper {
    /// Constructor-injected dependencies: any embedder/cache behind the
    /// provider, any arbitrator. No process-wide singletons.
    pub fn new(
        provider: EmbeddingProvider,
        arbitrator: Arc<dyn StoryArbitrator>,
        config: DedupConfig,
    ) -> Self {
        Self {
            provider,
            arbitrator,
            config,
        }
    }

    /// Production wiring: Voyage embeddings, in-memory embedding cache,
    /// Claude arbitration.
    pub fn from_config(config: &Config, dedup: DedupConfig) -> Self {
        let provider = EmbeddingProvider::new(
            Arc::new(Embedder::new(&config.voyage_api_key)),
            Arc::new(InMemoryCache::new(dedup.cache_ttl)),
        );
        let arbitrator = Arc::new(ClaudeArbitrator::new(
            &config.anthropic_api_key,
            &dedup.arbitration_model,
        ));
        Self::new(provider, arbitrator, dedup)
    }

    /// Deduplicate one batch. Never errors and never drops articles: a
    /// failed run returns every article as its own singleton story with
    /// `degraded: true`.
    pub async fn deduplicate(&self, articles: Vec<Article>) -> DedupResult {
        if articles.is_empty() {
            return DedupResult {
                unique_articles: Vec::new(),
                clusters: Vec::new(),
                duplicates_removed: 0,
                degraded: false,
                stats: DedupStats::default(),
            };
        }

        let run_id = Uuid::new_v4();
        match self.run(run_id, &articles).await {
            Ok(result) => {
                info!(
                    %run_id,
                    original = result.stats.original_count,
                    unique = result.stats.unique_count,
                    removed = result.duplicates_removed,
                    "Dedup run complete"
                );
                result
            }
            Err(e) => {
                warn!(
                    %run_id,
                    error = %e,
                    count = articles.len(),
                    "Dedup pipeline failed, passing articles through unmerged"
                );
                Self::fallback(articles)
            }
        }
    }

    async fn run(
        &self,
        run_id: Uuid,
        articles: &[Article],
    ) -> Result<DedupResult, NewsfoldError> {
        let embedded = self.provider.embed_articles(articles).await?;
        let embeddings: Vec<Vec<f32>> = embedded.into_iter().map(|e| e.vector).collect();

        let clusters =
            cluster_by_similarity(articles, &embeddings, self.config.cluster_threshold)?;

        let pairs = find_borderline_pairs(
            &embeddings,
            self.config.borderline_floor,
            self.config.cluster_threshold,
        )?;

        let clusters = if pairs.is_empty() {
            clusters
        } else {
            info!(%run_id, pairs = pairs.len(), "Arbitrating borderline pairs");
            verify_and_merge(
                clusters,
                &pairs,
                articles,
                self.arbitrator.as_ref(),
                self.config.max_arbitrations,
            )
            .await
        };

        let now = Utc::now();
        let unique_articles: Vec<Article> = clusters
            .iter()
            .filter_map(|c| select_best_from_cluster(&c.articles, now).cloned())
            .collect();

        let stats = compute_stats(articles.len(), &clusters, &unique_articles);
        Ok(DedupResult {
            duplicates_removed: stats.duplicates_removed,
            unique_articles,
            clusters,
            degraded: false,
            stats,
        })
    }

    /// Degraded mode: every article its own singleton story.
    fn fallback(articles: Vec<Article>) -> DedupResult {
        let clusters: Vec<StoryCluster> = articles
            .iter()
            .cloned()
            .map(StoryCluster::singleton)
            .collect();
        let stats = compute_stats(articles.len(), &clusters, &articles);
        DedupResult {
            unique_articles: articles,
            clusters,
            duplicates_removed: 0,
            degraded: true,
            stats,
        }
    }
}

fn compute_stats(
    original_count: usize,
    clusters: &[StoryCluster],
    unique_articles: &[Article],
) -> DedupStats {
    let unique_count = unique_articles.len();
    let duplicates_removed = original_count - unique_count;
    let removal_rate = if original_count == 0 {
        0.0
    } else {
        duplicates_removed as f64 / original_count as f64 * 100.0
    };
    let average_cluster_size = if clusters.is_empty() {
        0.0
    } else {
        original_count as f64 / clusters.len() as f64
    };
    let largest_cluster = clusters.iter().map(StoryCluster::len).max().unwrap_or(0);
    let sources: Vec<String> = unique_articles
        .iter()
        .map(|a| a.source.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    DedupStats {
        original_count,
        unique_count,
        duplicates_removed,
        removal_rate,
        average_cluster_size,
        largest_cluster,
        sources,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::article;

    #[test]
    fn stats_for_clean_partition() {
        let a1 = article("a1", "reuters");
        let a2 = article("a2", "bbc");
        let a3 = article("a3", "bbc");
        let clusters = vec![
            StoryCluster {
                id: "cluster-a1".to_string(),
                articles: vec![a1.clone(), a2],
                average_similarity: 0.9,
            },
            StoryCluster::singleton(a3.clone()),
        ];
        let stats = compute_stats(3, &clusters, &[a1, a3]);
        assert_eq!(stats.original_count, 3);
        assert_eq!(stats.unique_count, 2);
        assert_eq!(stats.duplicates_removed, 1);
        assert!((stats.removal_rate - 100.0 / 3.0).abs() < 1e-9);
        assert_eq!(stats.average_cluster_size, 1.5);
        assert_eq!(stats.largest_cluster, 2);
        assert_eq!(stats.sources, vec!["bbc", "reuters"]);
    }

    #[test]
    fn fallback_marks_degraded_singletons() {
        let articles = vec![article("a1", "reuters"), article("a2", "bbc")];
        let result = StoryDeduper::fallback(articles);
        assert!(result.degraded);
        assert_eq!(result.unique_articles.len(), 2);
        assert_eq!(result.clusters.len(), 2);
        assert_eq!(result.duplicates_removed, 0);
        assert!(result.clusters.iter().all(|c| c.len() == 1));
    }
}
