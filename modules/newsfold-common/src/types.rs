//! Domain types for the story deduplication pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Article
// ---------------------------------------------------------------------------

/// A candidate article scraped from one outlet. Immutable during pipeline
/// execution; every stage derives new structures instead of mutating these.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    /// Unique within a batch. Used as the map key for cluster membership.
    pub id: String,
    pub title: String,
    pub summary: Option<String>,
    pub content: Option<String>,
    /// Originating outlet, used for reliability scoring and provenance.
    pub source: String,
    pub category: Option<String>,
    pub image_url: Option<String>,
    pub content_length: Option<usize>,
    pub created_at: DateTime<Utc>,
}

impl Article {
    /// Returns true if the article carries an associated image.
    pub fn has_image(&self) -> bool {
        self.image_url.as_deref().is_some_and(|u| !u.is_empty())
    }
}

// ---------------------------------------------------------------------------
// StoryCluster
// ---------------------------------------------------------------------------

/// A group of articles believed to report the same real-world story.
///
/// Mutable only during the arbitration merge phase; once the orchestrator
/// finishes, each cluster yields exactly one representative article.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoryCluster {
    /// Stable within one dedup call, derived from the seed article id.
    pub id: String,
    pub articles: Vec<Article>,
    /// Mean seed-to-member similarity; 1.0 for singletons. Diagnostics only —
    /// not recomputed after arbitration merges.
    pub average_similarity: f64,
}

impl StoryCluster {
    pub fn singleton(article: Article) -> Self {
        Self {
            id: format!("cluster-{}", article.id),
            articles: vec![article],
            average_similarity: 1.0,
        }
    }

    pub fn len(&self) -> usize {
        self.articles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.articles.is_empty()
    }
}

// ---------------------------------------------------------------------------
// DedupResult
// ---------------------------------------------------------------------------

/// Output of one deduplication run.
///
/// Invariants: `unique_articles.len() == clusters.len() <= stats.original_count`
/// and `duplicates_removed == stats.original_count - unique_articles.len()`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DedupResult {
    /// One representative article per cluster, in cluster order.
    pub unique_articles: Vec<Article>,
    pub clusters: Vec<StoryCluster>,
    pub duplicates_removed: usize,
    /// True when the pipeline fell back to passing every article through
    /// unmerged because a stage failed. Callers alert on this.
    pub degraded: bool,
    pub stats: DedupStats,
}

/// Stats from a dedup run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DedupStats {
    pub original_count: usize,
    pub unique_count: usize,
    pub duplicates_removed: usize,
    /// Duplicates removed as a percentage of the original count.
    pub removal_rate: f64,
    pub average_cluster_size: f64,
    pub largest_cluster: usize,
    /// Distinct sources represented in the final output.
    pub sources: Vec<String>,
}

impl std::fmt::Display for DedupStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "\n=== Dedup Run Complete ===")?;
        writeln!(f, "Articles in:        {}", self.original_count)?;
        writeln!(f, "Unique stories:     {}", self.unique_count)?;
        writeln!(
            f,
            "Duplicates removed: {} ({:.0}%)",
            self.duplicates_removed, self.removal_rate
        )?;
        writeln!(f, "Avg cluster size:   {:.2}", self.average_cluster_size)?;
        writeln!(f, "Largest cluster:    {}", self.largest_cluster)?;
        writeln!(f, "Sources:            {}", self.sources.join(", "))?;
        Ok(())
    }
}
