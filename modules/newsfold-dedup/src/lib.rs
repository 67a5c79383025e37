//! Story deduplication core.
//!
//! Given one in-memory batch of candidate articles scraped from multiple
//! outlets, identify clusters of articles reporting the same real-world
//! story and select one canonical representative per cluster.
//!
//! Pipeline: embed → cluster (high threshold) → arbitrate borderline pairs →
//! select representatives → stats. If any stage fails, the orchestrator
//! degrades to passing every article through unmerged.

pub mod arbitrate;
pub mod cache;
pub mod cluster;
pub mod embedder;
pub mod pipeline;
pub mod provider;
pub mod select;
pub mod similarity;
#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use arbitrate::StoryArbitrator;
pub use cache::EmbeddingCache;
pub use embedder::TextEmbedder;
pub use pipeline::StoryDeduper;
pub use provider::EmbeddingProvider;
