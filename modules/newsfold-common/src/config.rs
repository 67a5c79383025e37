use std::env;

use chrono::Duration;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Voyage AI key for embeddings.
    pub voyage_api_key: String,
    /// Anthropic key for borderline-pair arbitration.
    pub anthropic_api_key: String,
}

impl Config {
    /// Load configuration from environment variables.
    /// Panics with a clear message if required vars are missing.
    pub fn from_env() -> Self {
        Self {
            voyage_api_key: required_env("VOYAGE_API_KEY"),
            anthropic_api_key: required_env("ANTHROPIC_API_KEY"),
        }
    }
}

fn required_env(key: &str) -> String {
    env::var(key).unwrap_or_else(|_| panic!("{key} environment variable is required"))
}

/// Tunables for one deduplication run.
#[derive(Debug, Clone)]
pub struct DedupConfig {
    /// High-confidence clustering cutoff. Pairs at or above this similarity
    /// are merged without asking the arbitrator.
    pub cluster_threshold: f64,
    /// Lower bound of the borderline band `[floor, cluster_threshold)` —
    /// similar enough to suspect duplication, too low to merge outright.
    pub borderline_floor: f64,
    /// Cost cap: at most this many borderline pairs are sent to the
    /// arbitrator per batch, in discovery order. Pairs beyond the cap stay
    /// unmerged.
    pub max_arbitrations: usize,
    /// How long cached embedding vectors stay valid.
    pub cache_ttl: Duration,
    /// Model used for the same-story judgment.
    pub arbitration_model: String,
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            cluster_threshold: 0.85,
            borderline_floor: 0.70,
            max_arbitrations: 10,
            cache_ttl: Duration::days(7),
            arbitration_model: "claude-haiku-4-5-20251001".to_string(),
        }
    }
}
