use thiserror::Error;

#[derive(Error, Debug)]
pub enum NewsfoldError {
    /// The embedding service is unreachable or rejected the batch. Fatal to
    /// the current run; the orchestrator falls back to passing articles
    /// through unmerged rather than clustering on partial vectors.
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// Vectors of different lengths were compared. Provider misconfiguration,
    /// not a recoverable runtime condition.
    #[error("Embedding dimension mismatch: {left} vs {right}")]
    DimensionMismatch { left: usize, right: usize },

    /// Per-pair arbitration call failed. Recovered locally: the pair is
    /// resolved as "different stories" and the pipeline continues.
    #[error("Arbitration error: {0}")]
    Arbitration(String),

    /// Cache read/write failed. Recovered locally as a miss / no-op write.
    #[error("Cache error: {0}")]
    Cache(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}
