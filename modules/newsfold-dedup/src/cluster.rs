//! Greedy single-pass story clustering.
//!
//! Membership is decided solely against the seed article's vector, not
//! against members added later — this is NOT transitive closure. An article
//! similar to a non-seed member but not to the seed lands in its own cluster;
//! the borderline arbitrator exists to patch exactly those gaps, so the
//! simplification is load-bearing and must not be silently upgraded.

use newsfold_common::{Article, NewsfoldError, StoryCluster};

use crate::similarity::cosine_similarity;

/// Cluster a batch by seed-anchored similarity at the given threshold.
///
/// Deterministic given identical input order and embeddings. Every article
/// lands in exactly one cluster. Lowering the threshold never produces more
/// clusters.
pub fn cluster_by_similarity(
    articles: &[Article],
    embeddings: &[Vec<f32>],
    threshold: f64,
) -> Result<Vec<StoryCluster>, NewsfoldError> {
    if articles.len() != embeddings.len() {
        return Err(NewsfoldError::Embedding(format!(
            "{} articles but {} embeddings",
            articles.len(),
            embeddings.len()
        )));
    }

    let n = articles.len();
    let mut assigned = vec![false; n];
    let mut clusters = Vec::new();

    for seed in 0..n {
        if assigned[seed] {
            continue;
        }
        assigned[seed] = true;

        let mut members = vec![articles[seed].clone()];
        let mut seed_sims = Vec::new();

        for other in (seed + 1)..n {
            if assigned[other] {
                continue;
            }
            let sim = cosine_similarity(&embeddings[seed], &embeddings[other])?;
            if sim >= threshold {
                assigned[other] = true;
                members.push(articles[other].clone());
                seed_sims.push(sim);
            }
        }

        let average_similarity = if seed_sims.is_empty() {
            1.0
        } else {
            seed_sims.iter().sum::<f64>() / seed_sims.len() as f64
        };

        clusters.push(StoryCluster {
            id: format!("cluster-{}", articles[seed].id),
            articles: members,
            average_similarity,
        });
    }

    Ok(clusters)
}
