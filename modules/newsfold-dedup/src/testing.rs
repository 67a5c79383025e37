//! Deterministic test doubles for the dedup pipeline. No network, no clock
//! tricks; everything is scripted up front.

use std::collections::HashMap;
use std::sync::Mutex;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::Utc;

use newsfold_common::Article;

use crate::arbitrate::StoryArbitrator;
use crate::cache::{CacheEntry, EmbeddingCache};
use crate::embedder::TextEmbedder;
use crate::provider::normalize_embed_text;

/// A minimal article with the given id and source. Tests mutate the fields
/// they care about.
pub fn article(id: &str, source: &str) -> Article {
    Article {
        id: id.to_string(),
        title: format!("Title {id}"),
        summary: None,
        content: None,
        source: source.to_string(),
        category: None,
        image_url: None,
        content_length: None,
        created_at: Utc::now(),
    }
}

/// 2-D vectors keep similarity math checkable by hand.
pub fn vec2(x: f32, y: f32) -> Vec<f32> {
    vec![x, y]
}

// ---------------------------------------------------------------------------
// Embedders
// ---------------------------------------------------------------------------

/// Returns pre-registered vectors keyed by normalized embed text. Errs on any
/// text it was not told about, so tests fail loudly on fixture drift.
#[derive(Default)]
pub struct FixedEmbedder {
    vectors: HashMap<String, Vec<f32>>,
    calls: Mutex<Vec<Vec<String>>>,
}

impl FixedEmbedder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_text(mut self, text: &str, vector: Vec<f32>) -> Self {
        self.vectors.insert(text.to_string(), vector);
        self
    }

    /// Register an article's vector under its normalized embed text.
    pub fn on_article(mut self, article: &Article, vector: Vec<f32>) -> Self {
        self.vectors.insert(normalize_embed_text(article), vector);
        self
    }

    /// Batches seen so far, in call order.
    pub fn batches(&self) -> Vec<Vec<String>> {
        self.calls.lock().expect("lock poisoned").clone()
    }
}

#[async_trait]
impl TextEmbedder for FixedEmbedder {
    async fn embed_batch(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>> {
        self.calls
            .lock()
            .expect("lock poisoned")
            .push(texts.clone());
        texts
            .iter()
            .map(|t| {
                self.vectors
                    .get(t)
                    .cloned()
                    .ok_or_else(|| anyhow!("unregistered embed text: {t:?}"))
            })
            .collect()
    }
}

/// Always fails, as an unreachable embedding service would.
pub struct FailingEmbedder;

#[async_trait]
impl TextEmbedder for FailingEmbedder {
    async fn embed_batch(&self, _texts: Vec<String>) -> Result<Vec<Vec<f32>>> {
        Err(anyhow!("embedding service unavailable"))
    }
}

// ---------------------------------------------------------------------------
// Caches
// ---------------------------------------------------------------------------

/// Fails every cache operation.
pub struct FailingCache;

#[async_trait]
impl EmbeddingCache for FailingCache {
    async fn get(&self, _keys: &[String]) -> Result<HashMap<String, Vec<f32>>> {
        Err(anyhow!("cache backend unavailable"))
    }

    async fn put(&self, _entries: Vec<CacheEntry>) -> Result<()> {
        Err(anyhow!("cache backend unavailable"))
    }
}

// ---------------------------------------------------------------------------
// Arbitrators
// ---------------------------------------------------------------------------

/// Answers same-story questions from a script keyed by unordered article-id
/// pairs. Unscripted pairs resolve to "different".
#[derive(Default)]
pub struct ScriptedArbitrator {
    verdicts: HashMap<(String, String), bool>,
    calls: Mutex<Vec<(String, String)>>,
}

impl ScriptedArbitrator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_pair(mut self, id_a: &str, id_b: &str, same: bool) -> Self {
        self.verdicts.insert(pair_key(id_a, id_b), same);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().expect("lock poisoned").len()
    }
}

fn pair_key(id_a: &str, id_b: &str) -> (String, String) {
    if id_a <= id_b {
        (id_a.to_string(), id_b.to_string())
    } else {
        (id_b.to_string(), id_a.to_string())
    }
}

#[async_trait]
impl StoryArbitrator for ScriptedArbitrator {
    async fn is_same_story(&self, a: &Article, b: &Article) -> Result<bool> {
        let key = pair_key(&a.id, &b.id);
        self.calls
            .lock()
            .expect("lock poisoned")
            .push(key.clone());
        Ok(self.verdicts.get(&key).copied().unwrap_or(false))
    }
}

/// Always fails, as an unavailable judgment model would.
pub struct FailingArbitrator;

#[async_trait]
impl StoryArbitrator for FailingArbitrator {
    async fn is_same_story(&self, _a: &Article, _b: &Article) -> Result<bool> {
        Err(anyhow!("arbitration model unavailable"))
    }
}
