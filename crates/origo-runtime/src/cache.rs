//! Verdict caching.
//!
//! Identical cases produce identical prompts; caching the normalized vote
//! per (provider, prompt) keeps repeated calculations from re-billing the
//! same providers. Disabled unless the configuration sets a TTL.

use moka::future::Cache;
use std::hash::{Hash, Hasher};
use std::time::Duration;

use crate::normalize::NormalizedVote;

/// Cache key: provider identity plus a hash of the full prompt.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct VerdictKey {
    provider_id: String,
    prompt_hash: u64,
}

impl VerdictKey {
    pub fn new(provider_id: &str, prompt: &str) -> Self {
        Self {
            provider_id: provider_id.to_string(),
            prompt_hash: hash_prompt(prompt),
        }
    }
}

/// Per-provider vote cache using moka.
pub struct VerdictCache {
    cache: Cache<VerdictKey, NormalizedVote>,
}

impl VerdictCache {
    /// Create a cache with the given capacity and TTL.
    pub fn new(max_entries: u64, ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_entries)
            .time_to_live(ttl)
            .build();

        Self { cache }
    }

    /// Get a cached vote.
    pub async fn get(&self, key: &VerdictKey) -> Option<NormalizedVote> {
        self.cache.get(key).await
    }

    /// Store a vote.
    pub async fn insert(&self, key: VerdictKey, vote: NormalizedVote) {
        self.cache.insert(key, vote).await;
    }

    /// Number of cached votes.
    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }
}

fn hash_prompt(prompt: &str) -> u64 {
    use std::collections::hash_map::DefaultHasher;
    let mut hasher = DefaultHasher::new();
    prompt.hash(&mut hasher);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use origo_core::Decision;

    #[tokio::test]
    async fn test_cache_operations() {
        let cache = VerdictCache::new(1000, Duration::from_secs(3600));
        let key = VerdictKey::new("anthropic", "case prompt");

        assert!(cache.get(&key).await.is_none());

        let vote = NormalizedVote {
            decision: Decision::Conform,
            confidence: 0.9,
            rationale: "heading change satisfied".to_string(),
        };
        cache.insert(key.clone(), vote.clone()).await;

        let cached = cache.get(&key).await;
        assert_eq!(cached, Some(vote));
    }

    #[tokio::test]
    async fn test_different_prompts_do_not_collide() {
        let cache = VerdictCache::new(1000, Duration::from_secs(3600));
        let vote = NormalizedVote {
            decision: Decision::Conform,
            confidence: 0.9,
            rationale: String::new(),
        };
        cache
            .insert(VerdictKey::new("anthropic", "case A"), vote)
            .await;

        assert!(cache
            .get(&VerdictKey::new("anthropic", "case B"))
            .await
            .is_none());
        assert!(cache
            .get(&VerdictKey::new("openai", "case A"))
            .await
            .is_none());
    }
}
