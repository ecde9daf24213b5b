use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::graph::{infer_steps, AdjacencyGraph, InferenceOutcome, SearchBudget};
use crate::vocab::{NodeId, Step};

type InferenceKey = (NodeId, NodeId, Vec<Step>);

/// Thread-safe LRU cache of entity inference outcomes
///
/// Keyed by source, target and relation path. Every outcome is computed under the cache's
/// own budget, so a cached truncated outcome stays valid for later lookups.
pub struct InferenceCache {
    cache: Mutex<LruCache<InferenceKey, InferenceOutcome>>,
    budget: SearchBudget,
}

impl InferenceCache {
    /// Create a cache holding up to `capacity` outcomes (at least one).
    pub fn new(capacity: usize, budget: SearchBudget) -> Self {
        let cap = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            cache: Mutex::new(LruCache::new(cap)),
            budget,
        }
    }

    // Entries are replaced whole, so a poisoned lock still holds usable data.
    fn lock(&self) -> MutexGuard<'_, LruCache<InferenceKey, InferenceOutcome>> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn budget(&self) -> SearchBudget {
        self.budget
    }

    pub fn get(&self, source: NodeId, target: NodeId, steps: &[Step]) -> Option<InferenceOutcome> {
        self.lock().get(&(source, target, steps.to_vec())).cloned()
    }

    pub fn put(&self, source: NodeId, target: NodeId, steps: &[Step], outcome: InferenceOutcome) {
        self.lock().put((source, target, steps.to_vec()), outcome);
    }

    /// Return the cached outcome, or run the search and cache its result.
    ///
    /// The lock is not held during the search.
    pub fn get_or_infer(
        &self,
        graph: &AdjacencyGraph,
        source: NodeId,
        target: NodeId,
        steps: &[Step],
    ) -> InferenceOutcome {
        if let Some(outcome) = self.get(source, target, steps) {
            return outcome;
        }
        let outcome = infer_steps(graph, source, target, steps, self.budget);
        self.put(source, target, steps, outcome.clone());
        outcome
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{build_graph, EntityPath};
    use crate::ingest::NamedTriple;
    use crate::vocab::RelationId;

    fn n(i: u32) -> NodeId {
        NodeId(i)
    }

    fn steps(i: u32) -> Vec<Step> {
        vec![Step::forward(RelationId(i))]
    }

    fn outcome(len: usize) -> InferenceOutcome {
        InferenceOutcome {
            paths: (0..len)
                .map(|i| EntityPath {
                    nodes: vec![n(0), n(i as u32 + 1)],
                    steps: steps(0),
                })
                .collect(),
            truncated: false,
        }
    }

    #[test]
    fn test_cache_put_and_get() {
        let cache = InferenceCache::new(10, SearchBudget::default());
        cache.put(n(0), n(1), &steps(0), outcome(2));
        assert_eq!(cache.get(n(0), n(1), &steps(0)), Some(outcome(2)));
    }

    #[test]
    fn test_cache_miss() {
        let cache = InferenceCache::new(10, SearchBudget::default());
        cache.put(n(0), n(1), &steps(0), outcome(1));
        assert!(cache.get(n(1), n(0), &steps(0)).is_none());
        assert!(cache.get(n(0), n(1), &steps(1)).is_none());
    }

    #[test]
    fn test_cache_eviction() {
        let cache = InferenceCache::new(2, SearchBudget::default());

        cache.put(n(0), n(1), &steps(0), outcome(1));
        cache.put(n(0), n(2), &steps(0), outcome(1));
        // Third entry evicts the least recently used
        cache.put(n(0), n(3), &steps(0), outcome(1));

        assert!(cache.get(n(0), n(1), &steps(0)).is_none());
        assert!(cache.get(n(0), n(2), &steps(0)).is_some());
        assert!(cache.get(n(0), n(3), &steps(0)).is_some());
    }

    #[test]
    fn test_cache_get_updates_lru() {
        let cache = InferenceCache::new(2, SearchBudget::default());

        cache.put(n(0), n(1), &steps(0), outcome(1));
        cache.put(n(0), n(2), &steps(0), outcome(1));
        let _ = cache.get(n(0), n(1), &steps(0));
        cache.put(n(0), n(3), &steps(0), outcome(1));

        assert!(cache.get(n(0), n(1), &steps(0)).is_some());
        assert!(cache.get(n(0), n(2), &steps(0)).is_none());
    }

    #[test]
    fn test_cache_len_and_clear() {
        let cache = InferenceCache::new(10, SearchBudget::default());
        assert!(cache.is_empty());
        cache.put(n(0), n(1), &steps(0), outcome(1));
        cache.put(n(0), n(1), &steps(1), outcome(1));
        assert_eq!(cache.len(), 2);
        cache.clear();
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn test_zero_capacity_holds_one() {
        let cache = InferenceCache::new(0, SearchBudget::default());
        cache.put(n(0), n(1), &steps(0), outcome(1));
        cache.put(n(0), n(2), &steps(0), outcome(1));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_get_or_infer_populates_cache() {
        let (vocab, graph) =
            build_graph(&[NamedTriple::new("a", "r1", "b"), NamedTriple::new("b", "r2", "c")]).unwrap();
        let a = vocab.entity("a").unwrap();
        let c = vocab.entity("c").unwrap();
        let path = vec![
            vocab.parse_step("r1").unwrap(),
            vocab.parse_step("r2").unwrap(),
        ];

        let cache = InferenceCache::new(4, SearchBudget::default());
        let first = cache.get_or_infer(&graph, a, c, &path);
        assert_eq!(first.paths.len(), 1);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get_or_infer(&graph, a, c, &path), first);
    }
}
