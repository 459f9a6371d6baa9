//! Process-wide store of inferred skeletons, keyed by character.
//!
//! Entries are immutable `Arc<Skeleton>` values. Re-rigging swaps the entry;
//! callers still holding the previous `Arc` keep a consistent skeleton until
//! they drop it.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use log::debug;
use rigcade_model::{InferenceConfig, LayerTree, Outcome, Skeleton};

use crate::error::InferenceError;
use crate::infer::infer;

/// Stable identifier of a character.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CharacterId(String);

impl CharacterId {
    /// Wraps an identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identifier string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CharacterId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CharacterId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Read-mostly skeleton cache.
#[derive(Debug, Default)]
pub struct SkeletonCache {
    entries: RwLock<HashMap<CharacterId, Arc<Skeleton>>>,
}

impl SkeletonCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// The current skeleton for a character.
    pub fn get(&self, id: &CharacterId) -> Option<Arc<Skeleton>> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
    }

    /// Installs a skeleton, returning the one it replaced.
    pub fn replace(&self, id: CharacterId, skeleton: Skeleton) -> Option<Arc<Skeleton>> {
        debug!("caching skeleton for '{}' ({} bones)", id, skeleton.bones().len());
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, Arc::new(skeleton))
    }

    /// Returns the cached skeleton, inferring and caching it on a miss.
    ///
    /// Inference runs without holding the lock. If two callers race on the
    /// same miss, the first insert wins and both get that entry.
    pub fn get_or_infer(
        &self,
        id: &CharacterId,
        tree: &LayerTree,
        config: &InferenceConfig,
    ) -> Result<Outcome<Arc<Skeleton>>, InferenceError> {
        if let Some(hit) = self.get(id) {
            return Ok(Outcome::clean(hit));
        }
        let (skeleton, warnings) = infer(tree, config)?.into_parts();
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let entry = entries
            .entry(id.clone())
            .or_insert_with(|| Arc::new(skeleton));
        Ok(Outcome::with_warnings(Arc::clone(entry), warnings))
    }

    /// Drops a character's entry.
    pub fn remove(&self, id: &CharacterId) -> Option<Arc<Skeleton>> {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(id)
    }

    /// Number of cached characters.
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns true if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rigcade_model::{LayerNode, Rect};

    fn tree(head_name: &str) -> LayerTree {
        LayerTree::new(LayerNode::group(
            "doc",
            "Character",
            0,
            vec![
                LayerNode::new("torso", "torso", Rect::new(40.0, 60.0, 40.0, 80.0), 1),
                LayerNode::new("head", head_name, Rect::new(40.0, 10.0, 40.0, 40.0), 2),
            ],
        ))
    }

    #[test]
    fn test_get_or_infer_caches() {
        let cache = SkeletonCache::new();
        let id = CharacterId::from("hero");
        let first = cache
            .get_or_infer(&id, &tree("head"), &InferenceConfig::default())
            .unwrap()
            .value;
        // A different tree is ignored on a hit.
        let second = cache
            .get_or_infer(&id, &tree("skull"), &InferenceConfig::default())
            .unwrap()
            .value;
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_replace_leaves_readers_untouched() {
        let cache = SkeletonCache::new();
        let id = CharacterId::new("hero");
        let config = InferenceConfig::default();
        let old = cache.get_or_infer(&id, &tree("head"), &config).unwrap().value;

        let fresh = infer(&tree("skull"), &config).unwrap().value;
        let previous = cache.replace(id.clone(), fresh).unwrap();

        assert!(Arc::ptr_eq(&old, &previous));
        assert!(old.bone_by_name("head").is_some());
        let current = cache.get(&id).unwrap();
        assert!(!Arc::ptr_eq(&old, &current));
    }

    #[test]
    fn test_failed_inference_is_not_cached() {
        let cache = SkeletonCache::new();
        let id = CharacterId::new("blob");
        let empty = LayerTree::new(LayerNode::new(
            "x",
            "scribble",
            Rect::new(0.0, 0.0, 5.0, 5.0),
            0,
        ));
        assert!(cache
            .get_or_infer(&id, &empty, &InferenceConfig::default())
            .is_err());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_remove() {
        let cache = SkeletonCache::new();
        let id = CharacterId::new("hero");
        cache
            .get_or_infer(&id, &tree("head"), &InferenceConfig::default())
            .unwrap();
        assert!(cache.remove(&id).is_some());
        assert!(cache.get(&id).is_none());
        assert!(cache.remove(&id).is_none());
    }

    #[test]
    fn test_shared_across_threads() {
        let cache = Arc::new(SkeletonCache::new());
        let id = CharacterId::new("hero");
        cache
            .get_or_infer(&id, &tree("head"), &InferenceConfig::default())
            .unwrap();
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let cache = Arc::clone(&cache);
                let id = id.clone();
                std::thread::spawn(move || cache.get(&id).map(|s| s.bones().len()))
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), Some(3));
        }
    }
}
