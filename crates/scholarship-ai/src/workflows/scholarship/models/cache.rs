use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::{ModelScope, TrainedModel};

#[derive(Debug, Default)]
struct CacheState {
    entries: HashMap<ModelScope, Arc<TrainedModel>>,
    generations: HashMap<ModelScope, u64>,
}

/// Memoized active models keyed by scope.
///
/// Owned by whoever composes the store; every activation in a scope must call
/// [`WeightCache::invalidate`] for that scope. Loads that started before an invalidation
/// are discarded through the per-scope generation counter.
#[derive(Debug, Default)]
pub struct WeightCache {
    state: RwLock<CacheState>,
}

impl WeightCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, scope: &ModelScope) -> Option<Arc<TrainedModel>> {
        self.read().entries.get(scope).cloned()
    }

    /// Generation to pass to [`WeightCache::insert_if_current`] after a repository read.
    pub fn generation(&self, scope: &ModelScope) -> u64 {
        self.read().generations.get(scope).copied().unwrap_or_default()
    }

    /// Memoize a model unless its scope was invalidated since `generation` was read.
    pub fn insert_if_current(&self, model: Arc<TrainedModel>, generation: u64) -> bool {
        let mut state = self.write();
        let current = state
            .generations
            .get(&model.scope)
            .copied()
            .unwrap_or_default();
        if current != generation {
            return false;
        }
        state.entries.insert(model.scope.clone(), model);
        true
    }

    pub fn invalidate(&self, scope: &ModelScope) {
        let mut state = self.write();
        state.entries.remove(scope);
        *state.generations.entry(scope.clone()).or_default() += 1;
    }

    pub fn clear(&self) {
        let mut state = self.write();
        let scopes: Vec<ModelScope> = state.entries.drain().map(|(scope, _)| scope).collect();
        for scope in scopes {
            state.generations.entry(scope).or_default();
        }
        for generation in state.generations.values_mut() {
            *generation += 1;
        }
    }

    pub fn len(&self) -> usize {
        self.read().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read(&self) -> RwLockReadGuard<'_, CacheState> {
        self.state
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, CacheState> {
        self.state
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
