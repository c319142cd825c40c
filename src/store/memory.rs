//! In-memory counter store for tests and single-process deployments

use super::{CounterStore, StoreError, StoreFuture};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Process-local counter store
///
/// Every mutation happens under one write lock, which makes `increment`
/// atomic across tasks and threads.
#[derive(Debug, Default)]
pub struct InMemoryCounterStore {
    data: Arc<RwLock<HashMap<String, i64>>>,
}

impl InMemoryCounterStore {
    /// Create an empty store
    pub fn new() -> Self {
        InMemoryCounterStore {
            data: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Number of keys held (for testing)
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    /// Check if empty (for testing)
    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }

    /// Snapshot of all keys, sorted (for testing)
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.data.read().keys().cloned().collect();
        keys.sort();
        keys
    }
}

impl Clone for InMemoryCounterStore {
    fn clone(&self) -> Self {
        InMemoryCounterStore {
            data: Arc::clone(&self.data),
        }
    }
}

impl CounterStore for InMemoryCounterStore {
    fn get<'a>(&'a self, key: &'a str) -> StoreFuture<'a, i64> {
        Box::pin(async move { Ok(self.data.read().get(key).copied().unwrap_or(0)) })
    }

    fn set<'a>(&'a self, key: &'a str, value: i64) -> StoreFuture<'a, ()> {
        Box::pin(async move {
            self.data.write().insert(key.to_string(), value);
            Ok(())
        })
    }

    fn set_if_absent<'a>(&'a self, key: &'a str, value: i64) -> StoreFuture<'a, bool> {
        Box::pin(async move {
            let mut data = self.data.write();
            if data.contains_key(key) {
                return Ok(false);
            }
            data.insert(key.to_string(), value);
            Ok(true)
        })
    }

    fn increment<'a>(&'a self, key: &'a str, amount: i64) -> StoreFuture<'a, i64> {
        Box::pin(async move {
            let mut data = self.data.write();
            let slot = data.entry(key.to_string()).or_insert(0);
            *slot = slot.checked_add(amount).ok_or_else(|| StoreError::Overflow {
                key: key.to_string(),
            })?;
            Ok(*slot)
        })
    }

    fn exists<'a>(&'a self, key: &'a str) -> StoreFuture<'a, bool> {
        Box::pin(async move { Ok(self.data.read().contains_key(key)) })
    }

    fn ping(&self) -> StoreFuture<'_, ()> {
        Box::pin(async move { Ok(()) })
    }
}
