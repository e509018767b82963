//! In-memory implementation of `KvStore`.
//!
//! `MemoryStore` keeps every entry in a `BTreeMap` behind an
//! `Arc<Mutex<_>>`. Clones share the same map, so a host can hand one clone
//! to the engine and keep another to inspect state after each transition.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::trace;

use authz_core::traits::KvStore;

use crate::hash::state_hash;

/// An ordered, shareable in-memory key-value store.
#[derive(Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<BTreeMap<Vec<u8>, Vec<u8>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    // Every write is a single insert or remove; a poisoned map is still whole.
    fn lock(&self) -> MutexGuard<'_, BTreeMap<Vec<u8>, Vec<u8>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// All keys, in order.
    pub fn keys(&self) -> Vec<Vec<u8>> {
        self.lock().keys().cloned().collect()
    }

    /// Keys starting with `prefix`, in order.
    pub fn keys_with_prefix(&self, prefix: &[u8]) -> Vec<Vec<u8>> {
        self.scan_prefix(prefix).into_iter().map(|(k, _)| k).collect()
    }

    /// SHA-256 over the whole store. Equal contents give equal hashes.
    pub fn state_hash(&self) -> String {
        let entries = self.lock();
        state_hash(entries.iter().map(|(k, v)| (k.as_slice(), v.as_slice())))
    }
}

impl KvStore for MemoryStore {
    fn get(&self, key: &[u8]) -> Option<Vec<u8>> {
        self.lock().get(key).cloned()
    }

    fn set(&self, key: &[u8], value: Vec<u8>) {
        trace!(key = %String::from_utf8_lossy(key), bytes = value.len(), "store set");
        self.lock().insert(key.to_vec(), value);
    }

    fn delete(&self, key: &[u8]) {
        trace!(key = %String::from_utf8_lossy(key), "store delete");
        self.lock().remove(key);
    }

    fn scan_prefix(&self, prefix: &[u8]) -> Vec<(Vec<u8>, Vec<u8>)> {
        self.lock()
            .range(prefix.to_vec()..)
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}
