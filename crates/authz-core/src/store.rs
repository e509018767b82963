//! The capability store: grant records over a raw `KvStore`.

use std::sync::Arc;

use authz_types::{AuthzResult, GrantRecord};

use crate::traits::KvStore;

/// Typed access to grant records. Owned by the engine, which is the only
/// writer.
#[derive(Clone)]
pub struct GrantStore {
    kv: Arc<dyn KvStore>,
}

impl GrantStore {
    pub fn new(kv: Arc<dyn KvStore>) -> Self {
        Self { kv }
    }

    /// Unconditional upsert.
    pub fn put(&self, key: &[u8], record: &GrantRecord) -> AuthzResult<()> {
        self.kv.set(key, record.encode()?);
        Ok(())
    }

    /// `Ok(None)` when nothing is stored under `key`.
    pub fn get(&self, key: &[u8]) -> AuthzResult<Option<GrantRecord>> {
        self.kv
            .get(key)
            .map(|bytes| GrantRecord::decode(&bytes))
            .transpose()
    }

    /// Every record under `prefix`, with its key, in key order.
    pub fn scan(&self, prefix: &[u8]) -> AuthzResult<Vec<(Vec<u8>, GrantRecord)>> {
        self.kv
            .scan_prefix(prefix)
            .into_iter()
            .map(|(key, bytes)| Ok((key, GrantRecord::decode(&bytes)?)))
            .collect()
    }

    /// Deleting an absent key is a no-op.
    pub fn delete(&self, key: &[u8]) {
        self.kv.delete(key);
    }
}
