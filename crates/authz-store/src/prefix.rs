//! A namespaced view over a shared `KvStore`.

use std::sync::Arc;

use authz_core::traits::KvStore;

/// Prepends `prefix` to every key before delegating to the parent store.
///
/// Two modules sharing one parent cannot see each other's keys as long as
/// neither prefix is a prefix of the other; a trailing `/` is appended to
/// the namespace to guarantee that.
pub struct PrefixStore {
    parent: Arc<dyn KvStore>,
    prefix: Vec<u8>,
}

impl PrefixStore {
    pub fn new(parent: Arc<dyn KvStore>, namespace: &str) -> Self {
        let mut prefix = namespace.as_bytes().to_vec();
        prefix.push(b'/');
        Self { parent, prefix }
    }

    pub fn prefix(&self) -> &[u8] {
        &self.prefix
    }

    fn full_key(&self, key: &[u8]) -> Vec<u8> {
        let mut full = Vec::with_capacity(self.prefix.len() + key.len());
        full.extend_from_slice(&self.prefix);
        full.extend_from_slice(key);
        full
    }
}

impl KvStore for PrefixStore {
    fn get(&self, key: &[u8]) -> Option<Vec<u8>> {
        self.parent.get(&self.full_key(key))
    }

    fn set(&self, key: &[u8], value: Vec<u8>) {
        self.parent.set(&self.full_key(key), value)
    }

    fn delete(&self, key: &[u8]) {
        self.parent.delete(&self.full_key(key))
    }

    fn scan_prefix(&self, prefix: &[u8]) -> Vec<(Vec<u8>, Vec<u8>)> {
        self.parent
            .scan_prefix(&self.full_key(prefix))
            .into_iter()
            .map(|(k, v)| (k[self.prefix.len()..].to_vec(), v))
            .collect()
    }
}
