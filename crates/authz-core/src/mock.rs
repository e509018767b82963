//! Test doubles shared by the engine, dispatcher and service tests.

use std::any::Any;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chrono::DateTime;
use serde::{Deserialize, Serialize};

use authz_types::{ActionKind, Address, AuthzResult, BlockContext, Envelope};

use crate::codec::TypeRegistry;
use crate::traits::{Acceptance, Action, Capability, KvStore, Named};

pub const NOW: i64 = 1_700_000_000;

pub fn block_at(unix: i64) -> BlockContext {
    BlockContext::new("test-chain", 7, DateTime::from_timestamp(unix, 0).unwrap())
}

pub fn registry() -> Arc<TypeRegistry> {
    let mut registry = TypeRegistry::new();
    crate::register_types(&mut registry);
    registry
        .register_capability::<QuotaCapability>()
        .register_action::<MockAction>();
    Arc::new(registry)
}

/// A key-value store that counts every access.
#[derive(Default)]
pub struct MockStore {
    map: Mutex<BTreeMap<Vec<u8>, Vec<u8>>>,
    accesses: AtomicUsize,
}

impl MockStore {
    pub fn len(&self) -> usize {
        self.map.lock().unwrap().len()
    }

    pub fn accesses(&self) -> usize {
        self.accesses.load(Ordering::SeqCst)
    }

    pub fn snapshot(&self) -> BTreeMap<Vec<u8>, Vec<u8>> {
        self.map.lock().unwrap().clone()
    }

    pub fn insert_raw(&self, key: &[u8], value: &[u8]) {
        self.map.lock().unwrap().insert(key.to_vec(), value.to_vec());
    }
}

impl KvStore for MockStore {
    fn get(&self, key: &[u8]) -> Option<Vec<u8>> {
        self.accesses.fetch_add(1, Ordering::SeqCst);
        self.map.lock().unwrap().get(key).cloned()
    }

    fn set(&self, key: &[u8], value: Vec<u8>) {
        self.accesses.fetch_add(1, Ordering::SeqCst);
        self.map.lock().unwrap().insert(key.to_vec(), value);
    }

    fn delete(&self, key: &[u8]) {
        self.accesses.fetch_add(1, Ordering::SeqCst);
        self.map.lock().unwrap().remove(key);
    }

    fn scan_prefix(&self, prefix: &[u8]) -> Vec<(Vec<u8>, Vec<u8>)> {
        self.accesses.fetch_add(1, Ordering::SeqCst);
        self.map
            .lock()
            .unwrap()
            .iter()
            .filter(|(k, _)| k.starts_with(prefix))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

/// An action of kind `mock/pay` carrying an amount.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MockAction {
    pub kind: ActionKind,
    pub signers: Vec<Address>,
    pub amount: u32,
}

impl MockAction {
    pub fn pay(signer: &Address, amount: u32) -> Self {
        Self {
            kind: ActionKind::new("mock", "pay"),
            signers: vec![signer.clone()],
            amount,
        }
    }

    pub fn with_route(mut self, route: &str) -> Self {
        self.kind.route = route.to_string();
        self
    }

    pub fn with_signers(mut self, signers: Vec<Address>) -> Self {
        self.signers = signers;
        self
    }
}

impl Named for MockAction {
    const TYPE_URL: &'static str = "/mock.MockAction";
}

impl Action for MockAction {
    fn type_url(&self) -> &'static str {
        Self::TYPE_URL
    }

    fn kind(&self) -> ActionKind {
        self.kind.clone()
    }

    fn signers(&self) -> Vec<Address> {
        self.signers.clone()
    }

    fn to_envelope(&self) -> AuthzResult<Envelope> {
        Envelope::pack(Self::TYPE_URL, self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Permits `mock/pay` actions up to a remaining amount.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuotaCapability {
    pub remaining: u32,
}

impl QuotaCapability {
    pub fn new(remaining: u32) -> Self {
        Self { remaining }
    }
}

impl Named for QuotaCapability {
    const TYPE_URL: &'static str = "/mock.QuotaCapability";
}

impl Capability for QuotaCapability {
    fn type_url(&self) -> &'static str {
        Self::TYPE_URL
    }

    fn action_kind(&self) -> ActionKind {
        ActionKind::new("mock", "pay")
    }

    fn accept(&self, action: &dyn Action, _block: &BlockContext) -> Acceptance {
        let Some(pay) = action.as_any().downcast_ref::<MockAction>() else {
            return Acceptance::Rejected;
        };
        match self.remaining.checked_sub(pay.amount) {
            None => Acceptance::Rejected,
            Some(0) => Acceptance::Consumed,
            Some(left) => Acceptance::Updated(Box::new(QuotaCapability::new(left))),
        }
    }

    fn to_envelope(&self) -> AuthzResult<Envelope> {
        Envelope::pack(Self::TYPE_URL, self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
