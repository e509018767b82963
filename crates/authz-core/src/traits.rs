//! Trait definitions at the engine's seams.
//!
//! - `Action`:     a signed request the router can execute
//! - `Capability`: the rule object a grant stores; decides whether an
//!                  action is allowed and how the grant narrows with use
//! - `KvStore`:    the host's key-value persistence, scoped to this module
//! - `Handler` / `Router`: the host's action execution
//!
//! The engine only ever sees these as trait objects, so new action and
//! capability types plug in through the codec registry without touching it.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use authz_types::{
    ActionKind, ActionResult, Address, AuthzResult, BlockContext, Envelope,
};

/// A concrete message type with a stable type URL.
///
/// The type URL is the tag an `Envelope` carries and the key the codec
/// registry decodes by.
pub trait Named {
    const TYPE_URL: &'static str;
}

/// A request that a handler executes on behalf of its signers.
pub trait Action: fmt::Debug + Send + Sync + 'static {
    /// Type URL this action is registered under.
    fn type_url(&self) -> &'static str;

    /// Route and name; grants are keyed by this.
    fn kind(&self) -> ActionKind;

    /// Addresses whose authority the action exercises.
    fn signers(&self) -> Vec<Address>;

    /// Stateless validation run before any store access.
    fn validate_basic(&self, _block: &BlockContext) -> AuthzResult<()> {
        Ok(())
    }

    /// Encode into a type-tagged envelope.
    fn to_envelope(&self) -> AuthzResult<Envelope>;

    /// Downcasting hook for capabilities and handlers that understand
    /// specific action types.
    fn as_any(&self) -> &dyn Any;
}

/// The outcome of evaluating one action against a capability.
#[derive(Debug)]
pub enum Acceptance {
    /// Not allowed; the grant is left untouched.
    Rejected,
    /// Allowed; the capability does not change.
    Unchanged,
    /// Allowed; the stored capability is replaced by this one.
    Updated(Box<dyn Capability>),
    /// Allowed; the capability is used up and the grant is deleted.
    Consumed,
}

impl Acceptance {
    pub fn is_allowed(&self) -> bool {
        !matches!(self, Acceptance::Rejected)
    }
}

/// A delegated permission for exactly one action kind.
///
/// `accept` must be pure: it reads only `self`, the action and the block,
/// and reports the next state through `Acceptance` instead of mutating.
pub trait Capability: fmt::Debug + Send + Sync + 'static {
    fn type_url(&self) -> &'static str;

    /// The single action kind this capability governs.
    fn action_kind(&self) -> ActionKind;

    fn accept(&self, action: &dyn Action, block: &BlockContext) -> Acceptance;

    fn to_envelope(&self) -> AuthzResult<Envelope>;

    fn as_any(&self) -> &dyn Any;
}

/// Synchronous key-value store scoped to this module's namespace.
///
/// `get` returns `None` for absent keys; `delete` of an absent key is a
/// no-op. Isolation between concurrent transitions is the host's job.
pub trait KvStore: Send + Sync {
    fn get(&self, key: &[u8]) -> Option<Vec<u8>>;

    fn set(&self, key: &[u8], value: Vec<u8>);

    fn delete(&self, key: &[u8]);

    /// Every entry whose key starts with `prefix`, in key order.
    fn scan_prefix(&self, prefix: &[u8]) -> Vec<(Vec<u8>, Vec<u8>)>;
}

/// Executes actions for one route.
pub trait Handler: Send + Sync {
    fn handle(&self, block: &BlockContext, action: &dyn Action) -> AuthzResult<ActionResult>;
}

impl<F> Handler for F
where
    F: Fn(&BlockContext, &dyn Action) -> AuthzResult<ActionResult> + Send + Sync,
{
    fn handle(&self, block: &BlockContext, action: &dyn Action) -> AuthzResult<ActionResult> {
        self(block, action)
    }
}

/// Resolves a routing category to its handler.
pub trait Router: Send + Sync {
    fn route(&self, route: &str) -> Option<Arc<dyn Handler>>;
}
