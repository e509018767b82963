//! # authz-core
//!
//! Delegated authorization for a message-routing host.
//!
//! This crate provides:
//! - The seam traits (`Action`, `Capability`, `KvStore`, `Handler`, `Router`)
//! - The `AuthzEngine`, which stores, narrows and expires grants
//! - The `Dispatcher`, which runs a grantee's batch through the engine and
//!   the router in the correct order
//! - The `AuthzService` handling `MsgGrant`, `MsgRevoke` and `MsgExec`
//!
//! ## Usage
//!
//! ```rust,ignore
//! use authz_core::{AuthzEngine, Dispatcher, TypeRegistry};
//!
//! let mut registry = TypeRegistry::new();
//! authz_core::register_types(&mut registry);
//! let engine = Arc::new(AuthzEngine::new(store, Arc::new(registry)));
//! let dispatcher = Dispatcher::new(engine, router);
//! ```

pub mod capability;
pub mod codec;
pub mod config;
pub mod dispatcher;
pub mod engine;
pub mod keys;
pub mod msg;
pub mod router;
pub mod service;
pub mod store;
pub mod traits;

#[cfg(test)]
mod mock;

pub use capability::GenericCapability;
pub use codec::TypeRegistry;
pub use config::{export_genesis, init_genesis, AuthzConfig, GenesisGrant};
pub use dispatcher::Dispatcher;
pub use engine::AuthzEngine;
pub use msg::{MsgExec, MsgGrant, MsgRevoke};
pub use router::ActionRouter;
pub use service::{AuthzService, GrantView};
pub use traits::{Acceptance, Action, Capability, Handler, KvStore, Named, Router};

/// Register this module's capability and message types.
pub fn register_types(registry: &mut TypeRegistry) {
    registry
        .register_capability::<GenericCapability>()
        .register_action::<MsgGrant>()
        .register_action::<MsgRevoke>()
        .register_action::<MsgExec>();
}
