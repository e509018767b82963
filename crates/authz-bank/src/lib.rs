//! # authz-bank
//!
//! Reference bank module for delegated message authorization.
//!
//! Provides balances (`BankKeeper`), transfer actions (`MsgSend`,
//! `MsgMultiSend`), their `BankHandler`, and the spend-limited
//! `SendCapability`: a grant that lets a grantee send the granter's coins up
//! to a limit that shrinks with every send.
//!
//! `SimApp` wires the bank and the authorization module over one in-memory
//! store and is what the demo drives.
//!
//! All balances live in memory. No external systems are contacted.

pub mod app;
pub mod capability;
pub mod handler;
pub mod keeper;
pub mod msgs;

pub use app::SimApp;
pub use capability::SendCapability;
pub use handler::BankHandler;
pub use keeper::BankKeeper;
pub use msgs::{MsgMultiSend, MsgSend, Transfer};

use authz_core::TypeRegistry;

/// Register the bank's capability and action types.
pub fn register_types(registry: &mut TypeRegistry) {
    registry
        .register_capability::<SendCapability>()
        .register_action::<MsgSend>()
        .register_action::<MsgMultiSend>();
}
