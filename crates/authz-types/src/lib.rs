//! # authz-types
//!
//! Shared types for delegated message authorization.
//!
//! All crates in the workspace import from here. No business logic lives in
//! this crate, only data definitions, envelopes, and the error type.

pub mod action;
pub mod address;
pub mod block;
pub mod coins;
pub mod envelope;
pub mod error;
pub mod event;
pub mod grant;

pub use action::{ActionKind, ActionResult};
pub use address::Address;
pub use block::BlockContext;
pub use coins::{Coin, Coins};
pub use envelope::Envelope;
pub use error::{AuthzError, AuthzResult};
pub use event::Event;
pub use grant::{Expiration, GrantRecord};
