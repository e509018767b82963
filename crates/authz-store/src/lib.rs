//! # authz-store
//!
//! Key-value stores the authorization engine persists grants into.
//!
//! ## Overview
//!
//! `MemoryStore` is the reference `KvStore`: an ordered map shared behind an
//! `Arc<Mutex<_>>`. `PrefixStore` scopes a shared store to one module's
//! namespace. `state_hash` commits to the full contents with SHA-256, so
//! tests and the demo can assert that a rejected transition left state
//! byte-for-byte unchanged.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use authz_store::{MemoryStore, PrefixStore};
//!
//! let root = MemoryStore::new();
//! let scoped = Arc::new(PrefixStore::new(Arc::new(root.clone()), "msg_authorization"));
//! let engine = AuthzEngine::new(scoped, registry);
//!
//! let before = root.state_hash();
//! ```

pub mod hash;
pub mod memory;
pub mod prefix;

pub use hash::{state_hash, EMPTY_STATE_HASH};
pub use memory::MemoryStore;
pub use prefix::PrefixStore;

// ── Tests ─────────────────────────────────────────────────────────────────────
