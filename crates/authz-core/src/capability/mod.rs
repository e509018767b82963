//! Capability variants that ship with the engine.
//!
//! Other crates add their own variants by implementing
//! [`Capability`](crate::traits::Capability) and registering the type with a
//! [`TypeRegistry`](crate::codec::TypeRegistry); the spend-limited variant
//! lives with the bank module for that reason.

mod generic;

pub use generic::GenericCapability;
