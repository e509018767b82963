//! The codec registry: type URL → decoder.
//!
//! Grant records and delegated batches carry capabilities and actions as
//! `Envelope`s. A `TypeRegistry` is built once at startup, every crate
//! registers its types into it through its `register_types` function, and
//! it is then shared read-only behind an `Arc`.

use std::collections::HashMap;

use serde::de::DeserializeOwned;

use authz_types::{AuthzError, AuthzResult, Envelope};

use crate::traits::{Action, Capability, Named};

type CapabilityDecoder = fn(&Envelope) -> AuthzResult<Box<dyn Capability>>;
type ActionDecoder = fn(&Envelope) -> AuthzResult<Box<dyn Action>>;

fn decode_capability_as<T>(envelope: &Envelope) -> AuthzResult<Box<dyn Capability>>
where
    T: Capability + Named + DeserializeOwned,
{
    Ok(Box::new(envelope.unpack::<T>(T::TYPE_URL)?))
}

fn decode_action_as<T>(envelope: &Envelope) -> AuthzResult<Box<dyn Action>>
where
    T: Action + Named + DeserializeOwned,
{
    Ok(Box::new(envelope.unpack::<T>(T::TYPE_URL)?))
}

/// Decoders for every known capability and action type.
#[derive(Default)]
pub struct TypeRegistry {
    capabilities: HashMap<&'static str, CapabilityDecoder>,
    actions: HashMap<&'static str, ActionDecoder>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a capability variant. Registering the same type twice is
    /// harmless.
    pub fn register_capability<T>(&mut self) -> &mut Self
    where
        T: Capability + Named + DeserializeOwned,
    {
        self.capabilities.insert(T::TYPE_URL, decode_capability_as::<T>);
        self
    }

    /// Register an action type so it can travel inside delegated batches.
    pub fn register_action<T>(&mut self) -> &mut Self
    where
        T: Action + Named + DeserializeOwned,
    {
        self.actions.insert(T::TYPE_URL, decode_action_as::<T>);
        self
    }

    pub fn has_capability(&self, type_url: &str) -> bool {
        self.capabilities.contains_key(type_url)
    }

    pub fn has_action(&self, type_url: &str) -> bool {
        self.actions.contains_key(type_url)
    }

    pub fn decode_capability(&self, envelope: &Envelope) -> AuthzResult<Box<dyn Capability>> {
        let decode = self
            .capabilities
            .get(envelope.type_url.as_str())
            .ok_or_else(|| AuthzError::UnknownType {
                type_url: envelope.type_url.clone(),
            })?;
        decode(envelope)
    }

    pub fn decode_action(&self, envelope: &Envelope) -> AuthzResult<Box<dyn Action>> {
        let decode = self
            .actions
            .get(envelope.type_url.as_str())
            .ok_or_else(|| AuthzError::UnknownType {
                type_url: envelope.type_url.clone(),
            })?;
        decode(envelope)
    }
}

impl std::fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut capabilities: Vec<_> = self.capabilities.keys().collect();
        let mut actions: Vec<_> = self.actions.keys().collect();
        capabilities.sort();
        actions.sort();
        f.debug_struct("TypeRegistry")
            .field("capabilities", &capabilities)
            .field("actions", &actions)
            .finish()
    }
}
