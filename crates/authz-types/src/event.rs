//! Events emitted by the authorization message layer and by action handlers.

use serde::{Deserialize, Serialize};

use crate::address::Address;

pub const EVENT_GRANT_AUTHORIZATION: &str = "grant-authorization";
pub const EVENT_REVOKE_AUTHORIZATION: &str = "revoke-authorization";
pub const EVENT_EXECUTE_AUTHORIZATION: &str = "execute-authorization";

pub const ATTRIBUTE_GRANTEE: &str = "grantee";
pub const ATTRIBUTE_GRANTER: &str = "granter";
pub const ATTRIBUTE_MODULE: &str = "module";
pub const ATTRIBUTE_ACTION_KIND: &str = "action_kind";

/// A typed event with ordered key/value attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub kind: String,
    pub attributes: Vec<(String, String)>,
}

impl Event {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            attributes: Vec::new(),
        }
    }

    pub fn attr(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.attributes.push((key.into(), value.to_string()));
        self
    }

    /// Shorthand for the grantee/granter pair every authorization event carries.
    pub fn parties(self, grantee: &Address, granter: &Address) -> Self {
        self.attr(ATTRIBUTE_GRANTEE, grantee).attr(ATTRIBUTE_GRANTER, granter)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}
