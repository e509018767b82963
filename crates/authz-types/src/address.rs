//! Account addresses.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{AuthzError, AuthzResult};

/// Raw account address bytes.
///
/// Rendered and serialized as lowercase hex, which is also the form used
/// inside store keys.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct Address(#[serde(with = "hex::serde")] Vec<u8>);

impl Address {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Parse an address from its hex rendering.
    pub fn from_hex(s: &str) -> AuthzResult<Self> {
        hex::decode(s)
            .map(Self)
            .map_err(|e| AuthzError::InvalidRequest {
                reason: format!("invalid address '{}': {}", s, e),
            })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.to_hex())
    }
}

impl From<&str> for Address {
    /// Builds an address from the UTF-8 bytes of a label, which is how the
    /// demo and tests name accounts.
    fn from(label: &str) -> Self {
        Self(label.as_bytes().to_vec())
    }
}
