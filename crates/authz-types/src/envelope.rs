//! Type-tagged envelopes for polymorphic payloads.
//!
//! Capabilities inside grant records and actions inside delegated batches
//! are stored as `Envelope`s: a type URL plus the serde_json encoding of the
//! concrete value. The type URL is what a codec registry resolves back to a
//! concrete Rust type.

use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::error::{AuthzError, AuthzResult};

/// A type URL paired with the encoded value it names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    pub type_url: String,
    /// serde_json bytes of the concrete value; hex in JSON form.
    #[serde(with = "hex::serde")]
    pub value: Vec<u8>,
}

impl Envelope {
    /// Encode `value` under `type_url`.
    pub fn pack<T: Serialize>(type_url: &str, value: &T) -> AuthzResult<Self> {
        let bytes = serde_json::to_vec(value).map_err(|e| {
            AuthzError::codec(format!("cannot encode value for '{}': {}", type_url, e))
        })?;
        Ok(Self {
            type_url: type_url.to_string(),
            value: bytes,
        })
    }

    /// Decode the payload as `T`, which must be registered under `type_url`.
    pub fn unpack<T: DeserializeOwned>(&self, type_url: &str) -> AuthzResult<T> {
        if self.type_url != type_url {
            return Err(AuthzError::codec(format!(
                "envelope holds '{}', expected '{}'",
                self.type_url, type_url
            )));
        }
        serde_json::from_slice(&self.value).map_err(|e| {
            AuthzError::codec(format!("cannot decode '{}': {}", self.type_url, e))
        })
    }
}
