//! Persisted grant records.
//!
//! A `GrantRecord` is the envelope the capability store keeps under each
//! `(grantee, granter, action kind)` key. The capability itself stays
//! encoded; only the codec registry knows how to turn it back into a
//! concrete variant.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    envelope::Envelope,
    error::{AuthzError, AuthzResult},
};

/// Grant expiration in unix seconds. Zero means the grant never expires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Expiration(pub i64);

impl Expiration {
    pub const NEVER: Expiration = Expiration(0);

    pub fn at(time: DateTime<Utc>) -> Self {
        Self(time.timestamp())
    }

    pub fn is_never(&self) -> bool {
        self.0 == 0
    }

    /// True when the grant is no longer live at `now` (unix seconds).
    ///
    /// A grant expiring in the same second as `now` is still live.
    pub fn is_expired_at(&self, now: i64) -> bool {
        !self.is_never() && self.0 < now
    }
}

impl fmt::Display for Expiration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_never() {
            return f.write_str("never");
        }
        match DateTime::<Utc>::from_timestamp(self.0, 0) {
            Some(t) => write!(f, "{}", t.to_rfc3339()),
            None => write!(f, "{}", self.0),
        }
    }
}

/// A capability paired with its expiration, as stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrantRecord {
    pub capability: Envelope,
    pub expiration: Expiration,
}

impl GrantRecord {
    pub fn new(capability: Envelope, expiration: Expiration) -> Self {
        Self {
            capability,
            expiration,
        }
    }

    pub fn encode(&self) -> AuthzResult<Vec<u8>> {
        serde_json::to_vec(self).map_err(AuthzError::codec)
    }

    pub fn decode(bytes: &[u8]) -> AuthzResult<Self> {
        serde_json::from_slice(bytes)
            .map_err(|e| AuthzError::codec(format!("corrupt grant record: {}", e)))
    }
}
