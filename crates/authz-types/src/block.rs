//! Block context supplied by the host for every state transition.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The slice of the enclosing block the engine needs: the current time for
/// expiration checks, plus identifying data for logs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockContext {
    pub chain_id: String,
    pub height: u64,
    pub time: DateTime<Utc>,
}

impl BlockContext {
    pub fn new(chain_id: impl Into<String>, height: u64, time: DateTime<Utc>) -> Self {
        Self {
            chain_id: chain_id.into(),
            height,
            time,
        }
    }

    /// Block time in whole unix seconds, the resolution grant expirations use.
    pub fn unix_time(&self) -> i64 {
        self.time.timestamp()
    }
}
