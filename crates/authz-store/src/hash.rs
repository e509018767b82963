//! State hashing: one SHA-256 digest over every key/value pair.
//!
//! Hash input layout (bytes, in key order):
//!   1. key length as 8-byte little-endian
//!   2. key bytes
//!   3. value length as 8-byte little-endian
//!   4. value bytes
//!
//! Length prefixes keep `("ab", "c")` and `("a", "bc")` apart.

use sha2::{Digest, Sha256};

/// Hash of the empty store.
pub const EMPTY_STATE_HASH: &str =
    "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";

/// Hash `entries`, which must already be sorted by key.
///
/// Returns a lowercase 64-character hex string.
pub fn state_hash<'a, I>(entries: I) -> String
where
    I: IntoIterator<Item = (&'a [u8], &'a [u8])>,
{
    let mut hasher = Sha256::new();
    for (key, value) in entries {
        hasher.update((key.len() as u64).to_le_bytes());
        hasher.update(key);
        hasher.update((value.len() as u64).to_le_bytes());
        hasher.update(value);
    }
    hex::encode(hasher.finalize())
}
