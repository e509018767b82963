//! Store key layout.
//!
//! ```text
//! c/{hex grantee}/{hex granter}/{route}/{name}
//! ```
//!
//! Addresses are hex so they never contain the separator. `route` and
//! `name` are free-form, so `%` and `/` in them are percent-escaped; without
//! that, kinds `("a/b", "c")` and `("a", "b/c")` would share a key.

use authz_types::{ActionKind, Address};

pub const GRANT_KEY_PREFIX: &str = "c/";

fn escape_segment(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    for ch in segment.chars() {
        match ch {
            '%' => out.push_str("%25"),
            '/' => out.push_str("%2F"),
            other => out.push(other),
        }
    }
    out
}

/// The key a grant from `granter` to `grantee` for `kind` is stored under.
pub fn grant_key(grantee: &Address, granter: &Address, kind: &ActionKind) -> Vec<u8> {
    format!(
        "{}{}/{}/{}/{}",
        GRANT_KEY_PREFIX,
        grantee.to_hex(),
        granter.to_hex(),
        escape_segment(&kind.route),
        escape_segment(&kind.name)
    )
    .into_bytes()
}

/// Recover `(grantee, granter)` from a key built by `grant_key`.
///
/// Returns `None` for keys outside the grant layout.
pub fn parse_grant_key(key: &[u8]) -> Option<(Address, Address)> {
    let rest = std::str::from_utf8(key).ok()?.strip_prefix(GRANT_KEY_PREFIX)?;
    let mut parts = rest.splitn(4, '/');
    let grantee = Address::from_hex(parts.next()?).ok()?;
    let granter = Address::from_hex(parts.next()?).ok()?;
    parts.next()?;
    parts.next()?;
    Some((grantee, granter))
}
