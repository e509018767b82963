//! The authorization engine: grant, revoke, lookup and accept.
//!
//! The engine is the only component that writes grant records. Lookups
//! garbage-collect expired grants as a side effect; nothing deletes them
//! proactively.
//!
//! Accept is the central transition. Given a live capability and a proposed
//! action, the capability answers with one of four outcomes and the engine
//! persists the consequence:
//!
//!   Rejected  → not allowed, record untouched
//!   Unchanged → allowed, record untouched
//!   Updated   → allowed, capability replaced, expiration preserved
//!   Consumed  → allowed, record deleted

use std::sync::Arc;

use tracing::{debug, info, warn};

use authz_types::{
    ActionKind, Address, AuthzError, AuthzResult, BlockContext, Expiration, GrantRecord,
};

use crate::{
    codec::TypeRegistry,
    keys::{grant_key, parse_grant_key, GRANT_KEY_PREFIX},
    store::GrantStore,
    traits::{Acceptance, Action, Capability, KvStore},
};

/// Delegated-authorization state over a module-scoped key-value store.
pub struct AuthzEngine {
    store: GrantStore,
    registry: Arc<TypeRegistry>,
}

impl AuthzEngine {
    pub fn new(kv: Arc<dyn KvStore>, registry: Arc<TypeRegistry>) -> Self {
        Self {
            store: GrantStore::new(kv),
            registry,
        }
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    /// Store `capability` as the grant from `granter` to `grantee` for its
    /// action kind, replacing any earlier grant for the same kind.
    ///
    /// The capability's type must be registered, otherwise it could not be
    /// read back; that is reported as `InvalidGrant`. Expirations in the past
    /// are stored as given and simply never become live.
    pub fn grant(
        &self,
        granter: &Address,
        grantee: &Address,
        capability: &dyn Capability,
        expiration: Expiration,
    ) -> AuthzResult<()> {
        if !self.registry.has_capability(capability.type_url()) {
            return Err(AuthzError::InvalidGrant {
                reason: format!(
                    "capability type '{}' is not registered",
                    capability.type_url()
                ),
            });
        }
        let envelope = capability
            .to_envelope()
            .map_err(|e| AuthzError::InvalidGrant {
                reason: e.to_string(),
            })?;

        let kind = capability.action_kind();
        let key = grant_key(grantee, granter, &kind);
        self.store.put(&key, &GrantRecord::new(envelope, expiration))?;

        info!(
            grantee = %grantee,
            granter = %granter,
            kind = %kind,
            expiration = %expiration,
            "capability granted"
        );
        Ok(())
    }

    /// Remove the grant for `kind`. Fails with `NotFound` when there is none.
    pub fn revoke(&self, grantee: &Address, granter: &Address, kind: &ActionKind) -> AuthzResult<()> {
        let key = grant_key(grantee, granter, kind);
        if self.store.get(&key)?.is_none() {
            return Err(AuthzError::NotFound {
                grantee: grantee.to_hex(),
                granter: granter.to_hex(),
                kind: kind.to_string(),
            });
        }
        self.store.delete(&key);

        info!(grantee = %grantee, granter = %granter, kind = %kind, "capability revoked");
        Ok(())
    }

    /// The live capability for `kind`, with its expiration.
    ///
    /// Absence is `Ok(None)`, not an error. A grant whose expiration lies
    /// before the block time is deleted here and reported as absent.
    pub fn lookup(
        &self,
        block: &BlockContext,
        grantee: &Address,
        granter: &Address,
        kind: &ActionKind,
    ) -> AuthzResult<Option<(Box<dyn Capability>, Expiration)>> {
        let key = grant_key(grantee, granter, kind);
        let Some(record) = self.store.get(&key)? else {
            return Ok(None);
        };

        if record.expiration.is_expired_at(block.unix_time()) {
            self.store.delete(&key);
            info!(
                grantee = %grantee,
                granter = %granter,
                kind = %kind,
                expiration = %record.expiration,
                height = block.height,
                "expired capability removed on lookup"
            );
            return Ok(None);
        }

        let capability = self.registry.decode_capability(&record.capability)?;
        Ok(Some((capability, record.expiration)))
    }

    /// Stored record for `kind` exactly as persisted, expired or not.
    ///
    /// Read-only; used by queries that must not garbage-collect.
    pub fn grant_record(
        &self,
        grantee: &Address,
        granter: &Address,
        kind: &ActionKind,
    ) -> AuthzResult<Option<GrantRecord>> {
        self.store.get(&grant_key(grantee, granter, kind))
    }

    /// Every stored record as `(granter, grantee, record)`, expired or not.
    pub fn grant_records(&self) -> AuthzResult<Vec<(Address, Address, GrantRecord)>> {
        self.store
            .scan(GRANT_KEY_PREFIX.as_bytes())?
            .into_iter()
            .map(|(key, record)| {
                let (grantee, granter) = parse_grant_key(&key).ok_or_else(|| {
                    AuthzError::codec(format!(
                        "malformed grant key '{}'",
                        String::from_utf8_lossy(&key)
                    ))
                })?;
                Ok((granter, grantee, record))
            })
            .collect()
    }

    /// Check `action` against the grant from `granter` and persist whatever
    /// the capability decides. Returns whether the action may run.
    pub fn accept(
        &self,
        block: &BlockContext,
        grantee: &Address,
        granter: &Address,
        action: &dyn Action,
    ) -> AuthzResult<bool> {
        let kind = action.kind();
        let Some((capability, expiration)) = self.lookup(block, grantee, granter, &kind)? else {
            debug!(grantee = %grantee, granter = %granter, kind = %kind, "no live capability");
            return Ok(false);
        };

        let key = grant_key(grantee, granter, &kind);
        match capability.accept(action, block) {
            Acceptance::Rejected => {
                warn!(
                    grantee = %grantee,
                    granter = %granter,
                    kind = %kind,
                    "capability rejected action"
                );
                Ok(false)
            }
            Acceptance::Unchanged => {
                debug!(grantee = %grantee, granter = %granter, kind = %kind, "capability accepted action");
                Ok(true)
            }
            Acceptance::Updated(next) => {
                let record = GrantRecord::new(next.to_envelope()?, expiration);
                self.store.put(&key, &record)?;
                debug!(
                    grantee = %grantee,
                    granter = %granter,
                    kind = %kind,
                    "capability narrowed after accept"
                );
                Ok(true)
            }
            Acceptance::Consumed => {
                self.store.delete(&key);
                info!(
                    grantee = %grantee,
                    granter = %granter,
                    kind = %kind,
                    "capability consumed and removed"
                );
                Ok(true)
            }
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
