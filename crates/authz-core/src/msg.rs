//! Messages of the authorization module itself.
//!
//! Granting and revoking are signed by the granter; executing a delegated
//! batch is signed by the grantee. Capabilities and inner actions travel as
//! envelopes and are decoded through the registry by the service.

use std::any::Any;

use serde::{Deserialize, Serialize};

use authz_types::{
    ActionKind, Address, AuthzError, AuthzResult, BlockContext, Envelope, Expiration,
};

use crate::traits::{Action, Capability, Named};

/// Route every authorization message is served on.
pub const ROUTER_KEY: &str = "msg_authorization";

pub const TYPE_GRANT_AUTHORIZATION: &str = "grant_authorization";
pub const TYPE_REVOKE_AUTHORIZATION: &str = "revoke_authorization";
pub const TYPE_EXEC_DELEGATED: &str = "exec_delegated";

/// Grant `capability` from `granter` to `grantee` until `expiration`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgGrant {
    pub granter: Address,
    pub grantee: Address,
    pub capability: Envelope,
    pub expiration: Expiration,
}

impl MsgGrant {
    pub fn new(
        granter: Address,
        grantee: Address,
        capability: &dyn Capability,
        expiration: Expiration,
    ) -> AuthzResult<Self> {
        Ok(Self {
            granter,
            grantee,
            capability: capability.to_envelope()?,
            expiration,
        })
    }
}

impl Named for MsgGrant {
    const TYPE_URL: &'static str = "/msg_authorization.MsgGrant";
}

impl Action for MsgGrant {
    fn type_url(&self) -> &'static str {
        Self::TYPE_URL
    }

    fn kind(&self) -> ActionKind {
        ActionKind::new(ROUTER_KEY, TYPE_GRANT_AUTHORIZATION)
    }

    fn signers(&self) -> Vec<Address> {
        vec![self.granter.clone()]
    }

    /// Addresses must be present and the expiration, if any, must not lie
    /// before the current block time.
    fn validate_basic(&self, block: &BlockContext) -> AuthzResult<()> {
        if self.granter.is_empty() {
            return Err(AuthzError::InvalidGrant {
                reason: "granter address is missing".to_string(),
            });
        }
        if self.grantee.is_empty() {
            return Err(AuthzError::InvalidGrant {
                reason: "grantee address is missing".to_string(),
            });
        }
        if self.expiration.is_expired_at(block.unix_time()) {
            return Err(AuthzError::InvalidGrant {
                reason: format!(
                    "expiration {} is before block time {}",
                    self.expiration,
                    block.time.to_rfc3339()
                ),
            });
        }
        Ok(())
    }

    fn to_envelope(&self) -> AuthzResult<Envelope> {
        Envelope::pack(Self::TYPE_URL, self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Revoke whatever `granter` granted `grantee` for `action_kind`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgRevoke {
    pub granter: Address,
    pub grantee: Address,
    pub action_kind: ActionKind,
}

impl Named for MsgRevoke {
    const TYPE_URL: &'static str = "/msg_authorization.MsgRevoke";
}

impl Action for MsgRevoke {
    fn type_url(&self) -> &'static str {
        Self::TYPE_URL
    }

    fn kind(&self) -> ActionKind {
        ActionKind::new(ROUTER_KEY, TYPE_REVOKE_AUTHORIZATION)
    }

    fn signers(&self) -> Vec<Address> {
        vec![self.granter.clone()]
    }

    fn validate_basic(&self, _block: &BlockContext) -> AuthzResult<()> {
        if self.granter.is_empty() {
            return Err(AuthzError::InvalidRequest {
                reason: "empty granter address".to_string(),
            });
        }
        if self.grantee.is_empty() {
            return Err(AuthzError::InvalidRequest {
                reason: "empty grantee address".to_string(),
            });
        }
        Ok(())
    }

    fn to_envelope(&self) -> AuthzResult<Envelope> {
        Envelope::pack(Self::TYPE_URL, self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Execute `actions` as `grantee`, each authorized by a grant from its signer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgExec {
    pub grantee: Address,
    pub actions: Vec<Envelope>,
}

impl MsgExec {
    pub fn new(grantee: Address, actions: &[&dyn Action]) -> AuthzResult<Self> {
        let actions = actions
            .iter()
            .map(|a| a.to_envelope())
            .collect::<AuthzResult<Vec<_>>>()?;
        Ok(Self { grantee, actions })
    }
}

impl Named for MsgExec {
    const TYPE_URL: &'static str = "/msg_authorization.MsgExec";
}

impl Action for MsgExec {
    fn type_url(&self) -> &'static str {
        Self::TYPE_URL
    }

    fn kind(&self) -> ActionKind {
        ActionKind::new(ROUTER_KEY, TYPE_EXEC_DELEGATED)
    }

    fn signers(&self) -> Vec<Address> {
        vec![self.grantee.clone()]
    }

    fn validate_basic(&self, _block: &BlockContext) -> AuthzResult<()> {
        if self.grantee.is_empty() {
            return Err(AuthzError::InvalidRequest {
                reason: "grantee address is empty".to_string(),
            });
        }
        if self.actions.is_empty() {
            return Err(AuthzError::InvalidRequest {
                reason: "no actions to execute".to_string(),
            });
        }
        Ok(())
    }

    fn to_envelope(&self) -> AuthzResult<Envelope> {
        Envelope::pack(Self::TYPE_URL, self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
