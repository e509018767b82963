//! The unrestricted capability variant.

use std::any::Any;

use serde::{Deserialize, Serialize};

use authz_types::{ActionKind, AuthzResult, BlockContext, Envelope};

use crate::traits::{Acceptance, Action, Capability, Named};

/// Permits any action of one kind, with no further constraint.
///
/// Acceptance never narrows it; the grant lives until revoked or expired.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenericCapability {
    pub action_kind: ActionKind,
}

impl GenericCapability {
    pub fn new(action_kind: ActionKind) -> Self {
        Self { action_kind }
    }
}

impl Named for GenericCapability {
    const TYPE_URL: &'static str = "/msg_authorization.GenericCapability";
}

impl Capability for GenericCapability {
    fn type_url(&self) -> &'static str {
        Self::TYPE_URL
    }

    fn action_kind(&self) -> ActionKind {
        self.action_kind.clone()
    }

    fn accept(&self, action: &dyn Action, _block: &BlockContext) -> Acceptance {
        if action.kind() == self.action_kind {
            Acceptance::Unchanged
        } else {
            Acceptance::Rejected
        }
    }

    fn to_envelope(&self) -> AuthzResult<Envelope> {
        Envelope::pack(Self::TYPE_URL, self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
