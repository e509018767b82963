//! The spend-limited capability variant.

use std::any::Any;

use serde::{Deserialize, Serialize};

use authz_core::traits::{Acceptance, Action, Capability, Named};
use authz_types::{ActionKind, AuthzResult, BlockContext, Coins, Envelope};

use crate::msgs::MsgSend;

/// Permits `bank/send` up to a remaining spend limit.
///
/// Each accepted send lowers the limit by the amount sent. A send that
/// uses up the limit exactly consumes the grant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendCapability {
    pub spend_limit: Coins,
}

impl SendCapability {
    pub fn new(spend_limit: Coins) -> Self {
        Self { spend_limit }
    }
}

impl Named for SendCapability {
    const TYPE_URL: &'static str = "/bank.SendCapability";
}

impl Capability for SendCapability {
    fn type_url(&self) -> &'static str {
        Self::TYPE_URL
    }

    fn action_kind(&self) -> ActionKind {
        MsgSend::action_kind()
    }

    fn accept(&self, action: &dyn Action, _block: &BlockContext) -> Acceptance {
        let Some(send) = action.as_any().downcast_ref::<MsgSend>() else {
            return Acceptance::Rejected;
        };
        match self.spend_limit.checked_sub(&send.amount) {
            None => Acceptance::Rejected,
            Some(left) if left.is_zero() => Acceptance::Consumed,
            Some(left) => Acceptance::Updated(Box::new(SendCapability::new(left))),
        }
    }

    fn to_envelope(&self) -> AuthzResult<Envelope> {
        Envelope::pack(Self::TYPE_URL, self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
